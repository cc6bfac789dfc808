pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Direction, GroupDimension, TradeStatus};
pub use error::CoreError;
pub use structs::{parse_wall_clock, TradeRecord};

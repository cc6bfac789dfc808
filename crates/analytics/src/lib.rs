//! # Tradelog Analytics Engine
//!
//! This crate turns a collection of journal trades into a `MetricsReport`:
//! equity curve, drawdown, risk-adjusted ratios, streaks, grouped tables and
//! composite scores.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O and no knowledge of where trades are stored. It depends
//!   on `core-types` for the input shape and on `configuration` for score weights.
//! - **Stateless Calculation:** The `MetricsEngine` holds only settings. Each call
//!   runs four stages over its own input and allocates a fresh report:
//!   1. `filter`: keep trades in scope that are closed with a finite pnl.
//!   2. `sequence`: order them by date, entry time and id.
//!   3. `aggregate`: one left-to-right fold into `Aggregates`.
//!   4. `ratios`: pure functions over `Aggregates`.
//!
//! ## Public API
//!
//! - `MetricsEngine`: runs the pipeline.
//! - `MetricsReport`: the output snapshot.
//! - `ReportFilter`: time window and account restriction.
//! - `Ratio`: a ratio that may be `Unbounded`.
//! - `AnalyticsError`: the errors that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod aggregate;
pub mod engine;
pub mod error;
pub mod filter;
pub mod ratios;
pub mod report;
pub mod sequence;

// Re-export the key components to create a clean, public-facing API.
pub use aggregate::{Aggregates, UNKNOWN_GROUP, aggregate};
pub use engine::MetricsEngine;
pub use error::AnalyticsError;
pub use filter::{EligibleTrade, ReportFilter, select};
pub use ratios::{DerivedRatios, Ratio};
pub use report::{Advisory, DrawdownPoint, EquityPoint, GroupStat, GroupedPerformance, MetricsReport};
pub use sequence::sequence;

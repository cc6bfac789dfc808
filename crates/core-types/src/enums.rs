use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

/// Lifecycle of a journal entry. Only closed trades carry a realized pnl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// A key by which closed trades can be bucketed for grouped performance tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupDimension {
    Symbol,
    Session,
    Weekday,
    Hour,
    Timeframe,
    Strategy,
    Direction,
    Month,
    Confidence,
}

impl GroupDimension {
    pub const ALL: [GroupDimension; 9] = [
        GroupDimension::Symbol,
        GroupDimension::Session,
        GroupDimension::Weekday,
        GroupDimension::Hour,
        GroupDimension::Timeframe,
        GroupDimension::Strategy,
        GroupDimension::Direction,
        GroupDimension::Month,
        GroupDimension::Confidence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupDimension::Symbol => "symbol",
            GroupDimension::Session => "session",
            GroupDimension::Weekday => "weekday",
            GroupDimension::Hour => "hour",
            GroupDimension::Timeframe => "timeframe",
            GroupDimension::Strategy => "strategy",
            GroupDimension::Direction => "direction",
            GroupDimension::Month => "month",
            GroupDimension::Confidence => "confidence",
        }
    }
}

impl fmt::Display for GroupDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupDimension {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        GroupDimension::ALL
            .into_iter()
            .find(|dim| dim.as_str() == wanted)
            .ok_or_else(|| CoreError::InvalidInput("group dimension".to_string(), s.to_string()))
    }
}

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Invalid report filter: window start {from} is after window end {to}")]
    InvalidFilter { from: NaiveDate, to: NaiveDate },
}

use crate::enums::{Direction, TradeStatus};
use crate::error::CoreError;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A single journal entry as it is stored by the persistence layer.
///
/// Field names follow the camelCase convention of the document store so that a
/// JSON export can be deserialized directly. Monetary fields are raw `f64`s:
/// the analytics layer decides which of them are usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub id: String,
    #[serde(default)]
    pub account_id: Option<String>,
    pub symbol: String,
    pub direction: Direction,
    pub status: TradeStatus,
    pub date: NaiveDate,
    #[serde(default)]
    pub entry_time: Option<String>,
    #[serde(default)]
    pub exit_time: Option<String>,
    #[serde(default)]
    pub entry_price: Option<f64>,
    #[serde(default)]
    pub exit_price: Option<f64>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub pnl: Option<f64>,
    #[serde(default)]
    pub commission: Option<f64>,
    #[serde(default)]
    pub swap: Option<f64>,
    #[serde(default)]
    pub spread: Option<f64>,
    #[serde(default)]
    pub pips: Option<f64>,
    #[serde(default)]
    pub risk_amount: Option<f64>,
    #[serde(default)]
    pub confidence: Option<u8>,

    // Classification tags.
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub currency_pair: Option<String>,
}

impl TradeRecord {
    /// Creates a minimal closed trade. Mostly useful for tests and fixtures.
    pub fn closed(id: impl Into<String>, symbol: impl Into<String>, date: NaiveDate, pnl: f64) -> Self {
        Self {
            id: id.into(),
            account_id: None,
            symbol: symbol.into(),
            direction: Direction::Long,
            status: TradeStatus::Closed,
            date,
            entry_time: None,
            exit_time: None,
            entry_price: None,
            exit_price: None,
            quantity: 0.0,
            pnl: Some(pnl),
            commission: None,
            swap: None,
            spread: None,
            pips: None,
            risk_amount: None,
            confidence: None,
            strategy: None,
            session: None,
            timeframe: None,
            currency_pair: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == TradeStatus::Closed
    }

    /// The entry time parsed as a wall-clock time, if present and well formed.
    pub fn entry_time_of_day(&self) -> Option<NaiveTime> {
        self.entry_time.as_deref().and_then(|s| parse_wall_clock(s).ok())
    }

    pub fn exit_time_of_day(&self) -> Option<NaiveTime> {
        self.exit_time.as_deref().and_then(|s| parse_wall_clock(s).ok())
    }

    /// Hours between entry and exit on the trade date.
    ///
    /// Journal entries only carry one calendar date, so an exit earlier than the
    /// entry is read as a position held past midnight.
    pub fn holding_period_hours(&self) -> Option<f64> {
        let entry = self.entry_time_of_day()?;
        let exit = self.exit_time_of_day()?;
        let mut secs = (exit - entry).num_seconds();
        if secs < 0 {
            secs += 24 * 3600;
        }
        Some(secs as f64 / 3600.0)
    }
}

/// Parses a local wall-clock string in `HH:MM` or `HH:MM:SS` form.
pub fn parse_wall_clock(value: &str) -> Result<NaiveTime, CoreError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|e| CoreError::InvalidInput("wall-clock time".to_string(), format!("{value}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_wall_clock_formats() {
        assert_eq!(parse_wall_clock("09:30").unwrap().hour(), 9);
        assert_eq!(parse_wall_clock("23:05:59").unwrap().second(), 59);
        assert!(parse_wall_clock("9.30am").is_err());
        assert!(parse_wall_clock("").is_err());
    }

    #[test]
    fn test_holding_period_wraps_past_midnight() {
        let mut trade = TradeRecord::closed("t1", "EURUSD", date(2024, 3, 1), 10.0);
        trade.entry_time = Some("22:00".to_string());
        trade.exit_time = Some("01:30".to_string());
        assert_eq!(trade.holding_period_hours(), Some(3.5));

        trade.exit_time = Some("23:00".to_string());
        assert_eq!(trade.holding_period_hours(), Some(1.0));
    }

    #[test]
    fn test_holding_period_requires_both_times() {
        let mut trade = TradeRecord::closed("t1", "EURUSD", date(2024, 3, 1), 10.0);
        trade.entry_time = Some("10:00".to_string());
        assert_eq!(trade.holding_period_hours(), None);

        trade.exit_time = Some("garbage".to_string());
        assert_eq!(trade.holding_period_hours(), None);
    }

    #[test]
    fn test_deserializes_document_store_shape() {
        let json = r#"{
            "id": "abc",
            "accountId": "acc-1",
            "symbol": "GBPUSD",
            "direction": "short",
            "status": "closed",
            "date": "2024-05-14",
            "entryTime": "08:15",
            "pnl": -42.5,
            "riskAmount": 50,
            "session": "London"
        }"#;
        let trade: TradeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(trade.account_id.as_deref(), Some("acc-1"));
        assert_eq!(trade.direction, Direction::Short);
        assert_eq!(trade.pnl, Some(-42.5));
        assert_eq!(trade.risk_amount, Some(50.0));
        assert_eq!(trade.entry_time_of_day().map(|t| t.minute()), Some(15));
        assert!(trade.pips.is_none());
    }
}

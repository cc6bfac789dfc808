use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::TradeRecord;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Optional restrictions applied before any metric is computed.
///
/// The time window is half-open: `from <= date < to`. Either bound may be left
/// open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub account_id: Option<String>,
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            account_id: None,
        }
    }

    pub fn for_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn validate(&self) -> Result<(), AnalyticsError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => Err(AnalyticsError::InvalidFilter { from, to }),
            _ => Ok(()),
        }
    }

    /// Whether the trade falls inside the window and belongs to the account.
    /// Says nothing about whether the trade can be measured.
    pub fn in_scope(&self, trade: &TradeRecord) -> bool {
        if let Some(from) = self.from {
            if trade.date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if trade.date >= to {
                return false;
            }
        }
        match &self.account_id {
            Some(account) => trade.account_id.as_deref() == Some(account.as_str()),
            None => true,
        }
    }
}

/// A closed trade with a usable pnl, already converted to `Decimal`.
#[derive(Debug, Clone, Copy)]
pub struct EligibleTrade<'a> {
    pub record: &'a TradeRecord,
    pub pnl: Decimal,
}

/// Output of the filtering stage.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    /// Trades inside the filter scope, open or closed, priced or not.
    pub in_scope: usize,
    /// Trades that contribute to performance aggregates. Unordered.
    pub eligible: Vec<EligibleTrade<'a>>,
}

/// Converts the recorded pnl of a closed trade.
///
/// Returns `None` for open trades, missing pnl, and values that are not finite
/// or fall outside the `Decimal` range.
pub fn realized_pnl(trade: &TradeRecord) -> Option<Decimal> {
    if !trade.is_closed() {
        return None;
    }
    let raw = trade.pnl?;
    if !raw.is_finite() {
        tracing::warn!(trade_id = %trade.id, "Closed trade has a non-finite pnl, excluding it.");
        return None;
    }
    Decimal::from_f64(raw)
}

/// Selects the trades that are in scope and eligible for performance metrics.
pub fn select<'a>(trades: &'a [TradeRecord], filter: &ReportFilter) -> Selection<'a> {
    let mut selection = Selection::default();
    for trade in trades.iter().filter(|t| filter.in_scope(t)) {
        selection.in_scope += 1;
        if let Some(pnl) = realized_pnl(trade) {
            selection.eligible.push(EligibleTrade { record: trade, pnl });
        }
    }
    tracing::debug!(
        total = trades.len(),
        in_scope = selection.in_scope,
        eligible = selection.eligible.len(),
        "Trade selection complete."
    );
    selection
}

use crate::ratios::Ratio;
use chrono::NaiveDate;
use core_types::GroupDimension;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One point of the equity curve, in sequence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub sequence_index: usize,
    pub cumulative_pnl: Decimal,
    pub trade_id: String,
    pub date: NaiveDate,
}

/// Drawdown at the equity point with the same `sequence_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownPoint {
    pub sequence_index: usize,
    pub peak: Decimal,
    pub drawdown: Decimal,
}

/// A single bucket of a grouped performance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStat {
    pub group_key: String,
    pub count: usize,
    pub win_rate: f64,
    pub total_pnl: Decimal,
    pub total_pips: f64,
}

/// All buckets of one dimension, sorted by `total_pnl` descending then key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedPerformance {
    pub dimension: GroupDimension,
    pub groups: Vec<GroupStat>,
}

/// Conditions the caller should know about. Their presence never means the
/// report is malformed, only that it may not say what was asked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Advisory {
    /// The requested window was inverted; the report is the all-zero report.
    InvalidFilter { from: NaiveDate, to: NaiveDate },
}

/// A full snapshot of trading performance over one selection of trades.
///
/// Produced fresh per call and never mutated afterwards. Two calls over the
/// same trades and filter produce equal reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    // I. Activity
    pub total_trades: usize,
    pub total_closed: usize,
    pub winners: usize,
    pub losers: usize,
    pub breakeven: usize,

    // II. Profitability
    pub total_pnl: Decimal,
    pub net_pnl: Decimal,
    pub gross_win: Decimal,
    pub gross_loss: Decimal,
    pub largest_win: Decimal,
    pub largest_loss: Decimal,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    pub expectancy: Decimal,
    pub win_rate: f64,
    pub profit_factor: Ratio,
    pub risk_reward_ratio: Ratio,
    pub avg_r_multiple: f64,

    // III. Costs
    pub total_commissions: Decimal,
    pub total_swap: Decimal,
    pub total_spread: Decimal,

    // IV. Pips
    pub total_pips: f64,
    pub pip_trades: usize,

    // V. Risk and drawdown
    pub peak_equity: Decimal,
    pub max_drawdown: Decimal,
    pub max_drawdown_pct: f64,
    pub recovery_factor: Ratio,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,

    // VI. Streaks
    pub max_win_streak: usize,
    pub max_loss_streak: usize,
    pub current_streak: i64,

    // VII. Time
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub months_spanned: u32,
    pub trading_frequency: f64,
    pub avg_holding_period_hours: f64,

    // VIII. Scores
    pub composite_performance_score: f64,
    pub composite_risk_score: f64,

    // IX. Series
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown_series: Vec<DrawdownPoint>,
    pub grouped_performance: Vec<GroupedPerformance>,

    pub advisories: Vec<Advisory>,
}

impl MetricsReport {
    /// Creates a new, zeroed-out report.
    /// This is what an empty selection produces.
    pub fn new() -> Self {
        Self {
            total_trades: 0,
            total_closed: 0,
            winners: 0,
            losers: 0,
            breakeven: 0,
            total_pnl: Decimal::ZERO,
            net_pnl: Decimal::ZERO,
            gross_win: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            largest_win: Decimal::ZERO,
            largest_loss: Decimal::ZERO,
            avg_win: Decimal::ZERO,
            avg_loss: Decimal::ZERO,
            expectancy: Decimal::ZERO,
            win_rate: 0.0,
            profit_factor: Ratio::ZERO,
            risk_reward_ratio: Ratio::ZERO,
            avg_r_multiple: 0.0,
            total_commissions: Decimal::ZERO,
            total_swap: Decimal::ZERO,
            total_spread: Decimal::ZERO,
            total_pips: 0.0,
            pip_trades: 0,
            peak_equity: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
            max_drawdown_pct: 0.0,
            recovery_factor: Ratio::ZERO,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            calmar_ratio: 0.0,
            max_win_streak: 0,
            max_loss_streak: 0,
            current_streak: 0,
            first_date: None,
            last_date: None,
            months_spanned: 0,
            trading_frequency: 0.0,
            avg_holding_period_hours: 0.0,
            composite_performance_score: 0.0,
            composite_risk_score: 0.0,
            equity_curve: Vec::new(),
            drawdown_series: Vec::new(),
            grouped_performance: Vec::new(),
            advisories: Vec::new(),
        }
    }

    /// False when the request itself was rejected (see [`Advisory`]).
    pub fn is_valid_request(&self) -> bool {
        !self
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::InvalidFilter { .. }))
    }

    pub fn group(&self, dimension: GroupDimension) -> Option<&GroupedPerformance> {
        self.grouped_performance.iter().find(|g| g.dimension == dimension)
    }
}

impl Default for MetricsReport {
    fn default() -> Self {
        Self::new()
    }
}

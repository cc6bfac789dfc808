use crate::filter::EligibleTrade;
use crate::report::{DrawdownPoint, EquityPoint};
use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use core_types::{GroupDimension, TradeRecord};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Bucket for trades that lack the field a dimension groups on.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Running win/loss streak state. Breakeven trades leave it untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakState {
    pub current_wins: usize,
    pub current_losses: usize,
    pub max_wins: usize,
    pub max_losses: usize,
}

impl StreakState {
    pub fn record(self, pnl: Decimal) -> Self {
        let mut next = self;
        if pnl > Decimal::ZERO {
            next.current_wins += 1;
            next.current_losses = 0;
            next.max_wins = next.max_wins.max(next.current_wins);
        } else if pnl < Decimal::ZERO {
            next.current_losses += 1;
            next.current_wins = 0;
            next.max_losses = next.max_losses.max(next.current_losses);
        }
        next
    }

    /// The trailing streak: positive for wins, negative for losses.
    pub fn current(&self) -> i64 {
        if self.current_wins > 0 {
            self.current_wins as i64
        } else {
            -(self.current_losses as i64)
        }
    }
}

/// Per-bucket running totals for one grouping dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupAccumulator {
    pub count: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_pnl: Decimal,
    pub total_pips: f64,
}

/// Everything the ratio functions need, gathered in one pass over the
/// sequenced trades.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    pub total_closed: usize,
    pub winners: usize,
    pub losers: usize,
    pub breakeven: usize,

    pub total_pnl: Decimal,
    pub gross_win: Decimal,
    /// Absolute value of the summed losing pnl.
    pub gross_loss: Decimal,
    pub largest_win: Decimal,
    /// Most negative single pnl, kept signed.
    pub largest_loss: Decimal,

    pub total_commission: Decimal,
    pub total_swap: Decimal,
    /// Absolute value of the summed negative swaps.
    pub negative_swap: Decimal,
    pub total_spread: Decimal,

    pub total_pips: f64,
    pub pip_trades: usize,
    pub holding_hours_sum: f64,
    pub holding_trades: usize,
    pub r_multiple_sum: f64,
    pub r_trades: usize,

    pub peak: Decimal,
    pub max_drawdown: Decimal,
    pub streaks: StreakState,

    /// Per-trade pnl in sequence order, for dispersion-based ratios.
    pub pnl_samples: Vec<f64>,
    pub equity_curve: Vec<EquityPoint>,
    pub drawdown_series: Vec<DrawdownPoint>,

    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,

    pub groups: BTreeMap<GroupDimension, HashMap<String, GroupAccumulator>>,
}

impl Aggregates {
    /// An empty accumulator that will bucket trades along `dimensions`.
    pub fn new(dimensions: &[GroupDimension]) -> Self {
        Self {
            groups: dimensions.iter().map(|d| (*d, HashMap::new())).collect(),
            ..Self::default()
        }
    }

    /// Folds one trade into the accumulator. Trades must arrive in sequence
    /// order for the curve, drawdown and streak fields to be meaningful.
    ///
    /// A trade whose pnl would push the running totals past the `Decimal`
    /// range is skipped, as if it were ineligible.
    pub fn absorb(mut self, trade: &EligibleTrade<'_>) -> Self {
        let record = trade.record;
        let pnl = trade.pnl;

        if !self.can_absorb(pnl) {
            tracing::warn!(trade_id = %record.id, %pnl, "Skipping trade whose pnl overflows the running totals.");
            return self;
        }

        self.total_closed += 1;
        self.total_pnl += pnl;
        if pnl > Decimal::ZERO {
            self.winners += 1;
            self.gross_win += pnl;
            self.largest_win = self.largest_win.max(pnl);
        } else if pnl < Decimal::ZERO {
            self.losers += 1;
            self.gross_loss += pnl.abs();
            self.largest_loss = self.largest_loss.min(pnl);
        } else {
            self.breakeven += 1;
        }
        self.streaks = self.streaks.record(pnl);

        // Curve and drawdown. The peak starts at the zero baseline.
        // Drawdown never exceeds gross_loss, so the subtraction cannot overflow.
        self.peak = self.peak.max(self.total_pnl);
        let drawdown = self.peak - self.total_pnl;
        self.max_drawdown = self.max_drawdown.max(drawdown);
        let sequence_index = self.equity_curve.len();
        self.equity_curve.push(EquityPoint {
            sequence_index,
            cumulative_pnl: self.total_pnl,
            trade_id: record.id.clone(),
            date: record.date,
        });
        self.drawdown_series.push(DrawdownPoint {
            sequence_index,
            peak: self.peak,
            drawdown,
        });
        self.pnl_samples.push(pnl.to_f64().unwrap_or(0.0));

        // Costs tracked outside of pnl.
        if let Some(commission) = finite_decimal(record.commission) {
            self.total_commission = self.total_commission.saturating_add(commission.abs());
        }
        if let Some(swap) = finite_decimal(record.swap) {
            self.total_swap = self.total_swap.saturating_add(swap);
            if swap < Decimal::ZERO {
                self.negative_swap = self.negative_swap.saturating_add(swap.abs());
            }
        }
        if let Some(spread) = finite_decimal(record.spread) {
            self.total_spread = self.total_spread.saturating_add(spread.abs());
        }

        let pips = record.pips.filter(|p| p.is_finite());
        if let Some(p) = pips {
            self.total_pips += p;
            self.pip_trades += 1;
        }
        if let Some(hours) = record.holding_period_hours() {
            self.holding_hours_sum += hours;
            self.holding_trades += 1;
        }
        if let Some(risk) = record.risk_amount.filter(|r| r.is_finite() && *r > 0.0) {
            self.r_multiple_sum += pnl.to_f64().unwrap_or(0.0) / risk;
            self.r_trades += 1;
        }

        self.first_date = Some(self.first_date.map_or(record.date, |d| d.min(record.date)));
        self.last_date = Some(self.last_date.map_or(record.date, |d| d.max(record.date)));

        for (dimension, buckets) in self.groups.iter_mut() {
            let bucket = buckets.entry(group_key(*dimension, record)).or_default();
            bucket.count += 1;
            // A bucket sum lies between -gross_loss and gross_win.
            bucket.total_pnl += pnl;
            if pnl > Decimal::ZERO {
                bucket.wins += 1;
            } else if pnl < Decimal::ZERO {
                bucket.losses += 1;
            }
            if let Some(p) = pips {
                bucket.total_pips += p;
            }
        }

        self
    }

    fn can_absorb(&self, pnl: Decimal) -> bool {
        let gross_fits = if pnl >= Decimal::ZERO {
            self.gross_win.checked_add(pnl).is_some()
        } else {
            self.gross_loss.checked_add(pnl.abs()).is_some()
        };
        gross_fits && self.total_pnl.checked_add(pnl).is_some()
    }
}

/// Accumulates sequenced trades in a single left-to-right pass.
pub fn aggregate(ordered: &[EligibleTrade<'_>], dimensions: &[GroupDimension]) -> Aggregates {
    ordered
        .iter()
        .fold(Aggregates::new(dimensions), |acc, trade| acc.absorb(trade))
}

/// The bucket a trade falls into along `dimension`.
pub fn group_key(dimension: GroupDimension, record: &TradeRecord) -> String {
    let key = match dimension {
        GroupDimension::Symbol => {
            non_empty(Some(&record.symbol)).or_else(|| non_empty(record.currency_pair.as_ref()))
        }
        GroupDimension::Session => non_empty(record.session.as_ref()),
        GroupDimension::Timeframe => non_empty(record.timeframe.as_ref()),
        GroupDimension::Strategy => non_empty(record.strategy.as_ref()),
        GroupDimension::Weekday => Some(weekday_name(record.date.weekday()).to_string()),
        GroupDimension::Hour => record.entry_time_of_day().map(|t| format!("{:02}:00", t.hour())),
        GroupDimension::Direction => Some(record.direction.as_str().to_string()),
        GroupDimension::Month => Some(record.date.format("%Y-%m").to_string()),
        GroupDimension::Confidence => record
            .confidence
            .filter(|c| (1..=10).contains(c))
            .map(|c| c.to_string()),
    };
    key.unwrap_or_else(|| UNKNOWN_GROUP.to_string())
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn finite_decimal(value: Option<f64>) -> Option<Decimal> {
    value.filter(|v| v.is_finite()).and_then(Decimal::from_f64)
}

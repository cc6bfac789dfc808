//! Derived ratios. Every function here is pure and reads only aggregates,
//! never the trade list itself.

use crate::aggregate::Aggregates;
use chrono::{Datelike, NaiveDate};
use configuration::ScoringWeights;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A ratio whose denominator may legitimately be zero.
///
/// `Unbounded` is reported when there is something over nothing (e.g. profits
/// with no losses). It is kept apart from the numbers so that it can never be
/// averaged or summed by accident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Ratio {
    Finite(f64),
    Unbounded,
}

impl Ratio {
    pub const ZERO: Ratio = Ratio::Finite(0.0);

    /// `numerator / denominator`. A zero denominator gives `Unbounded` for a
    /// positive numerator and zero otherwise. A quotient too large for
    /// `Decimal` is treated the same way.
    pub fn of(numerator: Decimal, denominator: Decimal) -> Ratio {
        match numerator.checked_div(denominator) {
            Some(q) => Ratio::Finite(to_f64(q)),
            None if numerator > Decimal::ZERO => Ratio::Unbounded,
            None => Ratio::ZERO,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Ratio::Unbounded)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Finite(v) => Some(*v),
            Ratio::Unbounded => None,
        }
    }

    /// The value limited to `cap`; `Unbounded` maps to `cap`.
    pub fn capped(&self, cap: f64) -> f64 {
        match self {
            Ratio::Finite(v) => v.min(cap),
            Ratio::Unbounded => cap,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Finite(v) => write!(f, "{v:.2}"),
            Ratio::Unbounded => f.write_str("∞"),
        }
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn ratio_f64(numerator: Decimal, denominator: Decimal) -> f64 {
    to_f64(numerator) / to_f64(denominator)
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) }
}

/// Percentage of decisive trades that were winners. Breakeven trades are in
/// neither count.
pub fn win_rate(winners: usize, losers: usize) -> f64 {
    let decisive = winners + losers;
    if decisive == 0 {
        return 0.0;
    }
    winners as f64 / decisive as f64 * 100.0
}

pub fn profit_factor(gross_win: Decimal, gross_loss: Decimal) -> Ratio {
    Ratio::of(gross_win, gross_loss)
}

/// `sum / count`, zero for an empty set.
pub fn average(sum: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        sum / Decimal::from(count)
    }
}

pub fn risk_reward_ratio(avg_win: Decimal, avg_loss: Decimal) -> Ratio {
    Ratio::of(avg_win, avg_loss)
}

/// Average pnl per closed trade.
pub fn expectancy(total_pnl: Decimal, total_closed: usize) -> Decimal {
    average(total_pnl, total_closed)
}

pub fn recovery_factor(total_pnl: Decimal, max_drawdown: Decimal) -> Ratio {
    Ratio::of(total_pnl, max_drawdown)
}

pub fn max_drawdown_pct(max_drawdown: Decimal, peak: Decimal) -> f64 {
    if peak <= Decimal::ZERO {
        return 0.0;
    }
    ratio_f64(max_drawdown, peak) * 100.0
}

pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

pub fn population_std_dev(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let m = mean(samples);
    let variance = samples.iter().map(|x| (x - m).powi(2)).sum::<f64>() / samples.len() as f64;
    variance.sqrt()
}

/// Per-trade Sharpe: mean pnl over its population standard deviation.
pub fn sharpe_ratio(samples: &[f64]) -> f64 {
    let std_dev = population_std_dev(samples);
    if std_dev <= f64::EPSILON {
        return 0.0;
    }
    mean(samples) / std_dev
}

/// Per-trade Sortino: mean pnl over the deviation of below-mean samples,
/// measured about the mean.
pub fn sortino_ratio(samples: &[f64]) -> f64 {
    let m = mean(samples);
    let below: Vec<f64> = samples.iter().copied().filter(|x| *x < m).collect();
    if below.is_empty() {
        return 0.0;
    }
    let downside = (below.iter().map(|x| (x - m).powi(2)).sum::<f64>() / below.len() as f64).sqrt();
    if downside <= f64::EPSILON {
        return 0.0;
    }
    m / downside
}

/// Whole calendar months between two dates, never less than one.
pub fn months_spanned(first: NaiveDate, last: NaiveDate) -> u32 {
    let (first, last) = if first <= last { (first, last) } else { (last, first) };
    let mut months = (last.year() - first.year()) * 12 + last.month() as i32 - first.month() as i32;
    if last.day() < first.day() {
        months -= 1;
    }
    months.max(1) as u32
}

/// Total pnl scaled to a twelve-month equivalent, over max drawdown.
pub fn calmar_ratio(total_pnl: Decimal, max_drawdown: Decimal, months: u32) -> f64 {
    if max_drawdown <= Decimal::ZERO || months == 0 {
        return 0.0;
    }
    let annualized = to_f64(total_pnl) / months as f64 * 12.0;
    annualized / to_f64(max_drawdown)
}

/// Closed trades per month.
pub fn trading_frequency(total_closed: usize, months: u32) -> f64 {
    total_closed as f64 / months.max(1) as f64
}

/// Blend of drawdown relative to gross winnings and pnl dispersion, 0 to 100.
pub fn composite_risk_score(
    max_drawdown: Decimal,
    gross_win: Decimal,
    samples: &[f64],
    weights: &ScoringWeights,
) -> f64 {
    let drawdown_component = if gross_win > Decimal::ZERO {
        (ratio_f64(max_drawdown, gross_win) * 100.0).min(100.0)
    } else if max_drawdown > Decimal::ZERO {
        100.0
    } else {
        0.0
    };

    let abs_samples: Vec<f64> = samples.iter().map(|x| x.abs()).collect();
    let mean_abs = mean(&abs_samples);
    let volatility_component = if mean_abs > 0.0 {
        (50.0 * population_std_dev(samples) / mean_abs).min(100.0)
    } else {
        0.0
    };

    clamp_score(
        weights.drawdown_weight * drawdown_component
            + weights.volatility_weight * volatility_component,
    )
}

/// Blend of win rate, capped profit factor and inverted risk, 0 to 100.
pub fn composite_performance_score(
    win_rate: f64,
    profit_factor: Ratio,
    risk_score: f64,
    weights: &ScoringWeights,
) -> f64 {
    let cap = weights.profit_factor_cap;
    let profit_component = profit_factor.capped(cap).max(0.0) * (100.0 / cap);
    clamp_score(
        weights.win_rate_weight * win_rate
            + weights.profit_factor_weight * profit_component
            + weights.risk_weight * (100.0 - risk_score).max(0.0),
    )
}

/// All ratios of one report.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRatios {
    pub win_rate: f64,
    pub profit_factor: Ratio,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    pub risk_reward_ratio: Ratio,
    pub expectancy: Decimal,
    pub recovery_factor: Ratio,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub months_spanned: u32,
    pub calmar_ratio: f64,
    pub trading_frequency: f64,
    pub avg_r_multiple: f64,
    pub avg_holding_period_hours: f64,
    pub composite_risk_score: f64,
    pub composite_performance_score: f64,
}

impl DerivedRatios {
    pub fn from_aggregates(agg: &Aggregates, weights: &ScoringWeights) -> Self {
        let win_rate = win_rate(agg.winners, agg.losers);
        let profit_factor = profit_factor(agg.gross_win, agg.gross_loss);
        let avg_win = average(agg.gross_win, agg.winners);
        let avg_loss = average(agg.gross_loss, agg.losers);
        let months = match (agg.first_date, agg.last_date) {
            (Some(first), Some(last)) => months_spanned(first, last),
            _ => 0,
        };
        let risk = composite_risk_score(agg.max_drawdown, agg.gross_win, &agg.pnl_samples, weights);

        Self {
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            risk_reward_ratio: risk_reward_ratio(avg_win, avg_loss),
            expectancy: expectancy(agg.total_pnl, agg.total_closed),
            recovery_factor: recovery_factor(agg.total_pnl, agg.max_drawdown),
            max_drawdown_pct: max_drawdown_pct(agg.max_drawdown, agg.peak),
            sharpe_ratio: sharpe_ratio(&agg.pnl_samples),
            sortino_ratio: sortino_ratio(&agg.pnl_samples),
            months_spanned: months,
            calmar_ratio: calmar_ratio(agg.total_pnl, agg.max_drawdown, months),
            trading_frequency: if agg.total_closed == 0 {
                0.0
            } else {
                trading_frequency(agg.total_closed, months)
            },
            avg_r_multiple: if agg.r_trades == 0 {
                0.0
            } else {
                agg.r_multiple_sum / agg.r_trades as f64
            },
            avg_holding_period_hours: if agg.holding_trades == 0 {
                0.0
            } else {
                agg.holding_hours_sum / agg.holding_trades as f64
            },
            composite_risk_score: risk,
            composite_performance_score: composite_performance_score(win_rate, profit_factor, risk, weights),
        }
    }
}

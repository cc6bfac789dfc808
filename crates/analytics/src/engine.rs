use crate::aggregate::{Aggregates, GroupAccumulator, aggregate};
use crate::filter::{ReportFilter, select};
use crate::ratios::{DerivedRatios, win_rate};
use crate::report::{Advisory, GroupStat, GroupedPerformance, MetricsReport};
use crate::sequence::sequence;
use configuration::{Config, ScoringWeights};
use core_types::{GroupDimension, TradeRecord};
use std::collections::HashMap;

/// A stateless calculator for deriving performance metrics from journal trades.
///
/// Holds only settings, so one engine can serve any number of independent
/// calls, including calls from several threads at once.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    weights: ScoringWeights,
    dimensions: Vec<GroupDimension>,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        let config = Config::default();
        Self::new(config.scoring, config.report.group_by)
    }
}

impl MetricsEngine {
    pub fn new(weights: ScoringWeights, dimensions: Vec<GroupDimension>) -> Self {
        let mut dimensions = dimensions;
        dimensions.sort();
        dimensions.dedup();
        Self { weights, dimensions }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.scoring.clone(), config.report.group_by.clone())
    }

    /// Same settings, different grouping dimensions.
    pub fn with_dimensions(&self, dimensions: Vec<GroupDimension>) -> Self {
        Self::new(self.weights.clone(), dimensions)
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// `trades` may be in any order and may contain open or unpriced trades.
    /// This never fails: an empty selection gives the zeroed report, and an
    /// inverted filter window gives the zeroed report with an
    /// [`Advisory::InvalidFilter`] attached. Zeroed reports still carry one
    /// empty listing per grouping dimension.
    pub fn calculate(&self, trades: &[TradeRecord], filter: &ReportFilter) -> MetricsReport {
        if let Err(e) = filter.validate() {
            tracing::warn!(error = %e, "Rejecting report filter.");
            let mut report = self.empty_report(0);
            if let (Some(from), Some(to)) = (filter.from, filter.to) {
                report.advisories.push(Advisory::InvalidFilter { from, to });
            }
            return report;
        }

        let selection = select(trades, filter);
        let ordered = sequence(selection.eligible);
        let aggregates = aggregate(&ordered, &self.dimensions);
        if aggregates.total_closed == 0 {
            // If there are no closed trades, every ratio is zero or undefined.
            return self.empty_report(selection.in_scope);
        }

        let ratios = DerivedRatios::from_aggregates(&aggregates, &self.weights);
        let report = assemble(selection.in_scope, aggregates, ratios);

        tracing::debug!(
            total_trades = report.total_trades,
            total_closed = report.total_closed,
            total_pnl = %report.total_pnl,
            max_drawdown = %report.max_drawdown,
            "Metrics report calculated."
        );
        report
    }

    fn empty_report(&self, total_trades: usize) -> MetricsReport {
        MetricsReport {
            total_trades,
            grouped_performance: self
                .dimensions
                .iter()
                .map(|dimension| GroupedPerformance {
                    dimension: *dimension,
                    groups: Vec::new(),
                })
                .collect(),
            ..MetricsReport::new()
        }
    }
}

fn assemble(total_trades: usize, agg: Aggregates, ratios: DerivedRatios) -> MetricsReport {
    let net_pnl = agg
        .total_pnl
        .saturating_sub(agg.total_commission)
        .saturating_sub(agg.negative_swap);
    let grouped_performance = agg
        .groups
        .into_iter()
        .map(|(dimension, buckets)| GroupedPerformance {
            dimension,
            groups: ranked_groups(buckets),
        })
        .collect();

    MetricsReport {
        total_trades,
        total_closed: agg.total_closed,
        winners: agg.winners,
        losers: agg.losers,
        breakeven: agg.breakeven,
        total_pnl: agg.total_pnl,
        net_pnl,
        gross_win: agg.gross_win,
        gross_loss: agg.gross_loss,
        largest_win: agg.largest_win,
        largest_loss: agg.largest_loss,
        avg_win: ratios.avg_win,
        avg_loss: ratios.avg_loss,
        expectancy: ratios.expectancy,
        win_rate: ratios.win_rate,
        profit_factor: ratios.profit_factor,
        risk_reward_ratio: ratios.risk_reward_ratio,
        avg_r_multiple: ratios.avg_r_multiple,
        total_commissions: agg.total_commission,
        total_swap: agg.total_swap,
        total_spread: agg.total_spread,
        total_pips: agg.total_pips,
        pip_trades: agg.pip_trades,
        peak_equity: agg.peak,
        max_drawdown: agg.max_drawdown,
        max_drawdown_pct: ratios.max_drawdown_pct,
        recovery_factor: ratios.recovery_factor,
        sharpe_ratio: ratios.sharpe_ratio,
        sortino_ratio: ratios.sortino_ratio,
        calmar_ratio: ratios.calmar_ratio,
        max_win_streak: agg.streaks.max_wins,
        max_loss_streak: agg.streaks.max_losses,
        current_streak: agg.streaks.current(),
        first_date: agg.first_date,
        last_date: agg.last_date,
        months_spanned: ratios.months_spanned,
        trading_frequency: ratios.trading_frequency,
        avg_holding_period_hours: ratios.avg_holding_period_hours,
        composite_performance_score: ratios.composite_performance_score,
        composite_risk_score: ratios.composite_risk_score,
        equity_curve: agg.equity_curve,
        drawdown_series: agg.drawdown_series,
        grouped_performance,
        advisories: Vec::new(),
    }
}

/// Buckets sorted by total pnl descending, ties broken alphabetically.
fn ranked_groups(buckets: HashMap<String, GroupAccumulator>) -> Vec<GroupStat> {
    let mut groups: Vec<GroupStat> = buckets
        .into_iter()
        .map(|(group_key, acc)| GroupStat {
            group_key,
            count: acc.count,
            win_rate: win_rate(acc.wins, acc.losses),
            total_pnl: acc.total_pnl,
            total_pips: acc.total_pips,
        })
        .collect();
    groups.sort_by(|a, b| {
        b.total_pnl
            .cmp(&a.total_pnl)
            .then_with(|| a.group_key.cmp(&b.group_key))
    });
    groups
}

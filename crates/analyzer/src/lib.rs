use crate::error::AnalyzerError;
use analytics::{MetricsEngine, MetricsReport, ReportFilter};
use configuration::AnalysisConfig;
use core_types::TradeRecord;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub mod error;

/// Shard name for trades that carry no account id.
pub const UNASSIGNED_ACCOUNT: &str = "Unassigned";

/// One account's report together with its place in the ranking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAccount {
    pub account_id: String,
    /// The account's composite performance score, 0 to 100.
    pub score: f64,
    /// The score min-max normalized across the ranked accounts, 0 to 1.
    pub relative_score: f64,
    pub report: MetricsReport,
}

/// Compares accounts by running the metrics engine once per account.
pub struct AccountAnalyzer {
    engine: MetricsEngine,
    config: AnalysisConfig,
}

impl AccountAnalyzer {
    pub fn new(engine: MetricsEngine, config: AnalysisConfig) -> Self {
        Self { engine, config }
    }

    /// Shards, scores, filters, and ranks all accounts present in `trades`.
    pub fn run(
        &self,
        trades: &[TradeRecord],
        filter: &ReportFilter,
    ) -> Result<Vec<RankedAccount>, AnalyzerError> {
        filter.validate()?;
        if trades.is_empty() {
            return Err(AnalyzerError::NoTrades);
        }

        // 1. Shard
        let shards = shard_by_account(trades, filter.account_id.as_deref());
        let shard_count = shards.len();

        // 2. Compute. Shards share nothing, so they run in parallel.
        let window = ReportFilter {
            account_id: None,
            ..filter.clone()
        };
        let reports: Vec<(String, MetricsReport)> = shards
            .into_par_iter()
            .map(|(account_id, shard)| {
                let report = self.engine.calculate(&shard, &window);
                (account_id, report)
            })
            .collect();

        // 3. Filter
        let qualified: Vec<(String, MetricsReport)> = reports
            .into_iter()
            .filter(|(_, r)| r.total_closed > 0 && r.total_closed >= self.config.min_closed_trades)
            .collect();

        tracing::info!(
            accounts = shard_count,
            qualified = qualified.len(),
            "Finished scoring accounts."
        );
        if qualified.is_empty() {
            return Ok(vec![]); // Return empty if all were filtered out
        }

        // 4. Score and rank
        let (min, max) = find_min_max(&qualified, |r| r.composite_performance_score);
        let mut ranked: Vec<RankedAccount> = qualified
            .into_iter()
            .map(|(account_id, report)| RankedAccount {
                score: report.composite_performance_score,
                relative_score: normalize(report.composite_performance_score, min, max),
                account_id,
                report,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.account_id.cmp(&b.account_id))
        });

        Ok(ranked)
    }
}

/// Groups trades by account id. When `only` is set, other accounts are skipped.
fn shard_by_account(trades: &[TradeRecord], only: Option<&str>) -> BTreeMap<String, Vec<TradeRecord>> {
    let mut shards: BTreeMap<String, Vec<TradeRecord>> = BTreeMap::new();
    for trade in trades {
        let account = trade
            .account_id
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(UNASSIGNED_ACCOUNT);
        if only.is_some_and(|wanted| trade.account_id.as_deref() != Some(wanted)) {
            continue;
        }
        shards.entry(account.to_string()).or_default().push(trade.clone());
    }
    shards
}

/// A helper function to find the min and max of a specific metric across reports.
fn find_min_max<F>(reports: &[(String, MetricsReport)], accessor: F) -> (f64, f64)
where
    F: Fn(&MetricsReport) -> f64,
{
    reports
        .iter()
        .map(|(_, r)| accessor(r))
        .fold((f64::MAX, f64::MIN), |(min, max), val| (min.min(val), max.max(val)))
}

/// Normalizes a value to a 0.0-1.0 scale.
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if (max - min).abs() <= f64::EPSILON {
        return 1.0; // Avoid division by zero if all values are the same
    }
    (value - min) / (max - min)
}

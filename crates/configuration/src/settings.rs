use core_types::GroupDimension;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scoring: ScoringWeights,
    pub report: ReportSettings,
    pub analysis: AnalysisConfig,
    pub logging: LoggingSettings,
}

/// Weights for the composite performance and risk scores.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Share of the performance score taken by the win rate.
    pub win_rate_weight: f64,
    /// Share of the performance score taken by the (capped) profit factor.
    pub profit_factor_weight: f64,
    /// Share of the performance score taken by `100 - risk score`.
    pub risk_weight: f64,
    /// Profit factors above this are treated as equal to it. An unbounded
    /// profit factor also maps to the cap.
    pub profit_factor_cap: f64,
    /// Share of the risk score taken by the normalized max drawdown.
    pub drawdown_weight: f64,
    /// Share of the risk score taken by pnl volatility.
    pub volatility_weight: f64,
}

/// Settings for the shape of a generated report.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub group_by: Vec<GroupDimension>,
}

/// Rules for ranking accounts against each other.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Accounts with fewer closed trades than this are left out of the ranking.
    pub min_closed_trades: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Fallback filter directive when `RUST_LOG` is not set.
    pub level: String,
}

// --- Default Implementations ---
// This allows a user to omit any section from their toml
// and still have it work with sensible defaults.

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            win_rate_weight: 0.3,
            profit_factor_weight: 0.4,
            risk_weight: 0.3,
            profit_factor_cap: 10.0,
            drawdown_weight: 0.6,
            volatility_weight: 0.4,
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            group_by: vec![
                GroupDimension::Symbol,
                GroupDimension::Session,
                GroupDimension::Weekday,
                GroupDimension::Hour,
                GroupDimension::Timeframe,
            ],
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { min_closed_trades: 1 }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

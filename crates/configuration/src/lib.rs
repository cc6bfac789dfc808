use crate::error::ConfigError;
use config::{Environment, File, FileFormat};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{AnalysisConfig, Config, LoggingSettings, ReportSettings, ScoringWeights};

/// The file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tradelog.toml";

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Loads the application configuration.
///
/// Sources are layered: built-in defaults, then the TOML file at `path` (or
/// `tradelog.toml` if it exists), then `TRADELOG__SECTION__KEY` environment
/// variables. An explicitly passed path must exist.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) => File::from(p).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("TRADELOG")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("report.group_by")
                .try_parsing(true),
        )
        .build()?;

    finish(builder)
}

/// Parses configuration from an in-memory TOML document.
pub fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;
    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

impl Config {
    /// Checks the cross-field rules that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.scoring;
        let weights = [
            ("win_rate_weight", w.win_rate_weight),
            ("profit_factor_weight", w.profit_factor_weight),
            ("risk_weight", w.risk_weight),
            ("drawdown_weight", w.drawdown_weight),
            ("volatility_weight", w.volatility_weight),
        ];
        if let Some((name, value)) = weights.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "scoring.{name} must be a non-negative number, got {value}"
            )));
        }

        let performance_sum = w.win_rate_weight + w.profit_factor_weight + w.risk_weight;
        if (performance_sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::ValidationError(format!(
                "performance score weights must sum to 1.0, got {performance_sum}"
            )));
        }

        let risk_sum = w.drawdown_weight + w.volatility_weight;
        if (risk_sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::ValidationError(format!(
                "risk score weights must sum to 1.0, got {risk_sum}"
            )));
        }

        if !(w.profit_factor_cap.is_finite() && w.profit_factor_cap > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "scoring.profit_factor_cap must be positive, got {}",
                w.profit_factor_cap
            )));
        }

        Ok(())
    }
}

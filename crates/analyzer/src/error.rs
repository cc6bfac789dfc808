use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("No trades supplied for account analysis")]
    NoTrades,
}

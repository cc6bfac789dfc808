use analytics::{MetricsEngine, MetricsReport, ReportFilter};
use analyzer::{AccountAnalyzer, RankedAccount};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use configuration::load_config;
use core_types::{GroupDimension, TradeRecord};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the Tradelog command-line tool.
fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    let result = match cli.command {
        Commands::Report(args) => handle_report(args),
        Commands::Accounts(args) => handle_accounts(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance analytics over an exported trading journal.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the metrics report for a selection of trades.
    Report(ReportArgs),
    /// Compute one report per account and rank the accounts.
    Accounts(CommonArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Path to a JSON array of trade records.
    #[arg(long)]
    trades: PathBuf,

    /// First date to include (format: YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// First date to exclude (format: YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Restrict to a single account id.
    #[arg(long)]
    account: Option<String>,

    /// Configuration file. Defaults to `tradelog.toml` if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ReportArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Grouping dimension (repeatable). Overrides the configured list.
    #[arg(long = "group-by")]
    group_by: Vec<GroupDimension>,
}

impl CommonArgs {
    fn filter(&self) -> ReportFilter {
        ReportFilter {
            from: self.from,
            to: self.to,
            account_id: self.account.clone(),
        }
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_report(args: ReportArgs) -> anyhow::Result<()> {
    let config = load_config(args.common.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging.level)?;

    let trades = read_trades(&args.common.trades)?;
    let mut engine = MetricsEngine::from_config(&config);
    if !args.group_by.is_empty() {
        engine = engine.with_dimensions(args.group_by);
    }

    let report = engine.calculate(&trades, &args.common.filter());
    for advisory in &report.advisories {
        tracing::warn!(?advisory, "Report request was not honoured.");
    }

    if args.common.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn handle_accounts(args: CommonArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging.level)?;

    let trades = read_trades(&args.trades)?;
    // Group tables are not shown in the ranking, so skip building them.
    let engine = MetricsEngine::from_config(&config).with_dimensions(Vec::new());
    let analyzer = AccountAnalyzer::new(engine, config.analysis.clone());
    let ranked = analyzer.run(&trades, &args.filter())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    } else {
        print_ranking(&ranked);
    }
    Ok(())
}

/// `RUST_LOG` wins; otherwise the configured level applies.
fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("Invalid log filter")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn read_trades(path: &Path) -> anyhow::Result<Vec<TradeRecord>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let trades: Vec<TradeRecord> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse trades from {}", path.display()))?;
    tracing::info!(count = trades.len(), path = %path.display(), "Loaded trades.");
    Ok(trades)
}

// ==============================================================================
// Output
// ==============================================================================

fn print_report(report: &MetricsReport) {
    let mut summary = Table::new();
    summary.set_header(vec!["Metric", "Value"]);
    let rows: Vec<(&str, String)> = vec![
        ("Total trades", report.total_trades.to_string()),
        ("Closed trades", report.total_closed.to_string()),
        ("Winners / Losers / Breakeven", format!("{} / {} / {}", report.winners, report.losers, report.breakeven)),
        ("Win rate", format!("{:.1}%", report.win_rate)),
        ("Total P&L", format!("{:.2}", report.total_pnl)),
        ("Net P&L", format!("{:.2}", report.net_pnl)),
        ("Commissions", format!("{:.2}", report.total_commissions)),
        ("Profit factor", report.profit_factor.to_string()),
        ("Avg win / Avg loss", format!("{:.2} / {:.2}", report.avg_win, report.avg_loss)),
        ("Risk/reward", report.risk_reward_ratio.to_string()),
        ("Expectancy", format!("{:.2}", report.expectancy)),
        ("Largest win / loss", format!("{:.2} / {:.2}", report.largest_win, report.largest_loss)),
        ("Max drawdown", format!("{:.2} ({:.1}%)", report.max_drawdown, report.max_drawdown_pct)),
        ("Recovery factor", report.recovery_factor.to_string()),
        ("Sharpe / Sortino / Calmar", format!("{:.2} / {:.2} / {:.2}", report.sharpe_ratio, report.sortino_ratio, report.calmar_ratio)),
        ("Max win / loss streak", format!("{} / {}", report.max_win_streak, report.max_loss_streak)),
        ("Trades per month", format!("{:.1}", report.trading_frequency)),
        ("Avg holding (h)", format!("{:.1}", report.avg_holding_period_hours)),
        ("Avg R-multiple", format!("{:.2}", report.avg_r_multiple)),
        ("Total pips", format!("{:.1}", report.total_pips)),
        ("Performance score", format!("{:.1}", report.composite_performance_score)),
        ("Risk score", format!("{:.1}", report.composite_risk_score)),
    ];
    for (name, value) in rows {
        summary.add_row(vec![name.to_string(), value]);
    }
    println!("{summary}");

    for grouped in &report.grouped_performance {
        let mut table = Table::new();
        table.set_header(vec![grouped.dimension.as_str(), "Trades", "Win rate", "P&L", "Pips"]);
        for group in &grouped.groups {
            table.add_row(vec![
                group.group_key.clone(),
                group.count.to_string(),
                format!("{:.1}%", group.win_rate),
                format!("{:.2}", group.total_pnl),
                format!("{:.1}", group.total_pips),
            ]);
        }
        println!("\n{table}");
    }
}

fn print_ranking(ranked: &[RankedAccount]) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Account", "Score", "Relative", "Trades", "Win rate", "P&L", "Max DD"]);
    for (i, account) in ranked.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            account.account_id.clone(),
            format!("{:.1}", account.score),
            format!("{:.2}", account.relative_score),
            account.report.total_closed.to_string(),
            format!("{:.1}%", account.report.win_rate),
            format!("{:.2}", account.report.total_pnl),
            format!("{:.2}", account.report.max_drawdown),
        ]);
    }
    println!("{table}");
}

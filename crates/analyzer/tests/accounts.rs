use analytics::{MetricsEngine, ReportFilter};
use analyzer::error::AnalyzerError;
use analyzer::{AccountAnalyzer, UNASSIGNED_ACCOUNT};
use chrono::NaiveDate;
use configuration::AnalysisConfig;
use core_types::TradeRecord;
use rust_decimal::Decimal;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn trade(id: &str, account: Option<&str>, day: u32, pnl: f64) -> TradeRecord {
    let mut t = TradeRecord::closed(id, "EURUSD", date(3, day), pnl);
    t.account_id = account.map(str::to_string);
    t
}

fn analyzer(min_closed_trades: usize) -> AccountAnalyzer {
    AccountAnalyzer::new(MetricsEngine::default(), AnalysisConfig { min_closed_trades })
}

fn journal() -> Vec<TradeRecord> {
    vec![
        trade("a1", Some("steady"), 1, 50.0),
        trade("a2", Some("steady"), 2, 40.0),
        trade("a3", Some("steady"), 3, -10.0),
        trade("b1", Some("choppy"), 1, -80.0),
        trade("b2", Some("choppy"), 2, 30.0),
        trade("b3", Some("choppy"), 3, -60.0),
        trade("c1", None, 4, 5.0),
    ]
}

#[test]
fn ranks_accounts_by_composite_score() {
    let ranked = analyzer(1).run(&journal(), &ReportFilter::new()).unwrap();
    let ids: Vec<_> = ranked.iter().map(|r| r.account_id.as_str()).collect();

    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&UNASSIGNED_ACCOUNT));
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    let steady = ranked.iter().position(|r| r.account_id == "steady").unwrap();
    let choppy = ranked.iter().position(|r| r.account_id == "choppy").unwrap();
    assert!(steady < choppy);
    assert_eq!(ranked.last().unwrap().relative_score, 0.0);
    assert_eq!(ranked[0].relative_score, 1.0);
}

#[test]
fn per_account_reports_match_direct_engine_calls() {
    let trades = journal();
    let ranked = analyzer(1).run(&trades, &ReportFilter::new()).unwrap();
    let engine = MetricsEngine::default();
    for account in ranked.iter().filter(|r| r.account_id != UNASSIGNED_ACCOUNT) {
        let direct = engine.calculate(&trades, &ReportFilter::new().for_account(account.account_id.clone()));
        assert_eq!(account.report, direct);
    }
}

#[test]
fn minimum_trade_count_excludes_small_accounts() {
    let ranked = analyzer(2).run(&journal(), &ReportFilter::new()).unwrap();
    assert!(ranked.iter().all(|r| r.account_id != UNASSIGNED_ACCOUNT));
    assert!(analyzer(10).run(&journal(), &ReportFilter::new()).unwrap().is_empty());
}

#[test]
fn account_filter_limits_to_one_shard() {
    let ranked = analyzer(1)
        .run(&journal(), &ReportFilter::new().for_account("choppy"))
        .unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].report.total_pnl, Decimal::from(-110));
    assert_eq!(ranked[0].relative_score, 1.0);
}

#[test]
fn window_applies_inside_each_shard() {
    let filter = ReportFilter::between(date(3, 2), date(3, 3));
    let ranked = analyzer(1).run(&journal(), &filter).unwrap();
    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|r| r.report.total_closed == 1));
}

#[test]
fn rejects_empty_input_and_inverted_window() {
    assert!(matches!(
        analyzer(1).run(&[], &ReportFilter::new()),
        Err(AnalyzerError::NoTrades)
    ));
    assert!(matches!(
        analyzer(1).run(&journal(), &ReportFilter::between(date(4, 1), date(3, 1))),
        Err(AnalyzerError::Analytics(_))
    ));
}

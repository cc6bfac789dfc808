//! Property-based tests using proptest
//!
//! These tests check the invariants of the metrics pipeline over random
//! journals.

use analytics::{MetricsEngine, MetricsReport, ReportFilter, UNKNOWN_GROUP};
use chrono::NaiveDate;
use core_types::{GroupDimension, TradeRecord, TradeStatus};
use proptest::prelude::*;
use rust_decimal::Decimal;

const SESSIONS: [&str; 3] = ["Asian", "London", "New York"];
const SYMBOLS: [&str; 4] = ["EURUSD", "GBPUSD", "XAUUSD", ""];

fn all_dimensions_engine() -> MetricsEngine {
    MetricsEngine::default().with_dimensions(GroupDimension::ALL.to_vec())
}

prop_compose! {
    fn arb_trade(id: String, days: i64)(
        day in 0i64..days,
        minute in proptest::option::of(0u32..1440),
        pnl_cents in -500_000i64..500_000,
        closed in proptest::bool::weighted(0.9),
        has_pnl in proptest::bool::weighted(0.95),
        symbol in 0usize..SYMBOLS.len(),
        session in proptest::option::of(0usize..SESSIONS.len()),
        pips in proptest::option::of(-200.0f64..200.0),
        confidence in proptest::option::of(0u8..12),
    ) -> TradeRecord {
        let base = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let mut trade = TradeRecord::closed(
            id.clone(),
            SYMBOLS[symbol],
            base + chrono::Duration::days(day),
            pnl_cents as f64 / 100.0,
        );
        trade.entry_time = minute.map(|m| format!("{:02}:{:02}", m / 60, m % 60));
        trade.session = session.map(|s| SESSIONS[s].to_string());
        trade.pips = pips;
        trade.confidence = confidence;
        if !closed {
            trade.status = TradeStatus::Open;
        }
        if !has_pnl {
            trade.pnl = None;
        }
        trade
    }
}

fn arb_journal() -> impl Strategy<Value = Vec<TradeRecord>> {
    (0usize..60).prop_flat_map(|n| {
        (0..n)
            .map(|i| arb_trade(format!("t{i:04}"), 400))
            .collect::<Vec<_>>()
    })
}

/// Few ids over few days, so date, entry time and id often all collide.
fn arb_colliding_journal() -> impl Strategy<Value = Vec<TradeRecord>> {
    (0usize..30).prop_flat_map(|n| {
        (0..n)
            .map(|i| arb_trade(format!("dup{}", i % 3), 3))
            .collect::<Vec<_>>()
    })
}

fn calculate(trades: &[TradeRecord]) -> MetricsReport {
    all_dimensions_engine().calculate(trades, &ReportFilter::new())
}

proptest! {
    #[test]
    fn report_is_deterministic(trades in arb_journal()) {
        prop_assert_eq!(calculate(&trades), calculate(&trades));
    }

    #[test]
    fn input_permutation_does_not_change_report(
        (trades, shuffled) in arb_journal().prop_flat_map(|t| {
            let shuffled = Just(t.clone()).prop_shuffle();
            (Just(t), shuffled)
        })
    ) {
        prop_assert_eq!(calculate(&trades), calculate(&shuffled));
    }

    #[test]
    fn repeated_ids_do_not_make_the_report_order_dependent(
        (trades, shuffled) in arb_colliding_journal().prop_flat_map(|t| {
            let shuffled = Just(t.clone()).prop_shuffle();
            (Just(t), shuffled)
        })
    ) {
        prop_assert_eq!(calculate(&trades), calculate(&shuffled));
    }

    #[test]
    fn peak_is_monotonic_and_drawdown_non_negative(trades in arb_journal()) {
        let report = calculate(&trades);
        let mut previous_peak = Decimal::ZERO;
        let mut max_seen = Decimal::ZERO;
        prop_assert_eq!(report.equity_curve.len(), report.drawdown_series.len());
        for (point, dd) in report.equity_curve.iter().zip(&report.drawdown_series) {
            prop_assert_eq!(point.sequence_index, dd.sequence_index);
            prop_assert!(dd.peak >= previous_peak);
            prop_assert!(dd.peak >= point.cumulative_pnl);
            prop_assert_eq!(dd.drawdown, dd.peak - point.cumulative_pnl);
            prop_assert!(dd.drawdown >= Decimal::ZERO);
            previous_peak = dd.peak;
            max_seen = max_seen.max(dd.drawdown);
        }
        prop_assert_eq!(report.max_drawdown, max_seen);
    }

    #[test]
    fn bounded_percentages_and_scores(trades in arb_journal()) {
        let report = calculate(&trades);
        prop_assert!((0.0..=100.0).contains(&report.win_rate));
        prop_assert!((0.0..=100.0).contains(&report.composite_performance_score));
        prop_assert!((0.0..=100.0).contains(&report.composite_risk_score));
        prop_assert!(report.total_closed <= report.total_trades);
        prop_assert_eq!(report.winners + report.losers + report.breakeven, report.total_closed);
        if report.total_closed == 0 {
            prop_assert_eq!(report.win_rate, 0.0);
        }
    }

    #[test]
    fn every_dimension_accounts_for_every_closed_trade(trades in arb_journal()) {
        let report = calculate(&trades);
        prop_assert_eq!(report.grouped_performance.len(), GroupDimension::ALL.len());
        for grouped in &report.grouped_performance {
            let count: usize = grouped.groups.iter().map(|g| g.count).sum();
            prop_assert_eq!(count, report.total_closed);
            let pnl: Decimal = grouped.groups.iter().map(|g| g.total_pnl).sum();
            prop_assert_eq!(pnl, report.total_pnl);
            for pair in grouped.groups.windows(2) {
                prop_assert!(
                    pair[0].total_pnl > pair[1].total_pnl
                        || (pair[0].total_pnl == pair[1].total_pnl && pair[0].group_key < pair[1].group_key)
                );
            }
        }
    }

    #[test]
    fn streaks_never_exceed_their_class(trades in arb_journal()) {
        let report = calculate(&trades);
        prop_assert!(report.max_win_streak <= report.winners);
        prop_assert!(report.max_loss_streak <= report.losers);
        prop_assert!(report.current_streak.unsigned_abs() as usize <= report.max_win_streak.max(report.max_loss_streak));
    }
}

#[test]
fn streak_scenario_from_journal() {
    let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    let trades: Vec<_> = [10.0, 20.0, -5.0, -5.0, -5.0, 1.0]
        .iter()
        .enumerate()
        .map(|(i, pnl)| {
            let mut t = TradeRecord::closed(format!("s{i}"), "EURUSD", day, *pnl);
            t.entry_time = Some(format!("{:02}:00", 8 + i));
            t
        })
        .collect();
    let report = calculate(&trades);
    assert_eq!(report.max_win_streak, 2);
    assert_eq!(report.max_loss_streak, 3);
    assert_eq!(report.current_streak, 1);
}

#[test]
fn window_and_account_restrict_the_report() {
    let d = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
    let mut trades = vec![
        TradeRecord::closed("jan", "EURUSD", d(1, 15), 100.0),
        TradeRecord::closed("feb", "EURUSD", d(2, 15), -40.0),
        TradeRecord::closed("mar", "EURUSD", d(3, 15), 60.0),
    ];
    trades[1].account_id = Some("funded".into());
    trades[2].account_id = Some("funded".into());

    let engine = all_dimensions_engine();
    let window = engine.calculate(&trades, &ReportFilter::between(d(2, 1), d(3, 15)));
    assert_eq!(window.total_closed, 1);
    assert_eq!(window.total_pnl, Decimal::from(-40));

    let account = engine.calculate(&trades, &ReportFilter::new().for_account("funded"));
    assert_eq!(account.total_closed, 2);
    assert_eq!(account.total_pnl, Decimal::from(20));
    let hours = account.group(GroupDimension::Hour).unwrap();
    assert_eq!(hours.groups.len(), 1);
    assert_eq!(hours.groups[0].group_key, UNKNOWN_GROUP);
}

#[test]
fn report_serializes_for_the_ui_layer() {
    let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let trades = vec![
        TradeRecord::closed("a", "EURUSD", d, 100.0),
        TradeRecord::closed("b", "EURUSD", d, 50.0),
    ];
    let report = calculate(&trades);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["profitFactor"]["kind"], "unbounded");
    assert_eq!(json["equityCurve"][1]["tradeId"], "b");
    assert_eq!(json["equityCurve"][0]["date"], "2024-01-02");
    let back: MetricsReport = serde_json::from_value(json).unwrap();
    assert_eq!(back.total_pnl, report.total_pnl);
    assert_eq!(back.equity_curve, report.equity_curve);
    assert!(back.profit_factor.is_unbounded());
}

use crate::filter::EligibleTrade;
use std::cmp::Ordering;

/// Orders trades chronologically for curve and streak calculations.
///
/// Key: date ascending, then entry time ascending with trades lacking a
/// parseable entry time placed after those that have one on the same date,
/// then trade id. Remaining ties, such as a repeated id, fall back to the
/// pnl and the other fields that feed the metrics, so the result does not
/// depend on the input order.
pub fn sequence(mut trades: Vec<EligibleTrade<'_>>) -> Vec<EligibleTrade<'_>> {
    trades.sort_by(compare);
    trades
}

fn compare(a: &EligibleTrade<'_>, b: &EligibleTrade<'_>) -> Ordering {
    let (x, y) = (a.record, b.record);
    x.date
        .cmp(&y.date)
        .then_with(|| match (x.entry_time_of_day(), y.entry_time_of_day()) {
            (Some(p), Some(q)) => p.cmp(&q),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| x.id.cmp(&y.id))
        .then_with(|| a.pnl.cmp(&b.pnl))
        .then_with(|| x.entry_time.cmp(&y.entry_time))
        .then_with(|| x.exit_time.cmp(&y.exit_time))
        .then_with(|| compare_f64(x.pips, y.pips))
        .then_with(|| compare_f64(x.risk_amount, y.risk_amount))
        .then_with(|| x.symbol.cmp(&y.symbol))
        .then_with(|| x.account_id.cmp(&y.account_id))
}

fn compare_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (x, y) => x.is_some().cmp(&y.is_some()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::TradeRecord;
    use rust_decimal::Decimal;
    use rust_decimal::prelude::FromPrimitive;

    fn trade(id: &str, day: u32, entry: Option<&str>) -> TradeRecord {
        let mut t = TradeRecord::closed(id, "NQ", NaiveDate::from_ymd_opt(2024, 2, day).unwrap(), 1.0);
        t.entry_time = entry.map(str::to_string);
        t
    }

    fn ids(records: &[TradeRecord]) -> Vec<String> {
        let eligible = records
            .iter()
            .map(|r| EligibleTrade { record: r, pnl: Decimal::ONE })
            .collect();
        sequence(eligible).into_iter().map(|t| t.record.id.clone()).collect()
    }

    #[test]
    fn test_orders_by_date_then_entry_time_then_id() {
        let records = vec![
            trade("d", 2, None),
            trade("c", 2, Some("14:00")),
            trade("b", 2, Some("09:15")),
            trade("a", 1, None),
            trade("f", 2, None),
            trade("e", 2, Some("09:15")),
        ];
        assert_eq!(ids(&records), vec!["a", "b", "e", "c", "d", "f"]);
    }

    #[test]
    fn test_unparseable_entry_time_sorts_as_missing() {
        let records = vec![trade("x", 3, Some("late morning")), trade("y", 3, Some("23:59"))];
        assert_eq!(ids(&records), vec!["y", "x"]);
    }

    #[test]
    fn test_reversed_input_gives_same_order() {
        let mut records = vec![
            trade("t3", 5, Some("10:00")),
            trade("t1", 4, None),
            trade("t2", 5, None),
            trade("t0", 4, Some("08:00")),
        ];
        let forward = ids(&records);
        records.reverse();
        assert_eq!(ids(&records), forward);
    }

    #[test]
    fn test_repeated_id_is_ordered_by_pnl() {
        let mut win = trade("dup", 6, None);
        win.pnl = Some(100.0);
        let mut loss = trade("dup", 6, None);
        loss.pnl = Some(-50.0);
        let order = |records: &[&TradeRecord]| -> Vec<Decimal> {
            let eligible = records
                .iter()
                .map(|r| EligibleTrade { record: *r, pnl: Decimal::from_f64(r.pnl.unwrap_or(0.0)).unwrap() })
                .collect();
            sequence(eligible).into_iter().map(|t| t.pnl).collect()
        };
        let forward = order(&[&win, &loss]);
        assert_eq!(forward, vec![Decimal::from(-50), Decimal::from(100)]);
        assert_eq!(order(&[&loss, &win]), forward);
    }
}

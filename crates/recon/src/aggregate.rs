use std::collections::{BTreeMap, BTreeSet};

use crate::model::{MovementRecord, OutletRollup, StockStatus};

/// Group records by outlet, count mismatches, sum gaps, collect distinct items.
pub fn aggregate_by_outlet(records: &[MovementRecord]) -> Vec<OutletRollup> {
    let mut groups: BTreeMap<&str, (usize, usize, i64, BTreeSet<&str>)> = BTreeMap::new();

    for record in records {
        let entry = groups
            .entry(record.outlet.as_str())
            .or_insert_with(|| (0, 0, 0, BTreeSet::new()));
        entry.0 += 1;
        if record.status == StockStatus::Mismatch {
            entry.1 += 1;
        }
        entry.2 = entry.2.saturating_add(record.gap_qty);
        entry.3.insert(record.item.as_str());
    }

    groups
        .into_iter()
        .map(|(outlet, (count, mismatched, total_gap, items))| OutletRollup {
            outlet: outlet.to_string(),
            record_count: count,
            mismatched,
            total_gap,
            items: items.into_iter().map(str::to_string).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(outlet: &str, item: &str, gap: i64) -> MovementRecord {
        MovementRecord {
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            outlet: outlet.into(),
            supervisor: String::new(),
            city: String::new(),
            item: item.into(),
            opening_stock: 0,
            inbound_qty: 0,
            consumed_qty: 0,
            returned_qty: 0,
            expected_usage_qty: 0,
            closing_stock: gap,
            expected_closing_stock: 0,
            gap_qty: gap,
            status: if gap == 0 { StockStatus::Match } else { StockStatus::Mismatch },
            upstream_status: None,
        }
    }

    #[test]
    fn basic_rollup() {
        let records = vec![
            record("Kemang", "Kopi", 0),
            record("Kemang", "Teh", -3),
            record("Kemang", "Kopi", 1),
        ];
        let rollup = aggregate_by_outlet(&records);
        assert_eq!(rollup.len(), 1);
        assert_eq!(rollup[0].record_count, 3);
        assert_eq!(rollup[0].mismatched, 2);
        assert_eq!(rollup[0].total_gap, -2);
        assert_eq!(rollup[0].items, vec!["Kopi", "Teh"]);
    }

    #[test]
    fn outlets_sorted_by_name() {
        let records = vec![record("Menteng", "Kopi", 0), record("Depok", "Kopi", 2)];
        let rollup = aggregate_by_outlet(&records);
        assert_eq!(rollup[0].outlet, "Depok");
        assert_eq!(rollup[0].mismatched, 1);
        assert_eq!(rollup[1].outlet, "Menteng");
        assert_eq!(rollup[1].mismatched, 0);
    }
}

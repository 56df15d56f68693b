use crate::aggregate::aggregate_by_outlet;
use crate::model::{MovementRecord, MovementSummary, StockStatus};

/// Number of MISMATCH records. Order-independent.
pub fn aggregate_mismatch_count(records: &[MovementRecord]) -> usize {
    records
        .iter()
        .filter(|r| r.status == StockStatus::Mismatch)
        .count()
}

/// Compute summary statistics from reconciled records.
pub fn compute_summary(records: &[MovementRecord]) -> MovementSummary {
    let mismatched = aggregate_mismatch_count(records);

    MovementSummary {
        total: records.len(),
        matched: records.len() - mismatched,
        mismatched,
        shortage_rows: records.iter().filter(|r| r.is_shortage()).count(),
        total_gap: records.iter().fold(0i64, |acc, r| acc.saturating_add(r.gap_qty)),
        upstream_disagreements: records.iter().filter(|r| r.disagrees_with_upstream()).count(),
        outlets: aggregate_by_outlet(records),
    }
}

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::{ColumnMapping, MatchPolicy, ReconConfig};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::filter::MovementFilter;
use crate::model::{
    BatchOutcome, MovementMeta, MovementRecord, MovementResult, RawMovement, SkippedRow,
    StockStatus,
};
use crate::quantity::{normalize_qty, parse_qty};

/// Reconcile one raw row under `policy`.
///
/// Quantities are rounded half-to-even first; the gap is computed from the
/// rounded operands, so under `ClosingStock` a zero gap is exactly MATCH.
pub fn reconcile(raw: &RawMovement, policy: MatchPolicy) -> Result<MovementRecord, ReconError> {
    let date = raw.date.ok_or(ReconError::InvalidRecord { row: None, field: "date" })?;
    let outlet = identity(&raw.outlet, "outlet")?;
    let item = identity(&raw.item, "item")?;

    let opening_stock = normalize_qty(raw.opening_stock);
    let inbound_qty = normalize_qty(raw.inbound_qty);
    let consumed_qty = normalize_qty(raw.consumed_qty);
    let returned_qty = normalize_qty(raw.returned_qty);
    let expected_usage_qty = normalize_qty(raw.expected_usage_qty);
    let closing_stock = normalize_qty(raw.closing_stock);
    let expected_closing_stock = normalize_qty(raw.expected_closing_stock);

    let gap_qty = closing_stock.saturating_sub(expected_closing_stock);

    let equal = match policy {
        MatchPolicy::ClosingStock => closing_stock == expected_closing_stock,
        MatchPolicy::Consumption => consumed_qty == expected_usage_qty,
    };
    let status = if equal { StockStatus::Match } else { StockStatus::Mismatch };

    Ok(MovementRecord {
        date,
        outlet,
        supervisor: descriptive(&raw.supervisor),
        city: descriptive(&raw.city),
        item,
        opening_stock,
        inbound_qty,
        consumed_qty,
        returned_qty,
        expected_usage_qty,
        closing_stock,
        expected_closing_stock,
        gap_qty,
        status,
        upstream_status: raw.upstream_status,
    })
}

fn identity(value: &Option<String>, field: &'static str) -> Result<String, ReconError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ReconError::InvalidRecord { row: None, field })
}

fn descriptive(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Reconcile every row, preserving input order. Invalid rows are skipped
/// with a warning and reported in [`BatchOutcome::skipped`].
pub fn reconcile_batch(rows: &[RawMovement], policy: MatchPolicy) -> BatchOutcome {
    reconcile_indexed(rows.iter().enumerate(), policy)
}

fn reconcile_indexed<'a>(
    rows: impl Iterator<Item = (usize, &'a RawMovement)>,
    policy: MatchPolicy,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for (index, raw) in rows {
        match reconcile(raw, policy) {
            Ok(record) => {
                if record.disagrees_with_upstream() {
                    debug!(
                        row = index,
                        outlet = %record.outlet,
                        item = %record.item,
                        derived = %record.status,
                        "derived status differs from upstream so_flag"
                    );
                }
                outcome.records.push(record);
            }
            Err(err) => {
                let err = err.at_row(index);
                warn!(row = index, error = %err, "skipping movement row");
                outcome.skipped.push(SkippedRow {
                    row: index,
                    reason: err.to_string(),
                });
            }
        }
    }

    outcome
}

/// Filter, reconcile and summarize a loaded export.
///
/// Skipped row indices refer to positions in `rows`, before filtering.
pub fn run(config: &ReconConfig, filter: &MovementFilter, rows: &[RawMovement]) -> MovementResult {
    let selected = rows.iter().enumerate().filter(|(_, row)| filter.matches(row));
    let outcome = reconcile_indexed(selected, config.policy);
    let summary = compute_summary(&outcome.records);

    debug!(
        total = summary.total,
        mismatched = summary.mismatched,
        skipped = outcome.skipped.len(),
        policy = %config.policy,
        "reconciled movement batch"
    );

    MovementResult {
        meta: MovementMeta {
            config_name: config.name.clone(),
            policy: config.policy,
            period_start: filter.start,
            period_end: filter.end,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        records: outcome.records,
        skipped: outcome.skipped,
    }
}

/// Load a CSV export of the movement view, applying the column mapping.
///
/// Identity, date and quantity columns must be present in the header;
/// `supervisor`, `city` and `upstream_status` columns are optional.
pub fn load_csv_rows(csv_data: &str, columns: &ColumnMapping) -> Result<Vec<RawMovement>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let idx = |name: &str| -> Result<usize, ReconError> {
        position(name).ok_or_else(|| ReconError::MissingColumn { column: name.into() })
    };

    let date_idx = idx(&columns.date)?;
    let outlet_idx = idx(&columns.outlet)?;
    let item_idx = idx(&columns.item)?;
    let supervisor_idx = position(&columns.supervisor);
    let city_idx = position(&columns.city);
    let status_idx = position(&columns.upstream_status);

    let qty_columns = [
        &columns.opening_stock,
        &columns.inbound_qty,
        &columns.consumed_qty,
        &columns.returned_qty,
        &columns.expected_usage_qty,
        &columns.closing_stock,
        &columns.expected_closing_stock,
    ];
    let mut qty_idx = [0usize; 7];
    for (slot, name) in qty_idx.iter_mut().zip(qty_columns) {
        *slot = idx(name)?;
    }

    let mut rows = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;
        let cell = |i: usize| record.get(i).unwrap_or("");
        let text = |i: Option<usize>| {
            i.map(|i| cell(i).trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let date = parse_date(cell(date_idx)).ok_or_else(|| ReconError::DateParse {
            row,
            value: cell(date_idx).into(),
        })?;

        let mut qty = [None; 7];
        for (slot, (&i, name)) in qty.iter_mut().zip(qty_idx.iter().zip(qty_columns)) {
            *slot = parse_qty(cell(i)).map_err(|_| ReconError::QuantityParse {
                row,
                column: name.clone(),
                value: cell(i).into(),
            })?;
        }

        let upstream_status = match text(status_idx) {
            Some(flag) => Some(
                StockStatus::parse_label(&flag)
                    .ok_or(ReconError::StatusParse { row, value: flag })?,
            ),
            None => None,
        };

        rows.push(RawMovement {
            date,
            outlet: text(Some(outlet_idx)),
            supervisor: text(supervisor_idx),
            city: text(city_idx),
            item: text(Some(item_idx)),
            opening_stock: qty[0],
            inbound_qty: qty[1],
            consumed_qty: qty[2],
            returned_qty: qty[3],
            expected_usage_qty: qty[4],
            closing_stock: qty[5],
            expected_closing_stock: qty[6],
            upstream_status,
        });
    }

    Ok(rows)
}

/// `Some(None)` for an empty cell, `None` when the cell is not a date.
fn parse_date(cell: &str) -> Option<Option<NaiveDate>> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(None);
    }
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
        })
        .ok()
        .map(Some)
}

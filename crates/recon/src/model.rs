use chrono::NaiveDate;
use serde::Serialize;

use crate::config::MatchPolicy;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One raw row of the daily movement view, as delivered upstream.
///
/// Identity fields are optional here so the engine can reject rows that lack
/// them. Quantities stay unrounded until [`crate::engine::reconcile`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMovement {
    pub date: Option<NaiveDate>,
    pub outlet: Option<String>,
    pub supervisor: Option<String>,
    pub city: Option<String>,
    pub item: Option<String>,
    pub opening_stock: Option<f64>,
    pub inbound_qty: Option<f64>,
    pub consumed_qty: Option<f64>,
    pub returned_qty: Option<f64>,
    pub expected_usage_qty: Option<f64>,
    pub closing_stock: Option<f64>,
    pub expected_closing_stock: Option<f64>,
    /// The view's own `so_flag`, when the export carries it.
    pub upstream_status: Option<StockStatus>,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Match,
    Mismatch,
}

impl StockStatus {
    /// Label used by the dashboard and the CSV export.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Match => "Sesuai",
            Self::Mismatch => "Tidak Sesuai",
        }
    }

    /// Accepts both the dashboard labels and the JSON spelling.
    pub fn parse_label(value: &str) -> Option<Self> {
        let v = value.trim();
        if v.eq_ignore_ascii_case("sesuai") || v.eq_ignore_ascii_case("match") {
            Some(Self::Match)
        } else if v.eq_ignore_ascii_case("tidak sesuai") || v.eq_ignore_ascii_case("mismatch") {
            Some(Self::Mismatch)
        } else {
            None
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Derived record
// ---------------------------------------------------------------------------

/// A reconciled movement row. All quantities are rounded half-to-even.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementRecord {
    pub date: NaiveDate,
    pub outlet: String,
    pub supervisor: String,
    pub city: String,
    pub item: String,
    pub opening_stock: i64,
    pub inbound_qty: i64,
    pub consumed_qty: i64,
    pub returned_qty: i64,
    pub expected_usage_qty: i64,
    pub closing_stock: i64,
    pub expected_closing_stock: i64,
    pub gap_qty: i64,
    pub status: StockStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<StockStatus>,
}

impl MovementRecord {
    /// Mismatched rows are highlighted on [`crate::export::HIGHLIGHT_COLUMNS`].
    pub fn is_highlighted(&self) -> bool {
        self.status == StockStatus::Mismatch
    }

    pub fn is_shortage(&self) -> bool {
        self.gap_qty < 0
    }

    /// True when the view shipped a flag and it differs from ours.
    pub fn disagrees_with_upstream(&self) -> bool {
        self.upstream_status.is_some_and(|s| s != self.status)
    }
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// A row the batch skipped, with its zero-based input index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub records: Vec<MovementRecord>,
    pub skipped: Vec<SkippedRow>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

/// Per-outlet rollup, ordered by outlet name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutletRollup {
    pub outlet: String,
    pub record_count: usize,
    pub mismatched: usize,
    pub total_gap: i64,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovementSummary {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub shortage_rows: usize,
    pub total_gap: i64,
    pub upstream_disagreements: usize,
    pub outlets: Vec<OutletRollup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovementMeta {
    pub config_name: String,
    pub policy: MatchPolicy,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovementResult {
    pub meta: MovementMeta,
    pub summary: MovementSummary,
    pub records: Vec<MovementRecord>,
    pub skipped: Vec<SkippedRow>,
}

//! CSV export of reconciled records, plus the highlight contract the table
//! renderer uses for mismatched rows.

use std::io::Write;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ReconError;
use crate::filter::VIEW_COLUMNS;
use crate::model::MovementRecord;

/// Dashboard labels, in view column order.
pub const DISPLAY_HEADERS: [&str; 14] = [
    "Tanggal",
    "Outlet",
    "SPV",
    "Kota",
    "Nama Produk",
    "Stok Awal Hari",
    "Barang Masuk (DC)",
    "Terpakai / Terjual",
    "Sisa Stok Akhir",
    "Pemakaian Seharusnya",
    "Barang Retur",
    "Sisa Seharusnya",
    "Selisih Sisa",
    "Status Stok",
];

/// Columns painted on a mismatched row.
pub const HIGHLIGHT_COLUMNS: [&str; 6] = [
    "Tanggal",
    "Outlet",
    "SPV",
    "Kota",
    "Nama Produk",
    "Status Stok",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStyle {
    /// Dashboard labels (`Stok Awal Hari`, ...).
    #[default]
    Display,
    /// Raw view column names (`stock_awal`, ...).
    Source,
}

impl HeaderStyle {
    pub fn headers(&self) -> &'static [&'static str; 14] {
        match self {
            Self::Display => &DISPLAY_HEADERS,
            Self::Source => &VIEW_COLUMNS,
        }
    }
}

impl FromStr for HeaderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "display" => Ok(Self::Display),
            "source" => Ok(Self::Source),
            other => Err(format!("unknown header style \"{other}\" (expected \"display\" or \"source\")")),
        }
    }
}

/// Display columns to highlight for `record`; empty when it matched.
pub fn highlighted_columns(record: &MovementRecord) -> &'static [&'static str] {
    if record.is_highlighted() {
        &HIGHLIGHT_COLUMNS
    } else {
        &[]
    }
}

/// Write the full derived record set, in the given order.
pub fn write_records_csv(
    records: &[MovementRecord],
    writer: impl Write,
    style: HeaderStyle,
) -> Result<(), ReconError> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(style.headers())
        .map_err(|e| ReconError::Io(format!("CSV write error: {e}")))?;

    for r in records {
        csv.write_record(&[
            r.date.format("%Y-%m-%d").to_string(),
            r.outlet.clone(),
            r.supervisor.clone(),
            r.city.clone(),
            r.item.clone(),
            r.opening_stock.to_string(),
            r.inbound_qty.to_string(),
            r.consumed_qty.to_string(),
            r.closing_stock.to_string(),
            r.expected_usage_qty.to_string(),
            r.returned_qty.to_string(),
            r.expected_closing_stock.to_string(),
            r.gap_qty.to_string(),
            r.status.label().to_string(),
        ])
        .map_err(|e| ReconError::Io(format!("CSV write error: {e}")))?;
    }

    csv.flush().map_err(|e| ReconError::Io(format!("CSV flush error: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchPolicy;
    use crate::engine::reconcile;
    use crate::model::RawMovement;
    use chrono::NaiveDate;

    fn record(outlet: &str, closing: f64, expected: f64) -> MovementRecord {
        let raw = RawMovement {
            date: NaiveDate::from_ymd_opt(2026, 1, 15),
            outlet: Some(outlet.into()),
            supervisor: Some("Rina".into()),
            city: Some("Jakarta".into()),
            item: Some("Kopi, Susu".into()),
            opening_stock: Some(10.0),
            inbound_qty: Some(4.0),
            consumed_qty: Some(6.0),
            expected_usage_qty: Some(6.0),
            closing_stock: Some(closing),
            expected_closing_stock: Some(expected),
            ..RawMovement::default()
        };
        reconcile(&raw, MatchPolicy::ClosingStock).unwrap()
    }

    #[test]
    fn display_headers_and_rows() {
        let records = vec![record("Kemang", 8.0, 8.0), record("Depok", 7.0, 8.0)];
        let mut out = Vec::new();
        write_records_csv(&records, &mut out, HeaderStyle::Display).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Tanggal,Outlet,SPV,Kota,Nama Produk,Stok Awal Hari"));
        assert!(lines[0].ends_with("Selisih Sisa,Status Stok"));
        assert_eq!(
            lines[1],
            "2026-01-15,Kemang,Rina,Jakarta,\"Kopi, Susu\",10,4,6,8,6,0,8,0,Sesuai"
        );
        assert!(lines[2].starts_with("2026-01-15,Depok"));
        assert!(lines[2].ends_with(",-1,Tidak Sesuai"));
    }

    #[test]
    fn source_headers() {
        let mut out = Vec::new();
        write_records_csv(&[], &mut out, HeaderStyle::Source).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim_end(), VIEW_COLUMNS.join(","));
    }

    #[test]
    fn highlight_only_mismatches() {
        assert!(highlighted_columns(&record("A", 1.0, 1.0)).is_empty());
        let cols = highlighted_columns(&record("A", 1.0, 2.0));
        assert_eq!(cols, &HIGHLIGHT_COLUMNS);
        assert!(cols.iter().all(|c| DISPLAY_HEADERS.contains(c)));
    }

    #[test]
    fn header_style_from_str() {
        assert_eq!("source".parse::<HeaderStyle>().unwrap(), HeaderStyle::Source);
        assert!("raw".parse::<HeaderStyle>().is_err());
    }
}

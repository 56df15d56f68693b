//! Quantity normalization shared by the loader and the engine.

use std::num::ParseFloatError;

use tracing::warn;

/// Null-like literals some exports write instead of an empty cell.
const NULL_LITERALS: [&str; 4] = ["null", "none", "nan", "na"];

/// Largest magnitude a normalized quantity can take (2^53, the last integer
/// `f64` holds exactly). Differences of two bounded quantities fit in `i64`.
pub const MAX_QTY: i64 = 1 << 53;

/// Absent or non-finite quantities count as zero; everything else rounds
/// half-to-even (2.5 → 2, 3.5 → 4, -2.5 → -2) and is clamped to
/// `±MAX_QTY`.
pub fn normalize_qty(value: Option<f64>) -> i64 {
    let v = match value {
        Some(v) if v.is_finite() => v.round_ties_even(),
        _ => return 0,
    };
    let bound = MAX_QTY as f64;
    if v.abs() > bound {
        warn!(value = v, bound = MAX_QTY, "quantity out of range, clamped");
        return if v > 0.0 { MAX_QTY } else { -MAX_QTY };
    }
    v as i64
}

/// Parse one CSV cell. `Ok(None)` for empty or null-like cells.
pub fn parse_qty(cell: &str) -> Result<Option<f64>, ParseFloatError> {
    let cell = cell.trim();
    if cell.is_empty() || NULL_LITERALS.iter().any(|n| cell.eq_ignore_ascii_case(n)) {
        return Ok(None);
    }
    cell.parse::<f64>().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_to_even() {
        assert_eq!(normalize_qty(Some(2.5)), 2);
        assert_eq!(normalize_qty(Some(3.5)), 4);
        assert_eq!(normalize_qty(Some(-2.5)), -2);
        assert_eq!(normalize_qty(Some(41.5)), 42);
        assert_eq!(normalize_qty(Some(42.5)), 42);
        assert_eq!(normalize_qty(Some(2.4999)), 2);
        assert_eq!(normalize_qty(Some(2.5001)), 3);
    }

    #[test]
    fn absent_and_nan_are_zero() {
        assert_eq!(normalize_qty(None), 0);
        assert_eq!(normalize_qty(Some(f64::NAN)), 0);
        assert_eq!(normalize_qty(Some(f64::INFINITY)), 0);
    }

    #[test]
    fn huge_values_clamp() {
        assert_eq!(normalize_qty(Some(9e18)), MAX_QTY);
        assert_eq!(normalize_qty(Some(-1e300)), -MAX_QTY);
        assert_eq!(normalize_qty(Some(MAX_QTY as f64)), MAX_QTY);
        assert_eq!(normalize_qty(Some(1e15)), 1_000_000_000_000_000);
    }

    #[test]
    fn parse_cells() {
        assert_eq!(parse_qty(""), Ok(None));
        assert_eq!(parse_qty("  "), Ok(None));
        assert_eq!(parse_qty("NULL"), Ok(None));
        assert_eq!(parse_qty("NaN"), Ok(None));
        assert_eq!(parse_qty("12"), Ok(Some(12.0)));
        assert_eq!(parse_qty(" -3.75 "), Ok(Some(-3.75)));
        assert!(parse_qty("dua").is_err());
    }
}

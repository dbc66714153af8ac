//! Tolerant type coercion for raw CSV cells.
//!
//! Every function here maps a possibly-missing, possibly-garbage string to
//! either an exactly-parsed value or `None`. Nothing in this module can fail:
//! a retirement code in a numeric column, a blank cell, or a malformed date
//! all coerce to `None` and flow through the rest of the pipeline as an
//! explicit missing value.

use chrono::NaiveDate;

/// Parse an integer cell. Values written as floats ("3.0") are accepted as
/// long as they are whole; "3.5" in an integer column is malformed and
/// coerces to `None` rather than silently truncating.
pub fn parse_int(value: Option<&str>) -> Option<i64> {
    let s = value?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Some(f as i64)
        }
        _ => None,
    }
}

/// Parse a floating-point cell.
pub fn parse_float(value: Option<&str>) -> Option<f64> {
    let s = value?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Parse a calendar date cell (ISO `YYYY-MM-DD`).
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let s = value?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Normalize a text cell: trim whitespace, collapse blanks to `None`.
pub fn parse_text(value: Option<&str>) -> Option<String> {
    let s = value?.trim();
    if s.is_empty() {
        return None;
    }
    Some(s.to_string())
}

//! Field-level predicates. Pure, no side effects.

use chrono::NaiveDate;

/// Format accepted for `start` and `end`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether `s` parses as a finite decimal number.
///
/// `inf`, `NaN`, and surrounding whitespace are rejected.
#[must_use]
pub fn is_float(s: &str) -> bool {
    parse_float(s).is_some()
}

/// Parses `s` as a finite `f64`.
#[must_use]
pub fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses `s` as a finite, non-negative `f64`.
#[must_use]
pub fn parse_non_negative(s: &str) -> Option<f64> {
    parse_float(s).filter(|v| *v >= 0.0)
}

/// Parses `s` as an integer greater than zero.
#[must_use]
pub fn parse_positive_integer(s: &str) -> Option<u64> {
    s.parse::<u64>().ok().filter(|n| *n > 0)
}

/// Whether `s` is a zero-padded `YYYY-MM-DD` string naming a real calendar
/// date.
///
/// The padding requirement is what makes lexicographic comparison of two
/// valid dates agree with chronological order.
#[must_use]
pub fn is_valid_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    if !bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
    {
        return false;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()
}

use super::types::CellValue;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

// Cheap shape prefilter so chrono parsing only runs on plausible cells.
static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,4}[-/]\d{1,2}[-/]\d{1,4}( \d{1,2}:\d{2}(:\d{2})?)?$").unwrap()
});

/// Parse a cell as a finite number: optional leading sign, decimal point,
/// integer or float. Infinities and NaN are rejected.
pub fn parse_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // f64::from_str accepts "inf"/"nan" spellings that are not numeric data
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn is_date_string(s: &str) -> bool {
    let trimmed = s.trim();
    if !DATE_SHAPE.is_match(trimmed) {
        return false;
    }

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M",
    ];
    const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

    DATETIME_FORMATS
        .iter()
        .any(|f| NaiveDateTime::parse_from_str(trimmed, f).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|f| NaiveDate::parse_from_str(trimmed, f).is_ok())
}

/// Whether a cell counts as missing under the configured token set.
/// Tokens are compared against the trimmed raw text.
pub fn is_null_cell(cell: &CellValue, null_tokens: &[String]) -> bool {
    match cell {
        CellValue::Null => true,
        CellValue::Num(_) => false,
        CellValue::Str(s) => {
            let trimmed = s.trim();
            null_tokens.iter().any(|t| t == trimmed)
        }
    }
}

/// Numeric view of a non-null cell, if it has one.
pub fn cell_as_numeric(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Num(n) => Some(*n),
        CellValue::Str(s) => parse_numeric(s),
        CellValue::Null => None,
    }
}

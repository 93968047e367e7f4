//! Year-of-study conversions shared by parsing, search and export.

use serde_json::Value;

/// Years the résumé parser accepts from the model.
pub const MIN_PARSED_YEAR: i32 = 1;
pub const MAX_PARSED_YEAR: i32 = 5;

/// The year stored for anyone past third year.
pub const ALUMNI_YEAR: i32 = 4;

/// Display label used by the directory: 1st, 2nd, 3rd, otherwise Alumni.
pub fn year_label(year: Option<i32>) -> &'static str {
    match year {
        Some(1) => "1st",
        Some(2) => "2nd",
        Some(3) => "3rd",
        _ => "Alumni",
    }
}

/// Parses a `year` query value. Numbers pass through; labels map back,
/// and any label that is not 1st/2nd/3rd means alumni. Blank values are ignored.
pub fn parse_year_param(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(n) = raw.parse::<i32>() {
        return Some(n);
    }
    Some(match raw.to_ascii_lowercase().as_str() {
        "1st" => 1,
        "2nd" => 2,
        "3rd" => 3,
        _ => ALUMNI_YEAR,
    })
}

/// Reads a year sent either as a JSON number or a numeric string.
pub fn year_from_json(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

// Parsing and small statistics helpers shared by the loader and the reports.
//
// Raw CSV cells arrive as `Option<&str>`; everything here maps them to typed
// values or `None` so callers never see half-parsed text.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Numeric cell such as an age. Spreadsheet thousands separators are
/// tolerated; words, NaN and infinities are not.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let cell = s.map(str::trim).filter(|c| !c.is_empty())?;
    if cell.chars().any(char::is_alphabetic) {
        return None;
    }
    cell.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `Fecha del reporte` cell; other layouts count as missing.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let cell = s.map(str::trim).filter(|c| !c.is_empty())?;
    NaiveDate::parse_from_str(cell, DATE_FORMAT).ok()
}

/// Binary indicator columns hold `0`/`1`; spreadsheets sometimes export them
/// as `1.0` or `Si`. Anything unrecognized counts as `false`.
pub fn parse_flag(s: Option<&str>) -> bool {
    match s.map(|v| v.trim().to_lowercase()) {
        Some(v) => matches!(v.as_str(), "1" | "1.0" | "si" | "sí" | "true" | "yes"),
        None => false,
    }
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Si"
    } else {
        "No"
    }
}

/// Trimmed, non-empty string or `None`.
pub fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Mean of `v`, 0 when empty.
pub fn average(v: &[f64]) -> f64 {
    match v.len() {
        0 => 0.0,
        n => v.iter().sum::<f64>() / n as f64,
    }
}

/// Median of `v`, 0 when empty. Takes the vector to sort it in place.
pub fn median(mut v: Vec<f64>) -> f64 {
    v.sort_by(f64::total_cmp);
    let n = v.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => v[n / 2],
        _ => (v[n / 2 - 1] + v[n / 2]) / 2.0,
    }
}

pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// First `max_chars` characters of `s` (not bytes, so multi-byte letters such
/// as `é` are never split).
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// `decimals` fixed places with English thousands separators, e.g.
/// `1,234,567.89`.
pub fn format_number(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let grouped = whole.parse::<u64>().unwrap_or(0).to_formatted_string(&Locale::en);
    let sign = if n < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// Integer counts and budgets in console messages.
pub fn format_int<T: ToFormattedString>(n: T) -> String {
    n.to_formatted_string(&Locale::en)
}

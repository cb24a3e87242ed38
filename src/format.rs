//! # Formatting Utilities
//!
//! Locale-stable string formatting for everything the report prints.
//! Output never depends on the host locale: thousands are grouped with `,`,
//! the decimal separator is `.`, and dates are ISO-like. Two runs over the
//! same numbers always produce the same bytes.

use chrono::NaiveDateTime;

/// Group the integer digits of an already-formatted unsigned number.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Non-finite values print as zero.
fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Format an integer with thousands separators: `1234567` -> `1,234,567`.
pub fn format_integer(value: i64) -> String {
    let grouped = group_thousands(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Format a decimal with a fixed number of fraction digits and grouped
/// thousands: `1234.5` with 2 decimals -> `1,234.50`.
pub fn format_decimal(value: f64, decimals: usize) -> String {
    let value = finite(value);
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };
    let mut out = group_thousands(int_part);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    // "-0.00" reads as noise
    let is_zero = out.chars().all(|c| c == '0' || c == '.' || c == ',');
    if value < 0.0 && !is_zero {
        out.insert(0, '-');
    }
    out
}

/// Format a currency amount: `-1234.5` with `$` -> `-$1,234.50`.
pub fn format_currency(value: f64, symbol: &str) -> String {
    let body = format_decimal(value, 2);
    match body.strip_prefix('-') {
        Some(abs) => format!("-{}{}", symbol, abs),
        None => format!("{}{}", symbol, body),
    }
}

/// Format a percentage with the given precision: `19.0` -> `19.0%`.
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{}%", format_decimal(value, decimals))
}

/// Format a tax rate the way receipts print it: whole rates without a
/// fraction (`19%`), fractional rates with up to two digits (`7.25%`).
pub fn format_rate(rate: f64) -> String {
    let rate = finite(rate);
    if (rate - rate.round()).abs() < 1e-9 {
        format!("{}%", rate.round() as i64)
    } else {
        let s = format!("{:.2}", rate);
        let s = s.trim_end_matches('0').trim_end_matches('.');
        format!("{}%", s)
    }
}

/// `2026-10-15`
pub fn format_date(at: &NaiveDateTime) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// `2026-10-15 14:03`
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// `20261015_140312`, used in file names.
pub fn file_timestamp(at: &NaiveDateTime) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Normalize to "first letter uppercase, remainder lowercase".
///
/// Applied to every column label and every free-text cell *before* it is
/// measured, so widths are always computed on the exact rendered string.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
    }
}

/// Make a string safe to use as a file name. Each of `<>:"/\|?*` and each
/// whitespace run becomes a single `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.trim().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
            out.push('_');
        } else {
            out.push(ch);
        }
    }
    if out.is_empty() {
        out.push_str("report");
    }
    out
}

/// `Inventory report` at 2026-10-15 14:03:12 as pdf ->
/// `Inventory_report_20261015_140312.pdf`
pub fn suggested_file_name(title: &str, at: &NaiveDateTime, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        sanitize_file_name(title),
        file_timestamp(at),
        extension
    )
}

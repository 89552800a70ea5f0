//! Lenient publication date parsing for listing pages
//!
//! Dates are tried as machine-readable `datetime` attributes first, then as
//! visible text against a fixed list of formats after Indonesian month names
//! are mapped to English ones. Anything unparseable becomes "now".

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Output format of every parsed date
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Visible-text formats, tried in order
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
];

static LOCAL_MONTHS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(januari|februari|maret|mei|juni|juli|agustus|oktober|desember|agu|ags|okt|des)\b")
        .expect("hardcoded regex pattern is valid")
});

fn english_month(local: &str) -> &'static str {
    match local.to_lowercase().as_str() {
        "januari" => "January",
        "februari" => "February",
        "maret" => "March",
        "mei" => "May",
        "juni" => "June",
        "juli" => "July",
        "agustus" | "agu" | "ags" => "August",
        "oktober" | "okt" => "October",
        "desember" | "des" => "December",
        _ => "",
    }
}

/// Replaces Indonesian month names with their English equivalents
pub fn translate_months(text: &str) -> String {
    LOCAL_MONTHS
        .replace_all(text, |caps: &Captures<'_>| english_month(&caps[1]).to_string())
        .into_owned()
}

/// Parses a `datetime` attribute value (RFC 3339, ISO date-time or ISO date)
pub fn parse_machine_date(value: &str) -> Option<String> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_local().format(ISO_FORMAT).to_string());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, ISO_FORMAT) {
        return Some(parsed.format(ISO_FORMAT).to_string());
    }
    value
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.format(ISO_FORMAT).to_string())
}

/// Parses visible date text against the known formats
pub fn parse_date_text(text: &str) -> Option<String> {
    let normalized = translate_months(text.trim());
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(&normalized, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|parsed| parsed.format(ISO_FORMAT).to_string())
    })
}

/// Current local time in the output format
pub fn now_iso() -> String {
    Local::now().naive_local().format(ISO_FORMAT).to_string()
}

/// Resolves a date element's attribute and text to an ISO timestamp
///
/// # Returns
///
/// The parsed timestamp, or the current time when nothing parses
pub fn resolve_date(datetime_attr: Option<&str>, text: &str) -> String {
    datetime_attr
        .and_then(parse_machine_date)
        .or_else(|| parse_date_text(text))
        .unwrap_or_else(now_iso)
}

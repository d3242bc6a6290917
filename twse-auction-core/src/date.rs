//! Parsing of the source's date text.

use chrono::NaiveDate;
use tracing::debug;

/// Tokens the source uses in place of a date.
pub const NON_DATE_TOKENS: &[&str] = &["0", "-", "--", "－", "N/A"];

const DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y-%m-%d"];

/// Parse `YYYY/MM/DD` or `YYYY-MM-DD`.
///
/// Empty text and known sentinels yield `None` silently. Anything else that
/// fails to parse also yields `None`, logged as a parse miss so that a new
/// sentinel shows up in the logs instead of being guessed at.
pub fn parse_auction_date(text: &str) -> Option<NaiveDate> {
    let cleaned = text.trim();
    if cleaned.is_empty() || NON_DATE_TOKENS.contains(&cleaned) {
        return None;
    }

    let parsed = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok());

    if parsed.is_none() {
        debug!(text = cleaned, "date parse miss");
    }

    parsed
}

/// `YYYYMMDD`, the form used by `VALUE=DATE` properties.
pub fn ics_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

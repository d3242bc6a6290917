//! Reading generated calendars back with the icalendar crate's parser.

use chrono::NaiveDate;
use icalendar::parser::{read_calendar, unfold};

use crate::error::{AuctionError, AuctionResult};
use crate::ics::text::unescape_text;

/// The subset of a VEVENT this pipeline writes, with TEXT values unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub cancelled: bool,
    pub categories: Vec<String>,
}

/// Parse every VEVENT in an ICS document.
pub fn read_events(content: &str) -> AuctionResult<Vec<ParsedEvent>> {
    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| AuctionError::IcsParse(e.to_string()))?;

    let events = calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .filter_map(|vevent| {
            let uid = vevent.find_prop("UID")?.val.to_string();
            let text = |name: &str| {
                vevent
                    .find_prop(name)
                    .map(|p| unescape_text(p.val.as_ref()))
                    .unwrap_or_default()
            };
            let date = |name: &str| {
                vevent
                    .find_prop(name)
                    .and_then(|p| NaiveDate::parse_from_str(p.val.as_ref(), "%Y%m%d").ok())
            };

            let categories = vevent
                .find_prop("CATEGORIES")
                .map(|p| split_list(p.val.as_ref()))
                .unwrap_or_default();
            let cancelled = vevent
                .find_prop("STATUS")
                .map(|p| p.val.as_ref() == "CANCELLED")
                .unwrap_or(false);

            Some(ParsedEvent {
                uid,
                summary: text("SUMMARY"),
                description: text("DESCRIPTION"),
                start: date("DTSTART"),
                end: date("DTEND"),
                cancelled,
                categories,
            })
        })
        .collect();

    Ok(events)
}

/// Split a comma-separated TEXT list, honouring `\,` escapes.
fn split_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            items.push(unescape_text(&std::mem::take(&mut current)));
        } else {
            current.push(c);
        }
    }
    items.push(unescape_text(&current));
    items
}

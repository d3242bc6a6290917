//! Record → event expansion.

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::constants::{fields, CALENDAR_CATEGORY, EMPTY_VALUE, NUMERIC_FIELDS};
use crate::date::parse_auction_date;
use crate::event::{event_uid, CalendarEvent, EventKind, EventStatus};
use crate::labels::FieldLabels;
use crate::record::{clean_number, NormalizedRecord, RecordSet};
use crate::settings::{CalendarSettings, EventSettings};

const CANCELLED_TAG: &str = "【已取消】";

/// Expand one record into its calendar events.
///
/// Each kind is emitted only when its own date parses, so a missing date drops
/// that single event and leaves its siblings alone.
pub fn derive_events(
    record: &NormalizedRecord,
    settings: &EventSettings,
    calendar: &CalendarSettings,
    labels: &FieldLabels,
) -> Vec<CalendarEvent> {
    let bid_start = parse_auction_date(record.bid_start());
    let bid_end = parse_auction_date(record.bid_end());
    let open = parse_auction_date(record.open_date());
    let listing = parse_auction_date(record.listing_date());

    let mut spans: Vec<(EventKind, NaiveDate, NaiveDate)> = Vec::new();

    if settings.emit_bid_period {
        match (bid_start, bid_end) {
            (Some(start), Some(end)) if end >= start => {
                spans.push((EventKind::BidPeriod, start, end));
            }
            (Some(start), Some(end)) => {
                debug!(key = %record.key(), %start, %end, "bid period ends before it starts, skipped");
            }
            _ => {}
        }
    }

    if settings.emit_bid_points {
        if let Some(start) = bid_start {
            spans.push((EventKind::BidStart, start, start));
        }
        if let Some(end) = bid_end {
            spans.push((EventKind::BidEnd, end, end));
        }
    }

    if let Some(date) = open {
        spans.push((EventKind::Open, date, date));
    }
    if let Some(date) = listing {
        spans.push((EventKind::Listing, date, date));
    }

    let status = if record.is_cancelled() {
        EventStatus::Cancelled
    } else {
        EventStatus::Confirmed
    };

    spans
        .into_iter()
        .filter_map(|(kind, first_day, last_day)| {
            // All-day DTEND is exclusive.
            let end = last_day.checked_add_days(Days::new(1))?;
            Some(CalendarEvent {
                uid: event_uid(record, kind, settings),
                kind,
                start: first_day,
                end,
                summary: summary(record, kind),
                description: description(record, kind, calendar, labels),
                status,
                categories: vec![CALENDAR_CATEGORY.to_string(), kind.category().to_string()],
            })
        })
        .collect()
}

/// Events for every record in the set, in key order.
pub fn derive_all(
    records: &RecordSet,
    settings: &EventSettings,
    calendar: &CalendarSettings,
    labels: &FieldLabels,
) -> Vec<CalendarEvent> {
    records
        .records()
        .flat_map(|record| derive_events(record, settings, calendar, labels))
        .collect()
}

fn summary(record: &NormalizedRecord, kind: EventKind) -> String {
    let tag = if record.is_cancelled() { CANCELLED_TAG } else { "" };
    format!(
        "{}{} {}｜{}（{}）",
        tag,
        kind.emoji(),
        kind.label(),
        or_dash(record.name()),
        or_dash(record.code())
    )
}

fn description(
    record: &NormalizedRecord,
    kind: EventKind,
    calendar: &CalendarSettings,
    labels: &FieldLabels,
) -> String {
    let mut lines = vec![format!("事件：{}", kind.label())];

    for (field, label) in labels.iter() {
        if field == fields::CANCEL_REASON {
            continue;
        }
        let value = record.get(field);
        let value = if NUMERIC_FIELDS.contains(&field) {
            clean_number(value)
        } else {
            value.to_string()
        };
        lines.push(format!("{}：{}", label, or_dash(&value)));
    }

    if record.is_cancelled() {
        lines.push(format!(
            "⚠️ {}：{}",
            labels.label(fields::CANCEL_REASON),
            record.cancel_reason()
        ));
    }

    lines.push(String::new());
    lines.push(format!("資料來源：{}", calendar.source_url));
    lines.join("\n")
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { EMPTY_VALUE } else { value }
}

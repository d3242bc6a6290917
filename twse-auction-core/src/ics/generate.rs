//! ICS calendar generation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::date::ics_date;
use crate::event::{CalendarEvent, EventStatus};
use crate::ics::text::{escape_text, fold_line};
use crate::settings::CalendarSettings;

pub const DTSTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Render a full VCALENDAR document.
///
/// Events are de-duplicated by UID (last wins) and ordered by
/// `(start, summary, uid)`. `dtstamp` is shared by every event, so the same
/// events and timestamp always give byte-identical output.
pub fn render_calendar(
    settings: &CalendarSettings,
    events: &[CalendarEvent],
    dtstamp: DateTime<Utc>,
) -> String {
    let mut writer = IcsWriter::default();
    let dtstamp = dtstamp.format(DTSTAMP_FORMAT).to_string();

    writer.line("BEGIN:VCALENDAR");
    writer.property("PRODID", &settings.prod_id);
    writer.line("VERSION:2.0");
    writer.line("CALSCALE:GREGORIAN");
    writer.line("METHOD:PUBLISH");
    writer.text_property("X-WR-CALNAME", &settings.name);
    if let Some(ref desc) = settings.description {
        writer.text_property("X-WR-CALDESC", desc);
    }
    writer.property("X-WR-TIMEZONE", &settings.timezone);
    if let Some(ref ttl) = settings.published_ttl {
        writer.property("X-PUBLISHED-TTL", ttl);
    }

    let by_uid: BTreeMap<&str, &CalendarEvent> =
        events.iter().map(|e| (e.uid.as_str(), e)).collect();
    let mut ordered: Vec<&CalendarEvent> = by_uid.into_values().collect();
    ordered.sort_by(|a, b| {
        (a.start, &a.summary, &a.uid).cmp(&(b.start, &b.summary, &b.uid))
    });

    for event in ordered {
        write_event(&mut writer, event, &dtstamp, &settings.source_url);
    }

    writer.line("END:VCALENDAR");
    writer.finish()
}

fn write_event(writer: &mut IcsWriter, event: &CalendarEvent, dtstamp: &str, url: &str) {
    writer.line("BEGIN:VEVENT");
    writer.property("UID", &event.uid);
    writer.property("DTSTAMP", dtstamp);
    writer.property("DTSTART;VALUE=DATE", &ics_date(event.start));
    writer.property("DTEND;VALUE=DATE", &ics_date(event.end));
    writer.text_property("SUMMARY", &event.summary);
    writer.text_property("DESCRIPTION", &event.description);
    if !event.categories.is_empty() {
        let categories: Vec<String> = event.categories.iter().map(|c| escape_text(c)).collect();
        writer.property("CATEGORIES", &categories.join(","));
    }
    writer.property("URL", url);
    writer.line("TRANSP:TRANSPARENT");
    // CONFIRMED is implied, only cancellation is written
    if event.status == EventStatus::Cancelled {
        writer.line("STATUS:CANCELLED");
    }
    writer.line("END:VEVENT");
}

/// Accumulates folded, CRLF-terminated content lines.
#[derive(Default)]
struct IcsWriter {
    out: String,
}

impl IcsWriter {
    fn line(&mut self, content: &str) {
        for physical in fold_line(content) {
            self.out.push_str(&physical);
            self.out.push_str("\r\n");
        }
    }

    /// Property whose value is already in its wire form.
    fn property(&mut self, name: &str, value: &str) {
        self.line(&format!("{name}:{value}"));
    }

    fn text_property(&mut self, name: &str, value: &str) {
        self.property(name, &escape_text(value));
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use chrono::{NaiveDate, TimeZone};

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap()
    }

    fn make_event(uid: &str, day: u32, summary: &str) -> CalendarEvent {
        let start = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        CalendarEvent {
            uid: uid.to_string(),
            kind: EventKind::Open,
            start,
            end: start.succ_opt().unwrap(),
            summary: summary.to_string(),
            description: "證券代號：2330".to_string(),
            status: EventStatus::Confirmed,
            categories: vec!["TWSE競價拍賣".to_string(), "開標日".to_string()],
        }
    }

    #[test]
    fn test_header_and_footer() {
        let ics = render_calendar(&CalendarSettings::default(), &[], stamp());

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nPRODID:"));
        assert!(ics.contains("\r\nVERSION:2.0\r\n"));
        assert!(ics.contains("\r\nCALSCALE:GREGORIAN\r\n"));
        assert!(ics.contains("\r\nMETHOD:PUBLISH\r\n"));
        assert!(ics.contains("\r\nX-WR-CALNAME:TWSE 競價拍賣行事曆\r\n"));
        assert!(ics.contains("\r\nX-WR-TIMEZONE:Asia/Taipei\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_all_day_event_dates() {
        let ics = render_calendar(
            &CalendarSettings::default(),
            &[make_event("a@twse-auction", 10, "開標")],
            stamp(),
        );

        assert!(ics.contains("\r\nDTSTART;VALUE=DATE:20250610\r\n"), "ICS:\n{}", ics);
        assert!(ics.contains("\r\nDTEND;VALUE=DATE:20250611\r\n"), "ICS:\n{}", ics);
        assert!(ics.contains("\r\nDTSTAMP:20250601T083000Z\r\n"));
        assert!(ics.contains("\r\nTRANSP:TRANSPARENT\r\n"));
        assert!(ics.contains("\r\nCATEGORIES:TWSE競價拍賣,開標日\r\n"));
        assert!(!ics.contains("STATUS:"), "Confirmed events carry no STATUS");
    }

    #[test]
    fn test_cancelled_event_has_status() {
        let mut event = make_event("a@twse-auction", 10, "開標");
        event.status = EventStatus::Cancelled;

        let ics = render_calendar(&CalendarSettings::default(), &[event], stamp());

        assert!(ics.contains("\r\nSTATUS:CANCELLED\r\nEND:VEVENT\r\n"));
    }

    #[test]
    fn test_events_sorted_by_date_summary_uid() {
        let events = vec![
            make_event("c@x", 12, "B"),
            make_event("b@x", 10, "B"),
            make_event("a@x", 10, "B"),
            make_event("z@x", 10, "A"),
        ];

        let ics = render_calendar(&CalendarSettings::default(), &events, stamp());
        let uids: Vec<&str> = ics
            .lines()
            .filter_map(|l| l.strip_prefix("UID:"))
            .collect();

        assert_eq!(uids, vec!["z@x", "a@x", "b@x", "c@x"]);
    }

    #[test]
    fn test_render_is_idempotent() {
        let events = vec![make_event("b@x", 11, "B"), make_event("a@x", 10, "A")];
        let mut reversed = events.clone();
        reversed.reverse();

        let first = render_calendar(&CalendarSettings::default(), &events, stamp());
        let second = render_calendar(&CalendarSettings::default(), &reversed, stamp());

        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_uids_collapse() {
        let events = vec![make_event("a@x", 10, "old"), make_event("a@x", 10, "new")];
        let ics = render_calendar(&CalendarSettings::default(), &events, stamp());

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("SUMMARY:new"));
    }

    #[test]
    fn test_every_line_is_crlf_terminated_and_within_limit() {
        let mut event = make_event("a@x", 10, "開標");
        event.description = "證券名稱：很長的名稱,".repeat(30);

        let ics = render_calendar(&CalendarSettings::default(), &[event], stamp());

        assert!(ics.ends_with("\r\n"));
        for line in ics.split("\r\n").filter(|l| !l.is_empty()) {
            assert!(!line.contains('\n'), "Bare LF in {:?}", line);
            assert!(line.len() <= 75, "Line has {} octets: {:?}", line.len(), line);
        }
    }
}

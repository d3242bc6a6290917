//! ICS generation and reading.
//!
//! Output is written by hand rather than through `icalendar`'s builder so that
//! ordering, escaping and folding are byte-for-byte deterministic. The
//! `icalendar` parser is used to read calendars back.

mod generate;
mod parse;
mod text;

pub use generate::{render_calendar, DTSTAMP_FORMAT};
pub use parse::{read_events, ParsedEvent};
pub use text::{escape_text, fold_line, unescape_text, FOLD_LIMIT};

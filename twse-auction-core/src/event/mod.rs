//! Calendar events derived from auction records.

mod derive;
mod uid;

pub use derive::{derive_all, derive_events};
pub use uid::event_uid;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The date-bearing moments of one auction that become calendar entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    BidPeriod,
    BidStart,
    BidEnd,
    Open,
    Listing,
}

impl EventKind {
    /// Tag hashed into the UID. Changing one re-creates every subscriber's entries.
    pub fn uid_tag(&self) -> &'static str {
        match self {
            EventKind::BidPeriod => "bid",
            EventKind::BidStart => "bidstart",
            EventKind::BidEnd => "bidend",
            EventKind::Open => "open",
            EventKind::Listing => "list",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::BidPeriod => "投標",
            EventKind::BidStart => "投標開始",
            EventKind::BidEnd => "投標截止",
            EventKind::Open => "開標",
            EventKind::Listing => "撥券上市櫃",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            EventKind::BidPeriod => "📋",
            EventKind::BidStart => "🟢",
            EventKind::BidEnd => "⏰",
            EventKind::Open => "🔔",
            EventKind::Listing => "🎯",
        }
    }

    /// Secondary category, next to the shared calendar category.
    pub fn category(&self) -> &'static str {
        match self {
            EventKind::BidPeriod => "投標期間",
            EventKind::BidStart => "投標開始日",
            EventKind::BidEnd => "投標結束日",
            EventKind::Open => "開標日",
            EventKind::Listing => "撥券日",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::BidPeriod => "bid-period",
            EventKind::BidStart => "bid-start",
            EventKind::BidEnd => "bid-end",
            EventKind::Open => "open",
            EventKind::Listing => "listing",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Confirmed,
    Cancelled,
}

/// An all-day calendar entry. `end` is exclusive, one day past the last day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub uid: String,
    pub kind: EventKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub summary: String,
    pub description: String,
    pub status: EventStatus,
    pub categories: Vec<String>,
}

impl CalendarEvent {
    pub fn date(&self) -> NaiveDate {
        self.start
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start.format("%Y-%m-%d"), self.summary)
    }
}

//! Core pipeline for the TWSE auction calendar.
//!
//! Upstream rows flow through these modules in order:
//! - `record` normalizes positional rows into named records
//! - `date` parses the source's date text
//! - `event` derives all-day calendar events with stable UIDs
//! - `ics` renders (and reads back) RFC 5545 calendar text
//! - `snapshot` and `diff` compare the current record set with the previous run
//! - `notify` turns a diff into webhook-sized message batches
//!
//! Nothing here touches the network. The binary crate owns fetching and dispatch.

pub mod constants;
pub mod date;
pub mod diff;
pub mod error;
pub mod event;
pub mod ics;
pub mod labels;
pub mod notify;
pub mod pipeline;
pub mod record;
pub mod settings;
pub mod snapshot;
pub mod source;

pub use error::{AuctionError, AuctionResult};
pub use pipeline::Pipeline;
pub use record::{NormalizedRecord, RecordKey, RecordSet};
pub use settings::Settings;

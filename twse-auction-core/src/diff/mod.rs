//! Snapshot diffs between two runs.

mod diff_kind;
mod record_diff;
mod snapshot_diff;

pub use diff_kind::DiffKind;
pub use record_diff::{FieldChange, RecordDiff};
pub use snapshot_diff::{diff_snapshots, DiffResult};

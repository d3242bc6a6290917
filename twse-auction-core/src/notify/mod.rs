//! Change notifications built from snapshot diffs.

mod format;
mod message;

pub use format::{format_diff, test_message};
pub use message::{
    Dispatch, MessageField, MessageFooter, NotificationBatch, NotifyMessage, MAX_FIELDS_PER_MESSAGE,
    MAX_FIELD_VALUE_CHARS,
};

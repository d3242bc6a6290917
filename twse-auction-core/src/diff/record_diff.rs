use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::DiffKind;
use crate::labels::FieldLabels;
use crate::record::{NormalizedRecord, RecordKey};

/// One differing field of a record present in both snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub label: String,
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDiff {
    pub kind: DiffKind,
    pub key: RecordKey,
    /// The new record, or the old one for deletions.
    pub record: NormalizedRecord,
    /// Field-level changes, only populated for updates.
    pub changes: Vec<FieldChange>,
}

impl fmt::Display for RecordDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.key, self.record.name())
    }
}

impl RecordDiff {
    pub fn created(record: &NormalizedRecord) -> Self {
        RecordDiff {
            kind: DiffKind::Create,
            key: record.key(),
            record: record.clone(),
            changes: vec![],
        }
    }

    pub fn deleted(record: &NormalizedRecord) -> Self {
        RecordDiff {
            kind: DiffKind::Delete,
            key: record.key(),
            record: record.clone(),
            changes: vec![],
        }
    }

    /// `None` when every field matches after trimming.
    pub fn updated(
        old: &NormalizedRecord,
        new: &NormalizedRecord,
        labels: &FieldLabels,
    ) -> Option<Self> {
        let changes = field_changes(old, new, labels);
        if changes.is_empty() {
            return None;
        }
        Some(RecordDiff {
            kind: DiffKind::Update,
            key: new.key(),
            record: new.clone(),
            changes,
        })
    }
}

/// Compare the union of both records' fields. Known fields come first in
/// display order, untranslated fields after them by name.
fn field_changes(
    old: &NormalizedRecord,
    new: &NormalizedRecord,
    labels: &FieldLabels,
) -> Vec<FieldChange> {
    let all_fields: BTreeSet<&str> = old.field_names().chain(new.field_names()).collect();

    let mut ordered: Vec<&str> = all_fields.into_iter().collect();
    ordered.sort_by_key(|field| (labels.position(field).unwrap_or(usize::MAX), *field));

    ordered
        .into_iter()
        .filter_map(|field| {
            let before = old.get(field).trim();
            let after = new.get(field).trim();
            if before == after {
                return None;
            }
            Some(FieldChange {
                field: field.to_string(),
                label: labels.label(field).to_string(),
                old: before.to_string(),
                new: after.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::fields;

    fn base() -> NormalizedRecord {
        NormalizedRecord::new()
            .with(fields::CODE, "2330")
            .with(fields::OPEN_DATE, "2025/06/10")
    }

    #[test]
    fn test_identical_records_have_no_update() {
        assert!(RecordDiff::updated(&base(), &base(), &FieldLabels::default()).is_none());
    }

    #[test]
    fn test_missing_field_equals_empty_field() {
        let with_empty = base().with(fields::CANCEL_REASON, "");
        assert!(RecordDiff::updated(&base(), &with_empty, &FieldLabels::default()).is_none());
    }

    #[test]
    fn test_changes_follow_display_order() {
        let old = base()
            .with(fields::QUANTITY, "100")
            .with(fields::NAME, "A")
            .with("zzz", "1");
        let new = base()
            .with(fields::QUANTITY, "200")
            .with(fields::NAME, "B")
            .with("zzz", "2")
            .with(fields::CANCEL_REASON, "流標");

        let diff = RecordDiff::updated(&old, &new, &FieldLabels::default()).unwrap();
        let labels: Vec<&str> = diff.changes.iter().map(|c| c.label.as_str()).collect();

        assert_eq!(labels, vec!["證券名稱", "競拍數量(張)", "取消原因", "zzz"]);
        assert_eq!(diff.changes[2].old, "");
        assert_eq!(diff.changes[2].new, "流標");
    }
}

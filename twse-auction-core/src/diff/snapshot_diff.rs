//! Previous-run vs current-run record comparison.

use crate::diff::{DiffKind, RecordDiff};
use crate::labels::FieldLabels;
use crate::record::RecordSet;

/// Partitioned differences between two snapshots, each sorted by record key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    pub added: Vec<RecordDiff>,
    pub removed: Vec<RecordDiff>,
    pub changed: Vec<RecordDiff>,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// (added, changed, removed)
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.added.len(), self.changed.len(), self.removed.len())
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.changed.len() + self.removed.len()
    }

    /// All entries: added, then changed, then removed.
    pub fn iter(&self) -> impl Iterator<Item = &RecordDiff> {
        self.added.iter().chain(&self.changed).chain(&self.removed)
    }

    pub fn of_kind(&self, kind: DiffKind) -> &[RecordDiff] {
        match kind {
            DiffKind::Create => &self.added,
            DiffKind::Update => &self.changed,
            DiffKind::Delete => &self.removed,
        }
    }
}

/// Diff `old` against `new`.
///
/// Both sets iterate in key order, so every partition comes out sorted.
pub fn diff_snapshots(old: &RecordSet, new: &RecordSet, labels: &FieldLabels) -> DiffResult {
    let mut result = DiffResult::default();

    for (key, record) in new.iter() {
        match old.get(key) {
            None => result.added.push(RecordDiff::created(record)),
            Some(previous) => {
                if let Some(diff) = RecordDiff::updated(previous, record, labels) {
                    result.changed.push(diff);
                }
            }
        }
    }

    for (key, record) in old.iter() {
        if !new.contains_key(key) {
            result.removed.push(RecordDiff::deleted(record));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::fields;
    use crate::record::NormalizedRecord;

    fn record(code: &str, open: &str, name: &str) -> NormalizedRecord {
        NormalizedRecord::new()
            .with(fields::CODE, code)
            .with(fields::OPEN_DATE, open)
            .with("name", name)
    }

    #[test]
    fn test_changed_and_added() {
        let old: RecordSet = [record("2330", "2025/06/10", "A")].into_iter().collect();
        let new: RecordSet = [
            record("2330", "2025/06/10", "B"),
            record("2317", "2025/07/01", "C"),
        ]
        .into_iter()
        .collect();

        let diff = diff_snapshots(&old, &new, &FieldLabels::default());

        assert_eq!(diff.counts(), (1, 1, 0));
        assert_eq!(diff.added[0].key.to_string(), "2317-2025/07/01");

        let changed = &diff.changed[0];
        assert_eq!(changed.key.to_string(), "2330-2025/06/10");
        assert_eq!(changed.changes.len(), 1);
        assert_eq!(changed.changes[0].label, "name");
        assert_eq!(changed.changes[0].old, "A");
        assert_eq!(changed.changes[0].new, "B");
    }

    #[test]
    fn test_removed() {
        let old: RecordSet = [record("2330", "2025/06/10", "A")].into_iter().collect();
        let diff = diff_snapshots(&old, &RecordSet::new(), &FieldLabels::default());

        assert_eq!(diff.counts(), (0, 0, 1));
        assert_eq!(diff.removed[0].kind, DiffKind::Delete);
        assert_eq!(diff.removed[0].record.get("name"), "A");
    }

    #[test]
    fn test_equal_sets_are_empty() {
        let set: RecordSet = [record("2330", "2025/06/10", "A")].into_iter().collect();
        assert!(diff_snapshots(&set, &set.clone(), &FieldLabels::default()).is_empty());
    }

    #[test]
    fn test_added_sorted_by_key() {
        let new: RecordSet = [
            record("9999", "2025/01/01", "Z"),
            record("1111", "2025/01/01", "A"),
            record("5555", "2025/01/01", "M"),
        ]
        .into_iter()
        .collect();

        let diff = diff_snapshots(&RecordSet::new(), &new, &FieldLabels::default());
        let codes: Vec<&str> = diff.added.iter().map(|d| d.key.code.as_str()).collect();

        assert_eq!(codes, vec!["1111", "5555", "9999"]);
    }
}

//! Normalized auction records.
//!
//! Upstream rows are positional. Everything after `normalize_row` works with
//! field names only, so a reordered or extended upstream column list changes
//! nothing downstream.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::constants::fields;
use crate::date::parse_auction_date;

/// One auction announcement as a field-name → trimmed value map.
///
/// Absent fields read as `""`, never as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedRecord(BTreeMap<String, String>);

impl NormalizedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, trimming the value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl AsRef<str>) {
        self.0.insert(field.into(), value.as_ref().trim().to_string());
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with(mut self, field: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }

    /// Field names present in this record, in sorted order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn key(&self) -> RecordKey {
        RecordKey {
            code: self.code().to_string(),
            open_date: self.open_date().to_string(),
        }
    }

    pub fn code(&self) -> &str {
        self.get(fields::CODE)
    }

    pub fn name(&self) -> &str {
        self.get(fields::NAME)
    }

    pub fn market(&self) -> &str {
        self.get(fields::MARKET)
    }

    pub fn issue_type(&self) -> &str {
        self.get(fields::ISSUE_TYPE)
    }

    pub fn auction_method(&self) -> &str {
        self.get(fields::AUCTION_METHOD)
    }

    pub fn lead_underwriter(&self) -> &str {
        self.get(fields::LEAD_UNDERWRITER)
    }

    pub fn bid_start(&self) -> &str {
        self.get(fields::BID_START)
    }

    pub fn bid_end(&self) -> &str {
        self.get(fields::BID_END)
    }

    pub fn open_date(&self) -> &str {
        self.get(fields::OPEN_DATE)
    }

    pub fn listing_date(&self) -> &str {
        self.get(fields::LISTING_DATE)
    }

    pub fn quantity(&self) -> &str {
        self.get(fields::QUANTITY)
    }

    pub fn min_price(&self) -> &str {
        self.get(fields::MIN_PRICE)
    }

    pub fn min_bid_lot(&self) -> &str {
        self.get(fields::MIN_BID_LOT)
    }

    pub fn max_award_lot(&self) -> &str {
        self.get(fields::MAX_AWARD_LOT)
    }

    pub fn deposit_pct(&self) -> &str {
        self.get(fields::DEPOSIT_PCT)
    }

    pub fn handling_fee(&self) -> &str {
        self.get(fields::HANDLING_FEE)
    }

    pub fn cancel_reason(&self) -> &str {
        self.get(fields::CANCEL_REASON)
    }

    pub fn is_cancelled(&self) -> bool {
        !self.cancel_reason().is_empty()
    }

    /// Announcement year, taken from the open date. `None` when it does not parse.
    pub fn open_year(&self) -> Option<i32> {
        parse_auction_date(self.open_date()).map(|date| date.year())
    }
}

/// Map a positional row onto the declared field list.
///
/// Short rows yield empty strings for the missing tail; values past the last
/// declared field are dropped.
pub fn normalize_row<F: AsRef<str>, V: AsRef<str>>(fields: &[F], row: &[V]) -> NormalizedRecord {
    let mut record = NormalizedRecord::new();
    for (idx, field) in fields.iter().enumerate() {
        let value = row.get(idx).map(AsRef::as_ref).unwrap_or("");
        record.insert(field.as_ref(), value);
    }
    record
}

/// Remove thousands separators from a numeric display value.
pub fn clean_number(value: &str) -> String {
    value.replace(',', "")
}

/// Natural identity of one announcement across fetch cycles.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub code: String,
    pub open_date: String,
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.code, self.open_date)
    }
}

/// All records of one run, keyed and ordered by `RecordKey`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet(BTreeMap<RecordKey, NormalizedRecord>);

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its own key. A later record with the same key
    /// replaces the earlier one.
    pub fn insert(&mut self, record: NormalizedRecord) -> Option<NormalizedRecord> {
        self.0.insert(record.key(), record)
    }

    pub fn get(&self, key: &RecordKey) -> Option<&NormalizedRecord> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &RecordKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordKey, &NormalizedRecord)> {
        self.0.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &NormalizedRecord> {
        self.0.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RecordKey> {
        self.0.keys()
    }

    /// Copy records of the given open-date years from `prior` where this set
    /// has no record under the same key. Returns how many were copied.
    pub fn carry_over(&mut self, prior: &RecordSet, years: &[i32]) -> usize {
        let mut copied = 0;
        for (key, record) in prior.iter() {
            let in_years = record.open_year().is_some_and(|year| years.contains(&year));
            if in_years && !self.0.contains_key(key) {
                self.0.insert(key.clone(), record.clone());
                copied += 1;
            }
        }
        copied
    }
}

impl FromIterator<NormalizedRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = NormalizedRecord>>(iter: I) -> Self {
        let mut set = RecordSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_row_trims_and_pads_short_rows() {
        let fields = [fields::CODE, fields::NAME, fields::MARKET];
        let row = ["  2330 ", "台積電\t"];

        let record = normalize_row(&fields, &row);

        assert_eq!(record.code(), "2330");
        assert_eq!(record.name(), "台積電");
        assert_eq!(record.market(), "", "Missing positional value should be empty");
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_normalize_row_ignores_extra_values() {
        let fields = [fields::CODE];
        let row = ["2330", "extra", "more"];

        let record = normalize_row(&fields, &row);

        assert_eq!(record.len(), 1);
        assert_eq!(record.code(), "2330");
    }

    #[test]
    fn test_absent_field_reads_as_empty() {
        let record = NormalizedRecord::new();
        assert_eq!(record.cancel_reason(), "");
        assert_eq!(record.get("no such field"), "");
        assert!(!record.is_cancelled());
    }

    #[test]
    fn test_record_key_ignores_non_identity_fields() {
        let a = NormalizedRecord::new()
            .with(fields::CODE, "91027")
            .with(fields::OPEN_DATE, "2025/06/10")
            .with(fields::NAME, "Old");
        let b = a.clone().with(fields::NAME, "New").with(fields::QUANTITY, "1,000");

        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().to_string(), "91027-2025/06/10");
    }

    #[test]
    fn test_record_set_last_duplicate_wins() {
        let first = NormalizedRecord::new()
            .with(fields::CODE, "2330")
            .with(fields::OPEN_DATE, "2025/06/10")
            .with(fields::NAME, "A");
        let second = first.clone().with(fields::NAME, "B");

        let set: RecordSet = [first, second].into_iter().collect();

        assert_eq!(set.len(), 1);
        assert_eq!(set.records().next().map(|r| r.name()), Some("B"));
    }

    #[test]
    fn test_clean_number() {
        assert_eq!(clean_number("1,234,000"), "1234000");
        assert_eq!(clean_number(""), "");
    }

    #[test]
    fn test_carry_over_copies_only_missing_records_of_given_years() {
        let record = |code: &str, open: &str, name: &str| {
            NormalizedRecord::new()
                .with(fields::CODE, code)
                .with(fields::OPEN_DATE, open)
                .with(fields::NAME, name)
        };
        let prior: RecordSet = [
            record("1111", "2024/03/01", "A"),
            record("2222", "2024/09/01", "B"),
            record("3333", "2025/05/01", "old"),
            record("4444", "", "no date"),
        ]
        .into_iter()
        .collect();
        let mut current: RecordSet = [record("3333", "2025/05/01", "new")].into_iter().collect();

        let copied = current.carry_over(&prior, &[2024]);

        assert_eq!(copied, 2);
        assert_eq!(current.len(), 3);
        assert!(!current.contains_key(&record("4444", "", "").key()));

        let copied = current.carry_over(&prior, &[2025]);
        assert_eq!(copied, 0, "Fetched records are never replaced");
        assert_eq!(current.get(&record("3333", "2025/05/01", "").key()).map(|r| r.name()), Some("new"));
    }

    #[test]
    fn test_open_year() {
        let record = NormalizedRecord::new().with(fields::OPEN_DATE, "2024-12-31");
        assert_eq!(record.open_year(), Some(2024));
        assert_eq!(NormalizedRecord::new().open_year(), None);
    }
}

//! Decoding of upstream TWSE payloads.
//!
//! The HTTP request itself belongs to the caller. This module only turns a
//! response body into a tagged outcome.

use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::constants::NO_DATA_STAT;
use crate::error::{AuctionError, AuctionResult};
use crate::record::{normalize_row, NormalizedRecord};

/// A field-name list and its positional rows, as published for one year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub fields: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    pub fn records(&self) -> impl Iterator<Item = NormalizedRecord> + '_ {
        self.rows.iter().map(|row| normalize_row(&self.fields, row))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Data(SourceTable),
    /// The period has no announcements. Not an error.
    NoData,
    /// The request or its payload failed. Retried by the caller, then surfaced.
    Failed(String),
}

#[derive(Deserialize)]
struct AuctionPayload {
    #[serde(default)]
    stat: String,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

/// Decode the body of `/announcement/auction?date=YYYY&response=json`.
pub fn decode_auction_payload(body: &str) -> FetchOutcome {
    let payload: AuctionPayload = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(e) => return FetchOutcome::Failed(format!("invalid JSON payload: {e}")),
    };

    let stat = payload.stat.trim();
    if stat.contains(NO_DATA_STAT) {
        return FetchOutcome::NoData;
    }
    if !stat.eq_ignore_ascii_case("OK") {
        return FetchOutcome::Failed(format!("upstream stat: {stat}"));
    }
    if payload.data.is_empty() {
        return FetchOutcome::NoData;
    }
    if payload.fields.is_empty() {
        return FetchOutcome::Failed("payload has rows but no field list".to_string());
    }

    let rows = payload
        .data
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    FetchOutcome::Data(SourceTable {
        fields: payload.fields,
        rows,
    })
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Decode the body of `/announcement/auctionYear?response=json`.
pub fn decode_year_range(body: &str) -> AuctionResult<(i32, i32)> {
    let payload: Value =
        serde_json::from_str(body).map_err(|e| AuctionError::SourceData(e.to_string()))?;

    let year = |key: &str| -> AuctionResult<i32> {
        let value = payload
            .get(key)
            .ok_or_else(|| AuctionError::SourceData(format!("missing {key}")))?;
        let parsed = match value {
            Value::Number(n) => n.as_i64().map(|n| n as i32),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| AuctionError::SourceData(format!("invalid {key}: {value}")))
    };

    let (start, end) = (year("startYear")?, year("endYear")?);
    if start > end {
        return Err(AuctionError::SourceData(format!(
            "year range is inverted: {start} > {end}"
        )));
    }
    Ok((start, end))
}

/// Years around `today`: `back` years before through `ahead` years after.
pub fn default_years(today: NaiveDate, back: u32, ahead: u32) -> Vec<i32> {
    let year = today.year();
    ((year - back as i32)..=(year + ahead as i32)).collect()
}

/// Today's date in the named IANA timezone, UTC if the name is unknown.
pub fn today_in(timezone: &str) -> NaiveDate {
    match timezone.parse::<chrono_tz::Tz>() {
        Ok(tz) => Utc::now().with_timezone(&tz).date_naive(),
        Err(_) => {
            warn!(timezone, "unknown timezone, using UTC");
            Utc::now().date_naive()
        }
    }
}

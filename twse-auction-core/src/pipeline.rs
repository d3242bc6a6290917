//! The full normalize → derive → render / diff → notify pipeline.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::diff::{diff_snapshots, DiffResult};
use crate::event::{derive_all, CalendarEvent};
use crate::ics::render_calendar;
use crate::labels::FieldLabels;
use crate::notify::{format_diff, NotificationBatch};
use crate::record::RecordSet;
use crate::settings::Settings;
use crate::source::SourceTable;

/// Everything one run produces from its inputs.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub records: RecordSet,
    pub events: Vec<CalendarEvent>,
    pub calendar: String,
    /// `None` on a first run, when there was nothing to compare against.
    pub diff: Option<DiffResult>,
    pub notifications: Option<NotificationBatch>,
}

/// Pure pipeline over injected settings. Same inputs and timestamp, same output.
pub struct Pipeline<'a> {
    settings: &'a Settings,
    labels: FieldLabels,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Pipeline {
            settings,
            labels: settings.field_labels(),
        }
    }

    pub fn labels(&self) -> &FieldLabels {
        &self.labels
    }

    /// Normalize every table into one keyed set. Overlapping years may repeat
    /// an announcement; the later table wins.
    pub fn records<'t>(&self, tables: impl IntoIterator<Item = &'t SourceTable>) -> RecordSet {
        let mut records = RecordSet::new();
        for table in tables {
            for record in table.records() {
                let key = record.key();
                if records.insert(record).is_some() {
                    debug!(%key, "duplicate record key, keeping the later row");
                }
            }
        }
        records
    }

    /// The record set this run stands for. Years that failed to fetch keep
    /// their records from `prior`, so a transient failure neither reports
    /// them as removed nor drops them from the calendar and snapshot.
    pub fn current_records(
        &self,
        tables: &[SourceTable],
        prior: Option<&RecordSet>,
        failed_years: &[i32],
    ) -> RecordSet {
        let mut records = self.records(tables);
        if !failed_years.is_empty()
            && let Some(prior) = prior
        {
            let kept = records.carry_over(prior, failed_years);
            warn!(?failed_years, kept, "kept previous records for years that failed to fetch");
        }
        records
    }

    pub fn events(&self, records: &RecordSet) -> Vec<CalendarEvent> {
        derive_all(records, &self.settings.events, &self.settings.calendar, &self.labels)
    }

    pub fn render(&self, events: &[CalendarEvent], dtstamp: DateTime<Utc>) -> String {
        render_calendar(&self.settings.calendar, events, dtstamp)
    }

    pub fn diff(&self, prior: &RecordSet, current: &RecordSet) -> DiffResult {
        diff_snapshots(prior, current, &self.labels)
    }

    /// Notifications for the change since `prior`. A missing prior snapshot
    /// means a first run, which never notifies.
    pub fn notifications(
        &self,
        prior: Option<&RecordSet>,
        current: &RecordSet,
    ) -> Option<NotificationBatch> {
        let prior = prior?;
        format_diff(&self.diff(prior, current), &self.settings.notify, &self.labels)
    }

    /// Build everything for one run. `failed_years` lists requested years
    /// whose fetch failed; see `current_records`.
    pub fn run(
        &self,
        tables: &[SourceTable],
        prior: Option<&RecordSet>,
        failed_years: &[i32],
        dtstamp: DateTime<Utc>,
    ) -> RunOutput {
        let records = self.current_records(tables, prior, failed_years);
        let events = self.events(&records);
        let calendar = self.render(&events, dtstamp);
        info!(records = records.len(), events = events.len(), "built calendar");

        let diff = prior.map(|prior| self.diff(prior, &records));
        let notifications = diff
            .as_ref()
            .and_then(|d| format_diff(d, &self.settings.notify, &self.labels));

        match &diff {
            Some(d) => {
                let (added, changed, removed) = d.counts();
                info!(added, changed, removed, "compared with previous snapshot");
            }
            None => info!("no previous snapshot, notifications suppressed"),
        }

        RunOutput {
            records,
            events,
            calendar,
            diff,
            notifications,
        }
    }
}

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use owo_colors::OwoColorize;
use tracing::{debug, info, warn};
use twse_auction_core::ics::read_events;
use twse_auction_core::snapshot::{write_atomic, SnapshotStore};
use twse_auction_core::{Pipeline, Settings};

use super::{fetch_period, YearArgs};
use crate::render::DiffResultRender;
use crate::webhook::WebhookClient;

pub struct GenerateOptions {
    pub years: YearArgs,
    pub output: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
    pub no_notify: bool,
    pub dry_run: bool,
}

pub async fn run(settings: &Settings, options: GenerateOptions) -> Result<()> {
    let calendar_path = options
        .output
        .clone()
        .unwrap_or_else(|| settings.output.calendar_path());
    let store = SnapshotStore::new(
        options
            .snapshot
            .clone()
            .unwrap_or_else(|| settings.output.snapshot_path()),
    );

    let report = fetch_period(settings, &options.years).await?;
    for (year, reason) in &report.failed_years {
        println!("   {} {}: {}", "!".red(), year, reason.red());
    }
    for year in &report.empty_years {
        println!("   {}", format!("{year}: no announcements").dimmed());
    }

    let prior = store.load();
    let dtstamp = Utc::now();
    let pipeline = Pipeline::new(settings);
    let failed = report.failed_year_list();
    if !failed.is_empty() && prior.is_none() {
        warn!(?failed, "no snapshot to fall back on, failed years are missing from this calendar");
    }
    let output = pipeline.run(&report.tables, prior.as_ref(), &failed, dtstamp);

    println!(
        "📅 {} records, {} events",
        output.records.len(),
        output.events.len()
    );
    if let Some(ref diff) = output.diff {
        println!("{}", diff.render(false));
    }

    if options.dry_run {
        println!("{}", "Dry run, nothing written.".dimmed());
        return Ok(());
    }

    log_uid_delta(&calendar_path, &output.calendar);
    write_atomic(&calendar_path, output.calendar.as_bytes())
        .with_context(|| format!("writing {}", calendar_path.display()))?;
    info!(path = %calendar_path.display(), "wrote calendar");

    if let Some(ref batch) = output.notifications {
        if options.no_notify {
            info!(messages = batch.len(), "notifications skipped (--no-notify)");
        } else {
            match WebhookClient::from_settings(&settings.notify)? {
                Some(webhook) => {
                    let failures = webhook.send_batch(batch).await;
                    if failures > 0 {
                        warn!(failures, "some notifications were not delivered");
                    }
                }
                None => info!(messages = batch.len(), "no webhook configured, notifications skipped"),
            }
        }
    }

    store
        .save(&output.records, dtstamp)
        .with_context(|| format!("writing {}", store.path().display()))?;
    info!(path = %store.path().display(), "saved snapshot");

    println!("Wrote {}", calendar_path.display());
    Ok(())
}

/// Compare event UIDs with the calendar currently on disk.
fn log_uid_delta(path: &Path, calendar: &str) {
    let Ok(previous) = std::fs::read_to_string(path) else {
        debug!(path = %path.display(), "no previous calendar");
        return;
    };

    let uids = |content: &str| -> Option<BTreeSet<String>> {
        match read_events(content) {
            Ok(events) => Some(events.into_iter().map(|e| e.uid).collect()),
            Err(e) => {
                warn!("could not read calendar back: {e}");
                None
            }
        }
    };

    let (Some(old), Some(new)) = (uids(&previous), uids(calendar)) else {
        return;
    };
    let added = new.difference(&old).count();
    let removed = old.difference(&new).count();
    info!(added, removed, kept = new.len() - added, "calendar events");
}

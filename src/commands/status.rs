use anyhow::Result;
use owo_colors::OwoColorize;
use twse_auction_core::snapshot::SnapshotStore;
use twse_auction_core::{Pipeline, Settings};

use super::{fetch_period, YearArgs};
use crate::render::DiffResultRender;

/// Show what `generate` would change, without writing or notifying.
pub async fn run(settings: &Settings, years: &YearArgs, verbose: bool) -> Result<()> {
    let report = fetch_period(settings, years).await?;
    let store = SnapshotStore::new(settings.output.snapshot_path());

    let prior = store.load();
    let pipeline = Pipeline::new(settings);
    let current = pipeline.current_records(&report.tables, prior.as_ref(), &report.failed_year_list());

    println!("📅 {}", settings.calendar.name);

    for (year, reason) in &report.failed_years {
        println!("   {} {}: {}", "!".red(), year, reason.red());
    }

    match prior {
        Some(prior) => {
            let diff = pipeline.diff(&prior, &current);
            println!("{}", diff.render(verbose));
        }
        None => {
            let events = pipeline.events(&current);
            println!(
                "   {}",
                format!(
                    "No snapshot at {}. First run would record {} records and {} events.",
                    store.path().display(),
                    current.len(),
                    events.len()
                )
                .dimmed()
            );
        }
    }

    Ok(())
}

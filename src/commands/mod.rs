pub mod config;
pub mod generate;
pub mod status;
pub mod test_webhook;

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};
use twse_auction_core::Settings;
use twse_auction_core::source::{default_years, today_in};

use crate::fetch::{AuctionClient, FetchReport};
use crate::utils::tui::create_spinner;

/// Which announcement years to fetch.
#[derive(Debug, Clone, Default, Args)]
pub struct YearArgs {
    /// Years to fetch, comma-separated (default: last, this and next year)
    #[arg(long, value_delimiter = ',', conflicts_with = "all_years")]
    pub years: Vec<i32>,

    /// Fetch every year the upstream has announcements for
    #[arg(long)]
    pub all_years: bool,
}

impl YearArgs {
    pub async fn resolve(&self, client: &AuctionClient, settings: &Settings) -> Result<Vec<i32>> {
        if !self.years.is_empty() {
            let mut years = self.years.clone();
            years.sort_unstable();
            years.dedup();
            return Ok(years);
        }

        if self.all_years {
            let (start, end) = client.fetch_year_range().await?;
            info!(start, end, "upstream year range");
            return Ok((start..=end).collect());
        }

        let today = today_in(&settings.calendar.timezone);
        Ok(default_years(
            today,
            settings.source.years_back,
            settings.source.years_ahead,
        ))
    }
}

/// Fetch the requested years behind a spinner.
///
/// Zero rows over the whole period is an error, whatever the per-year outcomes.
pub async fn fetch_period(settings: &Settings, year_args: &YearArgs) -> Result<FetchReport> {
    let client = AuctionClient::new(&settings.source)?;
    let years = year_args.resolve(&client, settings).await?;

    let spinner = create_spinner(format!("Fetching {}", describe_years(&years)));
    let report = client.fetch_years(&years).await;
    spinner.finish_and_clear();

    check_report(&report, &years)?;
    Ok(report)
}

/// Fails when the period returned no rows at all.
///
/// Empty or failed years alongside rows elsewhere pass. Failed years are
/// covered by the previous snapshot downstream.
pub fn check_report(report: &FetchReport, years: &[i32]) -> Result<()> {
    if report.row_count() > 0 {
        if !report.failed_years.is_empty() {
            warn!(failed = report.failed_years.len(), "continuing with a partial fetch");
        }
        return Ok(());
    }

    let failures: Vec<String> = report
        .failed_years
        .iter()
        .map(|(year, reason)| format!("  {year}: {reason}"))
        .collect();
    if failures.is_empty() {
        anyhow::bail!("No auction data for {}.", describe_years(years));
    }
    anyhow::bail!(
        "No auction data for {}.\n{}",
        describe_years(years),
        failures.join("\n")
    );
}

fn describe_years(years: &[i32]) -> String {
    match years {
        [] => "no years".to_string(),
        [only] => only.to_string(),
        [first, .., last] => format!("{first}–{last}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twse_auction_core::source::SourceTable;

    fn rows(count: usize) -> SourceTable {
        SourceTable {
            fields: vec!["OPEN_DATE".to_string()],
            rows: vec![vec!["2025/06/10".to_string()]; count],
        }
    }

    #[test]
    fn test_describe_years() {
        assert_eq!(describe_years(&[]), "no years");
        assert_eq!(describe_years(&[2025]), "2025");
        assert_eq!(describe_years(&[2024, 2025, 2026]), "2024–2026");
    }

    #[test]
    fn test_zero_rows_fails() {
        let report = FetchReport {
            empty_years: vec![2024, 2025],
            ..Default::default()
        };
        let err = check_report(&report, &[2024, 2025]).unwrap_err();
        assert_eq!(err.to_string(), "No auction data for 2024–2025.");

        let report = FetchReport {
            tables: vec![rows(0)],
            failed_years: vec![(2024, "HTTP 503".to_string())],
            ..Default::default()
        };
        let err = check_report(&report, &[2024, 2025]).unwrap_err();
        assert!(err.to_string().contains("  2024: HTTP 503"), "Got {err}");
    }

    #[test]
    fn test_empty_years_with_rows_pass() {
        let report = FetchReport {
            tables: vec![rows(3)],
            empty_years: vec![2026],
            ..Default::default()
        };
        assert!(check_report(&report, &[2025, 2026]).is_ok());
    }

    #[test]
    fn test_failed_years_with_rows_pass() {
        let report = FetchReport {
            tables: vec![rows(1)],
            failed_years: vec![(2024, "timeout".to_string())],
            ..Default::default()
        };
        assert!(check_report(&report, &[2024, 2025]).is_ok());
        assert_eq!(report.failed_year_list(), vec![2024]);
    }
}

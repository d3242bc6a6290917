//! HTTP side of the upstream source: request, bounded retry, decode.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use tracing::{debug, info, warn};
use twse_auction_core::settings::SourceSettings;
use twse_auction_core::source::{decode_auction_payload, decode_year_range, FetchOutcome, SourceTable};

const USER_AGENT: &str = concat!("Mozilla/5.0 (compatible; twse-auction/", env!("CARGO_PKG_VERSION"), ")");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retryable,
    NonRetryable,
}

pub fn classify_status(status: StatusCode) -> RetryDisposition {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        RetryDisposition::Retryable
    } else {
        RetryDisposition::NonRetryable
    }
}

pub fn classify_reqwest_error(err: &reqwest::Error) -> RetryDisposition {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        RetryDisposition::Retryable
    } else {
        RetryDisposition::NonRetryable
    }
}

/// Exponential backoff: `base_delay * 2^attempt`, capped at `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl BackoffPolicy {
    pub fn from_settings(settings: &SourceSettings) -> Self {
        BackoffPolicy {
            max_attempts: settings.max_attempts.max(1),
            base_delay: settings.base_delay,
            max_delay: settings.max_delay,
        }
    }

    pub fn delay_for_attempt(&self, attempt_index: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt_index).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// What came back for one requested period.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub tables: Vec<SourceTable>,
    pub empty_years: Vec<i32>,
    pub failed_years: Vec<(i32, String)>,
}

impl FetchReport {
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }

    pub fn failed_year_list(&self) -> Vec<i32> {
        self.failed_years.iter().map(|(year, _)| *year).collect()
    }
}

pub struct AuctionClient {
    client: reqwest::Client,
    api_base: String,
    backoff: BackoffPolicy,
}

impl AuctionClient {
    pub fn new(settings: &SourceSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("building HTTP client")?;

        Ok(AuctionClient {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            backoff: BackoffPolicy::from_settings(settings),
        })
    }

    /// GET `url`, retrying transient failures according to the backoff policy.
    async fn get_text(&self, url: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            let last_attempt = attempt + 1 >= self.backoff.max_attempts;

            match self.client.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp.text().await.with_context(|| format!("reading body of {url}"));
                    }
                    if classify_status(status) == RetryDisposition::NonRetryable || last_attempt {
                        anyhow::bail!("HTTP {} for {}", status.as_u16(), url);
                    }
                    debug!(%status, attempt, url, "retryable status");
                }
                Err(err) => {
                    if classify_reqwest_error(&err) == RetryDisposition::NonRetryable || last_attempt {
                        return Err(err).with_context(|| format!("requesting {url}"));
                    }
                    debug!(error = %err, attempt, url, "retryable request error");
                }
            }

            tokio::time::sleep(self.backoff.delay_for_attempt(attempt)).await;
            attempt += 1;
        }
    }

    pub async fn fetch_year(&self, year: i32) -> FetchOutcome {
        let url = format!("{}/auction?date={}&response=json", self.api_base, year);
        match self.get_text(&url).await {
            Ok(body) => decode_auction_payload(&body),
            Err(e) => FetchOutcome::Failed(format!("{e:#}")),
        }
    }

    /// First and last year the upstream has announcements for.
    pub async fn fetch_year_range(&self) -> Result<(i32, i32)> {
        let url = format!("{}/auctionYear?response=json", self.api_base);
        let body = self.get_text(&url).await?;
        Ok(decode_year_range(&body)?)
    }

    /// Fetch every year in turn. Per-year failures are recorded, not fatal.
    pub async fn fetch_years(&self, years: &[i32]) -> FetchReport {
        let mut report = FetchReport::default();

        for &year in years {
            match self.fetch_year(year).await {
                FetchOutcome::Data(table) => {
                    info!(year, rows = table.rows.len(), "fetched auction announcements");
                    report.tables.push(table);
                }
                FetchOutcome::NoData => {
                    info!(year, "no announcements");
                    report.empty_years.push(year);
                }
                FetchOutcome::Failed(reason) => {
                    warn!(year, %reason, "fetch failed");
                    report.failed_years.push((year, reason));
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        let policy = BackoffPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
        };

        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(350));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_millis(350));
    }

    #[test]
    fn test_from_settings_needs_one_attempt() {
        let settings = SourceSettings {
            max_attempts: 0,
            ..SourceSettings::default()
        };
        assert_eq!(BackoffPolicy::from_settings(&settings).max_attempts, 1);
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), RetryDisposition::Retryable);
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS), RetryDisposition::Retryable);
        assert_eq!(classify_status(StatusCode::NOT_FOUND), RetryDisposition::NonRetryable);
    }

    #[test]
    fn test_row_count_sums_tables() {
        let table = |n: usize| SourceTable {
            fields: vec!["a".into()],
            rows: vec![vec!["x".into()]; n],
        };
        let report = FetchReport {
            tables: vec![table(2), table(3)],
            ..FetchReport::default()
        };
        assert_eq!(report.row_count(), 5);
    }
}

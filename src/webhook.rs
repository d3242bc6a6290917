//! Webhook transport for notification batches.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};
use twse_auction_core::notify::{Dispatch, NotificationBatch, NotifyMessage};
use twse_auction_core::settings::NotifySettings;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    embeds: &'a [NotifyMessage],
}

pub struct WebhookClient<'a> {
    client: reqwest::Client,
    url: String,
    settings: &'a NotifySettings,
}

impl<'a> WebhookClient<'a> {
    pub fn new(url: impl Into<String>, settings: &'a NotifySettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .context("building webhook client")?;

        Ok(WebhookClient {
            client,
            url: url.into(),
            settings,
        })
    }

    /// Client for the configured webhook, `None` when none is set.
    pub fn from_settings(settings: &'a NotifySettings) -> Result<Option<Self>> {
        match settings.webhook_url.as_deref() {
            Some(url) => Ok(Some(Self::new(url, settings)?)),
            None => Ok(None),
        }
    }

    /// POST one dispatch. A non-success status is an error.
    pub async fn send(&self, dispatch: &Dispatch<'_>) -> Result<()> {
        let payload = WebhookPayload {
            username: &self.settings.username,
            avatar_url: self.settings.avatar_url.as_deref(),
            content: dispatch.content,
            embeds: dispatch.messages,
        };

        let resp = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .context("posting to webhook")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body: String = body.chars().take(300).collect();
            anyhow::bail!("webhook returned HTTP {}: {}", status.as_u16(), body);
        }
        Ok(())
    }

    /// Send a whole batch, one call per chunk. Failures are logged and the
    /// rest of the batch still goes out. Returns the number of calls that failed.
    pub async fn send_batch(&self, batch: &NotificationBatch) -> usize {
        let dispatches = batch.dispatches(self.settings.max_messages_per_dispatch);
        let mut failures = 0;

        for (i, dispatch) in dispatches.iter().enumerate() {
            match self.send(dispatch).await {
                Ok(()) => info!(
                    part = i + 1,
                    of = dispatches.len(),
                    messages = dispatch.messages.len(),
                    "sent notification"
                ),
                Err(e) => {
                    failures += 1;
                    warn!(part = i + 1, of = dispatches.len(), "notification failed: {e:#}");
                }
            }
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twse_auction_core::notify::test_message;

    #[test]
    fn test_payload_shape() {
        let settings = NotifySettings::default();
        let messages = vec![test_message(&settings, "2025-06-01 08:00:00")];
        let payload = WebhookPayload {
            username: &settings.username,
            avatar_url: settings.avatar_url.as_deref(),
            content: Some("hello"),
            embeds: &messages,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["username"], "TWSE 競價拍賣通知");
        assert_eq!(json["content"], "hello");
        assert_eq!(json["embeds"].as_array().map(|a| a.len()), Some(1));
        assert_eq!(json["embeds"][0]["fields"][0]["value"], "2025-06-01 08:00:00");
    }

    #[test]
    fn test_payload_omits_missing_content() {
        let settings = NotifySettings::default();
        let payload = WebhookPayload {
            username: &settings.username,
            avatar_url: None,
            content: None,
            embeds: &[],
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("content").is_none());
        assert!(json.get("avatar_url").is_none());
    }

    #[test]
    fn test_no_client_without_url() {
        let settings = NotifySettings::default();
        assert!(WebhookClient::from_settings(&settings).unwrap().is_none());
    }
}

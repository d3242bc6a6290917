use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use twse_auction_core::Settings;
use twse_auction_core::notify::{test_message, Dispatch};

use crate::webhook::WebhookClient;

const TEST_CONTENT: &str = "🔔 **連線測試成功！**";

pub async fn run(settings: &Settings, url: Option<String>) -> Result<()> {
    let Some(url) = url.or_else(|| settings.notify.webhook_url.clone()) else {
        anyhow::bail!(
            "No webhook URL.\n\n\
            Pass one directly:\n  \
            twse-auction test-webhook https://discord.com/api/webhooks/...\n\n\
            or set notify.webhook_url in the config file, or DISCORD_WEBHOOK_URL."
        );
    };

    let sent_at = match settings.calendar.timezone.parse::<chrono_tz::Tz>() {
        Ok(tz) => Utc::now().with_timezone(&tz).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    };

    let messages = [test_message(&settings.notify, &sent_at)];
    let dispatch = Dispatch {
        content: Some(TEST_CONTENT),
        messages: &messages,
    };

    WebhookClient::new(url, &settings.notify)?.send(&dispatch).await?;
    println!("{}", "Test message sent.".green());

    Ok(())
}

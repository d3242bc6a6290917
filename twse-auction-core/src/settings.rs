//! Runtime settings, loaded once at startup.
//!
//! Sources are layered: built-in defaults, then an optional TOML file
//! (`~/.config/twse-auction/config.toml` unless a path is given), then
//! `TWSE_AUCTION__<SECTION>__<KEY>` environment variables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_SOURCE_PAGE, DEFAULT_TIMEZONE, DEFAULT_UID_DOMAIN,
    MAX_MESSAGES_PER_DISPATCH,
};
use crate::error::{AuctionError, AuctionResult};
use crate::labels::FieldLabels;

const ENV_PREFIX: &str = "TWSE_AUCTION";
const WEBHOOK_ENV_FALLBACK: &str = "DISCORD_WEBHOOK_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub calendar: CalendarSettings,
    pub events: EventSettings,
    pub source: SourceSettings,
    pub notify: NotifySettings,
    pub output: OutputSettings,
    /// Extra or replacement field labels, keyed by upstream field name.
    pub labels: BTreeMap<String, String>,
}

/// Calendar-level properties written into the header of the .ics file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    pub name: String,
    pub prod_id: String,
    pub timezone: String,
    pub source_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Suggested refresh interval for subscribers (X-PUBLISHED-TTL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_ttl: Option<String>,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        CalendarSettings {
            name: "TWSE 競價拍賣行事曆".to_string(),
            prod_id: "-//TWSE Auction Calendar//twse.com.tw//".to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            source_url: DEFAULT_SOURCE_PAGE.to_string(),
            description: None,
            published_ttl: Some("PT6H".to_string()),
        }
    }
}

/// Which events are derived per record and how their UIDs are built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Emit one multi-day event spanning the bidding period.
    pub emit_bid_period: bool,
    /// Emit separate single-day events for bid start and bid end.
    pub emit_bid_points: bool,
    pub uid_prefix: String,
    pub uid_domain: String,
    pub hash_algorithm: HashAlgorithm,
}

impl Default for EventSettings {
    fn default() -> Self {
        EventSettings {
            emit_bid_period: true,
            emit_bid_points: false,
            uid_prefix: String::new(),
            uid_domain: DEFAULT_UID_DOMAIN.to_string(),
            hash_algorithm: HashAlgorithm::Md5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha1,
    Sha256,
}

/// Upstream fetch policy. Used by the caller, never by the core itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub api_base: String,
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
    pub max_attempts: u32,
    #[serde(with = "humantime_duration")]
    pub base_delay: Duration,
    #[serde(with = "humantime_duration")]
    pub max_delay: Duration,
    /// Default year window around the current year when none is requested.
    pub years_back: u32,
    pub years_ahead: u32,
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
            years_back: 1,
            years_ahead: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub footer: String,
    pub max_messages_per_dispatch: usize,
}

impl Default for NotifySettings {
    fn default() -> Self {
        NotifySettings {
            webhook_url: None,
            username: "TWSE 競價拍賣通知".to_string(),
            avatar_url: Some("https://www.twse.com.tw/favicon.ico".to_string()),
            footer: "TWSE 競價拍賣行事曆".to_string(),
            max_messages_per_dispatch: MAX_MESSAGES_PER_DISPATCH,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub calendar_path: PathBuf,
    pub snapshot_path: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            calendar_path: PathBuf::from("docs/twse-auction.ics"),
            snapshot_path: PathBuf::from("docs/snapshot.json"),
        }
    }
}

impl OutputSettings {
    pub fn calendar_path(&self) -> PathBuf {
        expand_path(&self.calendar_path)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        expand_path(&self.snapshot_path)
    }
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

impl Settings {
    /// ~/.config/twse-auction/config.toml
    pub fn default_path() -> AuctionResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AuctionError::Config("Could not determine config directory".into()))?
            .join("twse-auction");

        Ok(config_dir.join("config.toml"))
    }

    /// Load settings. An explicitly given file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> AuctionResult<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        let mut settings: Settings = ::config::Config::builder()
            .add_source(::config::File::from(path).required(required))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AuctionError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AuctionError::Config(e.to_string()))?;

        if settings.notify.webhook_url.is_none() {
            settings.notify.webhook_url = std::env::var(WEBHOOK_ENV_FALLBACK)
                .ok()
                .filter(|url| !url.trim().is_empty());
        }

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> AuctionResult<()> {
        if self.source.max_attempts == 0 {
            return Err(AuctionError::Config("source.max_attempts must be at least 1".into()));
        }
        if self.notify.max_messages_per_dispatch == 0 {
            return Err(AuctionError::Config(
                "notify.max_messages_per_dispatch must be at least 1".into(),
            ));
        }
        if self.events.uid_domain.trim().is_empty() {
            return Err(AuctionError::Config("events.uid_domain must not be empty".into()));
        }
        Ok(())
    }

    pub fn field_labels(&self) -> FieldLabels {
        FieldLabels::with_overrides(&self.labels)
    }

    /// Effective settings rendered as TOML.
    pub fn to_toml(&self) -> AuctionResult<String> {
        toml::to_string_pretty(self).map_err(|e| AuctionError::Serialization(e.to_string()))
    }

    /// Create a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> AuctionResult<()> {
        let defaults = Settings::default();
        let contents = format!(
            "\
# twse-auction configuration

[calendar]
# name = \"{name}\"
# timezone = \"{timezone}\"

[events]
# emit_bid_period = true
# emit_bid_points = false
# uid_prefix = \"\"
# hash_algorithm = \"md5\"   # md5 | sha1 | sha256

[source]
# api_base = \"{api_base}\"
# timeout = \"30s\"
# max_attempts = 3
# base_delay = \"1s\"

[notify]
# webhook_url = \"https://discord.com/api/webhooks/...\"
# max_messages_per_dispatch = {max_messages}

[output]
# calendar_path = \"{calendar_path}\"
# snapshot_path = \"{snapshot_path}\"
",
            name = defaults.calendar.name,
            timezone = defaults.calendar.timezone,
            api_base = defaults.source.api_base,
            max_messages = defaults.notify.max_messages_per_dispatch,
            calendar_path = defaults.output.calendar_path.display(),
            snapshot_path = defaults.output.snapshot_path.display(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuctionError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AuctionError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

/// Durations as humantime strings ("30s", "1m 30s").
mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

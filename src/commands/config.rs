use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use twse_auction_core::Settings;

/// Create a commented default config file. Refuses to overwrite.
pub fn init(config_path: &Path) -> Result<()> {
    if config_path.exists() {
        anyhow::bail!("Config file already exists: {}", config_path.display());
    }
    Settings::create_default_config(config_path)?;
    println!("Created {}", config_path.display());
    Ok(())
}

/// Print resolved paths and the effective settings. The webhook URL is masked.
pub fn show(settings: &Settings, config_path: &Path) -> Result<()> {
    println!("{}", "Paths".bold());
    println!("  Config:    {}", config_path.display());
    println!("  Calendar:  {}", settings.output.calendar_path().display());
    println!("  Snapshot:  {}", settings.output.snapshot_path().display());
    println!();
    println!("{}", "Effective settings".bold());
    let mut shown = settings.clone();
    if shown.notify.webhook_url.is_some() {
        shown.notify.webhook_url = Some("(set)".to_string());
    }
    print!("{}", shown.to_toml()?);

    Ok(())
}

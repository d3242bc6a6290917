mod commands;
mod fetch;
mod render;
mod utils;
mod webhook;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use twse_auction_core::Settings;

use commands::YearArgs;
use commands::generate::GenerateOptions;

#[derive(Parser)]
#[command(name = "twse-auction")]
#[command(about = "Publish TWSE auction announcements as a subscribable calendar")]
struct Cli {
    /// Config file (default: ~/.config/twse-auction/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch announcements, write the calendar, notify on changes
    Generate {
        #[command(flatten)]
        years: YearArgs,

        /// Calendar output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Snapshot path
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Write files but send no notifications
        #[arg(long)]
        no_notify: bool,

        /// Fetch and diff only, write nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Show changes since the last snapshot
    Status {
        #[command(flatten)]
        years: YearArgs,

        /// List every changed record
        #[arg(short, long)]
        all: bool,
    },
    /// Send a connectivity test message to the webhook
    TestWebhook {
        /// Webhook URL (default: notify.webhook_url or DISCORD_WEBHOOK_URL)
        url: Option<String>,
    },
    /// Show effective settings
    Config {
        /// Write a commented default config file
        #[arg(long)]
        init: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "info,twse_auction=debug,twse_auction_core=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = match cli.config {
        Some(ref path) => path.clone(),
        None => Settings::default_path()?,
    };

    if let Commands::Config { init: true } = cli.command {
        return commands::config::init(&config_path);
    }

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            years,
            output,
            snapshot,
            no_notify,
            dry_run,
        } => {
            let options = GenerateOptions {
                years,
                output,
                snapshot,
                no_notify,
                dry_run,
            };
            commands::generate::run(&settings, options).await
        }
        Commands::Status { years, all } => commands::status::run(&settings, &years, all).await,
        Commands::TestWebhook { url } => commands::test_webhook::run(&settings, url).await,
        Commands::Config { .. } => commands::config::show(&settings, &config_path),
    }
}

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/receipts.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    /// Bearer token of the current user. Never read from the command line.
    pub token: Option<String>,
    pub level: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            token: None,
            level: "info".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Parser)]
#[command(name = "receipts")]
#[command(about = "Receipt dashboard analytics from the command line")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:8000).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override log level.
    #[arg(long, global = true)]
    pub level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch receipts and print the analytics summary.
    Summary(SummaryArgs),
    /// Mark a receipt as completed, then print the refreshed summary.
    Complete(CompleteArgs),
    /// Delete every receipt, then print the refreshed summary.
    Clear(ClearArgs),
    /// Subscribe an email address to anomaly alerts.
    Subscribe(SubscribeArgs),
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Read the snapshot from a JSON file instead of the backend.
    #[arg(long)]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct CompleteArgs {
    pub receipt_id: String,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Confirm deletion of all receipts.
    #[arg(long)]
    pub yes: bool,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct SubscribeArgs {
    pub email: String,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct OutputArgs {
    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Layers the config file, `RECEIPTS_*` environment variables and command
/// line overrides, in that order.
pub fn load(cli: &Cli) -> Result<Settings> {
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("RECEIPTS"));
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(level) = &cli.level {
        settings.level = level.clone();
    }

    Ok(settings)
}

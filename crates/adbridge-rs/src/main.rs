//! Command-line tools for checking bridge config and replaying native events.

use adbridge_rs::config::{BridgeConfig, DEFAULT_CONFIG_FILE};
use adbridge_rs::replay::{self, ReplayRecord};
use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Command-line options for the adbridge tool.
#[derive(Parser)]
#[command(name = "adbridge", version)]
struct Cli {
    /// Optional path to an adbridge.json5 config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load and validate config, then print the effective result
    CheckConfig,
    /// Replay recorded native events through a bridge
    Replay {
        /// JSON-lines file of `{ channel, event }` records
        #[arg(long)]
        events: PathBuf,
        /// Logical key to watch, e.g. interstitial_<ad unit> (repeatable)
        #[arg(long = "watch")]
        watch: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::CheckConfig => {
            let rendered =
                serde_json::to_string_pretty(&config).context("failed to render config")?;
            println!("{rendered}");
        }
        Command::Replay { events, watch } => {
            let file = File::open(&events)
                .with_context(|| format!("failed to open {}", events.display()))?;
            let records = ReplayRecord::read_all(BufReader::new(file))
                .with_context(|| format!("failed to read {}", events.display()))?;
            info!(
                "replaying {} records from {}",
                records.len(),
                events.display()
            );
            let summary = replay::replay(&config, &records, &watch)
                .await
                .context("replay failed")?;
            let rendered =
                serde_json::to_string_pretty(&summary).context("failed to render summary")?;
            println!("{rendered}");
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BridgeConfig> {
    if let Some(path) = path {
        info!("loading config from path: {}", path.display());
        return BridgeConfig::load_from_path(path).context("failed to load config");
    }
    let cwd = std::env::current_dir().context("cwd")?;
    info!(
        "loading layered config (file={}, cwd={})",
        DEFAULT_CONFIG_FILE,
        cwd.display()
    );
    let layered = BridgeConfig::load_layered(&cwd).context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

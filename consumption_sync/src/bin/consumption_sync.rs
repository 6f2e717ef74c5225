use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use consumption_sync::calendar::METERING_TZ;
use consumption_sync::checkpoint::Checkpoint;
use consumption_sync::engine::SyncEngine;
use consumption_sync::predict::{AverageTable, predict};
use metering_ingestor::config::PortalConfig;
use metering_ingestor::io::sink::DataSink;
use metering_ingestor::io::statistics::{CsvFileSink, JsonLinesSink};
use metering_ingestor::models::statistics::StatisticPoint;
use metering_ingestor::providers::ConsumptionDataProvider;
use metering_ingestor::providers::ekz_rest::EkzProvider;

#[derive(Parser)]
#[command(version, about = "Consumption history sync CLI")]
struct Cli {
    /// Path to the credentials TOML file (defaults to ekzsync.toml lookup)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List the account's contracts
    Overview,

    /// Run one fetch-aggregate-checkpoint cycle for an installation
    Sync {
        /// Installation id to sync
        #[arg(long)]
        installation: String,

        /// JSON file carrying checkpoint state between runs
        #[arg(long, value_name = "FILE")]
        state_file: Option<PathBuf>,

        /// Write the cycle's statistic points to this file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,

        /// Export file format
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Also write a forecast series next to the export
        #[arg(long, value_name = "FILE")]
        predict_export: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Jsonl,
}

/// What this host persists between invocations. The checkpoint is only
/// written after the cycle's statistics were committed to their destination,
/// so a crash in between re-delivers statistics instead of skipping data.
#[derive(Default, Serialize, Deserialize)]
struct HostState {
    checkpoint: Option<Checkpoint>,
    average_table: Option<AverageTable>,
}

impl HostState {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read state file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse state file {}", path.display()))
    }

    fn store(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).with_context(|| format!("write state file {}", path.display()))
    }
}

async fn export_points(
    points: &[StatisticPoint],
    path: &Path,
    format: ExportFormat,
) -> Result<()> {
    let written = match format {
        ExportFormat::Csv => CsvFileSink::new(path).write(points).await?,
        ExportFormat::Jsonl => JsonLinesSink::new(path).write(points).await?,
    };
    println!("{}", written.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = PortalConfig::load(cli.config.as_deref())?;
    let provider = EkzProvider::from_config(&config)?;

    match cli.cmd {
        Cmd::Overview => {
            let installations = provider.list_installations().await?;
            println!(
                "{:<14} {:<40} {:<12} {:<12}",
                "Installation", "Address", "Move-in", "Move-out"
            );
            for i in &installations {
                println!(
                    "{:<14} {:<40} {:<12} {:<12}",
                    i.id,
                    i.address.as_deref().unwrap_or("N/A"),
                    i.contract_start.to_string(),
                    i.contract_end.map_or_else(|| "-".to_string(), |d| d.to_string()),
                );
            }
        }

        Cmd::Sync {
            installation,
            state_file,
            export,
            format,
            predict_export,
        } => {
            let state = match &state_file {
                Some(path) => HostState::load(path)?,
                None => HostState::default(),
            };

            let engine = SyncEngine::new(provider);
            let outcome = engine
                .run_cycle(&installation, state.checkpoint.clone())
                .await?;

            if let Some(path) = &export {
                export_points(&outcome.statistics, path, format).await?;
            }

            if let Some(path) = &predict_export {
                let table = outcome
                    .average_table
                    .clone()
                    .or_else(|| state.average_table.clone())
                    .unwrap_or_default();
                let forecast = predict(
                    &outcome.statistics,
                    &table,
                    METERING_TZ,
                    chrono::Utc::now(),
                );
                export_points(&forecast, path, format).await?;
            }

            // statistics are committed; now the checkpoint may advance
            if let Some(path) = &state_file {
                let next = HostState {
                    average_table: outcome.average_table.clone().or(state.average_table),
                    checkpoint: Some(outcome.new_checkpoint.clone()),
                };
                next.store(path)?;
            }

            eprintln!(
                "{}: {} points, last full day {}, cumulative sum {:.3} kWh",
                installation,
                outcome.statistics.len(),
                outcome
                    .last_full_day
                    .map_or_else(|| "none".to_string(), |d| d.to_string()),
                outcome.new_checkpoint.cumulative_sum,
            );
        }
    }

    Ok(())
}

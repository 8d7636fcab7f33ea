use anyhow::Result;
use clap::{Parser, Subcommand};
use ingest_core::{AdapterFactory, Credential, IngestionConfig, IngestionEngine, RunOptions};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const CREDENTIAL_ENV: &str = "DOCLOAD_CREDENTIAL";

#[derive(Parser, Debug)]
#[command(name = "docload", version, about = "Partitioned document store load generator")]
struct Cli {
    #[arg(long, default_value = "info")]
    log: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an ingestion workload against a store
    Run {
        /// Path to the run configuration YAML
        #[arg(long)]
        config: PathBuf,
        /// Store adapter name (see list-adapters)
        #[arg(long, default_value = "memory")]
        adapter: String,
        /// Seed for the fake value source; omit for entropy
        #[arg(long)]
        seed: Option<u64>,
        /// Directory the run summary is written to
        #[arg(long, default_value = "results")]
        output: PathBuf,
    },
    /// Parse and validate a configuration file
    Validate {
        #[arg(long)]
        config: PathBuf,
    },
    /// List available store adapters
    ListAdapters,
}

/// The on-disk run configuration: the ingestion config plus host-level
/// settings that do not belong to the engine.
#[derive(Debug, Deserialize)]
struct RunConfig {
    #[serde(flatten)]
    ingestion: IngestionConfig,
    /// Stop after this long; omit to run until Ctrl-C.
    #[serde(default, with = "humantime_serde")]
    duration: Option<Duration>,
}

fn adapter_factories() -> Vec<Box<dyn AdapterFactory>> {
    vec![Box::new(memory_adapter::MemoryStoreFactory)]
}

fn load_config(path: &PathBuf) -> Result<RunConfig> {
    let raw = fs::read_to_string(path)?;
    let mut config: RunConfig = serde_yaml::from_str(&raw)?;
    // The credential may come from the environment instead of the file.
    if let Ok(secret) = std::env::var(CREDENTIAL_ENV) {
        config.ingestion.credential = Credential::new(secret);
    }
    config.ingestion.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log))
        .init();

    match cli.command {
        Commands::ListAdapters => {
            for factory in adapter_factories() {
                println!("{}", factory.name());
            }
            Ok(())
        }
        Commands::Validate { config } => match load_config(&config) {
            Ok(run_config) => {
                info!(
                    workload = ?run_config.ingestion.workload,
                    data_type = ?run_config.ingestion.data_type,
                    "configuration is valid"
                );
                Ok(())
            }
            Err(err) => {
                error!("invalid configuration: {err}");
                std::process::exit(1);
            }
        },
        Commands::Run {
            config,
            adapter,
            seed,
            output,
        } => run(config, adapter, seed, output).await,
    }
}

async fn run(config: PathBuf, adapter: String, seed: Option<u64>, output: PathBuf) -> Result<()> {
    let run_config = load_config(&config)?;
    let adapter_name = adapter.to_lowercase();
    let factory = adapter_factories()
        .into_iter()
        .find(|f| f.name() == adapter_name)
        .ok_or_else(|| anyhow::anyhow!("unknown adapter: {adapter_name}"))?;

    let (status_tx, mut status_rx) = mpsc::unbounded_channel();
    let (stats_tx, mut stats_rx) = mpsc::unbounded_channel::<ingest_core::IngestionStats>();

    tokio::spawn(async move {
        while let Some(message) = status_rx.recv().await {
            info!("{message}");
        }
    });
    tokio::spawn(async move {
        while let Some(snap) = stats_rx.recv().await {
            let docs_per_sec = format!("{:.1}", snap.documents_per_second);
            let kb_per_sec = format!("{:.1}", snap.kb_per_second);
            info!(
                documents = snap.total_documents,
                kb = snap.total_data_size_kb,
                docs_per_sec = %docs_per_sec,
                kb_per_sec = %kb_per_sec,
                "ingestion progress"
            );
        }
    });

    let engine = Arc::new(IngestionEngine::new(
        Arc::from(factory.create()),
        status_tx,
        stats_tx,
    ));
    engine.initialize(&run_config.ingestion).await?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        let duration = run_config.duration;
        tokio::spawn(async move {
            match duration {
                Some(d) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = tokio::time::sleep(d) => {}
                    }
                }
                None => {
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
            cancel.cancel();
        });
    }

    let opts = RunOptions {
        seed,
        ..RunOptions::default()
    };
    let summary = engine.run(&run_config.ingestion, opts, cancel).await?;
    engine.dispose().await?;

    fs::create_dir_all(&output)?;
    let summary_path = output.join(format!("{adapter_name}-summary.json"));
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    info!(
        attempted = summary.attempted_documents,
        failed = summary.failed_documents,
        "run complete, summary written to {}",
        summary_path.display()
    );
    Ok(())
}

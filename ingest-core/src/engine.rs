//! The ingestion pump loop: generate a batch, fan the writes out, wait for
//! all of them, fold the results into the counters, emit snapshots, and
//! observe cancellation at the iteration boundary.

use crate::adapter::{DocumentStoreAdapter, WriteError, WriteErrorKind};
use crate::config::IngestionConfig;
use crate::stats::{IngestionStats, LatencyRecorder, LatencyStats, StatsAggregator};
use crate::workload::generate_batch;
use futures::future;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Stopping,
}

impl EngineState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => EngineState::Running,
            2 => EngineState::Stopping,
            _ => EngineState::Idle,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("backend adapter is not initialized")]
    NotInitialized,
    #[error("ingestion is already running")]
    AlreadyRunning,
    #[error("fatal backend failure: {0}")]
    Backend(#[from] WriteError),
}

/// Per-run knobs that are not part of the ingestion configuration proper.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Seed for the fake value source; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Minimum interval between emitted stats snapshots.
    pub stats_interval: Duration,
    /// Stop after this many batches; `None` runs until cancelled.
    pub max_batches: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            seed: None,
            stats_interval: Duration::from_secs(1),
            max_batches: None,
        }
    }
}

/// Final accounting for one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub stats: IngestionStats,
    pub attempted_documents: u64,
    pub failed_documents: u64,
    pub batches: u64,
    pub elapsed_s: f64,
    pub latency: LatencyStats,
}

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPING: u8 = 2;

/// Orchestrates runs against one backend adapter. Status strings and stats
/// snapshots go out over unbounded channels the host drains; both are
/// fire-and-forget, so a departed host never blocks the loop.
pub struct IngestionEngine {
    adapter: Arc<dyn DocumentStoreAdapter>,
    status_tx: mpsc::UnboundedSender<String>,
    stats_tx: mpsc::UnboundedSender<IngestionStats>,
    state: AtomicU8,
    initialized: AtomicBool,
    active_cancel: Mutex<Option<CancellationToken>>,
}

impl IngestionEngine {
    pub fn new(
        adapter: Arc<dyn DocumentStoreAdapter>,
        status_tx: mpsc::UnboundedSender<String>,
        stats_tx: mpsc::UnboundedSender<IngestionStats>,
    ) -> Self {
        Self {
            adapter,
            status_tx,
            stats_tx,
            state: AtomicU8::new(STATE_IDLE),
            initialized: AtomicBool::new(false),
            active_cancel: Mutex::new(None),
        }
    }

    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Initialize the backend connection. Must succeed before `run` is
    /// allowed to enter `Running`.
    pub async fn initialize(&self, config: &IngestionConfig) -> anyhow::Result<()> {
        self.status("Initializing connection to document store...");
        self.adapter.initialize(config).await?;
        self.initialized.store(true, Ordering::Release);
        self.status("Connection established successfully!");
        Ok(())
    }

    /// Request a running loop to stop at the next iteration boundary. The
    /// in-flight batch runs to completion; no new batch starts.
    pub fn stop(&self) {
        let guard = self.active_cancel.lock().expect("cancel mutex poisoned");
        if let Some(cancel) = guard.as_ref() {
            self.state.store(STATE_STOPPING, Ordering::Release);
            self.status("Stopping ingestion...");
            cancel.cancel();
        }
    }

    /// Dispose the backend adapter. After this the engine must be
    /// re-initialized before the next run.
    pub async fn dispose(&self) -> anyhow::Result<()> {
        self.initialized.store(false, Ordering::Release);
        self.adapter.dispose().await
    }

    /// Run the pump loop until the token is cancelled, `stop` is called, or
    /// the batch budget is exhausted. The sequence counter and the stats
    /// aggregator are reset to zero on entry, so a restarted run begins at
    /// sequence 0 with empty counters.
    pub async fn run(
        &self,
        config: &IngestionConfig,
        opts: RunOptions,
        cancel: CancellationToken,
    ) -> Result<RunSummary, EngineError> {
        if !self.is_initialized() {
            self.status("Please initialize connection first!");
            return Err(EngineError::NotInitialized);
        }
        if self
            .state
            .compare_exchange(
                STATE_IDLE,
                STATE_RUNNING,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return Err(EngineError::AlreadyRunning);
        }
        *self.active_cancel.lock().expect("cancel mutex poisoned") = Some(cancel.clone());

        info!(
            data_type = ?config.data_type,
            workload = ?config.workload,
            batch_size = config.batch_size,
            document_size_kb = config.document_size_kb,
            "starting ingestion"
        );
        self.status("Starting data ingestion...");

        let result = self.pump(config, &opts, &cancel).await;

        *self.active_cancel.lock().expect("cancel mutex poisoned") = None;
        self.state.store(STATE_IDLE, Ordering::Release);
        result
    }

    async fn pump(
        &self,
        config: &IngestionConfig,
        opts: &RunOptions,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, EngineError> {
        let stats = StatsAggregator::new();
        let mut latency = LatencyRecorder::new();
        let mut rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let started = Instant::now();
        let mut last_emit = Instant::now();
        let mut sequence: u64 = 0;
        let mut batches: u64 = 0;
        let mut failed_total: u64 = 0;

        let outcome: Result<(), WriteError> = loop {
            // Cancellation is observed only here, at the iteration boundary.
            if cancel.is_cancelled() {
                break Ok(());
            }
            if opts.max_batches.is_some_and(|max| batches >= max) {
                break Ok(());
            }

            let batch = generate_batch(config, sequence, &mut rng);
            // The counter advances for every attempted document, so the
            // sequence numbering stays consistent under partial failure.
            sequence += batch.len() as u64;

            let results = future::join_all(batch.iter().map(|doc| {
                let adapter = Arc::clone(&self.adapter);
                let cancel = cancel.clone();
                async move {
                    let t0 = Instant::now();
                    let res = adapter.create_item(doc, &doc.partition_key, &cancel).await;
                    (t0.elapsed(), res)
                }
            }))
            .await;
            batches += 1;

            let mut failed: u64 = 0;
            let mut first_error: Option<WriteError> = None;
            let mut fatal: Option<WriteError> = None;
            for (elapsed, res) in results {
                latency.record(elapsed);
                if let Err(err) = res {
                    failed += 1;
                    if err.kind() == WriteErrorKind::Fatal && fatal.is_none() {
                        fatal = Some(err.clone());
                    }
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
            failed_total += failed;

            // Attempted counts, not successful ones: throughput accounting
            // and sequence numbering stay aligned under partial failure.
            stats.record_batch(
                batch.len() as u64,
                batch.len() as u64 * config.document_size_kb as u64,
            );

            if failed > 0 {
                let err = first_error.as_ref().map(|e| e.to_string()).unwrap_or_default();
                warn!(failed, batch = batches, error = %err, "partial batch failure");
                self.status(&format!(
                    "Warning: {failed} documents failed to ingest. First error: {err}"
                ));
            }
            if let Some(err) = fatal {
                break Err(err);
            }

            if last_emit.elapsed() >= opts.stats_interval {
                let _ = self.stats_tx.send(stats.snapshot());
                last_emit = Instant::now();
            }

            debug!(batch = batches, sequence, "batch complete");
        };

        // Always emit a final snapshot, fatal exits included.
        let final_stats = stats.snapshot();
        let _ = self.stats_tx.send(final_stats.clone());

        match outcome {
            Ok(()) => {
                if cancel.is_cancelled() {
                    self.status("Ingestion cancelled.");
                } else {
                    self.status("Ingestion stopped.");
                }
                info!(
                    documents = final_stats.total_documents,
                    batches, "ingestion finished"
                );
                Ok(RunSummary {
                    stats: final_stats,
                    attempted_documents: sequence,
                    failed_documents: failed_total,
                    batches,
                    elapsed_s: started.elapsed().as_secs_f64(),
                    latency: latency.to_stats(),
                })
            }
            Err(err) => {
                self.status(&format!("Ingestion aborted: {err}"));
                Err(EngineError::Backend(err))
            }
        }
    }

    fn status(&self, message: &str) {
        let _ = self.status_tx.send(message.to_string());
    }
}

//! In-process simulated partitioned document store. Useful for dry runs of
//! the ingestion engine and for exercising partition-key distribution
//! without a live backend. Supports injectable write latency and a seeded
//! failure rate (reported as throttling).

use anyhow::Result;
use async_trait::async_trait;
use ingest_core::adapter::{DocumentStoreAdapter, WriteError, WriteErrorKind};
use ingest_core::{Document, IngestionConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

struct Store {
    database: String,
    collection: String,
    /// Documents per partition key.
    partitions: HashMap<String, u64>,
    documents: u64,
}

pub struct MemoryStoreAdapter {
    store: Mutex<Option<Store>>,
    write_latency: Duration,
    failure_rate: f64,
    rng: StdMutex<StdRng>,
}

impl MemoryStoreAdapter {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(None),
            write_latency: Duration::ZERO,
            failure_rate: 0.0,
            rng: StdMutex::new(StdRng::seed_from_u64(0)),
        }
    }

    /// Sleep this long per write, simulating backend latency.
    pub fn with_write_latency(mut self, latency: Duration) -> Self {
        self.write_latency = latency;
        self
    }

    /// Fail this fraction of writes with a throttling error.
    pub fn with_failure_rate(mut self, rate: f64, seed: u64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self.rng = StdMutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub async fn total_documents(&self) -> u64 {
        self.store
            .lock()
            .await
            .as_ref()
            .map(|s| s.documents)
            .unwrap_or(0)
    }

    pub async fn distinct_partitions(&self) -> usize {
        self.store
            .lock()
            .await
            .as_ref()
            .map(|s| s.partitions.len())
            .unwrap_or(0)
    }

    /// Number of documents stored under one partition key.
    pub async fn partition_depth(&self, key: &str) -> u64 {
        self.store
            .lock()
            .await
            .as_ref()
            .and_then(|s| s.partitions.get(key).copied())
            .unwrap_or(0)
    }
}

impl Default for MemoryStoreAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStoreAdapter for MemoryStoreAdapter {
    async fn initialize(&self, config: &IngestionConfig) -> Result<()> {
        let mut guard = self.store.lock().await;
        if guard.is_some() {
            // Idempotent: the database/collection already exist.
            return Ok(());
        }
        info!(
            database = %config.database,
            collection = %config.collection,
            throughput_ru = config.throughput_ru,
            "provisioning in-memory store"
        );
        *guard = Some(Store {
            database: config.database.clone(),
            collection: config.collection.clone(),
            partitions: HashMap::new(),
            documents: 0,
        });
        Ok(())
    }

    async fn create_item(
        &self,
        _document: &Document,
        partition_key: &str,
        cancel: &CancellationToken,
    ) -> Result<(), WriteError> {
        if cancel.is_cancelled() {
            return Err(WriteError::new(
                WriteErrorKind::Cancelled,
                "write cancelled before dispatch",
            ));
        }
        if self.write_latency > Duration::ZERO {
            tokio::time::sleep(self.write_latency).await;
        }
        if self.failure_rate > 0.0 {
            let throttled = self
                .rng
                .lock()
                .expect("rng mutex poisoned")
                .gen_bool(self.failure_rate);
            if throttled {
                return Err(WriteError::new(
                    WriteErrorKind::RateLimited,
                    "simulated throttling",
                ));
            }
        }
        let mut guard = self.store.lock().await;
        match guard.as_mut() {
            Some(store) => {
                *store.partitions.entry(partition_key.to_string()).or_insert(0) += 1;
                store.documents += 1;
                Ok(())
            }
            None => Err(WriteError::new(
                WriteErrorKind::Fatal,
                "store is not initialized",
            )),
        }
    }

    async fn dispose(&self) -> Result<()> {
        let mut guard = self.store.lock().await;
        if let Some(store) = guard.take() {
            info!(
                database = %store.database,
                collection = %store.collection,
                documents = store.documents,
                "dropping in-memory store"
            );
        }
        Ok(())
    }
}

pub struct MemoryStoreFactory;

impl ingest_core::AdapterFactory for MemoryStoreFactory {
    fn name(&self) -> &'static str {
        "memory"
    }
    fn create(&self) -> Box<dyn DocumentStoreAdapter> {
        Box::new(MemoryStoreAdapter::new())
    }
}

pub mod adapter;
pub mod config;
pub mod document;
pub mod engine;
pub mod partition;
pub mod stats;
pub mod workload;

pub use adapter::{AdapterFactory, DocumentStoreAdapter, WriteError, WriteErrorKind};
pub use config::{ConfigError, Credential, DataType, IngestionConfig, WorkloadStrategy};
pub use document::{Document, DocumentBody};
pub use engine::{EngineError, EngineState, IngestionEngine, RunOptions, RunSummary};
pub use stats::{IngestionStats, LatencyStats, StatsAggregator};
pub use workload::generate_batch;

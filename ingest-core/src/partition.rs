use crate::config::WorkloadStrategy;
use uuid::Uuid;

/// The single key every document lands on under `HotPartition`.
pub const HOT_PARTITION_KEY: &str = "hot-partition-1";

/// Partition key for the document with the given sequence number.
///
/// `Sequential` is a pure function of the sequence; `Random` draws a fresh
/// unique token per call (collisions across a run are acceptable);
/// `HotPartition` always returns [`HOT_PARTITION_KEY`].
pub fn partition_key(strategy: WorkloadStrategy, sequence: u64) -> String {
    match strategy {
        WorkloadStrategy::Sequential => format!("partition-{sequence}"),
        WorkloadStrategy::Random => Uuid::new_v4().to_string(),
        WorkloadStrategy::HotPartition => HOT_PARTITION_KEY.to_string(),
    }
}

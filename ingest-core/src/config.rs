use serde::Deserialize;
use std::fmt;
use thiserror::Error;

pub const MIN_THROUGHPUT_RU: u32 = 400;
pub const MAX_THROUGHPUT_RU: u32 = 1_000_000;
pub const MAX_BATCH_SIZE: usize = 1000;
pub const MAX_DOCUMENT_SIZE_KB: usize = 2048;
pub const MAX_RESOURCE_NAME_LEN: usize = 255;

/// Partition-key distribution policy for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WorkloadStrategy {
    /// `partition-{sequence}` - spreads load evenly as the counter grows.
    Sequential,
    /// A fresh unique token per document - unpredictable access pattern.
    Random,
    /// One fixed key for every document - saturates a single partition.
    HotPartition,
}

/// Which synthetic document variant a run generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DataType {
    Financial,
    ECommerce,
    Healthcare,
    IoT,
    Generic,
}

/// Opaque credential handle. The secret is redacted from `Debug` output and
/// the type deliberately does not implement `Serialize`, so it cannot leak
/// into summaries or status payloads.
#[derive(Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Access the raw secret. Only backend adapters should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("endpoint must be an https:// URL (http:// is allowed for localhost only): {0}")]
    InvalidEndpoint(String),
    #[error("invalid {kind} name {name:?}: {reason}")]
    InvalidResourceName {
        kind: &'static str,
        name: String,
        reason: &'static str,
    },
    #[error("throughput must be {MIN_THROUGHPUT_RU}..={MAX_THROUGHPUT_RU} RU/s, got {0}")]
    InvalidThroughput(u32),
    #[error("batch size must be 1..={MAX_BATCH_SIZE}, got {0}")]
    InvalidBatchSize(usize),
    #[error("document size must be 1..={MAX_DOCUMENT_SIZE_KB} KB, got {0}")]
    InvalidDocumentSize(usize),
}

/// Immutable configuration for one ingestion run.
///
/// Unknown `workload` or `data_type` values fail at deserialization time;
/// there is no silent fallback to a default variant.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestionConfig {
    pub endpoint: String,
    #[serde(default)]
    pub credential: Credential,
    pub database: String,
    pub collection: String,
    pub throughput_ru: u32,
    pub batch_size: usize,
    pub document_size_kb: usize,
    pub workload: WorkloadStrategy,
    pub data_type: DataType,
}

impl IngestionConfig {
    /// Fail-fast range and format checks. Must pass before the engine is
    /// allowed to enter `Running`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint(&self.endpoint)?;
        validate_resource_name("database", &self.database)?;
        validate_resource_name("collection", &self.collection)?;
        if !(MIN_THROUGHPUT_RU..=MAX_THROUGHPUT_RU).contains(&self.throughput_ru) {
            return Err(ConfigError::InvalidThroughput(self.throughput_ru));
        }
        if !(1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        if !(1..=MAX_DOCUMENT_SIZE_KB).contains(&self.document_size_kb) {
            return Err(ConfigError::InvalidDocumentSize(self.document_size_kb));
        }
        Ok(())
    }

    /// Serialized size each generated document aims for.
    pub fn target_size_bytes(&self) -> usize {
        self.document_size_kb * 1024
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    if endpoint.starts_with("https://") {
        return Ok(());
    }
    // Local emulators commonly run without TLS.
    if endpoint.starts_with("http://localhost") || endpoint.starts_with("http://127.0.0.1") {
        return Ok(());
    }
    Err(ConfigError::InvalidEndpoint(endpoint.to_string()))
}

fn validate_resource_name(kind: &'static str, name: &str) -> Result<(), ConfigError> {
    let fail = |reason| ConfigError::InvalidResourceName {
        kind,
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(fail("name is empty"));
    }
    if name.len() > MAX_RESOURCE_NAME_LEN {
        return Err(fail("name is too long"));
    }
    if name.contains(['/', '\\', '#', '?']) || name.ends_with(' ') {
        return Err(fail("name contains a forbidden character"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> IngestionConfig {
        IngestionConfig {
            endpoint: "https://example.documents.azure.com:443/".to_string(),
            credential: Credential::new("s3cret"),
            database: "loadtest".to_string(),
            collection: "docs".to_string(),
            throughput_ru: 400,
            batch_size: 10,
            document_size_kb: 1,
            workload: WorkloadStrategy::Sequential,
            data_type: DataType::Financial,
        }
    }

    #[test]
    fn valid_config_passes() {
        valid().validate().unwrap();
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let mut c = valid();
        c.throughput_ru = 399;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidThroughput(399))));

        let mut c = valid();
        c.throughput_ru = 1_000_001;
        assert!(c.validate().is_err());

        let mut c = valid();
        c.batch_size = 0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidBatchSize(0))));

        let mut c = valid();
        c.batch_size = 1001;
        assert!(c.validate().is_err());

        let mut c = valid();
        c.document_size_kb = 0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidDocumentSize(0))));

        let mut c = valid();
        c.document_size_kb = 4096;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_bad_endpoint_and_names() {
        let mut c = valid();
        c.endpoint = "http://prod.example.com".to_string();
        assert!(c.validate().is_err());

        let mut c = valid();
        c.endpoint = "http://localhost:8081".to_string();
        c.validate().unwrap();

        let mut c = valid();
        c.database = "bad/name".to_string();
        assert!(c.validate().is_err());

        let mut c = valid();
        c.collection = String::new();
        assert!(c.validate().is_err());
    }

    #[test]
    fn unknown_enum_values_fail_deserialization() {
        let err = serde_json::from_str::<WorkloadStrategy>("\"RoundRobin\"");
        assert!(err.is_err());
        let err = serde_json::from_str::<DataType>("\"Telecom\"");
        assert!(err.is_err());
    }

    #[test]
    fn credential_debug_is_redacted() {
        let c = valid();
        let rendered = format!("{:?}", c);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("redacted"));
    }
}

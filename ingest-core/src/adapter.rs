use crate::config::IngestionConfig;
use crate::document::Document;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Classification of a failed write. Everything except `Fatal` is a
/// per-document failure: the loop keeps running and sibling writes in the
/// same batch are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteErrorKind {
    /// Backend signalled throttling. No backoff is applied here; an adapter
    /// may retry internally before reporting this.
    RateLimited,
    /// Duplicate key. Ids are fresh per document, so this indicates a
    /// backend-side anomaly rather than something worth retrying.
    Conflict,
    /// Backend rejected the credential.
    Unauthorized,
    Timeout,
    Transient,
    /// The cancellation token fired before or during the write.
    Cancelled,
    /// Unrecoverable backend state; ends the run.
    Fatal,
    Other,
}

impl fmt::Display for WriteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WriteErrorKind::RateLimited => "rate limited",
            WriteErrorKind::Conflict => "conflict",
            WriteErrorKind::Unauthorized => "unauthorized",
            WriteErrorKind::Timeout => "timeout",
            WriteErrorKind::Transient => "transient",
            WriteErrorKind::Cancelled => "cancelled",
            WriteErrorKind::Fatal => "fatal",
            WriteErrorKind::Other => "other",
        };
        f.write_str(s)
    }
}

/// A classified write failure. The message must already be sanitized:
/// adapters must never embed credential material in it.
#[derive(Debug, Clone, Error)]
#[error("{kind} write failure: {message}")]
pub struct WriteError {
    kind: WriteErrorKind,
    message: String,
}

impl WriteError {
    pub fn new(kind: WriteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> WriteErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The document store consumed by the engine. Implementations wrap a real
/// client (or a simulation); the engine only ever sees this surface.
#[async_trait]
pub trait DocumentStoreAdapter: Send + Sync {
    /// Idempotent: create the target database and collection if absent,
    /// provisioning the configured throughput.
    async fn initialize(&self, config: &IngestionConfig) -> anyhow::Result<()>;

    /// Write one document under the given partition key. A failure here
    /// never aborts sibling writes in the same batch. Timeouts are the
    /// adapter's responsibility and are reported like any other failure.
    async fn create_item(
        &self,
        document: &Document,
        partition_key: &str,
        cancel: &CancellationToken,
    ) -> Result<(), WriteError>;

    /// Release connection resources. Safe to call multiple times.
    async fn dispose(&self) -> anyhow::Result<()>;
}

/// Creates adapter instances; the host selects one by name.
pub trait AdapterFactory: Send + Sync {
    fn name(&self) -> &'static str;

    fn create(&self) -> Box<dyn DocumentStoreAdapter>;
}

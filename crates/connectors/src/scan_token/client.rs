use crate::error::BackendError;
use async_trait::async_trait;
use model::{read::config::ReadConfiguration, records::raw::RawRecord};

/// Opaque client for stores that pre-compute scan tokens and stream row
/// batches per token.
#[async_trait]
pub trait ScanTokenClient: Send + Sync {
    /// Asks the backend to compute scan tokens for the entity. The
    /// backend derives the count from its own data distribution, not
    /// from the requested parallelism.
    async fn scan_tokens(&self, config: &ReadConfiguration) -> Result<Vec<Vec<u8>>, BackendError>;

    /// Deserializes one token into a live scanner.
    async fn open_scanner(
        &self,
        config: &ReadConfiguration,
        token: &[u8],
    ) -> Result<Box<dyn RowBatchScanner>, BackendError>;
}

/// A live per-token scanner streaming row batches.
#[async_trait]
pub trait RowBatchScanner: Send {
    /// Whether the backend still has batches for this scanner.
    fn has_more_batches(&self) -> bool;

    /// Fetches the next batch; only meaningful while `has_more_batches`
    /// reports true.
    async fn next_batch(&mut self) -> Result<Vec<RawRecord>, BackendError>;

    /// Closes the scanner on the backend.
    async fn close(&mut self) -> Result<(), BackendError>;
}

use crate::error::BackendError;
use async_trait::async_trait;
use model::{read::config::ReadConfiguration, records::raw::RawRecord};

/// One contiguous segment (lower, upper] of the backend's token ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRange {
    pub lower: i64,
    pub upper: i64,
}

impl TokenRange {
    pub fn new(lower: i64, upper: i64) -> Self {
        TokenRange { lower, upper }
    }
}

/// Opaque client for wide-column stores that shard by token ranges.
/// Connection construction and credentials live with the embedder.
#[async_trait]
pub trait TokenRangeClient: Send + Sync {
    /// Partitions the entity's token space into roughly `target` ranges
    /// using the backend's native sharding primitive.
    async fn partition(
        &self,
        config: &ReadConfiguration,
        target: usize,
    ) -> Result<Vec<TokenRange>, BackendError>;

    /// Runs the single upfront query for one range. The result is fully
    /// materialized, bounded by split size rather than table size.
    async fn fetch_range(
        &self,
        config: &ReadConfiguration,
        range: TokenRange,
    ) -> Result<Vec<RawRecord>, BackendError>;
}

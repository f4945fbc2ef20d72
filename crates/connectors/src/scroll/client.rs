use crate::error::BackendError;
use async_trait::async_trait;
use model::{read::config::ReadConfiguration, records::raw::RawRecord};
use std::time::Duration;

/// Hash-sliced subset of query results served to one split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceSpec {
    pub index: usize,
    pub total: usize,
}

/// One page of results plus the continuation handle for the next page.
/// A page with zero hits is the backend's end-of-results signal.
#[derive(Debug, Clone)]
pub struct ScrollPage {
    pub continuation: Option<String>,
    pub hits: Vec<RawRecord>,
}

/// Opaque client for search backends that paginate through scroll
/// continuations.
#[async_trait]
pub trait ScrollClient: Send + Sync {
    /// Issues the initial query with the configured batch size and
    /// optional wrapper query. `slice` is absent when the read has a
    /// single split; otherwise the backend subdivides results by hash.
    async fn begin(
        &self,
        config: &ReadConfiguration,
        slice: Option<SliceSpec>,
        keep_alive: Duration,
    ) -> Result<ScrollPage, BackendError>;

    /// Fetches the page after `continuation`.
    async fn resume(
        &self,
        continuation: &str,
        keep_alive: Duration,
    ) -> Result<ScrollPage, BackendError>;

    /// Releases a continuation context on the backend.
    async fn release(&self, continuation: &str) -> Result<(), BackendError>;
}

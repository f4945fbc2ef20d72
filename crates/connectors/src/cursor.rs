use crate::error::{CleanupError, ReadError};
use async_trait::async_trait;
use model::records::raw::RawRecord;

/// A lazy per-split sequence of raw backend records, with the backend's
/// pagination model folded into `advance`.
///
/// Restartable per split (re-opening the same descriptor yields the
/// same sequence), not globally restartable.
#[async_trait]
pub trait RecordCursor: Send {
    /// Pulls the next record. `None` means end of split and is sticky:
    /// once returned, later calls return `None` again without touching
    /// the backend.
    async fn advance(&mut self) -> Result<Option<RawRecord>, ReadError>;

    /// Releases backend resources. Safe to call multiple times, and
    /// safe to call on a cursor whose open only partially succeeded.
    async fn close(&mut self) -> Result<(), CleanupError>;
}

use crate::{
    cursor::RecordCursor,
    error::{CleanupError, OpenError, PlanningError, ReadError},
    planner::SplitPlanner,
    scroll::client::{ScrollClient, ScrollPage, SliceSpec},
    source::SplitSource,
};
use async_trait::async_trait;
use model::{
    read::config::ReadConfiguration,
    records::raw::RawRecord,
    split::descriptor::{SplitDescriptor, SplitPayload},
};
use std::{sync::Arc, time::Duration};
use tracing::debug;

/// How long the backend keeps an idle continuation context alive.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Scroll backend strategy. The key space is never partitioned here:
/// the planner emits exactly the requested number of slices and the
/// backend subdivides results by hash at query time.
pub struct ScrollSource {
    client: Arc<dyn ScrollClient>,
    keep_alive: Duration,
}

impl ScrollSource {
    pub fn new(client: Arc<dyn ScrollClient>) -> Self {
        Self {
            client,
            keep_alive: DEFAULT_KEEP_ALIVE,
        }
    }

    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }
}

#[async_trait]
impl SplitPlanner for ScrollSource {
    async fn plan(
        &self,
        config: &ReadConfiguration,
        desired_parallelism: usize,
    ) -> Result<Vec<SplitDescriptor>, PlanningError> {
        config.validate()?;
        debug!(
            entity = %config.entity,
            slices = desired_parallelism,
            "planned scroll slices"
        );

        Ok((0..desired_parallelism)
            .map(|index| {
                SplitDescriptor::new(
                    index,
                    SplitPayload::Slice {
                        index,
                        total: desired_parallelism,
                    },
                )
            })
            .collect())
    }
}

#[async_trait]
impl SplitSource for ScrollSource {
    async fn open(
        &self,
        config: &ReadConfiguration,
        split: &SplitDescriptor,
    ) -> Result<Box<dyn RecordCursor>, OpenError> {
        let slice = match split.payload {
            SplitPayload::Slice { index, total } => SliceSpec { index, total },
            ref other => {
                return Err(OpenError::SplitKind {
                    expected: "slice",
                    actual: other.kind(),
                });
            }
        };

        // A single slice covers everything; only slice for real fan-out.
        let slice = (slice.total > 1).then_some(slice);
        let first = self.client.begin(config, slice, self.keep_alive).await?;

        Ok(Box::new(ScrollCursor::new(
            Arc::clone(&self.client),
            self.keep_alive,
            first,
        )))
    }
}

/// Walks scroll pages lazily; the continuation context is the only
/// backend resource it holds.
struct ScrollCursor {
    client: Arc<dyn ScrollClient>,
    keep_alive: Duration,
    continuation: Option<String>,
    page: std::vec::IntoIter<RawRecord>,
    done: bool,
}

impl ScrollCursor {
    fn new(client: Arc<dyn ScrollClient>, keep_alive: Duration, first: ScrollPage) -> Self {
        // An empty first page already is the end-of-results signal;
        // no continuation request may follow it.
        let done = first.hits.is_empty();
        Self {
            client,
            keep_alive,
            continuation: first.continuation,
            page: first.hits.into_iter(),
            done,
        }
    }

    async fn release_continuation(&mut self) -> Result<(), CleanupError> {
        if let Some(continuation) = self.continuation.take() {
            self.client.release(&continuation).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordCursor for ScrollCursor {
    async fn advance(&mut self) -> Result<Option<RawRecord>, ReadError> {
        loop {
            if self.done {
                return Ok(None);
            }
            if let Some(record) = self.page.next() {
                return Ok(Some(record));
            }

            // Page drained: follow the continuation, or finish when the
            // backend stopped handing one out.
            let Some(continuation) = self.continuation.clone() else {
                self.done = true;
                return Ok(None);
            };
            let next = self.client.resume(&continuation, self.keep_alive).await?;
            self.continuation = next.continuation;
            if next.hits.is_empty() {
                self.done = true;
                return Ok(None);
            }
            self.page = next.hits.into_iter();
        }
    }

    async fn close(&mut self) -> Result<(), CleanupError> {
        self.done = true;
        self.release_continuation().await
    }
}

use crate::{
    cursor::RecordCursor,
    error::{CleanupError, OpenError, PlanningError, ReadError},
    planner::SplitPlanner,
    source::SplitSource,
    token_range::client::{TokenRange, TokenRangeClient},
};
use async_trait::async_trait;
use model::{
    read::config::ReadConfiguration,
    records::raw::RawRecord,
    split::descriptor::{SplitDescriptor, SplitPayload},
};
use std::sync::Arc;
use tracing::debug;

/// Token-range backend strategy: the backend's own sharding primitive
/// decides the partition boundaries, one descriptor per range.
pub struct TokenRangeSource {
    client: Arc<dyn TokenRangeClient>,
}

impl TokenRangeSource {
    pub fn new(client: Arc<dyn TokenRangeClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SplitPlanner for TokenRangeSource {
    async fn plan(
        &self,
        config: &ReadConfiguration,
        desired_parallelism: usize,
    ) -> Result<Vec<SplitDescriptor>, PlanningError> {
        config.validate()?;

        let ranges = self.client.partition(config, desired_parallelism).await?;
        debug!(
            entity = %config.entity,
            ranges = ranges.len(),
            "planned token ranges"
        );

        Ok(ranges
            .into_iter()
            .enumerate()
            .map(|(id, range)| {
                SplitDescriptor::new(
                    id,
                    SplitPayload::TokenRange {
                        lower: range.lower,
                        upper: range.upper,
                    },
                )
            })
            .collect())
    }
}

#[async_trait]
impl SplitSource for TokenRangeSource {
    async fn open(
        &self,
        config: &ReadConfiguration,
        split: &SplitDescriptor,
    ) -> Result<Box<dyn RecordCursor>, OpenError> {
        let range = match split.payload {
            SplitPayload::TokenRange { lower, upper } => TokenRange::new(lower, upper),
            ref other => {
                return Err(OpenError::SplitKind {
                    expected: "token-range",
                    actual: other.kind(),
                });
            }
        };

        // Single upfront query; the whole range is materialized here.
        let rows = self.client.fetch_range(config, range).await?;
        Ok(Box::new(TokenRangeCursor {
            buffered: rows.into_iter(),
            done: false,
        }))
    }
}

/// Drains the buffer materialized at open time.
struct TokenRangeCursor {
    buffered: std::vec::IntoIter<RawRecord>,
    done: bool,
}

#[async_trait]
impl RecordCursor for TokenRangeCursor {
    async fn advance(&mut self) -> Result<Option<RawRecord>, ReadError> {
        if self.done {
            return Ok(None);
        }
        match self.buffered.next() {
            Some(record) => Ok(Some(record)),
            None => {
                self.done = true;
                Ok(None)
            }
        }
    }

    async fn close(&mut self) -> Result<(), CleanupError> {
        self.done = true;
        Ok(())
    }
}

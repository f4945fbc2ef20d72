use crate::{
    cursor::RecordCursor,
    error::{CleanupError, OpenError, PlanningError, ReadError},
    planner::SplitPlanner,
    scan_token::client::{RowBatchScanner, ScanTokenClient},
    source::SplitSource,
};
use async_trait::async_trait;
use model::{
    read::config::ReadConfiguration,
    records::raw::RawRecord,
    split::descriptor::{SplitDescriptor, SplitPayload},
};
use std::sync::Arc;
use tracing::debug;

/// Scan-token backend strategy: one descriptor per backend-computed
/// token, independent of the requested parallelism.
pub struct ScanTokenSource {
    client: Arc<dyn ScanTokenClient>,
}

impl ScanTokenSource {
    pub fn new(client: Arc<dyn ScanTokenClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SplitPlanner for ScanTokenSource {
    async fn plan(
        &self,
        config: &ReadConfiguration,
        _desired_parallelism: usize,
    ) -> Result<Vec<SplitDescriptor>, PlanningError> {
        config.validate()?;

        let tokens = self.client.scan_tokens(config).await?;
        debug!(
            entity = %config.entity,
            tokens = tokens.len(),
            "computed scan tokens"
        );

        Ok(tokens
            .into_iter()
            .enumerate()
            .map(|(id, token)| SplitDescriptor::new(id, SplitPayload::ScanToken { token }))
            .collect())
    }
}

#[async_trait]
impl SplitSource for ScanTokenSource {
    async fn open(
        &self,
        config: &ReadConfiguration,
        split: &SplitDescriptor,
    ) -> Result<Box<dyn RecordCursor>, OpenError> {
        let token = match &split.payload {
            SplitPayload::ScanToken { token } => token.as_slice(),
            other => {
                return Err(OpenError::SplitKind {
                    expected: "scan-token",
                    actual: other.kind(),
                });
            }
        };

        let scanner = self.client.open_scanner(config, token).await?;
        Ok(Box::new(ScanTokenCursor {
            scanner,
            batch: Vec::new().into_iter(),
            done: false,
            closed: false,
        }))
    }
}

/// Drains the current batch, then asks the scanner for the next one.
struct ScanTokenCursor {
    scanner: Box<dyn RowBatchScanner>,
    batch: std::vec::IntoIter<RawRecord>,
    done: bool,
    closed: bool,
}

#[async_trait]
impl RecordCursor for ScanTokenCursor {
    async fn advance(&mut self) -> Result<Option<RawRecord>, ReadError> {
        if self.done {
            return Ok(None);
        }
        loop {
            if let Some(record) = self.batch.next() {
                return Ok(Some(record));
            }
            if !self.scanner.has_more_batches() {
                self.done = true;
                return Ok(None);
            }
            self.batch = self.scanner.next_batch().await?.into_iter();
        }
    }

    async fn close(&mut self) -> Result<(), CleanupError> {
        self.done = true;
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.scanner.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use model::core::value::Value;
    use model::records::raw::RawField;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeScanner {
        batches: Vec<Vec<RawRecord>>,
        fetches: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RowBatchScanner for FakeScanner {
        fn has_more_batches(&self) -> bool {
            !self.batches.is_empty()
        }

        async fn next_batch(&mut self) -> Result<Vec<RawRecord>, BackendError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.batches.remove(0))
        }

        async fn close(&mut self) -> Result<(), BackendError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FakeStore {
        tokens: Vec<Vec<u8>>,
        batches: Vec<Vec<RawRecord>>,
        fetches: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ScanTokenClient for FakeStore {
        async fn scan_tokens(
            &self,
            _config: &ReadConfiguration,
        ) -> Result<Vec<Vec<u8>>, BackendError> {
            Ok(self.tokens.clone())
        }

        async fn open_scanner(
            &self,
            _config: &ReadConfiguration,
            _token: &[u8],
        ) -> Result<Box<dyn RowBatchScanner>, BackendError> {
            Ok(Box::new(FakeScanner {
                batches: self.batches.clone(),
                fetches: Arc::clone(&self.fetches),
                closes: Arc::clone(&self.closes),
            }))
        }
    }

    fn row(id: i64) -> RawRecord {
        RawRecord::new("table", vec![RawField::new("id", Value::Int(id))])
    }

    fn config() -> ReadConfiguration {
        ReadConfiguration::builder("table").build().unwrap()
    }

    #[tokio::test]
    async fn plan_ignores_desired_parallelism() {
        let store = Arc::new(FakeStore {
            tokens: vec![vec![1], vec![2], vec![3]],
            batches: vec![],
            fetches: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        });
        let source = ScanTokenSource::new(store);

        let splits = source.plan(&config(), 16).await.unwrap();
        assert_eq!(splits.len(), 3);
        assert_eq!(splits[1].payload, SplitPayload::ScanToken { token: vec![2] });
    }

    #[tokio::test]
    async fn fetches_one_batch_per_exhaustion_and_none_after_end() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        let store = Arc::new(FakeStore {
            tokens: vec![vec![1]],
            batches: vec![vec![row(1), row(2)], vec![row(3)]],
            fetches: Arc::clone(&fetches),
            closes: Arc::clone(&closes),
        });
        let source = ScanTokenSource::new(store);
        let splits = source.plan(&config(), 1).await.unwrap();

        let mut cursor = source.open(&config(), &splits[0]).await.unwrap();
        let mut ids = Vec::new();
        while let Some(record) = cursor.advance().await.unwrap() {
            ids.push(record.get("id").unwrap().as_i64().unwrap());
        }
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);

        // sticky end: no batch is fetched after end-of-split
        assert!(cursor.advance().await.unwrap().is_none());
        assert_eq!(fetches.load(Ordering::SeqCst), 2);

        cursor.close().await.unwrap();
        cursor.close().await.unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}

use crate::{
    convert::{ConversionPolicy, RowConverter},
    error::RuntimeError,
    observe::{Metrics, SourceObserver, TracingObserver},
    reader::{SplitReader, SplitReaderParams},
    sink::RowSink,
};
use connectors::{planner::SplitPlanner, source::SplitSource};
use futures::future::join_all;
use model::{read::config::ReadConfiguration, split::descriptor::SplitDescriptor};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// Orchestrates one bounded parallel read: plans once, hands each split
/// to an isolated reader, and drives every lifecycle to `Closed`.
///
/// The surrounding engine may instead assign splits itself and pull
/// rows through `SplitReader::next_row`; `run` is the push-style
/// convenience over the same machinery.
pub struct ParallelSourceRuntime {
    read_id: Uuid,
    source: Arc<dyn SplitSource>,
    config: Arc<ReadConfiguration>,
    converter: Arc<dyn RowConverter>,
    policy: ConversionPolicy,
    observer: Arc<dyn SourceObserver>,
    metrics: Metrics,
    cancel: CancellationToken,
}

/// Outcome of a completed read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadSummary {
    pub splits: usize,
    pub rows_emitted: u64,
    pub rows_skipped: u64,
}

impl ParallelSourceRuntime {
    pub fn new(
        source: Arc<dyn SplitSource>,
        config: ReadConfiguration,
        converter: Arc<dyn RowConverter>,
    ) -> Self {
        Self {
            read_id: Uuid::new_v4(),
            source,
            config: Arc::new(config),
            converter,
            policy: ConversionPolicy::default(),
            observer: Arc::new(TracingObserver),
            metrics: Metrics::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_policy(mut self, policy: ConversionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SourceObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn read_id(&self) -> Uuid {
        self.read_id
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.clone()
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the planner once, at job-graph construction time. A plan
    /// with zero splits is a valid read yielding zero records, not an
    /// error.
    pub async fn plan(&self) -> Result<Vec<SplitDescriptor>, RuntimeError> {
        let splits = self
            .source
            .plan(&self.config, self.config.parallelism)
            .await?;
        self.metrics.incr_splits_planned(splits.len() as u64);
        info!(
            read_id = %self.read_id,
            entity = %self.config.entity,
            splits = splits.len(),
            "planned read"
        );
        Ok(splits)
    }

    /// Builds the per-split execution context for an assigned split.
    /// Each reader owns its cursor and lifecycle; splits can run in
    /// total isolation from one another.
    pub fn reader(&self, split: SplitDescriptor) -> SplitReader {
        SplitReader::new(SplitReaderParams {
            split,
            config: Arc::clone(&self.config),
            source: Arc::clone(&self.source),
            converter: Arc::clone(&self.converter),
            policy: self.policy,
            observer: Arc::clone(&self.observer),
            metrics: self.metrics.clone(),
            cancel: self.cancel.clone(),
        })
    }

    /// Plans, then drains every split concurrently into `sink`: one
    /// task per split, joined at the end. The first split failure is
    /// returned after all lifecycles have reached `Closed`; what to do
    /// with rows already emitted by other splits is the engine's call.
    pub async fn run(&self, sink: Arc<dyn RowSink>) -> Result<ReadSummary, RuntimeError> {
        let splits = self.plan().await?;
        let split_count = splits.len();

        let mut handles = Vec::with_capacity(split_count);
        for split in splits {
            let mut reader = self.reader(split);
            let sink = Arc::clone(&sink);
            handles.push(tokio::spawn(async move {
                drive_split(&mut reader, sink.as_ref()).await
            }));
        }

        let mut failure: Option<RuntimeError> = None;
        for joined in join_all(handles).await {
            match joined? {
                Ok(()) => {}
                Err(err) => {
                    if failure.is_none() {
                        failure = Some(err);
                    }
                }
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }

        let snapshot = self.metrics.snapshot();
        info!(
            read_id = %self.read_id,
            rows = snapshot.records_emitted,
            skipped = snapshot.records_skipped,
            "read complete"
        );
        Ok(ReadSummary {
            splits: split_count,
            rows_emitted: snapshot.records_emitted,
            rows_skipped: snapshot.records_skipped,
        })
    }
}

async fn drive_split(reader: &mut SplitReader, sink: &dyn RowSink) -> Result<(), RuntimeError> {
    reader.open().await?;
    loop {
        match reader.next_row().await? {
            Some(row) => {
                if let Err(err) = sink.push(row).await {
                    reader.close().await;
                    return Err(RuntimeError::SinkClosed(err.to_string()));
                }
            }
            None => return Ok(()),
        }
    }
}

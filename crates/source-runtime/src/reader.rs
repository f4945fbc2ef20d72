use crate::{
    convert::{ConversionPolicy, RowConverter},
    error::SplitReadError,
    lifecycle::{LifecycleState, SplitLifecycle},
    observe::{Metrics, SourceObserver},
};
use connectors::{cursor::RecordCursor, source::SplitSource};
use model::{
    read::config::ReadConfiguration, records::row::InternalRow,
    split::descriptor::SplitDescriptor,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Per-split execution context: one cursor, one lifecycle, one
/// converter handle, nothing shared with any other split. All state a
/// split needs travels in this value instead of ambient fields.
pub struct SplitReader {
    split: SplitDescriptor,
    config: Arc<ReadConfiguration>,
    source: Arc<dyn SplitSource>,
    converter: Arc<dyn RowConverter>,
    policy: ConversionPolicy,
    observer: Arc<dyn SourceObserver>,
    metrics: Metrics,
    cancel: CancellationToken,
    lifecycle: SplitLifecycle,
    cursor: Option<Box<dyn RecordCursor>>,
}

pub(crate) struct SplitReaderParams {
    pub split: SplitDescriptor,
    pub config: Arc<ReadConfiguration>,
    pub source: Arc<dyn SplitSource>,
    pub converter: Arc<dyn RowConverter>,
    pub policy: ConversionPolicy,
    pub observer: Arc<dyn SourceObserver>,
    pub metrics: Metrics,
    pub cancel: CancellationToken,
}

impl SplitReader {
    pub(crate) fn new(params: SplitReaderParams) -> Self {
        let lifecycle = SplitLifecycle::new(params.split.id);
        Self {
            split: params.split,
            config: params.config,
            source: params.source,
            converter: params.converter,
            policy: params.policy,
            observer: params.observer,
            metrics: params.metrics,
            cancel: params.cancel,
            lifecycle,
            cursor: None,
        }
    }

    pub fn split(&self) -> &SplitDescriptor {
        &self.split
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// True once the split has yielded its last record or was closed.
    pub fn reached_end(&self) -> bool {
        matches!(
            self.lifecycle.state(),
            LifecycleState::Exhausted | LifecycleState::Closed
        )
    }

    /// Opens the cursor for the assigned split. On failure the reader
    /// is closed before the error is returned, so the lifecycle still
    /// terminates in `Closed` exactly once.
    pub async fn open(&mut self) -> Result<(), SplitReadError> {
        if self.lifecycle.state() != LifecycleState::Created {
            return Ok(());
        }
        if self.cancel.is_cancelled() {
            self.close().await;
            return Ok(());
        }

        self.lifecycle.begin_open();
        match self.source.open(&self.config, &self.split).await {
            Ok(cursor) => {
                self.cursor = Some(cursor);
                self.lifecycle.opened();
                self.metrics.incr_splits_opened(1);
                self.observer.split_opened(&self.split);
                Ok(())
            }
            Err(err) => {
                self.observer.split_failed(self.split.id, "open", &err);
                self.metrics.incr_splits_failed(1);
                self.close().await;
                Err(SplitReadError::Open {
                    split_id: self.split.id,
                    source: err,
                })
            }
        }
    }

    /// Pulls the next converted row. `None` means end of split; by the
    /// time it is returned, the cursor has already been closed. Calls
    /// after end of data keep returning `None` without touching the
    /// backend.
    pub async fn next_row(&mut self) -> Result<Option<InternalRow>, SplitReadError> {
        loop {
            if self.reached_end() {
                return Ok(None);
            }
            if self.cancel.is_cancelled() {
                self.close().await;
                return Ok(None);
            }
            if self.lifecycle.state() == LifecycleState::Created {
                self.open().await?;
                continue;
            }

            self.lifecycle.begin_advance();
            let step = match self.cursor.as_mut() {
                Some(cursor) => cursor.advance().await,
                // Defensive: a Ready reader always holds a cursor.
                None => Ok(None),
            };

            match step {
                // A cancellation that lands while an advance is in
                // flight closes before anything else becomes observable.
                Ok(Some(_)) if self.cancel.is_cancelled() => {
                    self.close().await;
                    return Ok(None);
                }
                Ok(Some(raw)) => match self.converter.to_internal(&raw) {
                    Ok(row) => {
                        self.lifecycle.advanced();
                        self.metrics.incr_records_emitted(1);
                        self.observer.record_emitted(self.split.id);
                        return Ok(Some(row));
                    }
                    Err(err) => match self.policy {
                        ConversionPolicy::SkipAndCount => {
                            self.metrics.incr_records_skipped(1);
                            self.observer.record_skipped(self.split.id, &err);
                            self.lifecycle.advanced();
                        }
                        ConversionPolicy::FailSplit => {
                            self.observer.split_failed(self.split.id, "convert", &err);
                            self.metrics.incr_splits_failed(1);
                            self.close().await;
                            return Err(SplitReadError::Convert {
                                split_id: self.split.id,
                                source: err,
                            });
                        }
                    },
                },
                Ok(None) => {
                    self.lifecycle.exhausted();
                    self.observer.split_exhausted(self.split.id);
                    self.close().await;
                    return Ok(None);
                }
                Err(err) => {
                    self.observer.split_failed(self.split.id, "advance", &err);
                    self.metrics.incr_splits_failed(1);
                    self.close().await;
                    return Err(SplitReadError::Advance {
                        split_id: self.split.id,
                        source: err,
                    });
                }
            }
        }
    }

    /// Releases the cursor and moves the lifecycle to `Closed`. Safe
    /// from any state, any number of times, including on a reader
    /// whose open never completed. Cleanup failures go to the observer
    /// and are never escalated, so they cannot mask the failure that
    /// triggered the close.
    pub async fn close(&mut self) {
        if !self.lifecycle.try_close() {
            return;
        }
        if let Some(mut cursor) = self.cursor.take() {
            if let Err(err) = cursor.close().await {
                self.observer.cleanup_failed(self.split.id, &err);
            }
        }
        self.metrics.incr_splits_closed(1);
        self.observer.split_closed(self.split.id);
    }
}

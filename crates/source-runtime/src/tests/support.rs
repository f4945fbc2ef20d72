#![allow(dead_code)]

use crate::{
    convert::{ConversionError, FieldSpec, RowConverter, SchemaConverter},
    observe::SourceObserver,
    sink::{RowSink, SinkClosed},
};
use async_trait::async_trait;
use connectors::{
    error::{BackendError, CleanupError},
    scan_token::client::{RowBatchScanner, ScanTokenClient},
    scroll::client::{ScrollClient, ScrollPage, SliceSpec},
    token_range::client::{TokenRange, TokenRangeClient},
};
use model::{
    core::{data_type::DataType, value::Value},
    read::config::ReadConfiguration,
    records::{
        raw::{RawField, RawRecord},
        row::InternalRow,
    },
    split::descriptor::SplitDescriptor,
};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

pub fn row(id: i64) -> RawRecord {
    RawRecord::new("rows", vec![RawField::new("id", Value::Int(id))])
}

pub fn rows(count: i64) -> Vec<RawRecord> {
    (0..count).map(row).collect()
}

pub fn id_converter() -> Arc<dyn RowConverter> {
    Arc::new(SchemaConverter::new(vec![
        FieldSpec::new("id", DataType::Int).not_null(),
    ]))
}

pub fn config(parallelism: usize) -> ReadConfiguration {
    ReadConfiguration::builder("rows")
        .parallelism(parallelism)
        .batch_size(2)
        .build()
        .unwrap()
}

/// In-memory wide-column store partitioned by row index; token bounds
/// are row indices, so split disjointness is directly checkable.
pub struct MemoryWideColumn {
    rows: Vec<RawRecord>,
    pub fetches: AtomicUsize,
}

impl MemoryWideColumn {
    pub fn new(rows: Vec<RawRecord>) -> Self {
        Self {
            rows,
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TokenRangeClient for MemoryWideColumn {
    async fn partition(
        &self,
        _config: &ReadConfiguration,
        target: usize,
    ) -> Result<Vec<TokenRange>, BackendError> {
        let total = self.rows.len();
        if total == 0 {
            return Ok(Vec::new());
        }
        let chunk = total.div_ceil(target.max(1));
        let mut ranges = Vec::new();
        let mut start = 0;
        while start < total {
            let end = (start + chunk).min(total);
            ranges.push(TokenRange::new(start as i64, end as i64));
            start = end;
        }
        Ok(ranges)
    }

    async fn fetch_range(
        &self,
        _config: &ReadConfiguration,
        range: TokenRange,
    ) -> Result<Vec<RawRecord>, BackendError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows[range.lower as usize..range.upper as usize].to_vec())
    }
}

/// Plans fine, but every open is rejected by the backend.
pub struct RejectingBackend;

#[async_trait]
impl TokenRangeClient for RejectingBackend {
    async fn partition(
        &self,
        _config: &ReadConfiguration,
        _target: usize,
    ) -> Result<Vec<TokenRange>, BackendError> {
        Ok(vec![TokenRange::new(0, 1)])
    }

    async fn fetch_range(
        &self,
        _config: &ReadConfiguration,
        _range: TokenRange,
    ) -> Result<Vec<RawRecord>, BackendError> {
        Err(BackendError::Unauthorized("bad credentials".to_string()))
    }
}

/// Cannot even be planned against.
pub struct UnreachableBackend;

#[async_trait]
impl TokenRangeClient for UnreachableBackend {
    async fn partition(
        &self,
        _config: &ReadConfiguration,
        _target: usize,
    ) -> Result<Vec<TokenRange>, BackendError> {
        Err(BackendError::Unreachable("no route to host".to_string()))
    }

    async fn fetch_range(
        &self,
        _config: &ReadConfiguration,
        _range: TokenRange,
    ) -> Result<Vec<RawRecord>, BackendError> {
        Err(BackendError::Unreachable("no route to host".to_string()))
    }
}

/// Scroll backend serving canned pages, optionally failing the release
/// call to exercise the cleanup-error path.
pub struct PagedScroll {
    pages: Mutex<Vec<Vec<RawRecord>>>,
    pub fail_release: bool,
    pub begins: AtomicUsize,
    pub resumes: AtomicUsize,
    pub releases: AtomicUsize,
}

impl PagedScroll {
    pub fn new(pages: Vec<Vec<RawRecord>>) -> Self {
        Self {
            pages: Mutex::new(pages),
            fail_release: false,
            begins: AtomicUsize::new(0),
            resumes: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
        }
    }

    pub fn failing_release(mut self) -> Self {
        self.fail_release = true;
        self
    }

    fn next_page(&self) -> ScrollPage {
        let mut pages = self.pages.lock().unwrap();
        let hits = if pages.is_empty() {
            Vec::new()
        } else {
            pages.remove(0)
        };
        ScrollPage {
            continuation: Some("ctx-0".to_string()),
            hits,
        }
    }
}

#[async_trait]
impl ScrollClient for PagedScroll {
    async fn begin(
        &self,
        _config: &ReadConfiguration,
        _slice: Option<SliceSpec>,
        _keep_alive: Duration,
    ) -> Result<ScrollPage, BackendError> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        Ok(self.next_page())
    }

    async fn resume(
        &self,
        _continuation: &str,
        _keep_alive: Duration,
    ) -> Result<ScrollPage, BackendError> {
        self.resumes.fetch_add(1, Ordering::SeqCst);
        Ok(self.next_page())
    }

    async fn release(&self, _continuation: &str) -> Result<(), BackendError> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            return Err(BackendError::Io("release timed out".to_string()));
        }
        Ok(())
    }
}

/// Scan-token backend whose scanner serves one good batch and then
/// fails, to exercise the advance-error path.
pub struct FlakyScanStore;

#[async_trait]
impl ScanTokenClient for FlakyScanStore {
    async fn scan_tokens(&self, _config: &ReadConfiguration) -> Result<Vec<Vec<u8>>, BackendError> {
        Ok(vec![vec![0x01]])
    }

    async fn open_scanner(
        &self,
        _config: &ReadConfiguration,
        _token: &[u8],
    ) -> Result<Box<dyn RowBatchScanner>, BackendError> {
        Ok(Box::new(FlakyScanner { served: false }))
    }
}

struct FlakyScanner {
    served: bool,
}

#[async_trait]
impl RowBatchScanner for FlakyScanner {
    fn has_more_batches(&self) -> bool {
        true
    }

    async fn next_batch(&mut self) -> Result<Vec<RawRecord>, BackendError> {
        if !self.served {
            self.served = true;
            return Ok(vec![row(0), row(1)]);
        }
        Err(BackendError::Io("connection reset".to_string()))
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Observer counting lifecycle events.
#[derive(Default)]
pub struct CountingObserver {
    pub opened: AtomicUsize,
    pub emitted: AtomicUsize,
    pub skipped: AtomicUsize,
    pub exhausted: AtomicUsize,
    pub closed: AtomicUsize,
    pub failed: AtomicUsize,
    pub cleanup_failures: AtomicUsize,
}

impl CountingObserver {
    pub fn closed_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl SourceObserver for CountingObserver {
    fn split_opened(&self, _split: &SplitDescriptor) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }

    fn record_emitted(&self, _split_id: usize) {
        self.emitted.fetch_add(1, Ordering::SeqCst);
    }

    fn record_skipped(&self, _split_id: usize, _error: &ConversionError) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn split_exhausted(&self, _split_id: usize) {
        self.exhausted.fetch_add(1, Ordering::SeqCst);
    }

    fn split_closed(&self, _split_id: usize) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }

    fn split_failed(&self, _split_id: usize, _operation: &str, _error: &dyn std::error::Error) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    fn cleanup_failed(&self, _split_id: usize, _error: &CleanupError) {
        self.cleanup_failures.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sink collecting every pushed row.
#[derive(Default)]
pub struct CollectSink {
    rows: Mutex<Vec<InternalRow>>,
}

impl CollectSink {
    pub fn take(&self) -> Vec<InternalRow> {
        std::mem::take(&mut self.rows.lock().unwrap())
    }
}

#[async_trait]
impl RowSink for CollectSink {
    async fn push(&self, row: InternalRow) -> Result<(), SinkClosed> {
        self.rows.lock().unwrap().push(row);
        Ok(())
    }
}

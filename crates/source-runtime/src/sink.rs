use async_trait::async_trait;
use model::records::row::InternalRow;
use thiserror::Error;
use tokio::sync::mpsc;

/// Push-style downstream consumption interface supplied by the engine.
/// Pull-style consumption goes through `SplitReader::next_row` instead;
/// the core supports either.
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Delivers one converted row. An error aborts the read.
    async fn push(&self, row: InternalRow) -> Result<(), SinkClosed>;
}

/// The receiving half went away.
#[derive(Debug, Error)]
#[error("row sink receiver dropped")]
pub struct SinkClosed;

/// `RowSink` over a bounded tokio channel.
pub struct ChannelSink {
    tx: mpsc::Sender<InternalRow>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<InternalRow>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl RowSink for ChannelSink {
    async fn push(&self, row: InternalRow) -> Result<(), SinkClosed> {
        self.tx.send(row).await.map_err(|_| SinkClosed)
    }
}

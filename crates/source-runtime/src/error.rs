use crate::convert::ConversionError;
use connectors::error::{OpenError, PlanningError, ReadError};
use thiserror::Error;

/// A fatal failure of one split's lifecycle, naming the split and the
/// backend operation that failed. Reported to the engine as a task
/// failure; retry/restart policy is the engine's decision.
#[derive(Debug, Error)]
pub enum SplitReadError {
    #[error("split {split_id}: open failed: {source}")]
    Open {
        split_id: usize,
        #[source]
        source: OpenError,
    },

    #[error("split {split_id}: advance failed: {source}")]
    Advance {
        split_id: usize,
        #[source]
        source: ReadError,
    },

    #[error("split {split_id}: record conversion failed: {source}")]
    Convert {
        split_id: usize,
        #[source]
        source: ConversionError,
    },
}

impl SplitReadError {
    pub fn split_id(&self) -> usize {
        match self {
            SplitReadError::Open { split_id, .. }
            | SplitReadError::Advance { split_id, .. }
            | SplitReadError::Convert { split_id, .. } => *split_id,
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            SplitReadError::Open { .. } => "open",
            SplitReadError::Advance { .. } => "advance",
            SplitReadError::Convert { .. } => "convert",
        }
    }
}

/// Top-level errors for a parallel read.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Planning failed; the read aborts before any split is assigned.
    #[error("planning error: {0}")]
    Planning(#[from] PlanningError),

    /// One split's lifecycle failed.
    #[error(transparent)]
    Split(#[from] SplitReadError),

    /// A split task was cancelled or panicked.
    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// The downstream consumer went away mid-read.
    #[error("downstream sink closed: {0}")]
    SinkClosed(String),
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One independently-processable partition of a bounded read.
///
/// Descriptors are produced once by a planner, are immutable, and are
/// consumed by exactly one worker. Planning and execution may happen in
/// different processes, so descriptors serialize to bytes for handoff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitDescriptor {
    /// Ordinal assigned in planning order.
    pub id: usize,
    pub payload: SplitPayload,
}

/// Backend-shaped partition payload. Splits are disjoint in the logical
/// key/token space they cover; their union covers the full entity
/// filtered by the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SplitPayload {
    /// Half-open segment (lower, upper] of the backend's token ring.
    TokenRange { lower: i64, upper: i64 },

    /// Hash-sliced subset of query results: slice `index` of `total`.
    Slice { index: usize, total: usize },

    /// Opaque backend-issued token describing a contiguous table
    /// portion to scan.
    ScanToken { token: Vec<u8> },
}

impl SplitPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            SplitPayload::TokenRange { .. } => "token-range",
            SplitPayload::Slice { .. } => "slice",
            SplitPayload::ScanToken { .. } => "scan-token",
        }
    }
}

impl SplitDescriptor {
    pub fn new(id: usize, payload: SplitPayload) -> Self {
        SplitDescriptor { id, payload }
    }

    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SplitCodecError> {
        serde_json::to_vec(self).map_err(SplitCodecError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SplitCodecError> {
        serde_json::from_slice(bytes).map_err(SplitCodecError::Decode)
    }
}

/// Errors from the split descriptor byte codec.
#[derive(Debug, Error)]
pub enum SplitCodecError {
    #[error("split descriptor encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("split descriptor decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}

use model::read::config::ConfigError;
use thiserror::Error;

/// Faults surfaced by an opaque backend client.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not be reached at all.
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// Authentication or authorization was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The target table/index does not exist or cannot be read.
    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    /// Transient I/O fault mid-request.
    #[error("I/O error: {0}")]
    Io(String),

    /// The backend answered with something the client could not handle.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Fatal planning failure. Aborts the whole read before any split is
/// assigned.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// The read configuration cannot be planned.
    #[error("invalid read configuration: {0}")]
    Config(#[from] ConfigError),

    /// The backend rejected or failed the planning request.
    #[error("backend error while planning: {0}")]
    Backend(#[from] BackendError),
}

/// Fatal failure to open one split's cursor.
#[derive(Debug, Error)]
pub enum OpenError {
    /// The backend rejected the open (auth/connection failure).
    #[error("backend error while opening split: {0}")]
    Backend(#[from] BackendError),

    /// The descriptor payload does not belong to this backend strategy.
    #[error("split payload is {actual}, expected {expected}")]
    SplitKind {
        expected: &'static str,
        actual: &'static str,
    },
}

/// I/O fault during `advance`. Fatal to the split; re-execution is the
/// engine's concern, the core never retries.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("backend error while advancing: {0}")]
    Backend(#[from] BackendError),
}

/// Failure to release a resource during close. Logged by the caller,
/// never escalated, and never prevents the lifecycle from closing.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("backend error while closing: {0}")]
    Backend(#[from] BackendError),
}

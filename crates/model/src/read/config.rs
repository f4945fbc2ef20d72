use serde::{Deserialize, Serialize};
use std::{collections::HashMap, str::FromStr};
use thiserror::Error;

/// Pagination batch size used when none is configured. Bounds memory
/// per page, not correctness.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Opaque backend connection parameters, passed through to the client
/// untouched. Session construction and credentials live with the
/// embedder, not the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionHandle {
    properties: HashMap<String, String>,
}

impl ConnectionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|v| v.as_str())
    }
}

/// Consistency/staleness hint forwarded to backends that honor one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsistencyHint {
    One,
    Quorum,
    LocalQuorum,
    All,
    Snapshot,
}

impl FromStr for ConsistencyHint {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ONE" => Ok(ConsistencyHint::One),
            "QUORUM" => Ok(ConsistencyHint::Quorum),
            "LOCAL_QUORUM" => Ok(ConsistencyHint::LocalQuorum),
            "ALL" => Ok(ConsistencyHint::All),
            "SNAPSHOT" => Ok(ConsistencyHint::Snapshot),
            other => Err(ConfigError::UnknownConsistency(other.to_string())),
        }
    }
}

/// Everything a backend needs to plan and execute one bounded read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadConfiguration {
    /// Opaque connection parameters for the backend client.
    pub connection: ConnectionHandle,

    /// Target table or index name.
    pub entity: String,

    /// Column projection; empty means all columns.
    pub columns: Vec<String>,

    /// Optional predicate/query string pushed into the backend as-is.
    pub query: Option<String>,

    /// Optional consistency hint for backends that honor one.
    pub consistency: Option<ConsistencyHint>,

    /// Desired parallelism. Advisory: a planner may return fewer or
    /// more splits than requested.
    pub parallelism: usize,

    /// Pagination batch size hint.
    pub batch_size: usize,
}

impl ReadConfiguration {
    pub fn builder(entity: &str) -> ReadConfigurationBuilder {
        ReadConfigurationBuilder::new(entity)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity.trim().is_empty() {
            return Err(ConfigError::MissingEntity);
        }
        if self.parallelism == 0 {
            return Err(ConfigError::InvalidParallelism(self.parallelism));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        Ok(())
    }
}

pub struct ReadConfigurationBuilder {
    connection: ConnectionHandle,
    entity: String,
    columns: Vec<String>,
    query: Option<String>,
    consistency: Option<ConsistencyHint>,
    parallelism: usize,
    batch_size: usize,
}

impl ReadConfigurationBuilder {
    pub fn new(entity: &str) -> Self {
        Self {
            connection: ConnectionHandle::new(),
            entity: entity.to_string(),
            columns: Vec::new(),
            query: None,
            consistency: None,
            parallelism: 1,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn connection(mut self, connection: ConnectionHandle) -> Self {
        self.connection = connection;
        self
    }

    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    pub fn query(mut self, query: &str) -> Self {
        self.query = Some(query.to_string());
        self
    }

    pub fn consistency(mut self, consistency: ConsistencyHint) -> Self {
        self.consistency = Some(consistency);
        self
    }

    pub fn parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn build(self) -> Result<ReadConfiguration, ConfigError> {
        let config = ReadConfiguration {
            connection: self.connection,
            entity: self.entity,
            columns: self.columns,
            query: self.query,
            consistency: self.consistency,
            parallelism: self.parallelism,
            batch_size: self.batch_size,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Errors raised while building or validating a read configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The target table/index name is empty.
    #[error("entity name must not be empty")]
    MissingEntity,

    /// Parallelism must be at least 1.
    #[error("parallelism must be at least 1, got {0}")]
    InvalidParallelism(usize),

    /// Batch size must be at least 1.
    #[error("batch size must be at least 1, got {0}")]
    InvalidBatchSize(usize),

    /// The consistency hint string is not recognized.
    #[error("unknown consistency hint: {0}")]
    UnknownConsistency(String),
}

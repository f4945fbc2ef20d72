use crate::core::value::Value;
use serde::{Deserialize, Serialize};

/// The engine's internal positional row representation, produced by the
/// row converter and emitted downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InternalRow {
    values: Vec<Value>,
}

impl InternalRow {
    pub fn new(values: Vec<Value>) -> Self {
        InternalRow { values }
    }

    pub fn arity(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

use crate::core::value::Value;
use serde::{Deserialize, Serialize};

/// One backend-native row: the entity it was read from plus its named
/// field values. Ephemeral: produced by a record cursor and handed
/// straight to the row converter, never retained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRecord {
    pub entity: String,
    pub fields: Vec<RawField>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawField {
    pub name: String,
    pub value: Value,
}

impl RawRecord {
    pub fn new(entity: &str, fields: Vec<RawField>) -> Self {
        RawRecord {
            entity: entity.to_string(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
            .map(|f| &f.value)
    }
}

impl RawField {
    pub fn new(name: &str, value: Value) -> Self {
        RawField {
            name: name.to_string(),
            value,
        }
    }
}

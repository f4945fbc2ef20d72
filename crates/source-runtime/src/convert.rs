use model::{
    core::{data_type::DataType, value::Value},
    records::{raw::RawRecord, row::InternalRow},
};
use thiserror::Error;

/// Maps one raw backend record into the engine's internal row shape.
/// Consumed as a capability: the runtime never inspects backend-native
/// values itself. One converter instance per split.
pub trait RowConverter: Send + Sync {
    fn to_internal(&self, raw: &RawRecord) -> Result<InternalRow, ConversionError>;
}

/// How the runtime reacts to a record that fails conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionPolicy {
    /// The conversion failure is fatal to the split.
    #[default]
    FailSplit,

    /// Skip the record, count it, keep advancing.
    SkipAndCount,
}

/// Per-record conversion failures.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("field `{field}`: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: DataType,
        actual: DataType,
    },

    #[error("field `{field}` is null but declared non-nullable")]
    NullNotAllowed { field: String },

    #[error("field `{field}` missing from record")]
    MissingField { field: String },
}

/// Declared shape of one converted field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl FieldSpec {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Schema-driven converter: projects the declared fields out of each
/// raw record in declaration order, checking types and nullability.
pub struct SchemaConverter {
    fields: Vec<FieldSpec>,
}

impl SchemaConverter {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }
}

impl RowConverter for SchemaConverter {
    fn to_internal(&self, raw: &RawRecord) -> Result<InternalRow, ConversionError> {
        let mut values = Vec::with_capacity(self.fields.len());
        for spec in &self.fields {
            let value = raw.get(&spec.name).ok_or_else(|| ConversionError::MissingField {
                field: spec.name.clone(),
            })?;

            match value {
                Value::Null if !spec.nullable => {
                    return Err(ConversionError::NullNotAllowed {
                        field: spec.name.clone(),
                    });
                }
                Value::Null => values.push(Value::Null),
                other if other.data_type() != spec.data_type => {
                    return Err(ConversionError::TypeMismatch {
                        field: spec.name.clone(),
                        expected: spec.data_type,
                        actual: other.data_type(),
                    });
                }
                other => values.push(other.clone()),
            }
        }
        Ok(InternalRow::new(values))
    }
}

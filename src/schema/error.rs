use arrow::datatypes::DataType;
use thiserror::Error;

use crate::scalar::ScalarType;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Invalid column name '{0}': names must match [A-Za-z_][A-Za-z0-9_.-]*")]
    InvalidName(String),
    #[error("Column name '{0}' is reserved")]
    ReservedName(String),
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),
    #[error("Column '{0}' declares a zero-width blob")]
    EmptyBlob(String),
    #[error("Column '{column}' declares a {width}-byte blob, wider than the supported maximum")]
    BlobTooWide { column: String, width: u32 },
    #[error("Unsupported type {data_type:?} for column '{column}'")]
    UnsupportedType { column: String, data_type: DataType },
    #[error("Invalid arity for record: expected {expected} values, got {actual}")]
    Arity { expected: usize, actual: usize },
    #[error("Type mismatch for column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: ScalarType,
        actual: ScalarType,
    },
}

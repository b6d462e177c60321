//! Record layout and the read-only snapshot used to interpret record bytes.
//!
//! A record buffer is an 8-byte little-endian `i64` timestamp followed by
//! every declared column, packed back to back in declaration order. Columns
//! are therefore addressed by a fixed byte offset and width, and readers
//! never dispatch on types per record.

mod column;
mod error;
mod snapshot;

use std::collections::HashMap;

use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};
pub use column::Column;
pub use error::SchemaError;
use once_cell::sync::Lazy;
use regex::Regex;
pub use snapshot::SchemaSnapshot;

use crate::{
    logging::strata_log,
    scalar::{Scalar, ScalarType},
};

/// Width of the timestamp prefix carried by every record.
pub const TIMESTAMP_SIZE: usize = 8;

/// Name under which the timestamp prefix is exposed to filters and Arrow.
pub const TIMESTAMP_COLUMN: &str = "_ts";

static COLUMN_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("column name pattern is valid")
});

/// Ordered column layout of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
    by_name: HashMap<String, usize>,
    record_size: usize,
}

impl Schema {
    /// Start declaring a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Declared columns, excluding the timestamp prefix.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Case-insensitive lookup of a column position by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(&name.to_ascii_lowercase()).copied()
    }

    /// Total width of one record, timestamp prefix included.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Lay out a full row of values behind `timestamp`.
    pub fn encode_record(
        &self,
        timestamp: i64,
        values: &[Scalar],
    ) -> Result<Vec<u8>, SchemaError> {
        if values.len() != self.columns.len() {
            return Err(SchemaError::Arity {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        let mut record = vec![0u8; self.record_size];
        record[..TIMESTAMP_SIZE].copy_from_slice(&timestamp.to_le_bytes());
        for (column, value) in self.columns.iter().zip(values) {
            if value.scalar_type() != column.ty {
                return Err(SchemaError::TypeMismatch {
                    column: column.name.clone(),
                    expected: column.ty,
                    actual: value.scalar_type(),
                });
            }
            value.write_to(&mut record[column.offset..column.offset + column.size()]);
        }
        Ok(record)
    }

    /// Build an unindexed schema from Arrow fields. A leading `_ts` field is
    /// taken to be the timestamp prefix and skipped.
    pub fn from_arrow(arrow: &ArrowSchema) -> Result<Schema, SchemaError> {
        let mut builder = Schema::builder();
        for (position, field) in arrow.fields().iter().enumerate() {
            if position == 0
                && field.name() == TIMESTAMP_COLUMN
                && field.data_type() == &DataType::Int64
            {
                continue;
            }
            let ty = ScalarType::from_arrow(field.data_type()).ok_or_else(|| {
                SchemaError::UnsupportedType {
                    column: field.name().clone(),
                    data_type: field.data_type().clone(),
                }
            })?;
            builder = builder.column(field.name(), ty);
        }
        builder.build()
    }

    /// Arrow view of the layout, with the timestamp prefix as `_ts`.
    pub fn to_arrow(&self) -> ArrowSchema {
        ArrowSchema::new(
            [Field::new(TIMESTAMP_COLUMN, DataType::Int64, false)]
                .into_iter()
                .chain(self.columns.iter().map(Column::arrow_field))
                .collect::<Vec<_>>(),
        )
    }
}

#[derive(Debug, Clone)]
struct ColumnDecl {
    name: String,
    ty: ScalarType,
    index_bucket_size: Option<u64>,
}

/// Declares columns in order and lays them out on [`SchemaBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    decls: Vec<ColumnDecl>,
}

impl SchemaBuilder {
    /// Append an unindexed column.
    pub fn column(mut self, name: impl Into<String>, ty: ScalarType) -> Self {
        self.decls.push(ColumnDecl {
            name: name.into(),
            ty,
            index_bucket_size: None,
        });
        self
    }

    /// Append an indexed column whose keys are quantized by `bucket_size`.
    pub fn indexed_column(
        mut self,
        name: impl Into<String>,
        ty: ScalarType,
        bucket_size: u64,
    ) -> Self {
        self.decls.push(ColumnDecl {
            name: name.into(),
            ty,
            index_bucket_size: Some(bucket_size),
        });
        self
    }

    /// Validate names and assign byte offsets and index ids.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut columns = Vec::with_capacity(self.decls.len());
        let mut by_name = HashMap::with_capacity(self.decls.len());
        let mut offset = TIMESTAMP_SIZE;
        let mut next_index_id = 0u32;

        for decl in self.decls {
            if !COLUMN_NAME.is_match(&decl.name) {
                return Err(SchemaError::InvalidName(decl.name));
            }
            let folded = decl.name.to_ascii_lowercase();
            if folded == TIMESTAMP_COLUMN {
                return Err(SchemaError::ReservedName(decl.name));
            }
            if by_name.contains_key(&folded) {
                return Err(SchemaError::DuplicateColumn(decl.name));
            }
            match decl.ty {
                ScalarType::Bytes(0) => return Err(SchemaError::EmptyBlob(decl.name)),
                ScalarType::Bytes(width) if width > ScalarType::MAX_BYTES_WIDTH => {
                    return Err(SchemaError::BlobTooWide {
                        column: decl.name,
                        width,
                    })
                }
                _ => {}
            }

            let index_id = decl.index_bucket_size.map(|_| {
                let id = next_index_id;
                next_index_id += 1;
                id
            });
            by_name.insert(folded, columns.len());
            columns.push(Column {
                name: decl.name,
                ty: decl.ty,
                offset,
                index_id,
                index_bucket_size: decl.index_bucket_size.unwrap_or(0),
            });
            offset += decl.ty.size();
        }

        strata_log!(
            log::Level::Debug,
            "schema_built",
            "columns={} indexed={} record_size={}",
            columns.len(),
            next_index_id,
            offset
        );

        Ok(Schema {
            columns,
            by_name,
            record_size: offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::builder()
            .column("flag", ScalarType::Bool)
            .indexed_column("latency", ScalarType::Int32, 10)
            .column("score", ScalarType::Float64)
            .indexed_column("tag", ScalarType::Bytes(4), 0)
            .build()
            .unwrap()
    }

    #[test]
    fn columns_pack_after_timestamp() {
        let schema = sample();
        let offsets: Vec<_> = schema.columns().iter().map(Column::offset).collect();
        assert_eq!(offsets, vec![8, 9, 13, 21]);
        assert_eq!(schema.record_size(), 25);
    }

    #[test]
    fn index_ids_follow_declaration_order() {
        let schema = sample();
        let ids: Vec<_> = schema.columns().iter().map(Column::index_id).collect();
        assert_eq!(ids, vec![None, Some(0), None, Some(1)]);
        assert_eq!(schema.columns()[1].index_bucket_size(), 10);
    }

    #[test]
    fn names_are_case_insensitive() {
        let schema = sample();
        assert_eq!(schema.column_index("LATENCY"), Some(1));
        assert_eq!(schema.column_index("missing"), None);

        let err = Schema::builder()
            .column("a", ScalarType::Int8)
            .column("A", ScalarType::Int8)
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn("A".into()));
    }

    #[test]
    fn rejects_unlexable_and_reserved_names() {
        let err = Schema::builder()
            .column("bad name", ScalarType::Int8)
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::InvalidName("bad name".into()));

        let err = Schema::builder()
            .column("_TS", ScalarType::Int64)
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::ReservedName("_TS".into()));

        let err = Schema::builder()
            .column("blob", ScalarType::Bytes(0))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::EmptyBlob("blob".into()));

        let err = Schema::builder()
            .column("blob", ScalarType::Bytes(u32::MAX))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::BlobTooWide {
                column: "blob".into(),
                width: u32::MAX,
            }
        );
    }

    #[test]
    fn encode_record_checks_row_shape() {
        let schema = sample();
        let err = schema.encode_record(0, &[Scalar::Bool(true)]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::Arity {
                expected: 4,
                actual: 1
            }
        );

        let err = schema
            .encode_record(
                0,
                &[
                    Scalar::Bool(true),
                    Scalar::Int64(5),
                    Scalar::Float64(1.0),
                    Scalar::from(b"abcd".as_slice()),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { ref column, .. } if column == "latency"));
    }

    #[test]
    fn arrow_round_trip_keeps_layout() {
        let schema = sample();
        let arrow = schema.to_arrow();
        assert_eq!(arrow.field(0).name(), TIMESTAMP_COLUMN);
        assert_eq!(arrow.fields().len(), 5);

        let back = Schema::from_arrow(&arrow).unwrap();
        assert_eq!(back.record_size(), schema.record_size());
        assert!(back.columns().iter().all(|column| !column.is_indexed()));
    }

    #[test]
    fn arrow_rejects_unsupported_types() {
        let arrow = ArrowSchema::new(vec![Field::new("name", DataType::Utf8, true)]);
        assert_eq!(
            Schema::from_arrow(&arrow),
            Err(SchemaError::UnsupportedType {
                column: "name".into(),
                data_type: DataType::Utf8,
            })
        );
    }
}

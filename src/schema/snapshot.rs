use std::sync::Arc;

use super::{Column, Schema, TIMESTAMP_SIZE};
use crate::{
    key::{self, KeyBytes},
    scalar::ScalarView,
};

/// Immutable, cheaply clonable view binding a [`Schema`] to record access.
///
/// A snapshot never owns record bytes; any number of threads may read the
/// same record through clones of one snapshot. Out-of-range column indexes
/// and records shorter than [`Schema::record_size`] are caller bugs and
/// panic.
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    schema: Arc<Schema>,
}

impl SchemaSnapshot {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Number of declared columns; the timestamp prefix is not counted.
    pub fn column_count(&self) -> usize {
        self.schema.column_count()
    }

    pub fn column(&self, i: usize) -> &Column {
        let count = self.column_count();
        self.schema
            .columns()
            .get(i)
            .unwrap_or_else(|| panic!("column index {i} out of range for {count} columns"))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.column_index(name)
    }

    /// Zero-copy typed view of column `i` inside `record`.
    pub fn field<'r>(&self, record: &'r [u8], i: usize) -> ScalarView<'r> {
        let column = self.column(i);
        ScalarView::new(
            column.ty,
            &record[column.offset..column.offset + column.size()],
        )
    }

    /// Order-preserving index key for column `i`, quantized by the column's
    /// bucket size.
    pub fn key(&self, record: &[u8], i: usize) -> KeyBytes {
        let bucket_size = self.column(i).index_bucket_size;
        key::encode(&self.field(record, i).to_scalar(), bucket_size)
    }

    /// The record's stream timestamp.
    pub fn timestamp(&self, record: &[u8]) -> i64 {
        let mut prefix = [0u8; TIMESTAMP_SIZE];
        prefix.copy_from_slice(&record[..TIMESTAMP_SIZE]);
        i64::from_le_bytes(prefix)
    }

    pub fn is_indexed(&self, i: usize) -> bool {
        self.column(i).is_indexed()
    }

    pub fn index_id(&self, i: usize) -> Option<u32> {
        self.column(i).index_id
    }

    pub fn index_bucket_size(&self, i: usize) -> u64 {
        self.column(i).index_bucket_size
    }
}

impl From<Schema> for SchemaSnapshot {
    fn from(schema: Schema) -> Self {
        Self::new(Arc::new(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{Scalar, ScalarType};

    fn snapshot() -> SchemaSnapshot {
        Schema::builder()
            .indexed_column("cpu", ScalarType::Float64, 5)
            .column("pid", ScalarType::Int32)
            .indexed_column("host", ScalarType::Bytes(3), 1)
            .build()
            .unwrap()
            .into()
    }

    fn record(snapshot: &SchemaSnapshot, ts: i64, cpu: f64, pid: i32, host: &str) -> Vec<u8> {
        snapshot
            .schema()
            .encode_record(
                ts,
                &[
                    Scalar::Float64(cpu),
                    Scalar::Int32(pid),
                    Scalar::from(host.as_bytes()),
                ],
            )
            .unwrap()
    }

    #[test]
    fn fields_view_the_record_in_place() {
        let snapshot = snapshot();
        let row = record(&snapshot, 1_700_000_000, 42.5, 7, "web");

        assert_eq!(snapshot.column_count(), 3);
        assert_eq!(snapshot.timestamp(&row), 1_700_000_000);
        assert_eq!(snapshot.field(&row, 0).to_scalar(), Scalar::Float64(42.5));
        assert_eq!(snapshot.field(&row, 1).to_scalar(), Scalar::Int32(7));
        assert_eq!(snapshot.field(&row, 2).as_bytes(), b"web");
        assert_eq!(snapshot.field(&row, 1).as_bytes().as_ptr(), row[16..].as_ptr());
    }

    #[test]
    fn keys_apply_column_buckets() {
        let snapshot = snapshot();
        let a = record(&snapshot, 0, 41.0, 1, "aaa");
        let b = record(&snapshot, 0, 44.9, 2, "aab");
        let c = record(&snapshot, 0, 45.0, 3, "aab");

        assert_eq!(snapshot.key(&a, 0), snapshot.key(&b, 0));
        assert!(snapshot.key(&b, 0) < snapshot.key(&c, 0));
        assert!(snapshot.key(&a, 2) < snapshot.key(&b, 2));
        assert_eq!(snapshot.key(&a, 2).as_bytes(), b"aaa");
    }

    #[test]
    fn index_metadata_accessors() {
        let snapshot = snapshot();
        assert!(snapshot.is_indexed(0));
        assert!(!snapshot.is_indexed(1));
        assert_eq!(snapshot.index_id(2), Some(1));
        assert_eq!(snapshot.index_bucket_size(0), 5);
        assert_eq!(snapshot.index_bucket_size(1), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_column_panics() {
        snapshot().is_indexed(3);
    }
}

use std::sync::Arc;

use super::{AggregateError, AggregateKind, AggregateReader, VersionedAggregate};
use crate::{
    logging::{strata_log, AGGREGATE_CTX},
    option::StreamOption,
    scalar::Scalar,
    schema::SchemaSnapshot,
};

#[derive(Debug)]
struct Tracked {
    column: usize,
    store: VersionedAggregate,
}

/// All versioned aggregates of one stream, fed from raw records.
///
/// The table is the single writer of its stores; hand out
/// [`AggregateTableReader`]s to serve queries from other threads.
#[derive(Debug)]
pub struct AggregateTable {
    snapshot: SchemaSnapshot,
    tracked: Vec<Tracked>,
}

impl AggregateTable {
    /// Create one store per distinct `(column, kind)` pair in `option`.
    pub fn new(snapshot: &SchemaSnapshot, option: &StreamOption) -> Result<Self, AggregateError> {
        let mut tracked: Vec<Tracked> = Vec::with_capacity(option.tracked.len());
        for (name, kind) in &option.tracked {
            let column = snapshot
                .column_index(name)
                .ok_or_else(|| AggregateError::UnknownColumn(name.clone()))?;
            let ty = snapshot.column(column).scalar_type();
            if !kind.supports(ty) {
                return Err(AggregateError::Unsupported {
                    column: name.clone(),
                    kind: *kind,
                    ty,
                });
            }
            if tracked
                .iter()
                .any(|t| t.column == column && t.store.kind() == *kind)
            {
                continue;
            }
            tracked.push(Tracked {
                column,
                store: VersionedAggregate::new(ty, *kind),
            });
        }

        strata_log!(
            log::Level::Info,
            ctx: AGGREGATE_CTX,
            "aggregate_table_created",
            "aggregates={} columns={}",
            tracked.len(),
            snapshot.column_count()
        );

        Ok(Self {
            snapshot: snapshot.clone(),
            tracked,
        })
    }

    /// Fold every tracked column of `record` in at `offset`.
    ///
    /// # Panics
    /// Panics if `offset` is below the previously ingested offset or the
    /// record is shorter than the schema.
    pub fn ingest(&mut self, record: &[u8], offset: u64) {
        for tracked in &mut self.tracked {
            let value = self.snapshot.field(record, tracked.column).to_scalar();
            tracked.store.update(&value, offset);
        }
    }

    pub fn query(
        &self,
        column: &str,
        kind: AggregateKind,
        offset: u64,
    ) -> Result<Scalar, AggregateError> {
        let column_index = resolve(&self.snapshot, column)?;
        self.tracked
            .iter()
            .find(|t| t.column == column_index && t.store.kind() == kind)
            .map(|t| t.store.get(offset))
            .ok_or_else(|| not_tracked(column, kind))
    }

    pub fn reader(&self) -> AggregateTableReader {
        AggregateTableReader {
            snapshot: self.snapshot.clone(),
            readers: self
                .tracked
                .iter()
                .map(|t| (t.column, t.store.reader()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }
}

/// Cloneable query handle over an [`AggregateTable`].
#[derive(Debug, Clone)]
pub struct AggregateTableReader {
    snapshot: SchemaSnapshot,
    readers: Arc<[(usize, AggregateReader)]>,
}

impl AggregateTableReader {
    /// The `kind` aggregate of `column` as of `offset`.
    pub fn query(
        &self,
        column: &str,
        kind: AggregateKind,
        offset: u64,
    ) -> Result<Scalar, AggregateError> {
        let column_index = resolve(&self.snapshot, column)?;
        self.readers
            .iter()
            .find(|(c, reader)| *c == column_index && reader.kind() == kind)
            .map(|(_, reader)| reader.get(offset))
            .ok_or_else(|| not_tracked(column, kind))
    }
}

fn resolve(snapshot: &SchemaSnapshot, column: &str) -> Result<usize, AggregateError> {
    snapshot
        .column_index(column)
        .ok_or_else(|| AggregateError::UnknownColumn(column.to_string()))
}

fn not_tracked(column: &str, kind: AggregateKind) -> AggregateError {
    AggregateError::NotTracked {
        column: column.to_string(),
        kind,
    }
}

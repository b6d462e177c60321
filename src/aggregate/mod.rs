//! Versioned aggregation over stream offsets.
//!
//! Each tracked `(column, kind)` pair owns a [`VersionedAggregate`]: an
//! append-only log of cumulative values keyed by the offset at which each
//! record arrived. Reads ask "what was the aggregate as of offset `o`" and
//! are answered by a floor lookup, concurrently with the single writer.

mod table;
mod versioned;

use std::{fmt, str::FromStr};

pub use table::{AggregateTable, AggregateTableReader};
use thiserror::Error;
pub use versioned::{AggregateReader, VersionedAggregate};

use crate::scalar::{Scalar, ScalarType};

/// Errors raised while configuring or querying aggregates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    #[error("No {kind} aggregate is tracked for column '{column}'")]
    NotTracked { column: String, kind: AggregateKind },
    #[error("{kind} aggregation is not supported on column '{column}' of type {ty}")]
    Unsupported {
        column: String,
        kind: AggregateKind,
        ty: ScalarType,
    },
    #[error("Unknown aggregate kind: {0}")]
    UnknownKind(String),
}

/// Aggregation function applied cumulatively over a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Sum,
    Min,
    Max,
    Count,
}

impl AggregateKind {
    /// Kind of the values this aggregate reports over a column of `ty`.
    /// Counts are always `int64`.
    pub fn result_type(self, ty: ScalarType) -> ScalarType {
        match self {
            AggregateKind::Count => ScalarType::Int64,
            AggregateKind::Sum | AggregateKind::Min | AggregateKind::Max => ty,
        }
    }

    /// Value reported before any update has been applied.
    pub fn identity(self, ty: ScalarType) -> Scalar {
        match self {
            AggregateKind::Sum => ty.zero(),
            AggregateKind::Count => Scalar::Int64(0),
            AggregateKind::Min => ty.max_value(),
            AggregateKind::Max => ty.min_value(),
        }
    }

    /// Fold `value` into the running aggregate `last`. Count ignores `value`.
    pub fn combine(self, last: &Scalar, value: &Scalar) -> Scalar {
        match self {
            AggregateKind::Sum => last + value,
            AggregateKind::Min => last.min(value),
            AggregateKind::Max => last.max(value),
            AggregateKind::Count => last + &Scalar::Int64(1),
        }
    }

    /// Whether this kind can run over values of `ty`.
    pub fn supports(self, ty: ScalarType) -> bool {
        match self {
            AggregateKind::Sum => ty.is_arithmetic(),
            AggregateKind::Min | AggregateKind::Max | AggregateKind::Count => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AggregateKind::Sum => "sum",
            AggregateKind::Min => "min",
            AggregateKind::Max => "max",
            AggregateKind::Count => "count",
        }
    }
}

impl FromStr for AggregateKind {
    type Err = AggregateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" => Ok(AggregateKind::Sum),
            "min" => Ok(AggregateKind::Min),
            "max" => Ok(AggregateKind::Max),
            "count" | "cnt" => Ok(AggregateKind::Count),
            _ => Err(AggregateError::UnknownKind(s.to_string())),
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Query-and-aggregation core for in-memory, append-only event streams.
//!
//! Records are appended at monotonically increasing stream offsets. The
//! crate answers two kinds of questions about them while writers keep
//! appending:
//!
//! - *aggregates as of an offset*: [`aggregate::VersionedAggregate`] keeps a
//!   cumulative sum/min/max/count per offset and serves floor lookups to
//!   concurrent readers;
//! - *does this record match a filter*: [`filter`] parses strings such as
//!   `"a>=1 && !(b==2)"` into a negation-free [`filter::Expr`] and evaluates
//!   it against record bytes.
//!
//! Both read records through a [`schema::SchemaSnapshot`], which maps column
//! positions onto fixed byte ranges and derives order-preserving index keys
//! via [`key`].
//!
//! ```
//! use strata::{
//!     aggregate::{AggregateKind, AggregateTable},
//!     filter,
//!     scalar::{Scalar, ScalarType},
//!     schema::{Schema, SchemaSnapshot},
//!     StreamOption,
//! };
//!
//! let snapshot: SchemaSnapshot = Schema::builder()
//!     .column("latency", ScalarType::Int32)
//!     .build()?
//!     .into();
//! let option = StreamOption::default().track("latency", AggregateKind::Sum);
//! let mut table = AggregateTable::new(&snapshot, &option)?;
//!
//! let record = snapshot.schema().encode_record(0, &[Scalar::Int32(12)])?;
//! table.ingest(&record, 1);
//!
//! assert_eq!(table.query("latency", AggregateKind::Sum, 1)?, Scalar::Int32(12));
//! assert!(filter::parse("!(latency>20)")?.evaluate(&snapshot, &record)?);
//! # Ok::<(), strata::StrataError>(())
//! ```

mod logging;

/// Versioned aggregates and the per-stream aggregate table.
pub mod aggregate;

/// Filter lexing, parsing and evaluation.
pub mod filter;

/// Order-preserving key codec.
pub mod key;

mod option;

/// Comparison operators.
pub mod relop;

/// Typed scalar values.
pub mod scalar;

/// Record layout and schema snapshots.
pub mod schema;

pub use option::StreamOption;
use thiserror::Error;

/// Any recoverable error raised by this crate.
#[derive(Debug, Error)]
pub enum StrataError {
    #[error(transparent)]
    Parse(#[from] filter::ParseError),
    #[error(transparent)]
    Eval(#[from] filter::EvalError),
    #[error(transparent)]
    Schema(#[from] schema::SchemaError),
    #[error(transparent)]
    Aggregate(#[from] aggregate::AggregateError),
    #[error(transparent)]
    Key(#[from] key::KeyError),
}

//! Typed scalars: the value domain shared by schemas, filters, keys and
//! aggregates.
//!
//! A [`Scalar`] is a closed variant over the primitive kinds a column may
//! declare. Each kind ([`ScalarType`]) carries its own aggregation identities
//! (`zero`, `max_value`, `min_value`), and [`ScalarView`] reads a value in
//! place from a record buffer.

mod datatype;
mod value;
mod view;

pub use datatype::ScalarType;
pub use value::{LiteralError, Scalar};
pub use view::ScalarView;

use std::cmp::Ordering;

use super::{value::le, Scalar, ScalarType};

/// Zero-copy typed view over one column's bytes inside a record buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalarView<'a> {
    ty: ScalarType,
    bytes: &'a [u8],
}

impl<'a> ScalarView<'a> {
    /// Build a view over `bytes`, which must hold exactly one value of `ty`.
    ///
    /// # Panics
    /// Panics if `bytes.len() != ty.size()`.
    pub fn new(ty: ScalarType, bytes: &'a [u8]) -> Self {
        assert_eq!(
            bytes.len(),
            ty.size(),
            "view over {ty} needs {} bytes",
            ty.size()
        );
        Self { ty, bytes }
    }

    /// Kind of the viewed value.
    pub fn scalar_type(&self) -> ScalarType {
        self.ty
    }

    /// The raw stored bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Materialize the viewed value.
    pub fn to_scalar(&self) -> Scalar {
        Scalar::read_from(self.ty, self.bytes)
    }

    /// Compare the viewed value against a same-kind scalar without
    /// materializing blobs.
    ///
    /// # Panics
    /// Panics when the kinds differ.
    pub fn compare(&self, other: &Scalar) -> Ordering {
        match (self.ty, other) {
            (ScalarType::Bytes(width), Scalar::Bytes(rhs)) if rhs.len() == width as usize => {
                self.bytes.cmp(rhs)
            }
            (ScalarType::Int64, Scalar::Int64(rhs)) => i64::from_le_bytes(le(self.bytes)).cmp(rhs),
            (ScalarType::Int32, Scalar::Int32(rhs)) => i32::from_le_bytes(le(self.bytes)).cmp(rhs),
            _ => self.to_scalar().compare(other),
        }
    }
}

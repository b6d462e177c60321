use std::{cmp::Ordering, fmt, ops::Add};

use thiserror::Error;

use super::ScalarType;

/// Error raised when literal text cannot be read as a value of a column's kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot read '{text}' as {expected}")]
pub struct LiteralError {
    /// Kind the literal was expected to have.
    pub expected: ScalarType,
    /// The offending literal text.
    pub text: String,
}

/// A tagged scalar value.
///
/// All arithmetic and ordering is kind-homogeneous: combining two scalars of
/// different kinds is a programming error and panics.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    /// Boolean value.
    Bool(bool),
    /// Signed 8-bit integer.
    Int8(i8),
    /// Signed 16-bit integer.
    Int16(i16),
    /// Signed 32-bit integer.
    Int32(i32),
    /// Signed 64-bit integer.
    Int64(i64),
    /// Single precision float.
    Float32(f32),
    /// Double precision float.
    Float64(f64),
    /// Fixed-size byte blob.
    Bytes(Box<[u8]>),
}

impl Scalar {
    /// Kind tag of this value.
    ///
    /// # Panics
    /// Panics for blobs longer than `u32::MAX` bytes.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Scalar::Bool(_) => ScalarType::Bool,
            Scalar::Int8(_) => ScalarType::Int8,
            Scalar::Int16(_) => ScalarType::Int16,
            Scalar::Int32(_) => ScalarType::Int32,
            Scalar::Int64(_) => ScalarType::Int64,
            Scalar::Float32(_) => ScalarType::Float32,
            Scalar::Float64(_) => ScalarType::Float64,
            Scalar::Bytes(bytes) => {
                let width = u32::try_from(bytes.len()).unwrap_or_else(|_| {
                    panic!("blob of {} bytes is wider than any bytes kind", bytes.len())
                });
                ScalarType::Bytes(width)
            }
        }
    }

    /// Total comparison between two values of the same kind.
    ///
    /// Floats compare numerically, falling back to IEEE total order when a
    /// NaN is involved.
    ///
    /// # Panics
    /// Panics when the kinds differ.
    pub fn compare(&self, other: &Scalar) -> Ordering {
        self.try_compare(other).unwrap_or_else(|| {
            panic!(
                "cannot compare {} with {}",
                self.scalar_type(),
                other.scalar_type()
            )
        })
    }

    fn try_compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Int8(a), Scalar::Int8(b)) => Some(a.cmp(b)),
            (Scalar::Int16(a), Scalar::Int16(b)) => Some(a.cmp(b)),
            (Scalar::Int32(a), Scalar::Int32(b)) => Some(a.cmp(b)),
            (Scalar::Int64(a), Scalar::Int64(b)) => Some(a.cmp(b)),
            (Scalar::Float32(a), Scalar::Float32(b)) => {
                Some(a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b)))
            }
            (Scalar::Float64(a), Scalar::Float64(b)) => {
                Some(a.partial_cmp(b).unwrap_or_else(|| a.total_cmp(b)))
            }
            (Scalar::Bytes(a), Scalar::Bytes(b)) if a.len() == b.len() => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// The smaller of two same-kind values.
    pub fn min(&self, other: &Scalar) -> Scalar {
        if self.compare(other) == Ordering::Greater {
            other.clone()
        } else {
            self.clone()
        }
    }

    /// The larger of two same-kind values.
    pub fn max(&self, other: &Scalar) -> Scalar {
        if self.compare(other) == Ordering::Less {
            other.clone()
        } else {
            self.clone()
        }
    }

    /// Parse filter literal text as a value of kind `ty`.
    ///
    /// Booleans accept `true`/`false`/`1`/`0`; blobs take the literal bytes
    /// verbatim and must match the blob width exactly.
    pub fn parse(ty: ScalarType, text: &str) -> Result<Scalar, LiteralError> {
        let err = || LiteralError {
            expected: ty,
            text: text.to_string(),
        };
        let value = match ty {
            ScalarType::Bool => match text.to_ascii_lowercase().as_str() {
                "true" | "1" => Scalar::Bool(true),
                "false" | "0" => Scalar::Bool(false),
                _ => return Err(err()),
            },
            ScalarType::Int8 => Scalar::Int8(text.parse().map_err(|_| err())?),
            ScalarType::Int16 => Scalar::Int16(text.parse().map_err(|_| err())?),
            ScalarType::Int32 => Scalar::Int32(text.parse().map_err(|_| err())?),
            ScalarType::Int64 => Scalar::Int64(text.parse().map_err(|_| err())?),
            ScalarType::Float32 => Scalar::Float32(text.parse().map_err(|_| err())?),
            ScalarType::Float64 => Scalar::Float64(text.parse().map_err(|_| err())?),
            ScalarType::Bytes(width) => {
                if text.len() != width as usize {
                    return Err(err());
                }
                Scalar::Bytes(text.as_bytes().into())
            }
        };
        Ok(value)
    }

    /// Write the stored (little-endian) representation into `dst`.
    ///
    /// # Panics
    /// Panics if `dst` is not exactly `self.scalar_type().size()` bytes.
    pub fn write_to(&self, dst: &mut [u8]) {
        match self {
            Scalar::Bool(v) => dst.copy_from_slice(&[*v as u8]),
            Scalar::Int8(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Scalar::Int16(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Scalar::Int32(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Scalar::Int64(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Scalar::Float32(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Scalar::Float64(v) => dst.copy_from_slice(&v.to_le_bytes()),
            Scalar::Bytes(v) => dst.copy_from_slice(v),
        }
    }

    /// Read a value of kind `ty` from its stored representation.
    ///
    /// # Panics
    /// Panics if `src` is shorter than `ty.size()`.
    pub fn read_from(ty: ScalarType, src: &[u8]) -> Scalar {
        match ty {
            ScalarType::Bool => Scalar::Bool(src[0] != 0),
            ScalarType::Int8 => Scalar::Int8(i8::from_le_bytes(le(src))),
            ScalarType::Int16 => Scalar::Int16(i16::from_le_bytes(le(src))),
            ScalarType::Int32 => Scalar::Int32(i32::from_le_bytes(le(src))),
            ScalarType::Int64 => Scalar::Int64(i64::from_le_bytes(le(src))),
            ScalarType::Float32 => Scalar::Float32(f32::from_le_bytes(le(src))),
            ScalarType::Float64 => Scalar::Float64(f64::from_le_bytes(le(src))),
            ScalarType::Bytes(width) => Scalar::Bytes(src[..width as usize].into()),
        }
    }
}

pub(crate) fn le<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&src[..N]);
    out
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_compare(other)
    }
}

impl<'a> Add<&'a Scalar> for &'a Scalar {
    type Output = Scalar;

    /// Integer addition wraps on overflow.
    fn add(self, rhs: &'a Scalar) -> Scalar {
        match (self, rhs) {
            (Scalar::Int8(a), Scalar::Int8(b)) => Scalar::Int8(a.wrapping_add(*b)),
            (Scalar::Int16(a), Scalar::Int16(b)) => Scalar::Int16(a.wrapping_add(*b)),
            (Scalar::Int32(a), Scalar::Int32(b)) => Scalar::Int32(a.wrapping_add(*b)),
            (Scalar::Int64(a), Scalar::Int64(b)) => Scalar::Int64(a.wrapping_add(*b)),
            (Scalar::Float32(a), Scalar::Float32(b)) => Scalar::Float32(a + b),
            (Scalar::Float64(a), Scalar::Float64(b)) => Scalar::Float64(a + b),
            _ => panic!(
                "cannot add {} to {}",
                rhs.scalar_type(),
                self.scalar_type()
            ),
        }
    }
}

impl Add for Scalar {
    type Output = Scalar;

    fn add(self, rhs: Scalar) -> Scalar {
        &self + &rhs
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Int8(v) => write!(f, "{v}"),
            Scalar::Int16(v) => write!(f, "{v}"),
            Scalar::Int32(v) => write!(f, "{v}"),
            Scalar::Int64(v) => write!(f, "{v}"),
            Scalar::Float32(v) => write!(f, "{v}"),
            Scalar::Float64(v) => write!(f, "{v}"),
            Scalar::Bytes(v) => write!(f, "{}", String::from_utf8_lossy(v)),
        }
    }
}

macro_rules! implement_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Scalar {
            fn from(value: $ty) -> Self {
                Scalar::$variant(value)
            }
        }
    };
}

implement_from!(bool, Bool);
implement_from!(i8, Int8);
implement_from!(i16, Int16);
implement_from!(i32, Int32);
implement_from!(i64, Int64);
implement_from!(f32, Float32);
implement_from!(f64, Float64);

impl From<Vec<u8>> for Scalar {
    fn from(value: Vec<u8>) -> Self {
        Scalar::Bytes(value.into_boxed_slice())
    }
}

impl From<&[u8]> for Scalar {
    fn from(value: &[u8]) -> Self {
        Scalar::Bytes(value.into())
    }
}

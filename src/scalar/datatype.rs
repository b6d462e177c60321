use std::fmt;

use arrow::datatypes::DataType as ArrowDataType;

use super::Scalar;

/// Primitive kind carried by every [`Scalar`] and every schema column.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ScalarType {
    /// Single-byte boolean (`0` is false, anything else is true).
    Bool,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// IEEE-754 single precision float.
    Float32,
    /// IEEE-754 double precision float.
    Float64,
    /// Fixed-size byte blob of the given width.
    Bytes(u32),
}

impl ScalarType {
    /// Widest blob a column may declare; Arrow's `FixedSizeBinary` width is
    /// an `i32`.
    pub const MAX_BYTES_WIDTH: u32 = 0x7FFF_FFFF;

    /// Width in bytes of one stored value of this kind.
    pub const fn size(self) -> usize {
        match self {
            ScalarType::Bool | ScalarType::Int8 => 1,
            ScalarType::Int16 => 2,
            ScalarType::Int32 | ScalarType::Float32 => 4,
            ScalarType::Int64 | ScalarType::Float64 => 8,
            ScalarType::Bytes(width) => width as usize,
        }
    }

    /// Whether values of this kind support addition (and hence sum).
    pub const fn is_arithmetic(self) -> bool {
        !matches!(self, ScalarType::Bool | ScalarType::Bytes(_))
    }

    /// Additive identity; the starting value of sum aggregation.
    pub fn zero(self) -> Scalar {
        match self {
            ScalarType::Bool => Scalar::Bool(false),
            ScalarType::Int8 => Scalar::Int8(0),
            ScalarType::Int16 => Scalar::Int16(0),
            ScalarType::Int32 => Scalar::Int32(0),
            ScalarType::Int64 => Scalar::Int64(0),
            ScalarType::Float32 => Scalar::Float32(0.0),
            ScalarType::Float64 => Scalar::Float64(0.0),
            ScalarType::Bytes(width) => Scalar::Bytes(vec![0x00; width as usize].into()),
        }
    }

    /// Greatest representable value; the starting value of min aggregation.
    pub fn max_value(self) -> Scalar {
        match self {
            ScalarType::Bool => Scalar::Bool(true),
            ScalarType::Int8 => Scalar::Int8(i8::MAX),
            ScalarType::Int16 => Scalar::Int16(i16::MAX),
            ScalarType::Int32 => Scalar::Int32(i32::MAX),
            ScalarType::Int64 => Scalar::Int64(i64::MAX),
            ScalarType::Float32 => Scalar::Float32(f32::MAX),
            ScalarType::Float64 => Scalar::Float64(f64::MAX),
            ScalarType::Bytes(width) => Scalar::Bytes(vec![0xFF; width as usize].into()),
        }
    }

    /// Least representable value; the starting value of max aggregation.
    pub fn min_value(self) -> Scalar {
        match self {
            ScalarType::Bool => Scalar::Bool(false),
            ScalarType::Int8 => Scalar::Int8(i8::MIN),
            ScalarType::Int16 => Scalar::Int16(i16::MIN),
            ScalarType::Int32 => Scalar::Int32(i32::MIN),
            ScalarType::Int64 => Scalar::Int64(i64::MIN),
            ScalarType::Float32 => Scalar::Float32(f32::MIN),
            ScalarType::Float64 => Scalar::Float64(f64::MIN),
            ScalarType::Bytes(width) => Scalar::Bytes(vec![0x00; width as usize].into()),
        }
    }

    /// Map an Arrow data type onto a scalar kind, if one exists.
    pub fn from_arrow(data_type: &ArrowDataType) -> Option<Self> {
        match data_type {
            ArrowDataType::Boolean => Some(ScalarType::Bool),
            ArrowDataType::Int8 => Some(ScalarType::Int8),
            ArrowDataType::Int16 => Some(ScalarType::Int16),
            ArrowDataType::Int32 => Some(ScalarType::Int32),
            ArrowDataType::Int64 => Some(ScalarType::Int64),
            ArrowDataType::Float32 => Some(ScalarType::Float32),
            ArrowDataType::Float64 => Some(ScalarType::Float64),
            ArrowDataType::FixedSizeBinary(width) => {
                u32::try_from(*width).ok().map(ScalarType::Bytes)
            }
            _ => None,
        }
    }

    /// The Arrow data type with the same value domain.
    ///
    /// # Panics
    /// Panics for blobs wider than [`ScalarType::MAX_BYTES_WIDTH`].
    pub fn to_arrow(self) -> ArrowDataType {
        match self {
            ScalarType::Bool => ArrowDataType::Boolean,
            ScalarType::Int8 => ArrowDataType::Int8,
            ScalarType::Int16 => ArrowDataType::Int16,
            ScalarType::Int32 => ArrowDataType::Int32,
            ScalarType::Int64 => ArrowDataType::Int64,
            ScalarType::Float32 => ArrowDataType::Float32,
            ScalarType::Float64 => ArrowDataType::Float64,
            ScalarType::Bytes(width) => {
                ArrowDataType::FixedSizeBinary(i32::try_from(width).unwrap_or_else(|_| {
                    panic!("bytes({width}) is wider than Arrow's FixedSizeBinary allows")
                }))
            }
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Bool => f.write_str("bool"),
            ScalarType::Int8 => f.write_str("int8"),
            ScalarType::Int16 => f.write_str("int16"),
            ScalarType::Int32 => f.write_str("int32"),
            ScalarType::Int64 => f.write_str("int64"),
            ScalarType::Float32 => f.write_str("float32"),
            ScalarType::Float64 => f.write_str("float64"),
            ScalarType::Bytes(width) => write!(f, "bytes({width})"),
        }
    }
}

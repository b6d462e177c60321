//! Order-preserving key codec.
//!
//! Every kind has one fixed-length encoding whose byte-wise lexicographic
//! order matches the value order, so index collaborators can compare keys
//! without knowing their type:
//!
//! | kind      | layout                                                      |
//! |-----------|-------------------------------------------------------------|
//! | `bool`    | one byte, `0x00` / `0x01`                                   |
//! | `intN`    | big-endian two's complement with the sign bit flipped       |
//! | `floatN`  | big-endian IEEE bits; negatives inverted, others sign-set   |
//! | `bytes(n)`| the raw `n` bytes                                           |
//!
//! Numeric values may first be quantized into buckets of width `b > 1`
//! (`v - v mod b`, with floor semantics so buckets never straddle zero).

use std::fmt;

use thiserror::Error;

use crate::scalar::{Scalar, ScalarType};

/// Errors raised while decoding a key back into a scalar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Key width does not match the kind's fixed encoding width.
    #[error("{ty} keys are {expected} bytes, got {actual}")]
    Length {
        /// Kind being decoded.
        ty: ScalarType,
        /// Width of that kind's encoding.
        expected: usize,
        /// Width of the supplied key.
        actual: usize,
    },
}

/// Owned, byte-wise ordered key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct KeyBytes(Vec<u8>);

impl KeyBytes {
    /// Borrow the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the key and return its bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Encoded width.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key is zero-width.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for KeyBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for KeyBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyBytes(")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        f.write_str(")")
    }
}

const SIGN_64: u64 = 1 << 63;
const SIGN_32: u32 = 1 << 31;

/// Encode `value` into its order-preserving key after bucketing by
/// `bucket_size`. Sizes `0` and `1` disable quantization; blobs and booleans
/// are never quantized.
pub fn encode(value: &Scalar, bucket_size: u64) -> KeyBytes {
    let bytes = match value {
        Scalar::Bool(v) => vec![*v as u8],
        Scalar::Int8(v) => {
            let v = bucket_int(*v as i64, bucket_size, i8::MIN as i64) as i8;
            vec![(v as u8) ^ 0x80]
        }
        Scalar::Int16(v) => {
            let v = bucket_int(*v as i64, bucket_size, i16::MIN as i64) as i16;
            ((v as u16) ^ 0x8000).to_be_bytes().to_vec()
        }
        Scalar::Int32(v) => {
            let v = bucket_int(*v as i64, bucket_size, i32::MIN as i64) as i32;
            ((v as u32) ^ SIGN_32).to_be_bytes().to_vec()
        }
        Scalar::Int64(v) => {
            let v = bucket_int(*v, bucket_size, i64::MIN);
            ((v as u64) ^ SIGN_64).to_be_bytes().to_vec()
        }
        Scalar::Float32(v) => {
            let v = bucket_float(*v as f64, bucket_size) as f32;
            let bits = canonical_zero_f32(v).to_bits();
            let ordered = if bits & SIGN_32 != 0 {
                !bits
            } else {
                bits | SIGN_32
            };
            ordered.to_be_bytes().to_vec()
        }
        Scalar::Float64(v) => {
            let v = bucket_float(*v, bucket_size);
            let bits = canonical_zero_f64(v).to_bits();
            let ordered = if bits & SIGN_64 != 0 {
                !bits
            } else {
                bits | SIGN_64
            };
            ordered.to_be_bytes().to_vec()
        }
        Scalar::Bytes(v) => v.to_vec(),
    };
    KeyBytes(bytes)
}

/// Decode a key produced by [`encode`] back into the (quantized) scalar.
pub fn decode(ty: ScalarType, key: &[u8]) -> Result<Scalar, KeyError> {
    if key.len() != ty.size() {
        return Err(KeyError::Length {
            ty,
            expected: ty.size(),
            actual: key.len(),
        });
    }
    let value = match ty {
        ScalarType::Bool => Scalar::Bool(key[0] != 0),
        ScalarType::Int8 => Scalar::Int8((key[0] ^ 0x80) as i8),
        ScalarType::Int16 => Scalar::Int16((u16::from_be_bytes(be(key)) ^ 0x8000) as i16),
        ScalarType::Int32 => Scalar::Int32((u32::from_be_bytes(be(key)) ^ SIGN_32) as i32),
        ScalarType::Int64 => Scalar::Int64((u64::from_be_bytes(be(key)) ^ SIGN_64) as i64),
        ScalarType::Float32 => {
            let ordered = u32::from_be_bytes(be(key));
            let bits = if ordered & SIGN_32 != 0 {
                ordered ^ SIGN_32
            } else {
                !ordered
            };
            Scalar::Float32(f32::from_bits(bits))
        }
        ScalarType::Float64 => {
            let ordered = u64::from_be_bytes(be(key));
            let bits = if ordered & SIGN_64 != 0 {
                ordered ^ SIGN_64
            } else {
                !ordered
            };
            Scalar::Float64(f64::from_bits(bits))
        }
        ScalarType::Bytes(_) => Scalar::Bytes(key.into()),
    };
    Ok(value)
}

fn be<const N: usize>(key: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(key);
    out
}

// Floor-aligned bucket start, saturated at the kind's minimum.
fn bucket_int(v: i64, bucket_size: u64, min: i64) -> i64 {
    if bucket_size <= 1 {
        return v;
    }
    let wide = v as i128;
    let floor = wide - wide.rem_euclid(bucket_size as i128);
    floor.max(min as i128) as i64
}

fn bucket_float(v: f64, bucket_size: u64) -> f64 {
    if bucket_size <= 1 || !v.is_finite() {
        return v;
    }
    let width = bucket_size as f64;
    (v / width).floor() * width
}

fn canonical_zero_f32(v: f32) -> f32 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

fn canonical_zero_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_integers_sort_across_zero() {
        let keys: Vec<_> = [-300i32, -1, 0, 1, 300]
            .into_iter()
            .map(|v| encode(&Scalar::Int32(v), 0))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(keys[2].as_bytes(), &[0x80, 0, 0, 0]);
    }

    #[test]
    fn floats_sort_across_zero_and_infinity() {
        let keys: Vec<_> = [f64::NEG_INFINITY, -2.5, -0.0, 1e-300, 7.0, f64::INFINITY]
            .into_iter()
            .map(|v| encode(&Scalar::Float64(v), 1))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(
            encode(&Scalar::Float64(-0.0), 0),
            encode(&Scalar::Float64(0.0), 0)
        );
    }

    #[test]
    fn buckets_floor_negative_values() {
        assert_eq!(
            encode(&Scalar::Int64(-1), 10),
            encode(&Scalar::Int64(-10), 10)
        );
        assert_ne!(encode(&Scalar::Int64(-1), 10), encode(&Scalar::Int64(0), 10));
        assert_eq!(
            decode(ScalarType::Int64, encode(&Scalar::Int64(47), 10).as_bytes()),
            Ok(Scalar::Int64(40))
        );
        assert_eq!(
            decode(ScalarType::Float32, encode(&Scalar::Float32(-0.5), 4).as_bytes()),
            Ok(Scalar::Float32(-4.0))
        );
    }

    #[test]
    fn bucket_below_kind_minimum_saturates() {
        assert_eq!(
            decode(ScalarType::Int8, encode(&Scalar::Int8(-127), 3).as_bytes()),
            Ok(Scalar::Int8(i8::MIN))
        );
        assert_eq!(
            decode(ScalarType::Int8, encode(&Scalar::Int8(100), 1000).as_bytes()),
            Ok(Scalar::Int8(0))
        );
    }

    #[test]
    fn blobs_and_bools_ignore_buckets() {
        assert_eq!(encode(&Scalar::from(vec![9u8, 1]), 64).as_bytes(), &[9, 1]);
        assert_eq!(encode(&Scalar::Bool(true), 64).as_bytes(), &[1]);
    }

    #[test]
    fn decode_rejects_wrong_width() {
        assert_eq!(
            decode(ScalarType::Int32, &[0, 0]),
            Err(KeyError::Length {
                ty: ScalarType::Int32,
                expected: 4,
                actual: 2,
            })
        );
    }

    #[test]
    fn debug_renders_hex() {
        assert_eq!(format!("{:?}", encode(&Scalar::Int16(1), 0)), "KeyBytes(8001)");
    }
}

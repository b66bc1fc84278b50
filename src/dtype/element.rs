//! Element trait for mapping Rust types to DType

use super::DType;
use crate::error::Result;
use bytemuck::Pod;
use std::ops::{Add, Mul};

/// Trait for types that can be elements of a tensor
///
/// This trait connects Rust's type system to the runtime dtype system.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - Basic trait requirements
/// - `Pod` - Safe byte views for staging into device memory (bytemuck)
/// - `Add + Mul` - The arithmetic a multiply-accumulate kernel needs
pub trait Element:
    Copy + Send + Sync + Pod + 'static + Add<Output = Self> + Mul<Output = Self> + PartialOrd
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 for generic numeric operations
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type (saturating for integers)
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
        }
    };
}

impl_element!(f64, DType::F64);
impl_element!(f32, DType::F32);
impl_element!(i32, DType::I32);
impl_element!(i16, DType::I16);
impl_element!(i8, DType::I8);
impl_element!(u8, DType::U8);

#[cfg(feature = "f16")]
impl Element for half::f16 {
    const DTYPE: DType = DType::F16;

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::f16::from_f64(v)
    }
}

#[cfg(feature = "f16")]
impl Element for half::bf16 {
    const DTYPE: DType = DType::BF16;

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        half::bf16::from_f64(v)
    }
}

/// Encode host `f64` values as the little-endian byte image of `dtype`.
///
/// Values are rounded (floats) or saturated (integers) into the target type.
pub fn encode_f64(dtype: DType, values: &[f64]) -> Result<Vec<u8>> {
    crate::dispatch_dtype!(dtype, T => {
        let typed: Vec<T> = values.iter().map(|&v| T::from_f64(v)).collect();
        Ok(bytemuck::cast_slice(&typed).to_vec())
    })
}

/// Decode a byte image of `dtype` elements back into `f64` values.
///
/// Trailing bytes that do not form a whole element are ignored.
pub fn decode_f64(dtype: DType, bytes: &[u8]) -> Result<Vec<f64>> {
    crate::dispatch_dtype!(dtype, T => {
        let size = std::mem::size_of::<T>();
        let values = bytes
            .chunks_exact(size)
            .map(|chunk| bytemuck::pod_read_unaligned::<T>(chunk).to_f64())
            .collect();
        Ok(values)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_f32() {
        let bytes = encode_f64(DType::F32, &[1.5, -2.0, 3.25]).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(decode_f64(DType::F32, &bytes).unwrap(), vec![1.5, -2.0, 3.25]);
    }

    #[test]
    fn integer_encoding_saturates() {
        let bytes = encode_f64(DType::I8, &[300.0, -300.0, 7.9]).unwrap();
        assert_eq!(decode_f64(DType::I8, &bytes).unwrap(), vec![127.0, -128.0, 7.0]);
    }

    #[cfg(not(feature = "f16"))]
    #[test]
    fn half_requires_feature() {
        let err = encode_f64(DType::F16, &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::FeatureRequired { feature: "f16", .. }
        ));
    }

    #[cfg(feature = "f16")]
    #[test]
    fn half_roundtrip_is_exact_for_small_integers() {
        let bytes = encode_f64(DType::BF16, &[1.0, 2.0, -4.0]).unwrap();
        assert_eq!(bytes.len(), 6);
        assert_eq!(decode_f64(DType::BF16, &bytes).unwrap(), vec![1.0, 2.0, -4.0]);
    }
}

//! Host reference implementations
//!
//! Straightforward single-pass computations used as the ground truth when
//! checking device results. They always accumulate in `f64`, whatever the
//! element type, so the reference is at least as precise as any device
//! variant.

use crate::dtype::Element;
use crate::error::{Error, Result};

/// Dot product of two equally sized slices, accumulated in `f64`
pub fn dot<T: Element>(x: &[T], y: &[T]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(Error::shape_mismatch(&[x.len()], &[y.len()]));
    }
    Ok(x.iter()
        .zip(y)
        .map(|(&a, &b)| a.to_f64() * b.to_f64())
        .sum())
}

/// Dot product over values already decoded to `f64`
pub fn dot_f64(x: &[f64], y: &[f64]) -> Result<f64> {
    dot(x, y)
}

/// Theoretical operation count of a dot product: one multiply and one add
/// per element.
#[inline]
pub const fn theory_ops(element_count: usize) -> u64 {
    (element_count as u64) * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_vectors() {
        assert_eq!(dot(&[1.0f32, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap(), 32.0);
        assert_eq!(dot::<i8>(&[-1, 2], &[3, 4]).unwrap(), 5.0);
        assert_eq!(dot_f64(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn length_mismatch() {
        let err = dot_f64(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn i8_products_do_not_wrap() {
        let x = [127i8; 4];
        assert_eq!(dot(&x, &x).unwrap(), 4.0 * 127.0 * 127.0);
    }

    #[test]
    fn ops_count() {
        assert_eq!(theory_ops(0), 0);
        assert_eq!(theory_ops(1024), 2048);
    }
}

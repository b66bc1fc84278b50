//! Tensor descriptor: the static metadata an operator validates

use super::Shape;
use crate::dtype::DType;
use std::fmt;

/// Static description of one tensor argument: scalar type and shape.
///
/// Descriptors carry no data. They are created by the caller before an
/// operator call and are only borrowed by the operator for its duration.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TensorDescriptor {
    dtype: DType,
    shape: Shape,
    element_count: usize,
}

impl TensorDescriptor {
    /// Create a descriptor. The element count is derived from `shape`.
    pub fn new(dtype: DType, shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        let element_count = shape.elem_count();
        Self {
            dtype,
            shape,
            element_count,
        }
    }

    /// Scalar type of the tensor
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Shape of the tensor
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of dimensions
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Product of all extents; zero for an empty tensor
    #[inline]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Whether the tensor holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.element_count == 0
    }

    /// Bytes needed to hold the tensor's data, saturating at `usize::MAX`
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.element_count.saturating_mul(self.dtype.size_in_bytes())
    }

    /// Bytes needed to hold the tensor's data, or `None` if the element count
    /// or the byte size overflows `usize`
    pub fn checked_size_in_bytes(&self) -> Option<usize> {
        self.shape
            .checked_elem_count()?
            .checked_mul(self.dtype.size_in_bytes())
    }
}

impl fmt::Debug for TensorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.dtype, self.shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_fields() {
        let desc = TensorDescriptor::new(DType::F32, [2, 8]);
        assert_eq!(desc.ndim(), 2);
        assert_eq!(desc.element_count(), 16);
        assert_eq!(desc.size_in_bytes(), 64);
        assert!(!desc.is_empty());
    }

    #[test]
    fn zero_extent_is_empty() {
        let desc = TensorDescriptor::new(DType::F16, vec![4, 0]);
        assert!(desc.is_empty());
        assert_eq!(desc.size_in_bytes(), 0);
    }

    #[test]
    fn empty_descriptor_with_large_extents() {
        let desc = TensorDescriptor::new(DType::F32, [1 << 40, 1 << 40, 0]);
        assert!(desc.is_empty());
        assert_eq!(desc.checked_size_in_bytes(), Some(0));
    }

    #[test]
    fn unaddressable_descriptor() {
        let desc = TensorDescriptor::new(DType::F64, [1 << 62]);
        assert_eq!(desc.element_count(), 1 << 62);
        assert_eq!(desc.size_in_bytes(), usize::MAX);
        assert_eq!(desc.checked_size_in_bytes(), None);
    }

    #[test]
    fn debug_format() {
        let desc = TensorDescriptor::new(DType::I8, [3]);
        assert_eq!(format!("{desc:?}"), "i8[3]");
    }
}

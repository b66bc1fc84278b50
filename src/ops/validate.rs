//! Descriptor validation shared by every operator
//!
//! Checks run in a fixed order and stop at the first failure:
//! presence, then dtype agreement, then rank agreement, then extent agreement,
//! then addressability of every byte size.
//! Validation is pure: it reads descriptors only and never touches device
//! memory or the queue.

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::tensor::TensorDescriptor;
use smallvec::SmallVec;

/// One operator argument: a named descriptor and its device data pointer.
///
/// `desc == None` models a null descriptor and `ptr == 0` a null data
/// pointer.
#[derive(Copy, Clone, Debug)]
pub struct Operand<'a> {
    /// Argument name used in error messages (e.g. `"x"`)
    pub name: &'static str,
    /// Tensor descriptor, if supplied
    pub desc: Option<&'a TensorDescriptor>,
    /// Device data pointer
    pub ptr: u64,
}

impl<'a> Operand<'a> {
    /// Create an operand
    pub const fn new(name: &'static str, desc: Option<&'a TensorDescriptor>, ptr: u64) -> Self {
        Self { name, desc, ptr }
    }
}

/// Descriptors that passed validation.
#[derive(Clone, Debug)]
pub struct Validated<'a> {
    inputs: SmallVec<[&'a TensorDescriptor; 4]>,
    outputs: SmallVec<[&'a TensorDescriptor; 2]>,
    dtype: DType,
}

impl<'a> Validated<'a> {
    /// Shared dtype of every participating tensor
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Validated input descriptors, in argument order
    #[inline]
    pub fn inputs(&self) -> &[&'a TensorDescriptor] {
        &self.inputs
    }

    /// Validated output descriptors, in argument order
    #[inline]
    pub fn outputs(&self) -> &[&'a TensorDescriptor] {
        &self.outputs
    }

    /// The first input; its element count governs the launch
    #[inline]
    pub fn governing(&self) -> &'a TensorDescriptor {
        self.inputs[0]
    }

    /// Element count of the governing input
    #[inline]
    pub fn element_count(&self) -> usize {
        self.governing().element_count()
    }
}

/// Unwrap every descriptor, failing on the first absent one.
pub fn check_present<'a, C>(operands: &[Operand<'a>]) -> Result<C>
where
    C: FromIterator<&'a TensorDescriptor>,
{
    operands
        .iter()
        .map(|op| op.desc.ok_or_else(|| Error::null(format!("{}_desc", op.name))))
        .collect()
}

/// All descriptors share the dtype of the first one.
pub fn check_same_dtype(descs: &[&TensorDescriptor]) -> Result<DType> {
    let Some(first) = descs.first() else {
        return Err(Error::invalid_argument("descriptors", "no tensors to validate"));
    };
    let lhs = first.dtype();
    match descs.iter().find(|d| d.dtype() != lhs) {
        Some(d) => Err(Error::DTypeMismatch { lhs, rhs: d.dtype() }),
        None => Ok(lhs),
    }
}

/// All descriptors have the rank of the first one.
pub fn check_same_rank(descs: &[&TensorDescriptor]) -> Result<()> {
    let Some(first) = descs.first() else {
        return Ok(());
    };
    let lhs = first.ndim();
    match descs.iter().find(|d| d.ndim() != lhs) {
        Some(d) => Err(Error::RankMismatch { lhs, rhs: d.ndim() }),
        None => Ok(()),
    }
}

/// All descriptors have the shape of the first one.
///
/// A rank difference is reported as a shape mismatch here; run
/// [`check_same_rank`] first to get the more specific reason.
pub fn check_same_shape(descs: &[&TensorDescriptor]) -> Result<()> {
    let Some(first) = descs.first() else {
        return Ok(());
    };
    let expected = first.shape();
    match descs.iter().find(|d| d.shape() != expected) {
        Some(d) => Err(Error::shape_mismatch(expected, d.shape())),
        None => Ok(()),
    }
}

/// Every descriptor's byte size fits in `usize`.
pub fn check_addressable(descs: &[&TensorDescriptor]) -> Result<()> {
    match descs.iter().find(|d| d.checked_size_in_bytes().is_none()) {
        Some(d) => Err(Error::invalid_argument(
            "shape",
            format!("{d:?} overflows the addressable size"),
        )),
        None => Ok(()),
    }
}

/// Run every check over the operator's inputs and outputs.
///
/// Dtype agreement spans inputs and outputs; rank and extent agreement
/// span inputs only.
pub fn validate<'a>(inputs: &[Operand<'a>], outputs: &[Operand<'a>]) -> Result<Validated<'a>> {
    if inputs.is_empty() {
        return Err(Error::invalid_argument("inputs", "operator has no inputs"));
    }

    let inputs: SmallVec<[&TensorDescriptor; 4]> = check_present(inputs)?;
    let outputs: SmallVec<[&TensorDescriptor; 2]> = check_present(outputs)?;

    let all: SmallVec<[&TensorDescriptor; 6]> =
        inputs.iter().chain(outputs.iter()).copied().collect();
    let dtype = check_same_dtype(&all)?;
    check_same_rank(&inputs)?;
    check_same_shape(&inputs)?;
    check_addressable(&all)?;

    Ok(Validated {
        inputs,
        outputs,
        dtype,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Reason;

    fn desc(dtype: DType, shape: &[usize]) -> TensorDescriptor {
        TensorDescriptor::new(dtype, shape)
    }

    #[test]
    fn accepts_matching_operands() {
        let x = desc(DType::F32, &[2, 3]);
        let y = desc(DType::F32, &[2, 3]);
        let out = desc(DType::F32, &[1]);
        let v = validate(
            &[Operand::new("x", Some(&x), 1), Operand::new("y", Some(&y), 1)],
            &[Operand::new("output", Some(&out), 1)],
        )
        .unwrap();
        assert_eq!(v.dtype(), DType::F32);
        assert_eq!(v.element_count(), 6);
        assert_eq!(v.inputs().len(), 2);
        assert_eq!(v.outputs().len(), 1);
    }

    #[test]
    fn null_descriptor_is_named() {
        let x = desc(DType::F32, &[3]);
        let err = validate(
            &[Operand::new("x", Some(&x), 1), Operand::new("y", None, 1)],
            &[],
        )
        .unwrap_err();
        assert_eq!(err.reason(), Some(Reason::NullArgument));
        assert!(err.to_string().contains("y_desc"));
    }

    #[test]
    fn output_dtype_participates() {
        let x = desc(DType::F32, &[3]);
        let out = desc(DType::F16, &[1]);
        let err = validate(
            &[Operand::new("x", Some(&x), 1), Operand::new("y", Some(&x), 1)],
            &[Operand::new("output", Some(&out), 1)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::DTypeMismatch {
                lhs: DType::F32,
                rhs: DType::F16
            }
        ));
    }

    #[test]
    fn output_shape_does_not_participate() {
        let x = desc(DType::F64, &[4, 4]);
        let out = desc(DType::F64, &[7]);
        assert!(
            validate(
                &[Operand::new("x", Some(&x), 1), Operand::new("y", Some(&x), 1)],
                &[Operand::new("output", Some(&out), 1)],
            )
            .is_ok()
        );
    }

    #[test]
    fn rank_checked_before_extents() {
        let a = desc(DType::F32, &[6]);
        let b = desc(DType::F32, &[2, 3]);
        assert_eq!(
            check_same_rank(&[&a, &b]).unwrap_err().reason(),
            Some(Reason::RankMismatch)
        );
    }

    #[test]
    fn same_count_different_extents() {
        let a = desc(DType::F32, &[2, 3]);
        let b = desc(DType::F32, &[3, 2]);
        let err = check_same_shape(&[&a, &b]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { ref expected, ref got }
            if expected == &[2, 3] && got == &[3, 2]));
    }

    #[test]
    fn shape_check_alone_catches_rank_difference() {
        let a = desc(DType::F32, &[2, 3]);
        let b = desc(DType::F32, &[2, 3, 4]);
        let err = check_same_shape(&[&a, &b]).unwrap_err();
        assert_eq!(err.reason(), Some(Reason::ShapeMismatch));
        assert!(check_same_shape(&[&b, &a]).is_err());
    }

    #[test]
    fn overflowing_shape_is_invalid() {
        let x = desc(DType::F32, &[1 << 40, 1 << 40]);
        let out = desc(DType::F32, &[1]);
        let err = validate(
            &[Operand::new("x", Some(&x), 1), Operand::new("y", Some(&x), 1)],
            &[Operand::new("output", Some(&out), 1)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "shape", .. }));
        assert_eq!(err.status(), crate::error::Status::BadParam);
    }

    #[test]
    fn empty_shape_with_large_extents_is_addressable() {
        let x = desc(DType::F32, &[1 << 40, 1 << 40, 0]);
        let out = desc(DType::F32, &[1]);
        let v = validate(
            &[Operand::new("x", Some(&x), 0), Operand::new("y", Some(&x), 0)],
            &[Operand::new("output", Some(&out), 0)],
        )
        .unwrap();
        assert_eq!(v.element_count(), 0);
    }

    #[test]
    fn dtype_wins_over_shape() {
        let a = desc(DType::F32, &[3]);
        let b = desc(DType::F16, &[4]);
        let err = validate(
            &[Operand::new("x", Some(&a), 1), Operand::new("y", Some(&b), 1)],
            &[],
        )
        .unwrap_err();
        assert_eq!(err.reason(), Some(Reason::DTypeMismatch));
    }
}

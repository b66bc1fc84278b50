//! Test case descriptions

use super::Tolerance;
use crate::dtype::{DType, decode_f64, encode_f64};
use crate::error::{Reason, Result};
use crate::tensor::{Shape, TensorDescriptor};

/// What a case expects from the device path
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Expectation {
    /// The call is accepted and the output matches the host reference
    Match,
    /// The call is rejected by this validation check
    Reject(Reason),
    /// The call is accepted but nothing is computed (zero elements)
    Skip,
}

/// One input tensor of a case: descriptor plus host values.
#[derive(Clone, Debug)]
pub struct CaseTensor {
    /// Descriptor handed to the operator (`None` = null descriptor)
    pub desc: Option<TensorDescriptor>,
    /// Host values, converted to the descriptor's dtype when staged
    pub values: Vec<f64>,
    /// Pass a null data pointer even though values are present
    pub null_data: bool,
}

/// A named operator invocation with its expected outcome
#[derive(Clone, Debug)]
pub struct TestCase {
    pub(crate) name: String,
    pub(crate) inputs: Vec<CaseTensor>,
    pub(crate) outputs: Vec<Option<TensorDescriptor>>,
    pub(crate) expectation: Expectation,
    pub(crate) tolerance: Option<Tolerance>,
}

impl TestCase {
    /// Start an empty case expecting [`Expectation::Match`]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            expectation: Expectation::Match,
            tolerance: None,
        }
    }

    /// A well-formed dot product: two inputs of `shape` and a one-element
    /// output, all in `dtype`.
    pub fn dot(
        name: impl Into<String>,
        dtype: DType,
        shape: impl Into<Shape>,
        x: Vec<f64>,
        y: Vec<f64>,
    ) -> Self {
        let shape = shape.into();
        let expectation = if shape.elem_count() == 0 {
            Expectation::Skip
        } else {
            Expectation::Match
        };
        Self::new(name)
            .input(TensorDescriptor::new(dtype, shape.clone()), x)
            .input(TensorDescriptor::new(dtype, shape), y)
            .output(TensorDescriptor::new(dtype, [1]))
            .expect(expectation)
    }

    /// Append an input tensor
    pub fn input(mut self, desc: TensorDescriptor, values: Vec<f64>) -> Self {
        self.inputs.push(CaseTensor {
            desc: Some(desc),
            values,
            null_data: false,
        });
        self
    }

    /// Append an input whose descriptor is null
    pub fn null_input(mut self) -> Self {
        self.inputs.push(CaseTensor {
            desc: None,
            values: Vec::new(),
            null_data: true,
        });
        self
    }

    /// Append an input with a descriptor but a null data pointer
    pub fn input_without_data(mut self, desc: TensorDescriptor) -> Self {
        self.inputs.push(CaseTensor {
            desc: Some(desc),
            values: Vec::new(),
            null_data: true,
        });
        self
    }

    /// Append an output tensor
    pub fn output(mut self, desc: TensorDescriptor) -> Self {
        self.outputs.push(Some(desc));
        self
    }

    /// Append an output whose descriptor is null
    pub fn null_output(mut self) -> Self {
        self.outputs.push(None);
        self
    }

    /// Set the expected outcome
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectation = expectation;
        self
    }

    /// Override the comparison tolerance for this case
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Case name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input tensors
    pub fn inputs(&self) -> &[CaseTensor] {
        &self.inputs
    }

    /// Output descriptors
    pub fn outputs(&self) -> &[Option<TensorDescriptor>] {
        &self.outputs
    }

    /// Expected outcome
    pub fn expectation(&self) -> Expectation {
        self.expectation
    }

    /// Per-case tolerance override
    pub fn tolerance(&self) -> Option<Tolerance> {
        self.tolerance
    }

    /// Dtype of the first described tensor
    pub fn dtype(&self) -> Option<DType> {
        self.inputs
            .iter()
            .filter_map(|t| t.desc.as_ref())
            .chain(self.outputs.iter().flatten())
            .map(TensorDescriptor::dtype)
            .next()
    }

    /// Element count of the first input, `0` if it has no descriptor
    pub fn element_count(&self) -> usize {
        self.inputs
            .first()
            .and_then(|t| t.desc.as_ref())
            .map_or(0, TensorDescriptor::element_count)
    }

    /// Input values as the device sees them: rounded through each input's
    /// dtype so the reference works on identical data.
    pub fn quantized_inputs(&self) -> Result<Vec<Vec<f64>>> {
        self.inputs
            .iter()
            .map(|t| match &t.desc {
                Some(desc) => decode_f64(desc.dtype(), &encode_f64(desc.dtype(), &t.values)?),
                None => Ok(t.values.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_builder() {
        let case = TestCase::dot("d", DType::F32, [3], vec![1.0; 3], vec![2.0; 3]);
        assert_eq!(case.inputs().len(), 2);
        assert_eq!(case.outputs().len(), 1);
        assert_eq!(case.expectation(), Expectation::Match);
        assert_eq!(case.element_count(), 3);
        assert_eq!(case.dtype(), Some(DType::F32));
    }

    #[test]
    fn empty_dot_expects_skip() {
        let case = TestCase::dot("e", DType::F64, [0], vec![], vec![]);
        assert_eq!(case.expectation(), Expectation::Skip);
    }

    #[test]
    fn quantization_follows_dtype() {
        let case = TestCase::new("q")
            .input(TensorDescriptor::new(DType::I8, [2]), vec![1.7, 300.0])
            .input(TensorDescriptor::new(DType::F64, [2]), vec![0.1, 0.2]);
        let q = case.quantized_inputs().unwrap();
        assert_eq!(q[0], vec![1.0, 127.0]);
        assert_eq!(q[1], vec![0.1, 0.2]);
    }

    #[test]
    fn dtype_skips_null_descriptors() {
        let case = TestCase::new("n")
            .null_input()
            .output(TensorDescriptor::new(DType::U8, [1]));
        assert_eq!(case.dtype(), Some(DType::U8));
        assert_eq!(case.element_count(), 0);
    }
}

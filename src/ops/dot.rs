//! Dot product operator

use super::dispatch::{Dispatched, Operator, dispatch};
use super::validate::{Operand, Validated};
use crate::dtype::DType;
use crate::error::{Error, Result, Status};
use crate::runtime::{DotKernel, Handle, LaunchConfig};
use crate::tensor::TensorDescriptor;

/// `output[0] = sum(x[i] * y[i])` over every element of `x` and `y`.
///
/// `x` and `y` must agree on dtype, rank and extents; the output must share
/// their dtype and hold at least one element. Multi-dimensional inputs are
/// reduced over all elements.
#[derive(Clone, Debug, Default)]
pub struct DotProduct<K> {
    kernel: K,
}

impl<K: DotKernel> DotProduct<K> {
    /// Create the operator around a device kernel
    pub fn new(kernel: K) -> Self {
        Self { kernel }
    }

    /// The device kernel launches are handed to
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Validate and enqueue the dot product.
    ///
    /// Returns `Skipped` for empty inputs without reading any pointer. The
    /// output is only valid after the handle's queue is synchronized.
    #[allow(clippy::too_many_arguments)]
    pub fn dispatch(
        &self,
        handle: Option<&Handle>,
        x_desc: Option<&TensorDescriptor>,
        x: u64,
        y_desc: Option<&TensorDescriptor>,
        y: u64,
        output_desc: Option<&TensorDescriptor>,
        output: u64,
    ) -> Result<Dispatched> {
        dispatch(
            self,
            handle,
            &[Operand::new("x", x_desc, x), Operand::new("y", y_desc, y)],
            &[Operand::new("output", output_desc, output)],
        )
    }

    /// Status-returning form of [`DotProduct::dispatch`].
    #[allow(clippy::too_many_arguments)]
    pub fn call(
        &self,
        handle: Option<&Handle>,
        x_desc: Option<&TensorDescriptor>,
        x: u64,
        y_desc: Option<&TensorDescriptor>,
        y: u64,
        output_desc: Option<&TensorDescriptor>,
        output: u64,
    ) -> Status {
        Status::from(&self.dispatch(handle, x_desc, x, y_desc, y, output_desc, output))
    }
}

impl<K: DotKernel> Operator for DotProduct<K> {
    const NAME: &'static str = "dot_product";
    const INPUTS: usize = 2;
    const OUTPUTS: usize = 1;

    fn check(&self, validated: &Validated<'_>) -> Result<()> {
        if validated.outputs()[0].element_count() == 0 {
            return Err(Error::invalid_argument(
                "output_desc",
                "output must hold at least one element",
            ));
        }
        Ok(())
    }

    fn launch(
        &self,
        handle: &Handle,
        config: &LaunchConfig,
        dtype: DType,
        inputs: &[u64],
        outputs: &[u64],
        element_count: usize,
    ) -> Status {
        self.kernel.launch(
            config,
            handle.queue(),
            dtype,
            inputs[0],
            inputs[1],
            outputs[0],
            element_count,
        )
    }
}

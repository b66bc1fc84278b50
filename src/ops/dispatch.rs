//! Operator dispatch pipeline
//!
//! Every operator entry point runs the same sequence:
//!
//! ```text
//! handle present, arity
//!   └── validate (descriptors)
//!         └── zero-element fast path ── Skipped
//!               └── operator-specific check
//!                     └── data pointers non-null
//!                           └── plan → Operator::launch ── Launched
//! ```
//!
//! No device work is issued unless every step before the launch passed.
//! A failure is logged once at error level, tagged with the operator name.

use super::validate::{Operand, Validated, validate};
use crate::dtype::DType;
use crate::error::{Error, Result, Status};
use crate::runtime::{Handle, LaunchConfig, NULL_PTR, plan};
use smallvec::SmallVec;

/// Outcome of a successful dispatch
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Dispatched {
    /// The kernel was enqueued with this configuration
    Launched(LaunchConfig),
    /// Nothing to compute (zero elements); no pointer was read
    Skipped,
}

impl Dispatched {
    /// Launch configuration, if a kernel was enqueued
    pub fn config(&self) -> Option<&LaunchConfig> {
        match self {
            Self::Launched(config) => Some(config),
            Self::Skipped => None,
        }
    }

    /// Whether the zero-element fast path was taken
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

impl From<&Result<Dispatched>> for Status {
    fn from(result: &Result<Dispatched>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(err) => err.status(),
        }
    }
}

/// A device operator with fixed arity.
pub trait Operator {
    /// Name used in log lines
    const NAME: &'static str;
    /// Number of input tensors
    const INPUTS: usize;
    /// Number of output tensors
    const OUTPUTS: usize;

    /// Operator-specific checks after the shared validation passed and the
    /// input is known to be non-empty.
    fn check(&self, _validated: &Validated<'_>) -> Result<()> {
        Ok(())
    }

    /// Enqueue the kernel. Pointers are non-null and in argument order.
    #[allow(clippy::too_many_arguments)]
    fn launch(
        &self,
        handle: &Handle,
        config: &LaunchConfig,
        dtype: DType,
        inputs: &[u64],
        outputs: &[u64],
        element_count: usize,
    ) -> Status;
}

/// Run the dispatch pipeline for `op`. See the module docs for the order.
pub fn dispatch<O: Operator>(
    op: &O,
    handle: Option<&Handle>,
    inputs: &[Operand<'_>],
    outputs: &[Operand<'_>],
) -> Result<Dispatched> {
    let result = dispatch_inner(op, handle, inputs, outputs);
    if let Err(err) = &result {
        log::error!("[{}] {err}", O::NAME);
    }
    result
}

fn dispatch_inner<O: Operator>(
    op: &O,
    handle: Option<&Handle>,
    inputs: &[Operand<'_>],
    outputs: &[Operand<'_>],
) -> Result<Dispatched> {
    let handle = handle.ok_or_else(|| Error::null("handle"))?;
    check_arity("inputs", inputs.len(), O::INPUTS)?;
    check_arity("outputs", outputs.len(), O::OUTPUTS)?;

    let validated = validate(inputs, outputs)?;
    let element_count = validated.element_count();
    if element_count == 0 {
        log::debug!("[{}] skipping zero element operation", O::NAME);
        return Ok(Dispatched::Skipped);
    }

    op.check(&validated)?;

    let input_ptrs = non_null_ptrs(inputs)?;
    let output_ptrs = non_null_ptrs(outputs)?;

    let config = plan(handle, element_count);
    let status = op.launch(
        handle,
        &config,
        validated.dtype(),
        &input_ptrs,
        &output_ptrs,
        element_count,
    );
    if !status.is_success() {
        return Err(Error::Kernel(status));
    }
    Ok(Dispatched::Launched(config))
}

fn check_arity(arg: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(Error::invalid_argument(
            arg,
            format!("expected {expected} tensors, got {got}"),
        ));
    }
    Ok(())
}

fn non_null_ptrs(operands: &[Operand<'_>]) -> Result<SmallVec<[u64; 4]>> {
    operands
        .iter()
        .map(|op| {
            if op.ptr == NULL_PTR {
                Err(Error::null(op.name))
            } else {
                Ok(op.ptr)
            }
        })
        .collect()
}

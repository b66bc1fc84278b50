//! Reference-comparison test harness
//!
//! Drives an operator through its device path and checks the outcome against
//! a host reference:
//!
//! ```text
//! Harness::run_case(executor, case)
//!   ├── param_check         arity of the case vs the operator
//!   ├── stage               host values → device buffers (Match only)
//!   ├── compute (timed)     operator call on the handle
//!   ├── synchronize         always, before buffers are released
//!   └── verdict
//!         ├── Reject(r)     pass iff the call failed with reason r
//!         ├── Skip          pass iff the call was skipped
//!         └── Match         read back, cpu_compute, compare per element
//! ```
//!
//! Inputs are rounded through their dtype before the reference sees them, so
//! the comparison measures the kernel and not the input quantization.

mod case;
mod report;
mod tolerance;

pub use case::{CaseTensor, Expectation, TestCase};
pub use report::{CaseReport, Summary, Verdict};
pub use tolerance::{Comparison, Tolerance};

use crate::dtype::{decode_f64, encode_f64};
use crate::error::{Error, Result};
use crate::ops::{Dispatched, DotProduct};
use crate::reference;
use crate::runtime::{DeviceBuffer, DeviceMemory, DotKernel, Handle, NULL_PTR};
use crate::tensor::TensorDescriptor;
use smallvec::SmallVec;
use std::time::Instant;

/// Device pointers of a staged case, in argument order
#[derive(Clone, Debug, Default)]
pub struct Staged {
    /// Input pointers (`0` for null data)
    pub inputs: SmallVec<[u64; 4]>,
    /// Output pointers (`0` for null descriptors)
    pub outputs: SmallVec<[u64; 2]>,
}

/// The operator-specific side of a harness run.
pub trait Executor {
    /// Operator name used in reports and logs
    fn name(&self) -> &str;

    /// Number of input tensors the operator takes
    fn inputs(&self) -> usize;

    /// Number of output tensors the operator produces
    fn outputs(&self) -> usize;

    /// Reject cases whose tensor counts do not fit the operator
    fn param_check(&self, case: &TestCase) -> Result<()> {
        if case.inputs().len() != self.inputs() {
            return Err(Error::invalid_argument(
                "inputs",
                format!(
                    "{} takes {} inputs, case '{}' has {}",
                    self.name(),
                    self.inputs(),
                    case.name(),
                    case.inputs().len()
                ),
            ));
        }
        if case.outputs().len() != self.outputs() {
            return Err(Error::invalid_argument(
                "outputs",
                format!(
                    "{} produces {} outputs, case '{}' has {}",
                    self.name(),
                    self.outputs(),
                    case.name(),
                    case.outputs().len()
                ),
            ));
        }
        Ok(())
    }

    /// Invoke the operator on staged device buffers
    fn compute(&self, handle: &Handle, case: &TestCase, staged: &Staged) -> Result<Dispatched>;

    /// Host reference over the (quantized) input values
    fn cpu_compute(&self, inputs: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Theoretical operation count of the case
    fn theory_ops(&self, case: &TestCase) -> u64;
}

/// Harness executor for [`DotProduct`]
#[derive(Clone, Debug, Default)]
pub struct DotProductExecutor<K> {
    op: DotProduct<K>,
}

impl<K: DotKernel> DotProductExecutor<K> {
    /// Wrap a kernel in the dot-product operator
    pub fn new(kernel: K) -> Self {
        Self {
            op: DotProduct::new(kernel),
        }
    }

    /// The operator under test
    pub fn operator(&self) -> &DotProduct<K> {
        &self.op
    }
}

impl<K: DotKernel> Executor for DotProductExecutor<K> {
    fn name(&self) -> &str {
        "dot_product"
    }

    fn inputs(&self) -> usize {
        2
    }

    fn outputs(&self) -> usize {
        1
    }

    fn compute(&self, handle: &Handle, case: &TestCase, staged: &Staged) -> Result<Dispatched> {
        let inputs = case.inputs();
        self.op.dispatch(
            Some(handle),
            inputs[0].desc.as_ref(),
            staged.inputs[0],
            inputs[1].desc.as_ref(),
            staged.inputs[1],
            case.outputs()[0].as_ref(),
            staged.outputs[0],
        )
    }

    fn cpu_compute(&self, inputs: &[Vec<f64>]) -> Result<Vec<f64>> {
        Ok(vec![reference::dot_f64(&inputs[0], &inputs[1])?])
    }

    fn theory_ops(&self, case: &TestCase) -> u64 {
        reference::theory_ops(case.element_count())
    }
}

/// Harness-wide settings
#[derive(Copy, Clone, Debug, Default)]
pub struct HarnessConfig {
    tolerance: Option<Tolerance>,
    zero_threshold: Option<f64>,
    stop_on_failure: bool,
}

impl HarnessConfig {
    /// Default settings: per-dtype tolerance, run every case
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `tolerance` for cases that do not carry their own
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Override the zero threshold of the per-dtype default tolerance
    pub fn with_zero_threshold(mut self, zero_threshold: f64) -> Self {
        self.zero_threshold = Some(zero_threshold);
        self
    }

    /// Stop [`Harness::run_all`] at the first failing case
    pub fn stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    fn tolerance_for(&self, case: &TestCase) -> Tolerance {
        if let Some(tolerance) = case.tolerance().or(self.tolerance) {
            return tolerance;
        }
        let tolerance = case
            .dtype()
            .map_or_else(Tolerance::exact, Tolerance::for_dtype);
        match self.zero_threshold {
            Some(threshold) => tolerance.with_zero_threshold(threshold),
            None => tolerance,
        }
    }
}

/// Runs test cases against a handle and a device allocator.
pub struct Harness<'h, M: DeviceMemory> {
    handle: &'h Handle,
    memory: &'h M,
    config: HarnessConfig,
}

impl<'h, M: DeviceMemory> Harness<'h, M> {
    /// Create a harness with default settings
    pub fn new(handle: &'h Handle, memory: &'h M) -> Self {
        Self::with_config(handle, memory, HarnessConfig::default())
    }

    /// Create a harness with explicit settings
    pub fn with_config(handle: &'h Handle, memory: &'h M, config: HarnessConfig) -> Self {
        Self {
            handle,
            memory,
            config,
        }
    }

    /// Run one case.
    ///
    /// Errors are reserved for cases that could not be run at all (arity
    /// mismatch, staging failure, unreadable output); a device path that
    /// misbehaves produces a failing [`Verdict`] instead.
    pub fn run_case<E: Executor>(&self, executor: &E, case: &TestCase) -> Result<CaseReport> {
        executor.param_check(case)?;

        // Values are staged for Match cases only; the rest get zeroed buffers.
        let with_values = case.expectation() == Expectation::Match;
        let mut input_buffers = Vec::with_capacity(case.inputs().len());
        let mut staged = Staged::default();
        for tensor in case.inputs() {
            let buffer = match &tensor.desc {
                Some(desc) if !tensor.null_data && with_values => {
                    if tensor.values.len() != desc.element_count() {
                        return Err(Error::invalid_argument(
                            "values",
                            format!(
                                "case '{}' has {} values for a {desc:?} input",
                                case.name(),
                                tensor.values.len()
                            ),
                        ));
                    }
                    let bytes = encode_f64(desc.dtype(), &tensor.values)?;
                    Some(DeviceBuffer::from_bytes(self.memory, &bytes)?)
                }
                Some(desc) if !tensor.null_data => self.zeroed(desc)?,
                _ => None,
            };
            staged.inputs.push(buffer.as_ref().map_or(NULL_PTR, DeviceBuffer::ptr));
            input_buffers.push(buffer);
        }

        let mut output_buffers = Vec::with_capacity(case.outputs().len());
        for desc in case.outputs() {
            let buffer = match desc {
                Some(desc) => self.zeroed(desc)?,
                None => None,
            };
            staged.outputs.push(buffer.as_ref().map_or(NULL_PTR, DeviceBuffer::ptr));
            output_buffers.push(buffer);
        }
        log::trace!(
            "[{}] staged '{}': inputs {:x?}, outputs {:x?}",
            executor.name(),
            case.name(),
            staged.inputs,
            staged.outputs
        );

        let start = Instant::now();
        let result = executor.compute(self.handle, case, &staged);
        let interface_time = start.elapsed();

        // Buffers must outlive any work still on the queue.
        let start = Instant::now();
        let synced = self.handle.synchronize();
        let device_time = start.elapsed();

        let verdict = match (case.expectation(), result, synced) {
            (_, _, Err(err)) => Verdict::fail(format!("queue failed: {err}")),
            (Expectation::Reject(expected), Err(err), _) if err.reason() == Some(expected) => {
                Verdict::Pass
            }
            (Expectation::Reject(expected), Err(err), _) => {
                Verdict::fail(format!("rejected with '{err}', expected {expected:?}"))
            }
            (Expectation::Reject(expected), Ok(outcome), _) => {
                Verdict::fail(format!("accepted ({outcome:?}), expected {expected:?}"))
            }
            (Expectation::Skip, Ok(Dispatched::Skipped), _) => Verdict::Pass,
            (Expectation::Skip, Ok(outcome), _) => {
                Verdict::fail(format!("expected a skip, got {outcome:?}"))
            }
            (Expectation::Skip | Expectation::Match, Err(err), _) => {
                Verdict::fail(format!("rejected: {err}"))
            }
            (Expectation::Match, Ok(Dispatched::Skipped), _) => {
                Verdict::fail("skipped, expected a launch")
            }
            (Expectation::Match, Ok(Dispatched::Launched(_)), Ok(())) => {
                self.compare(executor, case, &output_buffers)?
            }
        };

        let report = CaseReport {
            name: case.name().to_string(),
            verdict,
            interface_time,
            device_time,
            theory_ops: executor.theory_ops(case),
        };
        log::debug!("{report}");
        Ok(report)
    }

    /// Zeroed device buffer for `desc`; null when its size is not addressable
    fn zeroed(&self, desc: &TensorDescriptor) -> Result<Option<DeviceBuffer<'h, M>>> {
        match desc.checked_size_in_bytes() {
            Some(size) => DeviceBuffer::zeroed(self.memory, size).map(Some),
            None => Ok(None),
        }
    }

    fn compare<E: Executor>(
        &self,
        executor: &E,
        case: &TestCase,
        output_buffers: &[Option<DeviceBuffer<'_, M>>],
    ) -> Result<Verdict> {
        let reference = executor.cpu_compute(&case.quantized_inputs()?)?;
        let tolerance = self.config.tolerance_for(case);

        let mut actual = Vec::with_capacity(reference.len());
        for (desc, buffer) in case.outputs().iter().zip(output_buffers) {
            if let (Some(desc), Some(buffer)) = (desc, buffer) {
                actual.extend(decode_f64(desc.dtype(), &buffer.to_bytes()?)?);
            }
        }
        if actual.len() < reference.len() {
            return Ok(Verdict::fail(format!(
                "expected {} output values, read {}",
                reference.len(),
                actual.len()
            )));
        }

        let mut worst: Option<(usize, f64, f64, Comparison)> = None;
        for (i, (&a, &r)) in actual.iter().zip(&reference).enumerate() {
            let cmp = tolerance.compare(a, r);
            if !cmp.passed && worst.is_none_or(|(.., w)| cmp.delta > w.delta) {
                worst = Some((i, a, r, cmp));
            }
        }
        Ok(match worst {
            None => Verdict::Pass,
            Some((i, a, r, cmp)) => Verdict::Fail {
                reason: format!("element {i}: got {a}, reference {r}"),
                delta: Some(cmp.delta),
            },
        })
    }

    /// Run cases in order, one at a time.
    ///
    /// A case that cannot be run is reported as failing.
    pub fn run_all<E: Executor>(&self, executor: &E, cases: &[TestCase]) -> Summary {
        let mut summary = Summary::default();
        for case in cases {
            let report = self.run_case(executor, case).unwrap_or_else(|err| {
                log::error!("[{}] case '{}' aborted: {err}", executor.name(), case.name());
                CaseReport {
                    name: case.name().to_string(),
                    verdict: Verdict::fail(format!("aborted: {err}")),
                    interface_time: Default::default(),
                    device_time: Default::default(),
                    theory_ops: 0,
                }
            });
            let failed = !report.verdict.is_pass();
            summary.reports.push(report);
            if failed && self.config.stop_on_failure {
                break;
            }
        }
        summary
    }
}

//! # kernelgate
//!
//! **Validation and dispatch for accelerator operators, with a
//! reference-comparison test harness.**
//!
//! kernelgate sits between a caller holding tensor descriptors plus device
//! pointers and an opaque device kernel. Every call is validated before any
//! device work is issued; accepted calls get a launch configuration derived
//! from the device's capability and are enqueued asynchronously.
//!
//! ## Features
//!
//! - **Validation gate**: presence, dtype, rank and extent checks in a fixed
//!   order, each failure reported with a specific reason
//! - **Zero-element fast path**: empty inputs succeed without touching data
//! - **Launch planning**: grid derived from cores per cluster and the cluster
//!   limit of the bound device
//! - **Pluggable kernels**: operators are generic over a kernel trait, with a
//!   host implementation for development and testing
//! - **Test harness**: runs cases through the device path and compares
//!   against a host reference under a per-dtype tolerance
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kernelgate::prelude::*;
//!
//! let handle = Handle::new(DeviceCapability::default())?;
//! let memory = HostMemory::new();
//! let harness = Harness::new(&handle, &memory);
//! let executor = DotProductExecutor::new(HostDotKernel::new());
//!
//! let case = TestCase::dot("small", DType::F32, [3], vec![1., 2., 3.], vec![4., 5., 6.]);
//! let report = harness.run_case(&executor, &case)?;
//! assert!(report.verdict.is_pass());
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): parallel partial sums in the host kernel
//! - `f16`: half-precision host encoding (F16, BF16)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dtype;
pub mod error;
pub mod harness;
pub mod ops;
pub mod reference;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{DType, Element};
    pub use crate::error::{Error, Reason, Result, Status};
    pub use crate::harness::{
        DotProductExecutor, Executor, Expectation, Harness, HarnessConfig, TestCase, Tolerance,
    };
    pub use crate::ops::{Dispatched, DotProduct};
    pub use crate::runtime::host::{HostDotKernel, HostMemory};
    pub use crate::runtime::{DeviceCapability, DeviceMemory, DotKernel, Handle};
    pub use crate::tensor::{Shape, TensorDescriptor};
}

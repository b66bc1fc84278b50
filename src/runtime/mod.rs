//! Device execution context, launch planning and the kernel boundary
//!
//! # Architecture
//!
//! ```text
//! Handle (borrowed by every operator call)
//! ├── DeviceCapability (immutable snapshot: clusters, cores per cluster)
//! └── Queue (ordered asynchronous submission)
//!
//! plan(handle, n) -> LaunchConfig (grid + kernel kind)
//! DotKernel::launch(config, queue, dtype, x, y, out, n) -> Status
//! DeviceMemory (allocate / copy / free device pointers)
//! ```
//!
//! Device pointers are plain `u64` addresses; `0` is the null pointer.
//! The [`host`] module provides a host-memory implementation of the device
//! side so operators can be exercised end-to-end without hardware.

mod handle;
pub mod host;
pub mod kernel;
pub mod launch;
mod memory;
mod queue;

pub use handle::{DeviceCapability, Handle};
pub use kernel::DotKernel;
pub use launch::{KernelKind, LaunchConfig, plan};
pub use memory::{DeviceBuffer, DeviceMemory};
pub use queue::Queue;

/// The null device pointer
pub const NULL_PTR: u64 = 0;

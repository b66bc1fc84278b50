//! Host-memory backend for the device runtime
//!
//! Allocates "device" memory on the host heap and runs kernels on the
//! handle's queue worker. Used by the test harness and for development
//! without an accelerator.

mod kernel;
mod memory;

pub use kernel::HostDotKernel;
pub use memory::HostMemory;

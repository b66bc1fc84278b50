//! Common test utilities
#![allow(dead_code)]

use kernelgate::dtype::DType;
use kernelgate::error::Status;
use kernelgate::runtime::host::HostDotKernel;
use kernelgate::runtime::{DeviceCapability, DotKernel, Handle, LaunchConfig, Queue};
use parking_lot::Mutex;

/// Install a test logger once per process
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Create a handle over a small host "device" (2 clusters x 4 cores)
pub fn host_handle() -> Handle {
    init_logging();
    Handle::new(DeviceCapability::new(2, 4)).expect("host handle")
}

/// One recorded kernel launch
#[derive(Clone, Debug, PartialEq)]
pub struct Launch {
    pub config: LaunchConfig,
    pub dtype: DType,
    pub x: u64,
    pub y: u64,
    pub out: u64,
    pub element_count: usize,
}

/// Kernel that records every launch.
///
/// Returns `status` for each launch; when `delegate` is set and the status is
/// `Success`, also forwards to the host kernel so outputs are written.
pub struct SpyKernel {
    status: Status,
    delegate: bool,
    launches: Mutex<Vec<Launch>>,
}

impl SpyKernel {
    /// Record launches without computing anything
    pub fn new() -> Self {
        Self {
            status: Status::Success,
            delegate: false,
            launches: Mutex::new(Vec::new()),
        }
    }

    /// Record launches and compute through the host kernel
    pub fn computing() -> Self {
        Self {
            delegate: true,
            ..Self::new()
        }
    }

    /// Record launches and report `status` for each
    pub fn failing(status: Status) -> Self {
        Self {
            status,
            ..Self::new()
        }
    }

    pub fn launch_count(&self) -> usize {
        self.launches.lock().len()
    }

    pub fn launches(&self) -> Vec<Launch> {
        self.launches.lock().clone()
    }
}

impl DotKernel for SpyKernel {
    fn launch(
        &self,
        config: &LaunchConfig,
        queue: &Queue,
        dtype: DType,
        x: u64,
        y: u64,
        out: u64,
        element_count: usize,
    ) -> Status {
        self.launches.lock().push(Launch {
            config: *config,
            dtype,
            x,
            y,
            out,
            element_count,
        });
        if self.delegate && self.status.is_success() {
            return HostDotKernel::new().launch(config, queue, dtype, x, y, out, element_count);
        }
        self.status
    }
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Get (rtol, atol) tolerance for a specific dtype
pub fn tolerance_for_dtype(dtype: DType) -> (f64, f64) {
    match dtype {
        DType::F32 => (1e-5, 1e-6),
        DType::F64 => (1e-12, 1e-14),
        DType::F16 | DType::BF16 => (0.01, 0.1),
        _ => (0.0, 0.0),
    }
}

//! Host implementation of the dot-product kernel

use crate::dtype::{DType, Element};
use crate::error::{Result, Status};
use crate::runtime::{DotKernel, LaunchConfig, NULL_PTR, Queue};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Dot-product kernel executing on the host through the handle's queue.
///
/// The input is split into `config.parallelism()` contiguous chunks, one per
/// grid worker. Each chunk accumulates in `f32` (`f64` for `F64` inputs) and
/// the partial sums are combined in chunk order, so the result is
/// deterministic for a given launch configuration.
///
/// Supports floating point dtypes only; integer dtypes report
/// [`Status::NotSupported`].
///
/// The pointers passed to [`DotKernel::launch`] must come from
/// [`HostMemory`](super::HostMemory) and stay allocated until the queue is
/// synchronized.
#[derive(Copy, Clone, Debug, Default)]
pub struct HostDotKernel;

impl HostDotKernel {
    /// Create the kernel
    pub const fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    fn enqueue(
        &self,
        config: &LaunchConfig,
        queue: &Queue,
        dtype: DType,
        x: u64,
        y: u64,
        out: u64,
        element_count: usize,
    ) -> Result<()> {
        let workers = config.parallelism().max(1);
        let wide = dtype == DType::F64;
        crate::dispatch_dtype!(dtype, T => {
            queue.submit(move || {
                // SAFETY: the launch contract keeps x and y valid for
                // element_count elements and out for one element until the
                // queue is synchronized.
                let (xs, ys) = unsafe {
                    (
                        std::slice::from_raw_parts(x as *const T, element_count),
                        std::slice::from_raw_parts(y as *const T, element_count),
                    )
                };
                let total = dot_chunked(xs, ys, workers, wide);
                unsafe { (out as *mut T).write_unaligned(T::from_f64(total)) };
                Status::Success
            })
        })
    }
}

impl DotKernel for HostDotKernel {
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
        if !dtype.is_float() {
            log::warn!("host dot kernel has no {dtype} variant");
            return Status::NotSupported;
        }
        if [x, y, out].contains(&NULL_PTR) {
            log::warn!("host dot kernel launched with a null pointer");
            return Status::InternalError;
        }
        match self.enqueue(config, queue, dtype, x, y, out, element_count) {
            Ok(()) => Status::Success,
            Err(err) => {
                log::warn!("host dot kernel: {err}");
                err.status()
            }
        }
    }
}

/// Sum of products of `x` and `y`, computed in `workers` contiguous chunks.
fn dot_chunked<T: Element>(x: &[T], y: &[T], workers: usize, wide: bool) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let chunk = x.len().div_ceil(workers);

    #[cfg(feature = "rayon")]
    let partials: Vec<f64> = x
        .par_chunks(chunk)
        .zip(y.par_chunks(chunk))
        .map(|(xc, yc)| chunk_sum(xc, yc, wide))
        .collect();

    #[cfg(not(feature = "rayon"))]
    let partials: Vec<f64> = x
        .chunks(chunk)
        .zip(y.chunks(chunk))
        .map(|(xc, yc)| chunk_sum(xc, yc, wide))
        .collect();

    if wide {
        partials.iter().sum()
    } else {
        partials.iter().fold(0.0f32, |acc, &p| acc + p as f32) as f64
    }
}

#[inline]
fn chunk_sum<T: Element>(x: &[T], y: &[T], wide: bool) -> f64 {
    if wide {
        x.iter().zip(y).map(|(&a, &b)| a.to_f64() * b.to_f64()).sum()
    } else {
        x.iter()
            .zip(y)
            .map(|(&a, &b)| a.to_f64() as f32 * b.to_f64() as f32)
            .sum::<f32>() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::host::HostMemory;
    use crate::runtime::{DeviceBuffer, DeviceCapability, Handle, KernelKind};

    fn launch_f32(handle: &Handle, x: &[f32], y: &[f32]) -> (Status, f32) {
        let mem = HostMemory::new();
        let xb = DeviceBuffer::from_bytes(&mem, bytemuck::cast_slice(x)).unwrap();
        let yb = DeviceBuffer::from_bytes(&mem, bytemuck::cast_slice(y)).unwrap();
        let ob = DeviceBuffer::zeroed(&mem, 4).unwrap();
        let config = crate::runtime::plan(handle, x.len());
        let status = HostDotKernel.launch(
            &config,
            handle.queue(),
            DType::F32,
            xb.ptr(),
            yb.ptr(),
            ob.ptr(),
            x.len(),
        );
        handle.synchronize().unwrap();
        let out: f32 = bytemuck::pod_read_unaligned(&ob.to_bytes().unwrap());
        (status, out)
    }

    #[test]
    fn small_dot() {
        let handle = Handle::new(DeviceCapability::new(2, 4)).unwrap();
        let (status, out) = launch_f32(&handle, &[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_eq!(status, Status::Success);
        assert_eq!(out, 32.0);
    }

    #[test]
    fn chunking_covers_every_element() {
        let handle = Handle::new(DeviceCapability::new(3, 7)).unwrap();
        let x: Vec<f32> = (0..1000).map(|i| (i % 5) as f32).collect();
        let y = vec![1.0f32; 1000];
        let (_, out) = launch_f32(&handle, &x, &y);
        assert_eq!(out, x.iter().sum::<f32>());
    }

    #[test]
    fn integer_dtype_not_supported() {
        let handle = Handle::new(DeviceCapability::default()).unwrap();
        let config = LaunchConfig {
            grid: (1, 1, 1),
            kind: KernelKind::Union1,
        };
        let status = HostDotKernel.launch(&config, handle.queue(), DType::I32, 8, 8, 8, 1);
        assert_eq!(status, Status::NotSupported);
    }

    #[test]
    fn f64_accumulates_wide() {
        let x = [1e8f64, 1.0, -1e8];
        let y = [1.0f64; 3];
        assert_eq!(dot_chunked(&x, &y, 1, true), 1.0);
        assert_eq!(dot_chunked(&x, &y, 1, false), 0.0);
    }
}

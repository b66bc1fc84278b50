//! Host-memory backed device allocator

use crate::error::{Error, Result};
use crate::runtime::{DeviceMemory, NULL_PTR};
use std::alloc::{Layout as AllocLayout, alloc_zeroed, dealloc};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Alignment of every host allocation (AVX-512 width)
const ALIGN: usize = 64;

/// Allocator handing out host memory as device pointers.
///
/// Pointers are real host addresses, so kernels running on the queue worker
/// read and write them directly.
#[derive(Debug, Default)]
pub struct HostMemory {
    allocated: AtomicUsize,
}

impl HostMemory {
    /// Create an allocator with no outstanding allocations
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceMemory for HostMemory {
    fn allocate(&self, size_bytes: usize) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(NULL_PTR);
        }
        let layout = AllocLayout::from_size_align(size_bytes, ALIGN)
            .map_err(|_| Error::OutOfMemory { size: size_bytes })?;
        // SAFETY: layout has non-zero size.
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            return Err(Error::OutOfMemory { size: size_bytes });
        }
        self.allocated.fetch_add(size_bytes, Ordering::Relaxed);
        Ok(ptr as u64)
    }

    fn deallocate(&self, ptr: u64, size_bytes: usize) {
        if ptr == NULL_PTR || size_bytes == 0 {
            return;
        }
        let Ok(layout) = AllocLayout::from_size_align(size_bytes, ALIGN) else {
            return;
        };
        // SAFETY: ptr was returned by `allocate` with this size and alignment.
        unsafe { dealloc(ptr as *mut u8, layout) };
        self.allocated.fetch_sub(size_bytes, Ordering::Relaxed);
    }

    fn copy_to_device(&self, src: &[u8], dst: u64) -> Result<()> {
        if src.is_empty() {
            return Ok(());
        }
        if dst == NULL_PTR {
            return Err(Error::null("dst"));
        }
        // SAFETY: caller guarantees dst points to at least src.len() bytes.
        unsafe { std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut u8, src.len()) };
        Ok(())
    }

    fn copy_from_device(&self, src: u64, dst: &mut [u8]) -> Result<()> {
        if dst.is_empty() {
            return Ok(());
        }
        if src == NULL_PTR {
            return Err(Error::null("src"));
        }
        // SAFETY: caller guarantees src points to at least dst.len() bytes.
        unsafe { std::ptr::copy_nonoverlapping(src as *const u8, dst.as_mut_ptr(), dst.len()) };
        Ok(())
    }

    fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }
}

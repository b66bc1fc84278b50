//! Device memory management traits

use crate::error::Result;

/// Device memory allocator and copy engine.
///
/// Device memory is addressed by `u64` pointers. A zero-sized allocation
/// returns the null pointer (`0`) and deallocating it is a no-op.
pub trait DeviceMemory: Send + Sync {
    /// Allocate `size_bytes` of zero-initialized device memory
    fn allocate(&self, size_bytes: usize) -> Result<u64>;

    /// Free memory returned by [`DeviceMemory::allocate`] with the same size
    fn deallocate(&self, ptr: u64, size_bytes: usize);

    /// Copy host bytes into device memory at `dst`
    fn copy_to_device(&self, src: &[u8], dst: u64) -> Result<()>;

    /// Copy device memory at `src` into host bytes
    fn copy_from_device(&self, src: u64, dst: &mut [u8]) -> Result<()>;

    /// Bytes currently allocated through this allocator
    fn allocated_bytes(&self) -> usize {
        0
    }
}

/// RAII device allocation. Freed when dropped.
pub struct DeviceBuffer<'m, M: DeviceMemory + ?Sized> {
    memory: &'m M,
    ptr: u64,
    size_bytes: usize,
}

impl<'m, M: DeviceMemory + ?Sized> DeviceBuffer<'m, M> {
    /// Allocate a zeroed buffer of `size_bytes`
    pub fn zeroed(memory: &'m M, size_bytes: usize) -> Result<Self> {
        let ptr = memory.allocate(size_bytes)?;
        Ok(Self {
            memory,
            ptr,
            size_bytes,
        })
    }

    /// Allocate a buffer and fill it with `bytes`
    pub fn from_bytes(memory: &'m M, bytes: &[u8]) -> Result<Self> {
        let buffer = Self::zeroed(memory, bytes.len())?;
        if !bytes.is_empty() {
            memory.copy_to_device(bytes, buffer.ptr)?;
        }
        Ok(buffer)
    }

    /// Device pointer (null for an empty buffer)
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.ptr
    }

    /// Size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Copy the buffer contents back to the host
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; self.size_bytes];
        if self.size_bytes > 0 {
            self.memory.copy_from_device(self.ptr, &mut bytes)?;
        }
        Ok(bytes)
    }
}

impl<M: DeviceMemory + ?Sized> Drop for DeviceBuffer<'_, M> {
    fn drop(&mut self) {
        self.memory.deallocate(self.ptr, self.size_bytes);
    }
}

impl<M: DeviceMemory + ?Sized> std::fmt::Debug for DeviceBuffer<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("ptr", &format_args!("{:#x}", self.ptr))
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}

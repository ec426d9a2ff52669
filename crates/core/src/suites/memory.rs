//! `OfxMemorySuite` v1.

use std::ptr::NonNull;

use ofxkit_ffi::OfxMemorySuiteV1;

use super::InstanceHandle;
use crate::registry::{invoke, log_failure};
use crate::StatusCode;

/// Allocates from the host's memory pool.
#[derive(Debug, Clone, Copy)]
pub struct MemorySuite<'h> {
    table: &'h OfxMemorySuiteV1,
}

impl<'h> MemorySuite<'h> {
    pub(crate) fn new(table: &'h OfxMemorySuiteV1) -> Self {
        Self { table }
    }

    pub(crate) fn raw(&self) -> &'h OfxMemorySuiteV1 {
        self.table
    }

    /// Allocate `len` bytes, optionally charged to an effect instance.
    ///
    /// The block is returned to the host when the [`HostAllocation`] drops.
    /// Both entries must be present, so a block is never handed out that
    /// could not be freed.
    pub fn alloc(
        &self,
        instance: InstanceHandle,
        len: usize,
    ) -> Result<HostAllocation<'h>, StatusCode> {
        let alloc = entry!(self.table, memoryAlloc);
        let _ = entry!(self.table, memoryFree);
        // SAFETY: memoryAlloc writes the block pointer on success.
        let data = unsafe { invoke(|out| alloc(instance.as_raw(), len, out)) }?;
        let Some(ptr) = NonNull::new(data.cast::<u8>()) else {
            tracing::warn!(len, "Host reported a successful allocation but returned null");
            return Err(StatusCode::OutOfMemory);
        };
        tracing::trace!(len, ptr = ?ptr, "Allocated host memory");
        Ok(HostAllocation {
            ptr,
            len,
            suite: *self,
        })
    }
}

/// A block of host memory, freed through the memory suite on drop.
#[derive(Debug)]
pub struct HostAllocation<'h> {
    ptr: NonNull<u8>,
    len: usize,
    suite: MemorySuite<'h>,
}

impl HostAllocation<'_> {
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Zero the block and view it as bytes.
    pub fn zeroed(&mut self) -> &mut [u8] {
        // SAFETY: the host gave us `len` writable bytes at `ptr`, owned by this value.
        unsafe {
            std::ptr::write_bytes(self.ptr.as_ptr(), 0, self.len);
            std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len)
        }
    }
}

impl Drop for HostAllocation<'_> {
    fn drop(&mut self) {
        let Some(free) = self.suite.table.memoryFree else {
            return;
        };
        // SAFETY: the block came from this suite's memoryAlloc and is freed once.
        let raw = unsafe { free(self.ptr.as_ptr().cast()) };
        let status = StatusCode::from_raw(raw);
        if !status.is_success() {
            log_failure(raw, status);
        }
    }
}

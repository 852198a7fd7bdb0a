pub mod cpu;

use crate::{
    dtype::DType,
    error::{Error, Result},
    scalar::Scalar,
};
use cpu::CpuBuffer;
use std::{ffi::c_void, sync::Arc};

pub struct BufferManager {}

impl BufferManager {
    pub fn create(size: usize, dtype: DType) -> Result<Arc<dyn Buffer>> {
        let buffer: Arc<dyn Buffer> = Arc::new(CpuBuffer::new(size, dtype)?);

        Ok(buffer)
    }
}

pub trait Buffer: Send + Sync {
    fn as_ptr(&self) -> *const c_void;
    fn as_mut_ptr(&mut self) -> *mut c_void;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn dtype(&self) -> DType;

    /// # Safety
    /// Requires both buffers to have the same size and dtype, and no memory overlap
    unsafe fn copy_from(&mut self, other: &dyn Buffer) -> Result<()>;

    /// # Safety
    /// Requires valid source pointer and matching size_in_bytes with no memory overlap
    unsafe fn copy_from_host(&mut self, src: *const c_void, size_in_bytes: usize) -> Result<()>;

    /// # Safety
    /// Requires valid destination pointer of at least size_in_bytes with no memory overlap
    unsafe fn copy_to_host(&self, dest: *mut c_void, size_in_bytes: usize) -> Result<()>;

    /// Read a scalar value at the specified element index
    fn read_scalar(&self, index: usize) -> Result<Scalar> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds { index, size: self.len() });
        }

        let offset = index * self.dtype().size_in_bytes();
        unsafe {
            let ptr = (self.as_ptr() as *const u8).add(offset);
            Ok(self.dtype().read_scalar(ptr))
        }
    }

    /// Write a scalar value at the specified element index, converting it to the buffer dtype
    fn write_scalar(&mut self, index: usize, value: Scalar) -> Result<()> {
        if index >= self.len() {
            return Err(Error::IndexOutOfBounds { index, size: self.len() });
        }

        let offset = index * self.dtype().size_in_bytes();
        unsafe {
            let ptr = (self.as_mut_ptr() as *mut u8).add(offset);
            self.dtype().write_scalar(ptr, value);
        }
        Ok(())
    }
}

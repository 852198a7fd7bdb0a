use crate::{
    buffer::Buffer,
    dtype::DType,
    error::{Error, Result},
};
use std::{ffi::c_void, ptr};

/// Host storage. Backed by `u64` words so every dtype the kernels cast to is aligned.
pub struct CpuBuffer {
    data: Vec<u64>,
    len: usize,
    dtype: DType,
}

unsafe impl Send for CpuBuffer {}
unsafe impl Sync for CpuBuffer {}

impl CpuBuffer {
    pub fn new(size: usize, dtype: DType) -> Result<Self> {
        let total_size = size.checked_mul(dtype.size_in_bytes()).ok_or(Error::OutOfMemory)?;
        Ok(Self {
            data: vec![0; total_size.div_ceil(8)],
            len: size,
            dtype,
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.len * self.dtype.size_in_bytes()
    }
}

impl Buffer for CpuBuffer {
    fn as_ptr(&self) -> *const c_void {
        self.data.as_ptr() as *const _
    }

    fn as_mut_ptr(&mut self) -> *mut c_void {
        self.data.as_mut_ptr() as *mut _
    }

    fn len(&self) -> usize {
        self.len
    }

    fn dtype(&self) -> DType {
        self.dtype
    }

    unsafe fn copy_from(&mut self, other: &dyn Buffer) -> Result<()> {
        if self.len() != other.len() {
            return Err(Error::InvalidArgument("Buffer size mismatch".into()));
        }
        if self.dtype() != other.dtype() {
            return Err(Error::DTypeMismatch {
                expected: self.dtype(),
                got: other.dtype(),
            });
        }
        ptr::copy_nonoverlapping(other.as_ptr() as *const u8, self.data.as_mut_ptr() as *mut u8, self.size_in_bytes());
        Ok(())
    }

    unsafe fn copy_from_host(&mut self, src: *const c_void, size_in_bytes: usize) -> Result<()> {
        if size_in_bytes != self.size_in_bytes() {
            return Err(Error::InvalidArgument("Size mismatch in copy_from_host".into()));
        }
        ptr::copy_nonoverlapping(src as *const u8, self.data.as_mut_ptr() as *mut u8, size_in_bytes);
        Ok(())
    }

    unsafe fn copy_to_host(&self, dest: *mut c_void, size_in_bytes: usize) -> Result<()> {
        if size_in_bytes > self.size_in_bytes() {
            return Err(Error::InvalidArgument(format!(
                "Size mismatch in copy_to_host: requested {}, available {}",
                size_in_bytes,
                self.size_in_bytes()
            )));
        }
        ptr::copy_nonoverlapping(self.data.as_ptr() as *const u8, dest as *mut u8, size_in_bytes);
        Ok(())
    }
}

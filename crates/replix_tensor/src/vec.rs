use crate::{adapter::TensorElement, Tensor};
use replix_core::error::Result;
use std::ffi::c_void;

impl Tensor {
    /// Copies the elements out in logical (row-major) order, converting to `T` if needed.
    pub fn to_flatten_vec<T: TensorElement>(&self) -> Result<Vec<T>> {
        let tensor = if self.dtype() != T::DTYPE {
            self.to_dtype(T::DTYPE)?
        } else {
            self.contiguous()?
        };

        let size = tensor.size();
        let mut result = vec![T::default(); size];
        unsafe {
            tensor
                .buffer()
                .copy_to_host(result.as_mut_ptr() as *mut c_void, size * T::DTYPE.size_in_bytes())?;
        }

        Ok(result)
    }
}

use crate::{adapter::TensorAdapter, Tensor, TensorData, TensorMetadata};
use replix_core::{
    buffer::{Buffer, BufferManager},
    dtype::DType,
    error::{Error, Result},
    layout::Layout,
    scalar::Scalar,
};
use std::{ffi::c_void, sync::Arc};

impl Tensor {
    fn from_host_bytes(shape: &[usize], dtype: DType, bytes: &[u8]) -> Result<Self> {
        let layout = Layout::from_shape(shape);
        let size = layout.size();
        let size_in_bytes = size * dtype.size_in_bytes();
        if bytes.len() != size_in_bytes {
            return Err(Error::ShapeMismatch {
                expected: size_in_bytes,
                got: bytes.len(),
                msg: "host data does not match the tensor shape".into(),
            });
        }

        let mut buffer = BufferManager::create(size, dtype)?;
        unsafe {
            let buffer_mut = Arc::get_mut(&mut buffer).ok_or(Error::BufferShared)?;
            buffer_mut.copy_from_host(bytes.as_ptr() as *const c_void, size_in_bytes)?;
        }

        Ok(Self::from_parts(buffer, dtype, layout))
    }

    pub(crate) fn from_parts(buffer: Arc<dyn Buffer>, dtype: DType, layout: Layout) -> Self {
        Self {
            data: TensorData { buffer, grad: None },
            metadata: TensorMetadata {
                dtype,
                layout,
                requires_grad: false,
            },
            node: None,
        }
    }

    /// Builds a tensor from host data, keeping the data's own element type.
    pub fn new<T>(data: T) -> Result<Self>
    where
        T: TensorAdapter,
    {
        let dtype = data.dtype();

        Self::new_with_spec(data, dtype)
    }

    pub fn new_with_spec<T>(data: T, dtype: DType) -> Result<Self>
    where
        T: TensorAdapter,
    {
        let shape = data.get_shape();
        let src_dtype = data.dtype();
        let src_data = data.to_flatten_vec()?;
        let size = Layout::compute_size(&shape);
        if src_data.len() != size {
            return Err(Error::ShapeMismatch {
                expected: size,
                got: src_data.len(),
                msg: "element count does not match the nested shape".into(),
            });
        }

        let src_elem_size = src_dtype.size_in_bytes();
        let elem_size = dtype.size_in_bytes();
        let mut converted_data = vec![0u8; size * elem_size];
        let src_ptr = src_data.as_ptr() as *const u8;

        for i in 0..size {
            unsafe {
                let scalar = src_dtype.read_scalar(src_ptr.add(i * src_elem_size));
                dtype.write_scalar(converted_data.as_mut_ptr().add(i * elem_size), scalar);
            }
        }

        Self::from_host_bytes(&shape, dtype, &converted_data)
    }

    /// A tensor aliasing `target`'s storage, without gradient tracking.
    pub fn share_data(target: &Tensor) -> Self {
        Self::from_parts(Arc::clone(&target.data.buffer), target.dtype(), target.layout().clone())
    }

    pub fn empty(shape: &[usize]) -> Result<Self> {
        Self::empty_with_spec(shape, DType::default())
    }

    pub fn empty_like(src: &Tensor) -> Result<Self> {
        Self::empty_with_spec(src.shape(), src.dtype())
    }

    pub fn empty_with_spec(shape: &[usize], dtype: DType) -> Result<Self> {
        let layout = Layout::from_shape(shape);
        let buffer = BufferManager::create(layout.size(), dtype)?;

        Ok(Self::from_parts(buffer, dtype, layout))
    }

    pub fn zeros(shape: &[usize]) -> Result<Self> {
        Self::zeros_with_spec(shape, DType::default())
    }

    pub fn zeros_with_spec(shape: &[usize], dtype: DType) -> Result<Self> {
        // CpuBuffer storage starts zeroed
        Self::empty_with_spec(shape, dtype)
    }

    pub fn zeros_like(src: &Tensor) -> Result<Self> {
        Self::zeros_with_spec(src.shape(), src.dtype())
    }

    pub fn ones_like(src: &Tensor) -> Result<Self> {
        Self::fill_with_spec(src.shape(), Scalar::new(1i32), src.dtype())
    }

    pub fn fill_with_spec<T: Into<Scalar>>(shape: &[usize], value: T, dtype: DType) -> Result<Self> {
        let value = value.into();
        let elem_size = dtype.size_in_bytes();
        let mut elem_bytes = vec![0u8; elem_size];
        unsafe { dtype.write_scalar(elem_bytes.as_mut_ptr(), value) };

        let size = Layout::compute_size(shape);
        let mut host_buf = Vec::with_capacity(size * elem_size);
        for _ in 0..size {
            host_buf.extend_from_slice(&elem_bytes);
        }

        Self::from_host_bytes(shape, dtype, &host_buf)
    }

    pub fn full_like<T: Into<Scalar>>(src: &Tensor, value: T) -> Result<Self> {
        Self::fill_with_spec(src.shape(), value, src.dtype())
    }
}

pub mod adapter;
mod creation;
pub mod native;
pub mod ops;
pub mod utils;
mod vec;

use replix_core::{
    buffer::{Buffer, BufferManager},
    dtype::DType,
    error::{Error, Result},
    layout::Layout,
    scalar::Scalar,
};
use std::sync::{Arc, Mutex};

pub use ops::repeat::{ensure_repeats, repeat_interleave, repeat_interleave_index};

type BackwardFn = Box<dyn Fn(&[Tensor], &Tensor) -> Result<Vec<Tensor>> + Send + Sync>;

#[derive(Clone)]
pub struct TensorData {
    buffer: Arc<dyn Buffer>,
    grad: Option<Arc<Mutex<Tensor>>>,
}

#[derive(Clone)]
pub struct TensorMetadata {
    dtype: DType,
    layout: Layout,
    requires_grad: bool,
}

#[derive(Clone)]
pub struct TensorNode {
    op_name: String,
    inputs: Vec<Tensor>,
    backward_fn: Option<Arc<BackwardFn>>,
}

#[derive(Clone)]
pub struct Tensor {
    data: TensorData,
    metadata: TensorMetadata,
    node: Option<TensorNode>,
}

impl TensorNode {
    pub fn new(op_name: String, inputs: Vec<Tensor>, backward_fn: Option<BackwardFn>) -> Self {
        Self {
            op_name,
            inputs,
            backward_fn: backward_fn.map(Arc::new),
        }
    }

    pub fn op_name(&self) -> &str {
        &self.op_name
    }

    pub fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    pub fn backward(&self, grad_output: &Tensor) -> Result<()> {
        if let Some(ref func) = self.backward_fn {
            let grads_for_inputs = (func)(&self.inputs, grad_output)?;
            for (input, grad_in) in self.inputs.iter().zip(grads_for_inputs.iter()) {
                if input.requires_grad() {
                    input.accumulate_grad(grad_in)?;
                    input._backward(grad_in)?;
                }
            }
        }
        Ok(())
    }
}

impl Tensor {
    // data

    pub fn buffer(&self) -> &dyn Buffer {
        Arc::as_ref(&self.data.buffer)
    }

    fn buffer_clone(&self) -> Result<Arc<dyn Buffer>> {
        let src_buffer = self.buffer();
        let mut new_buffer = BufferManager::create(src_buffer.len(), src_buffer.dtype())?;

        {
            let buffer = Arc::get_mut(&mut new_buffer).ok_or(Error::BufferShared)?;
            unsafe { buffer.copy_from(src_buffer)? };
        }

        Ok(new_buffer)
    }

    /// Runs `func` on a uniquely owned buffer, copying the storage first if it is shared.
    pub fn with_buffer_mut<F, R>(&mut self, func: F) -> Result<R>
    where
        F: FnOnce(&mut dyn Buffer) -> Result<R>,
    {
        if Arc::strong_count(&self.data.buffer) == 1 {
            let buffer = Arc::get_mut(&mut self.data.buffer).ok_or(Error::BufferShared)?;
            func(buffer)
        } else {
            let mut new_buffer = self.buffer_clone()?;
            let buffer = Arc::get_mut(&mut new_buffer).ok_or(Error::BufferShared)?;
            let result = func(buffer)?;
            self.data.buffer = new_buffer;
            Ok(result)
        }
    }

    /// Like [`Tensor::with_buffer_mut`], for writers that overwrite every element of the view.
    /// Shared storage is replaced by a fresh buffer instead of a copy, so other handles keep
    /// the old contents.
    pub fn with_buffer_overwrite<F, R>(&mut self, func: F) -> Result<R>
    where
        F: FnOnce(&mut dyn Buffer) -> Result<R>,
    {
        if Arc::strong_count(&self.data.buffer) == 1 {
            return self.with_buffer_mut(func);
        }

        let src_buffer = self.buffer();
        let mut new_buffer = BufferManager::create(src_buffer.len(), src_buffer.dtype())?;
        let buffer = Arc::get_mut(&mut new_buffer).ok_or(Error::BufferShared)?;
        let result = func(buffer)?;
        self.data.buffer = new_buffer;
        Ok(result)
    }

    pub fn layout(&self) -> &Layout {
        &self.metadata.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.metadata.layout
    }

    pub fn shape(&self) -> &[usize] {
        self.metadata.layout.shape()
    }

    pub fn strides(&self) -> &[usize] {
        self.metadata.layout.strides()
    }

    pub fn offset(&self) -> usize {
        self.metadata.layout.offset()
    }

    pub fn size(&self) -> usize {
        self.metadata.layout.size()
    }

    pub fn ndim(&self) -> usize {
        self.metadata.layout.ndim()
    }

    pub fn dim_size(&self, dim: usize) -> Option<usize> {
        self.metadata.layout.dim_size(dim)
    }

    /// Contiguous and starting at the beginning of its buffer.
    pub fn is_contiguous(&self) -> bool {
        self.metadata.layout.is_contiguous() && self.offset() == 0
    }

    // data - grad

    pub fn with_grad(&mut self) -> Result<()> {
        if !self.dtype().is_float() {
            return Err(Error::UnsupportedDType);
        }

        let grad = Tensor::zeros_like(self)?;
        self.data.grad = Some(Arc::new(Mutex::new(grad)));
        self.metadata.requires_grad = true;

        Ok(())
    }

    pub fn grad(&self) -> Result<Option<Tensor>> {
        Ok(match &self.data.grad {
            Some(g) => Some((*g.lock().map_err(|_| Error::GradLocked)?).clone()),
            None => None,
        })
    }

    pub fn accumulate_grad(&self, grad_in: &Tensor) -> Result<()> {
        if let Some(grad_mutex) = &self.data.grad {
            let mut guard = grad_mutex.lock().map_err(|_| Error::GradLocked)?;
            ops::indexing::add_assign(&mut guard, grad_in)?;
        }
        Ok(())
    }

    pub fn zero_grad(&self) -> Result<()> {
        if let Some(grad_mutex) = &self.data.grad {
            let mut guard = grad_mutex.lock().map_err(|_| Error::GradLocked)?;
            let zero_tensor = Tensor::zeros_like(&guard)?;
            *guard = zero_tensor;
        }

        if let Some(node) = &self.node {
            for input in node.inputs() {
                if input.requires_grad() {
                    input.zero_grad()?;
                }
            }
        }

        Ok(())
    }

    /// Drops gradient tracking: no grad slot, no recorded node.
    pub fn detach_(&mut self) {
        self.data.grad = None;
        self.metadata.requires_grad = false;
        self.node = None;
    }

    // node

    pub fn node(&self) -> Option<&TensorNode> {
        self.node.as_ref()
    }

    pub fn set_node(&mut self, node: TensorNode) {
        self.node = Some(node);
    }

    pub fn backward(&self) -> Result<()> {
        if self.requires_grad() {
            let grad_out = Self::ones_like(self)?;
            self._backward(&grad_out)?;
        }

        Ok(())
    }

    fn _backward(&self, grad_out: &Tensor) -> Result<()> {
        if let Some(ref node) = self.node {
            node.backward(grad_out)?;
        }

        Ok(())
    }

    // utils

    pub fn get(&self, indices: &[usize]) -> Result<Scalar> {
        utils::indexing::get_index(self, indices)
    }

    pub fn item(&self) -> Result<Scalar> {
        if self.size() != 1 {
            return Err(Error::InvalidArgument(format!(
                "item() can only be called on a tensor with a single element, but got tensor with {} elements",
                self.size()
            )));
        }

        let indices = vec![0; self.ndim()];
        utils::indexing::get_index(self, &indices)
    }

    // etc

    pub fn dtype(&self) -> DType {
        self.metadata.dtype
    }

    pub fn requires_grad(&self) -> bool {
        self.metadata.requires_grad
    }
}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .field("offset", &self.offset())
            .field("dtype", &self.dtype())
            .field("requires_grad", &self.requires_grad())
            .finish()
    }
}

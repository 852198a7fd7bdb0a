use crate::{
    utils::indexing::{normalize_dim, normalize_index},
    Tensor, TensorNode,
};
use replix_core::{
    be,
    dtype::DType,
    error::{Error, Result},
    scalar::Scalar,
};

/// Validates a 1-D integer index against a dimension of `size` elements and returns it as a
/// contiguous `I64` tensor with negative entries resolved.
fn prepare_indices(index: &Tensor, size: usize) -> Result<Tensor> {
    if index.ndim() != 1 {
        return Err(Error::InvalidShape {
            message: format!("index must be 1-D, got shape {:?}", index.shape()),
        });
    }
    if !index.dtype().is_int() {
        return Err(Error::DTypeMismatch {
            expected: DType::I64,
            got: index.dtype(),
        });
    }

    let resolved = index
        .to_flatten_vec::<i64>()?
        .into_iter()
        .map(|i| normalize_index(i, size).map(|i| i as i64))
        .collect::<Result<Vec<i64>>>()?;

    Tensor::new(resolved)
}

fn selected_shape(shape: &[usize], dim: usize, num_indices: usize) -> Vec<usize> {
    let mut shape = shape.to_vec();
    shape[dim] = num_indices;
    shape
}

impl Tensor {
    /// Gathers slices of `dim` in the order given by `index`. Negative indices count from the end.
    pub fn index_select(&self, dim: impl Into<Scalar>, index: &Tensor) -> Result<Self> {
        let dim = normalize_dim(dim, self.ndim())?;
        let indices = prepare_indices(index, self.shape()[dim])?;

        let out_shape = selected_shape(self.shape(), dim, indices.size());
        let mut result = Self::empty_with_spec(&out_shape, self.dtype())?;
        self.index_select_into(dim, &indices, &mut result)?;

        if self.requires_grad() {
            result.with_grad()?;

            let backward_fn = Box::new(move |inputs: &[Tensor], grad_out: &Tensor| -> Result<Vec<Tensor>> {
                let mut grad_input = Tensor::zeros_like(&inputs[0])?;
                grad_input.index_add_(dim, &indices, grad_out)?;
                Ok(vec![grad_input])
            });

            let node = TensorNode::new("index_select".to_string(), vec![self.clone()], Some(backward_fn));
            result.node = Some(node);
        }

        Ok(result)
    }

    /// Like [`Tensor::index_select`], writing into `out`. `out` must already have the result
    /// shape and dtype, be contiguous, and comes back detached from autograd.
    pub fn index_select_out(&self, dim: impl Into<Scalar>, index: &Tensor, out: &mut Tensor) -> Result<()> {
        let dim = normalize_dim(dim, self.ndim())?;
        let indices = prepare_indices(index, self.shape()[dim])?;

        let expected = selected_shape(self.shape(), dim, indices.size());
        if out.shape() != expected.as_slice() {
            return Err(Error::DimensionMismatch {
                expected,
                got: out.shape().to_vec(),
            });
        }
        if out.dtype() != self.dtype() {
            return Err(Error::DTypeMismatch {
                expected: self.dtype(),
                got: out.dtype(),
            });
        }
        if !out.is_contiguous() {
            return Err(Error::InvalidArgument("output tensor must be contiguous".into()));
        }

        self.index_select_into(dim, &indices, out)?;
        out.detach_();

        Ok(())
    }

    fn index_select_into(&self, dim: usize, indices: &Tensor, out: &mut Tensor) -> Result<()> {
        let num_els_out = out.size();
        let num_dims = self.ndim();
        let mut metadata = self.layout().to_metadata();
        metadata.push(dim);
        metadata.push(indices.size());

        unsafe {
            out.with_buffer_overwrite(|out_buf| be::ops::indexing::index_select(out_buf, self.buffer(), indices.buffer(), num_els_out, num_dims, &metadata))
        }
    }

    /// Adds the slices of `src` into the slices of `dim` named by `index`, accumulating repeats.
    /// In place and not tracked by autograd.
    pub fn index_add_(&mut self, dim: impl Into<Scalar>, index: &Tensor, src: &Tensor) -> Result<()> {
        if !self.is_contiguous() {
            return Err(Error::InvalidArgument("index_add_ target must be contiguous".into()));
        }
        if src.dtype() != self.dtype() {
            return Err(Error::DTypeMismatch {
                expected: self.dtype(),
                got: src.dtype(),
            });
        }

        let dim = normalize_dim(dim, self.ndim())?;
        let indices = prepare_indices(index, self.shape()[dim])?;

        let expected = selected_shape(self.shape(), dim, indices.size());
        if src.shape() != expected.as_slice() {
            return Err(Error::DimensionMismatch {
                expected,
                got: src.shape().to_vec(),
            });
        }

        let src = src.contiguous()?;
        let num_els_src = src.size();
        let num_dims = self.ndim();
        let mut metadata = self.shape().to_vec();
        metadata.push(dim);
        metadata.push(indices.size());

        unsafe {
            self.with_buffer_mut(|out_buf| be::ops::indexing::index_add(out_buf, src.buffer(), indices.buffer(), num_els_src, num_dims, &metadata))
        }
    }
}

/// `target += grad` for a contiguous gradient slot of the same shape.
pub(crate) fn add_assign(target: &mut Tensor, grad: &Tensor) -> Result<()> {
    if target.shape() != grad.shape() {
        return Err(Error::DimensionMismatch {
            expected: target.shape().to_vec(),
            got: grad.shape().to_vec(),
        });
    }

    let shape = target.shape().to_vec();
    let n = target.size();
    let identity = Tensor::new((0..n as i64).collect::<Vec<i64>>())?;
    let src = grad.reshape(&[n])?;

    target.layout_mut().view(&[n])?;
    let result = target.index_add_(0, &identity, &src);
    target.layout_mut().view(&shape)?;

    result
}

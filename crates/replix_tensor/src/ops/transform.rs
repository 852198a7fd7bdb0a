use crate::{utils::indexing::normalize_dim, Tensor, TensorNode};
use replix_core::{
    be,
    dtype::DType,
    error::{Error, Result},
    layout::Layout,
    scalar::Scalar,
};

impl Tensor {
    /// Returns a tensor laid out contiguously from offset zero. Already compact tensors are
    /// returned as-is, sharing storage.
    pub fn contiguous(&self) -> Result<Self> {
        if self.is_contiguous() {
            return Ok(self.clone());
        }

        let mut result = Self::empty_with_spec(self.shape(), self.dtype())?;
        let num_els = self.size();
        let num_dims = self.ndim();
        let metadata = self.layout().to_metadata();

        unsafe {
            result.with_buffer_mut(|out_buf| be::ops::copy::contiguous(out_buf, self.buffer(), num_els, num_dims, &metadata))?;
        }

        if self.requires_grad() {
            result.with_grad()?;

            let backward_fn = Box::new(move |_inputs: &[Tensor], grad_out: &Tensor| -> Result<Vec<Tensor>> { Ok(vec![grad_out.clone()]) });

            let node = TensorNode::new("contiguous".to_string(), vec![self.clone()], Some(backward_fn));
            result.node = Some(node);
        }

        Ok(result)
    }

    /// Element-wise conversion into a new contiguous tensor. Not tracked by autograd.
    pub fn to_dtype(&self, dtype: DType) -> Result<Self> {
        let src = self.contiguous()?;
        let mut result = Self::empty_with_spec(self.shape(), dtype)?;
        let size = self.size();

        result.with_buffer_mut(|out_buf| {
            for i in 0..size {
                out_buf.write_scalar(i, src.buffer().read_scalar(i)?)?;
            }
            Ok(())
        })?;

        Ok(result)
    }

    pub fn with_dtype(&mut self, dtype: DType) -> Result<()> {
        if self.dtype() != dtype {
            *self = self.to_dtype(dtype)?;
        }
        Ok(())
    }

    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        let new_size = Layout::compute_size(shape);
        if new_size != self.size() {
            return Err(Error::IncompatibleShape(format!(
                "Cannot reshape tensor of shape {:?} to {:?}",
                self.shape(),
                shape
            )));
        }

        let mut result = if self.is_contiguous() {
            Self::share_data(self)
        } else {
            let mut compact = self.contiguous()?;
            compact.detach_();
            compact
        };
        result.layout_mut().view(shape)?;

        if self.requires_grad() {
            result.with_grad()?;

            let orig_shape = self.shape().to_vec();
            let backward_fn = Box::new(move |_inputs: &[Tensor], grad_out: &Tensor| -> Result<Vec<Tensor>> { Ok(vec![grad_out.reshape(&orig_shape)?]) });

            let node = TensorNode::new("reshape".to_string(), vec![self.clone()], Some(backward_fn));
            result.node = Some(node);
        }

        Ok(result)
    }

    /// Collapses every dimension into one.
    pub fn flatten(&self) -> Result<Self> {
        self.reshape(&[self.size()])
    }

    /// A view with `dim` removed and fixed at `index`. Negative values count from the end.
    /// The view aliases this tensor's storage and does not track gradients.
    pub fn select(&self, dim: impl Into<Scalar>, index: impl Into<Scalar>) -> Result<Self> {
        let dim = normalize_dim(dim, self.ndim())?;
        let size = self.shape()[dim];
        let index = crate::utils::indexing::normalize_index(index.into().to_i64(), size)?;

        let mut result = Self::share_data(self);
        *result.layout_mut() = self.layout().select(dim, index)?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_column_is_a_strided_view() -> Result<()> {
        let table = Tensor::new(vec![vec![0i64, 2], vec![5, 1], vec![9, 3]])?;
        let column = table.select(1, -1)?;

        assert_eq!(column.shape(), &[3]);
        assert_eq!(column.strides(), &[2]);
        assert_eq!(column.offset(), 1);
        assert_eq!(column.to_flatten_vec::<i64>()?, vec![2, 1, 3]);
        Ok(())
    }

    #[test]
    fn reshape_copies_strided_input() -> Result<()> {
        let table = Tensor::new(vec![vec![1.0f32, 2.0, 3.0], vec![4.0, 5.0, 6.0]])?;
        let column = table.select(1, 0)?;
        let reshaped = column.reshape(&[2, 1])?;

        assert!(reshaped.is_contiguous());
        assert_eq!(reshaped.to_flatten_vec::<f32>()?, vec![1.0, 4.0]);
        assert!(table.reshape(&[4]).is_err());
        Ok(())
    }

    #[test]
    fn to_dtype_converts_values() -> Result<()> {
        let x = Tensor::new(vec![1i32, 0, 7])?;
        let y = x.to_dtype(DType::F64)?;

        assert_eq!(y.dtype(), DType::F64);
        assert_eq!(y.to_flatten_vec::<f64>()?, vec![1.0, 0.0, 7.0]);
        assert_eq!(x.to_flatten_vec::<bool>()?, vec![true, false, true]);
        Ok(())
    }
}

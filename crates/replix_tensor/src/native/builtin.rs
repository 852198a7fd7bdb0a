use super::NativeExtension;
use crate::Tensor;
use replix_core::{
    be,
    dtype::DType,
    error::{Error, Result},
};

/// Fused repeat-interleave kernels from `replix_native`. Reads the repeats or scope table in
/// place and never builds an index tensor.
pub struct BuiltinExtension;

fn resolve_values(values: &Tensor, dim: Option<usize>) -> Result<(Tensor, usize)> {
    match dim {
        Some(dim) if dim >= values.ndim() => Err(Error::DimensionOutOfBounds {
            dim: dim as i32,
            ndim: values.ndim(),
        }),
        Some(dim) => Ok((values.clone(), dim)),
        None => Ok((values.flatten()?, 0)),
    }
}

fn launch(values: &Tensor, repeats_or_scope: &Tensor, dim: usize, out_dim_size: usize, out: &mut Tensor) -> Result<()> {
    let repeats = match repeats_or_scope.dtype() {
        DType::I64 => repeats_or_scope.clone(),
        dtype if dtype.is_int() => repeats_or_scope.to_dtype(DType::I64)?,
        dtype => {
            return Err(Error::DTypeMismatch {
                expected: DType::I64,
                got: dtype,
            })
        },
    };

    let num_els_out = out.size();
    let num_dims = values.ndim();
    let mut metadata = values.layout().to_metadata();
    metadata.push(dim);
    metadata.push(out_dim_size);
    metadata.push(repeats.ndim());
    metadata.extend_from_slice(repeats.shape());
    metadata.extend_from_slice(repeats.strides());
    metadata.push(repeats.offset());

    unsafe {
        out.with_buffer_overwrite(|out_buf| {
            be::ops::repeat::native_repeat_interleave(out_buf, values.buffer(), repeats.buffer(), num_els_out, num_dims, &metadata)
        })
    }
}

impl NativeExtension for BuiltinExtension {
    fn name(&self) -> &str {
        "replix-native"
    }

    fn repeat_interleave_out(&self, out: &mut Tensor, values: &Tensor, repeats_or_scope: &Tensor, dim: Option<usize>) -> Result<()> {
        let (values, dim) = resolve_values(values, dim)?;

        if out.ndim() != values.ndim() {
            return Err(Error::DimensionMismatch {
                expected: values.shape().to_vec(),
                got: out.shape().to_vec(),
            });
        }
        let mismatched = (0..values.ndim()).any(|d| d != dim && out.shape()[d] != values.shape()[d]);
        if mismatched {
            return Err(Error::DimensionMismatch {
                expected: values.shape().to_vec(),
                got: out.shape().to_vec(),
            });
        }
        if out.dtype() != values.dtype() {
            return Err(Error::DTypeMismatch {
                expected: values.dtype(),
                got: out.dtype(),
            });
        }
        if !out.is_contiguous() {
            return Err(Error::InvalidArgument("output tensor must be contiguous".into()));
        }

        let out_dim_size = out.shape()[dim];
        launch(&values, repeats_or_scope, dim, out_dim_size, out)
    }

    fn repeat_interleave_out_shape(&self, values: &Tensor, repeats_or_scope: &Tensor, out_length: usize, dim: Option<usize>) -> Result<Tensor> {
        let (values, dim) = resolve_values(values, dim)?;

        let mut shape = values.shape().to_vec();
        shape[dim] = out_length;
        let mut out = Tensor::empty_with_spec(&shape, values.dtype())?;

        launch(&values, repeats_or_scope, dim, out_length, &mut out)?;
        Ok(out)
    }
}

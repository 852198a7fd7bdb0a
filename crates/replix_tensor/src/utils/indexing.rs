use crate::Tensor;
use replix_core::{
    error::{Error, Result},
    scalar::Scalar,
};

/// Resolves a possibly negative dimension against `ndim`.
pub fn normalize_dim(dim: impl Into<Scalar>, ndim: usize) -> Result<usize> {
    let dim_i32 = dim.into().as_i32();
    let resolved = if dim_i32 < 0 { dim_i32 + ndim as i32 } else { dim_i32 };

    if resolved < 0 || resolved as usize >= ndim {
        return Err(Error::DimensionOutOfBounds { dim: dim_i32, ndim });
    }

    Ok(resolved as usize)
}

/// Resolves a possibly negative index against a dimension of `size` elements.
pub fn normalize_index(index: i64, size: usize) -> Result<usize> {
    let resolved = if index < 0 { index + size as i64 } else { index };

    if resolved < 0 || resolved as usize >= size {
        return Err(Error::IndexOutOfBounds {
            index: index.unsigned_abs() as usize,
            size,
        });
    }

    Ok(resolved as usize)
}

pub fn get_index(tensor: &Tensor, indices: &[usize]) -> Result<Scalar> {
    if indices.len() != tensor.ndim() {
        return Err(Error::InvalidArgument(format!(
            "Expected {} indices, got {}",
            tensor.ndim(),
            indices.len()
        )));
    }

    let mut buffer_index = tensor.offset();
    for (dim, (&idx, &stride)) in indices.iter().zip(tensor.strides()).enumerate() {
        let size = tensor.shape()[dim];
        if idx >= size {
            return Err(Error::IndexOutOfBounds { index: idx, size });
        }
        buffer_index += idx * stride;
    }

    tensor.buffer().read_scalar(buffer_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_dims_wrap() -> Result<()> {
        assert_eq!(normalize_dim(-1, 3)?, 2);
        assert_eq!(normalize_dim(0, 1)?, 0);
        assert!(matches!(normalize_dim(2, 2), Err(Error::DimensionOutOfBounds { dim: 2, ndim: 2 })));
        assert!(normalize_dim(-3, 2).is_err());
        assert!(normalize_dim(0, 0).is_err());
        Ok(())
    }

    #[test]
    fn negative_indices_wrap() -> Result<()> {
        assert_eq!(normalize_index(-1, 4)?, 3);
        assert!(matches!(normalize_index(4, 4), Err(Error::IndexOutOfBounds { index: 4, size: 4 })));
        Ok(())
    }
}

use half::{bf16, f16};
use replix_core::{
    dtype::DType,
    error::{Error, Result},
};

/// Host element types a tensor can be built from or read back into.
pub trait TensorElement: Copy + Default + 'static {
    const DTYPE: DType;
}

pub trait TensorAdapter: Sized {
    type Elem: TensorElement;

    fn to_flatten_vec(self) -> Result<Vec<Self::Elem>>;
    fn get_shape(&self) -> Vec<usize>;
    fn dtype(&self) -> DType {
        <Self::Elem as TensorElement>::DTYPE
    }
}

fn ragged(expected: usize, got: usize) -> Error {
    Error::InvalidShape {
        message: format!("Ragged nested data: expected rows of length {}, got {}", expected, got),
    }
}

macro_rules! impl_tensor_adapter {
    ($t:ty, $dtype:expr) => {
        impl TensorElement for $t {
            const DTYPE: DType = $dtype;
        }

        // Scalar (Item Tensor)
        impl TensorAdapter for $t {
            type Elem = $t;

            fn to_flatten_vec(self) -> Result<Vec<$t>> {
                Ok(vec![self])
            }
            fn get_shape(&self) -> Vec<usize> {
                vec![]
            }
        }

        // 1D Vector
        impl TensorAdapter for Vec<$t> {
            type Elem = $t;

            fn to_flatten_vec(self) -> Result<Vec<$t>> {
                Ok(self)
            }
            fn get_shape(&self) -> Vec<usize> {
                vec![self.len()]
            }
        }

        // 2D Vector
        impl TensorAdapter for Vec<Vec<$t>> {
            type Elem = $t;

            fn to_flatten_vec(self) -> Result<Vec<$t>> {
                let cols = self.first().map_or(0, |row| row.len());
                let mut flat = Vec::with_capacity(self.len() * cols);
                for row in self {
                    if row.len() != cols {
                        return Err(ragged(cols, row.len()));
                    }
                    flat.extend(row);
                }
                Ok(flat)
            }
            fn get_shape(&self) -> Vec<usize> {
                match self.first() {
                    Some(row) => vec![self.len(), row.len()],
                    None => vec![0, 0],
                }
            }
        }

        // 3D Vector
        impl TensorAdapter for Vec<Vec<Vec<$t>>> {
            type Elem = $t;

            fn to_flatten_vec(self) -> Result<Vec<$t>> {
                let shape = self.get_shape();
                let mut flat = Vec::with_capacity(shape.iter().product());
                for matrix in self {
                    if matrix.len() != shape[1] {
                        return Err(ragged(shape[1], matrix.len()));
                    }
                    for row in matrix {
                        if row.len() != shape[2] {
                            return Err(ragged(shape[2], row.len()));
                        }
                        flat.extend(row);
                    }
                }
                Ok(flat)
            }
            fn get_shape(&self) -> Vec<usize> {
                match self.first() {
                    Some(matrix) => vec![self.len(), matrix.len(), matrix.first().map_or(0, |row| row.len())],
                    None => vec![0, 0, 0],
                }
            }
        }
    };
}

impl_tensor_adapter!(bool, DType::BOOL);
impl_tensor_adapter!(bf16, DType::BF16);
impl_tensor_adapter!(f16, DType::F16);
impl_tensor_adapter!(f32, DType::F32);
impl_tensor_adapter!(f64, DType::F64);
impl_tensor_adapter!(u8, DType::U8);
impl_tensor_adapter!(u32, DType::U32);
impl_tensor_adapter!(i8, DType::I8);
impl_tensor_adapter!(i32, DType::I32);
impl_tensor_adapter!(i64, DType::I64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_shapes() -> Result<()> {
        let data = vec![vec![1i64, 2], vec![3, 4], vec![5, 6]];
        assert_eq!(data.get_shape(), vec![3, 2]);
        assert_eq!(data.to_flatten_vec()?, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(TensorAdapter::dtype(&7u8), DType::U8);
        Ok(())
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let data = vec![vec![1.0f32, 2.0], vec![3.0]];
        assert!(matches!(data.to_flatten_vec(), Err(Error::InvalidShape { .. })));
    }
}

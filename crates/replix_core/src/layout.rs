use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Vec<usize>,
    strides: Vec<usize>,
    offset: usize,
}

impl Layout {
    pub fn new(shape: &[usize], strides: &[usize], offset: usize) -> Self {
        Self {
            shape: shape.to_vec(),
            strides: strides.to_vec(),
            offset,
        }
    }

    pub fn from_shape(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            strides: Self::compute_strides(shape),
            offset: 0,
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
    pub fn dim_size(&self, dim: usize) -> Option<usize> {
        self.shape.get(dim).copied()
    }
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_contiguous(&self) -> bool {
        let mut acc = 1;
        for (&size, &stride) in self.shape.iter().zip(self.strides.iter()).rev() {
            if size > 1 && stride != acc {
                return false;
            }
            acc *= size;
        }
        true
    }

    pub fn view(&mut self, new_shape: &[usize]) -> Result<()> {
        let old_size = self.size();
        let new_size = new_shape.iter().product();

        if old_size != new_size {
            return Err(Error::IncompatibleShape(format!(
                "Cannot reshape layout of size {} to size {}",
                old_size, new_size
            )));
        }
        if !self.is_contiguous() {
            return Err(Error::IncompatibleShape("Cannot view a non-contiguous layout".into()));
        }

        self.shape = new_shape.to_vec();
        self.strides = Self::compute_strides(new_shape);

        Ok(())
    }

    /// Drops `dim`, fixing it at `index`. The result aliases the same storage.
    pub fn select(&self, dim: usize, index: usize) -> Result<Self> {
        let size = self.dim_size(dim).ok_or(Error::DimensionOutOfBounds {
            dim: dim as i32,
            ndim: self.ndim(),
        })?;
        if index >= size {
            return Err(Error::IndexOutOfBounds { index, size });
        }

        let mut shape = self.shape.clone();
        let mut strides = self.strides.clone();
        shape.remove(dim);
        let stride = strides.remove(dim);

        Ok(Self {
            shape,
            strides,
            offset: self.offset + index * stride,
        })
    }

    // helper

    pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
        if shape.is_empty() {
            return vec![];
        }

        let mut strides = vec![1; shape.len()];
        for i in (0..shape.len() - 1).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        strides
    }

    pub fn compute_size(shape: &[usize]) -> usize {
        shape.iter().product()
    }

    /// Packs `dims, strides, offset` the way the kernels read their metadata.
    pub fn to_metadata(&self) -> Vec<usize> {
        let mut metadata = Vec::with_capacity(2 * self.ndim() + 1);
        metadata.extend_from_slice(&self.shape);
        metadata.extend_from_slice(&self.strides);
        metadata.push(self.offset);
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_column_of_table() -> Result<()> {
        let layout = Layout::from_shape(&[4, 2]);
        let column = layout.select(1, 1)?;

        assert_eq!(column.shape(), &[4]);
        assert_eq!(column.strides(), &[2]);
        assert_eq!(column.offset(), 1);
        assert!(!column.is_contiguous());
        Ok(())
    }

    #[test]
    fn select_out_of_range() {
        let layout = Layout::from_shape(&[4, 1]);
        assert!(matches!(layout.select(1, 1), Err(Error::IndexOutOfBounds { index: 1, size: 1 })));
        assert!(matches!(layout.select(2, 0), Err(Error::DimensionOutOfBounds { dim: 2, ndim: 2 })));
    }

    #[test]
    fn view_requires_contiguous() -> Result<()> {
        let mut layout = Layout::from_shape(&[2, 3]);
        layout.view(&[6])?;
        assert_eq!(layout.strides(), &[1]);

        let mut column = Layout::from_shape(&[3, 2]).select(1, 0)?;
        assert!(column.view(&[3, 1]).is_err());
        Ok(())
    }
}

//! Repeat-interleave over strided tensors, with an optional native backend.
//!
//! ```
//! use replix::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let values = Tensor::new(vec![1.0f32, 2.0, 3.0])?;
//! let scope = Tensor::new(vec![vec![0i64, 2], vec![2, 0], vec![2, 1]])?;
//!
//! let expanded = values.repeat_interleave(&scope, None)?;
//! assert_eq!(expanded.to_flatten_vec::<f32>()?, vec![1.0, 1.0, 3.0]);
//! # Ok(())
//! # }
//! ```

pub use replix_internal::*;

pub mod prelude;

pub use replix_core as core;
pub use replix_tensor as tensor;

pub use replix_core::dtype::{bfloat16, bool, float16, float32, float64, half, int32, int64, int8, uint32, uint8};

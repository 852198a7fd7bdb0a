pub use crate::core::{
    dtype::*,
    error::{Error, Result},
    native::{get_native_policy, set_native_policy, NativePolicy},
    scalar::Scalar,
};
pub use crate::tensor::{
    ensure_repeats,
    native::{install_native_extension, use_native_extension, NativeExtension},
    repeat_interleave, repeat_interleave_index, Tensor,
};

use crate::{
    buffer::Buffer,
    dtype::DType,
    error::{Error, Result},
};
use half::{bf16, f16};
use replix_native::{ops::repeat::*, NATIVE_SUCCESS};

/// Fused repeat-interleave: reads the repeats (or scope) view in place and writes the
/// expanded values without materialising an index buffer.
///
/// # Safety
/// `metadata` must hold `dims, strides, offset, dim, out_dim_size` for a view inside `input`,
/// followed by `rep_ndim, rep_dims, rep_strides, rep_offset` for a view inside `repeats`.
/// `output` must hold `num_els_out` elements.
pub unsafe fn native_repeat_interleave(
    output: &mut dyn Buffer,
    input: &dyn Buffer,
    repeats: &dyn Buffer,
    num_els_out: usize,
    num_dims: usize,
    metadata: &[usize],
) -> Result<()> {
    if repeats.dtype() != DType::I64 {
        return Err(Error::DTypeMismatch {
            expected: DType::I64,
            got: repeats.dtype(),
        });
    }
    if output.dtype() != input.dtype() {
        return Err(Error::DTypeMismatch {
            expected: input.dtype(),
            got: output.dtype(),
        });
    }
    if output.len() < num_els_out {
        return Err(Error::InvalidArgument("Output buffer is smaller than the expansion".into()));
    }

    macro_rules! dispatch {
        ($($dtype:ident),*) => {
            paste::paste! {
                match input.dtype() {
                    $(
                        DType::$dtype => [<native_repeat_interleave_ $dtype:lower>](
                            input.len(),
                            num_els_out,
                            num_dims,
                            metadata.as_ptr(),
                            input.as_ptr() as *const [<$dtype:lower>],
                            repeats.as_ptr() as *const i64,
                            output.as_mut_ptr() as *mut [<$dtype:lower>],
                        ),
                    )*
                }
            }
        };
    }

    let status = dispatch!(BF16, F16, F32, F64, BOOL, U8, U32, I8, I32, I64);
    if status != NATIVE_SUCCESS {
        return Err(Error::from_native_error(status));
    }

    Ok(())
}

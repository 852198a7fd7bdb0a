use crate::{
    buffer::Buffer,
    dtype::DType,
    error::{Error, Result},
};
use half::{bf16, f16};
use replix_cpu::ops::indexing::*;

fn expect_dtype(buffer: &dyn Buffer, expected: DType) -> Result<()> {
    if buffer.dtype() != expected {
        return Err(Error::DTypeMismatch {
            expected,
            got: buffer.dtype(),
        });
    }
    Ok(())
}

/// Expands repeat counts (read through a strided view) into an `I64` index buffer.
///
/// # Safety
/// The view `repeats_offset + i * repeats_stride` for `i < num_repeats` must lie inside `repeats`,
/// every count must be non-negative and the counts must sum to `num_els_out`.
pub unsafe fn repeat_interleave_index(
    output: &mut dyn Buffer,
    repeats: &dyn Buffer,
    num_repeats: usize,
    num_els_out: usize,
    repeats_stride: usize,
    repeats_offset: usize,
) -> Result<()> {
    expect_dtype(output, DType::I64)?;
    expect_dtype(repeats, DType::I64)?;
    if output.len() < num_els_out {
        return Err(Error::InvalidArgument("Index buffer is smaller than the expanded length".into()));
    }

    replix_cpu::ops::indexing::repeat_interleave_index(
        num_repeats,
        num_els_out,
        repeats_stride,
        repeats_offset,
        repeats.as_ptr() as *const i64,
        output.as_mut_ptr() as *mut i64,
    );

    Ok(())
}

/// # Safety
/// `metadata` must hold `dims, strides, offset, dim, num_indices` for a view inside `input`,
/// every index must be within the indexed dimension, and `output` must hold `num_els_out` elements.
pub unsafe fn index_select(
    output: &mut dyn Buffer,
    input: &dyn Buffer,
    indices: &dyn Buffer,
    num_els_out: usize,
    num_dims: usize,
    metadata: &[usize],
) -> Result<()> {
    expect_dtype(indices, DType::I64)?;
    expect_dtype(output, input.dtype())?;
    if output.len() < num_els_out {
        return Err(Error::InvalidArgument("Output buffer is smaller than the selection".into()));
    }

    macro_rules! dispatch {
        ($($dtype:ident),*) => {
            paste::paste! {
                match input.dtype() {
                    $(
                        DType::$dtype => [<index_select_ $dtype:lower>](
                            input.len(),
                            num_els_out,
                            num_dims,
                            metadata.as_ptr(),
                            input.as_ptr() as *const [<$dtype:lower>],
                            indices.as_ptr() as *const i64,
                            output.as_mut_ptr() as *mut [<$dtype:lower>],
                        ),
                    )*
                }
            }
        };
    }

    dispatch!(BF16, F16, F32, F64, BOOL, U8, U32, I8, I32, I64);

    Ok(())
}

/// # Safety
/// `metadata` must hold `dims, dim, num_indices` for the contiguous `output`, `src` must be
/// contiguous and hold `num_els_src` elements, and every index must be within the indexed dimension.
pub unsafe fn index_add(
    output: &mut dyn Buffer,
    src: &dyn Buffer,
    indices: &dyn Buffer,
    num_els_src: usize,
    num_dims: usize,
    metadata: &[usize],
) -> Result<()> {
    expect_dtype(indices, DType::I64)?;
    expect_dtype(src, output.dtype())?;

    macro_rules! dispatch {
        ($($dtype:ident),*) => {
            paste::paste! {
                match output.dtype() {
                    $(
                        DType::$dtype => [<index_add_ $dtype:lower>](
                            num_els_src,
                            num_dims,
                            metadata.as_ptr(),
                            src.as_ptr() as *const [<$dtype:lower>],
                            indices.as_ptr() as *const i64,
                            output.as_mut_ptr() as *mut [<$dtype:lower>],
                        ),
                    )*
                    _ => return Err(Error::UnsupportedDType),
                }
            }
        };
    }

    dispatch!(BF16, F16, F32, F64, U8, U32, I8, I32, I64);

    Ok(())
}

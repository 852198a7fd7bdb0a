use crate::{
    buffer::Buffer,
    dtype::DType,
    error::{Error, Result},
};
use half::{bf16, f16};
use replix_cpu::ops::copy::*;

/// # Safety
/// `metadata` must describe a view (`dims, strides, offset`) that lies inside `input`,
/// and `output` must hold `num_els_out` elements.
pub unsafe fn contiguous(output: &mut dyn Buffer, input: &dyn Buffer, num_els_out: usize, num_dims: usize, metadata: &[usize]) -> Result<()> {
    if output.dtype() != input.dtype() {
        return Err(Error::DTypeMismatch {
            expected: input.dtype(),
            got: output.dtype(),
        });
    }
    if output.len() < num_els_out {
        return Err(Error::InvalidArgument("Output buffer is smaller than the view".into()));
    }

    macro_rules! dispatch {
        ($($dtype:ident),*) => {
            paste::paste! {
                match input.dtype() {
                    $(
                        DType::$dtype => [<contiguous_ $dtype:lower>](
                            input.len(),
                            num_els_out,
                            num_dims,
                            metadata.as_ptr(),
                            input.as_ptr() as *const [<$dtype:lower>],
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

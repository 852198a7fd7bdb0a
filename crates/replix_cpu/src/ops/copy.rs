use crate::utils::{get_strided_index, is_contiguous};
use half::{bf16, f16};
use rayon::prelude::*;

macro_rules! contiguous_op {
    ($type:ty) => {
        paste::paste! {
            #[no_mangle]
            /// # Safety
            ///
            /// * `metadata` must be a valid pointer to an array containing:
            ///   - dims[num_dims]: dimensions of the strided view
            ///   - strides[num_dims]: strides of the strided view
            ///   - offset: element offset of the view
            /// * `inp` must be a valid pointer to an array of at least `num_els_in` elements
            /// * `out` must be a valid pointer to an array of at least `num_els_out` elements
            pub unsafe fn [<contiguous_ $type>](num_els_in: usize, num_els_out: usize, num_dims: usize, metadata: *const usize, inp: *const $type, out: *mut $type) {
                // An empty view may carry an offset past the end of an empty buffer.
                if num_els_out == 0 {
                    return;
                }

                let dims = std::slice::from_raw_parts(metadata, num_dims);
                let strides = std::slice::from_raw_parts(metadata.add(num_dims), num_dims);
                let offset = *metadata.add(2 * num_dims);

                let input = std::slice::from_raw_parts(inp, num_els_in);
                let output = std::slice::from_raw_parts_mut(out, num_els_out);

                if is_contiguous(num_dims, dims, strides) {
                    output.copy_from_slice(&input[offset..offset + num_els_out]);
                } else {
                    output.par_iter_mut().enumerate().for_each(|(i, out_val)| {
                        *out_val = input[offset + get_strided_index(i, num_dims, dims, strides)];
                    });
                }
            }
        }
    };
}

contiguous_op!(bf16);
contiguous_op!(f16);
contiguous_op!(f32);
contiguous_op!(f64);
contiguous_op!(bool);
contiguous_op!(u8);
contiguous_op!(u32);
contiguous_op!(i8);
contiguous_op!(i32);
contiguous_op!(i64);

use crate::{
    NATIVE_INVALID_SCOPE, NATIVE_NEGATIVE_REPEAT, NATIVE_OUTPUT_LENGTH_MISMATCH, NATIVE_REPEATS_MISMATCH, NATIVE_REPEAT_OVERFLOW, NATIVE_SUCCESS,
};
use half::{bf16, f16};
use rayon::prelude::*;

/// Reads the repeat counts in place (a 1-D repeats vector or column 1 of a
/// scope table) and returns their inclusive prefix sums.
///
/// # Safety
///
/// `metadata` must point to `rep_ndim, rep_dims[rep_ndim], rep_strides[rep_ndim], rep_offset`
/// and `repeats` must be valid for every element those describe.
unsafe fn segment_ends(metadata: *const usize, repeats: *const i64, expected: usize) -> Result<Vec<usize>, i32> {
    let rep_ndim = *metadata;
    if rep_ndim == 0 || rep_ndim > 2 {
        return Err(NATIVE_INVALID_SCOPE);
    }

    let rep_dims = std::slice::from_raw_parts(metadata.add(1), rep_ndim);
    let rep_strides = std::slice::from_raw_parts(metadata.add(1 + rep_ndim), rep_ndim);
    let rep_offset = *metadata.add(1 + 2 * rep_ndim);

    // Column 0 of a scope holds offsets, which the expansion never reads.
    let (num_repeats, stride, base) = if rep_ndim == 2 {
        if rep_dims[1] < 2 {
            return Err(NATIVE_INVALID_SCOPE);
        }
        (rep_dims[0], rep_strides[0], rep_offset + rep_strides[1])
    } else {
        (rep_dims[0], rep_strides[0], rep_offset)
    };

    if num_repeats != expected {
        return Err(NATIVE_REPEATS_MISMATCH);
    }

    let mut ends = Vec::with_capacity(num_repeats);
    let mut acc = 0usize;
    for i in 0..num_repeats {
        let count = *repeats.add(base + i * stride);
        if count < 0 {
            return Err(NATIVE_NEGATIVE_REPEAT);
        }
        acc = match usize::try_from(count).ok().and_then(|count| acc.checked_add(count)) {
            Some(acc) => acc,
            None => return Err(NATIVE_REPEAT_OVERFLOW),
        };
        ends.push(acc);
    }

    Ok(ends)
}

macro_rules! repeat_interleave_op {
    ($type:ty) => {
        paste::paste! {
            #[no_mangle]
            /// # Safety
            ///
            /// * `metadata` must be a valid pointer to an array containing:
            ///   - dims[num_dims]: input dimensions
            ///   - strides[num_dims]: input strides
            ///   - offset: input element offset
            ///   - dim: the repeated dimension
            ///   - out_dim_size: size of `dim` in the output
            ///   - rep_ndim, rep_dims[rep_ndim], rep_strides[rep_ndim], rep_offset: the repeats or scope view
            /// * `inp` must be a valid pointer to an array of at least `num_els_in` elements
            /// * `repeats` must be valid for every element the repeats view describes
            /// * `out` must be a valid pointer to a contiguous array of at least `num_els_out` elements
            ///
            /// Returns `NATIVE_SUCCESS` or one of the native status codes; `out` is untouched on failure.
            pub unsafe fn [<native_repeat_interleave_ $type>](
                num_els_in: usize,
                num_els_out: usize,
                num_dims: usize,
                metadata: *const usize,
                inp: *const $type,
                repeats: *const i64,
                out: *mut $type,
            ) -> i32 {
                let dims = std::slice::from_raw_parts(metadata, num_dims);
                let strides = std::slice::from_raw_parts(metadata.add(num_dims), num_dims);
                let offset = *metadata.add(2 * num_dims);
                let dim = *metadata.add(2 * num_dims + 1);
                let out_dim_size = *metadata.add(2 * num_dims + 2);

                let ends = match segment_ends(metadata.add(2 * num_dims + 3), repeats, dims[dim]) {
                    Ok(ends) => ends,
                    Err(status) => return status,
                };
                if ends.last().copied().unwrap_or(0) != out_dim_size {
                    return NATIVE_OUTPUT_LENGTH_MISMATCH;
                }

                let input = std::slice::from_raw_parts(inp, num_els_in);
                let output = std::slice::from_raw_parts_mut(out, num_els_out);

                output.par_iter_mut().enumerate().for_each(|(i, out_val)| {
                    let mut remaining = i;
                    let mut src = offset;
                    for d in (0..num_dims).rev() {
                        let size = if d == dim { out_dim_size } else { dims[d] };
                        let coord = remaining % size;
                        remaining /= size;

                        let coord = if d == dim { ends.partition_point(|&end| end <= coord) } else { coord };
                        src += coord * strides[d];
                    }
                    *out_val = input[src];
                });

                NATIVE_SUCCESS
            }
        }
    };
}

repeat_interleave_op!(bf16);
repeat_interleave_op!(f16);
repeat_interleave_op!(f32);
repeat_interleave_op!(f64);
repeat_interleave_op!(bool);
repeat_interleave_op!(u8);
repeat_interleave_op!(u32);
repeat_interleave_op!(i8);
repeat_interleave_op!(i32);
repeat_interleave_op!(i64);

#[cfg(test)]
mod tests {
    use super::*;

    fn build_metadata(dims: &[usize], strides: &[usize], dim: usize, out_dim_size: usize, rep_dims: &[usize], rep_strides: &[usize]) -> Vec<usize> {
        let mut metadata = Vec::new();
        metadata.extend_from_slice(dims);
        metadata.extend_from_slice(strides);
        metadata.push(0);
        metadata.push(dim);
        metadata.push(out_dim_size);
        metadata.push(rep_dims.len());
        metadata.extend_from_slice(rep_dims);
        metadata.extend_from_slice(rep_strides);
        metadata.push(0);
        metadata
    }

    #[test]
    fn repeats_vector() {
        let input = [1.0f32, 2.0, 3.0];
        let repeats = [2i64, 0, 1];
        let metadata = build_metadata(&[3], &[1], 0, 3, &[3], &[1]);
        let mut out = vec![0.0f32; 3];

        let status = unsafe { native_repeat_interleave_f32(3, 3, 1, metadata.as_ptr(), input.as_ptr(), repeats.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(status, NATIVE_SUCCESS);
        assert_eq!(out, vec![1.0, 1.0, 3.0]);
    }

    #[test]
    fn scope_columns() {
        let input = [1i32, 2, 3, 4, 5, 6];
        let scope = [0i64, 1, 1, 2];
        let metadata = build_metadata(&[2, 3], &[3, 1], 0, 3, &[2, 2], &[2, 1]);
        let mut out = vec![0i32; 9];

        let status = unsafe { native_repeat_interleave_i32(6, 9, 2, metadata.as_ptr(), input.as_ptr(), scope.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(status, NATIVE_SUCCESS);
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 4, 5, 6]);
    }

    #[test]
    fn inner_dimension() {
        let input = [1u8, 2, 3, 4];
        let repeats = [1i64, 2];
        let metadata = build_metadata(&[2, 2], &[2, 1], 1, 3, &[2], &[1]);
        let mut out = vec![0u8; 6];

        let status = unsafe { native_repeat_interleave_u8(4, 6, 2, metadata.as_ptr(), input.as_ptr(), repeats.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(status, NATIVE_SUCCESS);
        assert_eq!(out, vec![1, 2, 2, 3, 4, 4]);
    }

    #[test]
    fn rejects_bad_input() {
        let input = [1i64, 2];
        let mut out = vec![0i64; 3];

        let repeats = [1i64, 1];
        let metadata = build_metadata(&[2], &[1], 0, 3, &[2], &[1]);
        let status = unsafe { native_repeat_interleave_i64(2, 3, 1, metadata.as_ptr(), input.as_ptr(), repeats.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(status, NATIVE_OUTPUT_LENGTH_MISMATCH);

        let repeats = [4i64, -1];
        let metadata = build_metadata(&[2], &[1], 0, 3, &[2], &[1]);
        let status = unsafe { native_repeat_interleave_i64(2, 3, 1, metadata.as_ptr(), input.as_ptr(), repeats.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(status, NATIVE_NEGATIVE_REPEAT);

        let repeats = [3i64];
        let metadata = build_metadata(&[2], &[1], 0, 3, &[1], &[1]);
        let status = unsafe { native_repeat_interleave_i64(2, 3, 1, metadata.as_ptr(), input.as_ptr(), repeats.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(status, NATIVE_REPEATS_MISMATCH);

        let scope = [0i64, 3];
        let metadata = build_metadata(&[2], &[1], 0, 3, &[2, 1], &[1, 1]);
        let status = unsafe { native_repeat_interleave_i64(2, 3, 1, metadata.as_ptr(), input.as_ptr(), scope.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(status, NATIVE_INVALID_SCOPE);

        let repeats = [i64::MAX; 3];
        let metadata = build_metadata(&[3], &[1], 0, 3, &[3], &[1]);
        let status = unsafe { native_repeat_interleave_i64(2, 3, 1, metadata.as_ptr(), input.as_ptr(), repeats.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(status, NATIVE_REPEAT_OVERFLOW);

        assert_eq!(out, vec![0, 0, 0]);
    }

    #[test]
    fn empty_scope() {
        let input: [f64; 0] = [];
        let scope: [i64; 0] = [];
        let metadata = build_metadata(&[0, 3], &[3, 1], 0, 0, &[0, 2], &[2, 1]);
        let mut out: Vec<f64> = Vec::new();

        let status = unsafe { native_repeat_interleave_f64(0, 0, 2, metadata.as_ptr(), input.as_ptr(), scope.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(status, NATIVE_SUCCESS);
        assert!(out.is_empty());
    }
}

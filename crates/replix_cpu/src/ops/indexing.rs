use half::{bf16, f16};
use rayon::prelude::*;

/// # Safety
///
/// * `repeats` must be valid for reads at `repeats_offset + i * repeats_stride` for every `i < num_repeats`
/// * Every repeat count must be non-negative and the counts must sum to `num_els_out`
/// * `out` must be a valid pointer to an array of at least `num_els_out` elements
#[no_mangle]
pub unsafe fn repeat_interleave_index(
    num_repeats: usize,
    num_els_out: usize,
    repeats_stride: usize,
    repeats_offset: usize,
    repeats: *const i64,
    out: *mut i64,
) {
    let out = std::slice::from_raw_parts_mut(out, num_els_out);

    let mut pos = 0;
    for i in 0..num_repeats {
        let count = *repeats.add(repeats_offset + i * repeats_stride) as usize;
        out[pos..pos + count].fill(i as i64);
        pos += count;
    }
}

macro_rules! index_select_op {
    ($type:ty) => {
        paste::paste! {
            #[no_mangle]
            /// # Safety
            ///
            /// * `metadata` must be a valid pointer to an array containing:
            ///   - dims[num_dims]: input dimensions
            ///   - strides[num_dims]: input strides
            ///   - offset: input element offset
            ///   - dim: the dimension being indexed
            ///   - num_indices: number of entries in `indices`
            /// * `inp` must be a valid pointer to an array of at least `num_els_in` elements
            /// * `indices` must hold `num_indices` values, each within `0..dims[dim]`
            /// * `out` must be a valid pointer to an array of at least `num_els_out` elements
            pub unsafe fn [<index_select_ $type>](
                num_els_in: usize,
                num_els_out: usize,
                num_dims: usize,
                metadata: *const usize,
                inp: *const $type,
                indices: *const i64,
                out: *mut $type,
            ) {
                let dims = std::slice::from_raw_parts(metadata, num_dims);
                let strides = std::slice::from_raw_parts(metadata.add(num_dims), num_dims);
                let offset = *metadata.add(2 * num_dims);
                let dim = *metadata.add(2 * num_dims + 1);
                let num_indices = *metadata.add(2 * num_dims + 2);

                let input = std::slice::from_raw_parts(inp, num_els_in);
                let indices = std::slice::from_raw_parts(indices, num_indices);
                let output = std::slice::from_raw_parts_mut(out, num_els_out);

                output.par_iter_mut().enumerate().for_each(|(i, out_val)| {
                    let mut remaining = i;
                    let mut src = offset;
                    for d in (0..num_dims).rev() {
                        let size = if d == dim { num_indices } else { dims[d] };
                        let coord = remaining % size;
                        remaining /= size;

                        let coord = if d == dim { indices[coord] as usize } else { coord };
                        src += coord * strides[d];
                    }
                    *out_val = input[src];
                });
            }
        }
    };
}

macro_rules! index_add_op {
    ($type:ty) => {
        paste::paste! {
            #[no_mangle]
            /// # Safety
            ///
            /// * `metadata` must be a valid pointer to an array containing:
            ///   - dims[num_dims]: dimensions of the contiguous destination
            ///   - dim: the dimension being indexed
            ///   - num_indices: number of entries in `indices`
            /// * `src` must be contiguous, shaped like `dims` with `dims[dim]` replaced by `num_indices`,
            ///   and hold `num_els_src` elements
            /// * `indices` must hold `num_indices` values, each within `0..dims[dim]`
            /// * `out` must be a valid pointer to the contiguous destination
            pub unsafe fn [<index_add_ $type>](num_els_src: usize, num_dims: usize, metadata: *const usize, src: *const $type, indices: *const i64, out: *mut $type) {
                let dims = std::slice::from_raw_parts(metadata, num_dims);
                let dim = *metadata.add(num_dims);
                let num_indices = *metadata.add(num_dims + 1);

                let src = std::slice::from_raw_parts(src, num_els_src);
                let indices = std::slice::from_raw_parts(indices, num_indices);

                let inner: usize = dims[dim + 1..].iter().product();

                // Duplicate indices accumulate into the same slot, so this stays sequential.
                for (i, &value) in src.iter().enumerate() {
                    let inner_idx = i % inner;
                    let rest = i / inner;
                    let coord = rest % num_indices;
                    let outer = rest / num_indices;

                    let dst = (outer * dims[dim] + indices[coord] as usize) * inner + inner_idx;
                    *out.add(dst) = *out.add(dst) + value;
                }
            }
        }
    };
}

index_select_op!(bf16);
index_select_op!(f16);
index_select_op!(f32);
index_select_op!(f64);
index_select_op!(bool);
index_select_op!(u8);
index_select_op!(u32);
index_select_op!(i8);
index_select_op!(i32);
index_select_op!(i64);

index_add_op!(bf16);
index_add_op!(f16);
index_add_op!(f32);
index_add_op!(f64);
index_add_op!(u8);
index_add_op!(u32);
index_add_op!(i8);
index_add_op!(i32);
index_add_op!(i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_counts_in_order() {
        let repeats = [2i64, 0, 1, 3];
        let mut out = vec![-1i64; 6];
        unsafe { repeat_interleave_index(4, 6, 1, 0, repeats.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(out, vec![0, 0, 2, 3, 3, 3]);
    }

    #[test]
    fn expands_strided_column() {
        // [[offset, length], ...] read through column 1
        let scope = [0i64, 1, 1, 2, 3, 0, 3, 1];
        let mut out = vec![-1i64; 4];
        unsafe { repeat_interleave_index(4, 4, 2, 1, scope.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(out, vec![0, 1, 1, 3]);
    }

    #[test]
    fn selects_rows_and_columns() {
        let input = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let indices = [1i64, 1, 0];

        let metadata = [2usize, 3, 3, 1, 0, 0, 3];
        let mut out = vec![0.0f32; 9];
        unsafe { index_select_f32(6, 9, 2, metadata.as_ptr(), input.as_ptr(), indices.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(out, vec![4.0, 5.0, 6.0, 4.0, 5.0, 6.0, 1.0, 2.0, 3.0]);

        let metadata = [2usize, 3, 3, 1, 0, 1, 3];
        let mut out = vec![0.0f32; 6];
        unsafe { index_select_f32(6, 6, 2, metadata.as_ptr(), input.as_ptr(), indices.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(out, vec![2.0, 2.0, 1.0, 5.0, 5.0, 4.0]);
    }

    #[test]
    fn selects_from_transposed_view() {
        // [[1, 2, 3], [4, 5, 6]] viewed as its 3x2 transpose
        let input = [1i32, 2, 3, 4, 5, 6];
        let indices = [2i64, 0];
        let metadata = [3usize, 2, 1, 3, 0, 0, 2];
        let mut out = vec![0i32; 4];
        unsafe { index_select_i32(6, 4, 2, metadata.as_ptr(), input.as_ptr(), indices.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(out, vec![3, 6, 1, 4]);
    }

    #[test]
    fn accumulates_duplicate_indices() {
        let src = [1.0f64, 2.0, 3.0, 4.0];
        let indices = [0i64, 0, 2, 0];
        let metadata = [3usize, 0, 4];
        let mut out = vec![0.0f64; 3];
        unsafe { index_add_f64(4, 1, metadata.as_ptr(), src.as_ptr(), indices.as_ptr(), out.as_mut_ptr()) };
        assert_eq!(out, vec![7.0, 0.0, 3.0]);
    }
}

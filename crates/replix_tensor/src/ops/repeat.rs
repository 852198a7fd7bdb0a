//! Repeat-interleave: each slice along a dimension is emitted `repeats[i]` times in order.
//!
//! Repeats arrive either as a 1-D count vector or as an `[n, 2]` scope table whose second
//! column holds the counts (the first column, an offset, is never read). Three routes exist,
//! tried in order:
//!
//! 1. an output tensor was given: fill it, through the native extension or the portable path
//!    depending on the [`NativePolicy`];
//! 2. the output length is known and the native extension is usable: let the extension
//!    allocate and fill the result;
//! 3. otherwise expand the repeats into an index and gather.

use crate::{
    native::{is_native_extension_available, require_native_extension, use_native_extension},
    utils::indexing::normalize_dim,
    Tensor,
};
use replix_core::{
    be,
    dtype::DType,
    error::{Error, Result},
    native::{get_native_policy, NativePolicy},
};

/// Projects a scope table onto its repeat column. Anything that is not 2-D is returned as-is,
/// so applying this twice changes nothing.
pub fn ensure_repeats(repeats_or_scope: &Tensor) -> Result<Tensor> {
    if repeats_or_scope.ndim() == 2 {
        repeats_or_scope.select(1, 1)
    } else {
        Ok(repeats_or_scope.clone())
    }
}

fn read_repeats(repeats: &Tensor) -> Result<Vec<i64>> {
    if repeats.ndim() != 1 {
        return Err(Error::InvalidShape {
            message: format!("repeats must be 1-D, got shape {:?}", repeats.shape()),
        });
    }
    if !repeats.dtype().is_int() {
        return Err(Error::DTypeMismatch {
            expected: DType::I64,
            got: repeats.dtype(),
        });
    }

    let counts = repeats.to_flatten_vec::<i64>()?;
    if let Some(&count) = counts.iter().find(|&&count| count < 0) {
        return Err(Error::InvalidArgument(format!("repeats must be non-negative, got {}", count)));
    }

    Ok(counts)
}

/// Expands 1-D repeat counts into an `I64` index: `i` appears `repeats[i]` times, in
/// ascending order.
pub fn repeat_interleave_index(repeats: &Tensor) -> Result<Tensor> {
    let counts = read_repeats(repeats)?;
    let total = counts
        .iter()
        .try_fold(0usize, |acc, &count| usize::try_from(count).ok().and_then(|count| acc.checked_add(count)))
        .ok_or_else(|| Error::InvalidArgument("sum of repeats overflows the index range".into()))?;

    let repeats = if repeats.dtype() == DType::I64 {
        repeats.clone()
    } else {
        repeats.to_dtype(DType::I64)?
    };

    let num_repeats = counts.len();
    let stride = repeats.strides()[0];
    let offset = repeats.offset();
    let mut index = Tensor::empty_with_spec(&[total], DType::I64)?;

    unsafe {
        index.with_buffer_mut(|out_buf| be::ops::indexing::repeat_interleave_index(out_buf, repeats.buffer(), num_repeats, total, stride, offset))?;
    }

    Ok(index)
}

fn resolve_dim(values: &Tensor, dim: Option<i32>) -> Result<Option<usize>> {
    dim.map(|dim| normalize_dim(dim, values.ndim())).transpose()
}

/// Flattens `values` when no dimension was given.
fn repeat_view(values: &Tensor, dim: Option<usize>) -> Result<(Tensor, usize)> {
    match dim {
        Some(dim) => Ok((values.clone(), dim)),
        None => Ok((values.flatten()?, 0)),
    }
}

fn check_repeats_len(repeats: &Tensor, values: &Tensor, dim: usize) -> Result<()> {
    let expected = values.shape()[dim];
    let got = repeats.shape().first().copied().unwrap_or(1);
    if repeats.ndim() == 1 && got != expected {
        return Err(Error::ShapeMismatch {
            expected,
            got,
            msg: format!("repeats must have one entry per slice of dimension {}", dim),
        });
    }
    Ok(())
}

fn expand_index(values: &Tensor, repeats_or_scope: &Tensor, dim: Option<usize>) -> Result<(Tensor, usize, Tensor)> {
    let repeats = ensure_repeats(repeats_or_scope)?;
    let (values, dim) = repeat_view(values, dim)?;
    check_repeats_len(&repeats, &values, dim)?;
    let index = repeat_interleave_index(&repeats)?;

    Ok((values, dim, index))
}

/// Portable output-buffer route: expand, then gather straight into `out`.
pub fn repeat_interleave_out_portable(values: &Tensor, repeats_or_scope: &Tensor, dim: Option<i32>, out: &mut Tensor) -> Result<()> {
    let dim = resolve_dim(values, dim)?;
    let (values, dim, index) = expand_index(values, repeats_or_scope, dim)?;

    values.index_select_out(dim, &index, out)
}

/// Native output-buffer route. Fails with [`Error::NativeExtensionMissing`] when no extension
/// is loaded.
pub fn repeat_interleave_out_native(values: &Tensor, repeats_or_scope: &Tensor, dim: Option<i32>, out: &mut Tensor) -> Result<()> {
    let dim = resolve_dim(values, dim)?;
    let extension = require_native_extension().inspect_err(|_| {
        log::warn!("repeat_interleave: native extension required but not present");
    })?;

    log::debug!("repeat_interleave: output buffer via native extension `{}`", extension.name());
    extension.repeat_interleave_out(out, values, repeats_or_scope, dim)?;
    out.detach_();

    Ok(())
}

fn repeat_interleave_generic(values: &Tensor, repeats_or_scope: &Tensor, dim: Option<usize>, out_length: Option<usize>) -> Result<Tensor> {
    let (values, dim, index) = expand_index(values, repeats_or_scope, dim)?;

    if let Some(out_length) = out_length {
        if index.size() != out_length {
            return Err(Error::ShapeMismatch {
                expected: out_length,
                got: index.size(),
                msg: "sum of repeats does not match the requested output length".into(),
            });
        }
    }

    values.index_select(dim, &index)
}

/// Repeat-interleave with the three-way dispatch described in the module docs.
///
/// Returns `Ok(None)` when the result was written into `out`, the new tensor otherwise.
pub fn repeat_interleave(
    values: &Tensor,
    repeats_or_scope: &Tensor,
    dim: Option<i32>,
    out: Option<&mut Tensor>,
    out_length: Option<usize>,
) -> Result<Option<Tensor>> {
    match out {
        Some(out) => {
            values.repeat_interleave_out(repeats_or_scope, dim, out)?;
            Ok(None)
        },
        None => match out_length {
            Some(out_length) => values.repeat_interleave_with_length(repeats_or_scope, dim, out_length).map(Some),
            None => values.repeat_interleave(repeats_or_scope, dim).map(Some),
        },
    }
}

impl Tensor {
    /// Generic route: a new tensor, tracked by autograd when `self` is.
    pub fn repeat_interleave(&self, repeats_or_scope: &Tensor, dim: Option<i32>) -> Result<Self> {
        let dim = resolve_dim(self, dim)?;

        log::debug!("repeat_interleave: generic path");
        repeat_interleave_generic(self, repeats_or_scope, dim, None)
    }

    /// Uses the native extension's shape-aware route when usable, the generic route otherwise.
    /// Either way the expanded dimension must come out `out_length` long.
    pub fn repeat_interleave_with_length(&self, repeats_or_scope: &Tensor, dim: Option<i32>, out_length: usize) -> Result<Self> {
        let dim = resolve_dim(self, dim)?;

        if use_native_extension() {
            let extension = require_native_extension()?;
            log::debug!("repeat_interleave: known output length {} via native extension `{}`", out_length, extension.name());
            return extension.repeat_interleave_out_shape(self, repeats_or_scope, out_length, dim);
        }

        log::debug!("repeat_interleave: generic path with output length {}", out_length);
        repeat_interleave_generic(self, repeats_or_scope, dim, Some(out_length))
    }

    /// Output-buffer route. `out` must have the result's shape and dtype; it is overwritten and
    /// detached from autograd.
    ///
    /// The write lands in `out`'s storage only when `out` owns it alone. If the storage is
    /// shared with another handle, `out` is moved to a fresh buffer and the other handles keep
    /// their old contents.
    pub fn repeat_interleave_out(&self, repeats_or_scope: &Tensor, dim: Option<i32>, out: &mut Tensor) -> Result<()> {
        match get_native_policy() {
            NativePolicy::Require => repeat_interleave_out_native(self, repeats_or_scope, dim, out),
            NativePolicy::Auto if is_native_extension_available() => repeat_interleave_out_native(self, repeats_or_scope, dim, out),
            NativePolicy::Auto | NativePolicy::Disable => {
                log::debug!("repeat_interleave: output buffer via portable path");
                repeat_interleave_out_portable(self, repeats_or_scope, dim, out)
            },
        }
    }
}

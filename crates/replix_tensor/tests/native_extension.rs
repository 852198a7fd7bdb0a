mod utils;

use replix_core::{
    dtype::DType,
    error::{Error, Result},
    native::NativePolicy,
};
use replix_tensor::{
    native::{install_native_extension, is_native_extension_available, native_extension, use_native_extension, NativeExtension},
    ops::repeat::repeat_interleave_out_portable,
    repeat_interleave, Tensor,
};
use std::{cell::Cell, sync::Once};
use utils::{setup_tensor, setup_with_policy};

thread_local! {
    static OUT_CALLS: Cell<usize> = const { Cell::new(0) };
    static SHAPE_CALLS: Cell<usize> = const { Cell::new(0) };
}

/// Delegates to the portable implementation and counts calls per test thread.
struct CountingExtension;

impl NativeExtension for CountingExtension {
    fn name(&self) -> &str {
        "counting"
    }

    fn repeat_interleave_out(&self, out: &mut Tensor, values: &Tensor, repeats_or_scope: &Tensor, dim: Option<usize>) -> Result<()> {
        OUT_CALLS.with(|c| c.set(c.get() + 1));
        repeat_interleave_out_portable(values, repeats_or_scope, dim.map(|d| d as i32), out)
    }

    fn repeat_interleave_out_shape(&self, values: &Tensor, repeats_or_scope: &Tensor, out_length: usize, dim: Option<usize>) -> Result<Tensor> {
        SHAPE_CALLS.with(|c| c.set(c.get() + 1));
        let result = values.repeat_interleave(repeats_or_scope, dim.map(|d| d as i32))?;
        let expanded = dim.map_or(result.size(), |d| result.shape()[d]);
        if expanded != out_length {
            return Err(Error::Native(format!("expected {} entries, got {}", out_length, expanded)));
        }
        Ok(result)
    }
}

fn setup(policy: NativePolicy) {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if let Err(e) = install_native_extension(CountingExtension) {
            panic!("failed to install test extension: {}", e);
        }
    });

    setup_with_policy(policy);
    OUT_CALLS.with(|c| c.set(0));
    SHAPE_CALLS.with(|c| c.set(0));
}

fn calls() -> (usize, usize) {
    (OUT_CALLS.with(|c| c.get()), SHAPE_CALLS.with(|c| c.get()))
}

#[test]
fn installed_extension_is_used() {
    setup(NativePolicy::Auto);

    assert!(is_native_extension_available());
    assert!(use_native_extension());
    assert_eq!(native_extension().map(|e| e.name()), Some("counting"));
    assert!(matches!(install_native_extension(CountingExtension), Err(Error::NativeExtensionAlreadyInstalled)));
}

#[test]
fn output_buffer_routes_to_extension() -> Result<()> {
    setup(NativePolicy::Auto);

    let values = setup_tensor(vec![vec![1.0f32, 2.0], vec![3.0, 4.0]], DType::F32)?;
    let repeats = setup_tensor(vec![2i64, 1], DType::I64)?;
    let mut out = Tensor::empty_with_spec(&[2, 3], DType::F32)?;

    // The output buffer takes priority over a known length.
    let result = repeat_interleave(&values, &repeats, Some(-1), Some(&mut out), Some(3))?;
    assert!(result.is_none());
    assert_eq!(calls(), (1, 0));
    assert_eq!(out.to_flatten_vec::<f32>()?, vec![1.0, 1.0, 2.0, 3.0, 3.0, 4.0]);
    Ok(())
}

#[test]
fn known_length_routes_to_extension() -> Result<()> {
    setup(NativePolicy::Auto);

    let values = setup_tensor(vec![1i32, 2, 3], DType::I32)?;
    let scope = setup_tensor(vec![vec![0i64, 1], vec![1, 0], vec![1, 2]], DType::I64)?;

    let result = repeat_interleave(&values, &scope, None, None, Some(3))?;
    assert_eq!(calls(), (0, 1));
    assert_eq!(result.map(|t| t.to_flatten_vec::<i32>()).transpose()?, Some(vec![1, 3, 3]));

    let generic = repeat_interleave(&values, &scope, None, None, None)?;
    assert_eq!(calls(), (0, 1));
    assert_eq!(generic.map(|t| t.to_flatten_vec::<i32>()).transpose()?, Some(vec![1, 3, 3]));
    Ok(())
}

#[test]
fn disabled_policy_bypasses_extension() -> Result<()> {
    setup(NativePolicy::Disable);

    assert!(!use_native_extension());

    let values = setup_tensor(vec![1.0f64, 2.0], DType::F64)?;
    let repeats = setup_tensor(vec![1i64, 2], DType::I64)?;
    let mut out = Tensor::empty_with_spec(&[3], DType::F64)?;

    values.repeat_interleave_out(&repeats, Some(0), &mut out)?;
    let with_length = values.repeat_interleave_with_length(&repeats, Some(0), 3)?;

    assert_eq!(calls(), (0, 0));
    assert_eq!(out.to_flatten_vec::<f64>()?, vec![1.0, 2.0, 2.0]);
    assert_eq!(with_length.to_flatten_vec::<f64>()?, vec![1.0, 2.0, 2.0]);
    Ok(())
}

#[test]
fn required_policy_uses_extension() -> Result<()> {
    setup(NativePolicy::Require);

    let values = setup_tensor(vec![1u8, 2], DType::U8)?;
    let repeats = setup_tensor(vec![0i64, 2], DType::I64)?;
    let mut out = Tensor::empty_with_spec(&[2], DType::U8)?;

    values.repeat_interleave_out(&repeats, Some(0), &mut out)?;
    assert_eq!(calls(), (1, 0));
    assert_eq!(out.to_flatten_vec::<u8>()?, vec![2, 2]);
    Ok(())
}

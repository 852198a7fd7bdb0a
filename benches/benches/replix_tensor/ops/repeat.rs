use benches::{cyclic_repeats, scope_rows};
use criterion::{black_box, Criterion};
use replix_core::{
    dtype::DType,
    error::Result,
    native::{set_native_policy, NativePolicy},
};
use replix_tensor::Tensor;

// Constants for benchmark data sizes
const SIZES: [(usize, &str); 2] = [(1000, "small"), (10000, "medium")];
const ROW_WIDTH: usize = 16;

fn setup(size: usize, dtype: DType) -> Result<(Tensor, Tensor, Tensor, usize)> {
    let raw_data: Vec<f32> = (0..size * ROW_WIDTH).map(|i| (i % 10) as f32 / 10.0).collect();
    let mut values = Tensor::new(raw_data)?.reshape(&[size, ROW_WIDTH])?;
    values.with_dtype(dtype)?;

    let counts = cyclic_repeats(size, 3);
    let out_length = counts.iter().sum::<i64>() as usize;
    let repeats = Tensor::new(counts.clone())?;
    let scope = Tensor::new(scope_rows(&counts))?;

    Ok((values, repeats, scope, out_length))
}

pub fn basic(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("repeat_interleave/basic");
    group.warm_up_time(core::time::Duration::from_millis(500));
    group.measurement_time(core::time::Duration::from_secs(3));
    group.sample_size(50);

    for dtype in [DType::F32, DType::BF16] {
        for &(size, size_name) in &SIZES {
            let (values, repeats, _, out_length) = setup(size, dtype).unwrap();
            let bench_name = format!("{}/{}", dtype.as_str(), size_name);

            set_native_policy(NativePolicy::Disable);
            group.bench_function(format!("generic/{}", bench_name), |b| {
                b.iter(|| black_box(values.repeat_interleave(&repeats, Some(0))).unwrap())
            });

            let mut out = Tensor::empty_with_spec(&[out_length, ROW_WIDTH], dtype).unwrap();
            group.bench_function(format!("out_portable/{}", bench_name), |b| {
                b.iter(|| black_box(values.repeat_interleave_out(&repeats, Some(0), &mut out)).unwrap())
            });

            #[cfg(feature = "native")]
            {
                set_native_policy(NativePolicy::Require);
                group.bench_function(format!("out_native/{}", bench_name), |b| {
                    b.iter(|| black_box(values.repeat_interleave_out(&repeats, Some(0), &mut out)).unwrap())
                });

                set_native_policy(NativePolicy::Auto);
                group.bench_function(format!("with_length/{}", bench_name), |b| {
                    b.iter(|| black_box(values.repeat_interleave_with_length(&repeats, Some(0), out_length)).unwrap())
                });
            }
        }
    }

    group.finish();
}

pub fn scope(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("repeat_interleave/scope");
    group.warm_up_time(core::time::Duration::from_millis(500));
    group.measurement_time(core::time::Duration::from_secs(3));
    group.sample_size(50);

    for &(size, size_name) in &SIZES {
        let (values, _, scope, out_length) = setup(size, DType::F32).unwrap();

        set_native_policy(NativePolicy::Disable);
        group.bench_function(format!("generic/{}", size_name), |b| {
            b.iter(|| black_box(values.repeat_interleave(&scope, Some(0))).unwrap())
        });

        set_native_policy(NativePolicy::Auto);
        group.bench_function(format!("with_length/{}", size_name), |b| {
            b.iter(|| black_box(values.repeat_interleave_with_length(&scope, Some(0), out_length)).unwrap())
        });
    }

    group.finish();
}

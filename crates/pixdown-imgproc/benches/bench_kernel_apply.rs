use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

use pixdown_imgproc::downsample::{apply_kernels, KernelApplyParams};
use pixdown_imgproc::parallel::ExecutionStrategy;
use pixdown_tensor::Tensor4;

fn bench_kernel_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("KernelApply");
    let mut rng = rand::rng();

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let (out_h, out_w) = (height / 2, width / 2);
        let image = Tensor4::<f32>::from_shape_vec(
            [1, 3, *height, *width],
            (0..3 * width * height).map(|_| rng.random::<f32>()).collect(),
        )
        .unwrap();
        let kernels = Tensor4::<f32>::from_shape_val([1, 9, out_h, out_w], 1.0 / 9.0);
        let offsets_h = Tensor4::<f32>::from_shape_vec(
            [1, 1, out_h, out_w],
            (0..out_h * out_w).map(|_| rng.random_range(-0.5..0.5)).collect(),
        )
        .unwrap();
        let offsets_v = offsets_h.clone();

        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::ParallelElements] {
            let params = KernelApplyParams {
                strategy,
                ..Default::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), &parameter_string),
                &(&image, &kernels, &offsets_h, &offsets_v),
                |b, i| {
                    b.iter(|| {
                        black_box(apply_kernels(i.0, i.1, i.2, i.3, &params)).unwrap();
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_kernel_apply);
criterion_main!(benches);

use criterion::*;
use superpixels::arrays::ImageBuffer;
use superpixels::common::{GraphParams, QuickShiftParams, SlicParams};
use superpixels::{graph, quickshift, slic};

/// Deterministic synthetic test image: smooth color gradients with a few
/// hard region boundaries, enough structure to keep all engines honest.
fn synthetic_image(width: usize, height: usize) -> ImageBuffer {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let r = ((x * 255) / width) as u8;
            let g = ((y * 255) / height) as u8;
            let b = if (x / 32 + y / 32) % 2 == 0 { 200 } else { 40 };
            data.extend_from_slice(&[r, g, b]);
        }
    }
    ImageBuffer::from_u8(&data, width, height, 3).unwrap()
}

fn bench_graph(c: &mut Criterion) {
    let image = synthetic_image(640, 480);
    let params = GraphParams::default();
    c.bench_function("graph_640x480", |b| {
        b.iter(|| {
            let _ = black_box(graph::segment(&image, &params).unwrap());
        });
    });
}

fn bench_graph_no_smoothing(c: &mut Criterion) {
    let image = synthetic_image(640, 480);
    let params = GraphParams {
        sigma: 0.0,
        ..GraphParams::default()
    };
    c.bench_function("graph_640x480_sigma0", |b| {
        b.iter(|| {
            let _ = black_box(graph::segment(&image, &params).unwrap());
        });
    });
}

fn bench_quickshift(c: &mut Criterion) {
    // Quick shift cost grows with the window area; keep the image modest and
    // sweep the kernel size instead.
    let image = synthetic_image(160, 120);
    let mut group = c.benchmark_group("quickshift_160x120");
    for kernel_size in [1.0f32, 2.0, 3.0] {
        let params = QuickShiftParams {
            kernel_size,
            max_dist: 10.0,
            color_ratio: 0.5,
        };
        group.bench_with_input(
            BenchmarkId::new("kernel_size", format!("{kernel_size}")),
            &params,
            |b, params| {
                b.iter(|| {
                    let _ = black_box(quickshift::segment(&image, params).unwrap());
                });
            },
        );
    }
    group.finish();
}

fn bench_slic(c: &mut Criterion) {
    let image = synthetic_image(640, 480);
    let mut group = c.benchmark_group("slic_640x480");
    for num_superpixels in [100u32, 400, 1600] {
        let params = SlicParams {
            num_superpixels,
            ..SlicParams::default()
        };
        group.bench_with_input(
            BenchmarkId::new("superpixels", format!("{num_superpixels}")),
            &params,
            |b, params| {
                b.iter(|| {
                    let _ = black_box(slic::segment(&image, params).unwrap());
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_graph,
    bench_graph_no_smoothing,
    bench_quickshift,
    bench_slic
);
criterion_main!(benches);

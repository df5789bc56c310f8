//! Criterion benchmarks for the line scanner and the bilinear rotator.
//!
//! Both kernels run against preallocated buffers so only the per-sample and
//! per-pixel work is measured.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rusty_deskew::{
    ImageFormat, LineScanParams, bench_utils, rotate_image_bilinear, scan_line,
};

fn bench_rotate_size_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotate_size_scaling_2_5deg");
    for size in bench_utils::BENCH_SIZES {
        let input = bench_utils::create_test_image(size, size, ImageFormat::Rgb);
        let mut output = vec![0u8; size * size * 3];
        let angle = 2.5_f64.to_radians();
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                rotate_image_bilinear(
                    black_box(input.as_slice()),
                    black_box(&mut output),
                    size,
                    size,
                    size,
                    size,
                    angle,
                );
            });
        });
    }
    group.finish();
}

fn bench_rotate_angle_512(c: &mut Criterion) {
    let mut group = c.benchmark_group("rotate_angle_512");
    let size = 512_usize;
    let input = bench_utils::create_test_image(size, size, ImageFormat::Rgb);
    let mut output = vec![0u8; size * size * 3];
    for angle in bench_utils::BENCH_ANGLES {
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_function(BenchmarkId::from_parameter(angle), |b| {
            b.iter(|| {
                rotate_image_bilinear(
                    black_box(input.as_slice()),
                    black_box(&mut output),
                    size,
                    size,
                    size,
                    size,
                    angle.to_radians(),
                );
            });
        });
    }
    group.finish();
}

fn bench_scan_line_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_line_width_1deg");
    let page = bench_utils::create_ruled_page(2200, 400, 24);
    let setup = bench_utils::line_setup_for_angle(1.0);
    for width in bench_utils::BENCH_LINE_WIDTHS {
        let params = LineScanParams {
            img_width: page.width(),
            start_x: 60,
            start_y: 100,
            width,
            setup,
            white_threshold: 200,
        };
        group.throughput(Throughput::Elements(width as u64));
        group.bench_function(BenchmarkId::from_parameter(width), |b| {
            b.iter(|| scan_line(black_box(&params), black_box(page.as_slice())));
        });
    }
    group.finish();
}

fn bench_scan_angle_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_angle_sweep");
    let page = bench_utils::create_ruled_page(1024, 512, 24);
    let width = 900_usize;
    let setups: Vec<_> = (-25..=25)
        .map(|tenths| bench_utils::line_setup_for_angle(tenths as f64 / 10.0))
        .collect();
    group.throughput(Throughput::Elements((width * setups.len()) as u64));
    group.bench_function("51_angles_900px", |b| {
        b.iter(|| {
            setups
                .iter()
                .map(|&setup| {
                    let params = LineScanParams {
                        img_width: page.width(),
                        start_x: 60,
                        start_y: 256,
                        width,
                        setup,
                        white_threshold: 200,
                    };
                    scan_line(&params, black_box(page.as_slice())).white
                })
                .sum::<usize>()
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_rotate_size_scaling,
    bench_rotate_angle_512,
    bench_scan_line_width,
    bench_scan_angle_sweep
);
criterion_main!(benches);

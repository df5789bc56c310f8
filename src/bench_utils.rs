//! Shared helpers for benchmarks and tests.

use crate::{Image, ImageFormat, LineSetup};

pub const BENCH_SIZES: [usize; 4] = [256, 512, 1024, 2048];
pub const BENCH_ANGLES: [f64; 4] = [0.5, 2.5, 15.0, 45.0];
pub const BENCH_LINE_WIDTHS: [usize; 3] = [64, 512, 2048];

/// Gradient test pattern: each channel ramps along x with a per-channel slope in y.
pub fn create_test_image(width: usize, height: usize, format: ImageFormat) -> Image {
    let mut img = Image::new(width, height, format);
    let channels = img.channels();
    for y in 0..height {
        let row = img.row_mut(y);
        for x in 0..width {
            for c in 0..channels {
                let val = (x + y * c) as f64 / (width + height) as f64;
                row[x * channels + c] = (val * (u8::MAX as f64)) as u8;
            }
        }
    }
    img
}

/// Gray page with dark one-pixel text rules every `spacing` rows.
pub fn create_ruled_page(width: usize, height: usize, spacing: usize) -> Image {
    let mut img = Image::new(width, height, ImageFormat::Gray);
    img.fill_u8(255, 255, 255);
    for y in (spacing..height).step_by(spacing.max(1)) {
        img.row_mut(y).fill(0);
    }
    img
}

/// Shallow-octant line parameters for an angle in degrees, in the convention
/// the scanner expects (`|angle| <= 45`).
pub fn line_setup_for_angle(degrees: f64) -> LineSetup {
    let radians = degrees.to_radians();
    let dx = 10000.0 * radians.cos();
    let dy = 10000.0 * radians.sin();
    let gradient = if dx != 0.0 {
        (dy * 65536.0 / dx) as i32
    } else {
        0
    };
    let step_y = if dy < 0.0 { -1 } else { 1 };
    LineSetup::new(dx.abs() as i32, dy.abs() as i32, step_y, gradient)
}

//! Arbitrary-angle image rotation with fixed-point bilinear interpolation.
//!
//! # Algorithm Overview
//!
//! 1. **Inverse mapping**: every output pixel is mapped back into the source
//!    by rotating its offset from the output centre by `-angle` and adding
//!    the source centre. Centres are `((w - 1) / 2, (h - 1) / 2)`, so equal
//!    sized images at angle 0 map pixel centres onto pixel centres.
//!
//! 2. **Neighbourhood check**: a sample needs the full 2x2 block at
//!    `(floor(x), floor(y))`. Anything else, including the whole last source
//!    row and column, is painted with the background (opaque white for the
//!    raw kernel).
//!
//! 3. **Fixed-point weights**: the fractional position is converted to
//!    Q16.16 and the four bilinear weights are formed with 64-bit products.
//!    Each channel is accumulated in 32 bits and rounded to nearest with
//!    `+ 0x8000` before the final shift.
//!
//! Output pixels are independent of each other, so any row range of the
//! output can be produced in isolation.

use log::debug;

use crate::error::Error;
use crate::fixed;
use crate::image::{Image, ImageFormat, MAX_VALUE};

/// Channels per pixel handled by the rotator.
pub const CHANNELS: usize = 3;

/// Colour used for samples without a full 2x2 source neighbourhood.
pub const WHITE: [u8; CHANNELS] = [MAX_VALUE; CHANNELS];

const ERROR_RANGE: f64 = 1e-9;

/// Bilinear weights `[w00, w10, w01, w11]` for Q16.16 fractions `fx`, `fy`.
///
/// `w10` weighs the right neighbour, `w01` the lower one. The weights sum to
/// at most [`fixed::ONE`]; truncation can lose up to three units.
#[inline(always)]
pub fn bilinear_weights(fx: i32, fy: i32) -> [i32; 4] {
    let one_minus_x = fixed::ONE - fx;
    let one_minus_y = fixed::ONE - fy;
    [
        fixed::mul(one_minus_x, one_minus_y),
        fixed::mul(fx, one_minus_y),
        fixed::mul(one_minus_x, fy),
        fixed::mul(fx, fy),
    ]
}

/// Blends one channel of a 2x2 block `[p00, p10, p01, p11]`.
#[inline(always)]
pub fn blend_channel(corners: [u8; 4], weights: [i32; 4]) -> u8 {
    let sum = corners[0] as i32 * weights[0]
        + corners[1] as i32 * weights[1]
        + corners[2] as i32 * weights[2]
        + corners[3] as i32 * weights[3];
    ((sum + fixed::HALF) >> fixed::SHIFT) as u8
}

/// Samples an RGB buffer at a real-valued position.
///
/// Returns [`WHITE`] when `(floor(x), floor(y))` has no full 2x2
/// neighbourhood inside the `width` x `height` image.
#[inline(always)]
pub fn sample_bilinear(input: &[u8], width: usize, height: usize, x: f64, y: f64) -> [u8; 3] {
    sample_bilinear_or(input, width, height, x, y, WHITE)
}

#[inline(always)]
fn sample_bilinear_or(
    input: &[u8],
    width: usize,
    height: usize,
    x: f64,
    y: f64,
    background: [u8; 3],
) -> [u8; 3] {
    let x_floor = x.floor();
    let y_floor = y.floor();
    let x0 = x_floor as i64;
    let y0 = y_floor as i64;

    if x0 < 0 || y0 < 0 || x0 >= width as i64 - 1 || y0 >= height as i64 - 1 {
        return background;
    }

    let weights = bilinear_weights(
        fixed::from_fraction(x - x_floor),
        fixed::from_fraction(y - y_floor),
    );

    let stride = width * CHANNELS;
    let p00 = y0 as usize * stride + x0 as usize * CHANNELS;
    let p10 = p00 + CHANNELS;
    let p01 = p00 + stride;
    let p11 = p01 + CHANNELS;

    let mut out = [0u8; CHANNELS];
    for (c, value) in out.iter_mut().enumerate() {
        *value = blend_channel(
            [input[p00 + c], input[p10 + c], input[p01 + c], input[p11 + c]],
            weights,
        );
    }
    out
}

/// Maps output pixel positions back into the source image.
#[derive(Copy, Clone, Debug)]
pub struct InverseRotation {
    cos: f64,
    sin: f64,
    cx_input: f64,
    cy_input: f64,
    cx_output: f64,
    cy_output: f64,
}

impl InverseRotation {
    pub fn new(
        input_width: usize,
        input_height: usize,
        output_width: usize,
        output_height: usize,
        angle_radians: f64,
    ) -> Self {
        Self {
            cos: angle_radians.cos(),
            sin: angle_radians.sin(),
            cx_input: (input_width as f64 - 1.0) / 2.0,
            cy_input: (input_height as f64 - 1.0) / 2.0,
            cx_output: (output_width as f64 - 1.0) / 2.0,
            cy_output: (output_height as f64 - 1.0) / 2.0,
        }
    }

    /// Source coordinates for output pixel `(x, y)`.
    #[inline(always)]
    pub fn source(&self, x: usize, y: usize) -> (f64, f64) {
        let x_rel = x as f64 - self.cx_output;
        let y_rel = y as f64 - self.cy_output;
        (
            x_rel * self.cos + y_rel * self.sin + self.cx_input,
            -x_rel * self.sin + y_rel * self.cos + self.cy_input,
        )
    }
}

/// Rotates an RGB buffer by `angle_radians` into a caller-allocated buffer.
///
/// `input` holds `input_width * input_height` interleaved RGB pixels and
/// `output` must hold `output_width * output_height` of them. Every output
/// pixel is written; pixels without a source neighbourhood become white.
///
/// # Panics
///
/// Panics if either buffer length does not match its dimensions.
pub fn rotate_image_bilinear(
    input: &[u8],
    output: &mut [u8],
    input_width: usize,
    input_height: usize,
    output_width: usize,
    output_height: usize,
    angle_radians: f64,
) {
    assert_eq!(
        input.len(),
        input_width * input_height * CHANNELS,
        "input buffer does not match {input_width}x{input_height} RGB"
    );
    assert_eq!(
        output.len(),
        output_width * output_height * CHANNELS,
        "output buffer does not match {output_width}x{output_height} RGB"
    );
    let rotation = InverseRotation::new(
        input_width,
        input_height,
        output_width,
        output_height,
        angle_radians,
    );
    process_pixels(
        input,
        output,
        (input_width, input_height),
        output_width,
        &rotation,
        WHITE,
    );
}

fn process_pixels(
    input: &[u8],
    output: &mut [u8],
    (input_width, input_height): (usize, usize),
    output_width: usize,
    rotation: &InverseRotation,
    background: [u8; 3],
) {
    let output_stride = output_width * CHANNELS;
    if output_stride == 0 {
        return;
    }
    for (y, row) in output.chunks_exact_mut(output_stride).enumerate() {
        for (x, dst) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let (src_x, src_y) = rotation.source(x, y);
            let rgb =
                sample_bilinear_or(input, input_width, input_height, src_x, src_y, background);
            dst.copy_from_slice(&rgb);
        }
    }
}

/// Direction of rotation.
///
/// - `Cw`: Clockwise rotation (positive angle rotates top toward right)
/// - `Ccw`: Counter-clockwise rotation (positive angle rotates top toward left)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RotateDirection {
    Cw,
    Ccw,
}

/// Bilinear rotation operator over RGB [`Image`]s.
///
/// # Output Size
///
/// The output keeps the source dimensions, except that width and height are
/// swapped when the angle is closer to a quarter turn than to upright
/// (strictly between 45° and 135° in magnitude).
///
/// # Background Color
///
/// Pixels without a full source neighbourhood are filled with the background
/// color. Default: white, matching [`rotate_image_bilinear`]. Use
/// [`set_background_color`] to customize.
///
/// [`set_background_color`]: OpRotateBilinear::set_background_color
#[derive(Clone, Debug)]
pub struct OpRotateBilinear {
    angle: f64,
    angle_degrees: f64,
    direction: RotateDirection,
    background: [u8; 3],
}

impl Default for OpRotateBilinear {
    fn default() -> Self {
        Self::new()
    }
}

impl OpRotateBilinear {
    pub fn new() -> Self {
        Self {
            angle: 0.0,
            angle_degrees: 0.0,
            direction: RotateDirection::Cw,
            background: WHITE,
        }
    }

    /// Sets the rotation angle and direction.
    ///
    /// The angle is normalized to the range (-180°, 180°].
    pub fn set_rotation(&mut self, angle_degrees: f64, direction: RotateDirection) -> &mut Self {
        let mut angle = normalize_angle(angle_degrees);

        self.direction = direction;
        if self.direction == RotateDirection::Ccw {
            angle = -angle;
        }

        self.angle_degrees = angle;
        self.angle = angle.to_radians();
        self
    }

    /// Sets the color for areas outside the rotated image.
    pub fn set_background_color(&mut self, r: u8, g: u8, b: u8) -> &mut Self {
        self.background = [r, g, b];
        self
    }

    /// Signed clockwise angle in radians, after normalization and direction.
    pub fn angle_radians(&self) -> f64 {
        self.angle
    }

    pub fn direction(&self) -> RotateDirection {
        self.direction
    }

    pub fn compute_output_dimensions(&self, src: &Image) -> (usize, usize) {
        let degrees = self.angle_degrees.abs();
        if degrees > 45.0 + ERROR_RANGE && degrees < 135.0 - ERROR_RANGE {
            (src.height(), src.width())
        } else {
            (src.width(), src.height())
        }
    }

    pub fn apply(&self, src: &Image) -> Result<Image, Error> {
        let (out_w, out_h) = self.compute_output_dimensions(src);
        let mut dst = Image::new(out_w, out_h, ImageFormat::Rgb);
        self.apply_to_preallocated(src, &mut dst)?;
        Ok(dst)
    }

    pub fn apply_to_preallocated(&self, src: &Image, dst: &mut Image) -> Result<(), Error> {
        require_rgb(src)?;
        require_rgb(dst)?;

        debug!(
            "rotate {}x{} -> {}x{} by {:.3} deg, background {:?}",
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
            self.angle_degrees,
            self.background
        );

        let rotation = InverseRotation::new(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
            self.angle,
        );
        let input_dims = (src.width(), src.height());
        let output_width = dst.width();
        process_pixels(
            src.as_slice(),
            dst.as_mut_slice(),
            input_dims,
            output_width,
            &rotation,
            self.background,
        );
        Ok(())
    }
}

fn require_rgb(img: &Image) -> Result<(), Error> {
    if img.format() == ImageFormat::Rgb {
        Ok(())
    } else {
        Err(Error::UnsupportedFormat {
            expected: ImageFormat::Rgb,
            actual: img.format(),
        })
    }
}

fn normalize_angle(angle_degrees: f64) -> f64 {
    angle_degrees - (angle_degrees / 360.0 - 0.5).ceil() * 360.0
}

//! Sub-pixel Bresenham line scanning with white/black classification.
//!
//! # Algorithm Overview
//!
//! A line is walked one column at a time with integer Bresenham stepping.
//! Alongside the integer row `y`, a Q16.16 accumulator `blend` tracks how far
//! the ideal line sits above (negative) or below (non-negative) the centre of
//! row `y`. Each sample is linearly interpolated toward that neighbouring row
//! by `|blend|` and compared against a threshold.
//!
//! The stepping parameters ([`LineSetup`]) are computed by the caller and
//! must already be normalized to the shallow octant: the walk always advances
//! along +x, `0 <= dy <= dx`, and `step_y` carries the vertical direction.
//! Under that convention every iteration consumes exactly one column, so a
//! scan of `width` columns classifies exactly `width` samples.
//!
//! # Buffer Contract
//!
//! The scanner reads the current row and one neighbouring row for every
//! sample, including the row below when `blend` is exactly zero. Callers must
//! keep one row of margin above and below the walked rows. Reads are slice
//! indexed: a violated contract panics rather than reading foreign memory.

use std::iter::{FusedIterator, Sum};
use std::ops::{Add, AddAssign};

use log::debug;

use crate::error::Error;
use crate::fixed;
use crate::image::{Image, ImageFormat};

/// Pre-computed Bresenham parameters for a shallow line.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LineSetup {
    /// Horizontal delta. Must be positive.
    pub dx: i32,
    /// Vertical delta magnitude, `0 <= dy <= dx`.
    pub dy: i32,
    /// Vertical direction, `1` (down) or `-1` (up).
    pub step_y: i32,
    /// Per-column change of the sub-pixel offset, Q16.16.
    pub gradient: i32,
}

impl LineSetup {
    pub fn new(dx: i32, dy: i32, step_y: i32, gradient: i32) -> Self {
        Self {
            dx,
            dy,
            step_y,
            gradient,
        }
    }

    /// A perfectly horizontal line.
    pub fn horizontal() -> Self {
        Self::new(1, 0, 1, 0)
    }

    /// True when the setup follows the shallow-octant convention.
    pub fn is_normalized(&self) -> bool {
        self.dx > 0 && 0 <= self.dy && self.dy <= self.dx && self.step_y.abs() == 1
    }

    fn assert_normalized(&self) {
        assert!(self.dx > 0, "line setup needs dx > 0, got {}", self.dx);
        assert!(
            0 <= self.dy && self.dy <= self.dx,
            "line setup needs 0 <= dy <= dx, got dx={} dy={}",
            self.dx,
            self.dy
        );
        assert!(
            self.step_y == 1 || self.step_y == -1,
            "line setup needs step_y of +1 or -1, got {}",
            self.step_y
        );
    }
}

/// One position visited by [`SubpixelLine`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineStep {
    pub x: isize,
    pub y: isize,
    /// Sub-pixel offset from row `y`, Q16.16. Negative means toward `y - 1`.
    pub blend: i32,
}

impl LineStep {
    /// Row to interpolate toward and the Q16.16 weight given to it.
    #[inline(always)]
    pub fn neighbor(&self) -> (isize, i32) {
        if self.blend < 0 {
            (self.y - 1, -self.blend)
        } else {
            (self.y + 1, self.blend)
        }
    }
}

/// Iterator over the Bresenham walk with its sub-pixel vertical offset.
///
/// Yields one [`LineStep`] per column from `start_x` up to (but excluding)
/// `start_x + width`.
#[derive(Clone, Debug)]
pub struct SubpixelLine {
    setup: LineSetup,
    err: i32,
    x: isize,
    y: isize,
    end_x: isize,
    blend: i32,
}

impl SubpixelLine {
    /// Starts a walk at `(start_x, start_y)`.
    ///
    /// # Panics
    ///
    /// Panics if `setup` is not normalized to the shallow octant (see
    /// [`LineSetup`]); such a walk would not terminate after `width` columns.
    pub fn new(start_x: isize, start_y: isize, width: usize, setup: LineSetup) -> Self {
        setup.assert_normalized();
        Self {
            setup,
            err: setup.dx - setup.dy,
            x: start_x,
            y: start_y,
            end_x: start_x + width as isize,
            blend: 0,
        }
    }
}

impl Iterator for SubpixelLine {
    type Item = LineStep;

    #[inline]
    fn next(&mut self) -> Option<LineStep> {
        if self.x >= self.end_x {
            return None;
        }
        let step = LineStep {
            x: self.x,
            y: self.y,
            blend: self.blend,
        };

        let LineSetup {
            dx,
            dy,
            step_y,
            gradient,
        } = self.setup;
        let e2 = 2 * self.err;
        if e2 > -dy {
            self.err -= dy;
            self.x += 1;
        }
        if e2 < dx {
            self.err += dx;
            self.y += step_y as isize;
            self.blend -= step_y << fixed::SHIFT;
        }
        self.blend += gradient;

        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end_x - self.x).max(0) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SubpixelLine {}

impl FusedIterator for SubpixelLine {}

/// Full parameter block for [`scan_line`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LineScanParams {
    /// Row stride of the single-channel buffer, in pixels.
    pub img_width: usize,
    pub start_x: usize,
    pub start_y: usize,
    /// Number of columns to sample.
    pub width: usize,
    pub setup: LineSetup,
    /// Blended values strictly above this are white.
    pub white_threshold: i32,
}

/// Classification counts produced by a scan.
///
/// Counts from disjoint scans can be merged with `+` or [`Iterator::sum`],
/// which is how parallel callers reduce per-worker results.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LineScan {
    pub white: usize,
    pub black: usize,
    /// Number of white/black changes between consecutive samples. Kept apart
    /// from the counts; it never influences them.
    pub transitions: usize,
}

impl LineScan {
    /// Total number of classified samples.
    pub fn samples(&self) -> usize {
        self.white + self.black
    }

    /// Fraction of white samples, `0.0` for an empty scan.
    pub fn white_fraction(&self) -> f64 {
        let total = self.samples();
        if total == 0 {
            0.0
        } else {
            self.white as f64 / total as f64
        }
    }
}

impl Add for LineScan {
    type Output = LineScan;

    fn add(self, rhs: LineScan) -> LineScan {
        LineScan {
            white: self.white + rhs.white,
            black: self.black + rhs.black,
            transitions: self.transitions + rhs.transitions,
        }
    }
}

impl AddAssign for LineScan {
    fn add_assign(&mut self, rhs: LineScan) {
        *self = *self + rhs;
    }
}

impl Sum for LineScan {
    fn sum<I: Iterator<Item = LineScan>>(iter: I) -> Self {
        iter.fold(LineScan::default(), Add::add)
    }
}

/// Blends the sample at `step` toward its neighbouring row.
///
/// `pixels` is a single-channel buffer with row stride `img_width`.
#[inline(always)]
pub fn blended_sample(pixels: &[u8], img_width: usize, step: &LineStep) -> i32 {
    let stride = img_width as isize;
    let (neighbor_y, weight) = step.neighbor();
    let va = pixels[buffer_index(step.y * stride + step.x)] as i32;
    let vb = pixels[buffer_index(neighbor_y * stride + step.x)] as i32;
    fixed::lerp(va, vb, weight)
}

#[inline(always)]
fn buffer_index(index: isize) -> usize {
    assert!(index >= 0, "line scan read before the start of the buffer");
    index as usize
}

/// Walks `params.width` columns and classifies each blended sample.
///
/// # Panics
///
/// Panics if `img_width` is zero, if the setup is not normalized (see
/// [`SubpixelLine::new`]), or if the walk reads outside `pixels`.
pub fn scan_line(params: &LineScanParams, pixels: &[u8]) -> LineScan {
    assert!(params.img_width > 0, "line scan needs a non-zero row stride");

    let line = SubpixelLine::new(
        params.start_x as isize,
        params.start_y as isize,
        params.width,
        params.setup,
    );

    let mut scan = LineScan::default();
    let mut previous_white = None;
    for step in line {
        let is_white = blended_sample(pixels, params.img_width, &step) > params.white_threshold;
        if is_white {
            scan.white += 1;
        } else {
            scan.black += 1;
        }
        if previous_white.is_some_and(|prev| prev != is_white) {
            scan.transitions += 1;
        }
        previous_white = Some(is_white);
    }
    scan
}

/// Returns the lowest and highest rows a scan will read, neighbours included.
///
/// Returns `None` for an empty scan.
pub fn rows_touched(params: &LineScanParams) -> Option<(isize, isize)> {
    SubpixelLine::new(
        params.start_x as isize,
        params.start_y as isize,
        params.width,
        params.setup,
    )
    .map(|step| {
        let (neighbor_y, _) = step.neighbor();
        (step.y.min(neighbor_y), step.y.max(neighbor_y))
    })
    .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
}

/// Line scanning operator over grayscale [`Image`]s.
///
/// Unlike [`scan_line`], [`OpScanLine::apply`] checks the image format and the
/// rows and columns the walk will touch before reading any pixel.
#[derive(Copy, Clone, Debug)]
pub struct OpScanLine {
    setup: LineSetup,
    white_threshold: i32,
}

impl Default for OpScanLine {
    fn default() -> Self {
        Self::new()
    }
}

impl OpScanLine {
    pub fn new() -> Self {
        Self {
            setup: LineSetup::horizontal(),
            white_threshold: 127,
        }
    }

    pub fn set_line_setup(&mut self, setup: LineSetup) -> &mut Self {
        self.setup = setup;
        self
    }

    pub fn set_white_threshold(&mut self, white_threshold: i32) -> &mut Self {
        self.white_threshold = white_threshold;
        self
    }

    pub fn line_setup(&self) -> LineSetup {
        self.setup
    }

    pub fn white_threshold(&self) -> i32 {
        self.white_threshold
    }

    /// Builds the raw kernel parameters for a scan of `img`.
    pub fn params(
        &self,
        img: &Image,
        start_x: usize,
        start_y: usize,
        width: usize,
    ) -> LineScanParams {
        LineScanParams {
            img_width: img.width(),
            start_x,
            start_y,
            width,
            setup: self.setup,
            white_threshold: self.white_threshold,
        }
    }

    /// Scans `width` columns of `img` starting at `(start_x, start_y)`.
    pub fn apply(
        &self,
        img: &Image,
        start_x: usize,
        start_y: usize,
        width: usize,
    ) -> Result<LineScan, Error> {
        if img.format() != ImageFormat::Gray {
            return Err(Error::UnsupportedFormat {
                expected: ImageFormat::Gray,
                actual: img.format(),
            });
        }
        if !self.setup.is_normalized() {
            return Err(Error::InvalidLineSetup);
        }
        if width == 0 {
            return Ok(LineScan::default());
        }

        match start_x.checked_add(width) {
            Some(end_x) if end_x <= img.width() => {}
            _ => return Err(Error::OutOfBounds),
        }
        let params = self.params(img, start_x, start_y, width);
        match rows_touched(&params) {
            Some((top, bottom)) if top < 0 || bottom >= img.height() as isize => {
                return Err(Error::OutOfBounds);
            }
            _ => {}
        }

        let scan = scan_line(&params, img.as_slice());
        debug!(
            "scan_line start=({start_x}, {start_y}) width={width} gradient={:.5} -> white={} black={} transitions={}",
            fixed::to_f64(self.setup.gradient),
            scan.white,
            scan.black,
            scan.transitions
        );
        Ok(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_band_image() -> Vec<u8> {
        // rows of 0, 100 and 200
        let mut pixels = vec![0u8; 12];
        pixels[4..8].fill(100);
        pixels[8..12].fill(200);
        pixels
    }

    #[test]
    fn test_walk_with_vertical_steps() {
        let setup = LineSetup::new(2, 1, 1, fixed::HALF);
        let steps: Vec<_> = SubpixelLine::new(0, 0, 4, setup).collect();
        let step = |x, y, blend| LineStep { x, y, blend };
        let expected = [
            step(0, 0, 0),
            step(1, 0, fixed::HALF),
            step(2, 1, 0),
            step(3, 1, fixed::HALF),
        ];
        assert_eq!(steps, expected);
    }

    #[test]
    fn test_walk_upward() {
        let setup = LineSetup::new(2, 1, -1, -fixed::HALF);
        let ys: Vec<_> = SubpixelLine::new(0, 5, 4, setup).map(|s| s.y).collect();
        assert_eq!(ys, vec![5, 5, 4, 4]);
    }

    #[test]
    fn test_walk_exact_size() {
        let line = SubpixelLine::new(3, 0, 7, LineSetup::new(10, 3, 1, 0));
        assert_eq!(line.len(), 7);
        assert_eq!(line.count(), 7);
    }

    #[test]
    fn test_neighbor_selection() {
        let below = LineStep {
            x: 0,
            y: 3,
            blend: 0,
        };
        assert_eq!(below.neighbor(), (4, 0));
        let above = LineStep {
            x: 0,
            y: 3,
            blend: -100,
        };
        assert_eq!(above.neighbor(), (2, 100));
    }

    #[test]
    fn test_blend_toward_row_below() {
        let params = LineScanParams {
            img_width: 4,
            start_x: 0,
            start_y: 1,
            width: 4,
            setup: LineSetup::new(4, 0, 1, fixed::ONE / 4),
            white_threshold: 130,
        };
        // blended: 100, 125, 150, 175
        let scan = scan_line(&params, &three_band_image());
        assert_eq!(
            scan,
            LineScan {
                white: 2,
                black: 2,
                transitions: 1
            }
        );
    }

    #[test]
    fn test_blend_toward_row_above() {
        let params = LineScanParams {
            img_width: 4,
            start_x: 0,
            start_y: 1,
            width: 4,
            setup: LineSetup::new(4, 0, 1, -fixed::ONE / 4),
            white_threshold: 60,
        };
        // blended: 100, 75, 50, 25
        let scan = scan_line(&params, &three_band_image());
        assert_eq!(scan.white, 2);
        assert_eq!(scan.black, 2);
        assert_eq!(scan.transitions, 1);
    }

    #[test]
    fn test_threshold_is_strict() {
        let pixels = vec![127u8; 8];
        let params = LineScanParams {
            img_width: 4,
            start_x: 0,
            start_y: 0,
            width: 4,
            setup: LineSetup::horizontal(),
            white_threshold: 127,
        };
        let scan = scan_line(&params, &pixels);
        assert_eq!(scan.white, 0);
        assert_eq!(scan.black, 4);
    }

    #[test]
    fn test_transitions_alternate() {
        let mut pixels = vec![0u8; 12];
        for x in (0..6).step_by(2) {
            pixels[x] = 255;
        }
        let params = LineScanParams {
            img_width: 6,
            start_x: 0,
            start_y: 0,
            width: 6,
            setup: LineSetup::horizontal(),
            white_threshold: 127,
        };
        let scan = scan_line(&params, &pixels);
        assert_eq!(scan.white, 3);
        assert_eq!(scan.black, 3);
        assert_eq!(scan.transitions, 5);
    }

    #[test]
    fn test_scan_sum() {
        let a = LineScan {
            white: 3,
            black: 1,
            transitions: 1,
        };
        let b = LineScan {
            white: 2,
            black: 4,
            transitions: 3,
        };
        let total: LineScan = [a, b].into_iter().sum();
        assert_eq!(total.samples(), 10);
        assert_eq!(total.transitions, 4);
        assert!((total.white_fraction() - 0.5).abs() < 1e-12);
        assert_eq!(LineScan::default().white_fraction(), 0.0);
    }

    #[test]
    fn test_rows_touched() {
        let params = LineScanParams {
            img_width: 8,
            start_x: 0,
            start_y: 2,
            width: 4,
            setup: LineSetup::new(2, 1, 1, fixed::HALF),
            white_threshold: 0,
        };
        assert_eq!(rows_touched(&params), Some((2, 4)));
        let empty = LineScanParams { width: 0, ..params };
        assert_eq!(rows_touched(&empty), None);
    }

    #[test]
    #[should_panic]
    fn test_steep_setup_panics() {
        let _ = SubpixelLine::new(0, 0, 4, LineSetup::new(1, 2, 1, 0));
    }

    #[test]
    #[should_panic]
    fn test_zero_dx_panics() {
        let _ = SubpixelLine::new(0, 0, 4, LineSetup::new(0, 0, 1, 0));
    }

    #[test]
    #[should_panic]
    fn test_read_past_buffer_panics() {
        let params = LineScanParams {
            img_width: 4,
            start_x: 0,
            start_y: 0,
            width: 4,
            setup: LineSetup::horizontal(),
            white_threshold: 0,
        };
        // no row below row 0
        let _ = scan_line(&params, &[0u8; 4]);
    }

    #[test]
    fn test_op_rejects_rgb() {
        let img = Image::new(4, 4, ImageFormat::Rgb);
        let err = OpScanLine::new().apply(&img, 0, 1, 4).unwrap_err();
        assert_eq!(
            err,
            Error::UnsupportedFormat {
                expected: ImageFormat::Gray,
                actual: ImageFormat::Rgb
            }
        );
    }

    #[test]
    fn test_op_rejects_steep_setup() {
        let img = Image::new(4, 4, ImageFormat::Gray);
        let mut op = OpScanLine::new();
        op.set_line_setup(LineSetup::new(1, 2, 1, 0));
        assert_eq!(op.apply(&img, 0, 1, 2), Err(Error::InvalidLineSetup));
        assert!(!LineSetup::new(4, 1, 0, 0).is_normalized());
        assert!(LineSetup::new(4, 4, -1, 0).is_normalized());
    }

    #[test]
    fn test_op_checks_bounds() {
        let img = Image::new(4, 4, ImageFormat::Gray);
        let op = OpScanLine::new();
        assert_eq!(op.apply(&img, 1, 1, 4), Err(Error::OutOfBounds));
        assert_eq!(op.apply(&img, 0, 3, 4), Err(Error::OutOfBounds));
        assert!(op.apply(&img, 0, 2, 4).is_ok());
        assert_eq!(op.apply(&img, 0, 0, 0), Ok(LineScan::default()));
    }
}

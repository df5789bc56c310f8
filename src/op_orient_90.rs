//! Exact quarter-turn reorientation.
//!
//! Quarter turns are pure coordinate remapping, so no interpolation and no
//! background fill is involved. The line scanner only walks shallow lines;
//! turning a page by 90° first lets it measure near-vertical structure too.

use log::debug;

use crate::error::Error;
use crate::image::Image;

/// Quarter-turn orientations.
///
/// ```text
/// Up              Right           Down            Left
/// ┌───────┐       ┌───────┐       ┌───────┐       ┌───────┐
/// │ 1   2 │       │ 3   1 │       │ 4   3 │       │ 2   4 │
/// │       │       │       │       │       │       │       │
/// │ 3   4 │       │ 4   2 │       │ 2   1 │       │ 1   3 │
/// └───────┘       └───────┘       └───────┘       └───────┘
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orientation90 {
    Up,
    /// Clockwise quarter turn.
    Right,
    Down,
    /// Counter-clockwise quarter turn.
    Left,
}

impl Orientation90 {
    /// Maps a clockwise angle in degrees to an orientation, if it is an exact
    /// multiple of 90.
    pub fn from_degrees(degrees: i32) -> Option<Orientation90> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Orientation90::Up),
            90 => Some(Orientation90::Right),
            180 => Some(Orientation90::Down),
            _ => Some(Orientation90::Left),
        }
    }

    /// True when width and height trade places.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Orientation90::Right | Orientation90::Left)
    }
}

/// Quarter-turn operator using coordinate remapping.
#[derive(Copy, Clone, Debug)]
pub struct OpOrient90 {
    orientation: Orientation90,
}

impl Default for OpOrient90 {
    fn default() -> Self {
        Self {
            orientation: Orientation90::Up,
        }
    }
}

impl OpOrient90 {
    pub fn new(orientation: Orientation90) -> Self {
        Self { orientation }
    }

    pub fn set_orientation(&mut self, orientation: Orientation90) -> &mut Self {
        self.orientation = orientation;
        self
    }

    pub fn orientation(&self) -> Orientation90 {
        self.orientation
    }

    pub fn compute_output_dimensions(&self, src: &Image) -> (usize, usize) {
        if self.orientation.swaps_dimensions() {
            (src.height(), src.width())
        } else {
            (src.width(), src.height())
        }
    }

    pub fn apply(&self, original: &Image) -> Image {
        if self.orientation == Orientation90::Up {
            return original.clone();
        }

        let (out_w, out_h) = self.compute_output_dimensions(original);
        let mut result = Image::new(out_w, out_h, original.format());
        remap(original, &mut result, self.orientation);
        result
    }

    /// Writes the reoriented image into `dst`, which must already have the
    /// format of `original` and the dimensions from
    /// [`compute_output_dimensions`](Self::compute_output_dimensions).
    pub fn apply_to_preallocated(&self, original: &Image, dst: &mut Image) -> Result<(), Error> {
        let (out_w, out_h) = self.compute_output_dimensions(original);
        if dst.format() != original.format() || dst.width() != out_w || dst.height() != out_h {
            return Err(Error::SizeMismatch {
                expected: out_w * out_h * original.channels(),
                actual: dst.as_slice().len(),
            });
        }
        debug!(
            "orient {:?} {}x{} -> {}x{}",
            self.orientation,
            original.width(),
            original.height(),
            out_w,
            out_h
        );
        if self.orientation == Orientation90::Up {
            dst.as_mut_slice().copy_from_slice(original.as_slice());
        } else {
            remap(original, dst, self.orientation);
        }
        Ok(())
    }
}

fn remap(original: &Image, dst: &mut Image, orientation: Orientation90) {
    let max_x = dst.width().saturating_sub(1);
    let max_y = dst.height().saturating_sub(1);

    for y in 0..dst.height() {
        for x in 0..dst.width() {
            let (orig_x, orig_y) = get_original_coordinates(x, y, max_x, max_y, orientation);
            dst.pixel_mut(x, y)
                .copy_from_slice(original.pixel(orig_x, orig_y));
        }
    }
}

fn get_original_coordinates(
    x: usize,
    y: usize,
    max_x: usize,
    max_y: usize,
    orientation: Orientation90,
) -> (usize, usize) {
    match orientation {
        Orientation90::Up => (x, y),
        Orientation90::Right => (y, max_x - x),
        Orientation90::Down => (max_x - x, max_y - y),
        Orientation90::Left => (max_y - y, x),
    }
}

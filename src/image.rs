//! Image representation with row-major pixel storage.
//!
//! # Memory Layout
//!
//! Pixels are stored in a flat `u8` buffer in row-major order:
//!
//! ```text
//! data[y * stride + x * channels + c]
//! ```
//!
//! where `stride = width * channels`. This is exactly the layout the raw
//! kernels in [`crate::line_scan`] and [`crate::rotate`] consume, so
//! [`Image::as_slice`] can be passed to them directly.

use crate::error::Error;

/// 8-bit color sample.
pub type Sample = u8;

/// Maximum sample value (255).
pub const MAX_VALUE: Sample = u8::MAX;

/// Pixel format describing the number and meaning of channels.
///
/// Channel counts: `None`=0, `Gray`=1, `Rgb`=3.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    None,
    Gray,
    Rgb,
}

impl ImageFormat {
    /// Returns the number of channels for this format.
    pub fn channel_count(self) -> usize {
        match self {
            ImageFormat::None => 0,
            ImageFormat::Gray => 1,
            ImageFormat::Rgb => 3,
        }
    }
}

/// A 2D image stored as a flat array of 8-bit samples in row-major order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    format: ImageFormat,
    pub(crate) data: Vec<Sample>,
}

impl Image {
    /// Creates an empty image with no dimensions.
    pub fn new_empty() -> Self {
        Self::default()
    }

    /// Creates a new zero-filled image with the given dimensions and format.
    pub fn new(width: usize, height: usize, format: ImageFormat) -> Self {
        let len = width
            .saturating_mul(height)
            .saturating_mul(format.channel_count());
        Self {
            width,
            height,
            format,
            data: vec![0; len],
        }
    }

    /// Wraps an existing buffer. The length must be `width * height * channels`.
    pub fn from_vec(
        width: usize,
        height: usize,
        format: ImageFormat,
        data: Vec<Sample>,
    ) -> Result<Self, Error> {
        let expected = width * height * format.channel_count();
        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Resets the image to new dimensions and format, reallocating if needed.
    pub fn reset(&mut self, width: usize, height: usize, format: ImageFormat) {
        *self = Self::new(width, height, format);
    }

    /// Returns the pixel format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of channels per pixel.
    pub fn channels(&self) -> usize {
        self.format.channel_count()
    }

    /// Returns the row stride in samples (width * channels).
    pub fn stride(&self) -> usize {
        self.width * self.channels()
    }

    /// Returns the whole sample buffer.
    pub fn as_slice(&self) -> &[Sample] {
        &self.data
    }

    /// Returns the whole sample buffer mutably.
    pub fn as_mut_slice(&mut self) -> &mut [Sample] {
        &mut self.data
    }

    /// Consumes the image and returns its sample buffer.
    pub fn into_vec(self) -> Vec<Sample> {
        self.data
    }

    /// Returns the samples for row `y`.
    pub fn row(&self, y: usize) -> &[Sample] {
        let stride = self.stride();
        let start = y * stride;
        &self.data[start..start + stride]
    }

    /// Returns mutable samples for row `y`.
    pub fn row_mut(&mut self, y: usize) -> &mut [Sample] {
        let stride = self.stride();
        let start = y * stride;
        &mut self.data[start..start + stride]
    }

    /// Returns the samples for the pixel at (x, y).
    pub fn pixel(&self, x: usize, y: usize) -> &[Sample] {
        let channels = self.channels();
        let start = y * self.stride() + x * channels;
        &self.data[start..start + channels]
    }

    /// Returns mutable samples for the pixel at (x, y).
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [Sample] {
        let channels = self.channels();
        let start = y * self.stride() + x * channels;
        &mut self.data[start..start + channels]
    }

    /// Fills all pixels with an RGB color. Gray images receive its luma.
    pub fn fill_u8(&mut self, r: u8, g: u8, b: u8) {
        match self.format {
            ImageFormat::Gray => self.data.fill(luma(r, g, b)),
            ImageFormat::Rgb => {
                for pixel in self.data.chunks_exact_mut(3) {
                    pixel.copy_from_slice(&[r, g, b]);
                }
            }
            ImageFormat::None => {}
        }
    }

    /// Returns a single-channel copy suitable for the line scanner.
    ///
    /// RGB pixels are reduced with [`luma`]; gray images are cloned.
    pub fn to_gray(&self) -> Image {
        match self.format {
            ImageFormat::Gray => self.clone(),
            ImageFormat::None => Image::new(self.width, self.height, ImageFormat::None),
            ImageFormat::Rgb => {
                let data = self
                    .data
                    .chunks_exact(3)
                    .map(|p| luma(p[0], p[1], p[2]))
                    .collect();
                Image {
                    width: self.width,
                    height: self.height,
                    format: ImageFormat::Gray,
                    data,
                }
            }
        }
    }
}

/// Converts RGB to grayscale using ITU-R BT.601 luma coefficients
/// (77/256, 150/256, 29/256).
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let red_weight: u32 = 77;
    let green_weight: u32 = 150;
    let blue_weight: u32 = 29;
    ((red_weight * r as u32 + green_weight * g as u32 + blue_weight * b as u32) >> 8) as u8
}

//! Fixed-point pixel kernels for document deskewing.
//!
//! # Two Kernels
//!
//! - **Line scan** ([`scan_line`]): walks a shallow line across a grayscale
//!   buffer with Bresenham stepping, blends every sample toward the adjacent
//!   row by a Q16.16 sub-pixel offset, and counts white and black samples.
//!   Skew estimators call it once per candidate line and angle.
//! - **Bilinear rotation** ([`rotate_image_bilinear`]): fills an RGB output
//!   buffer by inverse-rotating every pixel into the source and sampling it
//!   with Q16.16 bilinear weights. Samples without a full 2x2 neighbourhood
//!   are white.
//!
//! Both kernels work on caller-owned slices, allocate nothing and keep no
//! state. [`OpScanLine`] and [`OpRotateBilinear`] wrap them for [`Image`]s
//! with format and bounds checks, and [`OpOrient90`] handles exact quarter
//! turns.
//!
//! # Example
//!
//! ```
//! use rusty_deskew::{Image, ImageFormat, LineSetup, OpRotateBilinear, OpScanLine, RotateDirection};
//!
//! // A white 64x32 RGB page
//! let mut page = Image::new(64, 32, ImageFormat::Rgb);
//! page.fill_u8(255, 255, 255);
//!
//! // Count white samples along a horizontal line through the middle
//! let gray = page.to_gray();
//! let mut scan = OpScanLine::new();
//! scan.set_line_setup(LineSetup::horizontal()).set_white_threshold(200);
//! let counts = scan.apply(&gray, 0, 16, 64).unwrap();
//! assert_eq!(counts.white, 64);
//!
//! // Straighten the page by 1.5 degrees counter-clockwise
//! let mut rotate = OpRotateBilinear::new();
//! rotate.set_rotation(1.5, RotateDirection::Ccw);
//! let straightened = rotate.apply(&page).unwrap();
//! assert_eq!(straightened.width(), 64);
//! ```

#[doc(hidden)]
pub mod bench_utils;
mod error;
pub mod fixed;
mod image;
pub mod line_scan;
mod op_orient_90;
pub mod rotate;

pub use crate::error::Error;
pub use crate::image::{Image, ImageFormat, MAX_VALUE, Sample, luma};
pub use crate::line_scan::{
    LineScan, LineScanParams, LineSetup, LineStep, OpScanLine, SubpixelLine, scan_line,
};
pub use crate::op_orient_90::{OpOrient90, Orientation90};
pub use crate::rotate::{OpRotateBilinear, RotateDirection, rotate_image_bilinear, sample_bilinear};

use std::fmt;

use crate::image::ImageFormat;

/// Errors reported by the image-level operators.
///
/// The raw kernels never return these; they treat bad geometry as a caller
/// bug and panic instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A buffer does not hold `width * height * channels` samples.
    SizeMismatch { expected: usize, actual: usize },
    /// A requested region or walk leaves the image.
    OutOfBounds,
    /// Line stepping parameters are not in the shallow-octant convention.
    InvalidLineSetup,
    /// The operator requires a different pixel format.
    UnsupportedFormat {
        expected: ImageFormat,
        actual: ImageFormat,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::InvalidLineSetup => {
                write!(f, "line setup must satisfy dx > 0, 0 <= dy <= dx, step_y = +-1")
            }
            Self::UnsupportedFormat { expected, actual } => {
                write!(f, "unsupported format: expected {expected:?}, got {actual:?}")
            }
        }
    }
}

impl std::error::Error for Error {}

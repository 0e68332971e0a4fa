//! Error types for spims.

use thiserror::Error;

/// Result alias for spims operations.
pub type SpimsResult<T> = std::result::Result<T, SpimsError>;

/// Errors that can occur when building images or configuring the matcher.
///
/// The matching entry points never return these: degenerate shapes and
/// numeric corner cases inside the search collapse to empty results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpimsError {
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is too small for the requested view.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Region of interest does not fit inside the image.
    #[error(
        "roi {width}x{height} at ({x}, {y}) is outside image {img_width}x{img_height}"
    )]
    RoiOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Correlation and RGB buffers of one picture disagree in extent.
    #[error("grey buffer is {gray_width}x{gray_height} but rgb buffer is {rgb_width}x{rgb_height}")]
    ShapeMismatch {
        gray_width: usize,
        gray_height: usize,
        rgb_width: usize,
        rgb_height: usize,
    },
    /// Decoded file is not one of the accepted formats.
    #[error("unsupported image format in {path}: {format}")]
    UnsupportedFormat { path: String, format: String },
    /// The codec could not open or decode the file.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

//! Error types for photowarp.

use thiserror::Error;

/// Result alias for photowarp operations.
pub type WarpResult<T> = std::result::Result<T, WarpError>;

/// Errors that can occur before a warp batch is evaluated.
///
/// Points that project outside the image are not errors; they are reported
/// through the batch validity flags.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WarpError {
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the image width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the image layout requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Parallel batch arrays do not have the same length.
    #[error("{what} has length {got}, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// Motion matrix buffer has an unsupported number of coefficients.
    #[error("invalid {kind} matrix: expected {expected} coefficients, got {got}")]
    InvalidMatrix {
        kind: &'static str,
        expected: &'static str,
        got: usize,
    },
    /// The running CPU lacks what the vectorized evaluator needs.
    #[error("unsupported hardware: {required} is not available")]
    UnsupportedHardware { required: &'static str },
    /// The requested behavior needs a cargo feature that is not enabled.
    #[error("feature `{0}` is not enabled")]
    FeatureDisabled(&'static str),
    /// Image decoding failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}

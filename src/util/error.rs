//! Error types for dicematch.

use thiserror::Error;

/// Result alias for dicematch operations.
pub type DiceMatchResult<T> = std::result::Result<T, DiceMatchError>;

/// Errors that can occur when running the detection pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DiceMatchError {
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is too small for the requested layout.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// The template library holds no templates, so nothing can be matched.
    #[error("template library is empty")]
    EmptyTemplateLibrary,
    /// Template labels must be pip counts starting at 1.
    #[error("invalid template label {label}")]
    InvalidLabel { label: u32 },
    /// A template has no intensity variation and cannot be correlated.
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// A configuration value is outside its valid domain.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Reading or decoding an image failed.
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
    /// The sweep was abandoned through its cancellation flag.
    #[error("detection cancelled")]
    Cancelled,
}

//! Error types for the vectorfield core.

use thiserror::Error;

/// Errors produced by field construction and reshaping.
///
/// Out-of-range index access is a programmer error and panics instead
/// (see the `# Panics` sections on the accessors); mutating a locked
/// field is a silent no-op, not an error.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Width or height was zero, or `width * height` overflowed `usize`.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A channel buffer did not match the field's `width * height` extent.
    #[error("channel length mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

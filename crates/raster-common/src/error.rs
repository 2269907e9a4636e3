//! Error types shared across the raster-warp crates.

use thiserror::Error;

/// Result type alias using RasterError.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors raised at the coordinate transform and extent seams.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("coordinate transform failed: {0}")]
    TransformFailed(String),

    #[error("CRS mismatch: expected {expected}, got {actual}")]
    CrsMismatch { expected: String, actual: String },

    #[error("invalid extent: {0}")]
    InvalidExtent(String),
}

impl RasterError {
    /// Create a TransformFailed error.
    pub fn transform_failed(msg: impl Into<String>) -> Self {
        Self::TransformFailed(msg.into())
    }

    /// Create a CrsMismatch error.
    pub fn crs_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::CrsMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an InvalidExtent error.
    pub fn invalid_extent(msg: impl Into<String>) -> Self {
        Self::InvalidExtent(msg.into())
    }
}

//! Error types for block access and providers.

use thiserror::Error;

/// Errors that can occur while reading, writing or assembling blocks.
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// Failed to read from a raster source.
    #[error("failed to read block: {0}")]
    ReadFailed(String),

    /// Failed to write to a raster source.
    #[error("failed to write block: {0}")]
    WriteFailed(String),

    /// A byte-range write would fall outside the block buffer.
    #[error("write of {len} bytes at offset {offset} exceeds buffer of {buffer} bytes")]
    OutOfBounds {
        len: usize,
        offset: usize,
        buffer: usize,
    },

    /// Invalid metadata in a raster source.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Storage/IO error.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Projection error.
    #[error("projection error: {0}")]
    ProjectionError(String),
}

impl ProcessorError {
    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Create a WriteFailed error.
    pub fn write_failed(msg: impl Into<String>) -> Self {
        Self::WriteFailed(msg.into())
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create a StorageError.
    pub fn storage_error(msg: impl Into<String>) -> Self {
        Self::StorageError(msg.into())
    }
}

impl From<std::io::Error> for ProcessorError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for ProcessorError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidMetadata(err.to_string())
    }
}

impl From<raster_common::RasterError> for ProcessorError {
    fn from(err: raster_common::RasterError) -> Self {
        Self::ProjectionError(err.to_string())
    }
}

/// Result type for raster processor operations.
pub type Result<T> = std::result::Result<T, ProcessorError>;

//! Error types for image metadata operations

use thiserror::Error;

/// Result type for image metadata operations
pub type ImageMetadataResult<T> = Result<T, ImageMetadataError>;

/// Errors that can occur during image metadata operations
#[derive(Error, Debug)]
pub enum ImageMetadataError {
    /// Query against the `images` table failed
    #[error("Image metadata query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// Generated filename collided with an existing row
    #[error("Image with filename already exists: {0}")]
    DuplicateFilename(String),
}

//! Error types for upload presigning

use thiserror::Error;

/// Result type for bucket operations
pub type BucketResult<T> = Result<T, BucketError>;

/// Errors that can occur while presigning uploads
#[derive(Error, Debug)]
pub enum BucketError {
    /// S3 request could not be signed
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Presigning configuration rejected
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

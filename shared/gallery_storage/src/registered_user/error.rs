//! Error types for registered user operations

use thiserror::Error;

/// Result type for registered user operations
pub type RegisteredUserResult<T> = Result<T, RegisteredUserError>;

/// Errors that can occur during registered user operations
#[derive(Error, Debug)]
pub enum RegisteredUserError {
    /// Query against the `registered_user` table failed
    #[error("Registered user query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// No row matched the subject
    #[error("User not found: {0}")]
    NotFound(String),
}

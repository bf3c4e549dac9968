//! Relational storage for the image gallery
//!
//! This crate owns the PostgreSQL schema and the repositories shared between the
//! API backend and the Cognito post-confirmation trigger.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Connection configuration and pool construction
pub mod config;
/// Image metadata records (`images` table)
pub mod image_metadata;
/// Registered user profiles (`registered_user` table)
pub mod registered_user;

/// In-memory repositories for tests
#[cfg(feature = "test-utils")]
pub mod memory;

pub use config::{DatabaseConfig, DatabaseConfigError, DatabaseCredentials};
pub use image_metadata::{
    ImageMetadataError, ImageMetadataRepository, ImageMetadataResult, ImageMetadataStorage,
    ImageRecord, NewImage,
};
pub use registered_user::{
    RegisteredUser, RegisteredUserError, RegisteredUserRepository, RegisteredUserResult,
    RegisteredUserStorage,
};

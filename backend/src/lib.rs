//! Image gallery API
//!
//! Issues presigned S3 upload URLs, records image metadata in PostgreSQL, serves
//! user profiles and the gallery catalog.

/// Gallery catalog, search and lightbox
pub mod gallery;

/// S3 upload presigning
pub mod media_storage;

/// Identity resolution and guards
pub mod middleware;

/// HTTP routes
pub mod routes;

/// Router assembly and entry points
pub mod server;

/// Configuration, errors and extractors
pub mod types;

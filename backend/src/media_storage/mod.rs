//! S3 upload presigning for gallery images
//!
//! Signing is a local computation against the configured credentials; no request
//! reaches S3 until the client uses the URL.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

mod error;

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::{presigning::PresigningConfig, Client as S3Client};
use tracing::debug;

pub use error::{BucketError, BucketResult};

/// Content type the upload URL is signed for
pub const UPLOAD_CONTENT_TYPE: &str = "image/*";

/// Media storage client for S3 upload URLs
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    presigned_url_expiry_secs: u64,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket receiving the uploads
    /// * `presigned_url_expiry_secs` - Lifetime of issued upload URLs
    #[must_use]
    pub const fn new(
        s3_client: Arc<S3Client>,
        bucket_name: String,
        presigned_url_expiry_secs: u64,
    ) -> Self {
        Self {
            s3_client,
            bucket_name,
            presigned_url_expiry_secs,
        }
    }

    /// Generates a write-only presigned URL for `key`
    ///
    /// # Errors
    ///
    /// Returns `BucketError::ConfigError` if the presigning config is rejected
    /// Returns `BucketError::S3Error` if the request cannot be signed
    pub async fn generate_presigned_put_url(&self, key: &str) -> BucketResult<String> {
        debug!("Generating presigned URL for object: {key}");

        let expires_in = Duration::from_secs(self.presigned_url_expiry_secs);
        let presigned_config = PresigningConfig::expires_in(expires_in).map_err(|e| {
            BucketError::ConfigError(format!("Failed to create presigning config: {e}"))
        })?;

        let presigned_request = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(UPLOAD_CONTENT_TYPE)
            .presigned(presigned_config)
            .await
            .map_err(|e| BucketError::S3Error(format!("Failed to generate presigned URL: {e}")))?;

        debug!("Generated presigned URL for object: {key}");

        Ok(presigned_request.uri().to_string())
    }
}

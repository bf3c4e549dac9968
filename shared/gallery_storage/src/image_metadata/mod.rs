//! Image metadata storage on PostgreSQL
//!
//! One row per issued upload. The opaque `uuid_filename` doubles as the S3 object
//! key and is never updated after insert.

mod error;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

pub use error::{ImageMetadataError, ImageMetadataResult};

/// A persisted image row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ImageRecord {
    /// Sequence identifier
    pub id: i64,
    /// Subject of the owning user
    pub sub: String,
    /// Opaque storage key
    pub uuid_filename: String,
    /// User supplied display name
    pub image_name: String,
    /// Optional description
    pub image_description: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Values needed to create an image row
#[derive(Debug, Clone)]
pub struct NewImage {
    /// Subject of the owning user
    pub sub: String,
    /// Opaque storage key
    pub uuid_filename: String,
    /// Display name, already trimmed and validated
    pub image_name: String,
    /// Optional description
    pub image_description: Option<String>,
}

/// Repository over the `images` table
#[async_trait]
pub trait ImageMetadataRepository: Send + Sync {
    /// Inserts a new image row and returns it with its generated id
    ///
    /// # Errors
    ///
    /// Returns `ImageMetadataError::DuplicateFilename` if the filename is taken,
    /// `ImageMetadataError::Database` for any other failure
    async fn insert(&self, image: &NewImage) -> ImageMetadataResult<ImageRecord>;

    /// Lists images owned by `sub`, newest first
    ///
    /// # Errors
    ///
    /// Returns `ImageMetadataError::Database` if the query fails
    async fn list_by_sub(&self, sub: &str) -> ImageMetadataResult<Vec<ImageRecord>>;
}

/// PostgreSQL backed image metadata storage
pub struct ImageMetadataStorage {
    pool: PgPool,
}

impl ImageMetadataStorage {
    /// Creates a new image metadata storage
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImageMetadataRepository for ImageMetadataStorage {
    async fn insert(&self, image: &NewImage) -> ImageMetadataResult<ImageRecord> {
        sqlx::query_as::<_, ImageRecord>(
            "INSERT INTO images (sub, uuid_filename, image_name, image_description, created_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             RETURNING id, sub, uuid_filename, image_name, image_description, created_at",
        )
        .bind(&image.sub)
        .bind(&image.uuid_filename)
        .bind(&image.image_name)
        .bind(&image.image_description)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                ImageMetadataError::DuplicateFilename(image.uuid_filename.clone())
            }
            other => other.into(),
        })
    }

    async fn list_by_sub(&self, sub: &str) -> ImageMetadataResult<Vec<ImageRecord>> {
        let records = sqlx::query_as::<_, ImageRecord>(
            "SELECT id, sub, uuid_filename, image_name, image_description, created_at \
             FROM images WHERE sub = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(sub)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

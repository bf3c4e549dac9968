use std::borrow::Cow;
use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use gallery_storage::{ImageMetadataRepository, ImageRecord, NewImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    media_storage::MediaStorage,
    middleware::AuthenticatedUser,
    types::{AppError, ValidatedJson},
};

/// Longest accepted display name, in characters after trimming
pub const MAX_IMAGE_NAME_CHARS: usize = 40;

fn validate_image_name(image_name: &str) -> Result<(), ValidationError> {
    let trimmed = image_name.trim();

    if trimmed.is_empty() {
        let mut error = ValidationError::new("image_name_required");
        error.message = Some(Cow::Borrowed("Image name is required"));
        return Err(error);
    }

    if trimmed.chars().count() > MAX_IMAGE_NAME_CHARS {
        let mut error = ValidationError::new("image_name_too_long");
        error.message = Some(Cow::Borrowed("Image name must be 40 characters or less"));
        return Err(error);
    }

    Ok(())
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlRequest {
    /// Display name, 1 to 40 characters after trimming
    #[validate(custom(function = "validate_image_name"))]
    pub image_name: String,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlResponse {
    pub success: bool,
    /// Write-only URL accepting a single `PUT` of the image
    pub presigned_url: String,
    /// Identifier of the created image record
    pub image_id: i64,
    /// Object key the upload lands under
    pub uuid_filename: String,
    pub message: String,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageSummary {
    pub id: i64,
    pub uuid_filename: String,
    pub image_name: String,
    pub image_description: Option<String>,
    /// RFC 3339 creation time
    pub created_at: String,
}

impl From<ImageRecord> for ImageSummary {
    fn from(record: ImageRecord) -> Self {
        Self {
            id: record.id,
            uuid_filename: record.uuid_filename,
            image_name: record.image_name,
            image_description: record.image_description,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ImageListResponse {
    pub images: Vec<ImageSummary>,
}

/// Issues a presigned upload URL and records the image
///
/// 1. Generates a random UUID as the object key
/// 2. Presigns a `PUT` for that key, valid for the configured expiry
/// 3. Inserts the metadata row owned by the caller
///
/// If the insert fails the URL is dropped but stays valid until it expires; an
/// upload made with it leaves an object without a record. The key is logged so
/// such objects can be traced and removed.
///
/// # Errors
///
/// - `401 UNAUTHORIZED` - No identity on the request
/// - `400 BAD_REQUEST` - Invalid body or display name
/// - `500 INTERNAL_SERVER_ERROR` - Presigning or the insert failed
#[instrument(skip_all, fields(sub = %user.sub))]
pub async fn create_presigned_url(
    Extension(media_storage): Extension<Arc<MediaStorage>>,
    Extension(images): Extension<Arc<dyn ImageMetadataRepository>>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<PresignedUrlRequest>,
) -> Result<Json<PresignedUrlResponse>, AppError> {
    let uuid_filename = Uuid::new_v4().to_string();

    let presigned_url = media_storage
        .generate_presigned_put_url(&uuid_filename)
        .await?;

    let record = images
        .insert(&NewImage {
            sub: user.sub,
            uuid_filename: uuid_filename.clone(),
            image_name: payload.image_name.trim().to_string(),
            image_description: None,
        })
        .await
        .map_err(|err| {
            tracing::error!("Discarding issued upload URL for {uuid_filename}: {err}");
            AppError::from(err)
        })?;

    tracing::info!("Issued upload URL for image {}", record.id);

    Ok(Json(PresignedUrlResponse {
        success: true,
        presigned_url,
        image_id: record.id,
        uuid_filename,
        message: "Presigned URL generated successfully".to_string(),
    }))
}

/// Lists the caller's images, newest first
///
/// # Errors
///
/// - `401 UNAUTHORIZED` - No identity on the request
/// - `500 INTERNAL_SERVER_ERROR` - The query failed
#[instrument(skip_all, fields(sub = %user.sub))]
pub async fn list_images(
    Extension(images): Extension<Arc<dyn ImageMetadataRepository>>,
    user: AuthenticatedUser,
) -> Result<Json<ImageListResponse>, AppError> {
    let records = images.list_by_sub(&user.sub).await.map_err(|err| {
        tracing::error!("Failed to list images: {err}");
        AppError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Failed to list images",
            true,
        )
    })?;

    Ok(Json(ImageListResponse {
        images: records.into_iter().map(ImageSummary::from).collect(),
    }))
}

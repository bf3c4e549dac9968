//! Universal error handling for the API

use std::borrow::Cow;

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gallery_storage::{ImageMetadataError, RegisteredUserError};
use schemars::JsonSchema;
use serde::Serialize;

use crate::media_storage::BucketError;

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: Cow<'static, str>,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(
        status: StatusCode,
        code: &'static str,
        msg: impl Into<Cow<'static, str>>,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody {
                    code,
                    message: msg.into(),
                },
            },
        }
    }

    /// 400 carrying the message of the first failed validation rule
    #[must_use]
    pub fn validation(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", msg, false)
    }

    /// 401 for requests without a resolvable identity
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Authentication required",
            false,
        )
    }

    /// 403 for identities lacking a required group
    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "insufficient_permissions",
            "Insufficient permissions",
            false,
        )
    }

    /// Status code of the response
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Human-readable message of the response
    #[must_use]
    pub fn message(&self) -> &str {
        &self.inner.error.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert bucket errors to application errors
impl From<BucketError> for AppError {
    fn from(err: BucketError) -> Self {
        match &err {
            BucketError::ConfigError(msg) => {
                tracing::error!("Presigning configuration error: {msg}");
            }
            BucketError::S3Error(msg) => tracing::error!("S3 presigning error: {msg}"),
        }

        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "presign_failed",
            "Failed to generate presigned URL",
            true,
        )
    }
}

/// Convert image metadata errors to application errors
impl From<ImageMetadataError> for AppError {
    fn from(err: ImageMetadataError) -> Self {
        tracing::error!("Image metadata error: {err}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "image_record_failed",
            "Failed to create image record",
            true,
        )
    }
}

/// Convert registered user errors to application errors
impl From<RegisteredUserError> for AppError {
    fn from(err: RegisteredUserError) -> Self {
        match err {
            RegisteredUserError::NotFound(sub) => {
                tracing::debug!("Registered user not found: {sub}");
                Self::new(
                    StatusCode::NOT_FOUND,
                    "user_not_found",
                    "User not found",
                    false,
                )
            }
            RegisteredUserError::Database(err) => {
                tracing::error!("Registered user query failed: {err}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                    true,
                )
            }
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}

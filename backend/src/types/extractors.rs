//! Custom extractors for request validation

use aide::operation::OperationInput;
use aide::OperationOutput;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use schemars::JsonSchema;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::types::error::AppError;

/// Custom JSON extractor that validates the payload
///
/// Validation failures surface the message of the first failing rule as the
/// error message, so clients can display it verbatim.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| match err {
                JsonRejection::MissingJsonContentType(_) => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_content_type",
                    "Missing Content-Type: application/json header",
                    false,
                ),
                JsonRejection::JsonDataError(err) => {
                    AppError::validation(data_error_message(&err.body_text()))
                }
                _ => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_json",
                    "Invalid JSON payload",
                    false,
                ),
            })?;

        payload
            .validate()
            .map_err(|errors| AppError::validation(first_error_message(&errors)))?;

        Ok(Self(payload))
    }
}

/// Field level part of a deserialization failure
///
/// Drops axum's generic prefix and serde's source position, leaving the field
/// path and the serde message.
fn data_error_message(body_text: &str) -> String {
    let detail = body_text
        .split_once(": ")
        .filter(|(prefix, _)| prefix.starts_with("Failed to deserialize"))
        .map_or(body_text, |(_, detail)| detail);

    let detail = detail
        .rfind(" at line ")
        .map_or(detail, |position| &detail[..position]);

    detail.to_string()
}

/// Message of the first field error, falling back to its code
fn first_error_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    for (_field, kind) in fields {
        if let ValidationErrorsKind::Field(field_errors) = kind {
            if let Some(error) = field_errors.first() {
                return error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
            }
        }
    }

    "Request validation failed".to_string()
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AppError::inferred_responses(ctx, operation)
    }
}

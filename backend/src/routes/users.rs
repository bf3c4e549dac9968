use std::borrow::Cow;
use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use gallery_storage::{RegisteredUser, RegisteredUserRepository};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::{Validate, ValidationError};

use crate::{
    middleware::AuthenticatedUser,
    types::{AppError, ValidatedJson},
};

const MAX_NICKNAME_CHARS: usize = 40;

fn validate_nickname(nickname: &str) -> Result<(), ValidationError> {
    if nickname.trim().chars().count() > MAX_NICKNAME_CHARS {
        let mut error = ValidationError::new("nickname_too_long");
        error.message = Some(Cow::Borrowed("Nickname must be 40 characters or less"));
        return Err(error);
    }
    Ok(())
}

/// Public view of a registered user
#[derive(Debug, Serialize, JsonSchema)]
pub struct UserProfile {
    pub sub: String,
    pub email: String,
    pub nickname: Option<String>,
}

impl From<RegisteredUser> for UserProfile {
    fn from(user: RegisteredUser) -> Self {
        Self {
            sub: user.sub,
            email: user.email,
            nickname: user.nickname,
        }
    }
}

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct UpdateNicknameRequest {
    /// New nickname, `null` or blank clears it
    #[validate(custom(function = "validate_nickname"))]
    pub nickname: Option<String>,
}

async fn fetch_profile(
    users: &dyn RegisteredUserRepository,
    sub: &str,
) -> Result<Json<UserProfile>, AppError> {
    users
        .get_by_sub(sub)
        .await?
        .map(|user| Json(UserProfile::from(user)))
        .ok_or_else(|| {
            AppError::new(
                StatusCode::NOT_FOUND,
                "user_not_found",
                "User not found",
                false,
            )
        })
}

/// Returns the caller's profile
///
/// # Errors
///
/// - `401 UNAUTHORIZED` - No identity on the request
/// - `404 NOT_FOUND` - The caller has no registered profile
#[instrument(skip_all, fields(sub = %user.sub))]
pub async fn get_me(
    Extension(users): Extension<Arc<dyn RegisteredUserRepository>>,
    user: AuthenticatedUser,
) -> Result<Json<UserProfile>, AppError> {
    fetch_profile(users.as_ref(), &user.sub).await
}

/// Sets or clears the caller's nickname
///
/// # Errors
///
/// - `401 UNAUTHORIZED` - No identity on the request
/// - `400 BAD_REQUEST` - Nickname longer than 40 characters
/// - `404 NOT_FOUND` - The caller has no registered profile
#[instrument(skip_all, fields(sub = %user.sub))]
pub async fn update_nickname(
    Extension(users): Extension<Arc<dyn RegisteredUserRepository>>,
    user: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<UpdateNicknameRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let nickname = payload
        .nickname
        .as_deref()
        .map(str::trim)
        .filter(|nickname| !nickname.is_empty());

    let updated = users.update_nickname(&user.sub, nickname).await?;
    tracing::info!("Updated nickname");

    Ok(Json(updated.into()))
}

/// Returns any user's profile, for administrators
///
/// # Errors
///
/// - `401 UNAUTHORIZED` / `403 FORBIDDEN` - Rejected by the group guard
/// - `404 NOT_FOUND` - No profile for `sub`
#[instrument(skip(users))]
pub async fn get_user(
    Extension(users): Extension<Arc<dyn RegisteredUserRepository>>,
    Path(sub): Path<String>,
) -> Result<Json<UserProfile>, AppError> {
    fetch_profile(users.as_ref(), &sub).await
}

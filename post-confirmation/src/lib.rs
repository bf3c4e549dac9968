//! Cognito post-confirmation trigger
//!
//! Creates the `registered_user` row for a freshly confirmed account. Cognito
//! retries failed triggers, so registration is idempotent.

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

use std::collections::HashMap;

use aws_lambda_events::event::cognito::CognitoEventUserPoolsPostConfirmation;
use gallery_storage::{RegisteredUserError, RegisteredUserRepository};
use thiserror::Error;

/// Failures surfaced to Cognito, which aborts the confirmation flow
#[derive(Error, Debug)]
pub enum PostConfirmationError {
    /// A required user attribute is absent or empty
    #[error("user attribute {0} is missing")]
    MissingAttribute(&'static str),
    /// The insert failed
    #[error(transparent)]
    Storage(#[from] RegisteredUserError),
}

fn attribute<'a>(
    attributes: &'a HashMap<String, String>,
    name: &'static str,
) -> Result<&'a str, PostConfirmationError> {
    attributes
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(PostConfirmationError::MissingAttribute(name))
}

/// Registers the confirmed user, returning whether a row was created
///
/// # Errors
///
/// Returns `MissingAttribute` without touching storage when `sub` or `email` is
/// absent, and `Storage` when the insert fails.
pub async fn register_user(
    users: &dyn RegisteredUserRepository,
    attributes: &HashMap<String, String>,
) -> Result<bool, PostConfirmationError> {
    let sub = attribute(attributes, "sub")?;
    let email = attribute(attributes, "email")?;

    let created = users.create(sub, email).await?;
    if created {
        tracing::info!("Registered user {sub}");
    } else {
        tracing::info!("User {sub} already registered");
    }

    Ok(created)
}

/// Trigger entry point, hands the event back to Cognito unchanged
///
/// # Errors
///
/// See [`register_user`]
pub async fn handle(
    users: &dyn RegisteredUserRepository,
    event: CognitoEventUserPoolsPostConfirmation,
) -> Result<CognitoEventUserPoolsPostConfirmation, PostConfirmationError> {
    register_user(users, &event.request.user_attributes).await?;
    Ok(event)
}

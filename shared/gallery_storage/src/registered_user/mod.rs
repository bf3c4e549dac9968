//! Registered user profiles on PostgreSQL
//!
//! Rows are created by the Cognito post-confirmation trigger. The subject is the
//! identity provider's `sub` and never changes; only the nickname is editable.

mod error;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;

pub use error::{RegisteredUserError, RegisteredUserResult};

/// A registered user profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RegisteredUser {
    /// Identity provider subject (primary key)
    pub sub: String,
    /// Email captured at registration
    pub email: String,
    /// Optional display nickname
    pub nickname: Option<String>,
}

/// Repository over the `registered_user` table
#[async_trait]
pub trait RegisteredUserRepository: Send + Sync {
    /// Fetches a user by subject, `None` when absent
    ///
    /// # Errors
    ///
    /// Returns `RegisteredUserError::Database` if the query fails
    async fn get_by_sub(&self, sub: &str) -> RegisteredUserResult<Option<RegisteredUser>>;

    /// Sets or clears the nickname of an existing user
    ///
    /// # Errors
    ///
    /// Returns `RegisteredUserError::NotFound` if no row matched `sub`,
    /// `RegisteredUserError::Database` if the query fails
    async fn update_nickname(
        &self,
        sub: &str,
        nickname: Option<&str>,
    ) -> RegisteredUserResult<RegisteredUser>;

    /// Creates a user row, leaving an existing row untouched
    ///
    /// Returns `true` when a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RegisteredUserError::Database` if the query fails
    async fn create(&self, sub: &str, email: &str) -> RegisteredUserResult<bool>;
}

/// PostgreSQL backed registered user storage
pub struct RegisteredUserStorage {
    pool: PgPool,
}

impl RegisteredUserStorage {
    /// Creates a new registered user storage
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegisteredUserRepository for RegisteredUserStorage {
    async fn get_by_sub(&self, sub: &str) -> RegisteredUserResult<Option<RegisteredUser>> {
        let user = sqlx::query_as::<_, RegisteredUser>(
            "SELECT sub, email, nickname FROM registered_user WHERE sub = $1",
        )
        .bind(sub)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_nickname(
        &self,
        sub: &str,
        nickname: Option<&str>,
    ) -> RegisteredUserResult<RegisteredUser> {
        sqlx::query_as::<_, RegisteredUser>(
            "UPDATE registered_user SET nickname = $1 WHERE sub = $2 \
             RETURNING sub, email, nickname",
        )
        .bind(nickname)
        .bind(sub)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RegisteredUserError::NotFound(sub.to_string()))
    }

    async fn create(&self, sub: &str, email: &str) -> RegisteredUserResult<bool> {
        let result = sqlx::query(
            "INSERT INTO registered_user (sub, email) VALUES ($1, $2) \
             ON CONFLICT (sub) DO NOTHING",
        )
        .bind(sub)
        .bind(email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

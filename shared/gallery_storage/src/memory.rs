//! In-memory repositories mirroring the PostgreSQL semantics
//!
//! Used by tests across the workspace. Failures can be injected to exercise the
//! error paths of callers.

use std::sync::{
    atomic::{AtomicBool, AtomicI64, Ordering},
    Mutex, PoisonError,
};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    ImageMetadataError, ImageMetadataRepository, ImageMetadataResult, ImageRecord, NewImage,
    RegisteredUser, RegisteredUserError, RegisteredUserRepository, RegisteredUserResult,
};

/// In-memory stand-in for `ImageMetadataStorage`
#[derive(Default)]
pub struct InMemoryImageMetadata {
    rows: Mutex<Vec<ImageRecord>>,
    last_id: AtomicI64,
    fail_inserts: AtomicBool,
}

impl InMemoryImageMetadata {
    /// Creates an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following insert fail with a database error
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of all stored rows in insertion order
    #[must_use]
    pub fn rows(&self) -> Vec<ImageRecord> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ImageMetadataRepository for InMemoryImageMetadata {
    async fn insert(&self, image: &NewImage) -> ImageMetadataResult<ImageRecord> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(ImageMetadataError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        if rows
            .iter()
            .any(|row| row.uuid_filename == image.uuid_filename)
        {
            return Err(ImageMetadataError::DuplicateFilename(
                image.uuid_filename.clone(),
            ));
        }

        let record = ImageRecord {
            id: self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
            sub: image.sub.clone(),
            uuid_filename: image.uuid_filename.clone(),
            image_name: image.image_name.clone(),
            image_description: image.image_description.clone(),
            created_at: Utc::now(),
        };
        rows.push(record.clone());

        Ok(record)
    }

    async fn list_by_sub(&self, sub: &str) -> ImageMetadataResult<Vec<ImageRecord>> {
        let rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let mut owned: Vec<ImageRecord> = rows.iter().filter(|row| row.sub == sub).cloned().collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }
}

/// In-memory stand-in for `RegisteredUserStorage`
#[derive(Default)]
pub struct InMemoryRegisteredUsers {
    users: Mutex<Vec<RegisteredUser>>,
}

impl InMemoryRegisteredUsers {
    /// Creates an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository seeded with `users`
    #[must_use]
    pub fn with_users(users: Vec<RegisteredUser>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }

    /// Snapshot of all stored users
    #[must_use]
    pub fn users(&self) -> Vec<RegisteredUser> {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl RegisteredUserRepository for InMemoryRegisteredUsers {
    async fn get_by_sub(&self, sub: &str) -> RegisteredUserResult<Option<RegisteredUser>> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users.iter().find(|user| user.sub == sub).cloned())
    }

    async fn update_nickname(
        &self,
        sub: &str,
        nickname: Option<&str>,
    ) -> RegisteredUserResult<RegisteredUser> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        let user = users
            .iter_mut()
            .find(|user| user.sub == sub)
            .ok_or_else(|| RegisteredUserError::NotFound(sub.to_string()))?;

        user.nickname = nickname.map(ToString::to_string);
        Ok(user.clone())
    }

    async fn create(&self, sub: &str, email: &str) -> RegisteredUserResult<bool> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        if users.iter().any(|user| user.sub == sub) {
            return Ok(false);
        }

        users.push(RegisteredUser {
            sub: sub.to_string(),
            email: email.to_string(),
            nickname: None,
        });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_image(sub: &str, filename: &str) -> NewImage {
        NewImage {
            sub: sub.to_string(),
            uuid_filename: filename.to_string(),
            image_name: "Sunset".to_string(),
            image_description: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let repo = InMemoryImageMetadata::new();

        let first = repo.insert(&new_image("user-1", "a")).await.unwrap();
        let second = repo.insert(&new_image("user-1", "b")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_filename() {
        let repo = InMemoryImageMetadata::new();
        repo.insert(&new_image("user-1", "a")).await.unwrap();

        let result = repo.insert(&new_image("user-2", "a")).await;
        assert!(matches!(result, Err(ImageMetadataError::DuplicateFilename(f)) if f == "a"));
    }

    #[tokio::test]
    async fn test_list_by_sub_filters_and_orders_newest_first() {
        let repo = InMemoryImageMetadata::new();
        repo.insert(&new_image("user-1", "a")).await.unwrap();
        repo.insert(&new_image("user-2", "b")).await.unwrap();
        repo.insert(&new_image("user-1", "c")).await.unwrap();

        let listed = repo.list_by_sub("user-1").await.unwrap();
        let filenames: Vec<&str> = listed.iter().map(|r| r.uuid_filename.as_str()).collect();
        assert_eq!(filenames, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_update_nickname_missing_user_is_not_found() {
        let repo = InMemoryRegisteredUsers::new();

        let result = repo.update_nickname("ghost", Some("Casper")).await;
        assert!(matches!(result, Err(RegisteredUserError::NotFound(sub)) if sub == "ghost"));
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let repo = InMemoryRegisteredUsers::new();

        assert!(repo.create("user-1", "a@example.com").await.unwrap());
        assert!(!repo.create("user-1", "b@example.com").await.unwrap());

        let user = repo.get_by_sub("user-1").await.unwrap().unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.nickname, None);
    }
}

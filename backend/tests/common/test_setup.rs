use std::sync::Arc;

use aws_sdk_s3::{
    config::{BehaviorVersion, Credentials, Region},
    Client as S3Client,
};
use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    media_storage::MediaStorage,
    server::{self, Dependencies},
    types::Environment,
};
use gallery_storage::{
    memory::{InMemoryImageMetadata, InMemoryRegisteredUsers},
    RegisteredUser,
};
use tower::ServiceExt;

pub const TEST_BUCKET: &str = "gallery-test-uploads";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// S3 client with static credentials, enough for local presigning
pub fn test_s3_client() -> S3Client {
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("eu-west-2"))
        .credentials_provider(Credentials::new("test", "test", None, None, "tests"))
        .build();

    S3Client::from_conf(config)
}

/// Router wired to in-memory repositories
pub struct TestSetup {
    pub router: Router,
    pub images: Arc<InMemoryImageMetadata>,
    pub users: Arc<InMemoryRegisteredUsers>,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_users(Vec::new())
    }

    pub fn with_users(users: Vec<RegisteredUser>) -> Self {
        Self::build(users, None)
    }

    pub fn with_presign_expiry(presign_expiry_secs: u64) -> Self {
        Self::build(Vec::new(), Some(presign_expiry_secs))
    }

    fn build(users: Vec<RegisteredUser>, presign_expiry_override: Option<u64>) -> Self {
        setup_test_env();

        let environment = Environment::Development {
            presign_expiry_override,
        };

        let media_storage = Arc::new(MediaStorage::new(
            Arc::new(test_s3_client()),
            TEST_BUCKET.to_string(),
            environment.presigned_url_expiry_secs(),
        ));

        let images = Arc::new(InMemoryImageMetadata::new());
        let users = Arc::new(InMemoryRegisteredUsers::with_users(users));

        let router = server::router(
            environment,
            Dependencies {
                media_storage,
                images: images.clone(),
                users: users.clone(),
            },
        );

        Self {
            router,
            images,
            users,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn send_json(
        &self,
        method: &str,
        route: &str,
        token: Option<&str>,
        payload: &serde_json::Value,
    ) -> Response {
        let mut builder = Request::builder()
            .uri(route)
            .method(method)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        self.send(builder.body(Body::from(payload.to_string())).unwrap())
            .await
    }

    pub async fn send_get(&self, route: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(route).method("GET");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        self.send(builder.body(Body::empty()).unwrap()).await
    }
}

use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use gallery_storage::{config::run_migrations, ImageMetadataStorage, RegisteredUserStorage};
use tracing_subscriber::{fmt, EnvFilter};

use backend::{
    media_storage::MediaStorage,
    server::{self, Dependencies},
    types::Environment,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // JSON logs for CloudWatch in staging/production, human readable locally
    match environment {
        Environment::Production | Environment::Staging => {
            fmt()
                .json()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(EnvFilter::from_default_env()).init();
        }
    }

    let bucket_name = environment.s3_bucket()?;
    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let media_storage = Arc::new(MediaStorage::new(
        s3_client,
        bucket_name,
        environment.presigned_url_expiry_secs(),
    ));

    let pool = environment.database_config().await?.connect_lazy()?;
    if environment.run_migrations() {
        run_migrations(&pool).await?;
    }

    let dependencies = Dependencies {
        media_storage,
        images: Arc::new(ImageMetadataStorage::new(pool.clone())),
        users: Arc::new(RegisteredUserStorage::new(pool)),
    };

    let router = server::router(environment, dependencies);

    if std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok() {
        server::start_lambda(router).await
    } else {
        server::start(router).await
    }
}

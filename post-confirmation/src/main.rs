use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_lambda_events::event::cognito::CognitoEventUserPoolsPostConfirmation;
use aws_sdk_ssm::Client as SsmClient;
use gallery_storage::{
    config::DEFAULT_PARAMETER_PREFIX, DatabaseConfig, DatabaseConfigError, DatabaseCredentials,
    RegisteredUserRepository, RegisteredUserStorage,
};
use lambda_runtime::{run, service_fn, LambdaEvent};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DATABASE_NAME: &str = "postgres";

/// `DATABASE_URL` for local invocations, Parameter Store otherwise
async fn database_config() -> Result<DatabaseConfig, DatabaseConfigError> {
    let database_name = std::env::var("POSTGRES_DATABASE_NAME")
        .unwrap_or_else(|_| DEFAULT_DATABASE_NAME.to_string());

    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Ok(DatabaseConfig::new(url, database_name));
    }

    let prefix = std::env::var("RDS_PARAMETER_PREFIX")
        .map(|prefix| prefix.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| DEFAULT_PARAMETER_PREFIX.to_string());

    let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let credentials = DatabaseCredentials::load(&SsmClient::new(&aws_config), &prefix).await?;

    Ok(DatabaseConfig::from_credentials(credentials, database_name))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let pool = database_config().await?.connect_lazy()?;
    let users: Arc<dyn RegisteredUserRepository> = Arc::new(RegisteredUserStorage::new(pool));

    run(service_fn(
        |event: LambdaEvent<CognitoEventUserPoolsPostConfirmation>| {
            let users = users.clone();
            async move {
                post_confirmation::handle(users.as_ref(), event.payload)
                    .await
                    .map_err(lambda_runtime::Error::from)
            }
        },
    ))
    .await
    .map_err(|err| anyhow::anyhow!(err))
}

use std::sync::Arc;
use std::time::Duration;

use aide::openapi::OpenApi;
use axum::{http::StatusCode, Extension, Router};
use gallery_storage::{ImageMetadataRepository, RegisteredUserRepository};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    media_storage::MediaStorage, middleware::attach_authorizer_claims, routes, types::Environment,
};

/// API Gateway gives up after 29 seconds, stop working before that
const REQUEST_TIMEOUT: Duration = Duration::from_secs(28);

/// Process-wide clients shared by every request
///
/// Built once at startup and reused across warm invocations.
#[derive(Clone)]
pub struct Dependencies {
    /// S3 upload presigning
    pub media_storage: Arc<MediaStorage>,
    /// `images` table
    pub images: Arc<dyn ImageMetadataRepository>,
    /// `registered_user` table
    pub users: Arc<dyn RegisteredUserRepository>,
}

/// Builds the application router with all dependencies attached
#[must_use]
pub fn router(environment: Environment, dependencies: Dependencies) -> Router {
    let mut openapi = OpenApi::default();

    routes::handler(environment.admin_group())
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(dependencies.media_storage))
        .layer(Extension(dependencies.images))
        .layer(Extension(dependencies.users))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
}

/// Serves the router on a TCP listener
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(router: Router) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(8001), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Image gallery API started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

/// Serves the router as an API Gateway proxy integration
///
/// Authorizer claims from the invocation context are copied into the request
/// before routing.
///
/// # Errors
///
/// Returns an error if the Lambda runtime loop fails
pub async fn start_lambda(router: Router) -> anyhow::Result<()> {
    tracing::info!("Image gallery API starting on the Lambda runtime");

    let service = ServiceBuilder::new()
        .map_request(attach_authorizer_claims)
        .service(router);

    lambda_http::run(service)
        .await
        .map_err(|err| anyhow::anyhow!(err))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!("Failed to listen for SIGTERM: {err}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

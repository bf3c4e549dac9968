use std::fmt;
use std::time::Duration;

use aws_sdk_ssm::{error::DisplayErrorContext, Client as SsmClient};
use sqlx::{
    migrate::{MigrateError, Migrator},
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use thiserror::Error;

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Parameter Store path holding the RDS connection parameters
pub const DEFAULT_PARAMETER_PREFIX: &str = "/rds";

const DEFAULT_PORT: u16 = 5432;
const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised while preparing the database connection
#[derive(Error, Debug)]
pub enum DatabaseConfigError {
    /// The connection URL could not be parsed
    #[error("Invalid database URL: {0}")]
    InvalidUrl(#[source] sqlx::Error),

    /// Applying migrations failed
    #[error("Failed to run migrations: {0}")]
    Migration(#[from] MigrateError),

    /// Parameter Store could not be queried
    #[error("Failed to read connection parameters: {0}")]
    ParameterStore(String),

    /// A required connection parameter does not exist
    #[error("Connection parameter {0} is missing")]
    MissingParameter(String),

    /// A connection parameter holds an unusable value
    #[error("Connection parameter {0} is invalid")]
    InvalidParameter(String),
}

/// Host and login of the database cluster
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    /// Cluster endpoint
    pub host: String,
    /// Listening port
    pub port: u16,
    /// Login role
    pub username: String,
    /// Login password
    pub password: String,
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl DatabaseCredentials {
    /// Assembles credentials from `(name, value)` parameter pairs under `prefix`
    ///
    /// Expects `{prefix}/host`, `{prefix}/username` and `{prefix}/password`;
    /// `{prefix}/port` is optional and defaults to 5432.
    ///
    /// # Errors
    ///
    /// Returns `MissingParameter` for an absent required parameter and
    /// `InvalidParameter` for a port that is not a number
    pub fn from_parameters<'a>(
        prefix: &str,
        parameters: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, DatabaseConfigError> {
        let parameters: Vec<(&str, &str)> = parameters.into_iter().collect();
        let lookup = |key: &str| {
            let name = format!("{prefix}/{key}");
            parameters
                .iter()
                .find(|(candidate, _)| *candidate == name)
                .map(|(_, value)| (*value).to_string())
                .ok_or(DatabaseConfigError::MissingParameter(name))
        };

        let port = match lookup("port") {
            Ok(port) => port
                .trim()
                .parse()
                .map_err(|_| DatabaseConfigError::InvalidParameter(format!("{prefix}/port")))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            host: lookup("host")?,
            port,
            username: lookup("username")?,
            password: lookup("password")?,
        })
    }

    /// Reads the credentials from Parameter Store, decrypting secure strings
    ///
    /// # Errors
    ///
    /// Returns `ParameterStore` if the request fails, otherwise see
    /// [`DatabaseCredentials::from_parameters`]
    pub async fn load(ssm: &SsmClient, prefix: &str) -> Result<Self, DatabaseConfigError> {
        let names = ["host", "port", "username", "password"].map(|key| format!("{prefix}/{key}"));

        let output = ssm
            .get_parameters()
            .set_names(Some(names.to_vec()))
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| DatabaseConfigError::ParameterStore(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!("Loaded database connection parameters from {prefix}");

        Self::from_parameters(
            prefix,
            output
                .parameters()
                .iter()
                .filter_map(|parameter| Some((parameter.name()?, parameter.value()?))),
        )
    }
}

#[derive(Clone)]
enum Connection {
    Url(String),
    Credentials(DatabaseCredentials),
}

/// Connection parameters for the gallery database
///
/// The database name is kept apart from the URL or credentials so the same
/// cluster can serve a per-stage database.
#[derive(Clone)]
pub struct DatabaseConfig {
    connection: Connection,
    database_name: String,
}

impl DatabaseConfig {
    /// Creates a configuration from a connection URL
    #[must_use]
    pub const fn new(url: String, database_name: String) -> Self {
        Self {
            connection: Connection::Url(url),
            database_name,
        }
    }

    /// Creates a configuration from cluster credentials
    #[must_use]
    pub const fn from_credentials(credentials: DatabaseCredentials, database_name: String) -> Self {
        Self {
            connection: Connection::Credentials(credentials),
            database_name,
        }
    }

    /// Name of the database selected on connect
    #[must_use]
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Builds a pool that only connects on first use
    ///
    /// Warm serverless invocations reuse the pool, so nothing is dialled until a
    /// query actually runs.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseConfigError::InvalidUrl` if the URL cannot be parsed
    pub fn connect_lazy(&self) -> Result<PgPool, DatabaseConfigError> {
        let options = match &self.connection {
            Connection::Url(url) => url
                .parse::<PgConnectOptions>()
                .map_err(DatabaseConfigError::InvalidUrl)?,
            Connection::Credentials(credentials) => PgConnectOptions::new()
                .host(&credentials.host)
                .port(credentials.port)
                .username(&credentials.username)
                .password(&credentials.password),
        }
        .database(&self.database_name);

        tracing::info!(
            "Configured PostgreSQL pool for database: {}",
            self.database_name
        );

        Ok(PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy_with(options))
    }
}

/// Applies pending schema migrations
///
/// # Errors
///
/// Returns `DatabaseConfigError::Migration` if any migration fails
pub async fn run_migrations(pool: &PgPool) -> Result<(), DatabaseConfigError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

mod environment;
pub mod error;
pub mod extractors;

pub use environment::{ConfigError, Environment};
pub use error::AppError;
pub use extractors::ValidatedJson;

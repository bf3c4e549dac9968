pub mod auth;
pub mod authorizer;

pub use auth::{attach_identity, require_group, AuthenticatedUser, RequiredGroup};
pub use authorizer::{attach_authorizer_claims, AuthorizerClaims};

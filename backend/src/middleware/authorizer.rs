//! Claims injected by the API Gateway authorizer

use lambda_http::request::RequestContext;
use serde_json::Value;

/// Claims object the upstream authorizer attached to the invocation
///
/// Inserted into request extensions by the Lambda adapter and read by
/// [`attach_identity`](super::auth::attach_identity).
#[derive(Debug, Clone)]
pub struct AuthorizerClaims(pub Value);

/// Pointers to the claims of REST (Cognito authorizer) and HTTP (JWT authorizer) APIs
const CLAIMS_POINTERS: [&str; 2] = ["/authorizer/claims", "/authorizer/jwt/claims"];

/// Copies authorizer claims from the Lambda request context into an extension
///
/// Used as a `map_request` step in front of the router when running on Lambda.
pub fn attach_authorizer_claims(mut request: lambda_http::Request) -> lambda_http::Request {
    let claims = request
        .extensions()
        .get::<RequestContext>()
        .and_then(|context| serde_json::to_value(context).ok())
        .and_then(|context| claims_from_context(&context));

    if let Some(claims) = claims {
        request.extensions_mut().insert(AuthorizerClaims(claims));
    }

    request
}

fn claims_from_context(context: &Value) -> Option<Value> {
    CLAIMS_POINTERS
        .iter()
        .filter_map(|pointer| context.pointer(pointer))
        .find(|claims| claims.is_object())
        .cloned()
}

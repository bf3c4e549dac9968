use axum::response::Response;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use gallery_storage::RegisteredUser;
use http_body_util::BodyExt;
use serde_json::json;

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Unsigned token carrying `sub` and the given groups
pub fn token_for(sub: &str, groups: &[&str]) -> String {
    let claims = json!({
        "sub": sub,
        "email": format!("{sub}@example.com"),
        "cognito:groups": groups,
    });

    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

pub fn registered_user(sub: &str, nickname: Option<&str>) -> RegisteredUser {
    RegisteredUser {
        sub: sub.to_string(),
        email: format!("{sub}@example.com"),
        nickname: nickname.map(ToString::to_string),
    }
}

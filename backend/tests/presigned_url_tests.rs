mod common;

use std::collections::HashSet;

use axum::body::Body;
use backend::middleware::AuthorizerClaims;
use common::*;
use http::{Request, StatusCode};
use serde_json::json;

const ROUTE: &str = "/images/presigned-url";

// Happy path tests

#[tokio::test]
async fn test_presigned_url_happy_path() {
    let setup = TestSetup::new();
    let token = token_for("user-123", &[]);

    let response = setup
        .send_json("POST", ROUTE, Some(&token), &json!({ "imageName": "Sunset" }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Presigned URL generated successfully");

    let uuid_filename = body["uuidFilename"].as_str().unwrap();
    uuid::Uuid::parse_str(uuid_filename).expect("object key should be a UUID");

    let presigned_url = body["presignedUrl"].as_str().unwrap();
    assert!(presigned_url.contains(TEST_BUCKET));
    assert!(presigned_url.contains(uuid_filename));
    assert!(presigned_url.contains("X-Amz-Expires=900"));
    assert!(presigned_url.contains("X-Amz-Signature="));
}

#[tokio::test]
async fn test_presigned_url_records_image_for_caller() {
    let setup = TestSetup::new();
    let token = token_for("user-123", &[]);

    let response = setup
        .send_json(
            "POST",
            ROUTE,
            Some(&token),
            &json!({ "imageName": "   Harbour at dusk  " }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;

    let rows = setup.images.rows();
    assert_eq!(rows.len(), 1);

    let record = &rows[0];
    assert_eq!(body["imageId"], record.id);
    assert_eq!(body["uuidFilename"], record.uuid_filename.as_str());
    assert_eq!(record.sub, "user-123");
    assert_eq!(record.image_name, "Harbour at dusk");
    assert_eq!(record.image_description, None);
}

#[tokio::test]
async fn test_presigned_url_keys_are_unique() {
    let setup = TestSetup::new();
    let token = token_for("user-123", &[]);

    let mut keys = HashSet::new();
    for _ in 0..5 {
        let response = setup
            .send_json("POST", ROUTE, Some(&token), &json!({ "imageName": "Same name" }))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = parse_response_body(response).await;
        keys.insert(body["uuidFilename"].as_str().unwrap().to_string());
    }

    assert_eq!(keys.len(), 5);
    assert_eq!(setup.images.rows().len(), 5);
}

#[tokio::test]
async fn test_presigned_url_accepts_forty_characters() {
    let setup = TestSetup::new();
    let token = token_for("user-123", &[]);

    let response = setup
        .send_json(
            "POST",
            ROUTE,
            Some(&token),
            &json!({ "imageName": "a".repeat(40) }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_authorizer_claims_take_precedence_over_bearer_token() {
    let setup = TestSetup::new();
    let token = token_for("from-token", &[]);

    let mut request = Request::builder()
        .uri(ROUTE)
        .method("POST")
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(json!({ "imageName": "Sunset" }).to_string()))
        .unwrap();
    request
        .extensions_mut()
        .insert(AuthorizerClaims(json!({ "sub": "from-authorizer" })));

    let response = setup.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(setup.images.rows()[0].sub, "from-authorizer");
}

// Authentication tests

#[tokio::test]
async fn test_presigned_url_requires_identity() {
    let setup = TestSetup::new();

    for payload in [json!({ "imageName": "Sunset" }), json!({}), json!("garbage")] {
        let response = setup.send_json("POST", ROUTE, None, &payload).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = parse_response_body(response).await;
        assert_eq!(body["error"]["code"], "unauthorized");
        assert_eq!(body["allowRetry"], false);
    }

    assert!(setup.images.rows().is_empty());
}

#[tokio::test]
async fn test_presigned_url_rejects_undecodable_token() {
    let setup = TestSetup::new();

    let response = setup
        .send_json(
            "POST",
            ROUTE,
            Some("not.a-token"),
            &json!({ "imageName": "Sunset" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// Validation error tests

#[tokio::test]
async fn test_presigned_url_blank_name() {
    let setup = TestSetup::new();
    let token = token_for("user-123", &[]);

    for name in ["", "    "] {
        let response = setup
            .send_json("POST", ROUTE, Some(&token), &json!({ "imageName": name }))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = parse_response_body(response).await;
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["message"], "Image name is required");
    }

    assert!(setup.images.rows().is_empty());
}

#[tokio::test]
async fn test_presigned_url_name_too_long() {
    let setup = TestSetup::new();
    let token = token_for("user-123", &[]);

    let response = setup
        .send_json(
            "POST",
            ROUTE,
            Some(&token),
            &json!({ "imageName": "a".repeat(41) }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(
        body["error"]["message"],
        "Image name must be 40 characters or less"
    );
    assert!(setup.images.rows().is_empty());
}

#[tokio::test]
async fn test_presigned_url_missing_name_field() {
    let setup = TestSetup::new();
    let token = token_for("user-123", &[]);

    let response = setup
        .send_json("POST", ROUTE, Some(&token), &json!({ "name": "Sunset" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("missing field `imageName`"));
    assert!(!message.contains("at line"));
    assert!(setup.images.rows().is_empty());
}

#[tokio::test]
async fn test_presigned_url_wrong_name_type() {
    let setup = TestSetup::new();
    let token = token_for("user-123", &[]);

    let response = setup
        .send_json("POST", ROUTE, Some(&token), &json!({ "imageName": 5 }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("invalid type"));
}

#[tokio::test]
async fn test_presigned_url_syntax_error() {
    let setup = TestSetup::new();
    let token = token_for("user-123", &[]);

    let request = Request::builder()
        .uri(ROUTE)
        .method("POST")
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(r#"{"imageName": "#))
        .unwrap();

    let response = setup.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "invalid_json");
}

// Failure tests

#[tokio::test]
async fn test_presigned_url_insert_failure() {
    let setup = TestSetup::new();
    setup.images.fail_inserts(true);
    let token = token_for("user-123", &[]);

    let response = setup
        .send_json("POST", ROUTE, Some(&token), &json!({ "imageName": "Sunset" }))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "image_record_failed");
    assert_eq!(body["error"]["message"], "Failed to create image record");
    assert_eq!(body["allowRetry"], true);
    assert!(body.get("presignedUrl").is_none());
}

#[tokio::test]
async fn test_presigned_url_presigning_failure() {
    // S3 rejects presigned URLs valid for more than seven days
    let setup = TestSetup::with_presign_expiry(8 * 24 * 60 * 60);
    let token = token_for("user-123", &[]);

    let response = setup
        .send_json("POST", ROUTE, Some(&token), &json!({ "imageName": "Sunset" }))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["code"], "presign_failed");
    assert_eq!(body["error"]["message"], "Failed to generate presigned URL");
    assert_eq!(body["allowRetry"], true);
    assert!(setup.images.rows().is_empty());
}

// Listing tests

#[tokio::test]
async fn test_list_images_returns_only_callers_images() {
    let setup = TestSetup::new();
    let alice = token_for("alice", &[]);
    let bob = token_for("bob", &[]);

    for (token, name) in [(&alice, "First"), (&bob, "Other"), (&alice, "Second")] {
        let response = setup
            .send_json("POST", ROUTE, Some(token), &json!({ "imageName": name }))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = setup.send_get("/images", Some(&alice)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    let names: Vec<&str> = body["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|image| image["imageName"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"First") && names.contains(&"Second"));
}

#[tokio::test]
async fn test_list_images_requires_identity() {
    let setup = TestSetup::new();

    let response = setup.send_get("/images", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

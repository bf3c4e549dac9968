mod docs;
pub mod gallery;
pub mod health;
pub mod images;
pub mod users;

use aide::axum::{
    routing::{get, post, put},
    ApiRouter,
};
use axum::middleware;

use crate::middleware::{attach_identity, require_group, RequiredGroup};

/// Creates the router with all handler routes
///
/// Every route sees the identity middleware; group gated routes additionally sit
/// behind `require_group(admin_group)`.
pub fn handler(admin_group: String) -> ApiRouter {
    let public_routes = ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .api_route("/gallery/photos", get(gallery::list_photos));

    let user_routes = ApiRouter::new()
        .api_route("/images/presigned-url", post(images::create_presigned_url))
        .api_route("/images", get(images::list_images))
        .api_route("/users/me", get(users::get_me))
        .api_route("/users/me/nickname", put(users::update_nickname));

    let admin_routes = ApiRouter::new()
        .api_route("/admin/users/{sub}", get(users::get_user))
        .layer(middleware::from_fn_with_state(
            RequiredGroup(admin_group),
            require_group,
        ));

    public_routes
        .merge(user_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn(attach_identity))
}

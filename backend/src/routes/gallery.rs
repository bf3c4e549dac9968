use axum::{extract::Query, Json};
use axum_valid::Valid;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::gallery::{self, Photo, EMPTY_STATE_MESSAGE};

#[derive(Debug, Default, Deserialize, Validate, JsonSchema)]
pub struct GallerySearch {
    /// Case-insensitive text matched against titles and descriptions
    #[validate(length(max = 100))]
    pub search: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryResponse {
    pub photos: Vec<Photo>,
    /// Present when nothing matched the search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

/// Lists gallery photos matching the search text
pub async fn list_photos(Valid(Query(query)): Valid<Query<GallerySearch>>) -> Json<GalleryResponse> {
    let photos: Vec<Photo> =
        gallery::filter_photos(gallery::catalog(), query.search.as_deref().unwrap_or_default())
            .into_iter()
            .cloned()
            .collect();

    let empty_message = photos.is_empty().then_some(EMPTY_STATE_MESSAGE);

    Json(GalleryResponse {
        photos,
        empty_message,
    })
}

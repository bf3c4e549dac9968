//! Gallery read model
//!
//! A fixed catalog of photos, the search filter applied to it, and the lightbox
//! state machine driving the full-size overlay.

mod lightbox;

use schemars::JsonSchema;
use serde::Serialize;

pub use lightbox::{GalleryEvent, Key, Lightbox, Overflow, Page};

/// Shown in place of the grid when a search matches nothing
pub const EMPTY_STATE_MESSAGE: &str = "No matching artwork. Try a different search.";

/// A gallery entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Photo {
    /// Stable identifier
    pub id: &'static str,
    /// Card title
    pub title: &'static str,
    /// Card description
    pub description: &'static str,
    /// Thumbnail URL used in the grid
    pub small: &'static str,
    /// Full-size URL used in the lightbox
    pub large: &'static str,
}

macro_rules! unsplash {
    ($id:literal, $title:literal, $description:literal) => {
        Photo {
            id: $id,
            title: $title,
            description: $description,
            small: concat!(
                "https://images.unsplash.com/",
                $id,
                "?auto=format&fit=crop&w=600&q=80"
            ),
            large: concat!(
                "https://images.unsplash.com/",
                $id,
                "?auto=format&fit=crop&w=2200&q=90"
            ),
        }
    };
}

static CATALOG: [Photo; 6] = [
    unsplash!(
        "photo-1500530855697-b586d89ba3ee",
        "Misty Forest",
        "Soft light over a quiet evergreen canopy."
    ),
    unsplash!(
        "photo-1470770841072-f978cf4d019e",
        "Mountain Trail",
        "A winding path through alpine terrain."
    ),
    unsplash!(
        "photo-1469474968028-56623f02e42e",
        "City Glow",
        "Evening light across a lively skyline."
    ),
    unsplash!(
        "photo-1494526585095-c41746248156",
        "Desert Lines",
        "Warm dunes shaped by the wind."
    ),
    unsplash!(
        "photo-1482192596544-9eb780fc7f66",
        "Ocean Cliff",
        "Waves rolling into rugged coastline."
    ),
    unsplash!(
        "photo-1500534314209-a25ddb2bd429",
        "Golden Field",
        "Late sun over a wide open meadow."
    ),
];

/// All photos in display order
#[must_use]
pub fn catalog() -> &'static [Photo] {
    &CATALOG
}

/// Looks up a catalog entry by id
#[must_use]
pub fn find_photo(id: &str) -> Option<&'static Photo> {
    CATALOG.iter().find(|photo| photo.id == id)
}

/// Case-insensitive substring match on title or description
///
/// A blank query matches everything.
#[must_use]
pub fn filter_photos<'a>(photos: &'a [Photo], query: &str) -> Vec<&'a Photo> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return photos.iter().collect();
    }

    photos
        .iter()
        .filter(|photo| {
            photo.title.to_lowercase().contains(&needle)
                || photo.description.to_lowercase().contains(&needle)
        })
        .collect()
}

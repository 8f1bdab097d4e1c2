//! Style prompts, public rooms and style selection parsing.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{BoothError, BoothResult};
use crate::room::RoomSlug;

/// Query parameter the styles screen hands its selection back through.
pub const STYLE_QUERY_PARAM: &str = "selectedId";

/// Label shown for the default room when its name is left as the slug.
pub const DEFAULT_ROOM_LABEL: &str = "Главная";

/// A visual style a visitor can pick for their photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePrompt {
    /// Style id submitted with a job.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Prompt sent to the generation model.
    pub prompt: String,
    /// Preview image URL.
    pub preview_image_url: String,
    /// Icon image URL.
    pub icon_image_url: String,
}

impl StylePrompt {
    /// The built-in style used when the backend cannot be reached.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            id: 1,
            name: "Anime".to_string(),
            description: "Soft anime shading".to_string(),
            prompt: "Turn input photo into anime portrait".to_string(),
            preview_image_url: "/media/previews/anime.jpg".to_string(),
            icon_image_url: "/media/icons/anime.png".to_string(),
        }
    }
}

/// A room listed on the public room menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicRoom {
    /// Canonical room slug.
    pub slug: RoomSlug,
    /// Human readable name.
    pub name: String,
}

impl PublicRoom {
    /// Name to show in menus.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.slug.is_default() && self.name.trim().eq_ignore_ascii_case(self.slug.as_str()) {
            DEFAULT_ROOM_LABEL
        } else {
            &self.name
        }
    }
}

/// Drop rooms whose slug already appeared, keeping the first occurrence.
#[must_use]
pub fn unique_by_slug(rooms: Vec<PublicRoom>) -> Vec<PublicRoom> {
    let mut seen = std::collections::HashSet::new();
    rooms
        .into_iter()
        .filter(|room| seen.insert(room.slug.clone()))
        .collect()
}

/// Parse a stored or submitted style id. Only decimal positive integers are
/// valid; exponent, float and hex forms such as `1e1` are rejected.
///
/// # Errors
///
/// Returns [`BoothError::InvalidStyleId`] for empty, non-numeric, zero or
/// negative input.
pub fn parse_style_id(raw: &str) -> BoothResult<u64> {
    let trimmed = raw.trim();
    match trimmed.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(BoothError::InvalidStyleId(raw.to_string())),
    }
}

/// Read the selected style id from a URL query string (`?selectedId=3`).
///
/// Keys and values are form-decoded; the first `selectedId` pair wins.
#[must_use]
pub fn style_id_from_query(query: &str) -> Option<u64> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == STYLE_QUERY_PARAM)
        .and_then(|(_, value)| parse_style_id(&value).ok())
}

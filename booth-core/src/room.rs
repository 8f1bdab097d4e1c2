//! Room identity: canonical slugs and room-scoped API paths.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

/// Slug every empty or fully invalid room identifier collapses to.
pub const DEFAULT_ROOM_SLUG: &str = "main";

/// Characters escaped in a single URL path component.
///
/// Leaves the same unreserved marks untouched as `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Canonical room identifier.
///
/// Always lowercase, restricted to `[a-z0-9-]`, without leading, trailing
/// or repeated hyphens. Only constructible through [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomSlug(String);

impl RoomSlug {
    /// Normalize a raw identifier into a slug.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        normalize(Some(raw))
    }

    /// The slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the reserved default room.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_ROOM_SLUG
    }
}

impl Default for RoomSlug {
    fn default() -> Self {
        Self(DEFAULT_ROOM_SLUG.to_string())
    }
}

impl std::fmt::Display for RoomSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RoomSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomSlug {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for RoomSlug {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<RoomSlug> for String {
    fn from(slug: RoomSlug) -> Self {
        slug.0
    }
}

/// Canonicalize a free-form room identifier.
///
/// Trims, lowercases, replaces anything outside `[a-z0-9-]` with `-`,
/// collapses hyphen runs and strips hyphens at both ends. Empty results
/// fall back to [`DEFAULT_ROOM_SLUG`]. Never fails.
#[must_use]
pub fn normalize(raw: Option<&str>) -> RoomSlug {
    let lowered = raw.unwrap_or_default().trim().to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        let ch = if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            ch
        } else {
            '-'
        };
        if ch == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(ch);
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        RoomSlug::default()
    } else {
        RoomSlug(slug)
    }
}

/// Percent-encode a value for use as one URL path segment.
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Build a room-scoped API path: `/api/rooms/{slug}{suffix}`.
///
/// The room is normalized first and `suffix` gains a leading `/` if it
/// lacks one.
#[must_use]
pub fn build_scoped_path(room: &str, suffix: &str) -> String {
    let slug = normalize(Some(room));
    format!(
        "/api/rooms/{}{}",
        encode_component(slug.as_str()),
        leading_slash(suffix)
    )
}

fn leading_slash(suffix: &str) -> String {
    if suffix.starts_with('/') {
        suffix.to_string()
    } else {
        format!("/{suffix}")
    }
}

/// Which API namespace a request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiScope {
    /// Room-scoped endpoints under `/api/rooms/{slug}`.
    Room(RoomSlug),
    /// Un-scoped endpoints under `/api`, kept for pre-multi-room deployments.
    Legacy,
}

impl ApiScope {
    /// Scope for the given raw room identifier.
    #[must_use]
    pub fn room(raw: &str) -> Self {
        Self::Room(RoomSlug::new(raw))
    }

    /// Build the API path for `suffix` within this scope.
    #[must_use]
    pub fn path(&self, suffix: &str) -> String {
        match self {
            Self::Room(slug) => build_scoped_path(slug.as_str(), suffix),
            Self::Legacy => format!("/api{}", leading_slash(suffix)),
        }
    }

    /// The room this scope addresses; legacy endpoints serve the default room.
    #[must_use]
    pub fn slug(&self) -> RoomSlug {
        match self {
            Self::Room(slug) => slug.clone(),
            Self::Legacy => RoomSlug::default(),
        }
    }
}

impl Default for ApiScope {
    fn default() -> Self {
        Self::Room(RoomSlug::default())
    }
}

impl From<RoomSlug> for ApiScope {
    fn from(slug: RoomSlug) -> Self {
        Self::Room(slug)
    }
}

impl From<&RoomSlug> for ApiScope {
    fn from(slug: &RoomSlug) -> Self {
        Self::Room(slug.clone())
    }
}

impl From<&str> for ApiScope {
    fn from(raw: &str) -> Self {
        Self::room(raw)
    }
}

impl std::fmt::Display for ApiScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Room(slug) => write!(f, "{slug}"),
            Self::Legacy => f.write_str("legacy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalizes_free_form_names() {
        assert_eq!(normalize(Some(" Room A ")).as_str(), "room-a");
        assert_eq!(normalize(Some("Studio__42!!")).as_str(), "studio-42");
        assert_eq!(normalize(Some("--Lobby--East--")).as_str(), "lobby-east");
        assert_eq!(normalize(Some("café")).as_str(), "caf");
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        assert_eq!(normalize(Some("")).as_str(), DEFAULT_ROOM_SLUG);
        assert_eq!(normalize(Some("   ")).as_str(), DEFAULT_ROOM_SLUG);
        assert_eq!(normalize(Some("!!!")).as_str(), DEFAULT_ROOM_SLUG);
        assert_eq!(normalize(None).as_str(), DEFAULT_ROOM_SLUG);
        assert!(RoomSlug::default().is_default());
    }

    #[test]
    fn builds_scoped_paths() {
        assert_eq!(build_scoped_path("Room A", "/jobs"), "/api/rooms/room-a/jobs");
        assert_eq!(build_scoped_path("Room A", "jobs"), "/api/rooms/room-a/jobs");
        assert_eq!(build_scoped_path("", "/prompts"), "/api/rooms/main/prompts");
    }

    #[test]
    fn legacy_scope_drops_room_segment() {
        assert_eq!(ApiScope::Legacy.path("/jobs/gallery"), "/api/jobs/gallery");
        assert_eq!(ApiScope::Legacy.slug().as_str(), DEFAULT_ROOM_SLUG);
        assert_eq!(
            ApiScope::from("Room A").path("/jobs/7"),
            "/api/rooms/room-a/jobs/7"
        );
    }

    #[test]
    fn encodes_like_uri_components() {
        assert_eq!(encode_component("abc-123_x.y"), "abc-123_x.y");
        assert_eq!(encode_component("a/b c"), "a%2Fb%20c");
        assert_eq!(encode_component("it's(ok)*!~"), "it's(ok)*!~");
    }

    #[test]
    fn slug_deserializes_through_normalization() {
        let slug: RoomSlug = serde_json::from_str("\"Main Hall\"").expect("slug");
        assert_eq!(slug.as_str(), "main-hall");
        assert_eq!(serde_json::to_string(&slug).expect("json"), "\"main-hall\"");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in any::<String>()) {
            let once = normalize(Some(&raw));
            let twice = normalize(Some(once.as_str()));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_slug_charset_and_hyphens(raw in any::<String>()) {
            let slug = normalize(Some(&raw));
            let s = slug.as_str();
            prop_assert!(!s.is_empty());
            prop_assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!s.starts_with('-'));
            prop_assert!(!s.ends_with('-'));
            prop_assert!(!s.contains("--"));
        }
    }
}

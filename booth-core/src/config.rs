//! Process-wide booth configuration.
//!
//! Built once at startup and shared read-only (usually behind an `Arc`)
//! by every component that needs intervals, defaults or fallbacks.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::room::RoomSlug;
use crate::style::StylePrompt;

/// Default interval between job status polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1500;

/// Default interval between gallery refreshes.
pub const DEFAULT_GALLERY_REFRESH_MS: u64 = 5000;

/// Default gallery auto-scroll speed.
pub const DEFAULT_AUTOSCROLL_PPS: f64 = 24.0;

/// Model used when a room has none configured.
pub const DEFAULT_MODEL: &str = "openai/gpt-5-image";

/// Image generation models an admin can assign to a room.
pub const AVAILABLE_MODELS: [&str; 3] = [
    "openai/gpt-5-image",
    "google/gemini-2.5-flash-image",
    "sourceful/riverflow-v2-fast-preview",
];

/// Immutable booth configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    /// Room used when none is given.
    pub default_room: RoomSlug,
    /// Interval between job status polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Interval between gallery refreshes, in milliseconds.
    pub gallery_refresh_interval_ms: u64,
    /// Gallery auto-scroll speed in pixels per second.
    pub autoscroll_pixels_per_second: f64,
    /// Models offered on the settings screen.
    pub available_models: Vec<String>,
    /// Model assumed when the backend reports none.
    pub default_model: String,
    /// Styles shown when the prompt list cannot be fetched.
    pub fallback_styles: Vec<StylePrompt>,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            default_room: RoomSlug::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            gallery_refresh_interval_ms: DEFAULT_GALLERY_REFRESH_MS,
            autoscroll_pixels_per_second: DEFAULT_AUTOSCROLL_PPS,
            available_models: AVAILABLE_MODELS.iter().map(ToString::to_string).collect(),
            default_model: DEFAULT_MODEL.to_string(),
            fallback_styles: vec![StylePrompt::fallback()],
        }
    }
}

impl BoothConfig {
    /// Job status poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Gallery refresh interval.
    #[must_use]
    pub const fn gallery_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.gallery_refresh_interval_ms)
    }

    /// Whether `model` is one of the selectable models.
    #[must_use]
    pub fn is_available_model(&self, model: &str) -> bool {
        self.available_models.iter().any(|m| m == model)
    }
}

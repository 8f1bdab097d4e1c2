//! # Photo Booth WASM Application
//!
//! Browser bindings for the booth client: route resolution, result views
//! and the auto-scrolling gallery.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web booth-app
//! ```
//!
//! Then drive the gallery from `requestAnimationFrame`:
//! ```javascript
//! import init, { GalleryView } from './pkg/booth_app.js';
//!
//! await init();
//! const gallery = new GalleryView('gallery-track');
//! gallery.applyImagesJson(await (await fetch(galleryUrl)).text());
//!
//! function frame(ts) {
//!     if (gallery.frame(ts)) {
//!         requestAnimationFrame(frame);
//!     }
//! }
//! requestAnimationFrame(frame);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use booth_core::{
    build_scoped_path, card_variant, normalize, resolve_route, style_id_from_query, BoothConfig,
    BoothResult, FrameOutcome, GalleryFeed, GalleryImage, JobStatus, ScrollContainer,
};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Photo booth WASM initialized");
}

/// Resolve a URL path to the screen it shows, as JSON.
///
/// Returns `undefined` for paths no screen handles.
#[wasm_bindgen(js_name = resolveRoute)]
#[must_use]
pub fn resolve_route_json(path: &str) -> Option<String> {
    resolve_route(path).and_then(|route| serde_json::to_string(&route).ok())
}

/// Build a room-scoped API path.
#[wasm_bindgen(js_name = buildScopedPath)]
#[must_use]
pub fn build_scoped_path_js(room: &str, suffix: &str) -> String {
    build_scoped_path(room, suffix)
}

/// Normalize a raw room identifier into a slug.
#[wasm_bindgen(js_name = normalizeRoomSlug)]
#[must_use]
pub fn normalize_room_slug(raw: Option<String>) -> String {
    normalize(raw.as_deref()).into()
}

/// Selected style id from a URL query string.
#[wasm_bindgen(js_name = styleIdFromQuery)]
#[must_use]
pub fn style_id_from_query_js(query: &str) -> Option<u64> {
    style_id_from_query(query)
}

/// CSS class of the gallery card at `index`.
#[wasm_bindgen(js_name = cardVariant)]
#[must_use]
pub fn card_variant_js(index: usize) -> String {
    card_variant(index).class_name().to_string()
}

/// Map a job status payload onto the result screen view, as JSON.
///
/// # Errors
///
/// Returns an error if the payload is not a job status.
#[wasm_bindgen(js_name = resultView)]
pub fn result_view_js(status_json: &str) -> Result<String, JsValue> {
    result_view(status_json).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn result_view(status_json: &str) -> BoothResult<String> {
    let status: JobStatus = serde_json::from_str(status_json)?;
    Ok(serde_json::to_string(&status.view())?)
}

fn parse_images(json: &str) -> BoothResult<Vec<GalleryImage>> {
    Ok(serde_json::from_str(json)?)
}

/// Scroll surface backed by a DOM element.
struct DomScroll {
    element: Element,
}

impl ScrollContainer for DomScroll {
    fn content_height(&self) -> f64 {
        f64::from(self.element.scroll_height())
    }

    fn viewport_height(&self) -> f64 {
        f64::from(self.element.client_height())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn set_scroll_offset(&mut self, offset: f64) {
        self.element.set_scroll_top(offset.floor() as i32);
    }
}

/// The gallery screen for WASM.
///
/// Owns the feed and the container it scrolls; JS only supplies fresh image
/// lists and frame timestamps.
#[wasm_bindgen]
pub struct GalleryView {
    document: Document,
    track: DomScroll,
    feed: GalleryFeed,
}

#[wasm_bindgen]
impl GalleryView {
    /// Create a gallery attached to the scrollable element with the given ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, pixels_per_second: Option<f64>) -> Result<GalleryView, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object"))?;
        let element = document.get_element_by_id(container_id).ok_or_else(|| {
            JsValue::from_str(&format!("Gallery element '{container_id}' not found"))
        })?;

        let mut config = BoothConfig::default();
        if let Some(pps) = pixels_per_second {
            config.autoscroll_pixels_per_second = pps;
        }

        Ok(Self {
            document,
            track: DomScroll { element },
            feed: GalleryFeed::new(&config),
        })
    }

    /// Apply a freshly fetched image list (JSON array).
    ///
    /// Returns `true` if the displayed set changed and the cards were rebuilt.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or the cards cannot be rendered.
    #[wasm_bindgen(js_name = applyImagesJson)]
    pub fn apply_images_json(&mut self, json: &str) -> Result<bool, JsValue> {
        let images = parse_images(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let changed = self.feed.apply_refresh(images);
        if changed {
            self.render_cards()?;
        }
        Ok(changed)
    }

    /// Record a failed refresh; the current cards stay visible.
    #[wasm_bindgen(js_name = recordError)]
    pub fn record_error(&mut self, message: &str) {
        tracing::warn!(error = message, "Gallery refresh failed");
        self.feed.record_refresh_error(message);
    }

    /// Message of the last failed refresh.
    #[wasm_bindgen(js_name = lastError)]
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.feed.last_error().map(ToString::to_string)
    }

    /// Displayed order as JSON.
    #[wasm_bindgen(js_name = orderJson)]
    #[must_use]
    pub fn order_json(&self) -> String {
        serde_json::to_string(self.feed.order()).unwrap_or_default()
    }

    /// Number of displayed images.
    #[wasm_bindgen(js_name = imageCount)]
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.feed.len()
    }

    /// Completed scroll cycles.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.feed.cycles()
    }

    /// Advance one animation frame.
    ///
    /// Returns `false` once the gallery is stopped; the caller must then stop
    /// requesting frames.
    pub fn frame(&mut self, timestamp: f64) -> bool {
        let outcome = self.feed.frame(timestamp, &mut self.track);
        if outcome == FrameOutcome::Wrapped {
            if let Err(err) = self.render_cards() {
                tracing::error!("Gallery render error: {:?}", err);
            }
        }
        outcome.should_continue()
    }

    /// Stop the animation for good.
    pub fn stop(&mut self) {
        self.feed.stop();
    }

    fn render_cards(&self) -> Result<(), JsValue> {
        let container = &self.track.element;
        container.set_inner_html("");
        for (index, image) in self.feed.order().iter().enumerate() {
            let card = self.document.create_element("figure")?;
            card.set_class_name(&format!("gallery-card {}", card_variant(index).class_name()));
            let img = self.document.create_element("img")?;
            img.set_attribute("src", &image.url)?;
            img.set_attribute("alt", &image.name)?;
            img.set_attribute("loading", "lazy")?;
            card.append_child(&img)?;
            container.append_child(&card)?;
        }
        Ok(())
    }
}

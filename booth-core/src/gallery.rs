//! # Gallery Feed Engine
//!
//! Keeps the displayed order of result images stable across routine
//! refreshes and reshuffles it at every scroll cycle boundary.
//!
//! ```text
//! refresh timer ──► reconcile(previous, fresh) ──┐
//!                                                ├──► display order
//! frame callback ─► AutoScroller ─► wrapped? ─► reshuffle
//! ```
//!
//! Refreshing and scrolling are independent. A refresh that returns the
//! same multiset of URLs keeps the current order untouched so an in-flight
//! animation never jumps; a membership change replaces the order outright.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::BoothConfig;
use crate::scroll::{AutoScroller, FrameOutcome, ScrollContainer};

/// A completed result shown in the gallery.
///
/// Identity for comparison purposes is `url`; results are named by content
/// hash, so the same URL always means the same image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// File name, used as alt text.
    pub name: String,
    /// Image URL.
    pub url: String,
    /// Modification time in seconds since the epoch. Advisory only.
    #[serde(default)]
    pub modified_at: f64,
}

/// Whether two image lists hold the same URLs with the same multiplicities.
#[must_use]
pub fn same_membership(a: &[GalleryImage], b: &[GalleryImage]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut counts: HashMap<&str, isize> = HashMap::with_capacity(a.len());
    for image in a {
        *counts.entry(image.url.as_str()).or_default() += 1;
    }
    for image in b {
        match counts.get_mut(image.url.as_str()) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return false,
        }
    }
    true
}

/// Pick the order to display after a refresh.
///
/// Returns `previous` unchanged when `fresh` has the same membership, even
/// if timestamps or order differ; otherwise `fresh` becomes the new order.
#[must_use]
pub fn reconcile(previous: Vec<GalleryImage>, fresh: Vec<GalleryImage>) -> Vec<GalleryImage> {
    if same_membership(&previous, &fresh) {
        previous
    } else {
        fresh
    }
}

/// Uniform random permutation of `order` that never equals the input.
///
/// If the shuffle happens to reproduce the input it is rotated left by one,
/// so with two or more distinct items each cycle looks different. Zero or
/// one items are returned as-is.
#[must_use]
pub fn reshuffle<T, R>(order: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let mut next = order.to_vec();
    if next.len() < 2 {
        return next;
    }
    next.shuffle(rng);
    if next == order {
        next.rotate_left(1);
    }
    next
}

/// Size variant applied to a gallery card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardVariant {
    /// Portrait card spanning two rows.
    Tall,
    /// Regular square card.
    Square,
    /// Landscape card spanning two columns.
    Wide,
    /// Small square card.
    Compact,
}

impl CardVariant {
    /// CSS modifier class for the card.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Tall => "gallery-card--tall",
            Self::Square => "gallery-card--square",
            Self::Wide => "gallery-card--wide",
            Self::Compact => "gallery-card--compact",
        }
    }
}

const VARIANT_PATTERN: [CardVariant; 6] = [
    CardVariant::Tall,
    CardVariant::Square,
    CardVariant::Wide,
    CardVariant::Compact,
    CardVariant::Square,
    CardVariant::Wide,
];

/// Variant for the card at `index`; neighbours never share a variant.
#[must_use]
pub const fn card_variant(index: usize) -> CardVariant {
    VARIANT_PATTERN[index % VARIANT_PATTERN.len()]
}

/// Display state for one gallery screen.
pub struct GalleryFeed {
    order: Vec<GalleryImage>,
    scroller: AutoScroller,
    rng: StdRng,
    cycles: u64,
    last_error: Option<String>,
}

impl GalleryFeed {
    /// Create an empty feed scrolling at the configured speed.
    #[must_use]
    pub fn new(config: &BoothConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a feed with a deterministic reshuffle sequence.
    #[must_use]
    pub fn with_seed(config: &BoothConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &BoothConfig, rng: StdRng) -> Self {
        Self {
            order: Vec::new(),
            scroller: AutoScroller::new(config.autoscroll_pixels_per_second),
            rng,
            cycles: 0,
            last_error: None,
        }
    }

    /// Currently displayed order.
    #[must_use]
    pub fn order(&self) -> &[GalleryImage] {
        &self.order
    }

    /// Number of displayed images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is displayed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Completed scroll cycles so far.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Message of the last failed refresh, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Current scroll offset in pixels.
    #[must_use]
    pub const fn scroll_offset(&self) -> f64 {
        self.scroller.offset()
    }

    /// Apply a successful refresh. Returns `true` if the order was replaced.
    ///
    /// A replaced order starts scrolling again from the top.
    pub fn apply_refresh(&mut self, fresh: Vec<GalleryImage>) -> bool {
        self.last_error = None;
        let previous = std::mem::take(&mut self.order);
        let changed = !same_membership(&previous, &fresh);
        self.order = reconcile(previous, fresh);
        if changed {
            tracing::debug!(images = self.order.len(), "Gallery membership changed");
            self.scroller.rewind();
        }
        changed
    }

    /// Record a failed refresh; the current images stay visible.
    pub fn record_refresh_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// Reshuffle the displayed order if it has at least two images.
    pub fn reshuffle(&mut self) {
        if self.order.len() >= 2 {
            self.order = reshuffle(&self.order, &mut self.rng);
        }
    }

    /// Drive one animation frame.
    ///
    /// The loop pauses while the feed is empty. A wrap counts a cycle and
    /// reshuffles the order before the next cycle starts scrolling.
    pub fn frame<C>(&mut self, timestamp_ms: f64, container: &mut C) -> FrameOutcome
    where
        C: ScrollContainer + ?Sized,
    {
        if self.scroller.is_stopped() {
            return FrameOutcome::Stopped;
        }
        if self.order.is_empty() {
            self.scroller.reset_clock();
            return FrameOutcome::Idle;
        }

        let outcome = self.scroller.advance(timestamp_ms, container);
        if outcome == FrameOutcome::Wrapped {
            self.cycles += 1;
            self.reshuffle();
            tracing::debug!(cycle = self.cycles, "Gallery scroll cycle complete");
        }
        outcome
    }

    /// Stop the animation loop for good.
    pub fn stop(&mut self) {
        self.scroller.stop();
    }
}

impl std::fmt::Debug for GalleryFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryFeed")
            .field("order", &self.order)
            .field("scroller", &self.scroller)
            .field("cycles", &self.cycles)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn image(name: &str) -> GalleryImage {
        GalleryImage {
            name: format!("{name}.jpg"),
            url: format!("/media/results/{name}.jpg"),
            modified_at: 10.0,
        }
    }

    fn images(names: &[&str]) -> Vec<GalleryImage> {
        names.iter().map(|n| image(n)).collect()
    }

    struct Track {
        content: f64,
        viewport: f64,
    }

    impl ScrollContainer for Track {
        fn content_height(&self) -> f64 {
            self.content
        }

        fn viewport_height(&self) -> f64 {
            self.viewport
        }

        fn set_scroll_offset(&mut self, _offset: f64) {}
    }

    #[test]
    fn reconcile_keeps_previous_for_same_set() {
        let previous = images(&["a", "b"]);
        let fresh = images(&["b", "a"]);
        assert_eq!(reconcile(previous.clone(), fresh), previous);
    }

    #[test]
    fn reconcile_ignores_timestamp_changes() {
        let previous = images(&["a", "b"]);
        let mut fresh = images(&["a", "b"]);
        fresh[0].modified_at = 99.0;
        assert_eq!(reconcile(previous.clone(), fresh), previous);
    }

    #[test]
    fn reconcile_takes_fresh_on_membership_change() {
        let fresh = images(&["a", "c"]);
        assert_eq!(reconcile(images(&["a", "b"]), fresh.clone()), fresh);
    }

    #[test]
    fn reconcile_respects_multiplicity() {
        let previous = images(&["a", "a", "b"]);
        let fresh = images(&["a", "b", "b"]);
        assert_eq!(reconcile(previous, fresh.clone()), fresh);
    }

    #[test]
    fn reshuffle_is_noop_for_short_lists() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(reshuffle::<GalleryImage, _>(&[], &mut rng).is_empty());
        let single = images(&["a"]);
        assert_eq!(reshuffle(&single, &mut rng), single);
    }

    #[test]
    fn reshuffle_two_items_always_swaps() {
        let mut rng = StdRng::seed_from_u64(7);
        let order = images(&["a", "b"]);
        for _ in 0..32 {
            assert_eq!(reshuffle(&order, &mut rng), images(&["b", "a"]));
        }
    }

    #[test]
    fn card_variants_vary_between_neighbours() {
        let variants: std::collections::HashSet<_> = (0..6).map(card_variant).collect();
        assert!(variants.len() >= 3);
        for index in 0..24 {
            assert_ne!(card_variant(index), card_variant(index + 1));
        }
        assert_eq!(CardVariant::Wide.class_name(), "gallery-card--wide");
    }

    #[test]
    fn refresh_with_same_set_does_not_jump() {
        let mut feed = GalleryFeed::with_seed(&BoothConfig::default(), 3);
        assert!(feed.apply_refresh(images(&["x", "y", "z"])));
        assert!(!feed.apply_refresh(images(&["z", "y", "x"])));
        assert_eq!(feed.order(), images(&["x", "y", "z"]).as_slice());
        assert!(feed.apply_refresh(images(&["x", "y"])));
        assert_eq!(feed.order(), images(&["x", "y"]).as_slice());
    }

    #[test]
    fn shrinking_refresh_restarts_scroll_without_reshuffle() {
        let config = BoothConfig {
            autoscroll_pixels_per_second: 100.0,
            ..BoothConfig::default()
        };
        let mut feed = GalleryFeed::with_seed(&config, 3);
        feed.apply_refresh(images(&["a", "b", "c", "d", "e", "f", "g"]));
        let mut track = Track {
            content: 700.0,
            viewport: 300.0,
        };
        feed.frame(0.0, &mut track);
        assert_eq!(
            feed.frame(2500.0, &mut track),
            FrameOutcome::Scrolled { offset: 250.0 }
        );

        let fresh = images(&["a", "b", "c", "d", "e"]);
        assert!(feed.apply_refresh(fresh.clone()));
        assert!(feed.scroll_offset().abs() < f64::EPSILON);

        track.content = 500.0;
        assert_eq!(
            feed.frame(2516.0, &mut track),
            FrameOutcome::Scrolled { offset: 0.0 }
        );
        assert_eq!(feed.cycles(), 0);
        assert_eq!(feed.order(), fresh.as_slice());
    }

    #[test]
    fn refresh_error_keeps_images() {
        let mut feed = GalleryFeed::with_seed(&BoothConfig::default(), 3);
        feed.apply_refresh(images(&["a", "b"]));
        feed.record_refresh_error("Failed to fetch gallery images");
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.last_error(), Some("Failed to fetch gallery images"));
        feed.apply_refresh(images(&["a", "b"]));
        assert_eq!(feed.last_error(), None);
    }

    #[test]
    fn cycle_boundary_reshuffles_without_duplicates() {
        let mut feed = GalleryFeed::with_seed(&BoothConfig::default(), 11);
        feed.apply_refresh(images(&["a", "b", "c"]));
        let initial = feed.order().to_vec();
        let mut track = Track {
            content: 360.0,
            viewport: 300.0,
        };

        feed.frame(0.0, &mut track);
        assert_eq!(
            feed.frame(2000.0, &mut track),
            FrameOutcome::Scrolled { offset: 48.0 }
        );
        assert_eq!(feed.order(), initial.as_slice());
        assert_eq!(feed.frame(3000.0, &mut track), FrameOutcome::Wrapped);

        assert_eq!(feed.cycles(), 1);
        assert_ne!(feed.order(), initial.as_slice());
        assert!(same_membership(feed.order(), &initial));
    }

    #[test]
    fn empty_feed_idles_and_stop_is_final() {
        let mut feed = GalleryFeed::with_seed(&BoothConfig::default(), 5);
        let mut track = Track {
            content: 1000.0,
            viewport: 300.0,
        };
        assert_eq!(feed.frame(0.0, &mut track), FrameOutcome::Idle);

        feed.apply_refresh(images(&["a"]));
        assert!(matches!(feed.frame(16.0, &mut track), FrameOutcome::Scrolled { .. }));

        feed.stop();
        assert_eq!(feed.frame(32.0, &mut track), FrameOutcome::Stopped);
    }

    proptest! {
        #[test]
        fn prop_reshuffle_never_repeats(len in 2usize..12, seed in any::<u64>()) {
            let names: Vec<String> = (0..len).map(|i| format!("img-{i}")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut order = images(&refs);
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..8 {
                let next = reshuffle(&order, &mut rng);
                prop_assert_ne!(&next, &order);
                prop_assert!(same_membership(&next, &order));
                order = next;
            }
        }
    }
}

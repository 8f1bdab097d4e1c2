//! Gallery refresh and auto-scroll loops for the headless kiosk.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use booth_core::{ApiScope, FrameOutcome, GalleryFeed, GalleryImage, ScrollContainer};
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::client::BoothClient;
use crate::error::ClientError;
use crate::handle::SessionHandle;

/// Gallery state shared between the refresh and scroll loops.
pub type SharedFeed = Arc<Mutex<GalleryFeed>>;

/// Frame interval of the headless scroll loop (about 60 fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Lock the shared feed, recovering from a poisoned lock.
pub fn lock_feed(feed: &SharedFeed) -> MutexGuard<'_, GalleryFeed> {
    feed.lock().unwrap_or_else(PoisonError::into_inner)
}

impl BoothClient {
    /// Refresh `feed` from the room gallery every `interval`.
    ///
    /// The first refresh is issued immediately. Refreshes run one after the
    /// other; a failure keeps the current images and is reported to
    /// `on_error`.
    pub fn start_gallery_refresh<E>(
        &self,
        scope: impl Into<ApiScope>,
        feed: SharedFeed,
        interval: Duration,
        on_error: E,
    ) -> SessionHandle
    where
        E: Fn(&ClientError) + Send + 'static,
    {
        let scope = scope.into();
        let client = self.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(MIN_INTERVAL));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(room = %scope, ?interval, "Gallery refresh started");

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        info!(room = %scope, "Gallery refresh received shutdown signal");
                        break;
                    }

                    _ = ticker.tick() => {
                        let result = tokio::select! {
                            _ = &mut shutdown_rx => break,
                            result = client.refresh(scope.clone()) => result,
                        };
                        match result {
                            Ok(images) => {
                                let mut feed = lock_feed(&feed);
                                if feed.apply_refresh(images) {
                                    info!(room = %scope, images = feed.len(), "Gallery updated");
                                }
                            }
                            Err(e) => {
                                warn!(room = %scope, error = %e, "Gallery refresh failed");
                                lock_feed(&feed).record_refresh_error(e.to_string());
                                on_error(&e);
                            }
                        }
                    }
                }
            }
        });

        SessionHandle::new("gallery-refresh", handle, shutdown_tx)
    }
}

/// Drive the feed's auto-scroll against `track` every `frame_interval`.
///
/// `on_cycle` receives the reshuffled order each time the scroll wraps.
/// The loop ends when the feed is stopped or the handle is cancelled.
pub fn spawn_autoscroll<F>(
    feed: SharedFeed,
    mut track: VirtualTrack,
    frame_interval: Duration,
    on_cycle: F,
) -> SessionHandle
where
    F: Fn(&[GalleryImage]) + Send + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let start = Instant::now();
        let mut ticker = tokio::time::interval(frame_interval.max(MIN_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    debug!("Auto-scroll received shutdown signal");
                    break;
                }

                _ = ticker.tick() => {
                    let timestamp_ms = start.elapsed().as_secs_f64() * 1000.0;
                    let (outcome, reshuffled) = {
                        let mut feed = lock_feed(&feed);
                        track.set_cards(feed.len());
                        let outcome = feed.frame(timestamp_ms, &mut track);
                        let reshuffled =
                            (outcome == FrameOutcome::Wrapped).then(|| feed.order().to_vec());
                        (outcome, reshuffled)
                    };

                    if let Some(order) = reshuffled {
                        on_cycle(&order);
                    }
                    if !outcome.should_continue() {
                        debug!("Auto-scroll stopped");
                        break;
                    }
                }
            }
        }
    });

    SessionHandle::new("gallery-autoscroll", handle, shutdown_tx)
}

/// A scroll surface of uniform cards with no real display behind it.
///
/// Like a browser element it keeps its scroll position in whole pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualTrack {
    card_height: f64,
    viewport_height: f64,
    cards: usize,
    scroll_top: f64,
}

impl VirtualTrack {
    /// Track with the given card and viewport heights in pixels.
    #[must_use]
    pub const fn new(card_height: f64, viewport_height: f64) -> Self {
        Self {
            card_height,
            viewport_height,
            cards: 0,
            scroll_top: 0.0,
        }
    }

    /// Update the number of cards laid out on the track.
    pub fn set_cards(&mut self, cards: usize) {
        self.cards = cards;
    }

    /// Current whole-pixel scroll position.
    #[must_use]
    pub const fn scroll_top(&self) -> f64 {
        self.scroll_top
    }
}

impl ScrollContainer for VirtualTrack {
    fn content_height(&self) -> f64 {
        f64::from(u32::try_from(self.cards).unwrap_or(u32::MAX)) * self.card_height
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_top = offset.floor();
    }
}

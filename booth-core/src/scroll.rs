//! Frame-driven auto-scroll.
//!
//! The host calls [`AutoScroller::advance`] once per display frame with the
//! frame timestamp. The offset is integrated from elapsed wall-clock time,
//! so it stays correct under variable frame rates, and is tracked here as
//! a float because many containers round their scroll position to whole
//! pixels.

/// A scrollable surface the auto-scroller drives.
pub trait ScrollContainer {
    /// Total content height in pixels.
    fn content_height(&self) -> f64;

    /// Visible height in pixels.
    fn viewport_height(&self) -> f64;

    /// Move the visible window to `offset` pixels from the top.
    fn set_scroll_offset(&mut self, offset: f64);

    /// Distance the content can scroll before it must wrap.
    fn scroll_extent(&self) -> f64 {
        self.content_height() - self.viewport_height()
    }
}

/// Result of one animation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The loop was stopped; the host must not schedule another frame.
    Stopped,
    /// Nothing to scroll (no content, or content fits the viewport).
    Idle,
    /// Offset advanced to the contained value.
    Scrolled {
        /// New offset in pixels.
        offset: f64,
    },
    /// The offset reached the end and wrapped back to the top.
    Wrapped,
}

impl FrameOutcome {
    /// Whether the host should request another frame.
    #[must_use]
    pub const fn should_continue(&self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

/// Elapsed-time integrating scroll state.
#[derive(Debug, Clone)]
pub struct AutoScroller {
    pixels_per_second: f64,
    offset: f64,
    last_frame_ms: Option<f64>,
    stopped: bool,
}

impl AutoScroller {
    /// Create a scroller moving at `pixels_per_second`.
    #[must_use]
    pub fn new(pixels_per_second: f64) -> Self {
        Self {
            pixels_per_second: pixels_per_second.max(0.0),
            offset: 0.0,
            last_frame_ms: None,
            stopped: false,
        }
    }

    /// Current offset in pixels.
    #[must_use]
    pub const fn offset(&self) -> f64 {
        self.offset
    }

    /// Scroll speed in pixels per second.
    #[must_use]
    pub const fn pixels_per_second(&self) -> f64 {
        self.pixels_per_second
    }

    /// Forget the previous frame time so the next frame counts as the first.
    pub fn reset_clock(&mut self) {
        self.last_frame_ms = None;
    }

    /// Return to the top and restart the frame clock.
    pub fn rewind(&mut self) {
        self.offset = 0.0;
        self.last_frame_ms = None;
    }

    /// Stop the loop; every later frame reports [`FrameOutcome::Stopped`].
    pub fn stop(&mut self) {
        self.stopped = true;
        self.last_frame_ms = None;
    }

    /// Whether [`stop`](Self::stop) was called.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Advance by the time elapsed since the previous frame.
    ///
    /// When the next offset would reach or pass the scroll extent the offset
    /// wraps to zero and [`FrameOutcome::Wrapped`] is returned, exactly once
    /// per wrap.
    pub fn advance<C>(&mut self, timestamp_ms: f64, container: &mut C) -> FrameOutcome
    where
        C: ScrollContainer + ?Sized,
    {
        if self.stopped {
            return FrameOutcome::Stopped;
        }

        let elapsed_ms = self
            .last_frame_ms
            .map_or(0.0, |previous| (timestamp_ms - previous).max(0.0));
        self.last_frame_ms = Some(timestamp_ms);

        let extent = container.scroll_extent();
        if extent.is_nan() || extent <= 0.0 {
            return FrameOutcome::Idle;
        }

        let next = self.offset + elapsed_ms / 1000.0 * self.pixels_per_second;
        if next >= extent {
            self.offset = 0.0;
            container.set_scroll_offset(0.0);
            FrameOutcome::Wrapped
        } else {
            self.offset = next;
            container.set_scroll_offset(next);
            FrameOutcome::Scrolled { offset: next }
        }
    }
}

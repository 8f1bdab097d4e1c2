//! # Photo Booth Client
//!
//! Async HTTP client for the photo booth backend plus the loops a kiosk runs
//! on top of it:
//!
//! - [`BoothClient`] - job submission, status lookup with QR-hash fallback,
//!   gallery refresh, style and room lists
//! - [`BoothClient::start_polling`] - fixed-interval job polling
//! - [`BoothClient::start_gallery_refresh`] and [`spawn_autoscroll`] - the
//!   gallery screen
//! - [`SessionHandle`] - cancels a loop when dropped
//!
//! ## Usage
//!
//! ```bash
//! booth-kiosk --api-base http://localhost:8000 gallery room-a
//! booth-kiosk submit room-a photo.jpg 3 --watch
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod gallery;
pub mod handle;
pub mod photo;
pub mod poll;

use std::path::PathBuf;
use std::sync::Arc;

pub use client::BoothClient;
pub use error::{ClientError, ClientResult};
pub use gallery::{lock_feed, spawn_autoscroll, SharedFeed, VirtualTrack, FRAME_INTERVAL};
pub use handle::SessionHandle;
pub use photo::PhotoPayload;

use booth_core::{ApiScope, BoothConfig};
use clap::{Parser, Subcommand};

/// Backend used when neither `--api-base` nor `BOOTH_API_BASE` is given.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Command-line arguments for booth-kiosk.
#[derive(Debug, Clone, Parser)]
#[command(name = "booth-kiosk")]
#[command(about = "Headless photo booth kiosk client")]
#[command(version)]
pub struct CliArgs {
    /// Backend base URL (e.g., <http://localhost:8000>)
    #[arg(long, env = "BOOTH_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Use the un-scoped `/api` endpoints of a single-room backend
    #[arg(long, env = "BOOTH_LEGACY_API")]
    pub legacy: bool,

    /// Job status poll interval in milliseconds
    #[arg(long, env = "BOOTH_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Gallery refresh interval in milliseconds
    #[arg(long, env = "BOOTH_REFRESH_INTERVAL_MS")]
    pub refresh_interval_ms: Option<u64>,

    /// Gallery auto-scroll speed in pixels per second
    #[arg(long, env = "BOOTH_AUTOSCROLL_PPS")]
    pub autoscroll_pps: Option<f64>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Kiosk subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Resolve a public path to the screen it shows
    Route {
        /// Path such as `/room-a/result/42`
        path: String,
    },
    /// List the styles offered in a room
    Styles {
        /// Room identifier, normalized before use
        room: String,
    },
    /// List the public rooms
    Rooms,
    /// Upload a photo and start a generation job
    Submit {
        /// Room identifier, normalized before use
        room: String,
        /// Photo file to upload
        photo: PathBuf,
        /// Style id (positive integer)
        style_id: String,
        /// Keep polling until the job finishes
        #[arg(long)]
        watch: bool,
    },
    /// Poll a job until it completes or fails
    Watch {
        /// Room identifier, normalized before use
        room: String,
        /// Job id or QR hash
        job_ref: String,
    },
    /// Run the gallery screen until interrupted
    Gallery {
        /// Room identifier, normalized before use
        room: String,
        /// Viewport height in pixels
        #[arg(long, default_value = "720")]
        viewport: f64,
        /// Card height in pixels
        #[arg(long, default_value = "240")]
        card_height: f64,
    },
}

/// Kiosk configuration.
#[derive(Debug, Clone)]
pub struct KioskConfig {
    /// Backend base URL.
    pub api_base: String,
    /// Whether to use the legacy un-scoped endpoints.
    pub legacy: bool,
    /// Shared booth settings.
    pub booth: Arc<BoothConfig>,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            legacy: false,
            booth: Arc::new(BoothConfig::default()),
        }
    }
}

impl KioskConfig {
    /// API scope for `room`.
    #[must_use]
    pub fn scope(&self, room: &str) -> ApiScope {
        if self.legacy {
            ApiScope::Legacy
        } else {
            ApiScope::room(room)
        }
    }

    /// Build a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `api_base` is malformed.
    pub fn client(&self) -> ClientResult<BoothClient> {
        BoothClient::new(&self.api_base, Arc::clone(&self.booth))
    }
}

impl From<&CliArgs> for KioskConfig {
    fn from(args: &CliArgs) -> Self {
        let mut booth = BoothConfig::default();
        if let Some(ms) = args.poll_interval_ms {
            booth.poll_interval_ms = ms;
        }
        if let Some(ms) = args.refresh_interval_ms {
            booth.gallery_refresh_interval_ms = ms;
        }
        if let Some(pps) = args.autoscroll_pps {
            booth.autoscroll_pixels_per_second = pps;
        }
        Self {
            api_base: args.api_base.clone(),
            legacy: args.legacy,
            booth: Arc::new(booth),
        }
    }
}

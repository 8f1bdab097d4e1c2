//! # Photo Booth Core
//!
//! I/O-free client logic shared by every booth surface (kiosk binary, WASM
//! app). Compiles to WASM.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 booth-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Room Identity     │  Public Routes         │
//! │  - Slug normalize  │  - Path → screen       │
//! │  - Scoped paths    │  - Screen → path       │
//! ├─────────────────────────────────────────────┤
//! │  Job Lifecycle     │  Gallery Feed          │
//! │  - Status views    │  - Reconcile           │
//! │  - Poll sequencing │  - Auto-scroll/shuffle │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod gallery;
pub mod job;
pub mod room;
pub mod route;
pub mod scroll;
pub mod style;

pub use config::BoothConfig;
pub use error::{BoothError, BoothResult};
pub use gallery::{
    card_variant, reconcile, reshuffle, same_membership, CardVariant, GalleryFeed, GalleryImage,
};
pub use job::{JobCreated, JobReference, JobSession, JobState, JobStatus, ResultView};
pub use room::{build_scoped_path, encode_component, normalize, ApiScope, RoomSlug, DEFAULT_ROOM_SLUG};
pub use route::{resolve_route, PublicRoute};
pub use scroll::{AutoScroller, FrameOutcome, ScrollContainer};
pub use style::{parse_style_id, style_id_from_query, unique_by_slug, PublicRoom, StylePrompt};

/// Booth core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

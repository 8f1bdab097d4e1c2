//! Public route resolution.
//!
//! Maps a URL path onto the screen to mount and its room/job parameters,
//! and builds paths back for navigation. Disambiguation is positional only
//! (segment count plus the literal `gallery`/`result` keywords); there is no
//! lookup against known rooms.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BoothError;
use crate::job::JobReference;
use crate::room::RoomSlug;

const GALLERY: &str = "gallery";
const RESULT: &str = "result";

/// Screen intent derived from a public path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "page", rename_all = "lowercase")]
pub enum PublicRoute {
    /// Photo capture and style selection.
    Capture {
        /// Room the booth belongs to.
        room: RoomSlug,
    },
    /// Auto-scrolling results gallery.
    Gallery {
        /// Room whose results are shown.
        room: RoomSlug,
    },
    /// Progress and download view for one job.
    Result {
        /// Room the job was submitted to.
        room: RoomSlug,
        /// Job reference taken verbatim from the path.
        job_ref: JobReference,
    },
}

impl PublicRoute {
    /// Room the route belongs to.
    #[must_use]
    pub fn room(&self) -> &RoomSlug {
        match self {
            Self::Capture { room } | Self::Gallery { room } | Self::Result { room, .. } => room,
        }
    }

    /// Build the canonical room-scoped path for this route.
    ///
    /// The job reference is written verbatim, so it must be a single path
    /// segment; a reference containing `/` does not resolve back to itself.
    #[must_use]
    pub fn to_path(&self) -> String {
        match self {
            Self::Capture { room } => format!("/{room}"),
            Self::Gallery { room } => format!("/{room}/{GALLERY}"),
            Self::Result { room, job_ref } => format!("/{room}/{RESULT}/{job_ref}"),
        }
    }
}

impl std::fmt::Display for PublicRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_path())
    }
}

impl FromStr for PublicRoute {
    type Err = BoothError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        resolve_route(path).ok_or_else(|| BoothError::RouteUnresolved(path.to_string()))
    }
}

/// Resolve a URL path into a public route. First matching rule wins:
///
/// 1. `/` - capture, default room
/// 2. `/{room}/gallery` (optional trailing slash) - gallery
/// 3. `/{room}/result/{ref}` - result
/// 4. `/{room}` - capture (except the bare legacy `/gallery`)
/// 5. `/gallery` - gallery, default room
/// 6. `/result/{ref}` - result, default room
///
/// Anything else yields `None` and the caller falls back to its default
/// screen.
#[must_use]
pub fn resolve_route(path: &str) -> Option<PublicRoute> {
    if path == "/" {
        return Some(PublicRoute::Capture {
            room: RoomSlug::default(),
        });
    }

    let rest = path.strip_prefix('/')?;
    let segments: Vec<&str> = rest.split('/').collect();

    let route = match segments.as_slice() {
        [room, GALLERY] | [room, GALLERY, ""] if !room.is_empty() => PublicRoute::Gallery {
            room: RoomSlug::new(room),
        },
        [room, RESULT, job_ref] if !room.is_empty() && !job_ref.is_empty() => {
            PublicRoute::Result {
                room: RoomSlug::new(room),
                job_ref: JobReference::new(*job_ref),
            }
        }
        [GALLERY] => PublicRoute::Gallery {
            room: RoomSlug::default(),
        },
        [room] if !room.is_empty() => PublicRoute::Capture {
            room: RoomSlug::new(room),
        },
        [RESULT, job_ref] if !job_ref.is_empty() => PublicRoute::Result {
            room: RoomSlug::default(),
            job_ref: JobReference::new(*job_ref),
        },
        _ => return None,
    };

    Some(route)
}

//! Error types for booth core operations.

use thiserror::Error;

/// Result type for booth core operations.
pub type BoothResult<T> = Result<T, BoothError>;

/// Errors that can occur in booth core operations.
#[derive(Debug, Error)]
pub enum BoothError {
    /// No public route pattern matched the path.
    #[error("Route unresolved: {0}")]
    RouteUnresolved(String),

    /// A style identifier was missing, non-numeric or not positive.
    #[error("Invalid style id: {0}")]
    InvalidStyleId(String),

    /// Payload serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

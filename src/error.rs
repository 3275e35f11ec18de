//! Error types for the recipe-scout host.

use recipe_search::SearchError;

/// Top-level error type for the host and its command service.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Configuration error (unreadable TOML, invalid knob values).
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Search aggregation or filtering error.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// Command payload missing a field or carrying the wrong shape.
    #[error("invalid payload: {0}")]
    Payload(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ScoutError>;

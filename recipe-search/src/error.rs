//! Error types for the recipe-search crate.
//!
//! Messages are stable strings suitable for display to users. API keys never
//! appear in error messages; provider errors carry only the upstream message.

/// Errors that can occur while aggregating or filtering search results.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request was rejected before any network call was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// The search provider failed (transport or API-level). Aborts the
    /// whole aggregation.
    #[error("search provider error: {0}")]
    Provider(String),

    /// A filter toggle was requested but no generative backend is configured.
    #[error("filter backend not configured: set a Gemini API key to enable filtering")]
    FilterBackendUnavailable,

    /// The generative backend could not be reached or returned an API error.
    #[error("filter backend error: {0}")]
    FilterBackend(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for recipe-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

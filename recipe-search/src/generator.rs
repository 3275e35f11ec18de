//! Generative-text backend trait.
//!
//! A [`TextGenerator`] turns one free-text prompt into one free-text reply.
//! Nothing about the reply's structure is guaranteed; callers must parse
//! leniently (see [`crate::filter`]).

use async_trait::async_trait;

use crate::error::SearchError;

/// Trait for generative-text backends.
///
/// Object safe so a [`crate::filter::ContentFilter`] can hold any backend
/// behind a `Box<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name used in log fields.
    fn name(&self) -> &str;

    /// Send `prompt` and return the raw reply text.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::FilterBackend`] if the backend cannot be
    /// reached or answers with an API error.
    async fn generate(&self, prompt: &str) -> Result<String, SearchError>;
}

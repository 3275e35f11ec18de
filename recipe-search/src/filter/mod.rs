//! Optional generative filtering of result titles.
//!
//! [`ContentFilter`] asks a [`TextGenerator`] to deduplicate and/or
//! policy-filter a list of titles. The reply is free text, so it is parsed
//! leniently; an unusable reply returns the input unchanged rather than
//! failing or dropping titles.

mod parse;
pub mod prompt;

use std::collections::HashSet;

use crate::error::SearchError;
use crate::generator::TextGenerator;
use crate::types::{FilterMode, FilterOutcome, FilterRequest};

pub use prompt::{build_filter_prompt, DISALLOWED_INGREDIENTS};

/// Title filter backed by an optional generative-text backend.
///
/// A filter without a backend still serves requests with both toggles off.
#[derive(Default)]
pub struct ContentFilter {
    generator: Option<Box<dyn TextGenerator>>,
}

impl std::fmt::Debug for ContentFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentFilter")
            .field("backend", &self.generator.as_ref().map(|g| g.name()))
            .finish()
    }
}

impl ContentFilter {
    /// A filter with no backend configured.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A filter backed by `generator`.
    pub fn with_generator(generator: impl TextGenerator + 'static) -> Self {
        Self {
            generator: Some(Box::new(generator)),
        }
    }

    /// A filter from an optional boxed backend.
    #[must_use]
    pub fn from_boxed(generator: Option<Box<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    /// Whether a backend is configured.
    #[must_use]
    pub fn has_backend(&self) -> bool {
        self.generator.is_some()
    }

    /// Filter `request.titles`.
    ///
    /// - No toggle set: titles are returned unchanged without touching (or
    ///   requiring) a backend.
    /// - Toggle set, no backend: [`SearchError::FilterBackendUnavailable`].
    /// - Otherwise the prompt is sent and the reply parsed. Parsed titles
    ///   that are not in the input are dropped. A reply that is not a JSON
    ///   array of strings yields the input titles unchanged.
    ///
    /// # Errors
    ///
    /// [`SearchError::FilterBackendUnavailable`] as above, or
    /// [`SearchError::FilterBackend`] if the backend call itself fails.
    pub async fn filter(&self, request: &FilterRequest) -> Result<FilterOutcome, SearchError> {
        let original_count = request.titles.len();

        if !request.is_requested() {
            return Ok(FilterOutcome::new(
                request.titles.clone(),
                original_count,
                FilterMode::PassThrough,
            ));
        }

        let generator = self
            .generator
            .as_deref()
            .ok_or(SearchError::FilterBackendUnavailable)?;

        let prompt = build_filter_prompt(
            &request.titles,
            request.dedupe,
            request.exclude_disallowed,
        );
        tracing::debug!(
            backend = generator.name(),
            titles = original_count,
            dedupe = request.dedupe,
            exclude_disallowed = request.exclude_disallowed,
            "sending titles to filter backend"
        );

        let reply = generator.generate(&prompt).await?;
        tracing::trace!(reply = %reply, "filter backend reply");

        match parse::parse_filter_reply(&reply) {
            Ok(parsed) => {
                let known: HashSet<&str> = request.titles.iter().map(String::as_str).collect();
                let replied = parsed.len();
                let filtered: Vec<String> = parsed
                    .into_iter()
                    .filter(|title| known.contains(title.as_str()))
                    .collect();
                if filtered.len() < replied {
                    tracing::debug!(
                        dropped = replied - filtered.len(),
                        "filter reply named titles not in the input"
                    );
                }
                tracing::debug!(kept = filtered.len(), of = original_count, "filter reply parsed");
                Ok(FilterOutcome::new(filtered, original_count, FilterMode::Parsed))
            }
            Err(err) => {
                tracing::warn!(error = %err, "unusable filter reply; returning titles unfiltered");
                Ok(FilterOutcome::new(
                    request.titles.clone(),
                    original_count,
                    FilterMode::Fallback,
                ))
            }
        }
    }
}

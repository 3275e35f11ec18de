//! # recipe-search
//!
//! Date-windowed web search aggregation with optional generative filtering.
//!
//! A keyword is searched once per date window through the Google Custom
//! Search JSON API, paging past the API's ten-results-per-request limit.
//! Windows run concurrently; their results are merged in window order and
//! deduplicated by case-insensitive title. The merged titles can then be sent
//! to a generative backend (Gemini) to remove near duplicates or titles that
//! mention disallowed ingredients.
//!
//! ## Design
//!
//! - One paginated fetch per window, polled concurrently on the caller's task
//! - Fail-fast join: one failing window fails the whole aggregation
//! - Merge order follows the request's window order, never completion order
//! - Filter replies are parsed leniently; an unusable reply returns the
//!   input titles unchanged
//!
//! ## Security
//!
//! - API keys never appear in `Debug` output or error messages
//! - Query text is logged only at trace level

pub mod config;
pub mod engines;
pub mod error;
pub mod filter;
pub mod generator;
pub mod generators;
pub mod http;
pub mod orchestrator;
pub mod paginate;
pub mod provider;
pub mod query;
pub mod types;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use filter::ContentFilter;
pub use generator::TextGenerator;
pub use provider::SearchProvider;
pub use types::{
    AggregatedOutcome, Credentials, DateWindow, FilterMode, FilterOutcome, FilterRequest,
    SearchRequest, SearchResult,
};

/// Aggregate search results for every window of `request` via Google
/// Custom Search.
///
/// Builds a [`engines::GoogleCseProvider`] from `config` and runs
/// [`orchestrator::aggregate_with`].
///
/// # Errors
///
/// Returns [`SearchError::Validation`] for an incomplete request,
/// [`SearchError::Config`] for an invalid `config`, and
/// [`SearchError::Provider`] if any window's fetch fails.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> recipe_search::Result<()> {
/// use recipe_search::{Credentials, DateWindow, SearchConfig, SearchRequest};
///
/// let request = SearchRequest::new("chicken soup", Credentials::new("api-key", "cx-id"))
///     .with_window(DateWindow::between("2024-01-01", "2024-06-30"));
/// let outcome = recipe_search::aggregate(&request, &SearchConfig::default()).await?;
/// for result in &outcome.results {
///     println!("{}", result.title);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn aggregate(request: &SearchRequest, config: &SearchConfig) -> Result<AggregatedOutcome> {
    config.validate()?;
    orchestrator::search::validate_request(request)?;
    let provider = engines::GoogleCseProvider::new(config)?;
    orchestrator::aggregate_with(&provider, request, config).await
}

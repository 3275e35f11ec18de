//! Search configuration with the provider's pagination limits as defaults.
//!
//! [`SearchConfig`] holds the provider-specific constants (page size, the
//! highest start index the provider will serve, the default per-window cap)
//! together with request pacing and HTTP behaviour. The defaults match the
//! Google Custom Search JSON API.

use crate::error::SearchError;

/// Largest page the Custom Search API will return in one request.
pub const PROVIDER_MAX_PAGE_SIZE: usize = 10;

/// Configuration for windowed search aggregation.
///
/// Use [`Default::default()`] for the Custom Search limits, or construct with
/// field overrides for a provider with different limits.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Results requested per page, and the amount the start offset advances
    /// after every page.
    pub page_size: usize,
    /// Highest 1-based start offset the provider will serve. Pagination stops
    /// once the next offset would exceed it.
    pub max_start_index: usize,
    /// Per-window result cap used when a request does not set one.
    pub default_max_results: usize,
    /// Pause between consecutive pages of one window, in milliseconds.
    pub page_delay_ms: u64,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, the crate's own name and version
    /// are sent.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: PROVIDER_MAX_PAGE_SIZE,
            max_start_index: 91,
            default_max_results: 100,
            page_delay_ms: 100,
            timeout_seconds: 10,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `page_size` must be in `1..=10`
    /// - `max_start_index` must be greater than 0
    /// - `default_max_results` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.page_size == 0 {
            return Err(SearchError::Config(
                "page_size must be greater than 0".into(),
            ));
        }
        if self.page_size > PROVIDER_MAX_PAGE_SIZE {
            return Err(SearchError::Config(format!(
                "page_size must be <= {PROVIDER_MAX_PAGE_SIZE}"
            )));
        }
        if self.max_start_index == 0 {
            return Err(SearchError::Config(
                "max_start_index must be greater than 0".into(),
            ));
        }
        if self.default_max_results == 0 {
            return Err(SearchError::Config(
                "default_max_results must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

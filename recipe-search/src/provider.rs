//! Trait definition for paged search providers.
//!
//! A [`SearchProvider`] answers exactly one page request. Pagination, caps
//! and pacing live in [`crate::paginate`], so providers stay thin wrappers
//! around a single HTTP call.

use crate::error::SearchError;
use crate::types::Credentials;

/// One page request sent to the provider.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    /// Full query text, including any window dorks.
    pub query: &'a str,
    /// Provider credentials.
    pub credentials: &'a Credentials,
    /// 1-based index of the first result on this page.
    pub start: usize,
    /// Number of results requested (at most the provider's page maximum).
    pub num: usize,
}

/// One raw item from a provider page. Items without a title are dropped by
/// the paginator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

/// One page of provider results.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Items on this page, in provider order.
    pub items: Vec<PageItem>,
    /// The provider's estimate of the total result count, if reported.
    pub total_results: Option<u64>,
}

/// A search backend that serves results one page at a time.
///
/// All implementations must be `Send + Sync` so a single provider can serve
/// every window of an aggregation concurrently.
pub trait SearchProvider: Send + Sync {
    /// Fetch one page of results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Provider`] carrying the upstream message on any
    /// transport or API-level failure.
    fn fetch_page(
        &self,
        request: PageRequest<'_>,
    ) -> impl std::future::Future<Output = Result<Page, SearchError>> + Send;

    /// Short provider name used in log fields.
    fn name(&self) -> &'static str;
}

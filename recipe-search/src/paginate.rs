//! Page-by-page retrieval of one query up to a result cap.
//!
//! The Custom Search API serves at most ten results per request and refuses
//! start offsets beyond a fixed ceiling, so a window that wants more than one
//! page walks the offset forward, pausing briefly between pages.

use std::time::Duration;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::provider::{PageRequest, SearchProvider};
use crate::types::{Credentials, SearchResult};

/// Fetch up to `cap` results for `query`, one provider page at a time.
///
/// # Stop conditions
///
/// - `cap` results have been collected (possibly mid-page)
/// - the provider returned an empty page
/// - the provider's total-results estimate has been reached
/// - the next start offset would exceed `config.max_start_index`
///
/// Items with an empty title are skipped and do not count towards the cap.
///
/// # Errors
///
/// Any page failure aborts the whole call with that error; results gathered
/// from earlier pages are discarded. No retry is attempted.
pub async fn fetch_paginated<P: SearchProvider>(
    provider: &P,
    query: &str,
    credentials: &Credentials,
    cap: usize,
    config: &SearchConfig,
) -> Result<Vec<SearchResult>, SearchError> {
    let mut results: Vec<SearchResult> = Vec::new();
    let mut start = 1;

    while results.len() < cap {
        let num = config.page_size.min(cap - results.len());
        tracing::debug!(provider = provider.name(), start, num, "requesting page");

        let page = provider
            .fetch_page(PageRequest {
                query,
                credentials,
                start,
                num,
            })
            .await
            .inspect_err(|e| {
                tracing::warn!(provider = provider.name(), start, error = %e, "page request failed");
            })?;

        if page.items.is_empty() {
            tracing::debug!(start, "empty page; no more results");
            break;
        }

        for item in page.items {
            if results.len() >= cap {
                break;
            }
            let Some(title) = item.title.filter(|t| !t.is_empty()) else {
                continue;
            };
            results.push(SearchResult {
                title,
                link: item.link,
                snippet: item.snippet,
            });
        }

        start += config.page_size;

        if let Some(total) = page.total_results {
            if results.len() as u64 >= total {
                tracing::debug!(total, "reached provider total estimate");
                break;
            }
        }

        if start > config.max_start_index || results.len() >= cap {
            break;
        }

        if config.page_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.page_delay_ms)).await;
        }
    }

    tracing::debug!(count = results.len(), cap, "window fetch complete");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Page, PageItem};
    use std::sync::Mutex;

    /// Serves pages from a fixed corpus and records every request.
    struct CorpusProvider {
        corpus: Vec<PageItem>,
        total_results: Option<u64>,
        calls: Mutex<Vec<(usize, usize)>>,
        fail_at_start: Option<usize>,
    }

    impl CorpusProvider {
        fn with_titles(count: usize) -> Self {
            let corpus = (0..count)
                .map(|i| PageItem {
                    title: Some(format!("Recipe {i}")),
                    link: Some(format!("https://recipes.example/{i}")),
                    snippet: None,
                })
                .collect();
            Self {
                corpus,
                total_results: None,
                calls: Mutex::new(Vec::new()),
                fail_at_start: None,
            }
        }

        fn calls(&self) -> Vec<(usize, usize)> {
            self.calls.lock().expect("lock").clone()
        }
    }

    impl SearchProvider for CorpusProvider {
        async fn fetch_page(&self, request: PageRequest<'_>) -> Result<Page, SearchError> {
            self.calls
                .lock()
                .expect("lock")
                .push((request.start, request.num));
            if self.fail_at_start == Some(request.start) {
                return Err(SearchError::Provider("backend error".into()));
            }
            let from = (request.start - 1).min(self.corpus.len());
            let to = (from + request.num).min(self.corpus.len());
            Ok(Page {
                items: self.corpus[from..to].to_vec(),
                total_results: self.total_results,
            })
        }

        fn name(&self) -> &'static str {
            "corpus"
        }
    }

    fn config() -> SearchConfig {
        SearchConfig {
            page_delay_ms: 0,
            ..Default::default()
        }
    }

    fn creds() -> Credentials {
        Credentials::new("key", "cx")
    }

    #[tokio::test]
    async fn stops_at_cap_mid_page() {
        let provider = CorpusProvider::with_titles(50);
        let results = fetch_paginated(&provider, "soup", &creds(), 15, &config())
            .await
            .expect("fetch");
        assert_eq!(results.len(), 15);
        assert_eq!(provider.calls(), vec![(1, 10), (11, 5)]);
    }

    #[tokio::test]
    async fn stops_on_empty_page() {
        let provider = CorpusProvider::with_titles(10);
        let results = fetch_paginated(&provider, "soup", &creds(), 100, &config())
            .await
            .expect("fetch");
        assert_eq!(results.len(), 10);
        assert_eq!(provider.calls(), vec![(1, 10), (11, 10)]);
    }

    #[tokio::test]
    async fn respects_start_index_ceiling() {
        let provider = CorpusProvider::with_titles(500);
        let results = fetch_paginated(&provider, "soup", &creds(), 200, &config())
            .await
            .expect("fetch");
        assert_eq!(results.len(), 100);
        let calls = provider.calls();
        assert_eq!(calls.len(), 10);
        assert_eq!(calls.last(), Some(&(91, 10)));
    }

    #[tokio::test]
    async fn stops_when_total_estimate_reached() {
        let mut provider = CorpusProvider::with_titles(40);
        provider.total_results = Some(12);
        let results = fetch_paginated(&provider, "soup", &creds(), 100, &config())
            .await
            .expect("fetch");
        assert_eq!(results.len(), 20);
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test]
    async fn skips_untitled_items() {
        let mut provider = CorpusProvider::with_titles(4);
        provider.corpus[1].title = None;
        provider.corpus[2].title = Some(String::new());
        let results = fetch_paginated(&provider, "soup", &creds(), 100, &config())
            .await
            .expect("fetch");
        let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Recipe 0", "Recipe 3"]);
    }

    #[tokio::test]
    async fn zero_cap_issues_no_request() {
        let provider = CorpusProvider::with_titles(10);
        let results = fetch_paginated(&provider, "soup", &creds(), 0, &config())
            .await
            .expect("fetch");
        assert!(results.is_empty());
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn page_failure_discards_earlier_pages() {
        let mut provider = CorpusProvider::with_titles(50);
        provider.fail_at_start = Some(21);
        let err = fetch_paginated(&provider, "soup", &creds(), 50, &config())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Provider(ref m) if m == "backend error"));
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test]
    async fn custom_page_size_advances_offset() {
        let provider = CorpusProvider::with_titles(20);
        let config = SearchConfig {
            page_size: 5,
            page_delay_ms: 0,
            ..Default::default()
        };
        let results = fetch_paginated(&provider, "soup", &creds(), 12, &config)
            .await
            .expect("fetch");
        assert_eq!(results.len(), 12);
        assert_eq!(provider.calls(), vec![(1, 5), (6, 5), (11, 2)]);
    }
}

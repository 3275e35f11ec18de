//! Core aggregation: per-window fan-out, ordered join, title dedup.
//!
//! Every date window becomes one paginated fetch. The fetches run
//! concurrently on the caller's task; each result is stored in the slot of
//! the window that produced it, so the merged order follows the request's
//! window order no matter which fetch finishes first.

use futures::stream::{FuturesUnordered, StreamExt};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::paginate::fetch_paginated;
use crate::provider::SearchProvider;
use crate::query::build_query;
use crate::types::{AggregatedOutcome, DateWindow, SearchRequest, SearchResult};

use super::dedup::dedupe_by_title;

/// Display label for a request that spans more than one window.
pub const MULTIPLE_WINDOWS_LABEL: &str = "Multiple time ranges";

/// Reject requests that cannot be sent, before any network call.
///
/// # Errors
///
/// Returns [`SearchError::Validation`] for an empty keyword, missing
/// credentials, or a zero per-window cap.
pub fn validate_request(request: &SearchRequest) -> Result<(), SearchError> {
    let mut missing = Vec::new();
    if request.keyword.trim().is_empty() {
        missing.push("keyword");
    }
    if request.credentials.api_key.trim().is_empty() {
        missing.push("apiKey");
    }
    if request.credentials.search_engine_id.trim().is_empty() {
        missing.push("searchEngineId");
    }
    if !missing.is_empty() {
        return Err(SearchError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }
    if request.max_results_per_window == Some(0) {
        return Err(SearchError::Validation(
            "maxResults must be greater than 0".into(),
        ));
    }
    Ok(())
}

/// Aggregate results for every window of `request` using `provider`.
///
/// # Pipeline
///
/// 1. Validate the config and request
/// 2. Resolve windows (none ⇒ one unconstrained window)
/// 3. Build one query per window and start all paginated fetches together
/// 4. Store each window's results by window index as fetches settle
/// 5. Flatten slots in window order and deduplicate by case-folded title
///
/// # Errors
///
/// Fails fast: the first window error observed is returned and every other
/// window's results, finished or not, are discarded.
pub async fn aggregate_with<P: SearchProvider>(
    provider: &P,
    request: &SearchRequest,
    config: &SearchConfig,
) -> Result<AggregatedOutcome, SearchError> {
    config.validate()?;
    validate_request(request)?;

    let cap = request
        .max_results_per_window
        .unwrap_or(config.default_max_results);

    let unbounded = [DateWindow::unbounded()];
    let windows: &[DateWindow] = if request.windows.is_empty() {
        &unbounded
    } else {
        &request.windows
    };

    // 1. Fan out one fetch per window.
    let mut pending: FuturesUnordered<_> = windows
        .iter()
        .enumerate()
        .map(|(index, window)| {
            let query = build_query(
                &request.keyword,
                request.extra_query_clause.as_deref(),
                Some(window),
            );
            async move {
                tracing::trace!(window = index, query = %query, "starting window fetch");
                let outcome =
                    fetch_paginated(provider, &query, &request.credentials, cap, config).await;
                (index, outcome)
            }
        })
        .collect();

    // 2. Join by window index; first failure aborts.
    let mut slots: Vec<Option<Vec<SearchResult>>> = vec![None; windows.len()];
    while let Some((index, outcome)) = pending.next().await {
        match outcome {
            Ok(results) => {
                tracing::debug!(window = index, count = results.len(), "window returned results");
                slots[index] = Some(results);
            }
            Err(err) => {
                tracing::warn!(window = index, error = %err, "window fetch failed; aborting aggregation");
                return Err(err);
            }
        }
    }

    // 3. Flatten in submission order, then dedup.
    let combined: Vec<SearchResult> = slots.into_iter().flatten().flatten().collect();
    let combined_len = combined.len();
    let results = dedupe_by_title(combined);
    tracing::debug!(
        windows = windows.len(),
        combined = combined_len,
        unique = results.len(),
        "aggregation complete"
    );

    let query = if windows.len() > 1 {
        MULTIPLE_WINDOWS_LABEL.to_string()
    } else {
        request.keyword.clone()
    };

    Ok(AggregatedOutcome {
        total: results.len(),
        results,
        query,
    })
}

//! Result deduplication by case-folded title.
//!
//! A single left-to-right pass: the first result carrying a given title
//! (ignoring case) is kept, later ones are dropped. Titles are otherwise
//! compared verbatim, so whitespace and punctuation differences survive.

use std::collections::HashSet;

use crate::types::SearchResult;

/// The deduplication key for a title.
pub fn title_key(title: &str) -> String {
    title.to_lowercase()
}

/// Deduplicate results by case-folded title, keeping first occurrences.
///
/// Output order is the input order with duplicates removed.
pub fn dedupe_by_title(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::with_capacity(results.len());
    results
        .into_iter()
        .filter(|result| seen.insert(title_key(&result.title)))
        .collect()
}

//! Core request and result types for windowed search and title filtering.
//!
//! Every type here is a request-scoped value: nothing is cached or persisted
//! between calls. Wire names are camelCase so the host bridge can pass
//! payloads straight through.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A date-bounded (or unbounded) variant of a search request.
///
/// Dates are ISO calendar strings (`YYYY-MM-DD`) and are passed to the
/// provider verbatim. A window only constrains the query when **both**
/// bounds are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// Inclusive lower bound, emitted as `after:<date>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Upper bound, emitted as `before:<date>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
}

impl DateWindow {
    /// A window with no date constraint.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A window bounded by two dates.
    pub fn between(after: impl Into<String>, before: impl Into<String>) -> Self {
        Self {
            after: Some(after.into()),
            before: Some(before.into()),
        }
    }

    /// The window covering the `days` days up to and including `today`.
    #[must_use]
    pub fn last_days(days: u64, today: NaiveDate) -> Self {
        let start = today
            .checked_sub_days(chrono::Days::new(days))
            .unwrap_or(NaiveDate::MIN);
        Self::between(start.to_string(), today.to_string())
    }

    /// Returns both bounds when the window actually constrains the query.
    #[must_use]
    pub fn bounds(&self) -> Option<(&str, &str)> {
        match (self.after.as_deref(), self.before.as_deref()) {
            (Some(after), Some(before)) => Some((after, before)),
            _ => None,
        }
    }
}

/// Preset window lengths offered to users, in days.
pub const WINDOW_PRESETS: &[(u64, &str)] = &[
    (7, "Last 7 days"),
    (30, "Last 30 days"),
    (90, "Last 90 days"),
    (365, "Last year"),
];

/// Search provider credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Provider API key.
    #[serde(default)]
    pub api_key: String,
    /// Programmable search engine id (`cx`).
    #[serde(default)]
    pub search_engine_id: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, search_engine_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            search_engine_id: search_engine_id.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.api_key.is_empty() { "" } else { "***" };
        f.debug_struct("Credentials")
            .field("api_key", &key)
            .field("search_engine_id", &self.search_engine_id)
            .finish()
    }
}

/// One aggregation request: a keyword searched once per date window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Search keyword. Required and non-empty.
    pub keyword: String,
    /// Literal clause appended to every window's query (e.g. `site:example.com`).
    #[serde(default, alias = "customDork", skip_serializing_if = "Option::is_none")]
    pub extra_query_clause: Option<String>,
    /// Date windows. Empty means a single unconstrained window.
    #[serde(default, alias = "timeRanges")]
    pub windows: Vec<DateWindow>,
    /// Per-window result cap. `None` uses the configured default.
    #[serde(default, alias = "maxResults", skip_serializing_if = "Option::is_none")]
    pub max_results_per_window: Option<usize>,
    /// Provider credentials.
    #[serde(flatten)]
    pub credentials: Credentials,
}

impl SearchRequest {
    /// Start a request for `keyword` with the given credentials.
    pub fn new(keyword: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            keyword: keyword.into(),
            extra_query_clause: None,
            windows: Vec::new(),
            max_results_per_window: None,
            credentials,
        }
    }

    /// Append a literal clause to every window's query.
    pub fn with_extra_clause(mut self, clause: impl Into<String>) -> Self {
        self.extra_query_clause = Some(clause.into());
        self
    }

    /// Add a date window.
    #[must_use]
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.windows.push(window);
        self
    }

    /// Override the per-window result cap.
    #[must_use]
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results_per_window = Some(max);
        self
    }
}

/// A single search hit. Only results with a non-empty title are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result page title.
    pub title: String,
    /// Result URL, when the provider supplied one.
    #[serde(default)]
    pub link: Option<String>,
    /// Text snippet, when the provider supplied one.
    #[serde(default)]
    pub snippet: Option<String>,
}

/// The merged, deduplicated output of one aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedOutcome {
    /// Unique results in window submission order.
    pub results: Vec<SearchResult>,
    /// Number of entries in `results`.
    pub total: usize,
    /// Display label: the keyword, or `Multiple time ranges`.
    pub query: String,
}

impl AggregatedOutcome {
    /// Titles of all results, in order.
    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        self.results.iter().map(|r| r.title.clone()).collect()
    }

    /// Keep only the results whose title appears (exactly) in `titles`.
    ///
    /// Used to map filtered titles back onto full result records. Order of
    /// the surviving results is unchanged.
    #[must_use]
    pub fn retain_titles(&self, titles: &[String]) -> Vec<SearchResult> {
        let keep: std::collections::HashSet<&str> = titles.iter().map(String::as_str).collect();
        self.results
            .iter()
            .filter(|r| keep.contains(r.title.as_str()))
            .cloned()
            .collect()
    }
}

/// Request to filter a list of titles through the generative backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    /// Titles to filter.
    pub titles: Vec<String>,
    /// Remove exact and near-duplicate titles.
    #[serde(default, alias = "useDeduplication")]
    pub dedupe: bool,
    /// Remove titles referencing disallowed ingredients.
    #[serde(default, alias = "filterHaram")]
    pub exclude_disallowed: bool,
}

impl FilterRequest {
    /// Whether any backend filtering was requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.dedupe || self.exclude_disallowed
    }
}

/// How a [`FilterOutcome`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// No toggle set; the backend was not called.
    PassThrough,
    /// The backend reply parsed as a list of titles.
    Parsed,
    /// The backend reply was unusable; the input was returned unchanged.
    Fallback,
}

/// Result of a filter call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOutcome {
    /// Surviving titles.
    pub filtered: Vec<String>,
    /// Number of input titles.
    pub original_count: usize,
    /// Number of surviving titles.
    pub filtered_count: usize,
    /// Which path produced `filtered`.
    pub mode: FilterMode,
}

impl FilterOutcome {
    pub(crate) fn new(filtered: Vec<String>, original_count: usize, mode: FilterMode) -> Self {
        Self {
            filtered_count: filtered.len(),
            filtered,
            original_count,
            mode,
        }
    }
}

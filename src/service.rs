//! Command service: owns the configuration and the search/filter backends.

use std::path::PathBuf;

use recipe_search::engines::GoogleCseProvider;
use recipe_search::generators::GeminiGenerator;
use recipe_search::orchestrator::aggregate_with;
use recipe_search::{
    AggregatedOutcome, ContentFilter, FilterOutcome, FilterRequest, SearchRequest, SearchResult,
};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigPatch, ScoutConfig};
use crate::error::Result;

/// A search followed by optional filtering, as one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    #[serde(flatten)]
    pub search: SearchRequest,
    #[serde(default, alias = "useDeduplication")]
    pub dedupe: bool,
    #[serde(default, alias = "filterHaram")]
    pub exclude_disallowed: bool,
}

/// Outcome of [`RecipeService::run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    /// Results surviving the filter (all results when no filter ran).
    pub results: Vec<SearchResult>,
    /// The unfiltered aggregation.
    pub raw: AggregatedOutcome,
    /// Filter details, when a filter toggle was set.
    pub filter: Option<FilterOutcome>,
}

/// Search and filter service behind the host bridge.
#[derive(Debug)]
pub struct RecipeService {
    config: ScoutConfig,
    config_path: Option<PathBuf>,
    provider: GoogleCseProvider,
    filter: ContentFilter,
}

fn build_backends(config: &ScoutConfig) -> Result<(GoogleCseProvider, ContentFilter)> {
    config.validate()?;
    let search = config.search.search_config();
    let provider = GoogleCseProvider::new(&search)?.with_base_url(config.search.base_url.clone());
    let filter = match config.gemini_config() {
        Some(gemini) => ContentFilter::with_generator(GeminiGenerator::new(gemini, &search)?),
        None => ContentFilter::disabled(),
    };
    Ok((provider, filter))
}

impl RecipeService {
    /// Build the service. When `config_path` is set, `config.patch` writes
    /// the updated configuration there.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a backend cannot
    /// be built from it.
    pub fn new(config: ScoutConfig, config_path: Option<PathBuf>) -> Result<Self> {
        let (provider, filter) = build_backends(&config)?;
        tracing::info!(
            filter_backend = filter.has_backend(),
            model = %config.gemini.model,
            "recipe service ready"
        );
        Ok(Self {
            config,
            config_path,
            provider,
            filter,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ScoutConfig {
        &self.config
    }

    /// Whether a filter backend is configured.
    #[must_use]
    pub fn has_filter_backend(&self) -> bool {
        self.filter.has_backend()
    }

    /// Aggregate results for `request`. Missing credentials are taken from
    /// the `[google]` config section.
    ///
    /// # Errors
    ///
    /// Validation and provider errors from the aggregation.
    pub async fn aggregate(&self, mut request: SearchRequest) -> Result<AggregatedOutcome> {
        let defaults = &self.config.google;
        let creds = &mut request.credentials;
        if creds.api_key.is_empty() {
            if let Some(key) = &defaults.api_key {
                creds.api_key.clone_from(key);
            }
        }
        if creds.search_engine_id.is_empty() {
            if let Some(cx) = &defaults.search_engine_id {
                creds.search_engine_id.clone_from(cx);
            }
        }

        let outcome =
            aggregate_with(&self.provider, &request, &self.config.search.search_config()).await?;
        tracing::info!(
            total = outcome.total,
            windows = request.windows.len().max(1),
            "aggregation complete"
        );
        Ok(outcome)
    }

    /// Filter a list of titles.
    ///
    /// # Errors
    ///
    /// Returns an error if a toggle is set and no backend is configured, or
    /// the backend call fails.
    pub async fn filter_titles(&self, request: &FilterRequest) -> Result<FilterOutcome> {
        Ok(self.filter.filter(request).await?)
    }

    /// Aggregate, then filter when a toggle is set and keep only the results
    /// whose titles survived.
    ///
    /// # Errors
    ///
    /// Any aggregation or filter error.
    pub async fn run(&self, request: RunRequest) -> Result<RunOutcome> {
        let filter_request = FilterRequest {
            titles: Vec::new(),
            dedupe: request.dedupe,
            exclude_disallowed: request.exclude_disallowed,
        };
        // No provider request is made when the filter cannot run.
        if filter_request.is_requested() && !self.filter.has_backend() {
            return Err(recipe_search::SearchError::FilterBackendUnavailable.into());
        }

        let raw = self.aggregate(request.search).await?;
        if !filter_request.is_requested() {
            return Ok(RunOutcome {
                results: raw.results.clone(),
                raw,
                filter: None,
            });
        }

        let outcome = self
            .filter_titles(&FilterRequest {
                titles: raw.titles(),
                ..filter_request
            })
            .await?;
        Ok(RunOutcome {
            results: raw.retain_titles(&outcome.filtered),
            raw,
            filter: Some(outcome),
        })
    }

    /// Apply `patch`, rebuild the backends and persist the result.
    ///
    /// Returns whether anything changed. On error the previous
    /// configuration stays in effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the patched configuration cannot build its
    /// backends or cannot be written.
    pub fn patch_config(&mut self, patch: &ConfigPatch) -> Result<bool> {
        let mut next = self.config.clone();
        if !next.apply_patch(patch) {
            return Ok(false);
        }

        let (provider, filter) = build_backends(&next)?;
        if let Some(path) = &self.config_path {
            next.save_to_file(path)?;
            tracing::info!(path = %path.display(), "config saved");
        }

        self.config = next;
        self.provider = provider;
        self.filter = filter;
        tracing::info!(
            filter_backend = self.filter.has_backend(),
            "backends rebuilt after config patch"
        );
        Ok(true)
    }
}

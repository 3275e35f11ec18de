//! Configuration for the recipe-scout host.
//!
//! Stored as TOML. Secrets may be left out of the file and supplied through
//! the environment instead; see [`ScoutConfig::apply_env_overrides`].

use recipe_search::engines::google_cse::GOOGLE_CSE_BASE_URL;
use recipe_search::generators::gemini::{GEMINI_BASE_URL, GEMINI_DEFAULT_MODEL};
use recipe_search::generators::GeminiConfig;
use recipe_search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ScoutError};

/// Placeholder shown in place of a secret that is set.
pub const MASKED: &str = "***masked***";

/// Environment variable supplying the Gemini API key.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Environment variable supplying the Custom Search API key.
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
/// Environment variable supplying the Custom Search engine id.
pub const ENV_GOOGLE_SEARCH_ENGINE_ID: &str = "GOOGLE_SEARCH_ENGINE_ID";

/// Top-level host configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Pagination, pacing and HTTP settings for the search provider.
    pub search: SearchSection,
    /// Default Custom Search credentials.
    pub google: GoogleSection,
    /// Generative filter backend.
    pub gemini: GeminiSection,
    /// Secrets filled from the environment rather than the file.
    #[serde(skip)]
    env_sourced: EnvSourced,
}

/// Which secrets currently hold a value taken from the environment.
/// Those values are never written back to the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct EnvSourced {
    gemini_api_key: bool,
    google_api_key: bool,
    google_search_engine_id: bool,
}

/// Search provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// Custom Search endpoint.
    pub base_url: String,
    /// Results per page (at most 10).
    pub page_size: usize,
    /// Highest start offset the provider serves.
    pub max_start_index: usize,
    /// Per-window cap when a request does not set one.
    pub default_max_results: usize,
    /// Pause between pages of one window, in milliseconds.
    pub page_delay_ms: u64,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// User-Agent override.
    pub user_agent: Option<String>,
}

impl Default for SearchSection {
    fn default() -> Self {
        let defaults = SearchConfig::default();
        Self {
            base_url: GOOGLE_CSE_BASE_URL.to_owned(),
            page_size: defaults.page_size,
            max_start_index: defaults.max_start_index,
            default_max_results: defaults.default_max_results,
            page_delay_ms: defaults.page_delay_ms,
            timeout_seconds: defaults.timeout_seconds,
            user_agent: defaults.user_agent,
        }
    }
}

impl SearchSection {
    /// The library-level search configuration for this section.
    #[must_use]
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            page_size: self.page_size,
            max_start_index: self.max_start_index,
            default_max_results: self.default_max_results,
            page_delay_ms: self.page_delay_ms,
            timeout_seconds: self.timeout_seconds,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Default Custom Search credentials, used when a request carries none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSection {
    pub api_key: Option<String>,
    pub search_engine_id: Option<String>,
}

/// Gemini filter backend settings. No key means no filter backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSection {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            api_key: None,
            model: GEMINI_DEFAULT_MODEL.to_owned(),
            base_url: GEMINI_BASE_URL.to_owned(),
        }
    }
}

/// Partial update to the secrets and model, as sent by `config.patch`.
///
/// Empty strings and the [`MASKED`] placeholder are ignored, so a client can
/// send back what `config.get` returned without wiping stored secrets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    #[serde(alias = "GOOGLE_API_KEY")]
    pub google_api_key: Option<String>,
    #[serde(alias = "GOOGLE_SEARCH_ENGINE_ID")]
    pub google_search_engine_id: Option<String>,
    #[serde(alias = "GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,
    #[serde(alias = "GEMINI_MODEL")]
    pub gemini_model: Option<String>,
}

fn usable(value: Option<&String>) -> Option<&str> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && *v != MASKED)
}

fn mask(secret: &Option<String>) -> Option<String> {
    match secret.as_deref() {
        Some(value) if !value.is_empty() => Some(MASKED.to_owned()),
        _ => Some(String::new()),
    }
}

impl ScoutConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ScoutError::Config(e.to_string()))
    }

    /// Load `path` if it exists, otherwise return the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::info!(path = %path.display(), "no config file; using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// Secrets taken from the environment are left out; values loaded from
    /// the file or set by a patch are written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.for_file())
            .map_err(|e| ScoutError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn for_file(&self) -> Self {
        let mut stored = self.clone();
        if self.env_sourced.gemini_api_key {
            stored.gemini.api_key = None;
        }
        if self.env_sourced.google_api_key {
            stored.google.api_key = None;
        }
        if self.env_sourced.google_search_engine_id {
            stored.google.search_engine_id = None;
        }
        stored
    }

    /// Returns the default config file path: `~/.config/recipe-scout/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("recipe-scout").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("recipe-scout")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/recipe-scout-config/config.toml")
        }
    }

    /// Fill unset secrets from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Fill unset secrets from `lookup`. Secrets already present in the file
    /// win over the environment.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fill = |slot: &mut Option<String>, sourced: &mut bool, name: &str| {
            if slot.as_deref().is_none_or(str::is_empty) {
                if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                    tracing::debug!(variable = name, "secret taken from environment");
                    *slot = Some(value);
                    *sourced = true;
                }
            }
        };
        fill(
            &mut self.gemini.api_key,
            &mut self.env_sourced.gemini_api_key,
            ENV_GEMINI_API_KEY,
        );
        fill(
            &mut self.google.api_key,
            &mut self.env_sourced.google_api_key,
            ENV_GOOGLE_API_KEY,
        );
        fill(
            &mut self.google.search_engine_id,
            &mut self.env_sourced.google_search_engine_id,
            ENV_GOOGLE_SEARCH_ENGINE_ID,
        );
    }

    /// Validate the search section.
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Config`] for an empty endpoint or out-of-range
    /// pagination settings.
    pub fn validate(&self) -> Result<()> {
        if self.search.base_url.trim().is_empty() {
            return Err(ScoutError::Config("search.base_url cannot be empty".into()));
        }
        if self.gemini.base_url.trim().is_empty() {
            return Err(ScoutError::Config("gemini.base_url cannot be empty".into()));
        }
        self.search
            .search_config()
            .validate()
            .map_err(|e| ScoutError::Config(e.to_string()))
    }

    /// A copy safe to show a client: API keys that are set read [`MASKED`],
    /// unset keys read as empty strings. The search engine id is not a
    /// credential and is shown as stored.
    #[must_use]
    pub fn masked(&self) -> Self {
        let mut view = self.clone();
        view.google.api_key = mask(&self.google.api_key);
        view.gemini.api_key = mask(&self.gemini.api_key);
        view
    }

    /// Apply `patch`, returning `true` if anything changed.
    ///
    /// A patched secret counts as file-sourced from then on, even when it
    /// repeats the environment value.
    pub fn apply_patch(&mut self, patch: &ConfigPatch) -> bool {
        let mut changed = false;
        let mut set = |slot: &mut Option<String>, sourced: &mut bool, value: Option<&String>| {
            if let Some(value) = usable(value) {
                if slot.as_deref() != Some(value) {
                    *slot = Some(value.to_owned());
                    changed = true;
                }
                if *sourced {
                    *sourced = false;
                    changed = true;
                }
            }
        };
        set(
            &mut self.google.api_key,
            &mut self.env_sourced.google_api_key,
            patch.google_api_key.as_ref(),
        );
        set(
            &mut self.google.search_engine_id,
            &mut self.env_sourced.google_search_engine_id,
            patch.google_search_engine_id.as_ref(),
        );
        set(
            &mut self.gemini.api_key,
            &mut self.env_sourced.gemini_api_key,
            patch.gemini_api_key.as_ref(),
        );

        if let Some(model) = usable(patch.gemini_model.as_ref()) {
            if self.gemini.model != model {
                self.gemini.model = model.to_owned();
                changed = true;
            }
        }
        changed
    }

    /// Gemini backend settings, or `None` when no key is configured.
    #[must_use]
    pub fn gemini_config(&self) -> Option<GeminiConfig> {
        let key = self.gemini.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        Some(
            GeminiConfig::new(key)
                .with_model(self.gemini.model.clone())
                .with_base_url(self.gemini.base_url.clone()),
        )
    }
}

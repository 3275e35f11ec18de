//! Gemini `generateContent` backend.
//!
//! Sends the prompt as a single user turn and concatenates the text parts of
//! the first candidate. The generator is a plain value built from a
//! [`GeminiConfig`]; when the key or model changes, build a new one.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::generator::TextGenerator;
use crate::http;

/// Default Gemini API host.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model for title filtering.
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Configuration for the Gemini backend.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key, sent as the `key` query parameter.
    pub api_key: String,
    /// Model name, e.g. `gemini-1.5-flash`.
    pub model: String,
    /// API host (defaults to [`GEMINI_BASE_URL`]).
    pub base_url: String,
}

impl GeminiConfig {
    /// Create a config for `api_key` using the default model and host.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: GEMINI_DEFAULT_MODEL.into(),
            base_url: GEMINI_BASE_URL.into(),
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Gemini text generator.
#[derive(Debug)]
pub struct GeminiGenerator {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiGenerator {
    /// Build a generator, reusing the HTTP settings of `search`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an empty key or model, or if the
    /// HTTP client cannot be built.
    pub fn new(config: GeminiConfig, search: &SearchConfig) -> Result<Self, SearchError> {
        if config.api_key.trim().is_empty() {
            return Err(SearchError::Config("Gemini api_key is empty".into()));
        }
        if config.model.trim().is_empty() {
            return Err(SearchError::Config("Gemini model is empty".into()));
        }
        Ok(Self {
            client: http::build_client(search)?,
            config,
        })
    }

    fn endpoint(&self) -> Result<Url, SearchError> {
        let raw = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        Url::parse_with_params(&raw, [("key", self.config.api_key.as_str())])
            .map_err(|e| SearchError::Config(format!("invalid Gemini endpoint: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Extract the reply text from a `generateContent` response body.
pub(crate) fn extract_reply_text(body: &str) -> Result<String, SearchError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::FilterBackend(format!("malformed Gemini response: {e}")))?;

    let Some(content) = response.candidates.into_iter().next().and_then(|c| c.content) else {
        return Err(SearchError::FilterBackend(
            "Gemini response contained no candidates".into(),
        ));
    };

    Ok(content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<String>())
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, SearchError> {
        let url = self.endpoint()?;
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
        });

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                SearchError::FilterBackend(format!("Gemini request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| {
                SearchError::FilterBackend(format!(
                    "Gemini response read failed: {}",
                    e.without_url()
                ))
            })?;

        if !status.is_success() {
            let message = http::extract_error_message(&text);
            return Err(SearchError::FilterBackend(format!(
                "Gemini HTTP {}: {message}",
                status.as_u16()
            )));
        }

        extract_reply_text(&text)
    }
}

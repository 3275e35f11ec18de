//! Google Custom Search JSON API provider.
//!
//! Serves one page per `GET /customsearch/v1` call. The API caps pages at
//! ten results and refuses start offsets above 91, which is why pagination
//! lives a layer up in [`crate::paginate`].

use serde::Deserialize;
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::provider::{Page, PageItem, PageRequest, SearchProvider};

/// Production endpoint of the Custom Search JSON API.
pub const GOOGLE_CSE_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Google Custom Search JSON API client.
#[derive(Debug, Clone)]
pub struct GoogleCseProvider {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleCseProvider {
    /// Create a provider against the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(config)?,
            base_url: GOOGLE_CSE_BASE_URL.to_owned(),
        })
    }

    /// Point the provider at a different endpoint (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn page_url(&self, request: &PageRequest<'_>) -> Result<Url, SearchError> {
        let start = request.start.to_string();
        let num = request.num.to_string();
        Url::parse_with_params(
            &self.base_url,
            [
                ("key", request.credentials.api_key.as_str()),
                ("cx", request.credentials.search_engine_id.as_str()),
                ("q", request.query),
                ("start", start.as_str()),
                ("num", num.as_str()),
            ],
        )
        .map_err(|e| SearchError::Config(format!("invalid Google CSE base URL: {e}")))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
    search_information: Option<CseSearchInformation>,
    error: Option<CseError>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CseSearchInformation {
    total_results: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CseError {
    message: Option<String>,
}

/// Decode a Custom Search response body into a [`Page`].
///
/// Extracted as a separate function for testability with canned JSON.
pub(crate) fn parse_cse_response(body: &str) -> Result<Page, SearchError> {
    let response: CseResponse = serde_json::from_str(body).map_err(|e| {
        SearchError::Provider(format!("Google CSE API error: malformed response: {e}"))
    })?;

    if let Some(err) = response.error {
        let message = err.message.unwrap_or_else(|| "unknown error".into());
        return Err(SearchError::Provider(format!("Google CSE API error: {message}")));
    }

    let total_results = response
        .search_information
        .and_then(|info| info.total_results)
        .and_then(|raw| raw.parse::<u64>().ok());

    let items = response
        .items
        .into_iter()
        .map(|item| PageItem {
            title: item.title,
            link: item.link,
            snippet: item.snippet,
        })
        .collect();

    Ok(Page {
        items,
        total_results,
    })
}

impl SearchProvider for GoogleCseProvider {
    async fn fetch_page(&self, request: PageRequest<'_>) -> Result<Page, SearchError> {
        tracing::trace!(query = request.query, start = request.start, "Google CSE search");

        let url = self.page_url(&request)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                SearchError::Provider(format!("Google CSE API error: {}", e.without_url()))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                SearchError::Provider(format!("Google CSE API error: {}", e.without_url()))
            })?;

        if !status.is_success() {
            let message = http::extract_error_message(&body);
            return Err(SearchError::Provider(format!(
                "Google CSE API error: {message}"
            )));
        }

        tracing::trace!(bytes = body.len(), "Google CSE response received");
        parse_cse_response(&body)
    }

    fn name(&self) -> &'static str {
        "google-cse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Credentials;

    #[test]
    fn parses_items_and_total() {
        let body = r#"{
            "searchInformation": {"totalResults": "1234"},
            "items": [
                {"title": "Chicken Soup", "link": "https://a.example", "snippet": "Warm"},
                {"link": "https://b.example"}
            ]
        }"#;
        let page = parse_cse_response(body).expect("parse");
        assert_eq!(page.total_results, Some(1234));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title.as_deref(), Some("Chicken Soup"));
        assert!(page.items[1].title.is_none());
    }

    #[test]
    fn missing_items_is_empty_page() {
        let body = r#"{"searchInformation": {"totalResults": "0"}}"#;
        let page = parse_cse_response(body).expect("parse");
        assert!(page.items.is_empty());
        assert_eq!(page.total_results, Some(0));
    }

    #[test]
    fn unparsable_total_is_ignored() {
        let body = r#"{"searchInformation": {"totalResults": "about a million"}, "items": []}"#;
        let page = parse_cse_response(body).expect("parse");
        assert!(page.total_results.is_none());
    }

    #[test]
    fn error_payload_becomes_provider_error() {
        let body = r#"{"error": {"code": 400, "message": "Request contains an invalid argument."}}"#;
        let err = parse_cse_response(body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "search provider error: Google CSE API error: Request contains an invalid argument."
        );
    }

    #[test]
    fn malformed_body_is_provider_error() {
        let err = parse_cse_response("<html>").unwrap_err();
        assert!(matches!(err, SearchError::Provider(_)));
    }

    #[test]
    fn page_url_encodes_query() {
        let provider = GoogleCseProvider::new(&SearchConfig::default()).expect("provider");
        let creds = Credentials::new("k", "cx1");
        let url = provider
            .page_url(&PageRequest {
                query: "soup after:2024-01-01 before:2024-02-01",
                credentials: &creds,
                start: 11,
                num: 10,
            })
            .expect("url");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("start".into(), "11".into())));
        assert!(pairs.contains(&("cx".into(), "cx1".into())));
        assert!(pairs.contains(&(
            "q".into(),
            "soup after:2024-01-01 before:2024-02-01".into()
        )));
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GoogleCseProvider>();
    }
}

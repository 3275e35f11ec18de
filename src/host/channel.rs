//! Host command channel and router.
//!
//! [`HostCommandClient`] is a cheap handle that validates envelopes and
//! forwards them over an mpsc channel; [`HostCommandServer`] owns the
//! [`RecipeService`] and answers one command at a time.

use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot};

use recipe_search::{FilterRequest, SearchError, SearchRequest, SearchResult};

use crate::config::ConfigPatch;
use crate::error::{Result, ScoutError};
use crate::export::{EXPORT_FILE_NAME, titles_csv};
use crate::host::contract::{CONTRACT_VERSION, CommandEnvelope, CommandName, ResponseEnvelope};
use crate::service::{RecipeService, RunRequest};

struct HostCommandRequest {
    envelope: CommandEnvelope,
    response_tx: oneshot::Sender<ResponseEnvelope>,
}

#[derive(Clone)]
pub struct HostCommandClient {
    request_tx: mpsc::Sender<HostCommandRequest>,
}

impl HostCommandClient {
    /// Send `envelope` to the server and wait for its response.
    ///
    /// Command failures come back as error envelopes; `Err` means the
    /// envelope was invalid or the server is gone.
    pub async fn send(&self, envelope: CommandEnvelope) -> Result<ResponseEnvelope> {
        envelope.validate().map_err(|e| {
            ScoutError::Payload(format!(
                "invalid command envelope {}: {e}",
                envelope.request_id
            ))
        })?;

        let (response_tx, response_rx) = oneshot::channel();
        self.request_tx
            .send(HostCommandRequest {
                envelope,
                response_tx,
            })
            .await
            .map_err(|e| ScoutError::Channel(format!("failed to send host command request: {e}")))?;

        response_rx
            .await
            .map_err(|e| ScoutError::Channel(format!("host command response dropped: {e}")))
    }
}

pub struct HostCommandServer {
    request_rx: mpsc::Receiver<HostCommandRequest>,
    service: RecipeService,
}

#[must_use]
pub fn command_channel(
    request_capacity: usize,
    service: RecipeService,
) -> (HostCommandClient, HostCommandServer) {
    let (request_tx, request_rx) = mpsc::channel(request_capacity.max(1));
    (
        HostCommandClient { request_tx },
        HostCommandServer {
            request_rx,
            service,
        },
    )
}

impl HostCommandServer {
    /// Serve requests until every client is dropped.
    pub async fn run(mut self) {
        while let Some(request) = self.request_rx.recv().await {
            let response = self.dispatch(&request.envelope).await;
            let _ = request.response_tx.send(response);
        }
        tracing::debug!("host command channel closed");
    }

    /// Route `envelope` and turn any failure into an error envelope that
    /// carries the caller's request id.
    pub async fn dispatch(&mut self, envelope: &CommandEnvelope) -> ResponseEnvelope {
        let command = envelope.command.as_str();
        tracing::debug!(request_id = %envelope.request_id, command, "dispatching host command");

        match self.route(envelope).await {
            Ok(payload) => ResponseEnvelope::ok(envelope.request_id.clone(), payload),
            Err(e) => {
                tracing::warn!(request_id = %envelope.request_id, command, error = %e, "host command failed");
                ResponseEnvelope::error(envelope.request_id.clone(), e.to_string())
            }
        }
    }

    async fn route(&mut self, envelope: &CommandEnvelope) -> Result<serde_json::Value> {
        match envelope.command {
            CommandName::HostPing => Ok(serde_json::json!({
                "status": "ok",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
            CommandName::HostVersion => Ok(serde_json::json!({
                "contract_version": CONTRACT_VERSION,
                "version": env!("CARGO_PKG_VERSION"),
            })),
            CommandName::SearchAggregate => self.handle_search_aggregate(envelope).await,
            CommandName::FilterTitles => self.handle_filter_titles(envelope).await,
            CommandName::SearchRun => self.handle_search_run(envelope).await,
            CommandName::ResultsExportCsv => handle_export_csv(envelope),
            CommandName::ConfigGet => self.handle_config_get(),
            CommandName::ConfigPatch => self.handle_config_patch(envelope),
            CommandName::RuntimeStop => Ok(serde_json::json!({"stopping": true})),
        }
    }

    async fn handle_search_aggregate(&self, envelope: &CommandEnvelope) -> Result<serde_json::Value> {
        let request: SearchRequest = parse_request(envelope)?;
        let outcome = self.service.aggregate(request).await?;
        to_payload(&outcome)
    }

    async fn handle_filter_titles(&self, envelope: &CommandEnvelope) -> Result<serde_json::Value> {
        let request: FilterRequest = parse_request(envelope)?;
        let outcome = self.service.filter_titles(&request).await?;
        to_payload(&outcome)
    }

    async fn handle_search_run(&self, envelope: &CommandEnvelope) -> Result<serde_json::Value> {
        let request: RunRequest = parse_request(envelope)?;
        let outcome = self.service.run(request).await?;
        to_payload(&outcome)
    }

    fn handle_config_get(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "config": to_payload(&self.service.config().masked())?,
            "filter_backend": self.service.has_filter_backend(),
        }))
    }

    fn handle_config_patch(&mut self, envelope: &CommandEnvelope) -> Result<serde_json::Value> {
        let patch: ConfigPatch = parse_payload(envelope)?;
        let changed = self.service.patch_config(&patch)?;
        Ok(serde_json::json!({
            "changed": changed,
            "filter_backend": self.service.has_filter_backend(),
        }))
    }
}

#[derive(serde::Deserialize)]
struct ExportPayload {
    results: Vec<SearchResult>,
}

fn handle_export_csv(envelope: &CommandEnvelope) -> Result<serde_json::Value> {
    let payload: ExportPayload = parse_payload(envelope)?;
    if payload.results.is_empty() {
        return Err(ScoutError::Payload("no results to export".into()));
    }
    Ok(serde_json::json!({
        "file_name": EXPORT_FILE_NAME,
        "rows": payload.results.len(),
        "csv": titles_csv(&payload.results),
    }))
}

fn parse_payload<T: DeserializeOwned>(envelope: &CommandEnvelope) -> Result<T> {
    serde_json::from_value(envelope.payload.clone()).map_err(|e| {
        ScoutError::Payload(format!("{} payload: {e}", envelope.command.as_str()))
    })
}

/// Decode a search or filter request; a malformed one is a validation error.
fn parse_request<T: DeserializeOwned>(envelope: &CommandEnvelope) -> Result<T> {
    serde_json::from_value(envelope.payload.clone()).map_err(|e| {
        ScoutError::Search(SearchError::Validation(format!(
            "{} payload: {e}",
            envelope.command.as_str()
        )))
    })
}

fn to_payload<T: serde::Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| ScoutError::Payload(format!("failed to serialize response: {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::ScoutConfig;

    fn make_server() -> HostCommandServer {
        let service = RecipeService::new(ScoutConfig::default(), None).expect("service");
        command_channel(4, service).1
    }

    fn make_envelope(command: CommandName, payload: serde_json::Value) -> CommandEnvelope {
        CommandEnvelope::new("req-1", command, payload)
    }

    #[tokio::test]
    async fn ping_reports_status_and_timestamp() {
        let mut server = make_server();
        let resp = server
            .dispatch(&make_envelope(CommandName::HostPing, serde_json::json!({})))
            .await;
        assert!(resp.ok);
        assert_eq!(resp.payload["status"], "ok");
        let stamp = resp.payload["timestamp"].as_str().expect("timestamp");
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[tokio::test]
    async fn version_reports_contract() {
        let mut server = make_server();
        let resp = server
            .dispatch(&make_envelope(CommandName::HostVersion, serde_json::Value::Null))
            .await;
        assert_eq!(resp.payload["contract_version"], CONTRACT_VERSION);
    }

    #[tokio::test]
    async fn bad_payload_is_error_envelope_with_request_id() {
        let mut server = make_server();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::FilterTitles,
                serde_json::json!({"titles": "not a list"}),
            ))
            .await;
        assert!(!resp.ok);
        assert_eq!(resp.request_id, "req-1");
        let error = resp.error.unwrap();
        assert!(error.starts_with("validation error"), "{error}");
        assert!(error.contains("filter.titles payload"));
    }

    #[tokio::test]
    async fn malformed_run_payload_is_validation_error() {
        let mut server = make_server();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::SearchRun,
                serde_json::json!({"keyword": 42}),
            ))
            .await;
        assert!(!resp.ok);
        assert!(resp.error.unwrap().starts_with("validation error"));
    }

    #[tokio::test]
    async fn malformed_export_payload_is_payload_error() {
        let mut server = make_server();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::ResultsExportCsv,
                serde_json::json!({"results": "nope"}),
            ))
            .await;
        assert!(!resp.ok);
        assert!(resp.error.unwrap().contains("results.export_csv payload"));
    }

    #[tokio::test]
    async fn filter_without_toggles_passes_through() {
        let mut server = make_server();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::FilterTitles,
                serde_json::json!({"titles": ["A", "B"]}),
            ))
            .await;
        assert!(resp.ok);
        assert_eq!(resp.payload["filtered"], serde_json::json!(["A", "B"]));
        assert_eq!(resp.payload["mode"], "pass_through");
    }

    #[tokio::test]
    async fn filter_toggle_without_backend_is_reported() {
        let mut server = make_server();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::FilterTitles,
                serde_json::json!({"titles": ["A"], "filterHaram": true}),
            ))
            .await;
        assert!(!resp.ok);
        assert!(resp.error.unwrap().contains("filter backend not configured"));
    }

    #[tokio::test]
    async fn export_csv_renders_titles() {
        let mut server = make_server();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::ResultsExportCsv,
                serde_json::json!({"results": [{"title": "Say \"Cheese\" Soup"}]}),
            ))
            .await;
        assert!(resp.ok);
        assert_eq!(resp.payload["csv"], "title\n\"Say \"\"Cheese\"\" Soup\"");
        assert_eq!(resp.payload["file_name"], EXPORT_FILE_NAME);
    }

    #[tokio::test]
    async fn export_csv_rejects_empty_results() {
        let mut server = make_server();
        let resp = server
            .dispatch(&make_envelope(
                CommandName::ResultsExportCsv,
                serde_json::json!({"results": []}),
            ))
            .await;
        assert!(!resp.ok);
    }

    #[tokio::test]
    async fn config_get_masks_keys_but_shows_engine_id() {
        let mut server = make_server();
        server
            .dispatch(&make_envelope(
                CommandName::ConfigPatch,
                serde_json::json!({"google_api_key": "g-secret", "google_search_engine_id": "cx-9"}),
            ))
            .await;
        let get = server
            .dispatch(&make_envelope(CommandName::ConfigGet, serde_json::Value::Null))
            .await;
        assert_eq!(get.payload["config"]["google"]["api_key"], "***masked***");
        assert_eq!(get.payload["config"]["google"]["search_engine_id"], "cx-9");
    }

    #[tokio::test]
    async fn config_get_masks_and_patch_toggles_backend() {
        let mut server = make_server();
        let patch = server
            .dispatch(&make_envelope(
                CommandName::ConfigPatch,
                serde_json::json!({"GEMINI_API_KEY": "gem-secret"}),
            ))
            .await;
        assert!(patch.ok);
        assert_eq!(patch.payload["changed"], true);
        assert_eq!(patch.payload["filter_backend"], true);

        let get = server
            .dispatch(&make_envelope(CommandName::ConfigGet, serde_json::Value::Null))
            .await;
        assert_eq!(get.payload["config"]["gemini"]["api_key"], "***masked***");
        assert!(!get.payload.to_string().contains("gem-secret"));
    }

    #[tokio::test]
    async fn client_rejects_invalid_envelope() {
        let service = RecipeService::new(ScoutConfig::default(), None).expect("service");
        let (client, server) = command_channel(4, service);
        let handle = tokio::spawn(server.run());

        let mut envelope = make_envelope(CommandName::HostPing, serde_json::json!({}));
        envelope.request_id = String::new();
        assert!(client.send(envelope).await.is_err());

        let resp = client
            .send(make_envelope(CommandName::HostPing, serde_json::json!({})))
            .await
            .expect("send");
        assert!(resp.ok);

        drop(client);
        handle.await.expect("server exits when clients drop");
    }
}

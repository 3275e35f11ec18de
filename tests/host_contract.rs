//! End-to-end host bridge tests: envelopes in, envelopes out, with the
//! search provider and filter backend served by mock HTTP servers.

use recipe_scout::host::channel::command_channel;
use recipe_scout::host::contract::{CommandEnvelope, CommandName, ResponseEnvelope};
use recipe_scout::host::stdio::run_bridge;
use recipe_scout::{RecipeService, ScoutConfig};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ScoutConfig {
    let mut config = ScoutConfig::default();
    config.search.base_url = format!("{}/customsearch/v1", server.uri());
    config.search.page_delay_ms = 0;
    config.gemini.base_url = server.uri();
    config
}

async fn mount_cse(server: &MockServer, query: &str, titles: &[&str]) {
    let items: Vec<_> = titles
        .iter()
        .map(|t| json!({"title": t, "link": format!("https://recipes.example/{}", t.len())}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "searchInformation": {"totalResults": titles.len().to_string()},
            "items": items
        })))
        .mount(server)
        .await;
}

async fn mount_gemini(server: &MockServer, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": reply}]}}]
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn bridge(config: ScoutConfig, lines: &[serde_json::Value]) -> Vec<ResponseEnvelope> {
    let service = RecipeService::new(config, None).expect("service");
    let input: String = lines.iter().map(|l| format!("{l}\n")).collect();
    let mut output = Vec::new();
    run_bridge(service, input.as_bytes(), &mut output)
        .await
        .expect("bridge");
    String::from_utf8(output)
        .expect("utf8")
        .lines()
        .map(|l| serde_json::from_str(l).expect("response json"))
        .collect()
}

#[test]
fn command_envelope_json_shape() {
    let envelope = CommandEnvelope::new("req-123", CommandName::SearchRun, json!({"keyword": "soup"}));
    let value = serde_json::to_value(&envelope).expect("serialize");
    assert_eq!(
        value,
        json!({"v": 1, "request_id": "req-123", "command": "search.run", "payload": {"keyword": "soup"}})
    );
}

#[tokio::test]
async fn aggregate_uses_configured_credentials_and_window_order() {
    let server = MockServer::start().await;
    mount_cse(&server, "soup after:2024-01-01 before:2024-01-31", &["Tomato Soup", "Miso Soup"]).await;
    mount_cse(&server, "soup after:2024-02-01 before:2024-02-29", &["miso soup", "Pea Soup"]).await;

    let mut config = config_for(&server);
    config.google.api_key = Some("cfg-key".into());
    config.google.search_engine_id = Some("cfg-cx".into());

    let responses = bridge(
        config,
        &[json!({
            "v": 1,
            "request_id": "agg-1",
            "command": "search.aggregate",
            "payload": {
                "keyword": "soup",
                "timeRanges": [
                    {"after": "2024-01-01", "before": "2024-01-31"},
                    {"after": "2024-02-01", "before": "2024-02-29"}
                ]
            }
        })],
    )
    .await;

    let resp = &responses[0];
    assert!(resp.ok, "unexpected error: {:?}", resp.error);
    assert_eq!(resp.request_id, "agg-1");
    assert_eq!(resp.payload["total"], 3);
    assert_eq!(resp.payload["query"], "Multiple time ranges");
    let titles: Vec<_> = resp.payload["results"]
        .as_array()
        .expect("results")
        .iter()
        .map(|r| r["title"].as_str().expect("title").to_owned())
        .collect();
    assert_eq!(titles, vec!["Tomato Soup", "Miso Soup", "Pea Soup"]);

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.iter().all(|r| r.url.query().unwrap_or_default().contains("key=cfg-key")));
}

#[tokio::test]
async fn run_filters_and_maps_titles_back() {
    let server = MockServer::start().await;
    mount_cse(&server, "stew", &["Beef Stew", "Pork Stew", "beef stew recipe"]).await;
    mount_gemini(&server, "Sure! [\"Beef Stew\"]").await;

    let mut config = config_for(&server);
    config.gemini.api_key = Some("gem".into());

    let responses = bridge(
        config,
        &[json!({
            "v": 1,
            "request_id": "run-1",
            "command": "search.run",
            "payload": {
                "keyword": "stew",
                "apiKey": "k",
                "searchEngineId": "cx",
                "useDeduplication": true,
                "filterHaram": true
            }
        })],
    )
    .await;

    let resp = &responses[0];
    assert!(resp.ok, "unexpected error: {:?}", resp.error);
    assert_eq!(resp.payload["raw"]["total"], 3);
    assert_eq!(resp.payload["filter"]["mode"], "parsed");
    assert_eq!(resp.payload["filter"]["originalCount"], 3);
    assert_eq!(resp.payload["filter"]["filteredCount"], 1);
    assert_eq!(resp.payload["results"][0]["title"], "Beef Stew");
    assert!(resp.payload["results"][0]["link"].is_string());
    assert_eq!(resp.payload["results"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn provider_failure_is_error_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Quota exceeded"}
        })))
        .mount(&server)
        .await;

    let responses = bridge(
        config_for(&server),
        &[json!({
            "v": 1,
            "request_id": "agg-2",
            "command": "search.aggregate",
            "payload": {"keyword": "soup", "apiKey": "k", "searchEngineId": "cx"}
        })],
    )
    .await;

    assert!(!responses[0].ok);
    assert_eq!(responses[0].request_id, "agg-2");
    assert!(responses[0].error.as_deref().unwrap_or_default().contains("Quota exceeded"));
}

#[tokio::test]
async fn config_patch_persists_and_enables_filter() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    let service = RecipeService::new(ScoutConfig::default(), Some(path.clone())).expect("service");
    let (client, server) = command_channel(4, service);
    let handle = tokio::spawn(server.run());

    let patch = client
        .send(CommandEnvelope::new(
            "patch-1",
            CommandName::ConfigPatch,
            json!({"GEMINI_API_KEY": "gem-secret", "GOOGLE_API_KEY": "***masked***"}),
        ))
        .await
        .expect("send");
    assert!(patch.ok);
    assert_eq!(patch.payload["filter_backend"], true);

    let get = client
        .send(CommandEnvelope::new("get-1", CommandName::ConfigGet, json!(null)))
        .await
        .expect("send");
    assert_eq!(get.payload["config"]["gemini"]["api_key"], "***masked***");
    assert_eq!(get.payload["config"]["google"]["api_key"], "");

    let saved = ScoutConfig::from_file(&path).expect("saved config");
    assert_eq!(saved.gemini.api_key.as_deref(), Some("gem-secret"));
    assert!(saved.google.api_key.is_none());

    drop(client);
    handle.await.expect("server task");
}

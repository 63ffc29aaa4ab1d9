/// Integration tests for the pricing refresh pipeline
use chrono::NaiveDate;
use llm_dashboard::{
    error::RefreshError,
    pricing::{PageFetcher, PriceUpdate, PricingSource, PricingUpdater, Provider, UpdateSet},
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const DATASET: &str = r#"{
  "last_updated": "2025-06-01",
  "models": [
    {
      "model": "gpt-4o",
      "provider": "openai",
      "input_per_mtok": 2.50,
      "output_per_mtok": 10.0,
      "context_window": 128000,
      "benchmarks": {"mmlu": 88.7, "humaneval": 90.2},
      "tags": ["flagship", "vision"],
      "notes": "Curated by hand",
      "use_case_scores": {"coding": 9, "writing": 8}
    },
    {
      "model": "deepseek-chat",
      "provider": "deepseek",
      "input_per_mtok": 0.27,
      "output_per_mtok": 1.1,
      "context_window": 64000
    }
  ]
}
"#;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

/// Pages served as `{"model": {"input_per_mtok": x, ...}}`
fn parse_fixture(page: &str) -> UpdateSet {
    let parsed: HashMap<String, HashMap<String, f64>> =
        serde_json::from_str(page).unwrap_or_default();
    parsed
        .into_iter()
        .map(|(model, fields)| {
            let update = PriceUpdate {
                input_per_mtok: fields.get("input_per_mtok").copied(),
                output_per_mtok: fields.get("output_per_mtok").copied(),
                context_window: fields.get("context_window").map(|v| *v as u64),
            };
            (model, update)
        })
        .collect()
}

fn write_dataset(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("data.json");
    std::fs::write(&path, contents).unwrap();
    path
}

fn fetcher() -> PageFetcher {
    PageFetcher::new(Duration::from_secs(5), "LLM-Dashboard-Refresh/test").unwrap()
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// One source carrying a price update for gpt-4o plus a stock DeepSeek page
async fn updating_sources(server: &MockServer) -> Vec<PricingSource> {
    mount_page(server, "/openai", 200, r#"{"gpt-4o": {"input_per_mtok": 2.0}}"#).await;
    mount_page(server, "/deepseek", 200, "Input $0.27 per million tokens").await;

    vec![
        PricingSource::new(Provider::OpenAI, format!("{}/openai", server.uri()))
            .with_parser(parse_fixture),
        PricingSource::new(Provider::DeepSeek, format!("{}/deepseek", server.uri())),
    ]
}

async fn run(
    data_path: &Path,
    sources: Vec<PricingSource>,
    dry_run: bool,
) -> (Result<llm_dashboard::pricing::RefreshOutcome, RefreshError>, String) {
    let updater = PricingUpdater::new(fetcher(), data_path).with_sources(sources);
    let mut report = Vec::new();
    let result = updater.run(dry_run, today(), &mut report).await;
    (result, String::from_utf8(report).unwrap())
}

#[tokio::test]
async fn test_refresh_writes_merged_prices() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = write_dataset(&dir, DATASET);

    let (result, report) = run(&data_path, updating_sources(&server).await, false).await;
    let outcome = result.unwrap();

    assert!(outcome.written);
    assert!(report.contains("Changes detected:"));
    assert!(report.contains("  gpt-4o: input_per_mtok $2.5 -> $2.00"));
    assert!(report.contains("  CHANGED gpt-4o.input_per_mtok: 2.5 -> 2.0"));
    assert!(report.contains("Updated "));

    let written = std::fs::read_to_string(&data_path).unwrap();
    assert!(written.ends_with("}\n"));
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["last_updated"], "2026-10-19");
    assert_eq!(value["models"][0]["input_per_mtok"], 2.0);

    // Curated fields survive untouched
    let original: serde_json::Value = serde_json::from_str(DATASET).unwrap();
    for field in ["output_per_mtok", "context_window", "benchmarks", "tags", "notes", "use_case_scores"] {
        assert_eq!(value["models"][0][field], original["models"][0][field], "{}", field);
    }
    assert_eq!(value["models"][1], original["models"][1]);
}

#[tokio::test]
async fn test_dry_run_leaves_file_untouched() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = write_dataset(&dir, DATASET);

    let (result, report) = run(&data_path, updating_sources(&server).await, true).await;
    let outcome = result.unwrap();

    assert!(!outcome.written);
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.after.last_updated(), "2026-10-19");
    assert!(report.contains("[DRY RUN] No changes written to disk."));
    assert_eq!(std::fs::read_to_string(&data_path).unwrap(), DATASET);
}

#[tokio::test]
async fn test_dry_run_matches_normal_run_in_memory() {
    let server = MockServer::start().await;
    let dry_dir = TempDir::new().unwrap();
    let wet_dir = TempDir::new().unwrap();
    let dry_path = write_dataset(&dry_dir, DATASET);
    let wet_path = write_dataset(&wet_dir, DATASET);

    let (dry, _) = run(&dry_path, updating_sources(&server).await, true).await;
    let (wet, _) = run(&wet_path, updating_sources(&server).await, false).await;
    let (dry, wet) = (dry.unwrap(), wet.unwrap());

    assert_eq!(dry.after, wet.after);
    assert_eq!(dry.diff, wet.diff);
    assert_eq!(dry.events, wet.events);
}

#[tokio::test]
async fn test_second_run_reports_no_changes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = write_dataset(&dir, DATASET);

    let (first, _) = run(&data_path, updating_sources(&server).await, false).await;
    assert_eq!(first.unwrap().events.len(), 1);

    let (second, report) = run(&data_path, updating_sources(&server).await, false).await;
    let second = second.unwrap();
    assert!(second.events.is_empty());
    assert!(second.diff.is_empty());
    assert!(report.contains("No price changes to apply."));
    assert!(report.contains("  No pricing changes detected."));
}

#[tokio::test]
async fn test_fetch_failures_are_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = write_dataset(&dir, DATASET);
    mount_page(&server, "/cohere", 500, "upstream down").await;
    mount_page(&server, "/mistral", 200, "<div id=\"__next\"></div>").await;

    let sources = vec![
        PricingSource::new(Provider::Cohere, format!("{}/cohere", server.uri())),
        PricingSource::new(Provider::Google, "http://127.0.0.1:1/pricing"),
        PricingSource::new(Provider::Mistral, format!("{}/mistral", server.uri())),
    ];
    let (result, report) = run(&data_path, sources, false).await;
    let outcome = result.unwrap();

    assert_eq!(outcome.skipped, vec![Provider::Cohere, Provider::Google]);
    assert!(report.contains("Fetching cohere...\nFetching google...\nFetching mistral...\n"));
    assert!(report.contains("Skipped (fetch failed): cohere, google"));
    assert!(report.contains("No automated price updates extracted."));
    assert!(report.contains("  No pricing changes detected."));

    // The date is stamped even when no price moved
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&data_path).unwrap()).unwrap();
    assert_eq!(value["last_updated"], "2026-10-19");
}

#[tokio::test]
async fn test_new_model_is_reported_not_added() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let data_path = write_dataset(&dir, DATASET);
    mount_page(&server, "/fireworks", 200, r#"{"llama-4-maverick": {"input_per_mtok": 0.22}}"#).await;

    let sources = vec![
        PricingSource::new(Provider::Fireworks, format!("{}/fireworks", server.uri()))
            .with_parser(parse_fixture),
    ];
    let (result, report) = run(&data_path, sources, true).await;
    let outcome = result.unwrap();

    assert_eq!(outcome.after.model_count(), 2);
    assert!(report.contains("NEW MODEL FOUND: llama-4-maverick (add manually to data.json)"));
}

#[tokio::test]
async fn test_missing_dataset_aborts_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sources = vec![PricingSource::new(Provider::OpenAI, server.uri())];
    let (result, report) = run(&dir.path().join("data.json"), sources, false).await;

    assert!(matches!(result, Err(RefreshError::DatasetRead { .. })));
    assert!(report.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_dataset_aborts() {
    let dir = TempDir::new().unwrap();
    let data_path = write_dataset(&dir, "{\"models\": [");

    let (result, _) = run(&data_path, Vec::new(), false).await;
    assert!(matches!(result, Err(RefreshError::DatasetParse { .. })));

    let data_path = write_dataset(&dir, "{\"models\": []}");
    let (result, _) = run(&data_path, Vec::new(), false).await;
    assert!(matches!(result, Err(RefreshError::DatasetShape { .. })));
}

//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for both the crawled site and the
//! classification agent, and run the full fetch, classify, store cycle
//! end-to-end.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use topic_sieve::classifier::AgentClassifier;
use topic_sieve::config::{parse_config, ClassifierConfig, RequestConfig, StoreBackend};
use topic_sieve::crawler::{crawl, CrawlSettings, Crawler, HttpFetcher};
use topic_sieve::storage::{ContentStore, DirectoryStore, SqliteStore, StoreKey};
use topic_sieve::{normalize_url, CrawlReport, PageOutcome, StopReason};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Word that makes the mock classifier answer "yes"
const RELEVANT_MARKER: &str = "expense ratio";

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Starts a classification agent that says yes to pages with the marker
async fn start_agent() -> MockServer {
    let agent = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .and(body_string_contains(RELEVANT_MARKER))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"completion": "Yes"})),
        )
        .mount(&agent)
        .await;
    Mock::given(method("POST"))
        .and(path("/invoke"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"completion": "No"})),
        )
        .mount(&agent)
        .await;
    agent
}

fn classifier_config(agent: &MockServer) -> ClassifierConfig {
    ClassifierConfig {
        endpoint: format!("{}/invoke", agent.uri()),
        agent_id: "AGENT".to_string(),
        agent_alias_id: Some("ALIAS".to_string()),
        region: "us-east-1".to_string(),
        topic: "index investing".to_string(),
        max_input_chars: 20_000,
    }
}

fn settings(max_pages: usize, workers: usize) -> CrawlSettings {
    CrawlSettings {
        max_pages,
        politeness_delay: Duration::ZERO,
        run_deadline: None,
        workers,
    }
}

async fn run_crawl(
    site: &MockServer,
    agent: &MockServer,
    store: Arc<dyn ContentStore>,
    settings: CrawlSettings,
) -> CrawlReport {
    let request = RequestConfig {
        timeout_ms: 2_000,
        ..RequestConfig::default()
    };
    let fetcher = HttpFetcher::new(&request).expect("Failed to build fetcher");
    let classifier = AgentClassifier::new(classifier_config(agent), Duration::from_secs(2))
        .expect("Failed to build classifier");

    Crawler::new(
        &format!("{}/", site.uri()),
        settings,
        Arc::new(fetcher),
        Arc::new(classifier),
        store,
    )
    .expect("Failed to create crawler")
    .run()
    .await
}

fn key_for(site: &MockServer, route: &str) -> StoreKey {
    let url = normalize_url(&format!("{}{}", site.uri(), route)).unwrap();
    StoreKey::for_url(&url)
}

#[tokio::test]
async fn test_full_crawl_directory_store() {
    let site = MockServer::start().await;
    let agent = start_agent().await;

    mount_page(
        &site,
        "/",
        r#"<h1>Home</h1><a href="/funds">Funds</a><a href="/about">About</a>"#,
    )
    .await;
    mount_page(
        &site,
        "/funds",
        r#"<p>Compare the expense ratio of each fund.</p><a href="/">Home</a>"#,
    )
    .await;
    mount_page(&site, "/about", "<p>We are a small team.</p>").await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(DirectoryStore::new(dir.path(), "crawl/").unwrap());

    let report = run_crawl(&site, &agent, store.clone(), settings(10, 1)).await;

    let base = site.uri();
    assert_eq!(
        report.visited_urls(),
        vec![
            format!("{}/", base),
            format!("{}/funds", base),
            format!("{}/about", base),
        ]
    );
    assert_eq!(report.stop_reason, Some(StopReason::FrontierExhausted));
    assert_eq!(report.stored(), 1);
    assert_eq!(
        report.outcome_of(&format!("{}/about", base)),
        Some(PageOutcome::NotRelevant)
    );

    let stored = std::fs::read_to_string(store.path_for(&key_for(&site, "/funds"))).unwrap();
    assert_eq!(stored, "Compare the expense ratio of each fund. Home");
    assert!(!store.path_for(&key_for(&site, "/about")).exists());
}

#[tokio::test]
async fn test_out_of_scope_links_are_not_fetched() {
    let site = MockServer::start().await;
    let other = MockServer::start().await;
    let agent = start_agent().await;

    // The site is served as 127.0.0.1, so a localhost link is off the crawl host
    let other_port = url::Url::parse(&other.uri()).unwrap().port().unwrap();
    mount_page(
        &site,
        "/",
        &format!(
            r#"<a href="http://localhost:{}/elsewhere">Elsewhere</a><a href="/local">Local</a>"#,
            other_port
        ),
    )
    .await;
    mount_page(&site, "/local", "<p>local page</p>").await;

    Mock::given(method("GET"))
        .respond_with(html("should not be fetched"))
        .expect(0)
        .mount(&other)
        .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(DirectoryStore::new(dir.path(), "").unwrap());
    let report = run_crawl(&site, &agent, store, settings(10, 1)).await;

    assert_eq!(report.pages_visited(), 2);
    assert_eq!(report.links_out_of_scope, 1);
}

#[tokio::test]
async fn test_redirect_target_is_fetched_and_stored_once() {
    let site = MockServer::start().await;
    let agent = start_agent().await;

    mount_page(&site, "/", r#"<a href="/old">Old</a><a href="/new">New</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .expect(1)
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html("<p>Fund expense ratio guide</p>"))
        .expect(1)
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(DirectoryStore::new(dir.path(), "").unwrap());
    let report = run_crawl(&site, &agent, store.clone(), settings(10, 1)).await;

    assert_eq!(report.pages_visited(), 2);
    assert_eq!(report.stored(), 1);
    assert!(store.path_for(&key_for(&site, "/new")).exists());
    assert!(!store.path_for(&key_for(&site, "/old")).exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_http_errors_do_not_stop_the_crawl() {
    let site = MockServer::start().await;
    let agent = start_agent().await;

    mount_page(
        &site,
        "/",
        r#"<a href="/missing">A</a><a href="/broken">B</a><a href="/good">C</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&site)
        .await;
    mount_page(&site, "/good", "<p>Low expense ratio funds</p>").await;

    let store = Arc::new(SqliteStore::new_in_memory("").unwrap());
    let report = run_crawl(&site, &agent, store.clone(), settings(10, 1)).await;

    let base = site.uri();
    assert_eq!(
        report.outcome_of(&format!("{}/missing", base)),
        Some(PageOutcome::HttpError)
    );
    assert_eq!(
        report.outcome_of(&format!("{}/broken", base)),
        Some(PageOutcome::HttpError)
    );
    assert_eq!(
        report.outcome_of(&format!("{}/good", base)),
        Some(PageOutcome::Stored)
    );
    assert_eq!(store.count_pages().unwrap(), 1);
}

#[tokio::test]
async fn test_classifier_outage_fails_closed() {
    let site = MockServer::start().await;
    let agent = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&agent)
        .await;

    mount_page(&site, "/", r#"<p>expense ratio</p><a href="/next">Next</a>"#).await;
    mount_page(&site, "/next", "<p>expense ratio again</p>").await;

    let store = Arc::new(SqliteStore::new_in_memory("").unwrap());
    let report = run_crawl(&site, &agent, store.clone(), settings(10, 1)).await;

    assert_eq!(report.pages_visited(), 2);
    assert_eq!(report.count(PageOutcome::ClassifyFailed), 2);
    assert_eq!(store.count_pages().unwrap(), 0);
}

#[tokio::test]
async fn test_rerun_does_not_store_twice() {
    let site = MockServer::start().await;
    let agent = start_agent().await;

    mount_page(&site, "/", r#"<p>expense ratio basics</p><a href="/more">More</a>"#).await;
    mount_page(&site, "/more", "<p>more on expense ratio</p>").await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("pages.db");

    let first = run_crawl(
        &site,
        &agent,
        Arc::new(SqliteStore::new(&db_path, "crawl/").unwrap()),
        settings(10, 1),
    )
    .await;
    assert_eq!(first.stored(), 2);

    // A fresh store instance over the same database simulates a new run
    let store = Arc::new(SqliteStore::new(&db_path, "crawl/").unwrap());
    let second = run_crawl(&site, &agent, store.clone(), settings(10, 1)).await;

    assert_eq!(second.stored(), 0);
    assert_eq!(second.count(PageOutcome::AlreadyStored), 2);
    assert_eq!(store.count_pages().unwrap(), 2);
    assert_eq!(
        store.get_payload(&key_for(&site, "/more")).unwrap().as_deref(),
        Some("more on expense ratio")
    );
}

#[tokio::test]
async fn test_budget_limits_pages() {
    let site = MockServer::start().await;
    let agent = start_agent().await;

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    mount_page(&site, "/", &links).await;
    for i in 0..10 {
        mount_page(&site, &format!("/p{}", i), "<p>page</p>").await;
    }

    let store = Arc::new(SqliteStore::new_in_memory("").unwrap());
    let report = run_crawl(&site, &agent, store, settings(4, 1)).await;

    let base = site.uri();
    assert_eq!(
        report.visited_urls(),
        vec![
            format!("{}/", base),
            format!("{}/p0", base),
            format!("{}/p1", base),
            format!("{}/p2", base),
        ]
    );
    assert_eq!(report.stop_reason, Some(StopReason::BudgetExhausted));
}

#[tokio::test]
async fn test_worker_pool_visits_each_page_once() {
    let site = MockServer::start().await;
    let agent = start_agent().await;

    let links: String = (0..12)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    mount_page(&site, "/", &links).await;
    for i in 0..12 {
        let body = format!(
            r#"<p>expense ratio {}</p><a href="/">home</a><a href="/p{}">next</a>"#,
            i,
            (i + 1) % 12
        );
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html(&body))
            .expect(1)
            .mount(&site)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let store = Arc::new(DirectoryStore::new(dir.path(), "").unwrap());
    let report = run_crawl(&site, &agent, store, settings(100, 4)).await;

    assert_eq!(report.pages_visited(), 13);
    assert_eq!(report.stored(), 12);
    assert_eq!(report.stop_reason, Some(StopReason::FrontierExhausted));
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let site = MockServer::start().await;
    let agent = start_agent().await;

    mount_page(&site, "/", r#"<p>expense ratio</p><a href="/two">two</a>"#).await;
    mount_page(&site, "/two", "<p>nothing here</p>").await;

    let toml = format!(
        r#"
[crawl]
seed-url = "{site}/"
max-pages = 5
politeness-delay-ms = 0

[request]
user-agent = "topic-sieve-test/1.0"
timeout-ms = 2000

[store]
backend = "memory"
location = ""
prefix = "crawl/"

[classifier]
endpoint = "{agent}/invoke"
agent-id = "AGENT"
region = "us-east-1"
topic = "index investing"
"#,
        site = site.uri(),
        agent = agent.uri()
    );
    let config = parse_config(&toml).expect("config should parse");
    assert_eq!(config.store.backend, StoreBackend::Memory);

    let report = crawl(&config).await.expect("crawl should start");

    assert_eq!(report.pages_visited(), 2);
    assert_eq!(report.stored(), 1);
    assert_eq!(report.stop_reason, Some(StopReason::FrontierExhausted));
}

//! Timeout Integration Tests
//!
//! A slow backend must not hang callers: reads degrade to empty results,
//! writes surface a timeout error.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use topicbase::adapters::{GithubConfig, GithubStore, StoreError};
use topicbase::core::{ContentGateway, NoCache, TopicRepository, TtlCache};
use topicbase::{RepoError, Section};

const TIMEOUT: Duration = Duration::from_millis(200);
const DELAY: Duration = Duration::from_secs(3);

async fn slow_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(DELAY),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "content": { "sha": "abc" } }))
                .set_delay(DELAY),
        )
        .mount(&server)
        .await;

    server
}

fn github_store(server: &MockServer) -> Arc<GithubStore> {
    Arc::new(
        GithubStore::new(GithubConfig {
            owner: "owner".to_string(),
            repo: "portal".to_string(),
            branch: None,
            api_base: server.uri(),
            token: None,
        })
        .unwrap(),
    )
}

#[tokio::test]
async fn test_gateway_reads_degrade_on_timeout() {
    let server = slow_server().await;
    let gateway = ContentGateway::new(
        github_store(&server),
        Arc::new(TtlCache::new(Duration::from_secs(60))),
        TIMEOUT,
    );

    let started = Instant::now();
    assert!(gateway.list("content/fires").await.is_empty());
    assert!(gateway.get("content/fires/topic-1.md").await.is_none());
    assert!(started.elapsed() < DELAY);
}

#[tokio::test]
async fn test_gateway_fresh_read_and_write_report_timeout() {
    let server = slow_server().await;
    let gateway = ContentGateway::new(github_store(&server), Arc::new(NoCache), TIMEOUT);

    assert_eq!(
        gateway.get_fresh("content/fires/topic-1.md").await,
        Err(StoreError::Timeout(TIMEOUT))
    );
    assert_eq!(
        gateway
            .put("content/fires/topic-1.md", "body", None, "create")
            .await,
        Err(StoreError::Timeout(TIMEOUT))
    );
}

#[tokio::test]
async fn test_repository_under_slow_backend() {
    let server = slow_server().await;
    let gateway = ContentGateway::new(github_store(&server), Arc::new(NoCache), TIMEOUT);
    let repo = TopicRepository::new(gateway, "content");

    let started = Instant::now();
    assert!(repo.list_topics(Section::Fires).await.is_empty());
    assert!(repo.get_topic(5, None).await.is_none());
    // Four sequential section lookups, each bounded
    assert!(started.elapsed() < DELAY);

    let err = repo
        .save_topic(common::draft(5, "Test", "fires"))
        .await
        .unwrap_err();
    assert_eq!(err, RepoError::Storage(StoreError::Timeout(TIMEOUT)));
}

#[tokio::test]
async fn test_timed_out_reads_are_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/owner/portal/contents/content/fires"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "name": "topic-1.md", "type": "file" }]))
                .set_delay(DELAY),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/owner/portal/contents/content/fires"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "name": "topic-1.md", "type": "file" }])),
        )
        .mount(&server)
        .await;

    let gateway = ContentGateway::new(
        github_store(&server),
        Arc::new(TtlCache::new(Duration::from_secs(60))),
        TIMEOUT,
    );

    assert!(gateway.list("content/fires").await.is_empty());
    assert_eq!(gateway.list("content/fires").await, vec!["topic-1.md"]);
}

//! Integration tests for the scan orchestrator

mod common;

use common::test_config;
use sentinel::check::ScanEngine;
use sentinel::error::SentinelError;
use sentinel::models::ReportEntry;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_report_has_one_entry_per_check_in_request_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server.uri());
    config.checks = vec![
        "robots".to_string(),
        "headers".to_string(),
        "xss".to_string(),
        "headers".to_string(),
    ];

    let engine = ScanEngine::with_defaults();
    let report = engine.run(&config).await.expect("Scan failed");

    // Duplicates collapse, order of first mention is kept.
    let ids: Vec<&str> = report.results.keys().map(String::as_str).collect();
    assert_eq!(ids, ["robots", "headers", "xss"]);
    assert_eq!(report.error_count(), 0);
    assert!(report.total_requests > 0);
    assert!(report.ai_summary.is_none());
}

#[tokio::test]
async fn test_failing_check_does_not_abort_scan() {
    // Nothing listens here; every request fails at the transport level.
    let mut config = test_config("http://127.0.0.1:1");
    config.checks = vec!["headers".to_string(), "clickjacking".to_string()];

    let engine = ScanEngine::with_defaults();
    let report = engine.run(&config).await.expect("Scan failed");

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.error_count(), 2);
    assert!(report
        .results
        .values()
        .all(|entry| matches!(entry, ReportEntry::Error { .. })));
}

#[tokio::test]
async fn test_unknown_check_fails_before_any_request() {
    let mock_server = MockServer::start().await;
    // No mounted mocks: a single request would be a hard 404 from wiremock,
    // but the engine must refuse the id without sending anything.

    let mut config = test_config(&mock_server.uri());
    config.checks = vec!["headers".to_string(), "nosuchcheck".to_string()];

    let engine = ScanEngine::with_defaults();
    let err = engine.run(&config).await.expect_err("Expected failure");

    match err {
        SentinelError::UnknownCheck(id) => assert_eq!(id, "nosuchcheck"),
        other => panic!("Unexpected error: {other:?}"),
    }
    assert!(mock_server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_invalid_target_is_fatal() {
    let mut config = test_config("ftp://example.com");
    config.checks = vec!["headers".to_string()];

    let engine = ScanEngine::with_defaults();
    let err = engine.run(&config).await.expect_err("Expected failure");
    assert!(matches!(err, SentinelError::InvalidTarget(_)));
}

#[tokio::test]
async fn test_passive_check_is_idempotent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-Frame-Options", "DENY"))
        .mount(&mock_server)
        .await;

    let mut config = test_config(&mock_server.uri());
    config.checks = vec!["headers".to_string()];

    let engine = ScanEngine::with_defaults();
    let first = engine.run(&config).await.expect("Scan failed");
    let second = engine.run(&config).await.expect("Scan failed");

    let first_json = serde_json::to_value(&first.results).expect("serialize");
    let second_json = serde_json::to_value(&second.results).expect("serialize");
    assert_eq!(first_json, second_json);
}

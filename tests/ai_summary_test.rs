//! Integration tests for the AI summary collaborator

use sentinel::ai::Summarizer;
use sentinel::models::{AiConfig, ScanReport};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ai_config(endpoint: &str) -> AiConfig {
    AiConfig {
        enabled: true,
        endpoint: format!("{endpoint}/v1/chat/completions"),
        model: "test-model".to_string(),
        api_key: Some("test-key".to_string()),
    }
}

fn chat_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

#[tokio::test]
async fn test_summary_parsed_from_fenced_json() {
    let mock_server = MockServer::start().await;

    let content = "```json\n{\"summary\":\"Two issues found.\",\"rating\":\"C\",\
        \"recommendations\":[\"Fix CSP\",\"Enable HSTS\",\"Patch server\"],\
        \"criticalIssues\":[\"SQL injection\"],\"severityScore\":70,\
        \"overallRisk\":\"High\",\"immediateActions\":[\"Take form offline\"]}\n```";

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "temperature": 0.3,
            "max_tokens": 1500
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response(content)))
        .mount(&mock_server)
        .await;

    let summarizer = Summarizer::new(ai_config(&mock_server.uri()));
    let report = ScanReport::new("https://example.com");
    let summary = summarizer.summarize(&report).await;

    assert_eq!(summary.summary, "Two issues found.");
    assert_eq!(summary.rating, "C");
    assert_eq!(summary.severity_score, 70);
    assert_eq!(summary.overall_risk, "High");
    assert_eq!(summary.critical_issues, vec!["SQL injection"]);
    assert_eq!(summary.immediate_actions, vec!["Take form offline"]);
}

#[tokio::test]
async fn test_server_error_yields_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let summarizer = Summarizer::new(ai_config(&mock_server.uri()));
    let report = ScanReport::new("https://example.com");
    let summary = summarizer.summarize(&report).await;

    assert_eq!(summary.summary, "AI analysis failed - manual review recommended");
    assert_eq!(summary.rating, "N/A");
    assert_eq!(summary.overall_risk, "Unknown");
    assert_eq!(summary.severity_score, 0);
    assert_eq!(summary.recommendations, vec!["Review scan results manually"]);
}

#[tokio::test]
async fn test_unparseable_model_output_yields_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_response("Sorry, I cannot help with that.")),
        )
        .mount(&mock_server)
        .await;

    let summarizer = Summarizer::new(ai_config(&mock_server.uri()));
    let report = ScanReport::new("https://example.com");
    let summary = summarizer.summarize(&report).await;

    assert_eq!(summary.rating, "N/A");
    assert_eq!(summary.overall_risk, "Unknown");
}

#[tokio::test]
async fn test_missing_api_key_skips_request() {
    let mock_server = MockServer::start().await;

    let mut config = ai_config(&mock_server.uri());
    config.api_key = None;

    let summarizer = Summarizer::new(config);
    assert!(!summarizer.is_configured());

    let report = ScanReport::new("https://example.com");
    let summary = summarizer.summarize(&report).await;

    assert_eq!(summary.rating, "N/A");
    assert!(mock_server.received_requests().await.unwrap_or_default().is_empty());
}

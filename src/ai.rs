//! AI-assisted scan summarization
//!
//! Posts the scan report to an OpenAI-compatible chat completion endpoint
//! and asks for a structured assessment. Any failure along the way falls
//! back to a fixed summary instead of failing the scan.

use crate::models::{AiConfig, ScanReport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const TEMPERATURE: f64 = 0.3;
const MAX_TOKENS: u32 = 1500;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// AI-generated assessment attached to the scan report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSummary {
    pub summary: String,
    pub rating: String,
    pub recommendations: Vec<String>,
    pub critical_issues: Vec<String>,
    pub severity_score: i64,
    pub overall_risk: String,
    pub immediate_actions: Vec<String>,
}

impl AiSummary {
    /// Returned whenever the model cannot be reached or its output is unusable
    pub fn fallback() -> Self {
        Self {
            summary: "AI analysis failed - manual review recommended".to_string(),
            rating: "N/A".to_string(),
            recommendations: vec!["Review scan results manually".to_string()],
            critical_issues: Vec::new(),
            severity_score: 0,
            overall_risk: "Unknown".to_string(),
            immediate_actions: Vec::new(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Client for the chat completion endpoint configured in [`AiConfig`]
pub struct Summarizer {
    client: reqwest::Client,
    config: AiConfig,
}

impl Summarizer {
    pub fn new(config: AiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.enabled
            && self
                .config
                .api_key
                .as_deref()
                .is_some_and(|key| !key.is_empty())
    }

    /// Generates a summary of the report. Never fails; errors produce
    /// the fallback summary.
    pub async fn summarize(&self, report: &ScanReport) -> AiSummary {
        if !self.is_configured() {
            debug!("AI summarizer not configured, using fallback summary");
            return AiSummary::fallback();
        }

        match self.request_summary(report).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("AI summary generation failed: {e}");
                AiSummary::fallback()
            }
        }
    }

    async fn request_summary(&self, report: &ScanReport) -> Result<AiSummary, String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| "no API key configured".to_string())?;
        let prompt = build_prompt(report).map_err(|e| e.to_string())?;
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let parsed: ChatResponse = response.json().await.map_err(|e| e.to_string())?;
        let content = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or("{}");

        parse_response(content).ok_or_else(|| "model response was not valid JSON".to_string())
    }
}

fn build_prompt(report: &ScanReport) -> serde_json::Result<String> {
    let results = serde_json::to_string_pretty(&report.results)?;
    Ok(format!(
        r#"Analyze this web security scan report and provide a concise, actionable summary in JSON format.

Required JSON structure:
{{
  "summary": "Brief overall assessment (1-2 sentences)",
  "rating": "Letter grade (A, B, C, D, F) based on security posture",
  "recommendations": ["Array of 3 key actionable recommendations"],
  "criticalIssues": ["List of most critical vulnerabilities found"],
  "severityScore": "Numerical score 0-100 (100 being most severe)",
  "overallRisk": "Critical/High/Medium/Low",
  "immediateActions": ["2-3 urgent actions to take within 24 hours"]
}}

Focus on the most important findings. Keep it concise but actionable.

Report data:
URL: {url}
Timestamp: {timestamp}
Results: {results}

Respond only with valid JSON, no additional text."#,
        url = report.url,
        timestamp = report.timestamp.to_rfc3339(),
    ))
}

/// Parses the model output, tolerating markdown code fences around the JSON
fn parse_response(content: &str) -> Option<AiSummary> {
    let mut json = content.trim();
    if json.contains("```") {
        let start = json.find('{')?;
        let end = json.rfind('}')?;
        if end <= start {
            return None;
        }
        json = &json[start..=end];
    }

    let value: Value = serde_json::from_str(json).ok()?;
    Some(AiSummary {
        summary: field_str(&value, "summary", "Analysis unavailable"),
        rating: field_str(&value, "rating", "N/A"),
        recommendations: field_list(&value, "recommendations")
            .unwrap_or_else(|| vec!["Unable to generate recommendations".to_string()]),
        critical_issues: field_list(&value, "criticalIssues").unwrap_or_default(),
        severity_score: field_score(&value, "severityScore"),
        overall_risk: field_str(&value, "overallRisk", "Unknown"),
        immediate_actions: field_list(&value, "immediateActions").unwrap_or_default(),
    })
}

fn field_str(value: &Value, key: &str, default: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn field_list(value: &Value, key: &str) -> Option<Vec<String>> {
    let items = value.get(key)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn field_score(value: &Value, key: &str) -> i64 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let summary = parse_response(
            r#"{"summary":"Mostly fine.","rating":"B","recommendations":["Enable HSTS"],
                "criticalIssues":[],"severityScore":20,"overallRisk":"Low","immediateActions":[]}"#,
        )
        .unwrap();
        assert_eq!(summary.rating, "B");
        assert_eq!(summary.severity_score, 20);
        assert_eq!(summary.recommendations, vec!["Enable HSTS"]);
    }

    #[test]
    fn parses_fenced_json() {
        let content = "Here you go:\n```json\n{\"summary\":\"Bad.\",\"rating\":\"F\",\"severityScore\":\"90\"}\n```";
        let summary = parse_response(content).unwrap();
        assert_eq!(summary.rating, "F");
        assert_eq!(summary.severity_score, 90);
        assert_eq!(
            summary.recommendations,
            vec!["Unable to generate recommendations"]
        );
    }

    #[test]
    fn missing_fields_get_defaults() {
        let summary = parse_response("{}").unwrap();
        assert_eq!(summary.summary, "Analysis unavailable");
        assert_eq!(summary.overall_risk, "Unknown");
        assert_eq!(summary.severity_score, 0);
    }

    #[test]
    fn garbage_yields_none() {
        assert!(parse_response("not json at all").is_none());
    }
}

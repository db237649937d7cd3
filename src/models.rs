//! Core data models for the Sentinel scanner

use crate::ai::AiSummary;
use crate::check::Finding;
use crate::error::{Result, SentinelError};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default identifying user-agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "SentinelScan/1.0";

/// The URL under assessment for one scan run.
///
/// Only `http` and `https` schemes are accepted; checks that require
/// encryption short-circuit with a not-applicable result on plain `http`.
#[derive(Debug, Clone)]
pub struct Target {
    url: Url,
}

impl Target {
    /// Parses and validates a target URL
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input)?;
        match url.scheme() {
            "http" | "https" => Ok(Self { url }),
            other => Err(SentinelError::InvalidTarget(format!(
                "unsupported scheme '{other}' in {input}"
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn is_https(&self) -> bool {
        self.url.scheme() == "https"
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> u16 {
        self.url
            .port()
            .unwrap_or(if self.is_https() { 443 } else { 80 })
    }

    /// `scheme://host[:port]` without path or query
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// Appends a percent-encoded query parameter, reusing `?` or `&` as needed
    pub fn with_query_param(&self, key: &str, value: &str) -> String {
        // Spaces go out as %20, not the form-encoding '+', so servers that
        // decode the query per RFC 3986 see the literal payload.
        let encoded: String = url::form_urlencoded::byte_serialize(value.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        let sep = if self.url.as_str().contains('?') {
            '&'
        } else {
            '?'
        };
        format!("{}{sep}{key}={encoded}", self.url)
    }

    /// Appends a path to the target, collapsing a trailing slash first
    pub fn join_path(&self, path: &str) -> String {
        format!("{}{path}", self.url.as_str().trim_end_matches('/'))
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Tuning knobs for the detection heuristics.
///
/// These are deliberate thresholds and probe lists, not structural
/// invariants, so they live in configuration rather than as literals
/// inside the checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Number of sequential probes for the rate-limiting check
    pub rate_limit_requests: usize,
    /// Delay between rate-limiting probes in milliseconds
    pub rate_limit_delay_ms: u64,
    /// A response slower than `factor * average` counts toward throttling
    pub throttle_factor: f64,
    /// Probes before this index are warm-up and never count as throttled
    pub throttle_warmup: usize,
    /// Throttling is reported once more than this many probes are slow
    pub throttle_trigger: usize,
    /// Rejections at or after this index count as progressive blocking
    pub progressive_block_start: usize,
    /// Session cookie Max-Age above this many seconds is flagged
    pub session_max_age_secs: i64,
    pub sql_payloads: Vec<String>,
    pub sql_error_signatures: Vec<String>,
    pub upload_paths: Vec<String>,
    pub auth_paths: Vec<String>,
    pub listing_dirs: Vec<String>,
    pub dkim_selectors: Vec<String>,
    /// Maximum number of mixed-content URLs listed in a finding
    pub mixed_content_cap: usize,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            rate_limit_requests: 15,
            rate_limit_delay_ms: 200,
            throttle_factor: 1.5,
            throttle_warmup: 3,
            throttle_trigger: 2,
            progressive_block_start: 5,
            session_max_age_secs: 86_400 * 30,
            sql_payloads: [
                "' OR '1'='1",
                "'; DROP TABLE users; --",
                "' UNION SELECT * FROM users --",
                "admin' --",
                "1' OR '1' = '1",
            ]
            .map(String::from)
            .to_vec(),
            sql_error_signatures: [
                "sql syntax",
                "mysql error",
                "postgresql error",
                "sqlite error",
                "ora-",
                "microsoft sql server",
                "syntax error",
            ]
            .map(String::from)
            .to_vec(),
            upload_paths: ["/upload", "/fileupload", "/files", "/media"]
                .map(String::from)
                .to_vec(),
            auth_paths: [
                "/login",
                "/signin",
                "/auth",
                "/admin",
                "/account/login",
                "/user/login",
                "/signin",
                "/signup",
                "/register",
                "/account/register",
            ]
            .map(String::from)
            .to_vec(),
            listing_dirs: ["/admin/", "/backup/", "/config/", "/uploads/"]
                .map(String::from)
                .to_vec(),
            dkim_selectors: ["default", "google", "mail"].map(String::from).to_vec(),
            mixed_content_cap: 10,
        }
    }
}

/// Configuration for the AI summary collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
        }
    }
}

impl AiConfig {
    /// Reads the API key and model override from the process environment.
    /// Called once at configuration time; check logic never touches env vars.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            self.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("GROQ_MODEL") {
            self.model = model;
        }
    }
}

/// Configuration for a scan session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Target URL to scan
    pub target: String,
    /// Check identifiers to run; `all` expands to the full catalog
    pub checks: Vec<String>,
    /// User-Agent header value
    pub user_agent: String,
    /// Timeout for full-page fetches in seconds
    pub page_timeout_secs: u64,
    /// Timeout for HEAD/metadata probes in seconds
    pub head_timeout_secs: u64,
    #[serde(default)]
    pub heuristics: Heuristics,
    #[serde(default)]
    pub ai: AiConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            checks: vec!["all".to_string()],
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_timeout_secs: 10,
            head_timeout_secs: 5,
            heuristics: Heuristics::default(),
            ai: AiConfig::default(),
        }
    }
}

/// One entry in the scan report: a check's finding, or the error that
/// replaced it when the check failed.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportEntry {
    Finding(Finding),
    Error { error: String },
}

impl ReportEntry {
    pub fn is_error(&self) -> bool {
        matches!(self, ReportEntry::Error { .. })
    }
}

/// Aggregated result of a scan: one entry per requested check, in the
/// requested order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub url: String,
    pub scan_id: String,
    /// Set once when the report is created
    pub timestamp: DateTime<Utc>,
    pub results: IndexMap<String, ReportEntry>,
    /// Attached by the reporting layer after orchestration; never replaces
    /// or alters existing entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<AiSummary>,
    /// Total HTTP requests made during the scan
    pub total_requests: u64,
}

impl ScanReport {
    /// Creates an empty report for a target
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            scan_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            results: IndexMap::new(),
            ai_summary: None,
            total_requests: 0,
        }
    }

    /// Records the outcome of one check
    pub fn insert(&mut self, id: impl Into<String>, entry: ReportEntry) {
        self.results.insert(id.into(), entry);
    }

    /// Number of checks that failed outright
    pub fn error_count(&self) -> usize {
        self.results.values().filter(|e| e.is_error()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_rejects_non_http_schemes() {
        assert!(Target::parse("ftp://example.com").is_err());
        assert!(Target::parse("not a url").is_err());
        assert!(Target::parse("https://example.com").is_ok());
    }

    #[test]
    fn query_param_separator_follows_existing_query() {
        let bare = Target::parse("https://example.com/page").unwrap();
        assert_eq!(
            bare.with_query_param("test", "a b"),
            "https://example.com/page?test=a%20b"
        );
        assert_eq!(
            bare.with_query_param("test", "1+1 2"),
            "https://example.com/page?test=1%2B1%202"
        );

        let with_query = Target::parse("https://example.com/page?id=1").unwrap();
        assert!(with_query
            .with_query_param("test", "x")
            .starts_with("https://example.com/page?id=1&test="));
    }

    #[test]
    fn join_path_collapses_trailing_slash() {
        let target = Target::parse("https://example.com/").unwrap();
        assert_eq!(target.join_path("/admin/"), "https://example.com/admin/");
    }

    #[test]
    fn default_port_tracks_scheme() {
        assert_eq!(Target::parse("https://example.com").unwrap().port(), 443);
        assert_eq!(Target::parse("http://example.com").unwrap().port(), 80);
        assert_eq!(
            Target::parse("https://example.com:8443").unwrap().port(),
            8443
        );
    }
}

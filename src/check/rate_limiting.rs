//! Rate limiting assessment
//!
//! The one sequenced, timing-sensitive check: a fixed series of GET probes
//! is issued strictly in order and the server's defenses are classified
//! from the whole response sequence, not any single reply. A transport
//! failure for one probe is recorded and the sequence continues.

use crate::error::Result;
use crate::fetch::{FetchOptions, Fetcher};
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use serde::ser::Serializer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

/// Status of one probe: an HTTP status code, or `"Error"` for a transport
/// failure (the message lives in the attempt's `error` field).
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptStatus {
    Code(u16),
    Error,
}

impl AttemptStatus {
    pub fn code(&self) -> Option<u16> {
        match self {
            AttemptStatus::Code(c) => Some(*c),
            AttemptStatus::Error => None,
        }
    }
}

impl Serialize for AttemptStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AttemptStatus::Code(c) => serializer.serialize_u16(*c),
            AttemptStatus::Error => serializer.serialize_str("Error"),
        }
    }
}

/// One observed probe in the sequence
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitAttempt {
    /// 1-based request number
    pub request: usize,
    pub status: AttemptStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rate_limit_headers: BTreeMap<String, String>,
}

impl RateLimitAttempt {
    fn is_rate_limited(&self) -> bool {
        matches!(self.status.code(), Some(429) | Some(503))
            || self
                .error
                .as_deref()
                .map(|e| e.contains("rate limit"))
                .unwrap_or(false)
    }

    fn is_blocked(&self) -> bool {
        matches!(self.status.code(), Some(403) | Some(401))
    }

    fn is_rejection(&self) -> bool {
        matches!(self.status.code(), Some(429) | Some(403) | Some(503))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitFinding {
    pub requests_made: usize,
    pub rate_limited: usize,
    pub blocked: usize,
    pub average_response_time: f64,
    pub throttling_detected: bool,
    /// Request numbers (1-based) of late-sequence rejections
    pub progressive_blocking: Vec<usize>,
    pub status_codes: Vec<AttemptStatus>,
    pub issues: Vec<String>,
    pub vulnerable: bool,
    pub attempts: Vec<RateLimitAttempt>,
}

/// Classifies the probe sequence. Pure so the decision logic is testable
/// without a live server.
fn analyze(attempts: Vec<RateLimitAttempt>, config: &ScanConfig) -> RateLimitFinding {
    let h = &config.heuristics;

    let rate_limited = attempts.iter().filter(|a| a.is_rate_limited()).count();
    let blocked = attempts.iter().filter(|a| a.is_blocked()).count();

    // Failed probes count with their measured elapsed time, not zero.
    let average_response_time = if attempts.is_empty() {
        0.0
    } else {
        attempts.iter().map(|a| a.elapsed_ms as f64).sum::<f64>() / attempts.len() as f64
    };

    let slow_after_warmup = attempts
        .iter()
        .enumerate()
        .filter(|(i, a)| {
            *i >= h.throttle_warmup
                && a.elapsed_ms as f64 > average_response_time * h.throttle_factor
        })
        .count();
    let throttling_detected = slow_after_warmup > h.throttle_trigger;

    let progressive_blocking: Vec<usize> = attempts
        .iter()
        .enumerate()
        .filter(|(i, a)| *i >= h.progressive_block_start && a.is_rejection())
        .map(|(_, a)| a.request)
        .collect();

    let mut status_codes: Vec<AttemptStatus> = Vec::new();
    for attempt in &attempts {
        if !status_codes.contains(&attempt.status) {
            status_codes.push(attempt.status.clone());
        }
    }

    let mut issues = Vec::new();
    let vulnerable = rate_limited == 0 && blocked == 0 && !throttling_detected;

    if vulnerable {
        issues.push(
            "No rate limiting detected - server may be vulnerable to brute force attacks"
                .to_string(),
        );
    } else {
        if let Some(first) = attempts.iter().find(|a| a.is_rate_limited()) {
            issues.push(format!(
                "Rate limiting detected starting at request {}",
                first.request
            ));
        }
        if let Some(first) = progressive_blocking.first() {
            issues.push(format!(
                "Progressive blocking detected starting at request {first}"
            ));
        }
        if throttling_detected {
            issues.push(
                "Response time throttling detected - possible rate limiting implementation"
                    .to_string(),
            );
        }
        if attempts.iter().any(|a| !a.rate_limit_headers.is_empty()) {
            issues.push("Rate limit headers present in responses".to_string());
        }
    }

    RateLimitFinding {
        requests_made: attempts.len(),
        rate_limited,
        blocked,
        average_response_time,
        throttling_detected,
        progressive_blocking,
        status_codes,
        issues,
        vulnerable,
        attempts,
    }
}

fn rate_limit_headers(result: &crate::fetch::FetchResult) -> BTreeMap<String, String> {
    result
        .headers
        .iter()
        .filter(|(name, _)| {
            let name = name.as_str();
            name.starts_with("x-ratelimit") || name == "retry-after"
        })
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Probes the absence of request throttling and blocking
pub struct RateLimitingCheck;

#[async_trait]
impl super::Check for RateLimitingCheck {
    fn id(&self) -> &'static str {
        "rateLimiting"
    }

    fn description(&self) -> &'static str {
        "Rate limiting assessment via sequential timed probes"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        config: &ScanConfig,
    ) -> Result<super::Finding> {
        let total = config.heuristics.rate_limit_requests;
        let delay = Duration::from_millis(config.heuristics.rate_limit_delay_ms);
        let mut attempts = Vec::with_capacity(total);

        for i in 0..total {
            // A fresh spoofed client address per probe, so defenses keyed on
            // X-Forwarded-For are exercised too. TEST-NET-1 keeps the probe
            // traffic recognizable.
            let spoofed_ip = format!("203.0.113.{}", (i % 254) + 1);
            let options = FetchOptions {
                timeout: fetch.head_timeout(),
                extra_headers: vec![("X-Forwarded-For".to_string(), spoofed_ip)],
                ..FetchOptions::default()
            };

            let started = Instant::now();
            let attempt = match fetch.fetch(target.as_str(), options).await {
                Ok(response) => RateLimitAttempt {
                    request: i + 1,
                    status: AttemptStatus::Code(response.status),
                    error: None,
                    elapsed_ms: response.elapsed.as_millis() as u64,
                    rate_limit_headers: rate_limit_headers(&response),
                },
                Err(e) => RateLimitAttempt {
                    request: i + 1,
                    status: AttemptStatus::Error,
                    error: Some(e.to_string()),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                    rate_limit_headers: BTreeMap::new(),
                },
            };
            debug!(
                "Rate limit probe {}/{total}: {:?} in {}ms",
                i + 1,
                attempt.status,
                attempt.elapsed_ms
            );
            attempts.push(attempt);

            if i + 1 < total {
                sleep(delay).await;
            }
        }

        Ok(super::Finding::RateLimit(analyze(attempts, config)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScanConfig;

    fn attempt(request: usize, status: AttemptStatus, elapsed_ms: u64) -> RateLimitAttempt {
        RateLimitAttempt {
            request,
            status,
            error: None,
            elapsed_ms,
            rate_limit_headers: BTreeMap::new(),
        }
    }

    fn sequence_of(statuses: &[u16]) -> Vec<RateLimitAttempt> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, s)| attempt(i + 1, AttemptStatus::Code(*s), 50))
            .collect()
    }

    #[test]
    fn all_clear_sequence_is_vulnerable() {
        let finding = analyze(sequence_of(&[200; 15]), &ScanConfig::default());
        assert_eq!(finding.rate_limited, 0);
        assert_eq!(finding.blocked, 0);
        assert!(!finding.throttling_detected);
        assert!(finding.vulnerable);
        assert_eq!(finding.issues.len(), 1);
        assert!(finding.issues[0].contains("No rate limiting detected"));
    }

    #[test]
    fn late_429s_mark_rate_limiting_and_progressive_blocking() {
        let mut statuses = vec![200; 15];
        statuses[6] = 429;
        statuses[7] = 429;
        let finding = analyze(sequence_of(&statuses), &ScanConfig::default());

        assert_eq!(finding.rate_limited, 2);
        assert!(!finding.vulnerable);
        assert_eq!(finding.progressive_blocking, vec![7, 8]);
        assert!(finding
            .issues
            .iter()
            .any(|i| i.contains("starting at request 7")));
    }

    #[test]
    fn early_rejections_do_not_count_as_progressive_blocking() {
        let mut statuses = vec![200; 15];
        statuses[2] = 403;
        let finding = analyze(sequence_of(&statuses), &ScanConfig::default());

        assert_eq!(finding.blocked, 1);
        assert!(finding.progressive_blocking.is_empty());
        assert!(!finding.vulnerable);
    }

    #[test]
    fn throttling_requires_more_than_two_slow_probes_after_warmup() {
        // Average is pulled up by the slow tail; three post-warmup probes
        // exceed 1.5x the mean.
        let mut attempts: Vec<RateLimitAttempt> = (0..12)
            .map(|i| attempt(i + 1, AttemptStatus::Code(200), 10))
            .collect();
        for (n, ms) in [(13, 400u64), (14, 420), (15, 440)] {
            attempts.push(attempt(n, AttemptStatus::Code(200), ms));
        }
        let finding = analyze(attempts, &ScanConfig::default());
        assert!(finding.throttling_detected);
        assert!(!finding.vulnerable);

        // Two slow probes are not enough.
        let mut attempts: Vec<RateLimitAttempt> = (0..13)
            .map(|i| attempt(i + 1, AttemptStatus::Code(200), 10))
            .collect();
        for (n, ms) in [(14, 400u64), (15, 420)] {
            attempts.push(attempt(n, AttemptStatus::Code(200), ms));
        }
        let finding = analyze(attempts, &ScanConfig::default());
        assert!(!finding.throttling_detected);
    }

    #[test]
    fn transport_errors_count_toward_the_average_and_rate_limit_text() {
        let mut attempts = sequence_of(&[200; 14]);
        attempts.push(RateLimitAttempt {
            request: 15,
            status: AttemptStatus::Error,
            error: Some("server closed: rate limit exceeded".to_string()),
            elapsed_ms: 150,
            rate_limit_headers: BTreeMap::new(),
        });
        let finding = analyze(attempts, &ScanConfig::default());

        assert_eq!(finding.rate_limited, 1);
        assert!(!finding.vulnerable);
        let expected_avg = (50.0 * 14.0 + 150.0) / 15.0;
        assert!((finding.average_response_time - expected_avg).abs() < f64::EPSILON);
    }

    #[test]
    fn status_serializes_as_number_or_error_string() {
        let json = serde_json::to_string(&AttemptStatus::Code(429)).unwrap();
        assert_eq!(json, "429");
        let json = serde_json::to_string(&AttemptStatus::Error).unwrap();
        assert_eq!(json, "\"Error\"");
    }
}

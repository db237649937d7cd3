//! SQL injection probe
//!
//! Each payload is appended as a `test` query parameter; a database error
//! signature in the body or an outright 500 marks the payload as a hit.

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlProbe {
    pub payload: String,
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlInjectionFinding {
    pub vulnerable: bool,
    pub findings: Vec<SqlProbe>,
    pub tested_payloads: usize,
}

fn body_has_sql_error(body: &str, signatures: &[String]) -> bool {
    let lower = body.to_lowercase();
    signatures.iter().any(|sig| lower.contains(sig.as_str()))
}

/// Probes for error-based SQL injection signals
pub struct SqlInjectionCheck;

#[async_trait]
impl super::Check for SqlInjectionCheck {
    fn id(&self) -> &'static str {
        "sqlInjection"
    }

    fn description(&self) -> &'static str {
        "Error-based SQL injection probe with fixed payloads"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        config: &ScanConfig,
    ) -> Result<super::Finding> {
        let payloads = &config.heuristics.sql_payloads;
        let signatures = &config.heuristics.sql_error_signatures;
        let mut findings = Vec::new();

        for payload in payloads {
            let test_url = target.with_query_param("test", payload);
            match fetch.get_probe(&test_url).await {
                Ok(response) if response.status == 500 => {
                    findings.push(SqlProbe {
                        payload: payload.clone(),
                        url: test_url,
                        error: "500 Internal Server Error".to_string(),
                    });
                }
                Ok(response) if response.status < 500 => {
                    if body_has_sql_error(&response.body, signatures) {
                        findings.push(SqlProbe {
                            payload: payload.clone(),
                            url: test_url,
                            error: "SQL error detected".to_string(),
                        });
                    }
                }
                Ok(response) => {
                    debug!("Payload probe returned {}", response.status);
                }
                Err(e) => debug!("Payload probe failed: {e}"),
            }
        }

        Ok(super::Finding::SqlInjection(SqlInjectionFinding {
            vulnerable: !findings.is_empty(),
            findings,
            tested_payloads: payloads.len(),
        }))
    }
}

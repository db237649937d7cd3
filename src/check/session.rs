//! Session management analysis
//!
//! Classifies Set-Cookie entries as session cookies by name pattern, then
//! audits their flags and lifetime.

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;

use super::cookies::{parse_set_cookie, ParsedCookie};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFinding {
    pub session_cookies_found: usize,
    pub issues: Vec<String>,
    pub vulnerable: bool,
    pub cookies: Vec<ParsedCookie>,
}

fn is_session_cookie(name: &str) -> bool {
    let lower = name.to_lowercase();
    Regex::new(r"(?i)session|sess|auth|token|jwt")
        .map(|re| re.is_match(name))
        .unwrap_or(false)
        || lower.contains("jsessionid")
        || lower.contains("phpsessid")
}

/// Audits session cookie flags, SameSite strength, and lifetime
pub struct SessionCheck;

#[async_trait]
impl super::Check for SessionCheck {
    fn id(&self) -> &'static str {
        "sessionManagement"
    }

    fn description(&self) -> &'static str {
        "Session cookie flags, SameSite strength, and expiration"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        config: &ScanConfig,
    ) -> Result<super::Finding> {
        let response = fetch.head(target.as_str()).await?;

        let mut session_cookies = Vec::new();
        let mut issues = Vec::new();

        for raw in response.header_all("set-cookie") {
            let cookie = parse_set_cookie(&raw);
            if !is_session_cookie(&cookie.name) {
                continue;
            }

            if !cookie.secure {
                issues.push(format!(
                    "Session cookie '{}' not marked as Secure",
                    cookie.name
                ));
            }
            if !cookie.http_only {
                issues.push(format!(
                    "Session cookie '{}' not marked as HttpOnly",
                    cookie.name
                ));
            }
            if cookie.same_site.is_none() {
                issues.push(format!(
                    "Session cookie '{}' missing SameSite attribute",
                    cookie.name
                ));
            }
            if cookie.same_site.as_deref() == Some("Lax") && cookie.name.contains("auth") {
                issues.push(format!(
                    "Authentication cookie '{}' uses SameSite=Lax instead of Strict",
                    cookie.name
                ));
            }
            if let Some(max_age) = cookie.max_age {
                if max_age > config.heuristics.session_max_age_secs {
                    issues.push(format!(
                        "Session cookie '{}' has very long expiration ({max_age} seconds)",
                        cookie.name
                    ));
                }
            }

            session_cookies.push(cookie);
        }

        Ok(super::Finding::Session(SessionFinding {
            session_cookies_found: session_cookies.len(),
            vulnerable: !issues.is_empty(),
            issues,
            cookies: session_cookies,
        }))
    }
}

//! Security header presence check

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use serde::Serialize;

/// Presence of the standard protective response headers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadersFinding {
    pub csp: bool,
    pub hsts: bool,
    pub x_frame_options: bool,
    pub x_content_type_options: bool,
    pub referrer_policy: bool,
    pub permissions_policy: bool,
}

/// Checks for missing HTTP security headers
pub struct HeadersCheck;

#[async_trait]
impl super::Check for HeadersCheck {
    fn id(&self) -> &'static str {
        "headers"
    }

    fn description(&self) -> &'static str {
        "HTTP security headers (CSP, HSTS, X-Frame-Options, etc.)"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        _config: &ScanConfig,
    ) -> Result<super::Finding> {
        let response = fetch.head(target.as_str()).await?;

        Ok(super::Finding::Headers(HeadersFinding {
            csp: response.header("content-security-policy").is_some(),
            hsts: response.header("strict-transport-security").is_some(),
            x_frame_options: response.header("x-frame-options").is_some(),
            x_content_type_options: response.header("x-content-type-options").is_some(),
            referrer_policy: response.header("referrer-policy").is_some(),
            permissions_policy: response.header("permissions-policy").is_some(),
        }))
    }
}

//! Reflected XSS quick test

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use serde::Serialize;

const XSS_PAYLOAD: &str = r#"<script>alert("xss")</script>"#;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XssFinding {
    pub vulnerable: bool,
    pub tested_url: String,
}

/// Tests whether a script payload is reflected unescaped
pub struct XssCheck;

#[async_trait]
impl super::Check for XssCheck {
    fn id(&self) -> &'static str {
        "xss"
    }

    fn description(&self) -> &'static str {
        "XSS reflection quick test"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        _config: &ScanConfig,
    ) -> Result<super::Finding> {
        let test_url = target.with_query_param("test", XSS_PAYLOAD);
        let response = fetch.get_page(&test_url).await?;

        // Only the exact, unescaped payload counts; an HTML-encoded echo is
        // a correctly defended reflection.
        Ok(super::Finding::Xss(XssFinding {
            vulnerable: response.body.contains(XSS_PAYLOAD),
            tested_url: test_url,
        }))
    }
}

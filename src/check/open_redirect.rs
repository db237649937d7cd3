//! Open redirect probe

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::fetch::FetchOptions;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use serde::Serialize;

const EVIL_URL: &str = "http://evil.com";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRedirectFinding {
    pub vulnerable: bool,
    pub tested_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Tests whether a `url` parameter is echoed into a redirect Location
pub struct OpenRedirectCheck;

#[async_trait]
impl super::Check for OpenRedirectCheck {
    fn id(&self) -> &'static str {
        "openRedirect"
    }

    fn description(&self) -> &'static str {
        "Open redirect test via an attacker-controlled url parameter"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        _config: &ScanConfig,
    ) -> Result<super::Finding> {
        let test_url = target.with_query_param("url", EVIL_URL);

        // Redirects must not be followed: the signal is the Location header
        // of the first response, not where the chain ends up.
        let result = fetch
            .fetch(
                &test_url,
                FetchOptions {
                    timeout: fetch.head_timeout(),
                    follow_redirects: false,
                    ..FetchOptions::default()
                },
            )
            .await;

        Ok(super::Finding::OpenRedirect(match result {
            Ok(response) => {
                let location = response.header("location").map(String::from);
                OpenRedirectFinding {
                    vulnerable: location
                        .as_deref()
                        .map(|l| l.contains(EVIL_URL))
                        .unwrap_or(false),
                    tested_url: test_url,
                    redirect_location: location,
                    error: None,
                }
            }
            // A transport failure is a negative signal, not a check failure
            Err(e) => OpenRedirectFinding {
                vulnerable: false,
                tested_url: test_url,
                redirect_location: None,
                error: Some(e.to_string()),
            },
        }))
    }
}

//! CORS misconfiguration check

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use serde::Serialize;

/// The CORS response headers as observed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CorsHeaders {
    pub access_control_allow_origin: Option<String>,
    pub access_control_allow_methods: Option<String>,
    pub access_control_allow_headers: Option<String>,
    pub access_control_allow_credentials: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsFinding {
    pub cors_enabled: bool,
    pub misconfigured: bool,
    pub headers: CorsHeaders,
}

/// Flags wildcard or foreign-origin Access-Control-Allow-Origin values
pub struct CorsCheck;

#[async_trait]
impl super::Check for CorsCheck {
    fn id(&self) -> &'static str {
        "cors"
    }

    fn description(&self) -> &'static str {
        "CORS misconfiguration (wildcard or foreign allowed origins)"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        _config: &ScanConfig,
    ) -> Result<super::Finding> {
        let response = fetch.head(target.as_str()).await?;

        let own = |name: &str| response.header(name).map(String::from);
        let headers = CorsHeaders {
            access_control_allow_origin: own("access-control-allow-origin"),
            access_control_allow_methods: own("access-control-allow-methods"),
            access_control_allow_headers: own("access-control-allow-headers"),
            access_control_allow_credentials: own("access-control-allow-credentials"),
        };

        // Url::parse normalizes the target with a trailing slash, so the
        // origin comparison ignores one.
        let misconfigured = match headers.access_control_allow_origin.as_deref() {
            Some("*") => true,
            Some(origin) => {
                origin.trim_end_matches('/') != target.as_str().trim_end_matches('/')
                    && !origin.contains("null")
            }
            None => false,
        };

        Ok(super::Finding::Cors(CorsFinding {
            cors_enabled: headers.access_control_allow_origin.is_some(),
            misconfigured,
            headers,
        }))
    }
}

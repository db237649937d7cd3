//! Allowed HTTP methods probe

use crate::error::Result;
use crate::fetch::{FetchOptions, Fetcher};
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

const PROBED_METHODS: &[Method] = &[
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
];

#[derive(Debug, Clone, Serialize)]
pub struct MethodsFinding {
    pub allowed: Vec<String>,
}

/// Probes which HTTP verbs the server accepts
pub struct MethodsCheck;

#[async_trait]
impl super::Check for MethodsCheck {
    fn id(&self) -> &'static str {
        "methods"
    }

    fn description(&self) -> &'static str {
        "Allowed HTTP methods (GET, POST, PUT, DELETE, ...)"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        _config: &ScanConfig,
    ) -> Result<super::Finding> {
        let mut allowed = Vec::new();

        for method in PROBED_METHODS {
            let result = fetch
                .fetch(
                    target.as_str(),
                    FetchOptions {
                        method: method.clone(),
                        timeout: fetch.head_timeout(),
                        ..FetchOptions::default()
                    },
                )
                .await;

            match result {
                // 405 is an explicit refusal; a server error means the verb
                // was not usefully handled either.
                Ok(response) if response.status == 405 => {}
                Ok(response) if response.status < 500 => {
                    allowed.push(method.to_string());
                }
                Ok(response) => debug!("{method} returned {}", response.status),
                Err(e) => debug!("{method} probe failed: {e}"),
            }
        }

        Ok(super::Finding::Methods(MethodsFinding { allowed }))
    }
}

//! Server information disclosure check

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfoFinding {
    pub server_header: String,
    pub information_disclosure: bool,
}

/// Reports whether the Server header reveals software details
pub struct ServerInfoCheck;

#[async_trait]
impl super::Check for ServerInfoCheck {
    fn id(&self) -> &'static str {
        "serverInfo"
    }

    fn description(&self) -> &'static str {
        "Server information disclosure via the Server header"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        _config: &ScanConfig,
    ) -> Result<super::Finding> {
        let response = fetch.head(target.as_str()).await?;
        let server = response.header("server");

        Ok(super::Finding::ServerInfo(ServerInfoFinding {
            information_disclosure: server.is_some(),
            server_header: server.unwrap_or("Not disclosed").to_string(),
        }))
    }
}

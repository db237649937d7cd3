//! Directory listing exposure probe

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryListingFinding {
    pub vulnerable: bool,
    pub directories: Vec<String>,
}

/// True when a body looks like an auto-generated directory index
fn looks_like_listing(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("<title>index of")
        || lower.contains("directory listing")
        || (lower.contains("<a href=") && lower.contains("..") && lower.contains("parent directory"))
}

/// Probes well-known subdirectories for open listings
pub struct DirectoryListingCheck;

#[async_trait]
impl super::Check for DirectoryListingCheck {
    fn id(&self) -> &'static str {
        "directoryListing"
    }

    fn description(&self) -> &'static str {
        "Directory listing exposure on common subpaths"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        config: &ScanConfig,
    ) -> Result<super::Finding> {
        let mut directories = Vec::new();

        for dir in &config.heuristics.listing_dirs {
            let probe_url = target.join_path(dir);
            match fetch.get_probe(&probe_url).await {
                Ok(response) if response.status == 200 && looks_like_listing(&response.body) => {
                    directories.push(dir.clone());
                }
                Ok(_) => {}
                Err(e) => debug!("Listing probe {probe_url} failed: {e}"),
            }
        }

        Ok(super::Finding::DirectoryListing(DirectoryListingFinding {
            vulnerable: !directories.is_empty(),
            directories,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_listing_signatures() {
        assert!(looks_like_listing("<html><title>Index of /admin</title></html>"));
        assert!(looks_like_listing("A plain Directory Listing page"));
        assert!(looks_like_listing(
            r#"<a href="../">..</a> Parent Directory"#
        ));
        assert!(!looks_like_listing("<html><title>Welcome</title></html>"));
    }
}

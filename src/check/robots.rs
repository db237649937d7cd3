//! robots.txt and sitemap discovery check

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotsFinding {
    pub robots_txt: bool,
    pub sitemap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn references_sitemap(body: &str) -> bool {
    Regex::new(r"(?i)Sitemap:")
        .map(|re| re.is_match(body))
        .unwrap_or(false)
}

/// Checks whether robots.txt exists and declares a sitemap
pub struct RobotsCheck;

#[async_trait]
impl super::Check for RobotsCheck {
    fn id(&self) -> &'static str {
        "robots"
    }

    fn description(&self) -> &'static str {
        "robots.txt presence and sitemap declaration"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        _config: &ScanConfig,
    ) -> Result<super::Finding> {
        let url = format!("{}/robots.txt", target.origin());
        let finding = match fetch.get_probe(&url).await {
            Ok(res) => RobotsFinding {
                robots_txt: res.status == 200,
                sitemap: references_sitemap(&res.body),
                error: None,
            },
            Err(e) => RobotsFinding {
                robots_txt: false,
                sitemap: false,
                error: Some(e.to_string()),
            },
        };
        Ok(super::Finding::Robots(finding))
    }
}

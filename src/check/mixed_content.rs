//! Mixed content detection (plain-HTTP assets on an HTTPS page)

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedContentFinding {
    pub mixed_content: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
}

fn collect_insecure_urls(body: &str) -> Vec<String> {
    let selector = match Selector::parse("img[src], script[src], link[href], iframe[src]") {
        Ok(sel) => sel,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(body);
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("src").or_else(|| el.value().attr("href")))
        .filter(|src| src.starts_with("http://"))
        .map(String::from)
        .collect()
}

/// Scans HTTPS pages for assets loaded over plain HTTP
pub struct MixedContentCheck;

#[async_trait]
impl super::Check for MixedContentCheck {
    fn id(&self) -> &'static str {
        "mixedContent"
    }

    fn description(&self) -> &'static str {
        "Mixed-content detection (HTTP assets on an HTTPS site)"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        config: &ScanConfig,
    ) -> Result<super::Finding> {
        if !target.is_https() {
            return Ok(super::Finding::MixedContent(MixedContentFinding {
                mixed_content: false,
                reason: Some("Not HTTPS".to_string()),
                count: None,
                urls: Vec::new(),
            }));
        }

        let response = fetch.get_page(target.as_str()).await?;
        let mut urls = collect_insecure_urls(&response.body);
        let count = urls.len();
        urls.truncate(config.heuristics.mixed_content_cap);

        Ok(super::Finding::MixedContent(MixedContentFinding {
            mixed_content: count > 0,
            reason: None,
            count: Some(count),
            urls,
        }))
    }
}

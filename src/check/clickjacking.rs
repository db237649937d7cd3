//! Clickjacking exposure check
//!
//! Three independent protections are probed: a valid X-Frame-Options
//! header, a CSP `frame-ancestors` directive, and client-side frame-busting
//! script. The page is vulnerable only if all three are absent.

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionMethods {
    pub x_frame_options: bool,
    pub csp_frame_ancestors: bool,
    pub frame_busting: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickjackingFinding {
    pub x_frame_options: String,
    pub csp_frame_ancestors: bool,
    pub frame_busting_code: bool,
    pub protected: bool,
    pub vulnerable: bool,
    pub protection_methods: ProtectionMethods,
}

fn has_frame_busting(script_text: &str) -> bool {
    let markers = Regex::new(r"top\.location|window\.top|self\.parent")
        .map(|re| re.is_match(script_text))
        .unwrap_or(false);
    let guard = Regex::new(r"if\s*\(\s*window\s*!==\s*window\.top")
        .map(|re| re.is_match(script_text))
        .unwrap_or(false);
    markers || guard
}

/// Tests for missing framing protections
pub struct ClickjackingCheck;

#[async_trait]
impl super::Check for ClickjackingCheck {
    fn id(&self) -> &'static str {
        "clickjacking"
    }

    fn description(&self) -> &'static str {
        "Clickjacking exposure (X-Frame-Options, CSP frame-ancestors, frame busting)"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        _config: &ScanConfig,
    ) -> Result<super::Finding> {
        let response = fetch.get_page(target.as_str()).await?;

        let x_frame_options = response.header("x-frame-options").map(String::from);
        let csp = response.header("content-security-policy").map(String::from);

        let x_frame_valid = x_frame_options
            .as_deref()
            .map(|v| {
                let upper = v.to_uppercase();
                upper == "DENY" || upper == "SAMEORIGIN"
            })
            .unwrap_or(false);

        // `frame-ancestors 'none'` forbids framing entirely, so it does not
        // count as a frame-ancestors allowance.
        let csp_frame_ancestors = csp
            .as_deref()
            .map(|v| v.contains("frame-ancestors") && !v.contains("frame-ancestors 'none'"))
            .unwrap_or(false);

        let document = Html::parse_document(&response.body);
        let script_text: String = match Selector::parse("script") {
            Ok(selector) => document.select(&selector).flat_map(|s| s.text()).collect(),
            Err(_) => String::new(),
        };
        let frame_busting = has_frame_busting(&script_text);

        let vulnerable = !x_frame_valid && !csp_frame_ancestors && !frame_busting;

        Ok(super::Finding::Clickjacking(ClickjackingFinding {
            x_frame_options: x_frame_options.unwrap_or_else(|| "Not set".to_string()),
            csp_frame_ancestors,
            frame_busting_code: frame_busting,
            protected: !vulnerable,
            vulnerable,
            protection_methods: ProtectionMethods {
                x_frame_options: x_frame_valid,
                csp_frame_ancestors,
                frame_busting,
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_frame_busting_variants() {
        assert!(has_frame_busting("if (window.top !== window.self) top.location = self.location;"));
        assert!(has_frame_busting("if ( window !== window.top ) { document.body.innerHTML = ''; }"));
        assert!(!has_frame_busting("console.log('hello');"));
    }
}

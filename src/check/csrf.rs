//! CSRF token validation check
//!
//! A form is classified state-changing when its method is POST, PUT, DELETE,
//! or PATCH; such a form without a csrf/token/nonce input is vulnerable.

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Serialize;

const STATE_CHANGING_METHODS: &[&str] = &["POST", "PUT", "DELETE", "PATCH"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormAnalysis {
    pub method: String,
    pub action: String,
    pub has_csrf_token: bool,
    pub is_state_changing: bool,
    pub vulnerable: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfFinding {
    pub total_forms: usize,
    pub state_changing_forms: usize,
    pub vulnerable_forms: usize,
    pub forms: Vec<FormAnalysis>,
    pub overall_vulnerable: bool,
}

/// Extracts form analyses from a page body. Synchronous so no DOM
/// references are held across an await point.
fn analyze_forms(body: &str) -> Vec<FormAnalysis> {
    let mut analyses = Vec::new();

    let form_selector = match Selector::parse("form") {
        Ok(sel) => sel,
        Err(_) => return analyses,
    };
    let token_selector = Selector::parse(
        r#"input[name*="csrf"], input[name*="token"], input[name*="nonce"]"#,
    );

    let document = Html::parse_document(body);
    for form in document.select(&form_selector) {
        let method = form
            .value()
            .attr("method")
            .unwrap_or("GET")
            .to_uppercase();
        let action = form.value().attr("action").unwrap_or("").to_string();

        let has_csrf_token = token_selector
            .as_ref()
            .map(|sel| form.select(sel).next().is_some())
            .unwrap_or(false);
        let is_state_changing = STATE_CHANGING_METHODS.contains(&method.as_str());

        analyses.push(FormAnalysis {
            vulnerable: is_state_changing && !has_csrf_token,
            method,
            action,
            has_csrf_token,
            is_state_changing,
        });
    }

    analyses
}

/// Looks for state-changing forms without CSRF protection tokens
pub struct CsrfCheck;

#[async_trait]
impl super::Check for CsrfCheck {
    fn id(&self) -> &'static str {
        "csrf"
    }

    fn description(&self) -> &'static str {
        "CSRF token presence on state-changing forms"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        _config: &ScanConfig,
    ) -> Result<super::Finding> {
        let response = fetch.get_page(target.as_str()).await?;
        let forms = analyze_forms(&response.body);

        let vulnerable_forms = forms.iter().filter(|f| f.vulnerable).count();
        let state_changing_forms = forms.iter().filter(|f| f.is_state_changing).count();

        Ok(super::Finding::Csrf(CsrfFinding {
            total_forms: forms.len(),
            state_changing_forms,
            vulnerable_forms,
            overall_vulnerable: vulnerable_forms > 0,
            forms,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_form_without_token_is_vulnerable() {
        let forms = analyze_forms(
            r#"<form method="post" action="/transfer"><input name="amount"></form>"#,
        );
        assert_eq!(forms.len(), 1);
        assert!(forms[0].is_state_changing);
        assert!(!forms[0].has_csrf_token);
        assert!(forms[0].vulnerable);
    }

    #[test]
    fn token_input_protects_post_form() {
        let forms = analyze_forms(
            r#"<form method="POST"><input type="hidden" name="csrf_token" value="x"></form>"#,
        );
        assert!(forms[0].has_csrf_token);
        assert!(!forms[0].vulnerable);
    }

    #[test]
    fn get_form_is_never_state_changing() {
        let forms = analyze_forms(r#"<form action="/search"><input name="q"></form>"#);
        assert!(!forms[0].is_state_changing);
        assert!(!forms[0].vulnerable);
    }
}

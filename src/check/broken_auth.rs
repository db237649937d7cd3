//! Broken authentication detection
//!
//! Analyzes password-bearing forms on the home page and across well-known
//! auth paths: GET-method logins, missing username fields, and "remember me"
//! controls are each raised as issues, as is any accessible candidate path.

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    pub action: String,
    pub method: String,
    pub has_username: bool,
    pub has_password: bool,
    pub has_remember_me: bool,
    pub secure_method: bool,
    pub page: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenAuthFinding {
    pub login_forms_found: usize,
    pub common_paths_found: usize,
    pub main_page_forms: usize,
    pub path_forms: usize,
    pub issues: Vec<String>,
    pub vulnerable: bool,
    pub forms: Vec<LoginForm>,
    pub paths: Vec<String>,
}

/// Extracts every form containing a password field from a page body
fn extract_login_forms(body: &str, page: &str) -> Vec<LoginForm> {
    let mut forms = Vec::new();

    let form_selector = match Selector::parse("form") {
        Ok(sel) => sel,
        Err(_) => return forms,
    };
    let password_selector = match Selector::parse(r#"input[type="password"]"#) {
        Ok(sel) => sel,
        Err(_) => return forms,
    };
    let username_selector = Selector::parse(
        r#"input[type="text"], input[type="email"], input[name*="user"], input[name*="email"]"#,
    );
    let remember_selector =
        Selector::parse(r#"input[name*="remember"], input[type="checkbox"]"#);

    let document = Html::parse_document(body);
    for form in document.select(&form_selector) {
        if form.select(&password_selector).next().is_none() {
            continue;
        }

        let method = form
            .value()
            .attr("method")
            .unwrap_or("GET")
            .to_uppercase();
        let has_username = username_selector
            .as_ref()
            .map(|sel| form.select(sel).next().is_some())
            .unwrap_or(false);
        let has_remember_me = remember_selector
            .as_ref()
            .map(|sel| form.select(sel).next().is_some())
            .unwrap_or(false);

        forms.push(LoginForm {
            action: form.value().attr("action").unwrap_or("").to_string(),
            secure_method: method == "POST",
            method,
            has_username,
            has_password: true,
            has_remember_me,
            page: page.to_string(),
        });
    }

    forms
}

/// Probes login surfaces for weak form configurations
pub struct BrokenAuthCheck;

#[async_trait]
impl super::Check for BrokenAuthCheck {
    fn id(&self) -> &'static str {
        "brokenAuth"
    }

    fn description(&self) -> &'static str {
        "Broken authentication (weak login forms, exposed auth paths)"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        config: &ScanConfig,
    ) -> Result<super::Finding> {
        let response = fetch.get_page(target.as_str()).await?;
        let main_forms = extract_login_forms(&response.body, "main");

        let mut found_paths = Vec::new();
        let mut path_forms = Vec::new();
        for path in &config.heuristics.auth_paths {
            let probe_url = target.join_path(path);
            match fetch.get_page(&probe_url).await {
                Ok(probe) if probe.status == 200 => {
                    found_paths.push(path.clone());
                    path_forms.extend(extract_login_forms(&probe.body, path));
                }
                Ok(_) => {}
                Err(e) => debug!("Auth path probe {probe_url} failed: {e}"),
            }
        }

        let main_count = main_forms.len();
        let path_count = path_forms.len();
        let mut forms = main_forms;
        forms.append(&mut path_forms);

        let mut issues = Vec::new();
        for form in &forms {
            if !form.secure_method {
                issues.push(format!(
                    "Login form on {} uses insecure GET method",
                    form.page
                ));
            }
            if !form.has_username {
                issues.push(format!(
                    "Login form on {} missing username/email field",
                    form.page
                ));
            }
            if form.has_remember_me {
                issues.push(format!(
                    "Login form on {} has 'Remember Me' which may extend session unnecessarily",
                    form.page
                ));
            }
        }

        if !found_paths.is_empty() {
            issues.push(format!(
                "Found {} accessible login/auth paths - ensure proper protection",
                found_paths.len()
            ));
        }

        Ok(super::Finding::BrokenAuth(BrokenAuthFinding {
            login_forms_found: forms.len(),
            common_paths_found: found_paths.len(),
            main_page_forms: main_count,
            path_forms: path_count,
            vulnerable: !issues.is_empty(),
            issues,
            forms,
            paths: found_paths,
        }))
    }
}

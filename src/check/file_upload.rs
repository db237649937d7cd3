//! File upload exposure check

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadForm {
    pub action: String,
    pub method: String,
    pub enctype: String,
    pub accept: String,
    pub multiple: bool,
    pub file_inputs_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadFinding {
    pub upload_forms_found: usize,
    pub common_paths_found: usize,
    pub issues: Vec<String>,
    pub vulnerable: bool,
    pub forms: Vec<UploadForm>,
    pub paths: Vec<String>,
}

fn analyze_upload_forms(body: &str, issues: &mut Vec<String>) -> Vec<UploadForm> {
    let mut forms = Vec::new();

    let form_selector = match Selector::parse("form") {
        Ok(sel) => sel,
        Err(_) => return forms,
    };
    let file_selector = match Selector::parse(r#"input[type="file"]"#) {
        Ok(sel) => sel,
        Err(_) => return forms,
    };

    let document = Html::parse_document(body);
    for form in document.select(&form_selector) {
        let file_inputs: Vec<_> = form.select(&file_selector).collect();
        if file_inputs.is_empty() {
            continue;
        }

        let method = form
            .value()
            .attr("method")
            .unwrap_or("POST")
            .to_uppercase();
        let enctype = form
            .value()
            .attr("enctype")
            .unwrap_or("application/x-www-form-urlencoded")
            .to_string();
        let accept = file_inputs[0].value().attr("accept").unwrap_or("").to_string();
        let multiple = file_inputs[0].value().attr("multiple").is_some();

        if method != "POST" {
            issues.push(format!("Upload form uses {method} instead of POST"));
        }
        if enctype != "multipart/form-data" {
            issues.push("Upload form missing enctype=\"multipart/form-data\"".to_string());
        }
        if accept.is_empty() {
            issues.push("Upload form allows all file types (no accept attribute)".to_string());
        }
        if multiple {
            issues.push("Upload form allows multiple files which increases risk".to_string());
        }

        forms.push(UploadForm {
            action: form.value().attr("action").unwrap_or("").to_string(),
            method,
            enctype,
            accept,
            multiple,
            file_inputs_count: file_inputs.len(),
        });
    }

    forms
}

/// Audits upload forms and probes well-known upload paths
pub struct FileUploadCheck;

#[async_trait]
impl super::Check for FileUploadCheck {
    fn id(&self) -> &'static str {
        "fileUpload"
    }

    fn description(&self) -> &'static str {
        "File upload form weaknesses and exposed upload paths"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        config: &ScanConfig,
    ) -> Result<super::Finding> {
        let response = fetch.get_page(target.as_str()).await?;

        let mut issues = Vec::new();
        let forms = analyze_upload_forms(&response.body, &mut issues);

        let mut found_paths = Vec::new();
        for path in &config.heuristics.upload_paths {
            let probe_url = target.join_path(path);
            match fetch.get_page(&probe_url).await {
                Ok(probe) if probe.status == 200 => {
                    found_paths.push(path.clone());
                    issues.push(format!("Common upload path '{path}' is accessible"));
                }
                Ok(_) => {}
                Err(e) => debug!("Upload path probe {probe_url} failed: {e}"),
            }
        }

        Ok(super::Finding::FileUpload(FileUploadFinding {
            upload_forms_found: forms.len(),
            common_paths_found: found_paths.len(),
            vulnerable: !issues.is_empty(),
            issues,
            forms,
            paths: found_paths,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_weak_upload_form_attributes() {
        let mut issues = Vec::new();
        let forms = analyze_upload_forms(
            r#"<form method="get" action="/up"><input type="file" name="f" multiple></form>"#,
            &mut issues,
        );
        assert_eq!(forms.len(), 1);
        assert!(issues.iter().any(|i| i.contains("GET instead of POST")));
        assert!(issues.iter().any(|i| i.contains("multipart/form-data")));
        assert!(issues.iter().any(|i| i.contains("no accept attribute")));
        assert!(issues.iter().any(|i| i.contains("multiple files")));
    }

    #[test]
    fn well_formed_upload_form_raises_no_issue() {
        let mut issues = Vec::new();
        let forms = analyze_upload_forms(
            r#"<form method="post" enctype="multipart/form-data">
                 <input type="file" name="f" accept="image/png">
               </form>"#,
            &mut issues,
        );
        assert_eq!(forms.len(), 1);
        assert!(issues.is_empty());
    }
}

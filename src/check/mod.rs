//! Check catalog, contract, and the scan orchestrator

pub mod broken_auth;
pub mod clickjacking;
pub mod cookies;
pub mod cors;
pub mod csrf;
pub mod directory_listing;
pub mod dns_security;
pub mod file_upload;
pub mod headers;
pub mod methods;
pub mod mixed_content;
pub mod open_redirect;
pub mod rate_limiting;
pub mod robots;
pub mod server_info;
pub mod session;
pub mod sql_injection;
pub mod ssl_cipher;
pub mod tls;
pub mod xss;

use crate::error::{Result, SentinelError};
use crate::fetch::Fetcher;
use crate::models::{ReportEntry, ScanConfig, ScanReport, Target};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Sentinel value that expands to the full catalog
pub const ALL_CHECKS: &str = "all";

/// Contract every check must satisfy.
///
/// A check is a pure function of the target and the responses it chooses to
/// fetch. It keeps no state between invocations, and a clean "no weakness
/// found" result is a finding, never an error.
#[async_trait]
pub trait Check: Send + Sync {
    /// Catalog identifier, also the report key
    fn id(&self) -> &'static str;

    /// Human-readable description of what this check probes
    fn description(&self) -> &'static str;

    /// Runs the check against the target
    async fn run(&self, fetch: &Fetcher, target: &Target, config: &ScanConfig)
        -> Result<Finding>;
}

/// Union of all check outputs. Serialized untagged so every finding keeps
/// its own self-describing JSON shape.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Finding {
    Tls(tls::TlsFinding),
    Headers(headers::HeadersFinding),
    Methods(methods::MethodsFinding),
    MixedContent(mixed_content::MixedContentFinding),
    Robots(robots::RobotsFinding),
    Cookies(cookies::CookiesFinding),
    Xss(xss::XssFinding),
    OpenRedirect(open_redirect::OpenRedirectFinding),
    Cors(cors::CorsFinding),
    ServerInfo(server_info::ServerInfoFinding),
    DirectoryListing(directory_listing::DirectoryListingFinding),
    SqlInjection(sql_injection::SqlInjectionFinding),
    Csrf(csrf::CsrfFinding),
    SslCipher(ssl_cipher::SslCipherFinding),
    DnsSecurity(dns_security::DnsSecurityFinding),
    BrokenAuth(broken_auth::BrokenAuthFinding),
    Clickjacking(clickjacking::ClickjackingFinding),
    Session(session::SessionFinding),
    FileUpload(file_upload::FileUploadFinding),
    RateLimit(rate_limiting::RateLimitFinding),
}

impl Finding {
    /// The check's overall vulnerability verdict, where one exists.
    /// Purely informational checks return `None`.
    pub fn vulnerable(&self) -> Option<bool> {
        match self {
            Finding::Tls(_) | Finding::Headers(_) | Finding::Methods(_) => None,
            Finding::Robots(_) | Finding::Cookies(_) | Finding::DnsSecurity(_) => None,
            Finding::SslCipher(f) => f.recommended.map(|r| !r),
            Finding::MixedContent(f) => Some(f.mixed_content),
            Finding::Xss(f) => Some(f.vulnerable),
            Finding::OpenRedirect(f) => Some(f.vulnerable),
            Finding::Cors(f) => Some(f.misconfigured),
            Finding::ServerInfo(f) => Some(f.information_disclosure),
            Finding::DirectoryListing(f) => Some(f.vulnerable),
            Finding::SqlInjection(f) => Some(f.vulnerable),
            Finding::Csrf(f) => Some(f.overall_vulnerable),
            Finding::BrokenAuth(f) => Some(f.vulnerable),
            Finding::Clickjacking(f) => Some(f.vulnerable),
            Finding::Session(f) => Some(f.vulnerable),
            Finding::FileUpload(f) => Some(f.vulnerable),
            Finding::RateLimit(f) => Some(f.vulnerable),
        }
    }
}

/// The full catalog in its declared order. This order is also what the
/// `all` sentinel expands to.
pub fn catalog() -> Vec<Arc<dyn Check>> {
    vec![
        Arc::new(tls::TlsCheck),
        Arc::new(headers::HeadersCheck),
        Arc::new(methods::MethodsCheck),
        Arc::new(mixed_content::MixedContentCheck),
        Arc::new(robots::RobotsCheck),
        Arc::new(cookies::CookiesCheck),
        Arc::new(xss::XssCheck),
        Arc::new(open_redirect::OpenRedirectCheck),
        Arc::new(cors::CorsCheck),
        Arc::new(server_info::ServerInfoCheck),
        Arc::new(directory_listing::DirectoryListingCheck),
        Arc::new(sql_injection::SqlInjectionCheck),
        Arc::new(csrf::CsrfCheck),
        Arc::new(ssl_cipher::SslCipherCheck),
        Arc::new(dns_security::DnsSecurityCheck),
        Arc::new(broken_auth::BrokenAuthCheck),
        Arc::new(clickjacking::ClickjackingCheck),
        Arc::new(session::SessionCheck),
        Arc::new(file_upload::FileUploadCheck),
        Arc::new(rate_limiting::RateLimitingCheck),
    ]
}

/// Orchestrates check execution against a single target
pub struct ScanEngine {
    checks: Vec<Arc<dyn Check>>,
}

impl ScanEngine {
    /// Engine with the full default catalog registered
    pub fn with_defaults() -> Self {
        Self { checks: catalog() }
    }

    /// Registers an additional check
    pub fn register(&mut self, check: Arc<dyn Check>) {
        self.checks.push(check);
    }

    /// Returns id and description for every registered check
    pub fn list_checks(&self) -> Vec<(&str, &str)> {
        self.checks
            .iter()
            .map(|c| (c.id(), c.description()))
            .collect()
    }

    /// Resolves requested identifiers against the registry, preserving
    /// request order and dropping duplicates. Unknown ids fail here, before
    /// any request is sent.
    pub fn resolve(&self, ids: &[String]) -> Result<Vec<Arc<dyn Check>>> {
        if ids.iter().any(|id| id == ALL_CHECKS) {
            return Ok(self.checks.clone());
        }

        let mut selected: Vec<Arc<dyn Check>> = Vec::new();
        for id in ids {
            let check = self
                .checks
                .iter()
                .find(|c| c.id() == id)
                .ok_or_else(|| SentinelError::UnknownCheck(id.clone()))?;
            if !selected.iter().any(|c| c.id() == check.id()) {
                selected.push(Arc::clone(check));
            }
        }
        Ok(selected)
    }

    /// Runs the selected checks strictly sequentially and assembles the
    /// report. A failing check becomes an error entry under its own id; the
    /// scan always continues to the next check and the report always holds
    /// one entry per selected check.
    pub async fn run(&self, config: &ScanConfig) -> Result<ScanReport> {
        let target = Target::parse(&config.target)?;
        let checks = self.resolve(&config.checks)?;
        let fetch = Fetcher::from_config(config)?;
        let mut report = ScanReport::new(target.as_str());

        let pb = ProgressBar::new(checks.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        for check in &checks {
            pb.set_message(format!("Running {}...", check.id()));
            info!("Executing check: {}", check.id());

            let entry = match check.run(&fetch, &target, config).await {
                Ok(finding) => {
                    info!("Check '{}' completed", check.id());
                    ReportEntry::Finding(finding)
                }
                Err(e) => {
                    error!("Check '{}' failed: {e}", check.id());
                    ReportEntry::Error {
                        error: e.to_string(),
                    }
                }
            };
            report.insert(check.id(), entry);
            pb.inc(1);
        }

        pb.finish_with_message("Scan complete");
        report.total_requests = fetch.request_count();
        Ok(report)
    }
}

impl Default for ScanEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

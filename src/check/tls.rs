//! TLS certificate validity check

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use crate::tls_probe;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use x509_parser::prelude::{FromDer, X509Certificate};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsFinding {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl TlsFinding {
    fn not_applicable(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
            expiry_days: None,
            issuer: None,
            subject: None,
        }
    }
}

fn common_name(name: &x509_parser::x509::X509Name) -> String {
    name.iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .unwrap_or("Unknown")
        .to_string()
}

/// Evaluates the peer certificate's validity window
fn evaluate_certificate(der: &[u8]) -> TlsFinding {
    let cert = match X509Certificate::from_der(der) {
        Ok((_, cert)) => cert,
        Err(e) => return TlsFinding::not_applicable(format!("Certificate parse error: {e}")),
    };

    let validity = cert.validity();
    let not_before = validity.not_before.timestamp();
    let not_after = validity.not_after.timestamp();
    let now = Utc::now().timestamp();

    TlsFinding {
        valid: now >= not_before && now <= not_after,
        reason: None,
        expiry_days: Some(((not_after - now) as f64 / 86_400.0).ceil() as i64),
        issuer: Some(common_name(cert.issuer())),
        subject: Some(common_name(cert.subject())),
    }
}

/// Checks certificate validity and days to expiry
pub struct TlsCheck;

#[async_trait]
impl super::Check for TlsCheck {
    fn id(&self) -> &'static str {
        "tls"
    }

    fn description(&self) -> &'static str {
        "SSL/TLS certificate validity and expiry"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        _config: &ScanConfig,
    ) -> Result<super::Finding> {
        if !target.is_https() {
            return Ok(super::Finding::Tls(TlsFinding::not_applicable("Not HTTPS")));
        }

        // A handshake failure means no certificate to judge, which the
        // report carries as a reason rather than a check error.
        let session =
            match tls_probe::handshake(target.host(), target.port(), fetch.head_timeout()).await {
                Ok(session) => session,
                Err(e) => return Ok(super::Finding::Tls(TlsFinding::not_applicable(e.to_string()))),
            };

        let finding = match session.peer_cert_der {
            Some(der) => evaluate_certificate(&der),
            None => TlsFinding::not_applicable("No certificate found"),
        };

        Ok(super::Finding::Tls(finding))
    }
}

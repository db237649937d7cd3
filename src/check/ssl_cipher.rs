//! Negotiated cipher suite and protocol version check

use crate::error::Result;
use crate::fetch::Fetcher;
use crate::models::{ScanConfig, Target};
use crate::tls_probe;
use async_trait::async_trait;
use serde::Serialize;

const WEAK_CIPHER_MARKERS: [&str; 5] = ["RC4", "DES", "3DES", "NULL", "EXPORT"];
const OUTDATED_PROTOCOLS: [&str; 2] = ["TLSv1", "TLSv1.1"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SslCipherFinding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cipher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_weak_cipher: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_outdated_protocol: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,
}

impl SslCipherFinding {
    fn not_applicable(reason: impl Into<String>) -> Self {
        Self {
            supported: Some(false),
            reason: Some(reason.into()),
            cipher: None,
            protocol: None,
            is_weak_cipher: None,
            is_outdated_protocol: None,
            recommended: None,
        }
    }
}

fn is_weak_cipher(cipher: &str) -> bool {
    let upper = cipher.to_uppercase();
    WEAK_CIPHER_MARKERS.iter().any(|m| upper.contains(m))
}

fn is_outdated_protocol(protocol: &str) -> bool {
    OUTDATED_PROTOCOLS.contains(&protocol)
}

fn evaluate(protocol: String, cipher: String) -> SslCipherFinding {
    let weak = is_weak_cipher(&cipher);
    let outdated = is_outdated_protocol(&protocol);
    SslCipherFinding {
        supported: None,
        reason: None,
        cipher: Some(cipher),
        protocol: Some(protocol),
        is_weak_cipher: Some(weak),
        is_outdated_protocol: Some(outdated),
        recommended: Some(!weak && !outdated),
    }
}

/// Reports the negotiated protocol/cipher and flags weak or outdated choices
pub struct SslCipherCheck;

#[async_trait]
impl super::Check for SslCipherCheck {
    fn id(&self) -> &'static str {
        "sslCipher"
    }

    fn description(&self) -> &'static str {
        "Negotiated TLS protocol and cipher strength"
    }

    async fn run(
        &self,
        fetch: &Fetcher,
        target: &Target,
        _config: &ScanConfig,
    ) -> Result<super::Finding> {
        if !target.is_https() {
            return Ok(super::Finding::SslCipher(SslCipherFinding::not_applicable(
                "Not HTTPS",
            )));
        }

        let session =
            match tls_probe::handshake(target.host(), target.port(), fetch.head_timeout()).await {
                Ok(session) => session,
                Err(e) => {
                    return Ok(super::Finding::SslCipher(SslCipherFinding::not_applicable(
                        e.to_string(),
                    )))
                }
            };

        let protocol = session.protocol.unwrap_or_else(|| "unknown".to_string());
        let cipher = session.cipher_suite.unwrap_or_else(|| "unknown".to_string());
        Ok(super::Finding::SslCipher(evaluate(protocol, cipher)))
    }
}

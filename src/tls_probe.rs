//! Raw TLS session probe
//!
//! Opens a TLS connection with certificate verification disabled so the
//! negotiated parameters and peer certificate can be inspected even when
//! the certificate would fail browser validation. Nothing is sent over the
//! connection; only the handshake result is read.

use crate::error::{Result, SentinelError};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, ProtocolVersion, SignatureScheme};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::debug;

/// Accepts any peer certificate. Validity is judged separately by the TLS
/// check from the certificate contents, not by the handshake.
#[derive(Debug)]
struct AcceptAnyCert;

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Parameters observed during one TLS handshake
#[derive(Debug, Clone)]
pub struct TlsSession {
    pub protocol: Option<String>,
    pub cipher_suite: Option<String>,
    pub peer_cert_der: Option<Vec<u8>>,
}

fn protocol_name(version: ProtocolVersion) -> String {
    match version {
        ProtocolVersion::TLSv1_0 => "TLSv1".to_string(),
        ProtocolVersion::TLSv1_1 => "TLSv1.1".to_string(),
        ProtocolVersion::TLSv1_2 => "TLSv1.2".to_string(),
        ProtocolVersion::TLSv1_3 => "TLSv1.3".to_string(),
        other => format!("{other:?}"),
    }
}

/// Performs a bounded TLS handshake and captures the session parameters
pub async fn handshake(host: &str, port: u16, deadline: Duration) -> Result<TlsSession> {
    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| SentinelError::Tls(format!("TLS config error: {e}")))?
    .dangerous()
    .with_custom_certificate_verifier(Arc::new(AcceptAnyCert))
    .with_no_client_auth();

    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| SentinelError::Tls(format!("invalid server name '{host}': {e}")))?;

    let tcp = timeout(deadline, TcpStream::connect((host, port)))
        .await
        .map_err(|_| SentinelError::Tls(format!("connect to {host}:{port} timed out")))?
        .map_err(|e| SentinelError::Tls(format!("TCP connect to {host}:{port} failed: {e}")))?;

    let connector = TlsConnector::from(Arc::new(config));
    let stream = timeout(deadline, connector.connect(server_name, tcp))
        .await
        .map_err(|_| SentinelError::Tls(format!("TLS handshake with {host} timed out")))?
        .map_err(|e| SentinelError::Tls(format!("TLS handshake with {host} failed: {e}")))?;

    let (_, connection) = stream.get_ref();
    let session = TlsSession {
        protocol: connection.protocol_version().map(protocol_name),
        cipher_suite: connection
            .negotiated_cipher_suite()
            .map(|suite| format!("{:?}", suite.suite())),
        peer_cert_der: connection
            .peer_certificates()
            .and_then(|certs| certs.first())
            .map(|cert| cert.as_ref().to_vec()),
    };

    debug!(
        "TLS session with {host}:{port}: protocol={:?} cipher={:?}",
        session.protocol, session.cipher_suite
    );

    Ok(session)
}

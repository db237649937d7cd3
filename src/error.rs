//! Error types for the Sentinel scanner

use thiserror::Error;

/// Main error type for Sentinel operations
#[derive(Debug, Error)]
pub enum SentinelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("DNS error: {0}")]
    Dns(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Unknown check '{0}'")]
    UnknownCheck(String),
}

/// Result type alias for Sentinel operations
pub type Result<T> = std::result::Result<T, SentinelError>;

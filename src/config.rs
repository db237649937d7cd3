//! Configuration management for the Sentinel scanner

use crate::error::{Result, SentinelError};
use crate::models::{Heuristics, ScanConfig};
use serde::Deserialize;
use std::path::Path;

/// File-based configuration structure matching sentinel.toml
#[derive(Debug, Deserialize)]
struct FileConfig {
    scan: Option<ScanSection>,
    heuristics: Option<Heuristics>,
    ai: Option<AiSection>,
}

#[derive(Debug, Deserialize)]
struct ScanSection {
    checks: Option<Vec<String>>,
    user_agent: Option<String>,
    page_timeout_secs: Option<u64>,
    head_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AiSection {
    enabled: Option<bool>,
    endpoint: Option<String>,
    model: Option<String>,
}

/// Loads configuration from a TOML file and merges with defaults
pub fn load_config(path: &Path) -> Result<ScanConfig> {
    let content = std::fs::read_to_string(path).map_err(SentinelError::Io)?;
    let file_config: FileConfig = toml::from_str(&content)?;

    let mut config = ScanConfig::default();

    if let Some(scan) = file_config.scan {
        if let Some(checks) = scan.checks {
            config.checks = checks;
        }
        if let Some(ua) = scan.user_agent {
            config.user_agent = ua;
        }
        if let Some(timeout) = scan.page_timeout_secs {
            config.page_timeout_secs = timeout;
        }
        if let Some(timeout) = scan.head_timeout_secs {
            config.head_timeout_secs = timeout;
        }
    }

    if let Some(heuristics) = file_config.heuristics {
        config.heuristics = heuristics;
    }

    if let Some(ai) = file_config.ai {
        if let Some(enabled) = ai.enabled {
            config.ai.enabled = enabled;
        }
        if let Some(endpoint) = ai.endpoint {
            config.ai.endpoint = endpoint;
        }
        if let Some(model) = ai.model {
            config.ai.model = model;
        }
    }

    Ok(config)
}

/// Merges CLI arguments into an existing ScanConfig
pub fn merge_cli_args(
    config: &mut ScanConfig,
    target: String,
    checks: Option<Vec<String>>,
    user_agent: Option<String>,
    no_ai: bool,
) {
    config.target = target;

    if let Some(checks) = checks {
        config.checks = checks;
    }
    if let Some(ua) = user_agent {
        config.user_agent = ua;
    }
    if no_ai {
        config.ai.enabled = false;
    }
}

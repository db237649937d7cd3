//! Common test utilities

use sentinel::fetch::Fetcher;
use sentinel::models::{ScanConfig, Target};

/// Creates a test ScanConfig pointing to a wiremock server
pub fn test_config(target: &str) -> ScanConfig {
    let mut config = ScanConfig::default();
    config.target = target.to_string();
    config.user_agent = "Sentinel-Test/0.1.0".to_string();
    config.heuristics.rate_limit_delay_ms = 0;
    config.ai.enabled = false;
    config
}

/// Builds the fetcher and parsed target for a config
pub fn harness(config: &ScanConfig) -> (Fetcher, Target) {
    let fetch = Fetcher::from_config(config).expect("Failed to create fetcher");
    let target = Target::parse(&config.target).expect("Invalid test target");
    (fetch, target)
}

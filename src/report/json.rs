//! JSON report export

use crate::error::Result;
use crate::models::ScanReport;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the report as pretty-printed JSON into `output_dir`,
/// creating the directory if needed. Returns the written path.
pub fn export(report: &ScanReport, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(super::report_filename(report));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;
    info!("JSON report saved to {}", path.display());
    Ok(path)
}

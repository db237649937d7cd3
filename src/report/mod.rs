//! Scan report export

pub mod json;

use crate::models::ScanReport;

/// Builds the report filename from the scan timestamp.
/// Colons and dots are replaced so the name is safe on every filesystem.
pub fn report_filename(report: &ScanReport) -> String {
    let stamp = report
        .timestamp
        .to_rfc3339()
        .replace([':', '.'], "-");
    format!("security-scan-{stamp}.json")
}

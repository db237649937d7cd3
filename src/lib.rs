//! Sentinel - single-target web application weakness scanner
//!
//! Runs a catalog of passive and active checks against one URL, from
//! response-header review through SQL injection and rate-limit probing,
//! and produces a JSON report with an optional AI-generated summary.

pub mod ai;
pub mod check;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod report;
pub mod tls_probe;

//! Output writers for analysis results.
//!
//! This module handles writing data in various formats:
//! - JSON reports (pretty printed)
//! - Folded stacks for flamegraph tools
//! - Text tables for the terminal

pub mod collapsed;
pub mod json;
pub mod report;
pub mod text;

// Re-export main functions
pub use collapsed::{write_collapsed, write_collapsed_to};
pub use json::{read_report, report_to_string, write_report};
pub use report::{report_rows, HotPath, ProfileReport, ReportRow, SelectionInfo};
pub use text::render_rows;

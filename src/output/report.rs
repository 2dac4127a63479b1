//! Serializable analysis report.
//!
//! Defines the JSON report written by `analyze --json` and read back by
//! `validate`. Trees are flattened into pre-order rows with their depth.

use crate::aggregator::{Tree, TreeKind};
use crate::utils::config::REPORT_SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level analysis report
///
/// **Public** - this is the main output format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileReport {
    /// Report schema version
    pub version: String,

    /// Capture file the report was produced from
    pub capture_file: String,

    /// Wire format version of that capture
    pub format_version: u32,

    /// Samples in the full capture
    pub total_samples: u64,

    /// Present when the report describes a selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionInfo>,

    pub bottom_up: Vec<ReportRow>,

    pub top_down: Vec<ReportRow>,

    /// Heaviest complete stacks
    pub hot_paths: Vec<HotPath>,

    /// Timestamp when the report was generated (ISO 8601)
    pub generated_at: String,
}

/// Selection a report was restricted to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionInfo {
    pub description: String,
    pub sample_count: u64,
}

/// One flattened tree node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportRow {
    pub depth: usize,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<u64>,

    pub inclusive: u64,
    pub exclusive: u64,
    pub percentage: f64,
}

/// A complete stack and its weight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotPath {
    /// Folded stack, outermost frame first (e.g. "main;load;read")
    pub stack: String,

    /// Samples that ended on exactly this stack
    pub samples: u64,

    /// Percentage of the tree's samples
    pub percentage: f64,
}

impl ProfileReport {
    /// Assemble a report from a tree pair
    ///
    /// **Public** - used by the analyze command
    ///
    /// # Arguments
    /// * `capture_file` - Display name of the source capture
    /// * `format_version` - Capture wire format version
    /// * `total_samples` - Samples in the full capture
    /// * `bottom_up` / `top_down` - Trees to flatten
    /// * `max_depth` - Deepest row depth to include (`None` for all)
    pub fn new(
        capture_file: impl Into<String>,
        format_version: u32,
        total_samples: u64,
        bottom_up: &Tree,
        top_down: &Tree,
        max_depth: Option<usize>,
    ) -> Self {
        Self {
            version: REPORT_SCHEMA_VERSION.to_string(),
            capture_file: capture_file.into(),
            format_version,
            total_samples,
            selection: None,
            bottom_up: report_rows(bottom_up, max_depth),
            top_down: report_rows(top_down, max_depth),
            hot_paths: Vec::new(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_selection(mut self, description: impl Into<String>, sample_count: u64) -> Self {
        self.selection = Some(SelectionInfo {
            description: description.into(),
            sample_count,
        });
        self
    }

    pub fn with_hot_paths(mut self, hot_paths: Vec<HotPath>) -> Self {
        self.hot_paths = hot_paths;
        self
    }

    pub fn rows(&self, kind: TreeKind) -> &[ReportRow] {
        match kind {
            TreeKind::BottomUp => &self.bottom_up,
            TreeKind::TopDown => &self.top_down,
        }
    }
}

/// Flatten a tree into pre-order rows
pub fn report_rows(tree: &Tree, max_depth: Option<usize>) -> Vec<ReportRow> {
    tree.preorder()
        .filter(|&id| max_depth.map_or(true, |max| tree.node(id).depth <= max))
        .map(|id| {
            let node = tree.node(id);
            ReportRow {
                depth: node.depth,
                name: tree.display_name(id).into_owned(),
                module: tree.module_name(id).map(str::to_string),
                address: tree.address(id),
                inclusive: node.inclusive_count,
                exclusive: node.exclusive_count,
                percentage: tree.percentage(id),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{build_bottom_up, build_top_down, TopDownGrouping};
    use crate::capture::{CallstackSample, CaptureInfo, SampleSet};
    use std::sync::Arc;

    fn trees() -> (Tree, Tree) {
        let mut builder = CaptureInfo::builder();
        builder.add_thread(7, "worker").unwrap();
        builder.add_module("libc.so", 0x1000, 0x2000).unwrap();
        builder
            .add_callstack(1, [("read", 0, 0x1010), ("main", 0, 0x1000)])
            .unwrap();
        let info = Arc::new(builder.build());

        let samples: SampleSet = (0..4)
            .map(|i| CallstackSample {
                timestamp_ns: i,
                thread_id: 7,
                callstack_id: 1,
            })
            .collect();

        (
            build_bottom_up(&samples, &info),
            build_top_down(&samples, &info, TopDownGrouping::PerThread),
        )
    }

    #[test]
    fn test_report_rows_preorder() {
        let (_, top_down) = trees();
        let rows = report_rows(&top_down, None);

        let names: Vec<(usize, &str)> = rows.iter().map(|r| (r.depth, r.name.as_str())).collect();
        assert_eq!(names, vec![(0, "worker [7]"), (1, "main"), (2, "read")]);
        assert_eq!(rows[0].module, None);
        assert_eq!(rows[2].module.as_deref(), Some("libc.so"));
        assert_eq!(rows[2].address, Some(0x1010));
        assert_eq!(rows[2].exclusive, 4);
        assert_eq!(rows[2].percentage, 100.0);
    }

    #[test]
    fn test_report_rows_depth_limit() {
        let (_, top_down) = trees();
        assert_eq!(report_rows(&top_down, Some(0)).len(), 1);
        assert_eq!(report_rows(&top_down, Some(1)).len(), 2);
    }

    #[test]
    fn test_report_builder() {
        let (bottom_up, top_down) = trees();
        let report = ProfileReport::new("run.capture", 1, 4, &bottom_up, &top_down, None)
            .with_selection("thread 7", 4);

        assert_eq!(report.version, REPORT_SCHEMA_VERSION);
        assert_eq!(report.rows(TreeKind::BottomUp)[0].name, "read");
        assert_eq!(report.selection.as_ref().map(|s| s.sample_count), Some(4));
        assert!(chrono::DateTime::parse_from_rfc3339(&report.generated_at).is_ok());
    }
}

use crate::aggregator::TreeKind;
use crate::utils::config::DEFAULT_PRINT_ROWS;
use std::path::PathBuf;

/// Tree printed by `analyze`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ViewKind {
    /// Executing frames first, expanding toward callers
    #[default]
    BottomUp,
    /// Threads or entry frames first, expanding toward callees
    TopDown,
}

impl ViewKind {
    pub fn label(self) -> &'static str {
        TreeKind::from(self).label()
    }
}

impl From<ViewKind> for TreeKind {
    fn from(view: ViewKind) -> Self {
        match view {
            ViewKind::BottomUp => TreeKind::BottomUp,
            ViewKind::TopDown => TreeKind::TopDown,
        }
    }
}

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
///
/// Optional fields left as `None` (and flags left `false`) fall back to
/// the view configuration file, then to built-in defaults.
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Capture file to decode
    pub capture_file: PathBuf,

    /// Tree to print
    pub view: ViewKind,

    /// One top-down root for all threads
    pub merge_threads: bool,

    /// Keep only samples from these threads
    pub threads: Vec<u32>,

    /// Inclusive lower timestamp bound
    pub start_ns: Option<i64>,

    /// Inclusive upper timestamp bound
    pub end_ns: Option<i64>,

    /// Show only rows matching this text and their ancestors
    pub search: Option<String>,

    /// Case-insensitive search
    pub ignore_case: bool,

    /// Expand every node shallower than this depth
    pub depth: Option<usize>,

    /// Expand every node
    pub expand_all: bool,

    /// Maximum rows to print
    pub rows: usize,

    /// Output path for the JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Output path for folded stacks (optional)
    pub output_collapsed: Option<PathBuf>,

    /// Number of hot paths in the report
    pub top_paths: Option<usize>,

    /// TOML view configuration
    pub config: Option<PathBuf>,

    /// Print a text summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            capture_file: PathBuf::new(),
            view: ViewKind::default(),
            merge_threads: false,
            threads: Vec::new(),
            start_ns: None,
            end_ns: None,
            search: None,
            ignore_case: false,
            depth: None,
            expand_all: false,
            rows: DEFAULT_PRINT_ROWS,
            output_json: None,
            output_collapsed: None,
            top_paths: None,
            config: None,
            print_summary: false,
        }
    }
}

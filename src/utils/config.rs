//! Configuration and constants for decoding, aggregation and the CLI.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Capture format version written by `CaptureWriter`
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Capture format versions the decoder understands
pub const SUPPORTED_FORMAT_VERSIONS: &[u32] = &[1];

/// Size of the little-endian length prefix in front of every frame
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Minimum payload size of the header frame (the format version)
pub const HEADER_MIN_BYTES: usize = 4;

// Event kind tags (first payload byte of every event frame)
pub const EVENT_KIND_CALLSTACK_SAMPLE: u8 = 1;
pub const EVENT_KIND_TIMER_SLICE: u8 = 2;

/// Current JSON report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Default number of rows printed by `analyze`
pub const DEFAULT_PRINT_ROWS: usize = 50;

/// Default number of hot paths written to the JSON report
pub const DEFAULT_TOP_PATHS: usize = 20;

/// Default number of samples per shard for sharded builds
pub const DEFAULT_SHARD_SIZE: usize = 16_384;

/// View configuration loaded from TOML
///
/// Every table is optional; missing values fall back to defaults.
///
/// ```toml
/// [search]
/// case_sensitive = false
///
/// [report]
/// top_paths = 10
/// max_depth = 32
///
/// [aggregation]
/// shard_size = 8192
/// merge_threads = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub aggregation: AggregationConfig,
}

/// Search behaviour
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Match display names case-sensitively
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            case_sensitive: default_case_sensitive(),
        }
    }
}

/// JSON report limits
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Number of hot paths in the report
    #[serde(default = "default_top_paths")]
    pub top_paths: usize,

    /// Deepest row written per tree (None = unlimited)
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_paths: default_top_paths(),
            max_depth: None,
        }
    }
}

/// Tree build settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AggregationConfig {
    /// Samples per shard when building in parallel
    #[serde(default = "default_shard_size")]
    pub shard_size: usize,

    /// Merge all threads under shared top-down roots instead of one root per thread
    #[serde(default)]
    pub merge_threads: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            shard_size: default_shard_size(),
            merge_threads: false,
        }
    }
}

fn default_case_sensitive() -> bool {
    true
}

fn default_top_paths() -> usize {
    DEFAULT_TOP_PATHS
}

fn default_shard_size() -> usize {
    DEFAULT_SHARD_SIZE
}

/// Load a view configuration from a TOML file
///
/// # Errors
/// * `ConfigError::Io` - If the file cannot be read
/// * `ConfigError::Parse` - If the TOML is invalid
/// * `ConfigError::Invalid` - If a value is out of range
pub fn load_view_config(path: impl AsRef<Path>) -> Result<ViewConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_view_config(&contents)
}

/// Parse a view configuration from a TOML string
pub fn parse_view_config(contents: &str) -> Result<ViewConfig, ConfigError> {
    let config: ViewConfig = toml::from_str(contents)?;

    if config.aggregation.shard_size == 0 {
        return Err(ConfigError::Invalid(
            "aggregation.shard_size must be greater than 0".to_string(),
        ));
    }

    Ok(config)
}

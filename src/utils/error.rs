//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that abort loading a capture
///
/// Every variant is fatal: no partially decoded capture is ever returned.
/// Offsets are byte offsets into the input buffer, frame indices are 0-based
/// (frame 0 is the header, frame 1 the capture info).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Truncated header: {available} bytes available, at least {required} required")]
    TruncatedHeader { available: usize, required: usize },

    #[error("Unsupported capture format version {version} (supported: {supported:?})")]
    UnsupportedVersion {
        version: u32,
        supported: &'static [u32],
    },

    #[error(
        "Truncated stream at frame {frame_index} (offset {offset}): \
         declared {declared} bytes, {remaining} remaining"
    )]
    TruncatedStream {
        frame_index: usize,
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    #[error("Malformed capture info at offset {offset}: {reason}")]
    MalformedCaptureInfo { offset: usize, reason: String },

    #[error("Malformed event in frame {frame_index} (offset {offset}): {reason}")]
    MalformedEvent {
        frame_index: usize,
        offset: usize,
        reason: String,
    },

    #[error(
        "Callstack sample in frame {frame_index} (offset {offset}) references \
         unknown callstack {callstack_id}"
    )]
    DanglingCallstackReference {
        frame_index: usize,
        offset: usize,
        callstack_id: u64,
    },
}

/// Structural problems found while assembling the capture dictionaries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureInfoError {
    #[error("Duplicate thread id {0}")]
    DuplicateThread(u32),

    #[error("Module '{name}' has inverted address range {start:#x}..{end:#x}")]
    InvertedModuleRange { name: String, start: u64, end: u64 },

    #[error("Duplicate callstack id {0}")]
    DuplicateCallstack(u64),

    #[error("Callstack {0} has no frames")]
    EmptyCallstack(u64),

    #[error(
        "Callstack {callstack_id} frame {frame_index} references module {module_index} \
         but only {module_count} modules exist"
    )]
    ModuleOutOfRange {
        callstack_id: u64,
        frame_index: usize,
        module_index: u32,
        module_count: usize,
    },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Failed to encode capture record: {0}")]
    EncodeFailed(#[from] bincode::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading a view configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

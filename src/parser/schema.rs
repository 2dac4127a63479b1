//! Wire schema of the capture file.
//!
//! These are the records as they appear inside frames. The decoder turns
//! them into the interned `capture` model; the writer produces them.

use bincode::Options;
use serde::{Deserialize, Serialize};

/// Capture dictionaries as serialized in frame 2
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCaptureInfo {
    pub threads: Vec<WireThread>,
    pub modules: Vec<WireModule>,
    pub callstacks: Vec<WireCallstack>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireThread {
    pub thread_id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireModule {
    pub name: String,
    pub start_address: u64,
    pub end_address: u64,
}

/// A callstack dictionary entry, innermost frame first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireCallstack {
    pub callstack_id: u64,
    pub frames: Vec<WireFrame>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFrame {
    pub function_name: String,
    /// Index into `WireCaptureInfo::modules`
    pub module_index: u32,
    pub address: u64,
}

/// Encoding used for every record body
///
/// Fixed-width little-endian integers with `u64` length prefixes; trailing
/// bytes inside a frame are an error.
pub fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_layout() {
        let frame = WireFrame {
            function_name: "f".to_string(),
            module_index: 2,
            address: 0x10,
        };
        let bytes = wire_options().serialize(&frame).unwrap();

        // u64 string length + 1 byte + u32 + u64
        assert_eq!(bytes.len(), 8 + 1 + 4 + 8);
        assert_eq!(&bytes[..8], &1u64.to_le_bytes());
        assert_eq!(bytes[8], b'f');
        assert_eq!(&bytes[9..13], &2u32.to_le_bytes());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = wire_options().serialize(&WireCaptureInfo::default()).unwrap();
        bytes.push(0);

        let result: Result<WireCaptureInfo, _> = wire_options().deserialize(&bytes);
        assert!(result.is_err());
    }
}

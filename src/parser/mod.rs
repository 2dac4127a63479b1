//! Capture file decoding and encoding.
//!
//! This module handles:
//! - Splitting the byte stream into length-prefixed frames
//! - Validating the header and format version
//! - Decoding the capture dictionaries and events
//! - Writing captures in the same format

pub mod decoder;
pub mod frame;
pub mod schema;
pub mod writer;

// Re-export main types
pub use decoder::decode;
pub use frame::{FrameReader, RawFrame};
pub use schema::{WireCallstack, WireCaptureInfo, WireFrame, WireModule, WireThread};
pub use writer::CaptureWriter;

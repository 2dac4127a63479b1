//! Capture encoder.
//!
//! Produces byte streams in the format `decode` reads. Used to build
//! fixtures and synthetic captures.

use super::frame::write_frame;
use super::schema::{wire_options, WireCaptureInfo};
use crate::capture::{CallstackSample, TimerSlice};
use crate::utils::config::{EVENT_KIND_CALLSTACK_SAMPLE, EVENT_KIND_TIMER_SLICE};
use crate::utils::error::OutputError;
use bincode::Options;
use serde::Serialize;

/// Incremental capture writer
///
/// # Example
/// ```ignore
/// let mut writer = CaptureWriter::new(CURRENT_FORMAT_VERSION);
/// writer.write_info(&info)?;
/// writer.write_sample(&sample)?;
/// let bytes = writer.finish();
/// ```
#[derive(Debug, Clone)]
pub struct CaptureWriter {
    buf: Vec<u8>,
}

impl CaptureWriter {
    /// Start a capture with its header frame
    pub fn new(format_version: u32) -> Self {
        let mut buf = Vec::new();
        write_frame(&mut buf, &format_version.to_le_bytes());
        Self { buf }
    }

    /// Write the capture info frame (must directly follow the header)
    pub fn write_info(&mut self, info: &WireCaptureInfo) -> Result<(), OutputError> {
        let payload = wire_options().serialize(info)?;
        write_frame(&mut self.buf, &payload);
        Ok(())
    }

    pub fn write_sample(&mut self, sample: &CallstackSample) -> Result<(), OutputError> {
        self.write_event(EVENT_KIND_CALLSTACK_SAMPLE, sample)
    }

    pub fn write_timer(&mut self, slice: &TimerSlice) -> Result<(), OutputError> {
        self.write_event(EVENT_KIND_TIMER_SLICE, slice)
    }

    /// Write an event frame with an arbitrary kind and pre-encoded body
    pub fn write_raw_event(&mut self, kind: u8, body: &[u8]) {
        let mut payload = Vec::with_capacity(body.len() + 1);
        payload.push(kind);
        payload.extend_from_slice(body);
        write_frame(&mut self.buf, &payload);
    }

    /// Write a frame verbatim
    pub fn write_raw_frame(&mut self, payload: &[u8]) {
        write_frame(&mut self.buf, payload);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    fn write_event<T: Serialize>(&mut self, kind: u8, body: &T) -> Result<(), OutputError> {
        let body = wire_options().serialize(body)?;
        self.write_raw_event(kind, &body);
        Ok(())
    }
}

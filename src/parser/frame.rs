//! Length-prefixed frame splitting.
//!
//! Every record in a capture is `[u32 little-endian length][payload]`.
//! `FrameReader` walks a fully resident buffer and hands out borrowed
//! payload slices; it never reads past the end of the input.

use crate::utils::config::LENGTH_PREFIX_BYTES;

/// One frame borrowed from the input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame<'a> {
    /// 0-based position of the frame in the stream
    pub index: usize,
    /// Byte offset of the frame's length prefix
    pub offset: usize,
    pub payload: &'a [u8],
}

impl RawFrame<'_> {
    /// Byte offset of the first payload byte
    pub fn payload_offset(&self) -> usize {
        self.offset + LENGTH_PREFIX_BYTES
    }
}

/// Framing failure, translated into a `DecodeError` by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer than four bytes left for the length prefix
    IncompletePrefix {
        index: usize,
        offset: usize,
        remaining: usize,
    },
    /// Declared payload length runs past the end of the input
    PayloadOverrun {
        index: usize,
        offset: usize,
        declared: usize,
        remaining: usize,
    },
}

/// Iterator over the frames of a capture buffer
///
/// Yields `None` at a clean end of input. After the first error the reader
/// is fused and yields `None`.
#[derive(Debug, Clone)]
pub struct FrameReader<'a> {
    buf: &'a [u8],
    offset: usize,
    index: usize,
    failed: bool,
}

impl<'a> FrameReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            index: 0,
            failed: false,
        }
    }

    /// Byte offset of the next frame
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Index the next frame will carry
    pub fn next_index(&self) -> usize {
        self.index
    }

    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.buf.len()
    }

    fn read_frame(&mut self) -> Result<RawFrame<'a>, FrameError> {
        let remaining = self.buf.len() - self.offset;
        if remaining < LENGTH_PREFIX_BYTES {
            return Err(FrameError::IncompletePrefix {
                index: self.index,
                offset: self.offset,
                remaining,
            });
        }

        let mut prefix = [0u8; LENGTH_PREFIX_BYTES];
        prefix.copy_from_slice(&self.buf[self.offset..self.offset + LENGTH_PREFIX_BYTES]);
        let declared = u32::from_le_bytes(prefix) as usize;

        let after_prefix = remaining - LENGTH_PREFIX_BYTES;
        if declared > after_prefix {
            return Err(FrameError::PayloadOverrun {
                index: self.index,
                offset: self.offset,
                declared,
                remaining: after_prefix,
            });
        }

        let start = self.offset + LENGTH_PREFIX_BYTES;
        let frame = RawFrame {
            index: self.index,
            offset: self.offset,
            payload: &self.buf[start..start + declared],
        };

        self.offset = start + declared;
        self.index += 1;
        Ok(frame)
    }
}

impl<'a> Iterator for FrameReader<'a> {
    type Item = Result<RawFrame<'a>, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.is_exhausted() {
            return None;
        }

        let result = self.read_frame();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Append one length-prefixed frame to `out`
pub fn write_frame(out: &mut Vec<u8>, payload: &[u8]) {
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
}

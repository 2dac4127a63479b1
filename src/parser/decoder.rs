//! Capture decoder.
//!
//! Turns a fully resident capture buffer into a `CaptureModel`:
//! 1. Frame 0 - header with the format version
//! 2. Frame 1 - capture info (threads, modules, callstack dictionary)
//! 3. Frames 2.. - events in recording order
//!
//! Any failure aborts the whole decode; a partial model is never returned.

use super::frame::{FrameError, FrameReader, RawFrame};
use super::schema::{wire_options, WireCaptureInfo};
use crate::capture::{
    CallstackSample, CaptureHeader, CaptureInfo, CaptureModel, Event, TimerSlice,
};
use crate::utils::config::{
    EVENT_KIND_CALLSTACK_SAMPLE, EVENT_KIND_TIMER_SLICE, HEADER_MIN_BYTES, LENGTH_PREFIX_BYTES,
    SUPPORTED_FORMAT_VERSIONS,
};
use crate::utils::error::DecodeError;
use bincode::Options;
use log::debug;

/// Decode a capture buffer
///
/// **Public** - main entry point for loading captures
///
/// # Arguments
/// * `bytes` - The complete capture file contents
///
/// # Returns
/// The immutable capture model
///
/// # Errors
/// * `DecodeError::TruncatedHeader` - Missing or short header frame
/// * `DecodeError::UnsupportedVersion` - Unknown format version
/// * `DecodeError::MalformedCaptureInfo` - Missing or invalid dictionaries
/// * `DecodeError::TruncatedStream` - A frame runs past the end of input
/// * `DecodeError::MalformedEvent` - A known event kind failed to decode
/// * `DecodeError::DanglingCallstackReference` - A sample names an unknown callstack
pub fn decode(bytes: &[u8]) -> Result<CaptureModel, DecodeError> {
    debug!("Decoding capture of {} bytes", bytes.len());

    let mut frames = FrameReader::new(bytes);

    let header = decode_header(frames.next(), bytes.len())?;
    debug!("Capture format version {}", header.format_version);

    let info_offset = frames.offset();
    let info = match frames.next() {
        Some(frame) => decode_capture_info(&frame.map_err(stream_error)?)?,
        None => {
            return Err(DecodeError::MalformedCaptureInfo {
                offset: info_offset,
                reason: "stream ended before the capture info frame".to_string(),
            })
        }
    };
    debug!(
        "Capture info: {} threads, {} modules, {} callstacks",
        info.threads().len(),
        info.modules().len(),
        info.callstack_count()
    );

    let mut events = Vec::new();
    for frame in frames {
        let frame = frame.map_err(stream_error)?;
        let event = decode_event(&frame)?;

        if let Event::CallstackSample(sample) = &event {
            if info.callstack(sample.callstack_id).is_none() {
                return Err(DecodeError::DanglingCallstackReference {
                    frame_index: frame.index,
                    offset: frame.offset,
                    callstack_id: sample.callstack_id,
                });
            }
        }

        events.push(event);
    }

    let model = CaptureModel::new(header, info, events);
    debug!(
        "Decoded {} events ({} callstack samples)",
        model.events().len(),
        model.samples().len()
    );

    Ok(model)
}

/// Decode the header frame
///
/// **Private** - internal helper for decode
fn decode_header(
    frame: Option<Result<RawFrame<'_>, FrameError>>,
    input_len: usize,
) -> Result<CaptureHeader, DecodeError> {
    let required = LENGTH_PREFIX_BYTES + HEADER_MIN_BYTES;

    let frame = match frame {
        None => {
            return Err(DecodeError::TruncatedHeader {
                available: input_len,
                required,
            })
        }
        Some(Err(FrameError::IncompletePrefix { remaining, .. })) => {
            return Err(DecodeError::TruncatedHeader {
                available: remaining,
                required,
            })
        }
        Some(Err(FrameError::PayloadOverrun {
            declared,
            remaining,
            ..
        })) => {
            return Err(DecodeError::TruncatedHeader {
                available: LENGTH_PREFIX_BYTES + remaining,
                required: LENGTH_PREFIX_BYTES + declared,
            })
        }
        Some(Ok(frame)) => frame,
    };

    if frame.payload.len() < HEADER_MIN_BYTES {
        return Err(DecodeError::TruncatedHeader {
            available: LENGTH_PREFIX_BYTES + frame.payload.len(),
            required,
        });
    }

    // Bytes after the version are reserved for future header fields
    let mut version = [0u8; 4];
    version.copy_from_slice(&frame.payload[..4]);
    let format_version = u32::from_le_bytes(version);

    if !SUPPORTED_FORMAT_VERSIONS.contains(&format_version) {
        return Err(DecodeError::UnsupportedVersion {
            version: format_version,
            supported: SUPPORTED_FORMAT_VERSIONS,
        });
    }

    Ok(CaptureHeader { format_version })
}

/// Decode and validate the capture info frame
///
/// **Private** - internal helper for decode
fn decode_capture_info(frame: &RawFrame<'_>) -> Result<CaptureInfo, DecodeError> {
    let malformed = |reason: String| DecodeError::MalformedCaptureInfo {
        offset: frame.offset,
        reason,
    };

    let wire: WireCaptureInfo = wire_options()
        .deserialize(frame.payload)
        .map_err(|e| malformed(e.to_string()))?;

    let mut builder = CaptureInfo::builder();

    for thread in wire.threads {
        builder
            .add_thread(thread.thread_id, thread.name)
            .map_err(|e| malformed(e.to_string()))?;
    }

    for module in &wire.modules {
        builder
            .add_module(&module.name, module.start_address, module.end_address)
            .map_err(|e| malformed(e.to_string()))?;
    }

    for callstack in &wire.callstacks {
        let frames = callstack
            .frames
            .iter()
            .map(|f| (f.function_name.as_str(), f.module_index, f.address));
        builder
            .add_callstack(callstack.callstack_id, frames)
            .map_err(|e| malformed(e.to_string()))?;
    }

    Ok(builder.build())
}

/// Decode one event frame
///
/// **Private** - internal helper for decode
fn decode_event(frame: &RawFrame<'_>) -> Result<Event, DecodeError> {
    let malformed = |reason: String| DecodeError::MalformedEvent {
        frame_index: frame.index,
        offset: frame.offset,
        reason,
    };

    let (&kind, body) = frame
        .payload
        .split_first()
        .ok_or_else(|| malformed("empty event frame".to_string()))?;

    match kind {
        EVENT_KIND_CALLSTACK_SAMPLE => wire_options()
            .deserialize::<CallstackSample>(body)
            .map(Event::CallstackSample)
            .map_err(|e| malformed(format!("callstack sample: {}", e))),
        EVENT_KIND_TIMER_SLICE => wire_options()
            .deserialize::<TimerSlice>(body)
            .map(Event::TimerSlice)
            .map_err(|e| malformed(format!("timer slice: {}", e))),
        _ => Ok(Event::Unknown {
            kind,
            payload: body.to_vec(),
        }),
    }
}

/// Map a framing failure after the header to `TruncatedStream`
///
/// **Private** - internal helper for decode
fn stream_error(err: FrameError) -> DecodeError {
    match err {
        FrameError::IncompletePrefix {
            index,
            offset,
            remaining,
        } => DecodeError::TruncatedStream {
            frame_index: index,
            offset,
            declared: LENGTH_PREFIX_BYTES,
            remaining,
        },
        FrameError::PayloadOverrun {
            index,
            offset,
            declared,
            remaining,
        } => DecodeError::TruncatedStream {
            frame_index: index,
            offset,
            declared,
            remaining,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::frame::write_frame;

    #[test]
    fn test_empty_input_is_truncated_header() {
        assert!(matches!(
            decode(&[]),
            Err(DecodeError::TruncatedHeader {
                available: 0,
                required: 8,
            })
        ));
    }

    #[test]
    fn test_short_header_payload() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &[1, 0]);

        assert!(matches!(
            decode(&buf),
            Err(DecodeError::TruncatedHeader { available: 6, .. })
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &42u32.to_le_bytes());

        assert!(matches!(
            decode(&buf),
            Err(DecodeError::UnsupportedVersion { version: 42, .. })
        ));
    }

    #[test]
    fn test_missing_capture_info() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &1u32.to_le_bytes());

        assert!(matches!(
            decode(&buf),
            Err(DecodeError::MalformedCaptureInfo { offset: 8, .. })
        ));
    }

    #[test]
    fn test_empty_event_frame() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &1u32.to_le_bytes());
        write_frame(
            &mut buf,
            &wire_options().serialize(&WireCaptureInfo::default()).unwrap(),
        );
        write_frame(&mut buf, &[]);

        assert!(matches!(
            decode(&buf),
            Err(DecodeError::MalformedEvent { frame_index: 2, .. })
        ));
    }
}

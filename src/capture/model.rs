//! In-memory capture model.
//!
//! Built once by the decoder and immutable afterwards. The static
//! dictionaries live in `CaptureInfo`, which is shared behind an `Arc` with
//! every tree built from this capture.

use super::interner::{StrId, StringTable};
use super::sample_set::SampleSet;
use crate::utils::error::CaptureInfoError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::sync::Arc;

pub type ThreadId = u32;
pub type CallstackId = u64;

/// Leading record of every capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureHeader {
    pub format_version: u32,
}

/// Index into `CaptureInfo::modules`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleRef(pub u32);

/// A loaded module (executable or shared library)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: StrId,
    pub address_range: Range<u64>,
}

/// One resolved frame, and the identity of a tree node
///
/// Two frames are the same iff name, module and address all match. The
/// address keeps same-named static functions in different places apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameIdentity {
    pub name: StrId,
    pub module: ModuleRef,
    pub address: u64,
}

/// Ordered frames of one callstack, innermost (executing) frame first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callstack {
    frames: Vec<FrameIdentity>,
}

impl Callstack {
    pub fn frames(&self) -> &[FrameIdentity] {
        &self.frames
    }

    /// The executing frame
    pub fn innermost(&self) -> &FrameIdentity {
        // Non-empty by construction (see CaptureInfoBuilder::add_callstack)
        &self.frames[0]
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

/// Static dictionaries of a capture
#[derive(Debug, Clone, Default)]
pub struct CaptureInfo {
    threads: BTreeMap<ThreadId, String>,
    modules: Vec<ModuleInfo>,
    callstacks: HashMap<CallstackId, Callstack>,
    strings: StringTable,
}

impl CaptureInfo {
    pub fn builder() -> CaptureInfoBuilder {
        CaptureInfoBuilder::default()
    }

    pub fn threads(&self) -> &BTreeMap<ThreadId, String> {
        &self.threads
    }

    pub fn thread_name(&self, thread_id: ThreadId) -> Option<&str> {
        self.threads.get(&thread_id).map(String::as_str)
    }

    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    pub fn module(&self, module: ModuleRef) -> Option<&ModuleInfo> {
        self.modules.get(module.0 as usize)
    }

    pub fn module_name(&self, module: ModuleRef) -> &str {
        self.module(module)
            .map(|m| self.strings.resolve(m.name))
            .unwrap_or("")
    }

    pub fn callstack(&self, id: CallstackId) -> Option<&Callstack> {
        self.callstacks.get(&id)
    }

    pub fn callstack_count(&self) -> usize {
        self.callstacks.len()
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn frame_name(&self, frame: &FrameIdentity) -> &str {
        self.strings.resolve(frame.name)
    }
}

/// Validating builder for `CaptureInfo`
///
/// Every structural check happens as entries are added, so a bad module
/// index is reported at the frame that uses it.
#[derive(Debug, Default)]
pub struct CaptureInfoBuilder {
    info: CaptureInfo,
}

impl CaptureInfoBuilder {
    pub fn add_thread(
        &mut self,
        thread_id: ThreadId,
        name: impl Into<String>,
    ) -> Result<(), CaptureInfoError> {
        if self.info.threads.contains_key(&thread_id) {
            return Err(CaptureInfoError::DuplicateThread(thread_id));
        }
        self.info.threads.insert(thread_id, name.into());
        Ok(())
    }

    pub fn add_module(
        &mut self,
        name: &str,
        start: u64,
        end: u64,
    ) -> Result<ModuleRef, CaptureInfoError> {
        if start > end {
            return Err(CaptureInfoError::InvertedModuleRange {
                name: name.to_string(),
                start,
                end,
            });
        }

        let module = ModuleRef(self.info.modules.len() as u32);
        let name = self.info.strings.intern(name);
        self.info.modules.push(ModuleInfo {
            name,
            address_range: start..end,
        });
        Ok(module)
    }

    /// Add a callstack given as `(function name, module index, address)`,
    /// innermost frame first
    pub fn add_callstack<'a>(
        &mut self,
        callstack_id: CallstackId,
        frames: impl IntoIterator<Item = (&'a str, u32, u64)>,
    ) -> Result<(), CaptureInfoError> {
        if self.info.callstacks.contains_key(&callstack_id) {
            return Err(CaptureInfoError::DuplicateCallstack(callstack_id));
        }

        let module_count = self.info.modules.len();
        let mut resolved = Vec::new();
        for (frame_index, (name, module_index, address)) in frames.into_iter().enumerate() {
            if module_index as usize >= module_count {
                return Err(CaptureInfoError::ModuleOutOfRange {
                    callstack_id,
                    frame_index,
                    module_index,
                    module_count,
                });
            }
            resolved.push(FrameIdentity {
                name: self.info.strings.intern(name),
                module: ModuleRef(module_index),
                address,
            });
        }

        if resolved.is_empty() {
            return Err(CaptureInfoError::EmptyCallstack(callstack_id));
        }

        self.info
            .callstacks
            .insert(callstack_id, Callstack { frames: resolved });
        Ok(())
    }

    pub fn build(self) -> CaptureInfo {
        self.info
    }
}

/// One observation of a thread's callstack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallstackSample {
    pub timestamp_ns: i64,
    pub thread_id: ThreadId,
    pub callstack_id: CallstackId,
}

/// A timed region recorded on a thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSlice {
    pub start_ns: i64,
    pub end_ns: i64,
    pub thread_id: ThreadId,
    pub kind: u32,
    pub label: String,
}

/// A capture event in recording order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CallstackSample(CallstackSample),
    TimerSlice(TimerSlice),
    /// An event kind this crate does not interpret, kept verbatim
    Unknown { kind: u8, payload: Vec<u8> },
}

/// A fully decoded capture
#[derive(Debug, Clone)]
pub struct CaptureModel {
    header: CaptureHeader,
    info: Arc<CaptureInfo>,
    events: Vec<Event>,
    samples: SampleSet,
}

impl CaptureModel {
    pub fn new(header: CaptureHeader, info: CaptureInfo, events: Vec<Event>) -> Self {
        let samples = events
            .iter()
            .filter_map(|event| match event {
                Event::CallstackSample(sample) => Some(*sample),
                _ => None,
            })
            .collect();

        Self {
            header,
            info: Arc::new(info),
            events,
            samples,
        }
    }

    pub fn header(&self) -> CaptureHeader {
        self.header
    }

    /// Shared dictionaries, cheap to clone into trees
    pub fn info(&self) -> &Arc<CaptureInfo> {
        &self.info
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Every callstack sample in the capture, in recording order
    pub fn samples(&self) -> &SampleSet {
        &self.samples
    }

    pub fn timer_slices(&self) -> impl Iterator<Item = &TimerSlice> {
        self.events.iter().filter_map(|event| match event {
            Event::TimerSlice(slice) => Some(slice),
            _ => None,
        })
    }

    pub fn unknown_event_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::Unknown { .. }))
            .count()
    }

    /// First and last sample timestamp
    pub fn time_range(&self) -> Option<(i64, i64)> {
        let first = self.samples.iter().map(|s| s.timestamp_ns).min()?;
        let last = self.samples.iter().map(|s| s.timestamp_ns).max()?;
        Some((first, last))
    }
}

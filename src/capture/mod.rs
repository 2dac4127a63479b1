//! Decoded capture representation.
//!
//! This module holds:
//! - Static dictionaries (threads, modules, callstacks) with interned names
//! - The ordered event list
//! - Immutable sample sets derived from it

pub mod interner;
pub mod model;
pub mod sample_set;

// Re-export main types
pub use interner::{StrId, StringTable};
pub use model::{
    CallstackId, CallstackSample, Callstack, CaptureHeader, CaptureInfo, CaptureInfoBuilder,
    CaptureModel, Event, FrameIdentity, ModuleInfo, ModuleRef, ThreadId, TimerSlice,
};
pub use sample_set::SampleSet;

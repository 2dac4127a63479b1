//! Shared fixtures for integration tests.
#![allow(dead_code)]

use callscope::capture::{CallstackSample, CaptureModel, TimerSlice};
use callscope::parser::{
    decode, CaptureWriter, WireCallstack, WireCaptureInfo, WireFrame, WireModule, WireThread,
};
use callscope::utils::config::CURRENT_FORMAT_VERSION;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Builder for synthetic captures
#[derive(Debug, Clone, Default)]
pub struct CaptureFixture {
    info: WireCaptureInfo,
    samples: Vec<CallstackSample>,
    timers: Vec<TimerSlice>,
    addresses: BTreeMap<String, u64>,
}

impl CaptureFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thread(mut self, thread_id: u32, name: &str) -> Self {
        self.info.threads.push(WireThread {
            thread_id,
            name: name.to_string(),
        });
        self
    }

    pub fn module(mut self, name: &str, start_address: u64, end_address: u64) -> Self {
        self.info.modules.push(WireModule {
            name: name.to_string(),
            start_address,
            end_address,
        });
        self
    }

    /// Frames innermost first, all in module 0
    ///
    /// Each function name gets one stable address, so equal names are the
    /// same frame across callstacks.
    pub fn callstack(mut self, callstack_id: u64, frames: &[&str]) -> Self {
        let frames: Vec<(&str, u32, u64)> = frames
            .iter()
            .map(|name| {
                let next = 0x1000 + self.addresses.len() as u64 * 0x10;
                let address = *self.addresses.entry(name.to_string()).or_insert(next);
                (*name, 0, address)
            })
            .collect();
        self.callstack_with(callstack_id, &frames)
    }

    pub fn callstack_with(mut self, callstack_id: u64, frames: &[(&str, u32, u64)]) -> Self {
        self.info.callstacks.push(WireCallstack {
            callstack_id,
            frames: frames
                .iter()
                .map(|&(function_name, module_index, address)| WireFrame {
                    function_name: function_name.to_string(),
                    module_index,
                    address,
                })
                .collect(),
        });
        self
    }

    pub fn sample(mut self, timestamp_ns: i64, thread_id: u32, callstack_id: u64) -> Self {
        self.samples.push(CallstackSample {
            timestamp_ns,
            thread_id,
            callstack_id,
        });
        self
    }

    /// `count` samples of one callstack, timestamps continuing after the last sample
    pub fn repeat(mut self, count: usize, thread_id: u32, callstack_id: u64) -> Self {
        let start = self.samples.last().map_or(0, |s| s.timestamp_ns + 1);
        for i in 0..count {
            self.samples.push(CallstackSample {
                timestamp_ns: start + i as i64,
                thread_id,
                callstack_id,
            });
        }
        self
    }

    pub fn timer(mut self, start_ns: i64, end_ns: i64, thread_id: u32, label: &str) -> Self {
        self.timers.push(TimerSlice {
            start_ns,
            end_ns,
            thread_id,
            kind: 0,
            label: label.to_string(),
        });
        self
    }

    pub fn writer(&self) -> CaptureWriter {
        let mut writer = CaptureWriter::new(CURRENT_FORMAT_VERSION);
        writer.write_info(&self.info).unwrap();
        for timer in &self.timers {
            writer.write_timer(timer).unwrap();
        }
        for sample in &self.samples {
            writer.write_sample(sample).unwrap();
        }
        writer
    }

    pub fn encode(&self) -> Vec<u8> {
        self.writer().finish()
    }

    pub fn model(&self) -> CaptureModel {
        decode(&self.encode()).unwrap()
    }

    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.encode()).unwrap();
        path
    }
}

/// 1000 samples, 976 of them executing in `clock_gettime`
pub fn clock_heavy_capture() -> CaptureFixture {
    CaptureFixture::new()
        .thread(1, "main")
        .thread(2, "render")
        .module("app", 0x1000, 0x9000)
        .callstack(1, &["clock_gettime", "now", "tick", "main"])
        .callstack(2, &["clock_gettime", "now", "render_frame"])
        .callstack(3, &["compute", "tick", "main"])
        .repeat(900, 1, 1)
        .repeat(76, 2, 2)
        .repeat(24, 1, 3)
}

/// 132 distinct executing frames; only `leaf_007` has callers, three levels deep
pub fn wide_capture() -> CaptureFixture {
    let mut fixture = CaptureFixture::new()
        .thread(1, "main")
        .module("app", 0x1000, 0x9000);

    for i in 0..132u64 {
        let leaf = format!("leaf_{:03}", i);
        fixture = if i == 7 {
            fixture.callstack(i, &[leaf.as_str(), "middle", "upper", "needle_entry"])
        } else {
            fixture.callstack(i, &[leaf.as_str()])
        };
        fixture = fixture.repeat(1 + (i as usize % 5), 1, i);
    }

    fixture
}

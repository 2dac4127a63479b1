//! Callscope
//!
//! Decoding and analysis of callstack sampling captures.
//!
//! A capture is decoded into a `CaptureModel`, its samples are aggregated
//! into bottom-up and top-down call trees, and those trees are navigated
//! (expanded, collapsed, searched) and exported.
//!
//! ## Getting Started
//!
//! ```bash
//! callscope inspect session.capture
//! callscope analyze session.capture --view top-down --depth 3
//! ```

pub mod aggregator;
pub mod capture;
pub mod commands;
pub mod navigation;
pub mod output;
pub mod parser;
pub mod selection;
pub mod utils;

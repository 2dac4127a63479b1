//! Sample selections and the trees built from them.
//!
//! A selection (time range, threads, timestamps, or any predicate) produces
//! a new sample set and its own pair of trees, next to the full-capture pair.

pub mod filter;
pub mod views;

pub use filter::{filter, filter_samples, filter_with, SamplePredicate};
pub use views::{CallstackViews, Selection, SelectionStatus};

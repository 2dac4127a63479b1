//! Tree navigation: expansion state, search and visible rows.
//!
//! This module handles:
//! - Per-node expansion state keyed by path
//! - Case-sensitive or case-insensitive name search
//! - Projection of a tree and its state into display rows

pub mod rows;
pub mod search;
pub mod state;

// Re-export main types
pub use rows::{visible_rows, RowView};
pub use search::{search, SearchQuery, SearchResult};
pub use state::{NavState, ViewState};

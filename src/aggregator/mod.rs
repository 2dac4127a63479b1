//! Aggregation of callstack samples into call trees and metrics.
//!
//! This module transforms sample sets into:
//! - Bottom-up (callers) trees rooted at executing frames
//! - Top-down (callees) trees rooted at threads or entry frames
//! - Folded stacks, hot paths and distribution statistics

pub mod builder;
pub mod metrics;
pub mod tree;

// Re-export main types and functions
pub use builder::{
    build_bottom_up, build_bottom_up_sharded, build_top_down, build_top_down_sharded,
    build_tree_pair, BuildOptions, TopDownGrouping, TreePair,
};
pub use metrics::{
    calculate_hot_paths, calculate_sample_distribution, collapsed_stacks, CollapsedStack,
    SampleDistribution,
};
pub use tree::{format_percentage, NodeId, NodeKey, NodePath, Tree, TreeKind, TreeNode};

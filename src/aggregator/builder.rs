//! Build bottom-up and top-down trees from a sample set.
//!
//! Both builds are a single pass over the samples with O(depth) work per
//! sample. Each sample is a walk through the tree:
//! - bottom-up walks its frames innermost to outermost
//! - top-down walks them outermost to innermost, optionally under a thread root
//!
//! Nodes are only merged when they share the same parent, so the node count
//! is bounded by the distinct paths actually observed.

use super::tree::{NodeId, NodeKey, Tree, TreeKind, TreeNode};
use crate::capture::{CallstackSample, CaptureInfo, SampleSet};
use crate::utils::config::DEFAULT_SHARD_SIZE;
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// How top-down roots are formed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopDownGrouping {
    /// One synthetic root per thread, entry frames below it
    #[default]
    PerThread,
    /// Entry frames of all threads share the same roots
    Merged,
}

/// Options for `build_tree_pair`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub grouping: TopDownGrouping,
    /// Samples per parallel shard
    pub shard_size: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            grouping: TopDownGrouping::default(),
            shard_size: DEFAULT_SHARD_SIZE,
        }
    }
}

/// Bottom-up and top-down trees over the same samples
#[derive(Debug, Clone)]
pub struct TreePair {
    pub bottom_up: Tree,
    pub top_down: Tree,
}

impl TreePair {
    pub fn get(&self, kind: TreeKind) -> &Tree {
        match kind {
            TreeKind::BottomUp => &self.bottom_up,
            TreeKind::TopDown => &self.top_down,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    BottomUp,
    TopDown(TopDownGrouping),
}

impl Walk {
    fn kind(self) -> TreeKind {
        match self {
            Walk::BottomUp => TreeKind::BottomUp,
            Walk::TopDown(_) => TreeKind::TopDown,
        }
    }
}

/// Build the bottom-up (callers) tree
///
/// **Public** - main entry point for bottom-up aggregation
///
/// Roots are the executing frames; each root's count is the number of
/// samples in which that frame was executing.
pub fn build_bottom_up(samples: &SampleSet, info: &Arc<CaptureInfo>) -> Tree {
    build(samples.as_slice(), info, Walk::BottomUp)
}

/// Build the top-down (callees) tree
///
/// **Public** - main entry point for top-down aggregation
pub fn build_top_down(
    samples: &SampleSet,
    info: &Arc<CaptureInfo>,
    grouping: TopDownGrouping,
) -> Tree {
    build(samples.as_slice(), info, Walk::TopDown(grouping))
}

/// Build the bottom-up tree from parallel shards
///
/// The result has the same paths and counts as `build_bottom_up`.
pub fn build_bottom_up_sharded(
    samples: &SampleSet,
    info: &Arc<CaptureInfo>,
    shard_size: usize,
) -> Tree {
    build_sharded(samples.as_slice(), info, Walk::BottomUp, shard_size)
}

/// Build the top-down tree from parallel shards
pub fn build_top_down_sharded(
    samples: &SampleSet,
    info: &Arc<CaptureInfo>,
    grouping: TopDownGrouping,
    shard_size: usize,
) -> Tree {
    build_sharded(samples.as_slice(), info, Walk::TopDown(grouping), shard_size)
}

/// Build both trees concurrently
///
/// **Public** - used by the selection layer and commands
pub fn build_tree_pair(
    samples: &SampleSet,
    info: &Arc<CaptureInfo>,
    options: &BuildOptions,
) -> TreePair {
    let shard_size = options.shard_size.max(1);
    let (bottom_up, top_down) = rayon::join(
        || build_bottom_up_sharded(samples, info, shard_size),
        || build_top_down_sharded(samples, info, options.grouping, shard_size),
    );

    TreePair {
        bottom_up,
        top_down,
    }
}

fn build(samples: &[CallstackSample], info: &Arc<CaptureInfo>, walk: Walk) -> Tree {
    let mut builder = TreeBuilder::new();
    builder.accumulate(samples, info, walk);
    builder.finish(walk.kind(), info)
}

fn build_sharded(
    samples: &[CallstackSample],
    info: &Arc<CaptureInfo>,
    walk: Walk,
    shard_size: usize,
) -> Tree {
    let shard_size = shard_size.max(1);
    if samples.len() <= shard_size {
        return build(samples, info, walk);
    }

    debug!(
        "Building {} tree from {} shards",
        walk.kind().label(),
        samples.len().div_ceil(shard_size)
    );

    let builder = samples
        .par_chunks(shard_size)
        .map(|shard| {
            let mut builder = TreeBuilder::new();
            builder.accumulate(shard, info, walk);
            builder
        })
        .reduce(TreeBuilder::new, |mut left, right| {
            left.merge(right);
            left
        });

    builder.finish(walk.kind(), info)
}

/// Mutable accumulation state for one tree
///
/// Single writer per node: shards each own a builder and are merged after.
#[derive(Debug, Default)]
struct TreeBuilder {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
    edges: HashMap<(Option<NodeId>, NodeKey), NodeId>,
    total: u64,
    skipped: u64,
}

impl TreeBuilder {
    fn new() -> Self {
        Self::default()
    }

    fn accumulate(&mut self, samples: &[CallstackSample], info: &CaptureInfo, walk: Walk) {
        for sample in samples {
            let Some(callstack) = info.callstack(sample.callstack_id) else {
                self.skipped += 1;
                continue;
            };
            let frames = callstack.frames().iter().map(|f| NodeKey::Frame(*f));

            match walk {
                Walk::BottomUp => self.add_walk(frames, true),
                Walk::TopDown(TopDownGrouping::PerThread) => self.add_walk(
                    std::iter::once(NodeKey::Thread(sample.thread_id)).chain(frames.rev()),
                    false,
                ),
                Walk::TopDown(TopDownGrouping::Merged) => self.add_walk(frames.rev(), false),
            }
        }
    }

    /// Count one sample along `keys`
    ///
    /// The executing frame is the first key for bottom-up walks and the last
    /// one for top-down walks.
    fn add_walk(&mut self, keys: impl Iterator<Item = NodeKey>, executing_first: bool) {
        let mut first = None;
        let mut current = None;

        for key in keys {
            let id = self.child(current, key);
            self.nodes[id].inclusive_count += 1;
            first.get_or_insert(id);
            current = Some(id);
        }

        let executing = if executing_first { first } else { current };
        if let Some(id) = executing {
            self.nodes[id].exclusive_count += 1;
            self.total += 1;
        }
    }

    fn child(&mut self, parent: Option<NodeId>, key: NodeKey) -> NodeId {
        if let Some(&id) = self.edges.get(&(parent, key)) {
            return id;
        }

        let id = self.nodes.len();
        let depth = parent.map(|p| self.nodes[p].depth + 1).unwrap_or(0);
        self.nodes.push(TreeNode {
            key,
            parent,
            depth,
            inclusive_count: 0,
            exclusive_count: 0,
            children: Vec::new(),
        });

        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        self.edges.insert((parent, key), id);
        id
    }

    /// Add another builder's counts path by path
    ///
    /// Parents are always created before their children, so walking `other`
    /// in creation order maps every parent before it is needed.
    fn merge(&mut self, other: TreeBuilder) {
        let mut mapping: Vec<NodeId> = Vec::with_capacity(other.nodes.len());

        for node in other.nodes {
            let parent = node.parent.map(|p| mapping[p]);
            let id = self.child(parent, node.key);
            self.nodes[id].inclusive_count += node.inclusive_count;
            self.nodes[id].exclusive_count += node.exclusive_count;
            mapping.push(id);
        }

        self.total += other.total;
        self.skipped += other.skipped;
    }

    fn finish(self, kind: TreeKind, info: &Arc<CaptureInfo>) -> Tree {
        if self.skipped > 0 {
            warn!(
                "Skipped {} samples with unknown callstacks while building {} tree",
                self.skipped,
                kind.label()
            );
        }

        debug!(
            "Built {} tree: {} samples, {} nodes, {} roots",
            kind.label(),
            self.total,
            self.nodes.len(),
            self.roots.len()
        );

        Tree::from_parts(kind, Arc::clone(info), self.nodes, self.roots, self.total)
    }
}

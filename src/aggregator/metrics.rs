//! Calculate hot paths and distribution metrics from built trees.
//!
//! Hot paths are the complete callstacks that were sampled most often.
//! These are the primary targets for optimization.

use super::tree::{Tree, TreeKind};
use crate::output::report::HotPath;
use log::debug;

/// A single collapsed (folded) stack entry
///
/// **Public** - used by the collapsed stack writer and hot path ranking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack as semicolon-separated frames, outermost first
    pub stack: String,

    /// Number of samples that ended on exactly this stack
    pub weight: u64,
}

impl CollapsedStack {
    /// Create a new collapsed stack
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Folded line as consumed by flamegraph tools
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Fold a tree back into complete stacks
///
/// **Public** - main entry point for stack folding
///
/// Works on both tree kinds: a node contributes the samples that end on its
/// path (its inclusive count minus its children's). Bottom-up paths are
/// reversed so every stack reads outermost first.
///
/// # Returns
/// Stacks sorted by weight (descending), then stack text
pub fn collapsed_stacks(tree: &Tree) -> Vec<CollapsedStack> {
    let mut stacks = Vec::new();

    for id in tree.preorder() {
        let node = tree.node(id);
        let children_total: u64 = tree
            .children(id)
            .iter()
            .map(|&c| tree.node(c).inclusive_count)
            .sum();
        let terminal = node.inclusive_count.saturating_sub(children_total);
        if terminal == 0 {
            continue;
        }

        let mut frames = Vec::with_capacity(node.depth + 1);
        let mut current = Some(id);
        while let Some(n) = current {
            frames.push(tree.display_name(n));
            current = tree.node(n).parent;
        }
        // frames is node-to-root here
        if tree.kind() == TreeKind::TopDown {
            frames.reverse();
        }

        stacks.push(CollapsedStack::new(frames.join(";"), terminal));
    }

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Folded {} tree into {} stacks", tree.kind().label(), stacks.len());

    stacks
}

/// Calculate hot paths from collapsed stacks
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `stacks` - Collapsed stacks, heaviest first
/// * `total_samples` - Sample count of the tree they came from
/// * `top_n` - Number of top paths to return (e.g., 10)
pub fn calculate_hot_paths(
    stacks: &[CollapsedStack],
    total_samples: u64,
    top_n: usize,
) -> Vec<HotPath> {
    debug!("Calculating top {} hot paths from {} stacks", top_n, stacks.len());

    stacks
        .iter()
        .take(top_n)
        .map(|stack| create_hot_path(stack, total_samples))
        .collect()
}

/// Create a HotPath from a CollapsedStack
pub fn create_hot_path(stack: &CollapsedStack, total_samples: u64) -> HotPath {
    let percentage = if total_samples > 0 {
        (stack.weight as f64 / total_samples as f64) * 100.0
    } else {
        0.0
    };

    HotPath {
        stack: stack.stack.clone(),
        samples: stack.weight,
        percentage,
    }
}

/// Shape statistics of a built tree
///
/// **Public** - returned from calculate_sample_distribution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleDistribution {
    /// Samples aggregated into the tree
    pub total_samples: u64,

    /// Distinct nodes
    pub node_count: usize,

    /// Root rows
    pub root_count: usize,

    /// Deepest node (roots are depth 0)
    pub max_depth: usize,

    /// Samples under the heaviest root
    pub heaviest_root_samples: u64,

    /// Percentage of samples under the heaviest root
    pub heaviest_root_percentage: f64,
}

impl SampleDistribution {
    /// True if a single root holds more than 80% of the samples
    pub fn is_highly_concentrated(&self) -> bool {
        self.heaviest_root_percentage > 80.0
    }

    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Samples: {} | Nodes: {} | Roots: {} | Max depth: {} | Heaviest root: {:.1}%",
            self.total_samples,
            self.node_count,
            self.root_count,
            self.max_depth,
            self.heaviest_root_percentage
        )
    }
}

/// Calculate distribution statistics for a tree
pub fn calculate_sample_distribution(tree: &Tree) -> SampleDistribution {
    if tree.is_empty() {
        return SampleDistribution::default();
    }

    // Roots are sorted heaviest first
    let heaviest_root_samples = tree
        .roots()
        .first()
        .map(|&r| tree.node(r).inclusive_count)
        .unwrap_or(0);

    SampleDistribution {
        total_samples: tree.total_sample_count(),
        node_count: tree.node_count(),
        root_count: tree.roots().len(),
        max_depth: tree.max_depth(),
        heaviest_root_samples,
        heaviest_root_percentage: tree.percentage_of(heaviest_root_samples),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{build_bottom_up, build_top_down, TopDownGrouping};
    use crate::capture::{CallstackSample, CaptureInfo, SampleSet};
    use std::sync::Arc;

    fn fixture() -> (Arc<CaptureInfo>, SampleSet) {
        let mut builder = CaptureInfo::builder();
        builder.add_thread(1, "main").unwrap();
        builder.add_module("app", 0, 0x1000).unwrap();
        builder
            .add_callstack(1, [("read", 0, 3), ("load", 0, 2), ("main", 0, 1)])
            .unwrap();
        builder
            .add_callstack(2, [("load", 0, 2), ("main", 0, 1)])
            .unwrap();

        let samples = [1, 1, 1, 2]
            .iter()
            .map(|&id| CallstackSample {
                timestamp_ns: 0,
                thread_id: 1,
                callstack_id: id,
            })
            .collect();
        (Arc::new(builder.build()), samples)
    }

    #[test]
    fn test_collapsed_stacks_top_down() {
        let (info, samples) = fixture();
        let tree = build_top_down(&samples, &info, TopDownGrouping::Merged);

        let stacks = collapsed_stacks(&tree);

        assert_eq!(
            stacks,
            vec![
                CollapsedStack::new("main;load;read".to_string(), 3),
                CollapsedStack::new("main;load".to_string(), 1),
            ]
        );
        assert_eq!(stacks[0].to_line(), "main;load;read 3");
    }

    #[test]
    fn test_collapsed_stacks_agree_across_kinds() {
        let (info, samples) = fixture();
        let top_down = build_top_down(&samples, &info, TopDownGrouping::Merged);
        let bottom_up = build_bottom_up(&samples, &info);

        assert_eq!(collapsed_stacks(&top_down), collapsed_stacks(&bottom_up));
    }

    #[test]
    fn test_calculate_hot_paths() {
        let stacks = vec![
            CollapsedStack::new("main;execute".to_string(), 50),
            CollapsedStack::new("main;storage".to_string(), 30),
            CollapsedStack::new("main;compute".to_string(), 20),
        ];

        let hot_paths = calculate_hot_paths(&stacks, 100, 2);

        assert_eq!(hot_paths.len(), 2);
        assert_eq!(hot_paths[0].stack, "main;execute");
        assert_eq!(hot_paths[0].samples, 50);
        assert_eq!(hot_paths[0].percentage, 50.0);
    }

    #[test]
    fn test_create_hot_path_empty_total() {
        let stack = CollapsedStack::new("test;path".to_string(), 0);
        let hot_path = create_hot_path(&stack, 0);
        assert_eq!(hot_path.percentage, 0.0);
    }

    #[test]
    fn test_sample_distribution() {
        let (info, samples) = fixture();
        let tree = build_bottom_up(&samples, &info);

        let dist = calculate_sample_distribution(&tree);

        assert_eq!(dist.total_samples, 4);
        assert_eq!(dist.root_count, 2);
        assert_eq!(dist.max_depth, 2);
        assert_eq!(dist.heaviest_root_samples, 3);
        assert_eq!(dist.heaviest_root_percentage, 75.0);
        assert!(!dist.is_highly_concentrated());
        assert!(dist.summary().contains("Roots: 2"));
    }

    #[test]
    fn test_sample_distribution_empty() {
        let (info, _) = fixture();
        let tree = build_bottom_up(&SampleSet::empty(), &info);
        assert_eq!(calculate_sample_distribution(&tree), SampleDistribution::default());
    }
}

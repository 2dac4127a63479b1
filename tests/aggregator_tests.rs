//! Integration tests for call tree aggregation

mod common;

use callscope::aggregator::{
    build_bottom_up, build_bottom_up_sharded, build_top_down, build_top_down_sharded,
    build_tree_pair, calculate_hot_paths, collapsed_stacks, format_percentage, BuildOptions,
    NodeKey, NodePath, TopDownGrouping, Tree,
};
use callscope::capture::{CallstackSample, SampleSet};
use common::{clock_heavy_capture, wide_capture};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

/// Every (path, inclusive, exclusive) triple of a tree
fn path_counts(tree: &Tree) -> BTreeMap<NodePath, (u64, u64)> {
    tree.preorder()
        .map(|id| {
            let node = tree.node(id);
            (tree.path(id), (node.inclusive_count, node.exclusive_count))
        })
        .collect()
}

#[test]
fn test_clock_gettime_dominates_bottom_up() {
    let model = clock_heavy_capture().model();
    let tree = build_bottom_up(model.samples(), model.info());

    assert_eq!(tree.total_sample_count(), 1000);
    assert_eq!(tree.roots().len(), 2);

    let root = tree.roots()[0];
    assert_eq!(tree.display_name(root), "clock_gettime");
    assert_eq!(tree.node(root).inclusive_count, 976);
    assert_eq!(tree.node(root).exclusive_count, 976);
    assert_eq!(format_percentage(tree.percentage(root)), "97.60%");

    // Callers of clock_gettime: both stacks go through "now"
    let callers = tree.children(root);
    assert_eq!(callers.len(), 1);
    assert_eq!(tree.display_name(callers[0]), "now");
    assert_eq!(tree.node(callers[0]).inclusive_count, 976);
    assert_eq!(tree.node(callers[0]).exclusive_count, 0);
}

#[test]
fn test_bottom_up_count_conservation() {
    let model = wide_capture().model();
    let tree = build_bottom_up(model.samples(), model.info());

    let root_sum: u64 = tree
        .roots()
        .iter()
        .map(|&r| tree.node(r).inclusive_count)
        .sum();

    assert_eq!(root_sum, model.samples().len() as u64);
    assert_eq!(tree.roots().len(), 132);
}

#[test]
fn test_top_down_per_thread_conservation() {
    let model = clock_heavy_capture().model();
    let tree = build_top_down(model.samples(), model.info(), TopDownGrouping::PerThread);

    let per_root: Vec<(String, u64)> = tree
        .roots()
        .iter()
        .map(|&r| (tree.display_name(r).into_owned(), tree.node(r).inclusive_count))
        .collect();

    assert_eq!(
        per_root,
        vec![("main [1]".to_string(), 924), ("render [2]".to_string(), 76)]
    );
}

#[test]
fn test_top_down_merged_roots_are_entry_frames() {
    let model = clock_heavy_capture().model();
    let tree = build_top_down(model.samples(), model.info(), TopDownGrouping::Merged);

    let roots: Vec<String> = tree
        .roots()
        .iter()
        .map(|&r| tree.display_name(r).into_owned())
        .collect();
    assert_eq!(roots, vec!["main".to_string(), "render_frame".to_string()]);
}

#[test]
fn test_children_never_exceed_parent() {
    let model = clock_heavy_capture().model();
    let pair = build_tree_pair(model.samples(), model.info(), &BuildOptions::default());

    let children_total = |tree: &Tree, id| -> u64 {
        tree.children(id)
            .iter()
            .map(|&c| tree.node(c).inclusive_count)
            .sum()
    };

    for id in pair.bottom_up.preorder() {
        let node = pair.bottom_up.node(id);
        assert!(children_total(&pair.bottom_up, id) <= node.inclusive_count);
    }

    // Top-down: samples either end at a node or continue into one child
    for id in pair.top_down.preorder() {
        let node = pair.top_down.node(id);
        assert_eq!(
            children_total(&pair.top_down, id) + node.exclusive_count,
            node.inclusive_count
        );
    }
}

#[test]
fn test_rebuild_on_permuted_samples_is_identical() {
    let model = clock_heavy_capture().model();
    let mut shuffled: Vec<CallstackSample> = model.samples().iter().copied().collect();
    shuffled.reverse();
    shuffled.rotate_left(333);
    let shuffled = SampleSet::new(shuffled);

    let original = build_bottom_up(model.samples(), model.info());
    let rebuilt = build_bottom_up(&shuffled, model.info());
    assert_eq!(path_counts(&original), path_counts(&rebuilt));

    let original = build_top_down(model.samples(), model.info(), TopDownGrouping::PerThread);
    let rebuilt = build_top_down(&shuffled, model.info(), TopDownGrouping::PerThread);
    assert_eq!(path_counts(&original), path_counts(&rebuilt));
}

#[test]
fn test_sharded_build_matches_single_pass() {
    let model = wide_capture().model();

    let single = build_bottom_up(model.samples(), model.info());
    let sharded = build_bottom_up_sharded(model.samples(), model.info(), 7);
    assert_eq!(path_counts(&single), path_counts(&sharded));

    let single = build_top_down(model.samples(), model.info(), TopDownGrouping::PerThread);
    let sharded =
        build_top_down_sharded(model.samples(), model.info(), TopDownGrouping::PerThread, 7);
    assert_eq!(path_counts(&single), path_counts(&sharded));
}

#[test]
fn test_empty_sample_set() {
    let model = clock_heavy_capture().model();
    let pair = build_tree_pair(&SampleSet::empty(), model.info(), &BuildOptions::default());

    assert!(pair.bottom_up.is_empty());
    assert!(pair.top_down.is_empty());
    assert_eq!(pair.bottom_up.total_sample_count(), 0);
    assert_eq!(pair.bottom_up.percentage_of(5), 0.0);
}

#[test]
fn test_paths_resolve_back_to_nodes() {
    let model = clock_heavy_capture().model();
    let tree = build_top_down(model.samples(), model.info(), TopDownGrouping::PerThread);

    for id in tree.preorder() {
        assert_eq!(tree.resolve(tree.path(id).keys()), Some(id));
    }
    assert_eq!(tree.resolve(&[NodeKey::Thread(42)]), None);
}

#[test]
fn test_hot_paths_from_collapsed_stacks() {
    let model = clock_heavy_capture().model();
    let tree = build_top_down(model.samples(), model.info(), TopDownGrouping::Merged);

    let stacks = collapsed_stacks(&tree);
    let hot = calculate_hot_paths(&stacks, tree.total_sample_count(), 2);

    assert_eq!(hot.len(), 2);
    assert_eq!(hot[0].stack, "main;tick;now;clock_gettime");
    assert_eq!(hot[0].samples, 900);
    assert_eq!(hot[0].percentage, 90.0);
    assert_eq!(hot[1].stack, "render_frame;now;clock_gettime");

    let total: u64 = stacks.iter().map(|s| s.weight).sum();
    assert_eq!(total, 1000);
}

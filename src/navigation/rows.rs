//! Visible rows of a tree view.

use super::search::search;
use super::state::ViewState;
use crate::aggregator::{format_percentage, NodeId, NodePath, Tree};

/// One displayed row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub depth: usize,
    pub display_name: String,
    pub inclusive_count: u64,
    pub exclusive_count: u64,
    /// Two decimals with a `%` suffix, e.g. "97.60%"
    pub percentage_string: String,
    pub module: Option<String>,
    pub address: Option<u64>,
    pub path: NodePath,
}

impl RowView {
    fn new(tree: &Tree, id: NodeId, path: NodePath) -> Self {
        let node = tree.node(id);
        Self {
            depth: node.depth,
            display_name: tree.display_name(id).into_owned(),
            inclusive_count: node.inclusive_count,
            exclusive_count: node.exclusive_count,
            percentage_string: format_percentage(tree.percentage(id)),
            module: tree.module_name(id).map(str::to_string),
            address: tree.address(id),
            path,
        }
    }
}

/// Rows a view shows for `tree` in `state`, in display order
///
/// **Public** - the read side of the navigation layer
///
/// Without a search, a node's children are shown when the node is expanded.
/// With a search, exactly the matched nodes and their ancestors are shown.
pub fn visible_rows(tree: &Tree, state: &ViewState) -> Vec<RowView> {
    let filter = state.search().map(|query| search(tree, query));

    // (node, path, inside a recursively expanded subtree)
    let mut stack: Vec<(NodeId, NodePath, bool)> = tree
        .roots()
        .iter()
        .rev()
        .map(|&root| (root, tree.path(root), false))
        .collect();
    stack.retain(|(_, path, _)| filter.as_ref().map_or(true, |f| f.contains(path)));

    let mut rows = Vec::new();
    while let Some((id, path, inherited)) = stack.pop() {
        let recursive = inherited || state.is_recursive_root(path.keys());
        let show_children = match &filter {
            Some(_) => true,
            None => recursive || state.is_expanded_here(path.keys()),
        };

        if show_children {
            for &child in tree.children(id).iter().rev() {
                let child_path = path.child(tree.node(child).key);
                if filter.as_ref().map_or(true, |f| f.contains(&child_path)) {
                    stack.push((child, child_path, recursive));
                }
            }
        }

        rows.push(RowView::new(tree, id, path));
    }

    rows
}

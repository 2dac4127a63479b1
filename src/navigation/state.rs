//! Expansion state of one tree view.
//!
//! State is keyed by `NodePath`, so it stays meaningful when the tree is
//! rebuilt. A recursive expansion is stored once, at the node it was
//! requested on, and covers every descendant.

use super::search::SearchQuery;
use crate::aggregator::{NodeKey, NodePath, Tree};
use log::debug;
use std::collections::HashSet;

/// Expansion state of a single node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Collapsed,
    /// Direct children are visible
    Expanded,
    /// The whole subtree is visible
    RecursivelyExpanded,
}

/// Expansion and search state of one tree view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    expanded: HashSet<NodePath>,
    recursive: HashSet<NodePath>,
    search: Option<SearchQuery>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the direct children of `path`
    ///
    /// A node that is already recursively expanded stays that way.
    pub fn expand_one_level(&mut self, tree: &Tree, path: &NodePath) {
        if !Self::exists(tree, path, "expand_one_level") {
            return;
        }
        if self.is_under_recursive(path) {
            return;
        }
        self.expanded.insert(path.clone());
    }

    /// Show the whole subtree of `path`
    pub fn expand_recursively(&mut self, tree: &Tree, path: &NodePath) {
        if !Self::exists(tree, path, "expand_recursively") {
            return;
        }
        self.recursive.insert(path.clone());
    }

    /// Recursively expand every root
    pub fn expand_all(&mut self, tree: &Tree) {
        for &root in tree.roots() {
            self.recursive.insert(tree.path(root));
        }
    }

    /// Reset every node to `Collapsed`
    ///
    /// An active search is kept.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
        self.recursive.clear();
    }

    /// Expand one level on every node shallower than `depth`
    pub fn expand_to_depth(&mut self, tree: &Tree, depth: usize) {
        let mut stack: Vec<(usize, NodePath)> = tree
            .roots()
            .iter()
            .map(|&root| (root, tree.path(root)))
            .collect();

        while let Some((id, path)) = stack.pop() {
            let node = tree.node(id);
            if node.depth + 1 > depth {
                continue;
            }
            for &child in tree.children(id) {
                stack.push((child, path.child(tree.node(child).key)));
            }
            if !self.is_under_recursive(&path) {
                self.expanded.insert(path);
            }
        }
    }

    pub fn node_state(&self, path: &NodePath) -> NavState {
        if self.is_under_recursive(path) {
            NavState::RecursivelyExpanded
        } else if self.expanded.contains(path) {
            NavState::Expanded
        } else {
            NavState::Collapsed
        }
    }

    /// True if the children of `path` are shown
    pub fn is_expanded(&self, path: &NodePath) -> bool {
        self.node_state(path) != NavState::Collapsed
    }

    pub fn set_search(&mut self, query: SearchQuery) {
        self.search = Some(query);
    }

    pub fn clear_search(&mut self) {
        self.search = None;
    }

    pub fn search(&self) -> Option<&SearchQuery> {
        self.search.as_ref()
    }

    pub(crate) fn is_recursive_root(&self, path: &[NodeKey]) -> bool {
        self.recursive.contains(path)
    }

    pub(crate) fn is_expanded_here(&self, path: &[NodeKey]) -> bool {
        self.expanded.contains(path)
    }

    fn is_under_recursive(&self, path: &NodePath) -> bool {
        !self.recursive.is_empty() && path.prefixes().any(|p| self.recursive.contains(p))
    }

    fn exists(tree: &Tree, path: &NodePath, operation: &str) -> bool {
        let found = tree.resolve(path.keys()).is_some();
        if !found {
            debug!(
                "{}: path of length {} not in {} tree, ignoring",
                operation,
                path.len(),
                tree.kind().label()
            );
        }
        found
    }
}

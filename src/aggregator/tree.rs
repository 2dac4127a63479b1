//! Arena-backed call trees.
//!
//! A `Tree` is a flat vector of nodes linked by index. Children are kept
//! sorted by descending inclusive count, then display name, then key, so
//! row order is deterministic. Traversals are iterative.

use crate::capture::{CaptureInfo, FrameIdentity, ThreadId};
use std::borrow::{Borrow, Cow};
use std::cmp::Ordering;
use std::sync::Arc;

pub type NodeId = usize;

/// Which view a tree represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeKind {
    /// Rooted at executing frames, expanding toward callers
    BottomUp,
    /// Rooted at threads or entry frames, expanding toward callees
    TopDown,
}

impl TreeKind {
    pub fn label(self) -> &'static str {
        match self {
            TreeKind::BottomUp => "bottom-up",
            TreeKind::TopDown => "top-down",
        }
    }
}

/// Identity of a node among its siblings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    /// Synthetic per-thread root of a top-down tree
    Thread(ThreadId),
    Frame(FrameIdentity),
}

/// Root-to-node sequence of keys
///
/// Paths survive tree rebuilds, node ids do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<NodeKey>);

impl NodePath {
    pub fn new(keys: Vec<NodeKey>) -> Self {
        Self(keys)
    }

    pub fn keys(&self) -> &[NodeKey] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the parent, `None` for roots
    pub fn parent(&self) -> Option<NodePath> {
        match self.0.len() {
            0 | 1 => None,
            n => Some(NodePath(self.0[..n - 1].to_vec())),
        }
    }

    pub fn child(&self, key: NodeKey) -> NodePath {
        let mut keys = self.0.clone();
        keys.push(key);
        NodePath(keys)
    }

    /// Every non-empty prefix, shortest first (ends with the path itself)
    pub fn prefixes(&self) -> impl Iterator<Item = &[NodeKey]> {
        (1..=self.0.len()).map(move |n| &self.0[..n])
    }
}

impl Borrow<[NodeKey]> for NodePath {
    fn borrow(&self) -> &[NodeKey] {
        &self.0
    }
}

/// One aggregated node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub key: NodeKey,
    pub parent: Option<NodeId>,
    /// 0 for roots
    pub depth: usize,
    /// Samples passing through this exact path
    pub inclusive_count: u64,
    /// Samples whose executing frame sits at this exact path
    pub exclusive_count: u64,
    pub children: Vec<NodeId>,
}

/// A bottom-up or top-down aggregation of a sample set
#[derive(Debug, Clone)]
pub struct Tree {
    kind: TreeKind,
    info: Arc<CaptureInfo>,
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
    total_sample_count: u64,
}

impl Tree {
    /// Assemble a tree and sort every sibling list
    pub(crate) fn from_parts(
        kind: TreeKind,
        info: Arc<CaptureInfo>,
        nodes: Vec<TreeNode>,
        roots: Vec<NodeId>,
        total_sample_count: u64,
    ) -> Self {
        let mut tree = Self {
            kind,
            info,
            nodes,
            roots,
            total_sample_count,
        };
        tree.sort_children();
        tree
    }

    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    pub fn info(&self) -> &Arc<CaptureInfo> {
        &self.info
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn total_sample_count(&self) -> u64 {
        self.total_sample_count
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Function name for frame nodes, thread label for thread roots
    pub fn display_name(&self, id: NodeId) -> Cow<'_, str> {
        key_display_name(&self.info, &self.nodes[id].key)
    }

    /// Module name for frame nodes
    pub fn module_name(&self, id: NodeId) -> Option<&str> {
        match self.nodes[id].key {
            NodeKey::Frame(frame) => Some(self.info.module_name(frame.module)),
            NodeKey::Thread(_) => None,
        }
    }

    pub fn address(&self, id: NodeId) -> Option<u64> {
        match self.nodes[id].key {
            NodeKey::Frame(frame) => Some(frame.address),
            NodeKey::Thread(_) => None,
        }
    }

    /// Share of all samples passing through the node, 0.0 for empty trees
    pub fn percentage(&self, id: NodeId) -> f64 {
        self.percentage_of(self.nodes[id].inclusive_count)
    }

    pub fn percentage_of(&self, count: u64) -> f64 {
        if self.total_sample_count == 0 {
            0.0
        } else {
            count as f64 / self.total_sample_count as f64 * 100.0
        }
    }

    /// Root-to-node key path
    pub fn path(&self, id: NodeId) -> NodePath {
        let mut keys = Vec::with_capacity(self.nodes[id].depth + 1);
        let mut current = Some(id);
        while let Some(node) = current {
            keys.push(self.nodes[node].key);
            current = self.nodes[node].parent;
        }
        keys.reverse();
        NodePath(keys)
    }

    /// Find the node at `path`, if it exists in this tree
    pub fn resolve(&self, path: &[NodeKey]) -> Option<NodeId> {
        let (first, rest) = path.split_first()?;
        let mut current = self.find_in(&self.roots, first)?;
        for key in rest {
            current = self.find_in(&self.nodes[current].children, key)?;
        }
        Some(current)
    }

    pub fn find_root(&self, key: &NodeKey) -> Option<NodeId> {
        self.find_in(&self.roots, key)
    }

    pub fn find_child(&self, parent: NodeId, key: &NodeKey) -> Option<NodeId> {
        self.find_in(&self.nodes[parent].children, key)
    }

    /// Pre-order traversal in display order
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder::new(self, &self.roots)
    }

    /// Pre-order traversal of the subtree rooted at `id`, including `id`
    pub fn subtree(&self, id: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![id],
        }
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    fn find_in(&self, ids: &[NodeId], key: &NodeKey) -> Option<NodeId> {
        ids.iter().copied().find(|&id| self.nodes[id].key == *key)
    }

    fn sort_children(&mut self) {
        let names: Vec<Cow<'_, str>> = self
            .nodes
            .iter()
            .map(|n| key_display_name(&self.info, &n.key))
            .collect();
        let nodes = &self.nodes;
        let order = |a: &NodeId, b: &NodeId| -> Ordering {
            nodes[*b]
                .inclusive_count
                .cmp(&nodes[*a].inclusive_count)
                .then_with(|| names[*a].cmp(&names[*b]))
                .then_with(|| nodes[*a].key.cmp(&nodes[*b].key))
        };

        let mut sorted_children: Vec<Vec<NodeId>> = nodes
            .iter()
            .map(|n| {
                let mut children = n.children.clone();
                children.sort_by(order);
                children
            })
            .collect();
        let mut roots = self.roots.clone();
        roots.sort_by(order);
        drop(names);

        for (node, children) in self.nodes.iter_mut().zip(sorted_children.drain(..)) {
            node.children = children;
        }
        self.roots = roots;
    }
}

/// Display name of a node key
pub fn key_display_name<'a>(info: &'a CaptureInfo, key: &NodeKey) -> Cow<'a, str> {
    match key {
        NodeKey::Frame(frame) => Cow::Borrowed(info.frame_name(frame)),
        NodeKey::Thread(thread_id) => match info.thread_name(*thread_id) {
            Some(name) => Cow::Owned(format!("{} [{}]", name, thread_id)),
            None => Cow::Owned(format!("Thread [{}]", thread_id)),
        },
    }
}

/// Format a percentage the way rows display it
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Iterative pre-order walk
pub struct Preorder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Preorder<'a> {
    fn new(tree: &'a Tree, start: &[NodeId]) -> Self {
        Self {
            tree,
            stack: start.iter().rev().copied().collect(),
        }
    }
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id].children.iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> Arc<CaptureInfo> {
        let mut builder = CaptureInfo::builder();
        builder.add_thread(1, "main").unwrap();
        builder.add_module("app", 0, 0x1000).unwrap();
        builder
            .add_callstack(1, [("b", 0, 2), ("a", 0, 1)])
            .unwrap();
        Arc::new(builder.build())
    }

    fn frame(info: &CaptureInfo, name: &str, address: u64) -> NodeKey {
        NodeKey::Frame(FrameIdentity {
            name: info.strings().get(name).unwrap(),
            module: crate::capture::ModuleRef(0),
            address,
        })
    }

    fn node(key: NodeKey, parent: Option<NodeId>, depth: usize, count: u64) -> TreeNode {
        TreeNode {
            key,
            parent,
            depth,
            inclusive_count: count,
            exclusive_count: 0,
            children: Vec::new(),
        }
    }

    fn small_tree() -> Tree {
        let info = info();
        let a = frame(&info, "a", 1);
        let b = frame(&info, "b", 2);
        let mut nodes = vec![
            node(NodeKey::Thread(1), None, 0, 3),
            node(a, Some(0), 1, 1),
            node(b, Some(0), 1, 2),
            node(b, Some(1), 2, 1),
        ];
        nodes[0].children = vec![1, 2];
        nodes[1].children = vec![3];
        Tree::from_parts(TreeKind::TopDown, info, nodes, vec![0], 3)
    }

    #[test]
    fn test_children_sorted_by_count_then_name() {
        let tree = small_tree();
        let children: Vec<_> = tree
            .children(0)
            .iter()
            .map(|&id| tree.display_name(id).into_owned())
            .collect();
        assert_eq!(children, vec!["b", "a"]);
    }

    #[test]
    fn test_equal_counts_sorted_by_name() {
        let info = info();
        let a = frame(&info, "a", 1);
        let b = frame(&info, "b", 2);
        let nodes = vec![node(b, None, 0, 5), node(a, None, 0, 5)];
        let tree = Tree::from_parts(TreeKind::BottomUp, info, nodes, vec![0, 1], 10);

        assert_eq!(tree.display_name(tree.roots()[0]), "a");
    }

    #[test]
    fn test_path_and_resolve() {
        let tree = small_tree();
        let path = tree.path(3);

        assert_eq!(path.len(), 3);
        assert_eq!(tree.resolve(path.keys()), Some(3));
        assert_eq!(path.parent().map(|p| tree.resolve(p.keys())), Some(Some(1)));
        assert_eq!(tree.resolve(&[]), None);
    }

    #[test]
    fn test_thread_display_name() {
        let tree = small_tree();
        assert_eq!(tree.display_name(0), "main [1]");
        assert_eq!(tree.module_name(0), None);
        assert_eq!(tree.module_name(1), Some("app"));
        assert_eq!(tree.address(1), Some(2));
    }

    #[test]
    fn test_preorder_follows_display_order() {
        let tree = small_tree();
        let order: Vec<_> = tree.preorder().collect();
        assert_eq!(order, vec![0, 2, 1, 3]);
        assert_eq!(tree.subtree(1).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_percentage() {
        let tree = small_tree();
        assert_eq!(format_percentage(tree.percentage(2)), "66.67%");
        assert_eq!(format_percentage(tree.percentage(0)), "100.00%");
    }

    #[test]
    fn test_prefixes() {
        let tree = small_tree();
        let path = tree.path(3);
        let prefixes: Vec<_> = path.prefixes().map(|p| p.len()).collect();
        assert_eq!(prefixes, vec![1, 2, 3]);
    }
}

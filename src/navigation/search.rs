//! Substring search over node display names.
//!
//! A search never mutates the tree. Its result is the matched paths plus
//! every ancestor of a match, which is exactly what a filtered view shows.

use crate::aggregator::{NodeId, NodePath, Tree};
use log::debug;
use std::collections::HashSet;

/// Text to look for and how to compare it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub case_sensitive: bool,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            case_sensitive: true,
        }
    }

    pub fn case_insensitive(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            case_sensitive: false,
        }
    }

    pub fn with_case_sensitivity(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    fn matcher(&self) -> Matcher {
        let needle = if self.case_sensitive {
            self.text.clone()
        } else {
            self.text.to_lowercase()
        };
        Matcher {
            needle,
            case_sensitive: self.case_sensitive,
        }
    }
}

struct Matcher {
    needle: String,
    case_sensitive: bool,
}

impl Matcher {
    // An empty needle matches nothing
    fn matches(&self, name: &str) -> bool {
        if self.needle.is_empty() {
            return false;
        }
        if self.case_sensitive {
            name.contains(&self.needle)
        } else {
            name.to_lowercase().contains(&self.needle)
        }
    }
}

/// Matches of one search and the paths a filtered view shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Matched node paths in pre-order
    pub matches: Vec<NodePath>,
    /// Matched paths and all of their ancestors
    pub visible: HashSet<NodePath>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn contains(&self, path: &NodePath) -> bool {
        self.visible.contains(path)
    }
}

/// Find every node whose display name contains the query text
///
/// **Public** - main entry point for tree search
pub fn search(tree: &Tree, query: &SearchQuery) -> SearchResult {
    let matcher = query.matcher();

    let matched: Vec<NodeId> = tree
        .preorder()
        .filter(|&id| matcher.matches(&tree.display_name(id)))
        .collect();

    let mut visible_ids: HashSet<NodeId> = HashSet::new();
    for &id in &matched {
        let mut current = Some(id);
        while let Some(node) = current {
            // Ancestors above an already marked node are marked too
            if !visible_ids.insert(node) {
                break;
            }
            current = tree.node(node).parent;
        }
    }

    let result = SearchResult {
        matches: matched.iter().map(|&id| tree.path(id)).collect(),
        visible: visible_ids.into_iter().map(|id| tree.path(id)).collect(),
    };

    debug!(
        "Search '{}' in {} tree: {} matches, {} visible nodes",
        query.text,
        tree.kind().label(),
        result.matches.len(),
        result.visible.len()
    );

    result
}

//! Search/expansion projector - 搜索过滤与自动展开
//!
//! Pure function from (forest, search term) to the filtered forest plus
//! the set of node ids that must render expanded so every match stays
//! visible. Matching is case-insensitive substring over name, code and
//! the optional english name; no fuzzy matching.

use std::collections::HashSet;

use crate::node::{NodeId, TreeNode};

/// Result of projecting a forest through a search term
#[derive(Clone, Debug, Default)]
pub struct Projection {
    /// Matching nodes and their ancestor chains, original order kept
    pub forest: Vec<TreeNode>,
    /// Ids that must be force-expanded to reveal every match
    pub expand_ids: HashSet<NodeId>,
}

/// Project `forest` through `term`.
///
/// An empty (or whitespace-only) term is the identity projection: the
/// full forest, nothing force-expanded.
pub fn project(forest: &[TreeNode], term: &str) -> Projection {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Projection {
            forest: forest.to_vec(),
            expand_ids: HashSet::new(),
        };
    }
    let mut expand_ids = HashSet::new();
    let kept = forest
        .iter()
        .filter_map(|n| keep(n, &needle, &mut expand_ids))
        .collect();
    Projection {
        forest: kept,
        expand_ids,
    }
}

fn matches(node: &TreeNode, needle: &str) -> bool {
    node.name.to_lowercase().contains(needle)
        || node.code.to_lowercase().contains(needle)
        || node
            .english_name
            .as_deref()
            .is_some_and(|e| e.to_lowercase().contains(needle))
}

/// Bottom-up filter: children first, then the node itself. A node
/// survives when it matches or when any child survived; every node kept
/// with surviving children is force-expanded.
fn keep(node: &TreeNode, needle: &str, expand: &mut HashSet<NodeId>) -> Option<TreeNode> {
    let kept_children: Vec<TreeNode> = node
        .children
        .iter()
        .filter_map(|c| keep(c, needle, expand))
        .collect();
    if kept_children.is_empty() && !matches(node, needle) {
        return None;
    }
    if !kept_children.is_empty() {
        expand.insert(node.id.clone());
    }
    let mut out = node.clone();
    out.children = kept_children;
    Some(out)
}

//! Arena tree storage - 树形结构扁平存储
//!
//! Keeps the forest as a flat map keyed by node id plus one ordered
//! child-id list per parent (roots form the top-level sibling group).
//! Lookup, detach and reattach are map operations instead of recursive
//! rewrites of nested structures; the nested [`TreeNode`] shape only
//! appears at the persistence/UI boundary.

use std::collections::HashMap;

use crate::error::{TreeError, TreeResult};
use crate::node::{NodeId, NodeRecord, TreeNode};

/// Flat forest representation.
///
/// Invariants held by construction: every id in `roots` and in any
/// `children` list is a key of `nodes`; every record's `parent_id`
/// matches the list it sits in; sibling lists are ordered ascending by
/// `sort_order` (stable for equal values).
#[derive(Clone, Debug, Default)]
pub struct TreeArena {
    nodes: HashMap<NodeId, NodeRecord>,
    children: HashMap<NodeId, Vec<NodeId>>,
    roots: Vec<NodeId>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an arena from the nested wire shape. The nesting is
    /// authoritative: a child's wire `parentId` is overwritten with the
    /// id of the node it is actually nested under.
    pub fn from_forest(forest: &[TreeNode]) -> TreeResult<Self> {
        let mut arena = Self::default();
        for root in forest {
            arena.add_subtree(root, None)?;
        }
        Ok(arena)
    }

    fn add_subtree(&mut self, node: &TreeNode, parent: Option<&NodeId>) -> TreeResult<()> {
        let mut record = node.record();
        record.parent_id = parent.cloned();
        self.insert(record)?;
        for child in &node.children {
            self.add_subtree(child, Some(&node.id))?;
        }
        Ok(())
    }

    /// Rebuild the nested wire shape, children ordered by `sort_order`
    pub fn to_forest(&self) -> Vec<TreeNode> {
        self.roots
            .iter()
            .filter_map(|id| self.build_subtree(id))
            .collect()
    }

    fn build_subtree(&self, id: &NodeId) -> Option<TreeNode> {
        let mut node = TreeNode::from(self.nodes.get(id)?.clone());
        node.children = self
            .child_ids(Some(id))
            .iter()
            .filter_map(|c| self.build_subtree(c))
            .collect();
        Some(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &NodeId) -> Option<&mut NodeRecord> {
        self.nodes.get_mut(id)
    }

    /// Iterate over all records in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.values()
    }

    /// Ordered sibling group under `parent` (`None` = root level)
    pub fn child_ids(&self, parent: Option<&NodeId>) -> &[NodeId] {
        match parent {
            Some(p) => self.children.get(p).map(Vec::as_slice).unwrap_or(&[]),
            None => &self.roots,
        }
    }

    /// Direct parent id, `None` when the node is a root (or absent)
    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.nodes.get(id).and_then(|n| n.parent_id.as_ref())
    }

    /// Every id in the subtree below `id`, excluding `id` itself,
    /// in depth-first document order
    pub fn descendant_ids(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<&NodeId> = self.child_ids(Some(id)).iter().rev().collect();
        while let Some(cur) = stack.pop() {
            out.push(cur.clone());
            for c in self.child_ids(Some(cur)).iter().rev() {
                stack.push(c);
            }
        }
        out
    }

    /// Attach a new record under its `parent_id` (root level when `None`)
    pub fn insert(&mut self, record: NodeRecord) -> TreeResult<()> {
        if self.nodes.contains_key(&record.id) {
            return Err(TreeError::Validation(format!(
                "id already present: {}",
                record.id
            )));
        }
        if let Some(p) = &record.parent_id {
            if !self.nodes.contains_key(p) {
                return Err(TreeError::NotFound(p.to_string()));
            }
        }
        let id = record.id.clone();
        let parent = record.parent_id.clone();
        self.nodes.insert(id.clone(), record);
        match &parent {
            Some(p) => self.children.entry(p.clone()).or_default().push(id),
            None => self.roots.push(id),
        }
        self.resort(parent.as_ref());
        Ok(())
    }

    /// Remove `id` from its current sibling group without dropping the
    /// record. Callers must follow with [`attach`](Self::attach) or
    /// remove the record entirely.
    pub(crate) fn detach(&mut self, id: &NodeId) {
        let parent = self.parent_of(id).cloned();
        let list = match &parent {
            Some(p) => self.children.get_mut(p),
            None => Some(&mut self.roots),
        };
        if let Some(list) = list {
            list.retain(|c| c != id);
        }
    }

    /// Append a detached node to a new sibling group and update its
    /// parent back-reference
    pub(crate) fn attach(&mut self, id: &NodeId, parent: Option<NodeId>) {
        if let Some(rec) = self.nodes.get_mut(id) {
            rec.parent_id = parent.clone();
        }
        match &parent {
            Some(p) => self.children.entry(p.clone()).or_default().push(id.clone()),
            None => self.roots.push(id.clone()),
        }
        self.resort(parent.as_ref());
    }

    /// Drop `id` and its whole subtree; returns the removed ids with the
    /// subtree root first
    pub(crate) fn remove_subtree(&mut self, id: &NodeId) -> Vec<NodeId> {
        let mut removed = vec![id.clone()];
        removed.extend(self.descendant_ids(id));
        self.detach(id);
        for rid in &removed {
            self.nodes.remove(rid);
            self.children.remove(rid);
        }
        removed
    }

    /// Re-sort one sibling group ascending by `sort_order` (stable)
    pub(crate) fn resort(&mut self, parent: Option<&NodeId>) {
        let nodes = &self.nodes;
        let list = match parent {
            Some(p) => match self.children.get_mut(p) {
                Some(l) => l,
                None => return,
            },
            None => &mut self.roots,
        };
        list.sort_by_key(|id| nodes.get(id).map(|n| n.sort_order).unwrap_or(i64::MAX));
    }
}

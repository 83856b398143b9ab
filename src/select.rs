//! Checkbox selection - 多选树勾选状态
//!
//! Checked-id set for multi-select tree widgets (permission assignment,
//! department filters). Checking cascades down the subtree; unchecking
//! cascades down and walks up, clearing any ancestor left without
//! checked children. The indeterminate state is derived at render time
//! and never stored.

use std::collections::HashSet;

use crate::arena::TreeArena;
use crate::node::NodeId;

/// Set of checked node ids with parent/child consistency rules
#[derive(Clone, Debug, Default)]
pub struct CheckedSet {
    checked: HashSet<NodeId>,
}

impl CheckedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_checked(&self, id: &NodeId) -> bool {
        self.checked.contains(id)
    }

    pub fn len(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    pub fn ids(&self) -> &HashSet<NodeId> {
        &self.checked
    }

    /// Check a node and its whole subtree. Unknown ids are ignored.
    pub fn check(&mut self, arena: &TreeArena, id: &NodeId) {
        if !arena.contains(id) {
            return;
        }
        self.checked.insert(id.clone());
        self.checked.extend(arena.descendant_ids(id));
    }

    /// Uncheck a node and its subtree, then walk up: any ancestor left
    /// without checked children is unchecked too.
    pub fn uncheck(&mut self, arena: &TreeArena, id: &NodeId) {
        self.checked.remove(id);
        for d in arena.descendant_ids(id) {
            self.checked.remove(&d);
        }
        let mut cur = arena.parent_of(id).cloned();
        while let Some(p) = cur {
            let any_child_checked = arena
                .child_ids(Some(&p))
                .iter()
                .any(|c| self.checked.contains(c));
            if any_child_checked || !self.checked.remove(&p) {
                break;
            }
            cur = arena.parent_of(&p).cloned();
        }
    }

    /// Derived tri-state: some but not all direct children checked.
    /// Leaves are never indeterminate.
    pub fn is_indeterminate(&self, arena: &TreeArena, id: &NodeId) -> bool {
        let children = arena.child_ids(Some(id));
        if children.is_empty() {
            return false;
        }
        let checked = children
            .iter()
            .filter(|c| self.checked.contains(*c))
            .count();
        checked > 0 && checked < children.len()
    }

    /// Check every node in the forest
    pub fn select_all(&mut self, arena: &TreeArena) {
        self.checked = arena.iter().map(|r| r.id.clone()).collect();
    }

    /// Uncheck everything
    pub fn clear(&mut self) {
        self.checked.clear();
    }
}

//! Tree store - 树数据存取
//!
//! One store per feature page: holds the canonical in-memory forest and
//! mediates every read/write through the injected persistence port.
//! Constructed on page mount, dropped on unmount; there is no ambient
//! global state.

use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::arena::TreeArena;
use crate::engine::{self, ReferenceGuard};
use crate::error::TreeResult;
use crate::node::{NewNode, NodeId, NodePatch, NodeRecord, TreeNode};
use crate::notify::{Confirmer, Notifier};
use crate::persist::ForestStore;
use crate::profile::{DeleteMode, TreeProfile};
use crate::project::{project, Projection};

/// Canonical forest for one feature instance
pub struct TreeStore {
    profile: TreeProfile,
    port: Box<dyn ForestStore>,
    arena: TreeArena,
}

impl TreeStore {
    /// Create an empty store; call [`load`](Self::load) before use
    pub fn new(profile: TreeProfile, port: Box<dyn ForestStore>) -> Self {
        Self {
            profile,
            port,
            arena: TreeArena::new(),
        }
    }

    /// Create and immediately load (the page-mount path)
    pub fn open(profile: TreeProfile, port: Box<dyn ForestStore>) -> Self {
        let mut store = Self::new(profile, port);
        store.load();
        store
    }

    pub fn profile(&self) -> &TreeProfile {
        &self.profile
    }

    /// Fetch the persisted forest. Absent or unreadable data falls back
    /// to the profile's seed forest, which is persisted right away; this
    /// never fails.
    pub fn load(&mut self) {
        let parsed = self
            .port
            .read_forest(&self.profile.key)
            .and_then(|json| match serde_json::from_str::<Vec<TreeNode>>(&json) {
                Ok(forest) => Some(forest),
                Err(e) => {
                    warn!(key = %self.profile.key, "stored forest unreadable, reseeding: {}", e);
                    None
                }
            })
            .and_then(|forest| match TreeArena::from_forest(&forest) {
                Ok(arena) => Some(arena),
                Err(e) => {
                    warn!(key = %self.profile.key, "stored forest inconsistent, reseeding: {}", e);
                    None
                }
            });

        match parsed {
            Some(arena) => self.arena = arena,
            None => {
                // profile seeds are static fixtures; an invalid one shows
                // up as an empty tree rather than a failed page load
                self.arena =
                    TreeArena::from_forest(&self.profile.seed_forest()).unwrap_or_default();
                info!(key = %self.profile.key, nodes = self.arena.len(), "seeded default forest");
                if let Err(e) = self.save() {
                    warn!(key = %self.profile.key, "failed to persist seed forest: {}", e);
                }
            }
        }
    }

    /// Serialize and persist the whole forest (full overwrite)
    pub fn save(&self) -> TreeResult<()> {
        let json = serde_json::to_string_pretty(&self.arena.to_forest())?;
        self.port.write_forest(&self.profile.key, &json)
    }

    /// Nested wire-shape snapshot of the current forest
    pub fn forest(&self) -> Vec<TreeNode> {
        self.arena.to_forest()
    }

    pub fn arena(&self) -> &TreeArena {
        &self.arena
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn find_node(&self, id: &NodeId) -> Option<&NodeRecord> {
        self.arena.get(id)
    }

    /// Direct parent record, `None` when the child is a root
    pub fn find_parent(&self, child: &NodeId) -> Option<&NodeRecord> {
        self.arena.parent_of(child).and_then(|p| self.arena.get(p))
    }

    /// Ids of the full subtree below `id`, excluding `id` itself
    pub fn collect_descendant_ids(&self, id: &NodeId) -> HashSet<NodeId> {
        self.arena.descendant_ids(id).into_iter().collect()
    }

    /// Filtered view plus force-expand set for the current search term
    pub fn project(&self, term: &str) -> Projection {
        project(&self.forest(), term)
    }

    /// Run one mutation and persist the result. A failed save rolls the
    /// in-memory forest back to its pre-mutation value, so callers can
    /// retry without ever observing a half-applied change.
    fn commit<T>(
        &mut self,
        op: impl FnOnce(&mut TreeArena, &TreeProfile) -> TreeResult<T>,
    ) -> TreeResult<T> {
        let snapshot = self.arena.clone();
        let value = op(&mut self.arena, &self.profile)?;
        if let Err(e) = self.save() {
            self.arena = snapshot;
            error!(key = %self.profile.key, "persist failed, change rolled back: {}", e);
            return Err(e);
        }
        Ok(value)
    }

    /// Append a new node under `parent` (root level when `None`)
    pub fn add_node(&mut self, draft: NewNode, parent: Option<&NodeId>) -> TreeResult<NodeId> {
        self.commit(|arena, profile| engine::add_node(arena, profile.code_scope, draft, parent))
    }

    /// Apply a partial update, including reparenting
    pub fn update_node(&mut self, id: &NodeId, patch: NodePatch) -> TreeResult<()> {
        self.commit(|arena, profile| engine::update_node(arena, profile.code_scope, id, patch))
    }

    /// Reparent a node (`None` = root level)
    pub fn move_node(&mut self, id: &NodeId, new_parent: Option<&NodeId>) -> TreeResult<()> {
        self.commit(|arena, profile| {
            engine::move_node(arena, profile.code_scope, id, new_parent)
        })
    }

    /// Delete per the profile's mode; returns the removed id set
    pub fn delete_node(
        &mut self,
        id: &NodeId,
        guard: &dyn ReferenceGuard,
    ) -> TreeResult<Vec<NodeId>> {
        self.commit(|arena, profile| engine::delete_node(arena, id, profile.delete_mode, guard))
    }

    /// Rewrite one sibling group's sort orders to match `ordered`
    pub fn reorder_siblings(
        &mut self,
        parent: Option<&NodeId>,
        ordered: &[NodeId],
    ) -> TreeResult<()> {
        self.commit(|arena, _| engine::reorder_siblings(arena, parent, ordered))
    }

    /// Confirmation-gated delete for UI event handlers: asks the
    /// confirmation collaborator, runs the delete, and reports the
    /// outcome through the notifier. `None` when declined or rejected.
    pub fn delete_with_confirm<U>(
        &mut self,
        id: &NodeId,
        guard: &dyn ReferenceGuard,
        ui: &U,
    ) -> Option<Vec<NodeId>>
    where
        U: Notifier + Confirmer,
    {
        let name = self
            .find_node(id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| id.to_string());
        let prompt = match self.profile.delete_mode {
            DeleteMode::Cascade => format!(
                "确定要删除{}「{}」及其全部子节点吗？",
                self.profile.title, name
            ),
            DeleteMode::Block => format!("确定要删除{}「{}」吗？", self.profile.title, name),
        };
        if !ui.confirm_destructive(&prompt) {
            return None;
        }
        match self.delete_node(id, guard) {
            Ok(removed) => {
                ui.notify_success("删除成功");
                Some(removed)
            }
            Err(e) if e.is_rejection() => {
                // 校验/守卫拒绝, 树未变化, 直接提示原因
                ui.notify_error(&e.to_string());
                None
            }
            Err(_) => {
                ui.notify_error("保存失败，更改已回滚，请重试");
                None
            }
        }
    }
}

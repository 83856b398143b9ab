//! Tree mutation engine - 树结构变更引擎
//!
//! Structural operations over a [`TreeArena`]: add, update, move,
//! delete, reorder. Every operation validates first and mutates second,
//! so a returned error always means the forest is untouched.

use std::collections::HashSet;

use chrono::Utc;
use tracing::debug;

use crate::arena::TreeArena;
use crate::error::{OptionExt, TreeError, TreeResult};
use crate::node::{NewNode, NodeId, NodePatch, NodeRecord};
use crate::profile::{CodeScope, DeleteMode};

/// 名称最大长度 (字符数)
const MAX_NAME_CHARS: usize = 32;

/// Cross-feature reference check, injected by the calling feature.
///
/// Returns a human-readable reason while external records still
/// reference the node (e.g. employees pointing at a department), which
/// blocks non-cascade deletion with [`TreeError::Referenced`].
pub trait ReferenceGuard {
    fn blocked_reason(&self, id: &NodeId) -> Option<String>;
}

impl<F> ReferenceGuard for F
where
    F: Fn(&NodeId) -> Option<String>,
{
    fn blocked_reason(&self, id: &NodeId) -> Option<String> {
        self(id)
    }
}

/// Guard for features without referencing collections
pub fn no_references(_id: &NodeId) -> Option<String> {
    None
}

fn validate_label(name: &str, code: &str) -> TreeResult<()> {
    if name.trim().is_empty() {
        return Err(TreeError::Validation("名称不能为空".to_string()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(TreeError::Validation(format!(
            "名称不能超过{}个字符",
            MAX_NAME_CHARS
        )));
    }
    if code.trim().is_empty() {
        return Err(TreeError::Validation("编码不能为空".to_string()));
    }
    Ok(())
}

fn code_in_use(
    arena: &TreeArena,
    scope: CodeScope,
    code: &str,
    parent: Option<&NodeId>,
    exclude: Option<&NodeId>,
) -> bool {
    match scope {
        CodeScope::Global => arena
            .iter()
            .any(|r| r.code == code && Some(&r.id) != exclude),
        CodeScope::PerParent => arena
            .child_ids(parent)
            .iter()
            .filter_map(|id| arena.get(id))
            .any(|r| r.code == code && Some(&r.id) != exclude),
    }
}

/// Next free sort position at the end of a sibling group
fn next_sort_order(arena: &TreeArena, parent: Option<&NodeId>) -> i64 {
    arena
        .child_ids(parent)
        .iter()
        .filter_map(|id| arena.get(id))
        .map(|r| r.sort_order)
        .max()
        .unwrap_or(0)
        + 1
}

/// Append a new node under `parent` (root level when `None`)
pub fn add_node(
    arena: &mut TreeArena,
    scope: CodeScope,
    draft: NewNode,
    parent: Option<&NodeId>,
) -> TreeResult<NodeId> {
    validate_label(&draft.name, &draft.code)?;
    if let Some(p) = parent {
        if !arena.contains(p) {
            return Err(TreeError::NotFound(p.to_string()));
        }
    }
    if code_in_use(arena, scope, &draft.code, parent, None) {
        return Err(TreeError::DuplicateCode { code: draft.code });
    }

    let sort_order = draft
        .sort_order
        .unwrap_or_else(|| next_sort_order(arena, parent));
    let now = Utc::now();
    let id = NodeId::new();
    arena.insert(NodeRecord {
        id: id.clone(),
        name: draft.name,
        code: draft.code,
        english_name: draft.english_name,
        sort_order,
        parent_id: parent.cloned(),
        remark: draft.remark,
        created_at: now,
        updated_at: now,
    })?;
    debug!(node = %id, "node added");
    Ok(id)
}

/// Apply a partial update; a `parent_id` change goes through
/// detach-then-reattach with the same cycle check as [`move_node`]
pub fn update_node(
    arena: &mut TreeArena,
    scope: CodeScope,
    id: &NodeId,
    patch: NodePatch,
) -> TreeResult<()> {
    let current = arena.get(id).ok_or_not_found(id.to_string())?;
    let new_name = patch.name.clone().unwrap_or_else(|| current.name.clone());
    let new_code = patch.code.clone().unwrap_or_else(|| current.code.clone());
    let current_parent = current.parent_id.clone();
    let target_parent = match &patch.parent_id {
        Some(p) => p.clone(),
        None => current_parent.clone(),
    };

    validate_label(&new_name, &new_code)?;
    let reparent = target_parent != current_parent;
    if reparent {
        if let Some(np) = &target_parent {
            if !arena.contains(np) {
                return Err(TreeError::NotFound(np.to_string()));
            }
            if np == id || arena.descendant_ids(id).contains(np) {
                return Err(TreeError::Cycle);
            }
        }
    }
    // uniqueness is re-checked in the target sibling group, excluding the
    // node's own prior code
    if code_in_use(arena, scope, &new_code, target_parent.as_ref(), Some(id)) {
        return Err(TreeError::DuplicateCode { code: new_code });
    }

    {
        let rec = arena.get_mut(id).ok_or_not_found(id.to_string())?;
        rec.name = new_name;
        rec.code = new_code;
        if let Some(english) = patch.english_name {
            rec.english_name = english;
        }
        if let Some(remark) = patch.remark {
            rec.remark = remark;
        }
        if let Some(sort) = patch.sort_order {
            rec.sort_order = sort;
        }
        rec.updated_at = Utc::now();
    }
    if reparent {
        arena.detach(id);
        arena.attach(id, target_parent);
    } else {
        arena.resort(current_parent.as_ref());
    }
    debug!(node = %id, "node updated");
    Ok(())
}

/// Reparent a node; rejected when the target is the node itself or any
/// of its own descendants, or when its code collides in the target
/// sibling group
pub fn move_node(
    arena: &mut TreeArena,
    scope: CodeScope,
    id: &NodeId,
    new_parent: Option<&NodeId>,
) -> TreeResult<()> {
    let code = arena.get(id).ok_or_not_found(id.to_string())?.code.clone();
    if let Some(np) = new_parent {
        if !arena.contains(np) {
            return Err(TreeError::NotFound(np.to_string()));
        }
        if np == id || arena.descendant_ids(id).contains(np) {
            return Err(TreeError::Cycle);
        }
    }
    if code_in_use(arena, scope, &code, new_parent, Some(id)) {
        return Err(TreeError::DuplicateCode { code });
    }
    arena.detach(id);
    arena.attach(id, new_parent.cloned());
    if let Some(rec) = arena.get_mut(id) {
        rec.updated_at = Utc::now();
    }
    debug!(node = %id, "node moved");
    Ok(())
}

/// Delete a node. `Block` mode refuses while children or external
/// references exist; `Cascade` mode removes the whole subtree. Returns
/// the removed ids (subtree root first) so cascade callers can purge
/// dependent leaf records keyed by any of them.
pub fn delete_node(
    arena: &mut TreeArena,
    id: &NodeId,
    mode: DeleteMode,
    guard: &dyn ReferenceGuard,
) -> TreeResult<Vec<NodeId>> {
    let name = arena.get(id).ok_or_not_found(id.to_string())?.name.clone();
    if mode == DeleteMode::Block {
        if !arena.child_ids(Some(id)).is_empty() {
            return Err(TreeError::HasChildren(name));
        }
        if let Some(reason) = guard.blocked_reason(id) {
            return Err(TreeError::Referenced(reason));
        }
    }
    let removed = arena.remove_subtree(id);
    debug!(node = %id, count = removed.len(), "node deleted");
    Ok(removed)
}

/// Rewrite `sort_order` for one sibling group to match `ordered`
/// positionally (1-based). Every id must belong to that group.
pub fn reorder_siblings(
    arena: &mut TreeArena,
    parent: Option<&NodeId>,
    ordered: &[NodeId],
) -> TreeResult<()> {
    let group: Vec<NodeId> = arena.child_ids(parent).to_vec();
    if ordered.len() != group.len() {
        return Err(TreeError::Validation(
            "排序列表与同级节点数量不一致".to_string(),
        ));
    }
    let members: HashSet<&NodeId> = group.iter().collect();
    let mut seen = HashSet::new();
    for id in ordered {
        if !members.contains(id) {
            return Err(TreeError::NotFound(id.to_string()));
        }
        if !seen.insert(id) {
            return Err(TreeError::Validation(format!("重复的节点: {}", id)));
        }
    }

    let now = Utc::now();
    for (idx, id) in ordered.iter().enumerate() {
        if let Some(rec) = arena.get_mut(id) {
            rec.sort_order = (idx as i64) + 1;
            rec.updated_at = now;
        }
    }
    arena.resort(parent);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{department_forest, node, node_with_children};

    fn arena() -> TreeArena {
        TreeArena::from_forest(&department_forest()).unwrap()
    }

    fn draft(name: &str, code: &str) -> NewNode {
        NewNode {
            name: name.to_string(),
            code: code.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_appends_after_siblings() {
        let mut a = arena();
        let id = add_node(&mut a, CodeScope::Global, draft("人事部", "HR"), Some(&"1".into()))
            .unwrap();
        let group = a.child_ids(Some(&"1".into()));
        assert_eq!(group.last(), Some(&id));
        assert_eq!(a.get(&id).unwrap().sort_order, 2);
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let mut a = arena();
        let err = add_node(&mut a, CodeScope::Global, draft("  ", "X1"), None).unwrap_err();
        assert!(matches!(err, TreeError::Validation(_)));
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_add_duplicate_code_in_global_scope() {
        // "TECH" already exists elsewhere in the forest
        let mut a = arena();
        let before = a.to_forest();
        let err =
            add_node(&mut a, CodeScope::Global, draft("X", "TECH"), Some(&"1".into())).unwrap_err();
        assert!(matches!(err, TreeError::DuplicateCode { code } if code == "TECH"));
        assert_eq!(a.to_forest(), before);
    }

    #[test]
    fn test_per_parent_scope_allows_same_code_under_other_parent() {
        let mut a = arena();
        // "FE" exists under 技术部(2); per-parent scope allows it under 市场部(4)
        add_node(&mut a, CodeScope::PerParent, draft("前台", "FE"), Some(&"4".into())).unwrap();
        let err =
            add_node(&mut a, CodeScope::PerParent, draft("又一个", "FE"), Some(&"4".into()))
                .unwrap_err();
        assert!(matches!(err, TreeError::DuplicateCode { .. }));
    }

    #[test]
    fn test_update_code_excludes_own_prior_code() {
        let mut a = arena();
        // keeping its own code is not a duplicate
        update_node(
            &mut a,
            CodeScope::Global,
            &"2".into(),
            NodePatch {
                name: Some("技术中心".to_string()),
                code: Some("TECH".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(a.get(&"2".into()).unwrap().name, "技术中心");
    }

    #[test]
    fn test_update_clears_english_name() {
        let mut a = arena();
        update_node(
            &mut a,
            CodeScope::Global,
            &"2".into(),
            NodePatch {
                english_name: Some(Some("Tech".to_string())),
                remark: Some(Some("核心部门".to_string())),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(a.get(&"2".into()).unwrap().english_name.as_deref(), Some("Tech"));

        // Some(None) blanks the field again; absent fields stay untouched
        update_node(
            &mut a,
            CodeScope::Global,
            &"2".into(),
            NodePatch {
                english_name: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
        let rec = a.get(&"2".into()).unwrap();
        assert_eq!(rec.english_name, None);
        assert_eq!(rec.remark.as_deref(), Some("核心部门"));
    }

    #[test]
    fn test_update_reparents_through_move() {
        let mut a = arena();
        update_node(
            &mut a,
            CodeScope::Global,
            &"3".into(),
            NodePatch {
                parent_id: Some(Some("4".into())),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(a.parent_of(&"3".into()), Some(&"4".into()));
        assert!(a.child_ids(Some(&"2".into())).is_empty());
    }

    #[test]
    fn test_update_missing_node() {
        let mut a = arena();
        let err =
            update_node(&mut a, CodeScope::Global, &"404".into(), NodePatch::default())
                .unwrap_err();
        assert!(matches!(err, TreeError::NotFound(_)));
    }

    #[test]
    fn test_move_under_own_descendant_is_cycle() {
        let mut a = arena();
        let before = a.to_forest();
        let err = move_node(&mut a, CodeScope::Global, &"1".into(), Some(&"3".into())).unwrap_err();
        assert!(matches!(err, TreeError::Cycle));
        let err = move_node(&mut a, CodeScope::Global, &"1".into(), Some(&"1".into())).unwrap_err();
        assert!(matches!(err, TreeError::Cycle));
        assert_eq!(a.to_forest(), before);
    }

    #[test]
    fn test_move_rejects_duplicate_code_in_target_group() {
        // two tables, each with its own "name" field (legal per-parent)
        let forest = vec![
            node_with_children(
                "t1",
                "客户表",
                "crm_customer",
                1,
                vec![node("f1", "名称", "name", 1)],
            ),
            node_with_children(
                "t2",
                "订单表",
                "crm_order",
                2,
                vec![node("f2", "名称", "name", 1), node("f3", "电话", "phone", 2)],
            ),
        ];
        let mut a = TreeArena::from_forest(&forest).unwrap();

        // moving f1 into t2 would land two sibling "name" codes
        let err = move_node(&mut a, CodeScope::PerParent, &"f1".into(), Some(&"t2".into()))
            .unwrap_err();
        assert!(matches!(err, TreeError::DuplicateCode { code } if code == "name"));
        assert_eq!(a.parent_of(&"f1".into()), Some(&"t1".into()));

        // a code unused in the target group moves freely
        move_node(&mut a, CodeScope::PerParent, &"f3".into(), Some(&"t1".into())).unwrap();
        assert_eq!(a.parent_of(&"f3".into()), Some(&"t1".into()));
    }

    #[test]
    fn test_move_to_root() {
        let mut a = arena();
        move_node(&mut a, CodeScope::Global, &"2".into(), None).unwrap();
        assert_eq!(a.parent_of(&"2".into()), None);
        // the subtree moved with it
        assert_eq!(a.parent_of(&"3".into()), Some(&"2".into()));
    }

    #[test]
    fn test_delete_blocked_by_children() {
        let mut a = arena();
        let err = delete_node(&mut a, &"2".into(), DeleteMode::Block, &no_references).unwrap_err();
        assert!(matches!(err, TreeError::HasChildren(name) if name == "技术部"));

        delete_node(&mut a, &"3".into(), DeleteMode::Block, &no_references).unwrap();
        assert!(a.child_ids(Some(&"2".into())).is_empty());
        assert!(!a.contains(&"3".into()));
    }

    #[test]
    fn test_delete_blocked_by_reference_guard() {
        let mut a = arena();
        let guard = |id: &NodeId| {
            (id == &"4".into()).then(|| "3 名员工仍属于该部门".to_string())
        };
        let err = delete_node(&mut a, &"4".into(), DeleteMode::Block, &guard).unwrap_err();
        assert!(matches!(err, TreeError::Referenced(_)));
        assert!(a.contains(&"4".into()));
    }

    #[test]
    fn test_cascade_delete_returns_removed_set() {
        let mut a = arena();
        let removed = delete_node(&mut a, &"1".into(), DeleteMode::Cascade, &no_references).unwrap();
        assert_eq!(removed, vec!["1".into(), "2".into(), "3".into()]);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_add_then_delete_restores_forest() {
        let mut a = arena();
        let before = a.to_forest();
        let id = add_node(&mut a, CodeScope::Global, draft("临时", "TMP"), Some(&"4".into()))
            .unwrap();
        delete_node(&mut a, &id, DeleteMode::Block, &no_references).unwrap();
        assert_eq!(a.to_forest(), before);
    }

    #[test]
    fn test_reorder_assigns_positional_orders() {
        let mut a = arena();
        reorder_siblings(&mut a, None, &["4".into(), "1".into()]).unwrap();
        assert_eq!(a.child_ids(None), &["4".into(), "1".into()]);
        assert_eq!(a.get(&"4".into()).unwrap().sort_order, 1);
        assert_eq!(a.get(&"1".into()).unwrap().sort_order, 2);
    }

    #[test]
    fn test_reorder_rejects_foreign_member() {
        let mut a = arena();
        // "3" is not part of the root sibling group
        let err = reorder_siblings(&mut a, None, &["4".into(), "3".into()]).unwrap_err();
        assert!(matches!(err, TreeError::NotFound(_)));
        assert_eq!(a.child_ids(None), &["1".into(), "4".into()]);
    }
}

//! Shared test fixtures

use chrono::Utc;

use crate::node::{NodeRecord, TreeNode};

pub fn record(
    id: &str,
    name: &str,
    code: &str,
    parent: Option<&str>,
    sort_order: i64,
) -> NodeRecord {
    NodeRecord {
        id: id.into(),
        name: name.to_string(),
        code: code.to_string(),
        english_name: None,
        sort_order,
        parent_id: parent.map(Into::into),
        remark: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn node(id: &str, name: &str, code: &str, sort_order: i64) -> TreeNode {
    TreeNode::from(record(id, name, code, None, sort_order))
}

pub fn node_with_children(
    id: &str,
    name: &str,
    code: &str,
    sort_order: i64,
    children: Vec<TreeNode>,
) -> TreeNode {
    let mut n = node(id, name, code, sort_order);
    n.children = children;
    n
}

/// The department forest used across the test suite:
/// 总公司(1) -> 技术部(2) -> 前端团队(3); 市场部(4) at root level.
pub fn department_forest() -> Vec<TreeNode> {
    vec![
        node_with_children(
            "1",
            "总公司",
            "HQ",
            1,
            vec![node_with_children(
                "2",
                "技术部",
                "TECH",
                1,
                vec![node("3", "前端团队", "FE", 1)],
            )],
        ),
        node("4", "市场部", "MARKET", 2),
    ]
}

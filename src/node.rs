//! Tree node model - 树节点模型
//!
//! Two shapes of the same record: `NodeRecord` is the flat arena/storage
//! shape (parent back-reference, no children), `TreeNode` is the nested
//! wire shape exchanged with the persistence layer and the UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque node identifier. Assigned once at creation and never reused;
/// the library never interprets its contents, so seed data may use plain
/// literals ("1", "2") while runtime-created nodes get UUIDs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Mint a fresh identifier (UUID v4)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Flat node record - 节点记录
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,

    /// 节点名称
    pub name: String,

    /// 编码 (uniqueness scope depends on the feature profile)
    pub code: String,

    /// 英文名称 (secondary searchable label)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_name: Option<String>,

    /// 排序号, siblings render ascending
    #[serde(default)]
    pub sort_order: i64,

    /// 父节点ID (None 表示顶级节点)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,

    /// 备注
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Nested tree node (wire shape, 用于持久化和前端渲染)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: NodeId,
    pub name: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_name: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl From<NodeRecord> for TreeNode {
    fn from(r: NodeRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            code: r.code,
            english_name: r.english_name,
            sort_order: r.sort_order,
            parent_id: r.parent_id,
            remark: r.remark,
            created_at: r.created_at,
            updated_at: r.updated_at,
            children: Vec::new(),
        }
    }
}

impl TreeNode {
    /// Flatten the wire shape back to a record, dropping children
    pub fn record(&self) -> NodeRecord {
        NodeRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            code: self.code.clone(),
            english_name: self.english_name.clone(),
            sort_order: self.sort_order,
            parent_id: self.parent_id.clone(),
            remark: self.remark.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Draft for an "add node" intent. Id and timestamps are assigned by the
/// engine, never by the caller.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub english_name: Option<String>,
    /// Appended after existing siblings when absent
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub remark: Option<String>,
}

/// Partial update for an "edit node" intent. `None` fields are left
/// untouched; the nested-Option fields use `Some(None)` to clear the
/// value (blank out the english name or remark, detach to root level).
#[derive(Clone, Debug, Default)]
pub struct NodePatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub english_name: Option<Option<String>>,
    pub sort_order: Option<i64>,
    pub remark: Option<Option<String>>,
    pub parent_id: Option<Option<NodeId>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_unique() {
        assert_ne!(NodeId::new(), NodeId::new());
    }

    #[test]
    fn test_wire_shape_camel_case() {
        let node = TreeNode::from(NodeRecord {
            id: "1".into(),
            name: "总公司".to_string(),
            code: "HQ".to_string(),
            english_name: None,
            sort_order: 1,
            parent_id: None,
            remark: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"sortOrder\":1"));
        assert!(!json.contains("parent_id"));
        // empty children are omitted from the wire shape
        assert!(!json.contains("children"));
    }

    #[test]
    fn test_deserialize_minimal_seed() {
        // seed data may omit timestamps and optional fields entirely
        let json = r#"{"id":"1","name":"总公司","code":"HQ"}"#;
        let node: TreeNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.id.as_str(), "1");
        assert_eq!(node.sort_order, 0);
        assert!(node.children.is_empty());
    }
}

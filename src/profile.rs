//! Feature profiles - 功能配置
//!
//! One generic tree engine, four call sites. A profile carries the
//! per-feature choices: storage key, code-uniqueness scope, delete mode
//! and the default forest used to seed an empty store.

use crate::node::TreeNode;

/// Scope within which a node's `code` must be unique
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeScope {
    /// Unique across the whole forest (departments, dictionary categories)
    Global,
    /// Unique among direct siblings only (business fields within one table)
    PerParent,
}

/// What `delete` does to a node's subtree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteMode {
    /// Refuse to delete a node that still has children (department style)
    Block,
    /// Delete the node together with its whole subtree and report the
    /// removed id set so the caller can purge dependent leaf records
    /// (dictionary style)
    Cascade,
}

/// Per-feature tree configuration
#[derive(Clone, Debug)]
pub struct TreeProfile {
    /// Storage key, one per feature, never shared
    pub key: String,
    /// Display name used in log lines and confirmation prompts
    pub title: String,
    pub code_scope: CodeScope,
    pub delete_mode: DeleteMode,
    seed: fn() -> Vec<TreeNode>,
}

impl TreeProfile {
    /// 部门管理: global codes, deletion blocked while children exist
    pub fn departments() -> Self {
        Self {
            key: "tree_department".to_string(),
            title: "部门".to_string(),
            code_scope: CodeScope::Global,
            delete_mode: DeleteMode::Block,
            seed: seed_departments,
        }
    }

    /// 字典分类: global codes, deletion cascades to the whole subtree
    pub fn dictionary_categories() -> Self {
        Self {
            key: "tree_dictionary".to_string(),
            title: "字典分类".to_string(),
            code_scope: CodeScope::Global,
            delete_mode: DeleteMode::Cascade,
            seed: seed_dictionary,
        }
    }

    /// 角色权限: read-mostly tree consumed by the selection widget
    pub fn role_permissions() -> Self {
        Self {
            key: "tree_permission".to_string(),
            title: "权限".to_string(),
            code_scope: CodeScope::Global,
            delete_mode: DeleteMode::Block,
            seed: seed_permissions,
        }
    }

    /// 业务字段: module -> table -> field, field codes unique per table
    pub fn business_fields() -> Self {
        Self {
            key: "tree_business".to_string(),
            title: "业务字段".to_string(),
            code_scope: CodeScope::PerParent,
            delete_mode: DeleteMode::Block,
            seed: seed_business,
        }
    }

    /// Override the storage key (e.g. from configuration)
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Default forest used when the persisted key is absent or corrupt
    pub fn seed_forest(&self) -> Vec<TreeNode> {
        (self.seed)()
    }
}

fn leaf(id: &str, name: &str, code: &str, sort_order: i64) -> TreeNode {
    branch(id, name, code, sort_order, Vec::new())
}

fn branch(id: &str, name: &str, code: &str, sort_order: i64, children: Vec<TreeNode>) -> TreeNode {
    use chrono::Utc;
    let now = Utc::now();
    TreeNode {
        id: id.into(),
        name: name.to_string(),
        code: code.to_string(),
        english_name: None,
        sort_order,
        parent_id: None,
        remark: None,
        created_at: now,
        updated_at: now,
        children,
    }
}

fn with_english(mut node: TreeNode, english: &str) -> TreeNode {
    node.english_name = Some(english.to_string());
    node
}

fn seed_departments() -> Vec<TreeNode> {
    vec![branch(
        "1",
        "总公司",
        "HQ",
        1,
        vec![
            branch(
                "2",
                "技术部",
                "TECH",
                1,
                vec![leaf("3", "前端团队", "FE", 1)],
            ),
            leaf("4", "市场部", "MARKET", 2),
        ],
    )]
}

fn seed_dictionary() -> Vec<TreeNode> {
    vec![branch(
        "dict_sys",
        "系统字典",
        "SYS",
        1,
        vec![
            with_english(leaf("dict_gender", "性别", "GENDER", 1), "Gender"),
            with_english(leaf("dict_status", "状态", "STATUS", 2), "Status"),
        ],
    )]
}

fn seed_permissions() -> Vec<TreeNode> {
    vec![branch(
        "perm_sys",
        "系统管理",
        "sys",
        1,
        vec![
            branch(
                "perm_user",
                "用户管理",
                "sys:user",
                1,
                vec![
                    leaf("perm_user_list", "用户查询", "sys:user:list", 1),
                    leaf("perm_user_add", "用户新增", "sys:user:add", 2),
                    leaf("perm_user_del", "用户删除", "sys:user:del", 3),
                ],
            ),
            branch(
                "perm_dept",
                "部门管理",
                "sys:dept",
                2,
                vec![leaf("perm_dept_list", "部门查询", "sys:dept:list", 1)],
            ),
        ],
    )]
}

fn seed_business() -> Vec<TreeNode> {
    vec![branch(
        "mod_crm",
        "客户管理",
        "crm",
        1,
        vec![branch(
            "tbl_customer",
            "客户表",
            "crm_customer",
            1,
            vec![
                leaf("fld_name", "客户名称", "name", 1),
                leaf("fld_phone", "联系电话", "phone", 2),
            ],
        )],
    )]
}

use thiserror::Error;

/// Tree operation error types
///
/// Every variant is recoverable: callers surface the message to the user
/// and leave the in-memory forest untouched. Nothing here should ever
/// take the page down.
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("duplicate code in scope: {code}")]
    DuplicateCode { code: String },

    #[error("node not found: {0}")]
    NotFound(String),

    #[error("move would place the node under its own descendant")]
    Cycle,

    #[error("node still has children: {0}")]
    HasChildren(String),

    #[error("node is referenced by other records: {0}")]
    Referenced(String),

    #[error("persistence failed: {0}")]
    Persistence(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TreeError {
    /// True when the error is a guard/validation rejection rather than a
    /// storage fault, i.e. the forest was provably not touched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            TreeError::Validation(_)
                | TreeError::DuplicateCode { .. }
                | TreeError::NotFound(_)
                | TreeError::Cycle
                | TreeError::HasChildren(_)
                | TreeError::Referenced(_)
        )
    }
}

/// Result type alias for tree operations
pub type TreeResult<T> = Result<T, TreeError>;

/// Helper trait for converting Option to TreeError::NotFound
pub trait OptionExt<T> {
    fn ok_or_not_found(self, id: impl Into<String>) -> TreeResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, id: impl Into<String>) -> TreeResult<T> {
        self.ok_or_else(|| TreeError::NotFound(id.into()))
    }
}

//! Admintree - hierarchical tree data management for admin consoles
//!
//! This crate provides the tree subsystem shared by the console's
//! hierarchical features (departments, dictionary categories, role
//! permissions, business-field schema): an arena-backed store with
//! pluggable persistence, validated structural mutations, search-driven
//! auto-expansion and tri-state checkbox propagation.
//!
//! All operations are synchronous and run on the UI event loop; there
//! is no network I/O and no locking. A typical feature page does:
//!
//! ```
//! use admintree::{no_references, MemoryStore, NewNode, TreeProfile, TreeStore};
//!
//! let mut store = TreeStore::open(TreeProfile::departments(), Box::new(MemoryStore::new()));
//! let id = store
//!     .add_node(
//!         NewNode { name: "人事部".into(), code: "HR".into(), ..Default::default() },
//!         None,
//!     )
//!     .unwrap();
//! let view = store.project("人事");
//! assert_eq!(view.forest.len(), 1);
//! store.delete_node(&id, &no_references).unwrap();
//! ```

pub mod arena;
pub mod config;
pub mod engine;
pub mod error;
pub mod node;
pub mod notify;
pub mod persist;
pub mod profile;
pub mod project;
pub mod select;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use arena::TreeArena;
pub use config::{init_tracing, LogConfig, TreeConfig};
pub use engine::{no_references, ReferenceGuard};
pub use error::{TreeError, TreeResult};
pub use node::{NewNode, NodeId, NodePatch, NodeRecord, TreeNode};
pub use notify::{Confirmer, MessageKind, Notifier, RecordingUi, TracingUi};
pub use persist::{ForestStore, JsonFileStore, MemoryStore};
pub use profile::{CodeScope, DeleteMode, TreeProfile};
pub use project::{project, Projection};
pub use select::CheckedSet;
pub use store::TreeStore;

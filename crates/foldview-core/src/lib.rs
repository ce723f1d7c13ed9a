//! # foldview-core
//!
//! Core crate for Foldview. Contains the adapter traits consumed by the
//! tree builder (nested-set store, item store, structure clock, cache),
//! the tree node read model, configuration schemas, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other Foldview crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
pub use types::node::TreeNode;

/// Identifier of a folder in the nested-set tree.
///
/// `0` is reserved for the virtual root above all top-level folders.
pub type NodeId = i64;

/// The virtual root node id.
pub const ROOT_NODE_ID: NodeId = 0;

//! Shared read models.

pub mod node;

pub use node::TreeNode;

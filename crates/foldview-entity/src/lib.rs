//! # foldview-entity
//!
//! Domain models for Foldview: the per-request permission context, the
//! classification a node receives, and the semantic output nodes handed
//! to the tree widget. All models derive `Debug`, `Clone`, `Serialize`
//! and `Deserialize`.

pub mod classification;
pub mod output;
pub mod permission;

pub use classification::{Category, Classification};
pub use output::{DisplayLabel, FolderClass, NodeHint, OutputNode, ParentRef};
pub use permission::PermissionContext;

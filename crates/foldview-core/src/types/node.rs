//! Nested-set tree node read model.

use serde::{Deserialize, Serialize};

use crate::NodeId;

/// A folder row as stored in the nested-set tree.
///
/// Owned by the tree store; the builder only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Unique folder identifier.
    pub id: NodeId,
    /// Parent folder ID (`0` for top-level folders).
    #[serde(default)]
    pub parent_id: NodeId,
    /// Stored title. Personal folders store the owner's user id here.
    #[serde(default)]
    pub title: String,
    /// Left nested-set bound.
    #[serde(default)]
    pub nleft: i64,
    /// Right nested-set bound.
    #[serde(default)]
    pub nright: i64,
    /// Nesting level (1 for top-level folders).
    #[serde(default = "default_level")]
    pub nlevel: i32,
    /// Whether the folder is flagged as a personal folder.
    #[serde(default)]
    pub personal_folder: bool,
    /// Icon shown for the folder.
    #[serde(default)]
    pub icon: Option<String>,
    /// Icon shown while the folder is selected.
    #[serde(default)]
    pub icon_selected: Option<String>,
}

fn default_level() -> i32 {
    1
}

//! Semantic output nodes handed to the tree widget.
//!
//! The output carries meaning only (labels, flags, counts). Turning it into
//! markup is the caller's concern.

use serde::{Deserialize, Serialize};

use foldview_core::NodeId;

use crate::classification::Category;

/// Where an output node attaches in the rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentRef {
    /// Attached to the widget's root.
    Root,
    /// Attached under another emitted node.
    Node(NodeId),
}

impl ParentRef {
    /// Parent reference for a stored parent id (`0` means root).
    pub fn from_parent_id(parent_id: NodeId) -> Self {
        if parent_id == foldview_core::ROOT_NODE_ID {
            Self::Root
        } else {
            Self::Node(parent_id)
        }
    }

    /// The referenced node id, if any.
    pub fn node_id(self) -> Option<NodeId> {
        match self {
            Self::Root => None,
            Self::Node(id) => Some(id),
        }
    }
}

/// Drag-and-drop style of the folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderClass {
    /// Regular folder, accepts drops.
    Folder,
    /// Folder that does not accept drops.
    FolderNotDroppable,
}

/// Tooltip hint attached to a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeHint {
    /// The account or folder is read-only.
    ReadOnlyAccount,
    /// The folder is shown but cannot be opened.
    NoAccess,
}

/// Label fields of an output node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLabel {
    /// Title to display.
    pub title: String,
    /// Whether this is the current user's personal root folder.
    pub is_personal: bool,
    /// Whether the folder is read-only for the user.
    pub is_read_only: bool,
    /// Whether the folder is shown but blocked.
    pub is_blocked: bool,
    /// Eye marker for view-only access; replaces the allow-list badge.
    #[serde(default)]
    pub eye_badge: bool,
    /// Badge count (active items, or allow-list size).
    pub badge_count: Option<u64>,
    /// Active items across accessible descendants, when counters are enabled.
    pub descendant_badge_count: Option<u64>,
    /// Number of descendant folders, when counters are enabled.
    pub descendant_folder_count: Option<u64>,
}

/// One node of the built tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputNode {
    /// Folder id.
    pub id: NodeId,
    /// Attachment point in the rendered tree.
    pub parent: ParentRef,
    /// Visibility category the node was emitted with.
    pub category: Category,
    /// Label fields.
    pub label: DisplayLabel,
    /// Whether the folder only exposes a subset of its content.
    pub restricted: bool,
    /// Drag-and-drop style.
    pub folder_class: FolderClass,
    /// Whether edit actions are offered.
    pub can_edit: bool,
    /// Whether the folder id is one of the user's personal folders.
    pub in_personal_folders: bool,
    /// Whether the folder has child folders in the store.
    pub has_children: bool,
    /// Icon hint.
    pub icon: Option<String>,
    /// Icon hint while selected.
    pub icon_selected: Option<String>,
    /// Tooltip hint.
    pub hint: Option<NodeHint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_ref_from_parent_id() {
        assert_eq!(ParentRef::from_parent_id(0), ParentRef::Root);
        assert_eq!(ParentRef::from_parent_id(12), ParentRef::Node(12));
        assert_eq!(ParentRef::Node(12).node_id(), Some(12));
        assert_eq!(ParentRef::Root.node_id(), None);
    }

    #[test]
    fn test_parent_ref_serialization() {
        assert_eq!(serde_json::to_string(&ParentRef::Root).unwrap(), "\"root\"");
        assert_eq!(
            serde_json::to_string(&ParentRef::Node(5)).unwrap(),
            "{\"node\":5}"
        );
    }
}

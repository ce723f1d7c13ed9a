//! Reparenting of folders below hidden ancestors.
//!
//! When a folder is not emitted, its descendants that are emitted attach to
//! the nearest emitted ancestor instead (or to the root). The state is scoped
//! to one branch of the walk: each child inherits the state its parent left,
//! so a hidden folder never affects its siblings' subtrees.

use foldview_core::TreeNode;
use foldview_entity::output::ParentRef;

/// Collapse state inherited along one branch of the walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollapseState {
    /// Where descendants of the most recent hidden folder attach.
    last_visible_parent: Option<ParentRef>,
    /// Level of that hidden folder.
    last_visible_parent_level: i32,
}

/// Outcome of visiting one folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Parent the folder attaches to if it is emitted.
    pub parent: ParentRef,
    /// State handed to the folder's children.
    pub child_state: CollapseState,
}

impl CollapseState {
    /// State at the top of the tree: nothing hidden yet.
    pub fn root() -> Self {
        Self::default()
    }

    /// Places `node` and derives the state for its children.
    ///
    /// `emitted` tells whether the node itself appears in the output.
    pub fn visit(self, node: &TreeNode, emitted: bool) -> Placement {
        let active = match self.last_visible_parent {
            Some(parent) if node.nlevel > self.last_visible_parent_level => Some(parent),
            _ => None,
        };
        let parent = active.unwrap_or_else(|| ParentRef::from_parent_id(node.parent_id));

        let child_state = if emitted {
            Self::default()
        } else {
            Self {
                last_visible_parent: Some(parent),
                last_visible_parent_level: node.nlevel,
            }
        };

        Placement {
            parent,
            child_state,
        }
    }
}

//! Structural checks on built trees.

use std::collections::HashSet;

use foldview_core::NodeId;
use foldview_core::error::AppError;
use foldview_core::result::AppResult;
use foldview_entity::output::{OutputNode, ParentRef};

/// Checks that every parent reference resolves.
///
/// A reference is valid when it is `Root`, points to a node emitted
/// earlier in the sequence, or points to `anchor` (the folder a children
/// slice was requested for, which the caller already holds).
pub fn verify_parent_refs(nodes: &[OutputNode], anchor: Option<NodeId>) -> AppResult<()> {
    let mut seen: HashSet<NodeId> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if let ParentRef::Node(parent) = node.parent {
            if !seen.contains(&parent) && anchor != Some(parent) {
                return Err(AppError::validation(format!(
                    "Folder {} references parent {parent} which is not in the tree",
                    node.id
                )));
            }
        }
        if !seen.insert(node.id) {
            return Err(AppError::validation(format!(
                "Folder {} appears twice in the tree",
                node.id
            )));
        }
    }
    Ok(())
}

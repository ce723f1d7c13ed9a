//! Cache layout for tree results.
//!
//! The trees of one session form a group under `tree:{session}`; each build
//! mode fills one slot of that group. Backends add their own namespace
//! prefix.

use foldview_core::NodeId;

/// Segment shared by all session groups.
const TREE: &str = "tree";

/// Slot holding the full tree.
pub const FULL_SLOT: &str = "full";

/// Group key of one session.
pub fn session_key(session: &str) -> String {
    format!("{TREE}:{session}")
}

/// Slot holding the children slice of `node_id`.
pub fn children_slot(node_id: NodeId) -> String {
    format!("node:{node_id}")
}

/// Flat key of one slot, for backends without nested maps.
pub fn slot_key(session: &str, slot: &str) -> String {
    format!("{}:{slot}", session_key(session))
}

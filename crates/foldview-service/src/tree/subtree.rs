//! One-pass subtree snapshot used by both build modes.
//!
//! The whole subtree below an anchor folder is read with a single
//! `get_descendants` call, item counts are fetched in one batch, and the
//! per-folder aggregates (accessible descendant, folder and item roll-ups)
//! are summed from the leaves up by walking the pre-order list backwards.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use foldview_core::result::AppResult;
use foldview_core::traits::tree_store::NestedTreeStore;
use foldview_core::{NodeId, ROOT_NODE_ID, TreeNode};
use foldview_entity::permission::PermissionContext;

use super::counter::ItemCounter;

/// Aggregates over a folder's subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtreeSummary {
    /// Some folder strictly below is one the user can open.
    pub accessible_below: bool,
    /// Number of folders strictly below.
    pub folders_below: u64,
    /// Active items in the folder and the descendants the user can open.
    pub accessible_items: u64,
}

/// Folders below an anchor, keyed by id, with their summaries.
#[derive(Debug, Default)]
pub struct SubtreeIndex {
    nodes: HashMap<NodeId, TreeNode>,
    children: HashMap<NodeId, Vec<NodeId>>,
    summaries: HashMap<NodeId, SubtreeSummary>,
    items: HashMap<NodeId, u64>,
}

impl SubtreeIndex {
    /// Loads every folder strictly below `anchor` (`0` for the whole tree).
    ///
    /// Item counts are fetched for the folders that can show one: every
    /// folder the user can open when counters are on, otherwise only the
    /// visible folders that the requested mode can emit.
    pub async fn load(
        tree: &dyn NestedTreeStore,
        counter: &ItemCounter,
        ctx: &PermissionContext,
        anchor: NodeId,
    ) -> AppResult<Self> {
        let nodes = tree.get_descendants(anchor, false, false).await?;

        let wanted: Vec<NodeId> = nodes
            .iter()
            .filter(|n| {
                if ctx.counters_enabled {
                    ctx.is_accessible_target(n.id)
                } else {
                    ctx.is_visible(n.id) && (anchor == ROOT_NODE_ID || n.parent_id == anchor)
                }
            })
            .map(|n| n.id)
            .collect();
        let items = counter.active_items(&wanted).await;

        let index = Self::from_preorder(nodes, items, ctx, anchor);
        debug!(
            anchor,
            folders = index.nodes.len(),
            counted = wanted.len(),
            "Loaded folder subtree"
        );
        Ok(index)
    }

    /// Builds the index from a pre-order folder list.
    fn from_preorder(
        nodes: Vec<TreeNode>,
        items: HashMap<NodeId, u64>,
        ctx: &PermissionContext,
        anchor: NodeId,
    ) -> Self {
        let total = nodes.len();
        let mut seen: HashSet<NodeId> = HashSet::with_capacity(total);
        let nodes: Vec<TreeNode> = nodes.into_iter().filter(|n| seen.insert(n.id)).collect();
        if nodes.len() < total {
            warn!(anchor, duplicates = total - nodes.len(), "Skipping duplicate folder rows");
        }

        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for node in &nodes {
            children.entry(node.parent_id).or_default().push(node.id);
        }

        // Children follow their parent in pre-order, so walking backwards
        // completes every child before its parent is read.
        let mut summaries: HashMap<NodeId, SubtreeSummary> = HashMap::with_capacity(nodes.len());
        for node in nodes.iter().rev() {
            let target = ctx.is_accessible_target(node.id);
            let summary = {
                let entry = summaries.entry(node.id).or_default();
                if target {
                    entry.accessible_items = entry
                        .accessible_items
                        .saturating_add(items.get(&node.id).copied().unwrap_or(0));
                }
                *entry
            };
            if node.parent_id == anchor {
                continue;
            }
            let parent = summaries.entry(node.parent_id).or_default();
            parent.accessible_below |= target || summary.accessible_below;
            parent.folders_below += summary.folders_below + 1;
            parent.accessible_items = parent
                .accessible_items
                .saturating_add(summary.accessible_items);
        }

        let nodes: HashMap<NodeId, TreeNode> = nodes.into_iter().map(|n| (n.id, n)).collect();
        let unreachable = children
            .keys()
            .filter(|parent| **parent != anchor && !nodes.contains_key(parent))
            .count();
        if unreachable > 0 {
            warn!(anchor, unreachable, "Folders listed under a missing parent are skipped");
        }

        Self {
            nodes,
            children,
            summaries,
            items,
        }
    }

    /// A loaded folder.
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    /// Child ids of a folder in sibling order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Aggregates for a folder; empty for unknown ids.
    pub fn summary(&self, id: NodeId) -> SubtreeSummary {
        self.summaries.get(&id).copied().unwrap_or_default()
    }

    /// Active items stored directly in a folder.
    pub fn active_items(&self, id: NodeId) -> u64 {
        self.items.get(&id).copied().unwrap_or(0)
    }
}

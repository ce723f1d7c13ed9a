//! In-memory nested-set tree.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tracing::{debug, warn};

use foldview_core::result::AppResult;
use foldview_core::traits::tree_store::NestedTreeStore;
use foldview_core::{NodeId, ROOT_NODE_ID, TreeNode};

/// Nested-set tree held in memory.
///
/// Bounds and levels are recomputed from the parent links on construction,
/// so callers only need to supply ids, parents and titles. Sibling order is
/// the order in which nodes were supplied.
#[derive(Debug, Clone, Default)]
pub struct MemoryNestedTree {
    /// Nodes in pre-order (ascending left bound).
    nodes: Vec<TreeNode>,
    /// Node id to position in `nodes`.
    index: HashMap<NodeId, usize>,
    /// Ordered child ids per parent, including the virtual root.
    children: HashMap<NodeId, Vec<NodeId>>,
}

enum Step {
    Enter(TreeNode, i32),
    Exit(usize),
}

impl MemoryNestedTree {
    /// Builds the tree from a flat node list.
    ///
    /// Nodes unreachable from the root (orphans, cycles) and duplicate ids
    /// are dropped with a warning.
    pub fn from_nodes(nodes: Vec<TreeNode>) -> Self {
        let total = nodes.len();
        let mut by_parent: HashMap<NodeId, Vec<TreeNode>> = HashMap::new();
        for node in nodes {
            by_parent.entry(node.parent_id).or_default().push(node);
        }

        let mut ordered: Vec<TreeNode> = Vec::with_capacity(total);
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut bound = 0i64;

        let top_level = by_parent.remove(&ROOT_NODE_ID).unwrap_or_default();
        let mut stack: Vec<Step> = top_level
            .into_iter()
            .rev()
            .map(|n| Step::Enter(n, 1))
            .collect();

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(mut node, level) => {
                    if node.id == ROOT_NODE_ID || !seen.insert(node.id) {
                        warn!(id = node.id, "Skipping duplicate folder id");
                        continue;
                    }
                    children.entry(node.parent_id).or_default().push(node.id);
                    bound += 1;
                    node.nleft = bound;
                    node.nlevel = level;

                    let kids = by_parent.remove(&node.id).unwrap_or_default();

                    let position = ordered.len();
                    ordered.push(node);
                    stack.push(Step::Exit(position));
                    stack.extend(kids.into_iter().rev().map(|k| Step::Enter(k, level + 1)));
                }
                Step::Exit(position) => {
                    bound += 1;
                    ordered[position].nright = bound;
                }
            }
        }

        let dropped: usize = by_parent.values().map(Vec::len).sum();
        if dropped > 0 {
            warn!(dropped, "Dropped folders unreachable from the root");
        }
        debug!(folders = ordered.len(), "Built in-memory nested-set tree");

        let mut tree = Self {
            nodes: ordered,
            index: HashMap::new(),
            children,
        };
        tree.reindex();
        tree
    }

    /// Number of folders in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no folders.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Removes a node record while leaving it listed under its parent.
    ///
    /// Reproduces a folder deleted between two reads of a live store: the
    /// parent's child list still names it but the node itself is gone.
    pub fn forget_node(&mut self, id: NodeId) {
        if let Some(position) = self.index.get(&id).copied() {
            self.nodes.remove(position);
            self.reindex();
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.id, position))
            .collect();
    }

    /// Pre-order slice of a node and its descendants.
    fn subtree(&self, id: NodeId) -> &[TreeNode] {
        if id == ROOT_NODE_ID {
            return &self.nodes;
        }
        let Some(&start) = self.index.get(&id) else {
            return &[];
        };
        let right = self.nodes[start].nright;
        let len = self.nodes[start..]
            .iter()
            .take_while(|n| n.nright <= right)
            .count();
        &self.nodes[start..start + len]
    }
}

#[async_trait]
impl NestedTreeStore for MemoryNestedTree {
    async fn get_node(&self, id: NodeId) -> AppResult<Option<TreeNode>> {
        Ok(self.index.get(&id).map(|&position| self.nodes[position].clone()))
    }

    async fn get_children(&self, id: NodeId) -> AppResult<Vec<NodeId>> {
        Ok(self.children.get(&id).cloned().unwrap_or_default())
    }

    async fn get_descendants(
        &self,
        id: NodeId,
        include_self: bool,
        direct_only: bool,
    ) -> AppResult<Vec<TreeNode>> {
        let subtree = self.subtree(id);
        let result = subtree
            .iter()
            .filter(|n| {
                if n.id == id {
                    include_self
                } else {
                    !direct_only || n.parent_id == id
                }
            })
            .cloned()
            .collect();
        Ok(result)
    }

    async fn count_descendants(&self, id: NodeId) -> AppResult<u64> {
        let subtree = self.subtree(id);
        let own = usize::from(id != ROOT_NODE_ID && !subtree.is_empty());
        Ok((subtree.len() - own) as u64)
    }
}

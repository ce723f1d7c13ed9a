//! Read-only query interface over the nested-set folder tree.

use async_trait::async_trait;

use crate::NodeId;
use crate::result::AppResult;
use crate::types::node::TreeNode;

/// Queries the builder needs from the nested-set tree store.
///
/// Node id `0` addresses the virtual root: its children are the top-level
/// folders and its descendants are the whole tree. Implementations never
/// mutate the tree.
#[async_trait]
pub trait NestedTreeStore: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch a single node. Returns `None` for unknown ids and for `0`.
    async fn get_node(&self, id: NodeId) -> AppResult<Option<TreeNode>>;

    /// Ordered ids of the direct children of a node.
    async fn get_children(&self, id: NodeId) -> AppResult<Vec<NodeId>>;

    /// Descendants of a node in pre-order (nested-set left bound order).
    ///
    /// `include_self` prepends the node itself; `direct_only` restricts the
    /// result to the first generation.
    async fn get_descendants(
        &self,
        id: NodeId,
        include_self: bool,
        direct_only: bool,
    ) -> AppResult<Vec<TreeNode>>;

    /// Same as [`NestedTreeStore::get_descendants`] but only returns ids.
    async fn get_descendant_ids(
        &self,
        id: NodeId,
        include_self: bool,
        direct_only: bool,
    ) -> AppResult<Vec<NodeId>> {
        let nodes = self.get_descendants(id, include_self, direct_only).await?;
        Ok(nodes.into_iter().map(|n| n.id).collect())
    }

    /// Number of descendants of a node, excluding the node itself.
    async fn count_descendants(&self, id: NodeId) -> AppResult<u64>;
}

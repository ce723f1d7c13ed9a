//! Item and folder counts shown next to folders.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use foldview_core::NodeId;
use foldview_core::traits::item_store::ItemStore;
use foldview_entity::classification::{Category, Classification};
use foldview_entity::permission::PermissionContext;

use super::subtree::SubtreeIndex;

/// Counts attached to one folder label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    /// Active items, or the allow-list size for limited folders.
    pub badge_count: Option<u64>,
    /// Active items across the accessible part of the subtree.
    pub descendant_badge_count: Option<u64>,
    /// Number of descendant folders.
    pub descendant_folder_count: Option<u64>,
}

impl LabelCounts {
    /// All counts for an emitted folder.
    pub fn for_folder(
        index: &SubtreeIndex,
        folder_id: NodeId,
        classification: &Classification,
        ctx: &PermissionContext,
    ) -> Self {
        let badge_count = match classification.category {
            Category::Visible | Category::ReadOnly => Some(index.active_items(folder_id)),
            Category::LimitedAccess | Category::RestrictedItems => classification.allow_list_count,
            _ => None,
        };

        if !ctx.counters_enabled {
            return Self {
                badge_count,
                ..Self::default()
            };
        }

        let summary = index.summary(folder_id);
        Self {
            badge_count,
            descendant_badge_count: Some(summary.accessible_items),
            descendant_folder_count: Some(summary.folders_below),
        }
    }
}

/// Loads active item counts. A failing lookup counts as zero and never
/// aborts the build.
#[derive(Debug, Clone)]
pub struct ItemCounter {
    /// Item store.
    items: Arc<dyn ItemStore>,
}

impl ItemCounter {
    /// Creates a new item counter.
    pub fn new(items: Arc<dyn ItemStore>) -> Self {
        Self { items }
    }

    /// Active items per folder in one batch.
    ///
    /// When the batch fails each folder is counted on its own, so a broken
    /// folder only zeroes its own count.
    pub async fn active_items(&self, folder_ids: &[NodeId]) -> HashMap<NodeId, u64> {
        if folder_ids.is_empty() {
            return HashMap::new();
        }
        match self.items.count_active_items_batch(folder_ids).await {
            Ok(counts) => counts,
            Err(e) => {
                warn!(
                    folders = folder_ids.len(),
                    error = %e,
                    "Batched item count failed, counting folders one by one"
                );
                let mut counts = HashMap::with_capacity(folder_ids.len());
                for &folder_id in folder_ids {
                    counts.insert(folder_id, self.active_items_of(folder_id).await);
                }
                counts
            }
        }
    }

    async fn active_items_of(&self, folder_id: NodeId) -> u64 {
        match self.items.count_active_items(folder_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(folder_id, error = %e, "Item count failed, showing 0");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use foldview_core::{ROOT_NODE_ID, TreeNode};
    use foldview_store::{MemoryItemStore, MemoryNestedTree};

    fn folder(id: NodeId, parent_id: NodeId) -> TreeNode {
        TreeNode {
            id,
            parent_id,
            title: format!("f{id}"),
            nleft: 0,
            nright: 0,
            nlevel: 1,
            personal_folder: false,
            icon: None,
            icon_selected: None,
        }
    }

    fn classification(category: Category, allow_list_count: Option<u64>) -> Classification {
        Classification {
            category,
            allow_list_count,
            is_personal_folder: false,
            display_title: String::new(),
            eye_badge: false,
        }
    }

    async fn index(items: MemoryItemStore, ctx: &PermissionContext) -> SubtreeIndex {
        // 1 -> 2 -> 3, 1 -> 4
        let tree = MemoryNestedTree::from_nodes(vec![
            folder(1, 0),
            folder(2, 1),
            folder(3, 2),
            folder(4, 1),
        ]);
        let counter = ItemCounter::new(Arc::new(items));
        SubtreeIndex::load(&tree, &counter, ctx, ROOT_NODE_ID)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_badge_per_category() {
        let ctx = PermissionContext {
            visible_groups: HashSet::from([1]),
            ..PermissionContext::default()
        };
        let index = index(MemoryItemStore::new(HashMap::from([(1, 5)])), &ctx).await;

        let visible =
            LabelCounts::for_folder(&index, 1, &classification(Category::ReadOnly, None), &ctx);
        assert_eq!(visible.badge_count, Some(5));
        assert_eq!(visible.descendant_badge_count, None);

        let limited = LabelCounts::for_folder(
            &index,
            1,
            &classification(Category::LimitedAccess, Some(2)),
            &ctx,
        );
        assert_eq!(limited.badge_count, Some(2));

        let blocked = LabelCounts::for_folder(
            &index,
            1,
            &classification(Category::BlockedVisible, None),
            &ctx,
        );
        assert_eq!(blocked.badge_count, None);
    }

    #[tokio::test]
    async fn test_descendant_counters_only_sum_accessible_folders() {
        let ctx = PermissionContext {
            counters_enabled: true,
            visible_groups: HashSet::from([1, 3]),
            restricted_folders_for_items: HashMap::from([(4, HashSet::from([9]))]),
            ..PermissionContext::default()
        };
        let items = MemoryItemStore::new(HashMap::from([(1, 1), (2, 10), (3, 100), (4, 1000)]));
        let index = index(items, &ctx).await;

        let counts =
            LabelCounts::for_folder(&index, 1, &classification(Category::Visible, None), &ctx);
        assert_eq!(counts.badge_count, Some(1));
        assert_eq!(counts.descendant_badge_count, Some(1101));
        assert_eq!(counts.descendant_folder_count, Some(3));
    }

    #[tokio::test]
    async fn test_failed_batch_only_zeroes_the_broken_folder() {
        let store = MemoryItemStore::new(HashMap::from([(1, 4), (2, 3)])).with_failure(2);
        let counter = ItemCounter::new(Arc::new(store));
        let counts = counter.active_items(&[1, 2]).await;
        assert_eq!(counts, HashMap::from([(1, 4), (2, 0)]));
        assert!(counter.active_items(&[]).await.is_empty());
    }
}

//! Item counting and structure-change tracking interfaces.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::NodeId;
use crate::result::AppResult;

/// Read-only counts over the item store.
#[async_trait]
pub trait ItemStore: Send + Sync + std::fmt::Debug + 'static {
    /// Number of active (non-deleted) items stored directly in a folder.
    async fn count_active_items(&self, folder_id: NodeId) -> AppResult<u64>;

    /// Active item counts for many folders in one lookup.
    ///
    /// Folders without items may be missing from the map.
    async fn count_active_items_batch(
        &self,
        folder_ids: &[NodeId],
    ) -> AppResult<HashMap<NodeId, u64>>;
}

/// Source of the global "last folder structure change" timestamp.
///
/// Any folder creation, move, rename or deletion bumps this value; cached
/// trees built before it are stale.
#[async_trait]
pub trait StructureClock: Send + Sync + std::fmt::Debug + 'static {
    /// When the folder structure last changed, if it ever did.
    async fn last_structure_change(&self) -> AppResult<Option<DateTime<Utc>>>;
}

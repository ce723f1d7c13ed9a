//! In-memory item counts and structure clock.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use foldview_core::NodeId;
use foldview_core::error::AppError;
use foldview_core::result::AppResult;
use foldview_core::traits::item_store::{ItemStore, StructureClock};

/// Active item counts per folder.
#[derive(Debug, Clone, Default)]
pub struct MemoryItemStore {
    /// Active items per folder id.
    counts: HashMap<NodeId, u64>,
    /// Folders whose lookup fails, for exercising degraded stores.
    failing: HashSet<NodeId>,
}

impl MemoryItemStore {
    /// Creates a store from per-folder counts.
    pub fn new(counts: HashMap<NodeId, u64>) -> Self {
        Self {
            counts,
            failing: HashSet::new(),
        }
    }

    /// Makes lookups for `folder_id` fail with a database error.
    pub fn with_failure(mut self, folder_id: NodeId) -> Self {
        self.failing.insert(folder_id);
        self
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn count_active_items(&self, folder_id: NodeId) -> AppResult<u64> {
        if self.failing.contains(&folder_id) {
            return Err(AppError::database(format!(
                "Item count unavailable for folder {folder_id}"
            )));
        }
        Ok(self.counts.get(&folder_id).copied().unwrap_or(0))
    }

    async fn count_active_items_batch(
        &self,
        folder_ids: &[NodeId],
    ) -> AppResult<HashMap<NodeId, u64>> {
        if let Some(id) = folder_ids.iter().find(|id| self.failing.contains(id)) {
            return Err(AppError::database(format!(
                "Item count unavailable for folder {id}"
            )));
        }
        Ok(folder_ids
            .iter()
            .filter_map(|id| self.counts.get(id).map(|count| (*id, *count)))
            .collect())
    }
}

/// Structure-change timestamp held in memory.
#[derive(Debug, Default)]
pub struct MemoryStructureClock {
    /// Last structure change.
    last_change: RwLock<Option<DateTime<Utc>>>,
}

impl MemoryStructureClock {
    /// Creates a clock with an initial timestamp.
    pub fn new(last_change: Option<DateTime<Utc>>) -> Self {
        Self {
            last_change: RwLock::new(last_change),
        }
    }

    /// Records a structure change at `at`.
    pub async fn record_change(&self, at: DateTime<Utc>) {
        *self.last_change.write().await = Some(at);
    }

    /// Records a structure change now.
    pub async fn touch(&self) {
        self.record_change(Utc::now()).await;
    }
}

#[async_trait]
impl StructureClock for MemoryStructureClock {
    async fn last_structure_change(&self) -> AppResult<Option<DateTime<Utc>>> {
        Ok(*self.last_change.read().await)
    }
}

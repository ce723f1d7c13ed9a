//! JSON snapshots of a folder tree.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use foldview_core::result::AppResult;
use foldview_core::{NodeId, TreeNode};

use super::items::{MemoryItemStore, MemoryStructureClock};
use super::tree::MemoryNestedTree;

/// A point-in-time dump of the folder tree and its item counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// Folder rows, siblings in display order.
    #[serde(default)]
    pub folders: Vec<TreeNode>,
    /// Active item count per folder id.
    #[serde(default)]
    pub active_items: HashMap<NodeId, u64>,
    /// Last structure change recorded with the dump.
    #[serde(default)]
    pub last_structure_change: Option<DateTime<Utc>>,
}

impl TreeSnapshot {
    /// Parses a snapshot from JSON.
    pub fn from_json(source: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Reads a snapshot file.
    pub async fn load(path: &Path) -> AppResult<Self> {
        let source = tokio::fs::read_to_string(path).await?;
        Self::from_json(&source)
    }

    /// Splits the snapshot into the three in-memory stores.
    pub fn into_stores(self) -> (MemoryNestedTree, MemoryItemStore, MemoryStructureClock) {
        (
            MemoryNestedTree::from_nodes(self.folders),
            MemoryItemStore::new(self.active_items),
            MemoryStructureClock::new(self.last_structure_change),
        )
    }
}

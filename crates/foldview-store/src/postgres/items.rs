//! Item counts and the folder structure clock from PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use foldview_core::NodeId;
use foldview_core::error::{AppError, ErrorKind};
use foldview_core::result::AppResult;
use foldview_core::traits::item_store::{ItemStore, StructureClock};

use super::connection::DatabasePool;

/// Counts non-deleted items in the `items` table.
#[derive(Debug, Clone)]
pub struct PgItemStore {
    db: DatabasePool,
    table: String,
}

impl PgItemStore {
    /// Create a store over `{prefix}items`.
    pub fn new(db: DatabasePool) -> Self {
        let table = db.table("items");
        Self { db, table }
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn count_active_items(&self, folder_id: NodeId) -> AppResult<u64> {
        let sql = format!(
            "SELECT COUNT(*)::BIGINT FROM {} WHERE inactif = 0 AND id_tree = $1",
            self.table
        );
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(folder_id)
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count folder items", e)
            })?;
        Ok(count.max(0) as u64)
    }

    async fn count_active_items_batch(
        &self,
        folder_ids: &[NodeId],
    ) -> AppResult<HashMap<NodeId, u64>> {
        if folder_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let sql = format!(
            "SELECT id_tree::BIGINT, COUNT(*)::BIGINT FROM {} \
             WHERE inactif = 0 AND id_tree = ANY($1) GROUP BY id_tree",
            self.table
        );
        let rows = sqlx::query_as::<_, (i64, i64)>(&sql)
            .bind(folder_ids)
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count folder items", e)
            })?;
        debug!(folders = folder_ids.len(), rows = rows.len(), "Counted folder items");
        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, count.max(0) as u64))
            .collect())
    }
}

/// Reads the `last_folder_change` timestamp from the `misc` table.
#[derive(Debug, Clone)]
pub struct PgStructureClock {
    db: DatabasePool,
    table: String,
}

impl PgStructureClock {
    /// Create a clock over `{prefix}misc`.
    pub fn new(db: DatabasePool) -> Self {
        let table = db.table("misc");
        Self { db, table }
    }
}

#[async_trait]
impl StructureClock for PgStructureClock {
    async fn last_structure_change(&self) -> AppResult<Option<DateTime<Utc>>> {
        let sql = format!(
            "SELECT valeur FROM {} WHERE type = 'timestamp' AND intitule = 'last_folder_change'",
            self.table
        );
        let value: Option<String> = sqlx::query_scalar(&sql)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to read structure clock", e)
            })?;

        Ok(value.and_then(|v| parse_unix_timestamp(&v)))
    }
}

/// Parse a unix-seconds string; blank or malformed values read as "never".
fn parse_unix_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let secs = match trimmed.parse::<i64>() {
        Ok(secs) => secs,
        Err(_) => {
            debug!(value = %trimmed, "Ignoring malformed last_folder_change value");
            return None;
        }
    };
    DateTime::from_timestamp(secs, 0)
}

//! Nested-set tree queries over the `nested_tree` table.

use async_trait::async_trait;
use sqlx::FromRow;

use foldview_core::error::{AppError, ErrorKind};
use foldview_core::result::AppResult;
use foldview_core::traits::tree_store::NestedTreeStore;
use foldview_core::{NodeId, ROOT_NODE_ID, TreeNode};

use super::connection::DatabasePool;

/// Raw `nested_tree` row.
#[derive(Debug, FromRow)]
struct NestedTreeRow {
    id: i64,
    parent_id: i64,
    title: Option<String>,
    nleft: i64,
    nright: i64,
    nlevel: i32,
    personal_folder: i32,
    fa_icon: Option<String>,
    fa_icon_selected: Option<String>,
}

impl From<NestedTreeRow> for TreeNode {
    fn from(row: NestedTreeRow) -> Self {
        Self {
            id: row.id,
            parent_id: row.parent_id,
            title: row.title.unwrap_or_default(),
            nleft: row.nleft,
            nright: row.nright,
            nlevel: row.nlevel,
            personal_folder: row.personal_folder == 1,
            icon: row.fa_icon.filter(|s| !s.is_empty()),
            icon_selected: row.fa_icon_selected.filter(|s| !s.is_empty()),
        }
    }
}

/// Column list with casts matching [`NestedTreeRow`].
fn columns(alias: &str) -> String {
    format!(
        "{a}.id::BIGINT AS id, {a}.parent_id::BIGINT AS parent_id, {a}.title, \
         {a}.nleft::BIGINT AS nleft, {a}.nright::BIGINT AS nright, \
         {a}.nlevel::INT4 AS nlevel, {a}.personal_folder::INT4 AS personal_folder, \
         {a}.fa_icon, {a}.fa_icon_selected",
        a = alias
    )
}

fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Read-only nested-set repository backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgNestedTree {
    db: DatabasePool,
    table: String,
}

impl PgNestedTree {
    /// Create a repository over `{prefix}nested_tree`.
    pub fn new(db: DatabasePool) -> Self {
        let table = db.table("nested_tree");
        Self { db, table }
    }
}

#[async_trait]
impl NestedTreeStore for PgNestedTree {
    async fn get_node(&self, id: NodeId) -> AppResult<Option<TreeNode>> {
        if id == ROOT_NODE_ID {
            return Ok(None);
        }
        let sql = format!("SELECT {} FROM {} t WHERE t.id = $1", columns("t"), self.table);
        let row = sqlx::query_as::<_, NestedTreeRow>(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(db_err("Failed to find folder"))?;
        Ok(row.map(TreeNode::from))
    }

    async fn get_children(&self, id: NodeId) -> AppResult<Vec<NodeId>> {
        let sql = format!(
            "SELECT id::BIGINT FROM {} WHERE parent_id = $1 ORDER BY nleft ASC",
            self.table
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(id)
            .fetch_all(self.db.pool())
            .await
            .map_err(db_err("Failed to list child folders"))
    }

    async fn get_descendants(
        &self,
        id: NodeId,
        include_self: bool,
        direct_only: bool,
    ) -> AppResult<Vec<TreeNode>> {
        let rows = if id == ROOT_NODE_ID {
            let filter = if direct_only { "WHERE d.parent_id = 0" } else { "" };
            let sql = format!(
                "SELECT {} FROM {} d {filter} ORDER BY d.nleft ASC",
                columns("d"),
                self.table
            );
            sqlx::query_as::<_, NestedTreeRow>(&sql)
                .fetch_all(self.db.pool())
                .await
        } else {
            let mut sql = format!(
                "SELECT {} FROM {t} n JOIN {t} d ON d.nleft >= n.nleft AND d.nright <= n.nright \
                 WHERE n.id = $1",
                columns("d"),
                t = self.table
            );
            if !include_self {
                sql.push_str(" AND d.id <> $1");
            }
            if direct_only {
                sql.push_str(" AND (d.parent_id = $1 OR d.id = $1)");
            }
            sql.push_str(" ORDER BY d.nleft ASC");
            sqlx::query_as::<_, NestedTreeRow>(&sql)
                .bind(id)
                .fetch_all(self.db.pool())
                .await
        }
        .map_err(db_err("Failed to list descendant folders"))?;

        Ok(rows.into_iter().map(TreeNode::from).collect())
    }

    async fn count_descendants(&self, id: NodeId) -> AppResult<u64> {
        let count = if id == ROOT_NODE_ID {
            let sql = format!("SELECT COUNT(*)::BIGINT FROM {}", self.table);
            sqlx::query_scalar::<_, i64>(&sql)
                .fetch_one(self.db.pool())
                .await
                .map_err(db_err("Failed to count folders"))?
        } else {
            let sql = format!(
                "SELECT ((nright - nleft - 1) / 2)::BIGINT FROM {} WHERE id = $1",
                self.table
            );
            sqlx::query_scalar::<_, i64>(&sql)
                .bind(id)
                .fetch_optional(self.db.pool())
                .await
                .map_err(db_err("Failed to count descendant folders"))?
                .unwrap_or(0)
        };
        Ok(count.max(0) as u64)
    }
}

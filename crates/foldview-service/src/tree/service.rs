//! Cached tree loading per session.
//!
//! A built tree is stored per (session, mode) and served again until the
//! folder structure changes after the caller's last refresh, or the caller
//! forces a rebuild. Cache failures degrade to a rebuild, never to an error.
//!
//! Cached trees also carry a lifetime: `tree.session_ttl_seconds` is how
//! long a session's trees outlive its last rebuild before the backend drops
//! them (see [`TreeCache`]). An expired session simply rebuilds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use foldview_cache::provider::CacheManager;
use foldview_core::NodeId;
use foldview_core::config::tree::TreeConfig;
use foldview_core::result::AppResult;
use foldview_core::traits::item_store::{ItemStore, StructureClock};
use foldview_core::traits::tree_store::NestedTreeStore;
use foldview_entity::output::OutputNode;
use foldview_entity::permission::PermissionContext;

use super::builder::TreeBuilder;
use super::cache::{CacheEntry, TreeCache};

/// Which slice of the tree to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    /// The whole tree, with collapsing.
    Full,
    /// The direct children of one folder (`0` for the top level).
    Children(NodeId),
}

/// A tree load request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeRequest {
    /// Session the tree is cached under.
    pub session: String,
    /// Slice to build.
    pub mode: BuildMode,
    /// When the caller last received a tree.
    #[serde(default)]
    pub last_refresh: Option<DateTime<Utc>>,
    /// Rebuild even if the cached tree is fresh.
    #[serde(default)]
    pub force_refresh: bool,
}

impl TreeRequest {
    /// Full-tree request without refresh hints.
    pub fn full(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            mode: BuildMode::Full,
            last_refresh: None,
            force_refresh: false,
        }
    }

    /// Children request without refresh hints.
    pub fn children(session: impl Into<String>, node_id: NodeId) -> Self {
        Self {
            mode: BuildMode::Children(node_id),
            ..Self::full(session)
        }
    }
}

/// Result of [`TreeService::load_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLoad {
    /// Tree nodes, in output order.
    pub nodes: Vec<OutputNode>,
    /// When the nodes were built.
    pub built_at: DateTime<Utc>,
    /// Whether the nodes came from the cache.
    pub from_cache: bool,
}

/// Builds and caches per-user folder trees.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Tree builder.
    builder: TreeBuilder,
    /// Structure-change clock.
    clock: Arc<dyn StructureClock>,
    /// Session tree cache.
    cache: TreeCache,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(
        tree: Arc<dyn NestedTreeStore>,
        items: Arc<dyn ItemStore>,
        clock: Arc<dyn StructureClock>,
        cache: Arc<CacheManager>,
        config: &TreeConfig,
    ) -> Self {
        Self {
            builder: TreeBuilder::new(tree, items, config),
            clock,
            cache: TreeCache::new(cache, config),
        }
    }

    /// Builds the whole tree without touching the cache.
    pub async fn build_full_tree(&self, ctx: &PermissionContext) -> AppResult<Vec<OutputNode>> {
        self.builder.build_full(ctx).await
    }

    /// Builds the children of a folder without touching the cache.
    pub async fn build_children(
        &self,
        node_id: NodeId,
        ctx: &PermissionContext,
    ) -> AppResult<Vec<OutputNode>> {
        self.builder.build_children(node_id, ctx).await
    }

    /// Returns the cached tree for the request, rebuilding it when stale.
    pub async fn load_tree(
        &self,
        request: &TreeRequest,
        ctx: &PermissionContext,
    ) -> AppResult<TreeLoad> {
        let cached = self.cache.read(&request.session, request.mode).await;

        if let Some(entry) = cached.as_ref() {
            if !request.force_refresh {
                let last_change = self.last_structure_change().await;
                if !is_stale(entry, request.last_refresh, last_change) {
                    debug!(
                        session = %request.session,
                        nodes = entry.nodes.len(),
                        "Serving cached folder tree"
                    );
                    return Ok(TreeLoad {
                        nodes: entry.nodes.clone(),
                        built_at: entry.built_at,
                        from_cache: true,
                    });
                }
            }
        }

        let nodes = match request.mode {
            BuildMode::Full => self.builder.build_full(ctx).await?,
            BuildMode::Children(node_id) => self.builder.build_children(node_id, ctx).await?,
        };
        let entry = CacheEntry {
            nodes,
            built_at: Utc::now(),
        };

        self.cache
            .write(&request.session, request.mode, &entry)
            .await;
        debug!(
            session = %request.session,
            nodes = entry.nodes.len(),
            forced = request.force_refresh,
            "Rebuilt folder tree"
        );

        Ok(TreeLoad {
            nodes: entry.nodes,
            built_at: entry.built_at,
            from_cache: false,
        })
    }

    /// Drops every cached tree of a session.
    pub async fn invalidate_session(&self, session: &str) -> AppResult<u64> {
        self.cache.invalidate_session(session).await
    }

    /// Last structure change; an unreadable clock counts as "just changed".
    async fn last_structure_change(&self) -> Option<DateTime<Utc>> {
        match self.clock.last_structure_change().await {
            Ok(changed) => changed,
            Err(e) => {
                warn!(error = %e, "Structure clock unavailable, rebuilding");
                Some(Utc::now())
            }
        }
    }
}

/// Whether a cached entry predates the last structure change.
///
/// The caller's own refresh time is compared when known, otherwise the
/// entry's build time.
fn is_stale(
    entry: &CacheEntry,
    last_refresh: Option<DateTime<Utc>>,
    last_change: Option<DateTime<Utc>>,
) -> bool {
    let reference = last_refresh.unwrap_or(entry.built_at);
    last_change.is_some_and(|changed| reference < changed)
}

//! Session-scoped storage of built trees.
//!
//! Every session owns one cache group holding a slot per build mode. The
//! configured `tree.session_ttl_seconds` is the lifetime of that group:
//! each write extends it, and a session nobody rebuilt for that long is
//! forgotten by the backend as a logged-out session would be. Within that
//! lifetime, freshness is decided by the structure clock, not by time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use foldview_cache::keys;
use foldview_cache::provider::CacheManager;
use foldview_core::config::tree::TreeConfig;
use foldview_core::result::AppResult;
use foldview_core::traits::cache::CacheProvider;
use foldview_entity::output::OutputNode;

use super::service::BuildMode;

/// A cached build result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Built nodes, in output order.
    pub nodes: Vec<OutputNode>,
    /// When the nodes were built.
    pub built_at: DateTime<Utc>,
}

/// Reads, writes and drops the cached trees of sessions.
#[derive(Debug, Clone)]
pub struct TreeCache {
    /// Cache manager.
    cache: Arc<CacheManager>,
    /// Lifetime of a session's cache group.
    session_ttl: Duration,
}

impl TreeCache {
    /// Creates a tree cache over a cache manager.
    pub fn new(cache: Arc<CacheManager>, config: &TreeConfig) -> Self {
        Self {
            cache,
            session_ttl: Duration::from_secs(config.session_ttl_seconds),
        }
    }

    /// Cached tree of a session for a mode; unreadable entries count as missing.
    pub async fn read(&self, session: &str, mode: BuildMode) -> Option<CacheEntry> {
        let slot = slot(mode);
        match self.cache.get_json::<CacheEntry>(session, &slot).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(session, slot = %slot, error = %e, "Cached folder tree unreadable, rebuilding");
                None
            }
        }
    }

    /// Stores a built tree; a failing cache is logged and ignored.
    pub async fn write(&self, session: &str, mode: BuildMode, entry: &CacheEntry) {
        let slot = slot(mode);
        if let Err(e) = self
            .cache
            .put_json(session, &slot, entry, self.session_ttl)
            .await
        {
            warn!(session, slot = %slot, error = %e, "Failed to cache folder tree");
        }
    }

    /// Drops every cached tree of a session.
    pub async fn invalidate_session(&self, session: &str) -> AppResult<u64> {
        let removed = self.cache.drop_session(session).await?;
        info!(session, removed, "Invalidated cached folder trees");
        Ok(removed)
    }
}

/// Slot of a build mode inside the session group.
fn slot(mode: BuildMode) -> String {
    match mode {
        BuildMode::Full => keys::FULL_SLOT.to_string(),
        BuildMode::Children(node_id) => keys::children_slot(node_id),
    }
}

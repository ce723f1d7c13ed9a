//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use foldview_cache::CacheManager;
use foldview_cache::memory::MemoryCacheProvider;
use foldview_core::config::cache::MemoryCacheConfig;
use foldview_core::config::tree::TreeConfig;
use foldview_core::error::AppError;
use foldview_core::result::AppResult;
use foldview_core::traits::CacheProvider;
use foldview_core::{NodeId, TreeNode};
use foldview_entity::output::OutputNode;
use foldview_entity::permission::PermissionContext;
use foldview_service::TreeService;
use foldview_store::{MemoryItemStore, MemoryNestedTree, MemoryStructureClock};

/// Test tree context: in-memory stores behind a tree service
pub struct TestTree {
    /// The service under test
    pub service: TreeService,
    /// Structure clock, to simulate folder edits
    pub clock: Arc<MemoryStructureClock>,
    /// Cache shared with the service
    pub cache: Arc<CacheManager>,
}

impl TestTree {
    /// Create a test tree without item counts
    pub fn new(folders: Vec<TreeNode>) -> Self {
        Self::build(folders, MemoryItemStore::default(), memory_cache(), &TreeConfig::default())
    }

    /// Create a test tree with active item counts per folder
    pub fn with_items(folders: Vec<TreeNode>, counts: HashMap<NodeId, u64>) -> Self {
        Self::build(
            folders,
            MemoryItemStore::new(counts),
            memory_cache(),
            &TreeConfig::default(),
        )
    }

    /// Create a test tree over a prepared item store and configuration
    pub fn with_item_store(
        folders: Vec<TreeNode>,
        items: MemoryItemStore,
        config: &TreeConfig,
    ) -> Self {
        Self::build(folders, items, memory_cache(), config)
    }

    /// Create a test tree on top of a specific cache
    pub fn with_cache(folders: Vec<TreeNode>, cache: Arc<CacheManager>) -> Self {
        Self::build(folders, MemoryItemStore::default(), cache, &TreeConfig::default())
    }

    fn build(
        folders: Vec<TreeNode>,
        items: MemoryItemStore,
        cache: Arc<CacheManager>,
        config: &TreeConfig,
    ) -> Self {
        let clock = Arc::new(MemoryStructureClock::default());
        let service = TreeService::new(
            Arc::new(MemoryNestedTree::from_nodes(folders)),
            Arc::new(items),
            clock.clone(),
            Arc::clone(&cache),
            config,
        );
        Self {
            service,
            clock,
            cache,
        }
    }
}

/// In-memory cache manager
pub fn memory_cache() -> Arc<CacheManager> {
    let config = MemoryCacheConfig {
        max_capacity: 1000,
        time_to_idle_seconds: 600,
    };
    Arc::new(CacheManager::from_provider(Arc::new(
        MemoryCacheProvider::new(&config),
    )))
}

/// Cache manager whose backend always fails
pub fn broken_cache() -> Arc<CacheManager> {
    Arc::new(CacheManager::from_provider(Arc::new(BrokenCache)))
}

/// Folder row; bounds and levels are computed by the in-memory store
pub fn folder(id: NodeId, parent_id: NodeId, title: &str) -> TreeNode {
    TreeNode {
        id,
        parent_id,
        title: title.to_string(),
        nleft: 0,
        nright: 0,
        nlevel: 0,
        personal_folder: false,
        icon: None,
        icon_selected: None,
    }
}

/// Permission context for user 42 ("alice") with personal folders enabled
pub fn ctx() -> PermissionContext {
    PermissionContext {
        user_id: 42,
        user_login: "alice".to_string(),
        personal_folders_enabled: true,
        ..PermissionContext::default()
    }
}

/// Ids of the output nodes, in order
pub fn ids(nodes: &[OutputNode]) -> Vec<NodeId> {
    nodes.iter().map(|n| n.id).collect()
}

/// Small deterministic generator for randomized trees
pub struct Lcg(u64);

impl Lcg {
    /// Seeded generator
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1))
    }

    /// Next value in `0..bound`
    pub fn below(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound.max(1)
    }

    /// True with probability `percent`%
    pub fn chance(&mut self, percent: u64) -> bool {
        self.below(100) < percent
    }
}

/// A randomized tree of `size` folders; each folder's parent precedes it
pub fn random_tree(rng: &mut Lcg, size: i64) -> Vec<TreeNode> {
    (1..=size)
        .map(|id| {
            let parent = if id == 1 || rng.chance(15) {
                0
            } else {
                1 + rng.below((id - 1) as u64) as i64
            };
            let mut node = folder(id, parent, &format!("folder-{id}"));
            node.personal_folder = rng.chance(5);
            node
        })
        .collect()
}

/// A randomized permission context over folders `1..=size`
pub fn random_context(rng: &mut Lcg, size: i64, show_only: bool) -> PermissionContext {
    let mut ctx = ctx();
    ctx.show_only_accessible_folders = show_only;
    ctx.is_read_only_user = rng.chance(20);
    for id in 1..=size {
        match rng.below(10) {
            0 | 1 => {
                ctx.forbidden_folders.insert(id);
            }
            2 | 3 => {
                ctx.visible_groups.insert(id);
            }
            4 => {
                ctx.limited_folders.insert(id, (0..rng.below(4) as i64).collect());
            }
            5 => {
                ctx.restricted_folders_for_items.insert(id, [id * 100].into());
            }
            _ => {}
        }
        // Grants that overlap the forbidden list exercise the override rule.
        if rng.chance(10) {
            ctx.visible_groups.insert(id);
        }
        if rng.chance(10) {
            ctx.read_only_folders.insert(id);
        }
        if rng.chance(10) {
            ctx.no_access_folders.insert(id);
        }
        if rng.chance(5) {
            ctx.personal_folders.insert(id);
        }
    }
    ctx
}

/// Cache backend that fails every call
#[derive(Debug)]
pub struct BrokenCache;

#[async_trait]
impl CacheProvider for BrokenCache {
    async fn get(&self, _session: &str, _slot: &str) -> AppResult<Option<String>> {
        Err(AppError::cache("cache offline"))
    }

    async fn put(&self, _session: &str, _slot: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
        Err(AppError::cache("cache offline"))
    }

    async fn drop_session(&self, _session: &str) -> AppResult<u64> {
        Err(AppError::cache("cache offline"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }
}

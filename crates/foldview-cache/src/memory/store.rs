//! In-memory tree cache using the moka crate.
//!
//! Slots are stored under flat `tree:{session}:{slot}` keys; dropping a
//! session removes every key of its group.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use foldview_core::config::cache::MemoryCacheConfig;
use foldview_core::result::AppResult;
use foldview_core::traits::cache::CacheProvider;

use crate::keys;

/// A cached tree with the lifetime it was written with.
#[derive(Debug, Clone)]
struct Slot {
    value: String,
    ttl: Duration,
}

/// Expires each slot after the TTL it was written with.
#[derive(Debug, Clone, Copy)]
struct SlotTtl;

impl Expiry<String, Slot> for SlotTtl {
    fn expire_after_create(&self, _key: &String, slot: &Slot, _now: Instant) -> Option<Duration> {
        Some(slot.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        slot: &Slot,
        _now: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(slot.ttl)
    }
}

/// In-process tree cache.
///
/// Besides the per-slot TTL, slots nobody read for
/// `time_to_idle_seconds` are evicted, and `max_capacity` bounds the
/// number of slots.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    cache: Cache<String, Slot>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_idle(Duration::from_secs(config.time_to_idle_seconds))
            .expire_after(SlotTtl)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, session: &str, slot: &str) -> AppResult<Option<String>> {
        let key = keys::slot_key(session, slot);
        Ok(self.cache.get(&key).await.map(|slot| slot.value))
    }

    async fn put(&self, session: &str, slot: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let entry = Slot {
            value: value.to_string(),
            ttl,
        };
        self.cache.insert(keys::slot_key(session, slot), entry).await;
        Ok(())
    }

    async fn drop_session(&self, session: &str) -> AppResult<u64> {
        let group = format!("{}:", keys::session_key(session));
        let doomed: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(&group))
            .map(|(key, _)| key.to_string())
            .collect();

        let mut removed = 0u64;
        for key in doomed {
            if self.cache.remove(&key).await.is_some() {
                removed += 1;
            }
        }
        debug!(session, removed, "Dropped cached trees of session");
        Ok(removed)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

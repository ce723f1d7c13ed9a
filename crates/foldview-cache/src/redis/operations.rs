//! Redis tree cache.
//!
//! Each session is one hash at `{prefix}tree:{session}` whose fields are the
//! slots. Writing a slot refreshes the expiry of the whole hash, and dropping
//! a session is a single `DEL`.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use foldview_core::error::{AppError, ErrorKind};
use foldview_core::result::AppResult;
use foldview_core::traits::cache::CacheProvider;

use super::client::RedisClient;
use crate::keys;

/// Redis-backed tree cache.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    /// Redis client.
    client: RedisClient,
}

impl RedisCacheProvider {
    /// Create a new Redis cache provider.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
    }

    fn hash_key(&self, session: &str) -> String {
        self.client.prefixed_key(&keys::session_key(session))
    }
}

/// EXPIRE seconds for a lifetime; a zero expiry would delete the hash.
fn expire_seconds(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs().max(1)).unwrap_or(i64::MAX)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, session: &str, slot: &str) -> AppResult<Option<String>> {
        let key = self.hash_key(session);
        let mut conn = self.client.conn_mut();
        let value: Option<String> = conn.hget(&key, slot).await.map_err(Self::map_err)?;
        Ok(value)
    }

    async fn put(&self, session: &str, slot: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let key = self.hash_key(session);
        let mut conn = self.client.conn_mut();
        redis::pipe()
            .atomic()
            .hset(&key, slot, value)
            .ignore()
            .expire(&key, expire_seconds(ttl))
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn drop_session(&self, session: &str) -> AppResult<u64> {
        let key = self.hash_key(session);
        let mut conn = self.client.conn_mut();
        let (removed,): (u64,) = redis::pipe()
            .atomic()
            .hlen(&key)
            .del(&key)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        debug!(session, removed, "Dropped cached trees of session");
        Ok(removed)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}

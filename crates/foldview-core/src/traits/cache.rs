//! Storage for built trees, grouped per session.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Backend holding serialized trees (Redis or in-memory).
///
/// Every session owns a group of slots, one per build mode. Slots are
/// written whole and the group is dropped at once when the session's
/// permissions change. The TTL passed to [`put`](Self::put) is the
/// session's lifetime: the backend forgets the group once nobody wrote to
/// it for that long.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Read one slot of a session.
    async fn get(&self, session: &str, slot: &str) -> AppResult<Option<String>>;

    /// Write one slot of a session and extend the session's lifetime.
    async fn put(&self, session: &str, slot: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Drop every slot of a session; returns how many were removed.
    async fn drop_session(&self, session: &str) -> AppResult<u64>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read a slot and decode it from JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        session: &str,
        slot: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        self.get(session, slot)
            .await?
            .map(|value| serde_json::from_str(&value))
            .transpose()
            .map_err(Into::into)
    }

    /// Encode a value as JSON and write it to a slot.
    async fn put_json<T: serde::Serialize + Send + Sync>(
        &self,
        session: &str,
        slot: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.put(session, slot, &json, ttl).await
    }
}

//! Key-value backends for the job store.

use async_trait::async_trait;
use glob::Pattern;
use redis::aio::MultiplexedConnection;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::job_store::JobStoreError;

const SCAN_COUNT: usize = 100;

/// Minimal string key-value capability with per-key expiry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value and TTL.
    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<(), JobStoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, JobStoreError>;

    /// One entry per requested key, `None` where the key is absent or expired.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>, JobStoreError>;

    /// Keys matching a glob pattern (`*`, `?`, `[...]`; bracket a metacharacter to match it literally).
    async fn scan(&self, pattern: &str) -> Result<Vec<String>, JobStoreError>;

    /// Remove keys, returning how many existed.
    async fn del(&self, keys: &[String]) -> Result<u64, JobStoreError>;

    fn backend_name(&self) -> &'static str;
}

impl From<redis::RedisError> for JobStoreError {
    fn from(err: redis::RedisError) -> Self {
        JobStoreError::Connection(err.to_string())
    }
}

/// Redis-backed store over a multiplexed connection shared by every caller.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    conn: MultiplexedConnection,
}

impl RedisKeyValueStore {
    pub async fn connect(url: &str) -> Result<Self, JobStoreError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::info!("Connected to Redis job store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<(), JobStoreError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, JobStoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>, JobStoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let values: Vec<Option<String>> =
            redis::cmd("MGET").arg(keys).query_async(&mut conn).await?;
        Ok(values)
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>, JobStoreError> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once.
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn del(&self, keys: &[String]) -> Result<u64, JobStoreError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        let removed: u64 = redis::cmd("DEL").arg(keys).query_async(&mut conn).await?;
        Ok(removed)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// In-process store with the same expiry semantics as Redis.
///
/// Expiry uses `tokio::time`, so tests with a paused clock can advance past a TTL.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<(), JobStoreError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (value, now + ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, JobStoreError> {
        let mut entries = self.entries.lock().await;
        Ok(live_value(&mut entries, key))
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>, JobStoreError> {
        let mut entries = self.entries.lock().await;
        Ok(keys.iter().map(|k| live_value(&mut entries, k)).collect())
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>, JobStoreError> {
        let matcher = Pattern::new(pattern).map_err(|e| JobStoreError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.msg.to_string(),
        })?;

        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, (_, expires_at)| *expires_at > now);

        let mut keys: Vec<String> = entries
            .keys()
            .filter(|k| matcher.matches(k))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn del(&self, keys: &[String]) -> Result<u64, JobStoreError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let removed = keys
            .iter()
            .filter_map(|k| entries.remove(k))
            .filter(|(_, expires_at)| *expires_at > now)
            .count();
        Ok(removed as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

fn live_value(entries: &mut HashMap<String, (String, Instant)>, key: &str) -> Option<String> {
    match entries.get(key) {
        Some((value, expires_at)) if *expires_at > Instant::now() => Some(value.clone()),
        Some(_) => {
            entries.remove(key);
            None
        }
        None => None,
    }
}

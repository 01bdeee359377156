// The key-value store collaborator (SPEC_FULL.md section 6.1). Session
// Store, Matchmaker and Tournament Manager are written only against this
// trait so they can be exercised in tests against `memory::MemoryStore`
// without a running Redis. Grounded in spirit on the teacher's
// `Store<K, V>` in `session_store.rs`, generalized here with hash and
// sorted-set semantics and an atomic multi-op entry point.

pub mod memory;
pub mod redis_store;
pub mod session_store;

use async_trait::async_trait;

use crate::error::CoreError;

/// A single queued write, applied atomically by `KeyValueStore::transaction`.
#[derive(Clone, Debug)]
pub enum StoreOp {
    HashSet { key: String, fields: Vec<(String, String)> },
    HashDelete { key: String },
    ZAdd { key: String, member: String, score: f64 },
    ZRem { key: String, member: String },
    Expire { key: String, ttl_secs: u64 },
    Set { key: String, value: String, ttl_secs: Option<u64> },
    Delete { key: String },
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn hash_get_all(&self, key: &str) -> Result<Option<Vec<(String, String)>>, CoreError>;
    async fn hash_set(&self, key: &str, fields: Vec<(String, String)>) -> Result<(), CoreError>;
    async fn hash_delete(&self, key: &str) -> Result<(), CoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, CoreError>;
    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<(), CoreError>;
    async fn delete(&self, key: &str) -> Result<(), CoreError>;

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), CoreError>;
    async fn zrem(&self, key: &str, member: &str) -> Result<(), CoreError>;
    /// Members with `min <= score <= max`, ascending by score.
    async fn zrange_by_score(&self, key: &str, min: f64, max: f64) -> Result<Vec<(String, f64)>, CoreError>;
    async fn zcard(&self, key: &str) -> Result<u64, CoreError>;

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), CoreError>;

    /// Commits every op in `ops` as a single atomic multi-op (Redis
    /// `MULTI`/`EXEC`, or a single mutex-guarded batch in-memory).
    async fn transaction(&self, ops: Vec<StoreOp>) -> Result<(), CoreError>;
}

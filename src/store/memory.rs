// In-memory `KeyValueStore`, used by unit and integration tests so Session
// Store / Matchmaker / Tournament Manager logic can be exercised without a
// running Redis. Grounded on the teacher's `Store<K, V>` in
// `session_store.rs` (a `HashMap` behind a single lock, entries looked up
// by id), generalized here to hash and sorted-set semantics and wrapped in
// a `dashmap::DashMap` instead of a `Mutex<HashMap<..>>` for the same
// lock-free-per-shard reason the Dispatcher's lane map uses one
// (SPEC_FULL.md section 5.1).

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{CoreError, ErrorCode};
use crate::store::{KeyValueStore, StoreOp};

#[derive(Default)]
struct ZSet {
    by_member: BTreeMap<String, f64>,
}

#[derive(Default)]
pub struct MemoryStore {
    hashes: DashMap<String, Vec<(String, String)>>,
    strings: DashMap<String, String>,
    zsets: DashMap<String, ZSet>,
    expirations: DashMap<String, u64>,
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_expired(&self, key: &str) -> bool {
        self.expirations.get(key).map(|e| *e <= now_secs()).unwrap_or(false)
    }

    fn apply_op(&self, op: StoreOp) {
        match op {
            StoreOp::HashSet { key, fields } => {
                let mut entry = self.hashes.entry(key).or_default();
                for (field, value) in fields {
                    if let Some(existing) = entry.iter_mut().find(|(f, _)| *f == field) {
                        existing.1 = value;
                    } else {
                        entry.push((field, value));
                    }
                }
            }
            StoreOp::HashDelete { key } => {
                self.hashes.remove(&key);
            }
            StoreOp::ZAdd { key, member, score } => {
                self.zsets.entry(key).or_default().by_member.insert(member, score);
            }
            StoreOp::ZRem { key, member } => {
                if let Some(mut zset) = self.zsets.get_mut(&key) {
                    zset.by_member.remove(&member);
                }
            }
            StoreOp::Expire { key, ttl_secs } => {
                self.expirations.insert(key, now_secs() + ttl_secs);
            }
            StoreOp::Set { key, value, ttl_secs } => {
                self.strings.insert(key.clone(), value);
                if let Some(ttl) = ttl_secs {
                    self.expirations.insert(key, now_secs() + ttl);
                }
            }
            StoreOp::Delete { key } => {
                self.strings.remove(&key);
                self.hashes.remove(&key);
                self.zsets.remove(&key);
                self.expirations.remove(&key);
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn hash_get_all(&self, key: &str) -> Result<Option<Vec<(String, String)>>, CoreError> {
        if self.is_expired(key) {
            return Ok(None);
        }
        Ok(self.hashes.get(key).map(|v| v.clone()))
    }

    async fn hash_set(&self, key: &str, fields: Vec<(String, String)>) -> Result<(), CoreError> {
        self.apply_op(StoreOp::HashSet { key: key.to_string(), fields });
        Ok(())
    }

    async fn hash_delete(&self, key: &str) -> Result<(), CoreError> {
        self.apply_op(StoreOp::HashDelete { key: key.to_string() });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        if self.is_expired(key) {
            return Ok(None);
        }
        Ok(self.strings.get(key).map(|v| v.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<(), CoreError> {
        self.apply_op(StoreOp::Set { key: key.to_string(), value: value.to_string(), ttl_secs });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CoreError> {
        self.apply_op(StoreOp::Delete { key: key.to_string() });
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), CoreError> {
        self.apply_op(StoreOp::ZAdd { key: key.to_string(), member: member.to_string(), score });
        Ok(())
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<(), CoreError> {
        self.apply_op(StoreOp::ZRem { key: key.to_string(), member: member.to_string() });
        Ok(())
    }

    async fn zrange_by_score(&self, key: &str, min: f64, max: f64) -> Result<Vec<(String, f64)>, CoreError> {
        let Some(zset) = self.zsets.get(key) else { return Ok(Vec::new()) };
        let mut entries: Vec<(String, f64)> = zset.by_member.iter().filter(|(_, &score)| score >= min && score <= max).map(|(m, &s)| (m.clone(), s)).collect();
        entries.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(entries)
    }

    async fn zcard(&self, key: &str) -> Result<u64, CoreError> {
        Ok(self.zsets.get(key).map(|z| z.by_member.len() as u64).unwrap_or(0))
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), CoreError> {
        self.apply_op(StoreOp::Expire { key: key.to_string(), ttl_secs });
        Ok(())
    }

    async fn transaction(&self, ops: Vec<StoreOp>) -> Result<(), CoreError> {
        if ops.is_empty() {
            return Err(CoreError::new(ErrorCode::InternalError, "empty transaction"));
        }
        for op in ops {
            self.apply_op(op);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[async_std::test]
    async fn hash_round_trips() {
        let store = MemoryStore::new();
        store.hash_set("session:1", vec![("status".to_string(), "active".to_string())]).await.unwrap();
        let fields = store.hash_get_all("session:1").await.unwrap().unwrap();
        assert_eq!(fields, vec![("status".to_string(), "active".to_string())]);
    }

    #[async_std::test]
    async fn zrange_orders_by_score() {
        let store = MemoryStore::new();
        store.zadd("queue:classic", "alice", 1500.0).await.unwrap();
        store.zadd("queue:classic", "bob", 1400.0).await.unwrap();
        let members = store.zrange_by_score("queue:classic", 0.0, 2000.0).await.unwrap();
        assert_eq!(members, vec![("bob".to_string(), 1400.0), ("alice".to_string(), 1500.0)]);
    }

    #[async_std::test]
    async fn transaction_applies_all_ops() {
        let store = MemoryStore::new();
        store
            .transaction(vec![
                StoreOp::ZAdd { key: "queue:decay".to_string(), member: "carol".to_string(), score: 1200.0 },
                StoreOp::Set { key: "cooldown:carol".to_string(), value: "1".to_string(), ttl_secs: Some(10) },
            ])
            .await
            .unwrap();
        assert_eq!(store.zcard("queue:decay").await.unwrap(), 1);
        assert!(store.get("cooldown:carol").await.unwrap().is_some());
    }
}

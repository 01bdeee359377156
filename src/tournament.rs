// Tournament Manager (component T, SPEC_FULL.md section 4.T). At most one
// tournament is active; participants and its FIFO tournament queue live in
// the `KeyValueStore` alongside the matchmaking queues (section 6's
// `tournament:*` keys), so joining and matching share the same
// transactional-commit discipline as the Matchmaker.

use std::sync::Arc;

use rand::seq::IndexedRandom;

use crate::error::{CoreError, ErrorCode};
use crate::matchmaker::{MatchResult, Matchmaker, UserDirectory};
use crate::rules::VariantKey;
use crate::store::{KeyValueStore, StoreOp};

const TOURNAMENT_ACTIVE_KEY: &str = "tournament:active";

fn details_key(id: &str) -> String {
    format!("tournament:{id}:details")
}
fn participants_key(id: &str) -> String {
    format!("tournament:{id}:participants")
}
fn queue_key() -> &'static str {
    "tournament:queue"
}
fn user_side_data_key(id: &str, user_id: &str) -> String {
    format!("tournament:{id}:user:{user_id}")
}

#[derive(Clone, Debug)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub wins: u32,
    pub current_streak: u32,
}

pub struct TournamentManager {
    store: Arc<dyn KeyValueStore>,
}

impl TournamentManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn active_id(&self) -> Result<Option<String>, CoreError> {
        self.store.get(TOURNAMENT_ACTIVE_KEY).await
    }

    /// Opens a new tournament as the sole active one, replacing any
    /// previous `tournament:active` pointer (the operator is responsible
    /// for not overlapping windows; this core has no scheduler of its own).
    pub async fn create(&self, id: &str, capacity: u32) -> Result<(), CoreError> {
        self.store
            .transaction(vec![
                StoreOp::Set { key: TOURNAMENT_ACTIVE_KEY.to_string(), value: id.to_string(), ttl_secs: None },
                StoreOp::HashSet { key: details_key(id), fields: vec![("capacity".to_string(), capacity.to_string())] },
            ])
            .await
    }

    /// Joins the active tournament, if any, assigning a uniformly random
    /// `(variant, subvariant)` to the queue entry at enqueue time.
    pub async fn join(&self, user_id: &str, now_ms: u64) -> Result<VariantKey, CoreError> {
        let Some(id) = self.active_id().await? else {
            return Err(CoreError::new(ErrorCode::InvalidState, "no active tournament"));
        };
        let capacity: u32 = self
            .store
            .hash_get_all(&details_key(&id))
            .await?
            .and_then(|fields| fields.into_iter().find(|(f, _)| f == "capacity"))
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(u32::MAX);
        let size = count_set_members(&self.store, &participants_key(&id)).await?;
        if size >= capacity as u64 {
            return Err(CoreError::new(ErrorCode::InvalidState, "tournament is at capacity"));
        }

        let assigned = *VariantKey::all().choose(&mut rand::rng()).expect("VariantKey::all() is non-empty");

        self.store
            .transaction(vec![
                StoreOp::HashSet { key: participants_key(&id), fields: vec![(user_id.to_string(), "1".to_string())] },
                StoreOp::ZAdd { key: queue_key().to_string(), member: user_id.to_string(), score: now_ms as f64 },
                StoreOp::HashSet {
                    key: user_side_data_key(&id, user_id),
                    fields: vec![("variant".to_string(), assigned.queue_key()), ("joinTime".to_string(), now_ms.to_string())],
                },
            ])
            .await?;
        Ok(assigned)
    }

    pub async fn leave(&self, user_id: &str) -> Result<(), CoreError> {
        let Some(id) = self.active_id().await? else { return Ok(()) };
        self.store.zrem(queue_key(), user_id).await?;
        self.store.hash_delete(&user_side_data_key(&id, user_id)).await?;
        Ok(())
    }

    /// Matching priority (section 4.T): (1) another tournament waiter,
    /// variant taken from the first waiter's assignment; (2) fall back to
    /// the matchmaker's regular queue for the waiter's assigned variant;
    /// (3) any regular waiter, variant from that regular waiter's choice.
    pub async fn try_match(&self, matchmaker: &Matchmaker, now_ms: u64) -> Result<Vec<MatchResult>, CoreError> {
        let Some(id) = self.active_id().await? else { return Ok(Vec::new()) };
        let mut waiters = self.store.zrange_by_score(queue_key(), f64::MIN, f64::MAX).await?;
        let mut matched = Vec::new();

        while let Some((first, _)) = waiters.first().cloned() {
            if waiters.len() >= 2 {
                let (second, _) = waiters.remove(1);
                waiters.remove(0);
                self.store.zrem(queue_key(), &first).await?;
                self.store.zrem(queue_key(), &second).await?;
                let variant = self.assigned_variant(&id, &first).await?;
                matched.push(matchmaker.finalize_tournament_match(&first, &second, variant, now_ms).await?);
                continue;
            }
            // Only one tournament waiter left: fall back to the regular queue.
            let variant = self.assigned_variant(&id, &first).await?;
            waiters.remove(0);
            self.store.zrem(queue_key(), &first).await?;
            if let Some(result) = matchmaker.match_waiting_user(&first, variant, now_ms).await? {
                matched.push(result);
            }
            break;
        }
        Ok(matched)
    }

    async fn assigned_variant(&self, tournament_id: &str, user_id: &str) -> Result<VariantKey, CoreError> {
        let fields = self
            .store
            .hash_get_all(&user_side_data_key(tournament_id, user_id))
            .await?
            .ok_or_else(|| CoreError::new(ErrorCode::InternalError, "missing tournament side-data"))?;
        let raw = fields.into_iter().find(|(f, _)| f == "variant").map(|(_, v)| v).unwrap_or_default();
        VariantKey::all().into_iter().find(|v| v.queue_key() == raw).ok_or_else(|| CoreError::new(ErrorCode::InternalError, "unrecognized variant key in tournament side-data"))
    }

    pub async fn record_result(&self, winner: Option<&str>, loser: Option<&str>) -> Result<(), CoreError> {
        let Some(id) = self.active_id().await? else { return Ok(()) };
        if let Some(winner) = winner {
            let wins = self.leaderboard_field(&id, winner, "wins").await? + 1;
            let streak = self.leaderboard_field(&id, winner, "streak").await? + 1;
            self.store.hash_set(&details_key(&id), vec![(format!("wins:{winner}"), wins.to_string()), (format!("streak:{winner}"), streak.to_string())]).await?;
        }
        if let Some(loser) = loser {
            self.store.hash_set(&details_key(&id), vec![(format!("streak:{loser}"), "0".to_string())]).await?;
        }
        Ok(())
    }

    async fn leaderboard_field(&self, id: &str, user_id: &str, field: &str) -> Result<u32, CoreError> {
        let fields = self.store.hash_get_all(&details_key(id)).await?.unwrap_or_default();
        Ok(fields.into_iter().find(|(f, _)| f == &format!("{field}:{user_id}")).and_then(|(_, v)| v.parse().ok()).unwrap_or(0))
    }
}

async fn count_set_members(store: &Arc<dyn KeyValueStore>, key: &str) -> Result<u64, CoreError> {
    Ok(store.hash_get_all(key).await?.map(|fields| fields.len() as u64).unwrap_or(0))
}

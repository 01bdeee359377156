// The Matchmaker (component M, SPEC_FULL.md section 4.M). One
// rating-sorted waiting set per `(variant, subvariant)`, stored as a
// `KeyValueStore` sorted set scored by `rating + epsilon * joinTimeMs` so
// ties break by earliest joiner. Built only against `KeyValueStore` and a
// small `UserDirectory` collaborator (resolving a user id to a
// `PlayerRecord`), the same "write against the trait, test against memory"
// discipline as the Session Store (section 6.1).

use std::sync::Arc;

use async_trait::async_trait;

use crate::clock::COOLDOWN_MS;
use crate::error::{CoreError, ErrorCode};
use crate::rules::VariantKey;
use crate::session::{PlayerRecord, Session, SessionId, SessionStatus, VariantState};
use crate::store::session_store::SessionStore;
use crate::store::{KeyValueStore, StoreOp};

/// Tie-break epsilon against an epoch-millisecond join time (~1e12-1e13):
/// small enough that the join-time term can never outweigh a single rating
/// point, large enough that two waiters a millisecond apart still order
/// distinctly in `f64`.
const JOIN_TIME_EPSILON: f64 = 1e-13;

const NARROW_RANGE: f64 = 100.0;
const NARROW_RANGE_LARGE_QUEUE: f64 = 50.0;
const LARGE_QUEUE_THRESHOLD: u64 = 1000;
const WIDEN_AFTER_MS: u64 = 5_000;
const IDLE_EVICT_MS: u64 = 5 * 60_000;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve(&self, user_id: &str) -> Result<PlayerRecord, CoreError>;
}

#[derive(Clone, Debug)]
pub struct MatchResult {
    pub session_id: SessionId,
    pub white: String,
    pub black: String,
}

pub struct Matchmaker {
    store: Arc<dyn KeyValueStore>,
    sessions: SessionStore,
    directory: Arc<dyn UserDirectory>,
}

fn queue_key(variant: VariantKey) -> String {
    format!("queue:{}", variant.queue_key())
}

fn side_data_key(user_id: &str) -> String {
    format!("queueuser:{user_id}")
}

fn cooldown_key(user_id: &str) -> String {
    format!("cooldown:{user_id}")
}

fn score(rating: i32, join_time_ms: u64) -> f64 {
    rating as f64 + JOIN_TIME_EPSILON * join_time_ms as f64
}

impl Matchmaker {
    pub fn new(store: Arc<dyn KeyValueStore>, sessions: SessionStore, directory: Arc<dyn UserDirectory>) -> Self {
        Self { store, sessions, directory }
    }

    /// Enqueues `user_id` for `variant`, removing it from any other waiting
    /// set first (exclusivity), then immediately attempts a narrow-range
    /// match. Rejects if the user is on post-match cooldown.
    pub async fn enqueue(&self, user_id: &str, rating: i32, variant: VariantKey, now_ms: u64) -> Result<Option<MatchResult>, CoreError> {
        if self.store.get(&cooldown_key(user_id)).await?.is_some() {
            return Err(CoreError::new(ErrorCode::InvalidState, "user is on post-match cooldown"));
        }
        self.leave(user_id).await?;

        let key = queue_key(variant);
        self.store
            .transaction(vec![
                StoreOp::ZAdd { key: key.clone(), member: user_id.to_string(), score: score(rating, now_ms) },
                StoreOp::HashSet {
                    key: side_data_key(user_id),
                    fields: vec![
                        ("userId".to_string(), user_id.to_string()),
                        ("rank".to_string(), rating.to_string()),
                        ("variant".to_string(), variant.queue_key()),
                        ("joinTime".to_string(), now_ms.to_string()),
                        ("status".to_string(), "waiting".to_string()),
                    ],
                },
            ])
            .await?;

        self.try_narrow_match(user_id, rating, variant, now_ms).await
    }

    /// Phase 1: look within a rating window around `user_id`, widened if
    /// the queue is large or the user has been waiting a while.
    async fn try_narrow_match(&self, user_id: &str, rating: i32, variant: VariantKey, now_ms: u64) -> Result<Option<MatchResult>, CoreError> {
        let key = queue_key(variant);
        let queue_size = self.store.zcard(&key).await?;
        let mut range = if queue_size > LARGE_QUEUE_THRESHOLD { NARROW_RANGE_LARGE_QUEUE } else { NARROW_RANGE };
        if let Some(fields) = self.store.hash_get_all(&side_data_key(user_id)).await? {
            if let Some((_, join_time)) = fields.iter().find(|(f, _)| f == "joinTime") {
                let join_time: u64 = join_time.parse().unwrap_or(now_ms);
                if now_ms.saturating_sub(join_time) > WIDEN_AFTER_MS {
                    range *= 2.0;
                }
            }
        }
        let candidates = self.store.zrange_by_score(&key, rating as f64 - range, rating as f64 + range + 1.0).await?;
        let Some((opponent, _)) = candidates.into_iter().find(|(member, _)| member != user_id) else { return Ok(None) };
        self.finalize_match(user_id, &opponent, variant, now_ms).await.map(Some)
    }

    /// Phase 2 (broad): scans the whole waiting set for `variant`, ignoring
    /// rating range, preferring the earliest joiner. Intended to be called
    /// from a periodic sweep roughly 10s after an unmatched enqueue.
    pub async fn try_broad_match(&self, variant: VariantKey, now_ms: u64) -> Result<Vec<MatchResult>, CoreError> {
        let key = queue_key(variant);
        let mut waiters = self.store.zrange_by_score(&key, f64::MIN, f64::MAX).await?;
        let mut matched = Vec::new();
        while waiters.len() >= 2 {
            let (a, _) = waiters.remove(0);
            let (b, _) = waiters.remove(0);
            matched.push(self.finalize_match(&a, &b, variant, now_ms).await?);
        }
        Ok(matched)
    }

    /// Cross-match entry point for the Tournament Manager (section 4.T):
    /// two tournament waiters matched against each other directly.
    pub async fn finalize_tournament_match(&self, user_a: &str, user_b: &str, variant: VariantKey, now_ms: u64) -> Result<MatchResult, CoreError> {
        self.finalize_match(user_a, user_b, variant, now_ms).await
    }

    /// Cross-match entry point for a lone tournament waiter falling back to
    /// the regular waiting set for their assigned variant (section 4.T,
    /// tournament matching step 2).
    pub async fn match_waiting_user(&self, tournament_user: &str, variant: VariantKey, now_ms: u64) -> Result<Option<MatchResult>, CoreError> {
        let key = queue_key(variant);
        let candidates = self.store.zrange_by_score(&key, f64::MIN, f64::MAX).await?;
        let Some((opponent, _)) = candidates.into_iter().find(|(member, _)| member != tournament_user) else { return Ok(None) };
        Ok(Some(self.finalize_match(tournament_user, &opponent, variant, now_ms).await?))
    }

    async fn finalize_match(&self, user_a: &str, user_b: &str, variant: VariantKey, now_ms: u64) -> Result<MatchResult, CoreError> {
        let key = queue_key(variant);
        self.store
            .transaction(vec![
                StoreOp::ZRem { key: key.clone(), member: user_a.to_string() },
                StoreOp::ZRem { key, member: user_b.to_string() },
                StoreOp::HashDelete { key: side_data_key(user_a) },
                StoreOp::HashDelete { key: side_data_key(user_b) },
                StoreOp::Set { key: cooldown_key(user_a), value: "1".to_string(), ttl_secs: Some(COOLDOWN_MS / 1000) },
                StoreOp::Set { key: cooldown_key(user_b), value: "1".to_string(), ttl_secs: Some(COOLDOWN_MS / 1000) },
            ])
            .await?;

        let white = self.directory.resolve(user_a).await?;
        let black = self.directory.resolve(user_b).await?;
        let session = new_session(variant, white, black, now_ms);
        self.sessions.create(&session).await?;

        Ok(MatchResult { session_id: session.id, white: user_a.to_string(), black: user_b.to_string() })
    }

    pub async fn leave(&self, user_id: &str) -> Result<(), CoreError> {
        let Some(fields) = self.store.hash_get_all(&side_data_key(user_id)).await? else { return Ok(()) };
        if let Some((_, variant_key)) = fields.iter().find(|(f, _)| f == "variant") {
            self.store.zrem(&format!("queue:{variant_key}"), user_id).await?;
        }
        self.store.hash_delete(&side_data_key(user_id)).await?;
        self.store.set(&cooldown_key(user_id), "1", Some(COOLDOWN_MS / 1000)).await?;
        Ok(())
    }

    /// Evicts any waiter across all queues whose join time predates
    /// `now_ms - IDLE_EVICT_MS` (section 5: idle sweep, ~60s cadence).
    pub async fn idle_sweep(&self, now_ms: u64) -> Result<(), CoreError> {
        for variant in VariantKey::all() {
            let key = queue_key(variant);
            let waiters = self.store.zrange_by_score(&key, f64::MIN, f64::MAX).await?;
            for (user_id, _) in waiters {
                if let Some(fields) = self.store.hash_get_all(&side_data_key(&user_id)).await? {
                    if let Some((_, join_time)) = fields.iter().find(|(f, _)| f == "joinTime") {
                        let join_time: u64 = join_time.parse().unwrap_or(now_ms);
                        if now_ms.saturating_sub(join_time) > IDLE_EVICT_MS {
                            self.store.zrem(&key, &user_id).await?;
                            self.store.hash_delete(&side_data_key(&user_id)).await?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn new_session(variant: VariantKey, white: PlayerRecord, black: PlayerRecord, now_ms: u64) -> Session {
    use crate::clock::TimeControl;
    use crate::force::Force;
    use crate::position::Position;
    use crate::session::{CrazyhouseState, CrazyhouseTimerState, DecayState, EnumMapBy, EnumMapSeq, SixPointerState};
    use rand::seq::IndexedRandom;

    let (fen, max_moves) = match variant {
        VariantKey::SixPointer => {
            let chosen = crate::rules::SIX_POINTER_STARTING_FENS.choose(&mut rand::rng()).copied().unwrap_or(crate::rules::SIX_POINTER_STARTING_FENS[0]);
            (chosen.to_string(), 6)
        }
        _ => (Position::standard_starting_position().to_fen(), 0),
    };

    let variant_state = match variant {
        VariantKey::Classic(_) => VariantState::Classic,
        VariantKey::Crazyhouse(crate::rules::CrazyhouseSubvariant::Standard) => VariantState::Crazyhouse(CrazyhouseState::default()),
        VariantKey::Crazyhouse(crate::rules::CrazyhouseSubvariant::WithTimer) => VariantState::CrazyhouseWithTimer(CrazyhouseTimerState::default()),
        VariantKey::Decay => VariantState::Decay(DecayState::default()),
        VariantKey::SixPointer => {
            let mut s = SixPointerState::default();
            s.max_moves = max_moves;
            VariantState::SixPointer(s)
        }
    };

    let time_control: TimeControl = variant.time_control();
    Session {
        id: SessionId::new(),
        variant_key: variant,
        players: EnumMapBy { white, black },
        status: SessionStatus::Active,
        fen: fen.clone(),
        active_color: Force::White,
        move_history: Vec::new(),
        position_history: vec![fen],
        repetition_map: Default::default(),
        main_clocks: EnumMapBy { white: time_control.base_time_ms, black: time_control.base_time_ms },
        time_control,
        turn_start_timestamp: now_ms,
        last_move_timestamp: now_ms,
        game_started: false,
        first_move_timestamp: None,
        captured_pieces: EnumMapSeq::default(),
        result: None,
        pending_draw_offer: None,
        variant_state,
        created_at: now_ms,
        last_activity: now_ms,
    }
}

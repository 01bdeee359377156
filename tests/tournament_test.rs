// S6 (SPEC_FULL.md section 8): a lone tournament waiter falls back to the
// regular matchmaking queue for its assigned variant, and both participants
// come away matched, cooled down, and removed from their own waiting
// structures.

use std::sync::Arc;

use async_trait::async_trait;
use chess_core::CoreError;
use chess_core::matchmaker::{Matchmaker, UserDirectory};
use chess_core::rules::VariantKey;
use chess_core::session::PlayerRecord;
use chess_core::store::memory::MemoryStore;
use chess_core::store::session_store::SessionStore;
use chess_core::store::KeyValueStore;
use chess_core::tournament::TournamentManager;

struct StubDirectory;

#[async_trait]
impl UserDirectory for StubDirectory {
    async fn resolve(&self, user_id: &str) -> Result<PlayerRecord, CoreError> {
        Ok(PlayerRecord { user_id: user_id.to_string(), display_name: user_id.to_string(), rating: 1500, avatar: None, title: None })
    }
}

fn build() -> (Matchmaker, TournamentManager, SessionStore, Arc<dyn KeyValueStore>) {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let sessions = SessionStore::new(store.clone());
    let matchmaker = Matchmaker::new(store.clone(), sessions.clone(), Arc::new(StubDirectory));
    let tournament = TournamentManager::new(store.clone());
    (matchmaker, tournament, sessions, store)
}

#[async_std::test]
async fn s6_lone_tournament_waiter_matches_against_the_regular_queue() {
    let (matchmaker, tournament, sessions, store) = build();

    tournament.create("t1", 10).await.unwrap();
    let assigned = tournament.join("alice", 1_000).await.unwrap();

    // A regular user joins the matchmaker's queue for the same variant the
    // tournament happened to assign.
    let direct = matchmaker.enqueue("bob", 1500, assigned, 2_000).await.unwrap();
    assert!(direct.is_none(), "bob shouldn't match alice directly; alice is parked in the tournament queue, not the regular one");

    let matches = tournament.try_match(&matchmaker, 3_000).await.unwrap();
    let result = matches.into_iter().next().expect("the lone tournament waiter should fall back to the regular queue");
    assert_eq!(result.white, "alice");
    assert_eq!(result.black, "bob");

    // Both waiting structures are now empty.
    let tournament_queue = store.zrange_by_score("tournament:queue", f64::MIN, f64::MAX).await.unwrap();
    assert!(tournament_queue.is_empty());
    let regular_queue = store.zrange_by_score(&format!("queue:{}", assigned.queue_key()), f64::MIN, f64::MAX).await.unwrap();
    assert!(regular_queue.is_empty());

    // Both participants are on cooldown.
    assert!(store.get("cooldown:alice").await.unwrap().is_some());
    assert!(store.get("cooldown:bob").await.unwrap().is_some());

    // The created session carries the tournament-assigned variant.
    let session = sessions.get(result.session_id).await.unwrap().expect("session should be persisted");
    assert_eq!(session.variant_key, assigned);
}

#[async_std::test]
async fn record_result_tracks_wins_and_resets_the_loser_streak() {
    let (_matchmaker, tournament, _sessions, store) = build();
    tournament.create("t1", 10).await.unwrap();

    tournament.record_result(Some("alice"), Some("bob")).await.unwrap();
    tournament.record_result(Some("alice"), Some("carol")).await.unwrap();
    tournament.record_result(Some("bob"), Some("alice")).await.unwrap();

    let details = store.hash_get_all("tournament:t1:details").await.unwrap().unwrap();
    let field = |name: &str| details.iter().find(|(f, _)| f == name).map(|(_, v)| v.clone());
    assert_eq!(field("wins:alice"), Some("2".to_string()));
    assert_eq!(field("streak:alice"), Some("0".to_string()), "alice's win streak should reset after losing to bob");
    assert_eq!(field("wins:bob"), Some("1".to_string()));
    assert_eq!(field("streak:bob"), Some("1".to_string()));
}

// Invariants 13 (matchmaking atomicity) and 14 (cooldown), plus a version
// of S6's cross-queue matching restricted to the Matchmaker's own regular
// queue (the Tournament Manager side of S6 is exercised in
// tournament_test.rs).

use std::sync::Arc;

use async_trait::async_trait;
use chess_core::CoreError;
use chess_core::matchmaker::{Matchmaker, UserDirectory};
use chess_core::rules::{ClassicSubvariant, VariantKey};
use chess_core::session::PlayerRecord;
use chess_core::store::memory::MemoryStore;
use chess_core::store::session_store::SessionStore;
use chess_core::store::KeyValueStore;

struct StubDirectory;

#[async_trait]
impl UserDirectory for StubDirectory {
    async fn resolve(&self, user_id: &str) -> Result<PlayerRecord, CoreError> {
        Ok(PlayerRecord { user_id: user_id.to_string(), display_name: user_id.to_string(), rating: 1500, avatar: None, title: None })
    }
}

fn build_matchmaker() -> (Matchmaker, Arc<dyn KeyValueStore>) {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let sessions = SessionStore::new(store.clone());
    let matchmaker = Matchmaker::new(store.clone(), sessions, Arc::new(StubDirectory));
    (matchmaker, store)
}

#[async_std::test]
async fn two_compatible_waiters_match_immediately() {
    let (matchmaker, store) = build_matchmaker();
    let variant = VariantKey::Classic(ClassicSubvariant::Blitz);

    let first = matchmaker.enqueue("alice", 1500, variant, 1_000).await.unwrap();
    assert!(first.is_none(), "a lone waiter should not match itself");

    let second = matchmaker.enqueue("bob", 1510, variant, 2_000).await.unwrap();
    let result = second.expect("a nearby-rated waiter should match immediately");
    // The user who just enqueued becomes `white`; the waiter found in the
    // queue becomes `black`.
    assert_eq!(result.white, "bob");
    assert_eq!(result.black, "alice");

    // Invariant 13: neither participant remains in any waiting set.
    let remaining = store.zrange_by_score(&format!("queue:{}", variant.queue_key()), f64::MIN, f64::MAX).await.unwrap();
    assert!(remaining.is_empty());
}

#[async_std::test]
async fn cooldown_rejects_an_immediate_rejoin() {
    let (matchmaker, _store) = build_matchmaker();
    let variant = VariantKey::Classic(ClassicSubvariant::Blitz);

    matchmaker.enqueue("alice", 1500, variant, 1_000).await.unwrap();
    matchmaker.enqueue("bob", 1500, variant, 2_000).await.unwrap();

    // Both are now on post-match cooldown (invariant 14).
    let rejoin = matchmaker.enqueue("alice", 1500, variant, 2_500).await;
    assert!(rejoin.is_err());
}

#[async_std::test]
async fn leaving_the_queue_also_starts_a_cooldown() {
    let (matchmaker, store) = build_matchmaker();
    let variant = VariantKey::Classic(ClassicSubvariant::Blitz);

    matchmaker.enqueue("alice", 1500, variant, 1_000).await.unwrap();
    matchmaker.leave("alice").await.unwrap();

    let remaining = store.zrange_by_score(&format!("queue:{}", variant.queue_key()), f64::MIN, f64::MAX).await.unwrap();
    assert!(remaining.is_empty());
    assert!(matchmaker.enqueue("alice", 1500, variant, 1_500).await.is_err());
}

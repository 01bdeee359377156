// Binary entry point. Thin wiring only: reads the two permitted environment
// variables (SPEC_FULL.md section 6), opens the Redis-backed store, and
// runs the periodic maintenance sweep (broad matchmaking + idle eviction)
// that section 5 says is "not required for correctness" but is still the
// sensible way to keep queues moving without a client re-poking them.
// Grounded on the teacher's `bughouse_console::server_main::run`, rewired
// from a thread-per-connection TCP/WebSocket loop to an async-std task that
// drives this crate's pure core; a real deployment still needs a transport
// (e.g. WebSocket via a `gateway::Connection` impl) to turn bytes on the
// wire into `gateway::ClientMessage`s, which is the "realtime message bus"
// collaborator this crate deliberately leaves outside its boundary.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chess_core::config::ServerConfig;
use chess_core::dispatcher::Dispatcher;
use chess_core::error::CoreError;
use chess_core::matchmaker::{Matchmaker, UserDirectory};
use chess_core::rules::VariantKey;
use chess_core::session::PlayerRecord;
use chess_core::store::redis_store::RedisStore;
use chess_core::store::session_store::SessionStore;
use chess_core::store::KeyValueStore;
use chess_core::tournament::TournamentManager;

/// Resolves a `PlayerRecord` from the same store the rest of the core uses,
/// under `user:{id}`; unknown ids get a default record rather than an
/// error, since registration is outside this crate's scope.
struct StoreBackedUserDirectory {
    store: Arc<dyn KeyValueStore>,
}

#[async_trait]
impl UserDirectory for StoreBackedUserDirectory {
    async fn resolve(&self, user_id: &str) -> Result<PlayerRecord, CoreError> {
        let fields = self.store.hash_get_all(&format!("user:{user_id}")).await?.unwrap_or_default();
        let field = |name: &str| fields.iter().find(|(f, _)| f == name).map(|(_, v)| v.clone());
        Ok(PlayerRecord {
            user_id: user_id.to_string(),
            display_name: field("displayName").unwrap_or_else(|| user_id.to_string()),
            rating: field("rating").and_then(|v| v.parse().ok()).unwrap_or(1500),
            avatar: field("avatar"),
            title: field("title"),
        })
    }
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock is before the Unix epoch").as_millis() as u64
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = ServerConfig::from_env()?;

    async_std::task::block_on(async move {
        let redis = RedisStore::connect(&config.store_url)?;
        let store: Arc<dyn KeyValueStore> = Arc::new(redis);
        let sessions = SessionStore::new(store.clone());
        let directory: Arc<dyn UserDirectory> = Arc::new(StoreBackedUserDirectory { store: store.clone() });
        let matchmaker = Matchmaker::new(store.clone(), sessions.clone(), directory);
        let tournament = TournamentManager::new(store.clone());
        let _dispatcher = Dispatcher::new(sessions);

        log::info!("chess_core server started against {}", config.store_url);

        let sweep_interval = Duration::from_millis(config.matchmaker_sweep_interval_ms);
        loop {
            async_std::task::sleep(sweep_interval).await;
            let now = now_ms();
            for variant in VariantKey::all() {
                if let Err(e) = matchmaker.try_broad_match(variant, now).await {
                    log::warn!("broad match sweep failed for {variant:?}: {e}");
                }
            }
            if let Err(e) = matchmaker.idle_sweep(now).await {
                log::warn!("idle sweep failed: {e}");
            }
            if let Err(e) = tournament.try_match(&matchmaker, now).await {
                log::warn!("tournament match sweep failed: {e}");
            }
        }
    })
}

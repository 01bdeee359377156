// Session Store (component S, SPEC_FULL.md section 6): CRUD on `Session`
// plus the `user:session:{userId}` reverse index, both under the session
// hash's TTL, refreshed on every write. Built only against `KeyValueStore`
// so it runs against `memory::MemoryStore` in tests. Grounded on the
// teacher's `Store<K, V>` in `session_store.rs`, generalized from an
// in-process map to a store-trait-backed CRUD layer with an explicit TTL.

use std::sync::Arc;

use crate::clock::SESSION_TTL_SECS;
use crate::error::{CoreError, ErrorCode};
use crate::session::{Session, SessionId};
use crate::store::{KeyValueStore, StoreOp};

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

fn session_key(id: SessionId) -> String {
    format!("session:{id}")
}

fn user_session_key(user_id: &str) -> String {
    format!("user:session:{user_id}")
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: SessionId) -> Result<Option<Session>, CoreError> {
        let Some(fields) = self.store.hash_get_all(&session_key(id)).await? else { return Ok(None) };
        let state = fields
            .into_iter()
            .find(|(field, _)| field == "gameState")
            .ok_or_else(|| CoreError::new(ErrorCode::InternalError, "session hash missing gameState field"))?
            .1;
        let session: Session = serde_json::from_str(&state).map_err(|e| CoreError::new(ErrorCode::InternalError, format!("corrupt session record: {e}")))?;
        Ok(Some(session))
    }

    /// Creates a session, its reverse index for both players, and refreshes
    /// TTL on both keys. Not atomic with matchmaking cleanup — the caller
    /// (Matchmaker) is responsible for sequencing per SPEC_FULL.md section 5.
    pub async fn create(&self, session: &Session) -> Result<(), CoreError> {
        self.commit(session).await?;
        self.store
            .transaction(vec![
                StoreOp::Set { key: user_session_key(&session.players.white.user_id), value: session.id.to_string(), ttl_secs: Some(SESSION_TTL_SECS) },
                StoreOp::Set { key: user_session_key(&session.players.black.user_id), value: session.id.to_string(), ttl_secs: Some(SESSION_TTL_SECS) },
            ])
            .await
    }

    /// Commits the full session hash atomically and refreshes its TTL.
    pub async fn commit(&self, session: &Session) -> Result<(), CoreError> {
        let state = serde_json::to_string(session).map_err(|e| CoreError::new(ErrorCode::InternalError, format!("session serialization failed: {e}")))?;
        let key = session_key(session.id);
        self.store
            .transaction(vec![
                StoreOp::HashSet {
                    key: key.clone(),
                    fields: vec![
                        ("sessionId".to_string(), session.id.to_string()),
                        ("gameState".to_string(), state),
                        ("playerWhiteId".to_string(), session.players.white.user_id.clone()),
                        ("playerBlackId".to_string(), session.players.black.user_id.clone()),
                        ("variant".to_string(), session.variant_key.variant().to_string()),
                        ("subvariant".to_string(), session.variant_key.subvariant_str().unwrap_or_default()),
                        ("status".to_string(), format!("{:?}", session.status)),
                        ("createdAt".to_string(), session.created_at.to_string()),
                        ("lastActivity".to_string(), session.last_activity.to_string()),
                    ],
                },
                StoreOp::Expire { key, ttl_secs: SESSION_TTL_SECS },
            ])
            .await
    }

    pub async fn session_for_user(&self, user_id: &str) -> Result<Option<SessionId>, CoreError> {
        let Some(raw) = self.store.get(&user_session_key(user_id)).await? else { return Ok(None) };
        let uuid = uuid::Uuid::parse_str(&raw).map_err(|e| CoreError::new(ErrorCode::InternalError, format!("corrupt session index: {e}")))?;
        Ok(Some(SessionId(uuid)))
    }

    pub async fn clear_user_index(&self, user_id: &str) -> Result<(), CoreError> {
        self.store.delete(&user_session_key(user_id)).await
    }
}

// Durable session records (SPEC_FULL.md section 6: persistent storage
// layout). Grounded on the teacher's `GameResultRow` (persistence.rs) — a
// flat, serializable row describing one finished game — generalized from a
// single four-player bughouse row into the two-record shape this spec
// describes: a creation record written once a session is matched, and a
// finalization record appended once it ends. `TournamentMatchRecord` covers
// the additional "append a match record to the tournament's matches list"
// requirement for tournament-origin sessions.

use serde::{Deserialize, Serialize};

use crate::rules::VariantKey;
use crate::session::{GameResult, Session, SessionId};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionCreatedRecord {
    pub session_id: SessionId,
    pub variant_key: VariantKey,
    pub white_user_id: String,
    pub black_user_id: String,
    pub initial_fen: String,
    pub created_at: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionFinishedRecord {
    pub session_id: SessionId,
    pub winner_user_id: Option<String>,
    pub result: GameResult,
    pub started_at: u64,
    pub ended_at: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentMatchRecord {
    pub tournament_id: String,
    pub session_id: SessionId,
    pub winner_user_id: Option<String>,
}

impl SessionCreatedRecord {
    pub fn from_session(session: &Session) -> Self {
        Self {
            session_id: session.id,
            variant_key: session.variant_key,
            white_user_id: session.players.white.user_id.clone(),
            black_user_id: session.players.black.user_id.clone(),
            initial_fen: session.position_history.first().cloned().unwrap_or_else(|| session.fen.clone()),
            created_at: session.created_at,
        }
    }
}

impl SessionFinishedRecord {
    pub fn from_session(session: &Session) -> Option<Self> {
        let result = session.result.as_ref()?;
        let winner_user_id = result.winner.map(|force| session.players.get(force).user_id.clone());
        Some(Self {
            session_id: session.id,
            winner_user_id,
            result: result.result,
            started_at: session.first_move_timestamp.unwrap_or(session.created_at),
            ended_at: result.ended_at,
        })
    }
}

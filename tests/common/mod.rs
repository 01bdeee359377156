// Shared test scaffolding: a bare-bones session builder so each engine test
// doesn't have to restate every `Session` field. Grounded on the teacher's
// own `tests/common/mod.rs` (a tiny builder helper shared across its
// integration tests), rebuilt against this crate's `Session` shape.

use chess_core::clock::TimeControl;
use chess_core::rules::VariantKey;
use chess_core::session::{EnumMapBy, PlayerRecord, Session, SessionId, SessionStatus, VariantState};
use chess_core::Force;

pub fn player(user_id: &str) -> PlayerRecord {
    PlayerRecord { user_id: user_id.to_string(), display_name: user_id.to_string(), rating: 1500, avatar: None, title: None }
}

pub fn fresh_session(variant_key: VariantKey, fen: &str, time_control: TimeControl, variant_state: VariantState, now_ms: u64) -> Session {
    Session {
        id: SessionId::new(),
        variant_key,
        players: EnumMapBy { white: player("white"), black: player("black") },
        status: SessionStatus::Active,
        fen: fen.to_string(),
        active_color: Force::White,
        move_history: Vec::new(),
        position_history: vec![fen.to_string()],
        repetition_map: Default::default(),
        main_clocks: EnumMapBy { white: time_control.base_time_ms, black: time_control.base_time_ms },
        time_control,
        turn_start_timestamp: now_ms,
        last_move_timestamp: now_ms,
        game_started: false,
        first_move_timestamp: None,
        captured_pieces: Default::default(),
        result: None,
        pending_draw_offer: None,
        variant_state,
        created_at: now_ms,
        last_activity: now_ms,
    }
}

// Invariant 15 (SPEC_FULL.md section 8): a `Session` round-trips through
// the Session Store's JSON encoding losslessly, including a paused
// piece-embedded drop timer, for every variant's state shape.

mod common;

use chess_core::clock::{BLITZ, CRAZYHOUSE, DECAY};
use chess_core::rules::{ClassicSubvariant, CrazyhouseSubvariant, VariantKey};
use chess_core::session::{
    CrazyhouseState, CrazyhouseTimerState, DecayState, PocketPiece, Session, SixPointerState, VariantState,
};
use chess_core::{PieceKind, Position};

fn round_trips(session: &Session) {
    let first = serde_json::to_string(session).expect("session should serialize");
    let restored: Session = serde_json::from_str(&first).expect("session should deserialize");
    let second = serde_json::to_string(&restored).expect("restored session should reserialize");
    assert_eq!(first, second, "session did not round-trip losslessly");
}

#[test]
fn classic_session_round_trips() {
    let fen = Position::standard_starting_position().to_fen();
    let session = common::fresh_session(VariantKey::Classic(ClassicSubvariant::Blitz), &fen, BLITZ, VariantState::Classic, 1_000);
    round_trips(&session);
}

#[test]
fn decay_session_round_trips_with_a_frozen_square() {
    let fen = Position::standard_starting_position().to_fen();
    let mut state = DecayState::default();
    state.queen_decay_timers.white.frozen = true;
    state.queen_decay_timers.white.time_remaining_ms = 0;
    state.frozen_pieces.white.push(chess_core::Coord::from_algebraic("d3").unwrap());
    let session = common::fresh_session(VariantKey::Decay, &fen, DECAY, VariantState::Decay(state), 1_000);
    round_trips(&session);
}

#[test]
fn crazyhouse_with_timer_round_trips_a_paused_drop_timer() {
    let fen = Position::standard_starting_position().to_fen();
    let mut state = CrazyhouseTimerState::default();
    state.next_piece_id = 2;
    state.pocketed_pieces.white.push(PocketPiece { id: 1, kind: PieceKind::Bishop, captured_at: 500, timer_paused: true, remaining_ms: Some(6_500) });
    let session = common::fresh_session(VariantKey::Crazyhouse(CrazyhouseSubvariant::WithTimer), &fen, CRAZYHOUSE, VariantState::CrazyhouseWithTimer(state), 1_000);
    round_trips(&session);
}

#[test]
fn crazyhouse_standard_round_trips_a_pocket() {
    let fen = Position::standard_starting_position().to_fen();
    let mut state = CrazyhouseState::default();
    state.pocketed_pieces.black.push(PocketPiece { id: 1, kind: PieceKind::Pawn, captured_at: 500, timer_paused: false, remaining_ms: None });
    let session = common::fresh_session(VariantKey::Crazyhouse(CrazyhouseSubvariant::Standard), &fen, CRAZYHOUSE, VariantState::Crazyhouse(state), 1_000);
    round_trips(&session);
}

#[test]
fn six_pointer_session_round_trips_with_a_foul_incident() {
    let mut state = SixPointerState::default();
    state.max_moves = 6;
    state.moves_played.white = 5;
    state.bonus_moves.black = 1;
    state.foul_incidents.push(chess_core::session::FoulIncident {
        kind: chess_core::session::FoulKind::FinalMoveRecapture,
        by: chess_core::Force::Black,
        timestamp: 1_500,
    });
    let fen = "r6r/8/8/8/7k/8/8/R3K3 w - - 0 1";
    let session = common::fresh_session(VariantKey::SixPointer, fen, VariantKey::SixPointer.time_control(), VariantState::SixPointer(state), 1_000);
    round_trips(&session);
}

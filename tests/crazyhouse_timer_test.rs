// S2 (SPEC_FULL.md section 8): a pocket piece whose drop timer has expired
// is evicted to `frozenPieces` the next time its owner's turn is processed.

mod common;

use chess_core::clock::CRAZYHOUSE;
use chess_core::engines::crazyhouse_timer::CrazyhouseTimerEngine;
use chess_core::engines::{Action, Outcome, VariantEngine};
use chess_core::rules::{CrazyhouseSubvariant, VariantKey};
use chess_core::session::{CrazyhouseTimerState, PocketPiece, VariantState};
use chess_core::{Coord, Force, PieceKind, Position};

#[test]
fn s2_expired_pocket_head_freezes_on_next_turn() {
    let t0 = 1_000_000u64;
    let mut state = CrazyhouseTimerState::default();
    state.next_piece_id = 1;
    state.pocketed_pieces.white.push(PocketPiece { id: 1, kind: PieceKind::Knight, captured_at: t0 - 12_000, timer_paused: false, remaining_ms: None });
    state.drop_timers.insert(1, t0 - 1);

    let mut session = common::fresh_session(VariantKey::Crazyhouse(CrazyhouseSubvariant::WithTimer), &Position::standard_starting_position().to_fen(), CRAZYHOUSE, VariantState::CrazyhouseWithTimer(state), t0 - 100);
    session.game_started = true;
    session.first_move_timestamp = Some(t0 - 12_000);

    let engine = CrazyhouseTimerEngine;
    let outcome = engine.validate_and_apply(&session, Action::Move { from: Coord::from_algebraic("e2").unwrap(), to: Coord::from_algebraic("e4").unwrap(), promotion: None }, Force::White, t0);

    let Outcome::Applied { session: after, .. } = outcome else { panic!("expected the move to apply") };
    let VariantState::CrazyhouseWithTimer(ref state) = after.variant_state else { unreachable!() };
    assert!(state.pocketed_pieces.white.is_empty());
    assert_eq!(state.frozen_pieces.white, vec![PieceKind::Knight]);
    assert!(!state.drop_timers.contains_key(&1));
}

#[test]
fn only_one_sides_pocket_timer_ticks_at_once() {
    let t0 = 1_000_000u64;
    let mut state = CrazyhouseTimerState::default();
    state.next_piece_id = 2;
    state.pocketed_pieces.white.push(PocketPiece { id: 1, kind: PieceKind::Knight, captured_at: t0 - 1_000, timer_paused: false, remaining_ms: None });
    state.drop_timers.insert(1, t0 + 5_000);
    state.pocketed_pieces.black.push(PocketPiece { id: 2, kind: PieceKind::Knight, captured_at: t0 - 1_000, timer_paused: true, remaining_ms: Some(7_000) });

    let mut session = common::fresh_session(VariantKey::Crazyhouse(CrazyhouseSubvariant::WithTimer), &Position::standard_starting_position().to_fen(), CRAZYHOUSE, VariantState::CrazyhouseWithTimer(state), t0);
    session.game_started = true;
    session.first_move_timestamp = Some(t0 - 1_000);

    let engine = CrazyhouseTimerEngine;
    let outcome = engine.validate_and_apply(&session, Action::Move { from: Coord::from_algebraic("e2").unwrap(), to: Coord::from_algebraic("e4").unwrap(), promotion: None }, Force::White, t0);
    let Outcome::Applied { session: after, .. } = outcome else { panic!("expected the move to apply") };
    let VariantState::CrazyhouseWithTimer(ref state) = after.variant_state else { unreachable!() };

    // White's head is now paused, black's is now the lone ticking timer.
    assert_eq!(state.drop_timers.len(), 1);
    assert!(state.drop_timers.contains_key(&2));
    assert!(!state.drop_timers.contains_key(&1));
    assert!(state.pocketed_pieces.white[0].timer_paused);
    assert_eq!(state.pocketed_pieces.white[0].remaining_ms, Some(5_000));
    assert!(!state.pocketed_pieces.black[0].timer_paused);
}

#[test]
fn dropping_a_non_head_piece_is_rejected() {
    let t0 = 1_000_000u64;
    let mut state = CrazyhouseTimerState::default();
    state.next_piece_id = 2;
    state.pocketed_pieces.white.push(PocketPiece { id: 1, kind: PieceKind::Knight, captured_at: t0, timer_paused: false, remaining_ms: None });
    state.pocketed_pieces.white.push(PocketPiece { id: 2, kind: PieceKind::Bishop, captured_at: t0, timer_paused: true, remaining_ms: Some(9_000) });
    state.drop_timers.insert(1, t0 + 10_000);

    let session = common::fresh_session(VariantKey::Crazyhouse(CrazyhouseSubvariant::WithTimer), &Position::standard_starting_position().to_fen(), CRAZYHOUSE, VariantState::CrazyhouseWithTimer(state), t0);
    let engine = CrazyhouseTimerEngine;
    let outcome = engine.validate_and_apply(&session, Action::Drop { piece: PieceKind::Bishop, to: Coord::from_algebraic("e4").unwrap() }, Force::White, t0 + 500);
    assert!(matches!(outcome, Outcome::Rejected { code: chess_core::ErrorCode::SequentialDropOnly, .. }));
}

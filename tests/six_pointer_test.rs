// S4 and S5 (SPEC_FULL.md section 8): Six-Pointer's non-fatal timeout
// penalty and the final-move-recapture bonus-move award.

mod common;

use chess_core::clock::SIX_POINTER_PER_MOVE_MS;
use chess_core::engines::six_pointer::SixPointerEngine;
use chess_core::engines::{Action, Outcome, VariantEngine};
use chess_core::rules::VariantKey;
use chess_core::session::{MoveKind, SessionStatus, SixPointerState, VariantState};
use chess_core::{Coord, Force, Position};

fn balanced_session(now_ms: u64) -> chess_core::session::Session {
    let mut state = SixPointerState::default();
    state.max_moves = 6;
    let time_control = VariantKey::SixPointer.time_control();
    common::fresh_session(VariantKey::SixPointer, &Position::standard_starting_position().to_fen(), time_control, VariantState::SixPointer(state), now_ms)
}

#[test]
fn s4_timeout_penalty_is_non_fatal_and_floors_at_zero() {
    let t0 = 1_000_000u64;
    let mut session = balanced_session(t0);
    session.game_started = true;
    session.first_move_timestamp = Some(t0);
    session.main_clocks.white = SIX_POINTER_PER_MOVE_MS;

    let engine = SixPointerEngine;
    let outcome = engine.validate_and_apply(&session, Action::Move { from: Coord::from_algebraic("e2").unwrap(), to: Coord::from_algebraic("e4").unwrap(), promotion: None }, Force::White, t0 + SIX_POINTER_PER_MOVE_MS);

    let Outcome::Applied { session: after, terminal } = outcome else { panic!("expected a non-fatal penalty application") };
    assert!(!terminal);
    assert_eq!(after.status, SessionStatus::Active);
    let VariantState::SixPointer(ref state) = after.variant_state else { unreachable!() };
    assert_eq!(state.points.white, 0);
    assert_eq!(state.timeout_penalties.white, 1);
    assert_eq!(state.moves_played.white, 1);
    assert_eq!(after.main_clocks.white, SIX_POINTER_PER_MOVE_MS);
    assert_eq!(after.main_clocks.black, SIX_POINTER_PER_MOVE_MS);
    assert_eq!(after.active_color, Force::Black);
    assert_eq!(after.move_history.last().unwrap().kind, MoveKind::Timeout);
}

#[test]
fn timeout_penalty_cannot_apply_twice_without_an_intervening_move() {
    let t0 = 1_000_000u64;
    let mut session = balanced_session(t0);
    session.game_started = true;
    session.first_move_timestamp = Some(t0);
    session.main_clocks.white = SIX_POINTER_PER_MOVE_MS;

    let engine = SixPointerEngine;
    let outcome = engine.validate_and_apply(&session, Action::Move { from: Coord::from_algebraic("e2").unwrap(), to: Coord::from_algebraic("e4").unwrap(), promotion: None }, Force::White, t0 + SIX_POINTER_PER_MOVE_MS);
    let Outcome::Applied { session: after, .. } = outcome else { panic!("expected the first timeout penalty to apply") };
    assert_eq!(after.active_color, Force::Black);

    // White is no longer on move, so a second timeout/move attempt for white
    // is rejected rather than penalizing white again.
    let retry = engine.validate_and_apply(&after, Action::Move { from: Coord::from_algebraic("d2").unwrap(), to: Coord::from_algebraic("d4").unwrap(), promotion: None }, Force::White, t0 + SIX_POINTER_PER_MOVE_MS + 1);
    assert!(matches!(retry, Outcome::Rejected { code: chess_core::ErrorCode::WrongTurn, .. }));
    let VariantState::SixPointer(ref state) = after.variant_state else { unreachable!() };
    assert_eq!(state.timeout_penalties.white, 1);
}

#[test]
fn s5_final_move_recapture_awards_a_bonus_move() {
    let t0 = 1_000_000u64;
    // White's rook takes black's rook on a8 on white's 6th (final) move;
    // black is also at its cap but has a clear-file rook recapture on a8.
    let fen = "r6r/8/8/8/7k/8/8/R3K3 w - - 0 1";
    let mut state = SixPointerState::default();
    state.max_moves = 6;
    state.moves_played.white = 5;
    state.moves_played.black = 6;
    let mut session = common::fresh_session(VariantKey::SixPointer, fen, VariantKey::SixPointer.time_control(), VariantState::SixPointer(state), t0);
    session.game_started = true;
    session.first_move_timestamp = Some(t0);

    let engine = SixPointerEngine;
    let outcome = engine.validate_and_apply(&session, Action::Move { from: Coord::from_algebraic("a1").unwrap(), to: Coord::from_algebraic("a8").unwrap(), promotion: None }, Force::White, t0 + 1_000);

    let Outcome::Applied { session: after, .. } = outcome else { panic!("expected the capture to apply") };
    let VariantState::SixPointer(ref state) = after.variant_state else { unreachable!() };
    assert_eq!(state.bonus_moves.black, 1);
    assert_eq!(state.foul_incidents.len(), 1);
    assert_eq!(after.status, SessionStatus::Active);
}

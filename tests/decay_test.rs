// S3 (SPEC_FULL.md section 8): queen decay freeze, major-piece takeover,
// and the single-track invariant (6) that a major timer never arms while
// the queen's hasn't already frozen, nor do both run at once.

mod common;

use chess_core::clock::DECAY;
use chess_core::engines::decay::DecayEngine;
use chess_core::engines::{Action, Outcome, VariantEngine};
use chess_core::rules::VariantKey;
use chess_core::session::{DecayState, VariantState};
use chess_core::{Coord, Force, Position};

fn mv(engine: &DecayEngine, session: &chess_core::session::Session, from: &str, to: &str, acting: Force, now_ms: u64) -> chess_core::session::Session {
    let action = Action::Move { from: Coord::from_algebraic(from).unwrap(), to: Coord::from_algebraic(to).unwrap(), promotion: None };
    match engine.validate_and_apply(session, action, acting, now_ms) {
        Outcome::Applied { session, .. } => session,
        other => panic!("expected the move to apply, got {other:?}"),
    }
}

#[test]
fn s3_queen_freeze_then_major_takeover() {
    let t0 = 1_000_000u64;
    let mut session = common::fresh_session(VariantKey::Decay, &Position::standard_starting_position().to_fen(), DECAY, VariantState::Decay(DecayState::default()), t0);
    let engine = DecayEngine;

    session = mv(&engine, &session, "d2", "d4", Force::White, t0);
    session = mv(&engine, &session, "d7", "d5", Force::Black, t0 + 500);
    session = mv(&engine, &session, "d1", "d3", Force::White, t0 + 1_000);
    let VariantState::Decay(ref state) = session.variant_state else { unreachable!() };
    assert!(state.queen_decay_timers.white.active);
    assert_eq!(state.queen_decay_timers.white.time_remaining_ms, 25_000);
    assert_eq!(state.queen_decay_timers.white.square, Some(Coord::from_algebraic("d3").unwrap()));

    // 26s of white-on-move time elapse without moving the queen again.
    let mut clock = t0 + 1_000;
    session = mv(&engine, &session, "d5", "d4", Force::Black, clock + 200);
    clock += 26_000;
    session = mv(&engine, &session, "g1", "f3", Force::White, clock);
    let VariantState::Decay(ref state) = session.variant_state else { unreachable!() };
    assert!(state.queen_decay_timers.white.frozen);
    assert!(state.frozen_pieces.white.contains(&Coord::from_algebraic("d3").unwrap()));

    // A later knight move arms the major timer, since the queen is frozen.
    session = mv(&engine, &session, "c8", "f5", Force::Black, clock + 200);
    clock += 300;
    session = mv(&engine, &session, "f3", "e5", Force::White, clock);
    let VariantState::Decay(ref state) = session.variant_state else { unreachable!() };
    assert!(state.major_piece_decay_timers.white.active);
    assert_eq!(state.major_piece_decay_timers.white.time_remaining_ms, 20_000);
    // Single-track invariant: never both active at once.
    assert!(!(state.queen_decay_timers.white.active && state.major_piece_decay_timers.white.active));
}

#[test]
fn capturing_a_frozen_piece_clears_its_square() {
    let t0 = 1_000_000u64;
    // White bishop a1, black knight frozen on e5, kings out of the way.
    let fen = "7k/8/8/4n3/8/8/8/B3K3 w - - 0 1";
    let mut state = DecayState::default();
    let e5 = Coord::from_algebraic("e5").unwrap();
    state.frozen_pieces.black.push(e5);
    let session = common::fresh_session(VariantKey::Decay, fen, DECAY, VariantState::Decay(state), t0);

    let engine = DecayEngine;
    let outcome = engine.validate_and_apply(&session, Action::Move { from: Coord::from_algebraic("a1").unwrap(), to: e5, promotion: None }, Force::White, t0);
    let Outcome::Applied { session: after, .. } = outcome else { panic!("expected the capture to apply") };
    let VariantState::Decay(ref state) = after.variant_state else { unreachable!() };
    assert!(!state.frozen_pieces.black.contains(&e5), "the captured piece's square should no longer be frozen");
}

#[test]
fn frozen_piece_cannot_move() {
    let t0 = 1_000_000u64;
    let session = common::fresh_session(VariantKey::Decay, &Position::standard_starting_position().to_fen(), DECAY, VariantState::Decay(DecayState::default()), t0);
    let mut state = DecayState::default();
    let from = Coord::from_algebraic("e2").unwrap();
    state.frozen_pieces.white.push(from);
    let session = chess_core::session::Session { variant_state: VariantState::Decay(state), ..session };

    let engine = DecayEngine;
    let outcome = engine.validate_and_apply(&session, Action::Move { from, to: Coord::from_algebraic("e4").unwrap(), promotion: None }, Force::White, t0);
    assert!(matches!(outcome, Outcome::Rejected { code: chess_core::ErrorCode::PieceFrozen, .. }));
}

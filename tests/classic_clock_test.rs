// S1 (SPEC_FULL.md section 8) and invariants 1-3 for the plain Classic
// engine: first-move timing, clock conservation, and turn alternation.

mod common;

use chess_core::clock::BLITZ;
use chess_core::engines::classic::ClassicEngine;
use chess_core::engines::{Action, Outcome, VariantEngine};
use chess_core::rules::{ClassicSubvariant, VariantKey};
use chess_core::session::VariantState;
use chess_core::{Coord, Force, Position};

#[test]
fn s1_first_move_does_not_charge_the_clock() {
    let t0 = 1_000_000u64;
    let session = common::fresh_session(VariantKey::Classic(ClassicSubvariant::Blitz), &Position::standard_starting_position().to_fen(), BLITZ, VariantState::Classic, t0);

    let engine = ClassicEngine;
    let from = Coord::from_algebraic("e2").unwrap();
    let to = Coord::from_algebraic("e4").unwrap();
    let outcome = engine.validate_and_apply(&session, Action::Move { from, to, promotion: None }, Force::White, t0);

    let Outcome::Applied { session: after, terminal } = outcome else { panic!("expected the move to apply") };
    assert!(!terminal);
    assert_eq!(after.main_clocks.white, 180_000);
    assert!(after.game_started);
    assert_eq!(after.first_move_timestamp, Some(t0));
    assert_eq!(after.turn_start_timestamp, t0);
    assert_eq!(after.active_color, Force::Black);
}

#[test]
fn clock_conservation_on_a_later_move() {
    let t0 = 1_000_000u64;
    let mut session = common::fresh_session(VariantKey::Classic(ClassicSubvariant::Blitz), &Position::standard_starting_position().to_fen(), BLITZ, VariantState::Classic, t0);
    session.game_started = true;
    session.first_move_timestamp = Some(t0);

    let engine = ClassicEngine;
    let elapsed = 5_000u64;
    let from = Coord::from_algebraic("e2").unwrap();
    let to = Coord::from_algebraic("e4").unwrap();
    let outcome = engine.validate_and_apply(&session, Action::Move { from, to, promotion: None }, Force::White, t0 + elapsed);

    let Outcome::Applied { session: after, .. } = outcome else { panic!("expected the move to apply") };
    // BLITZ increment is 2_000ms, so net charge is elapsed - increment.
    assert_eq!(after.main_clocks.white, 180_000 - elapsed + 2_000);
}

#[test]
fn wrong_turn_is_rejected() {
    let t0 = 1_000_000u64;
    let session = common::fresh_session(VariantKey::Classic(ClassicSubvariant::Blitz), &Position::standard_starting_position().to_fen(), BLITZ, VariantState::Classic, t0);
    let engine = ClassicEngine;
    let from = Coord::from_algebraic("e7").unwrap();
    let to = Coord::from_algebraic("e5").unwrap();
    let outcome = engine.validate_and_apply(&session, Action::Move { from, to, promotion: None }, Force::Black, t0);
    assert!(matches!(outcome, Outcome::Rejected { .. }));
}

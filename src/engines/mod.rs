// The variant engines (component E). Common contract and shared preamble /
// postamble logic grounded on `board.rs::try_turn`'s shape (validate, apply,
// check mate, flip side, restart clock) but driven entirely by the explicit
// `now_ms` argument instead of a clock owned by a mutable `Board`, since
// these engines must be pure functions of `(state, action, now_ms)`
// (SPEC_FULL.md section 4.E).

pub mod classic;
pub mod crazyhouse_standard;
pub mod crazyhouse_timer;
pub mod decay;
pub mod six_pointer;

use crate::clock;
use crate::coord::Coord;
use crate::error::{CoreError, ErrorCode};
use crate::force::Force;
use crate::piece::PieceKind;
use crate::position::Position;
use crate::session::{GameResult, MoveKind, MoveRecord, ResultRecord, Session, SessionStatus};

#[derive(Clone, Copy, Debug)]
pub enum Action {
    Move { from: Coord, to: Coord, promotion: Option<PieceKind> },
    Drop { piece: PieceKind, to: Coord },
    TimeoutPenalty,
}

#[derive(Debug)]
pub enum Outcome {
    Applied { session: Session, terminal: bool },
    Rejected { code: ErrorCode, message: String },
    Warning { code: ErrorCode, message: String, session: Session },
}

impl From<CoreError> for Outcome {
    fn from(e: CoreError) -> Self {
        Outcome::Rejected { code: e.code, message: e.message }
    }
}

pub trait VariantEngine {
    fn validate_and_apply(&self, session: &Session, action: Action, acting: Force, now_ms: u64) -> Outcome;
    fn legal_actions(&self, session: &Session, acting: Force, now_ms: u64) -> Vec<Action>;
}

pub fn current_position(session: &Session) -> Result<Position, CoreError> {
    Position::from_fen(&session.fen)
}

/// Common preamble steps 1-5 of SPEC_FULL.md section 4.E. Charges elapsed
/// time against the mover's clock (or starts it, if this is the first move
/// of the game) and reports whether the mover's main clock has hit zero.
/// Does not mutate `session.status` — timeout resolution is variant-specific
/// (fatal everywhere except Six-Pointer).
pub fn begin_turn(session: &mut Session, acting: Force, now_ms: u64) -> Result<bool, CoreError> {
    if session.status != SessionStatus::Active {
        return Err(CoreError::new(ErrorCode::GameEnded, "session already finished"));
    }
    if acting != session.active_color {
        return Err(CoreError::new(ErrorCode::WrongTurn, "it is not this player's turn"));
    }
    if !session.game_started {
        session.game_started = true;
        session.first_move_timestamp = Some(now_ms);
        session.turn_start_timestamp = now_ms;
        return Ok(false);
    }
    let charged = clock::charge_elapsed(*session.main_clocks.get(acting), session.turn_start_timestamp, now_ms);
    *session.main_clocks.get_mut(acting) = charged;
    Ok(charged == 0)
}

/// Finalizes a successfully-applied move/drop: records it, advances the FEN
/// and position history, applies the increment, flips the turn-start clock,
/// and evaluates terminal status in the order mandated by SPEC_FULL.md
/// section 4.E ("Terminal detection ordering"). `threefold` selects between
/// the uniform threefold draw trigger and the fivefold safety net described
/// in section 9; both are always checked, threefold takes priority.
pub fn finish_turn(
    session: &mut Session,
    mover: Force,
    next_position: &Position,
    san: String,
    kind: MoveKind,
    now_ms: u64,
) -> Option<ResultRecord> {
    let new_fen = next_position.to_fen();
    session.move_history.push(MoveRecord { by: mover, san, fen_after: new_fen.clone(), timestamp: now_ms, kind });
    session.fen = new_fen.clone();
    session.position_history.push(new_fen.clone());
    session.active_color = next_position.active_force;
    session.last_move_timestamp = now_ms;
    let time_control = session.time_control;
    let incremented = clock::apply_increment(*session.main_clocks.get(mover), time_control.increment_ms, time_control.base_time_ms);
    *session.main_clocks.get_mut(mover) = incremented;
    session.turn_start_timestamp = now_ms;

    let rep_key = session.repetition_key(&new_fen);
    let count = session.repetition_map.entry(rep_key).or_insert(0);
    *count += 1;
    let repeated_threefold = *count >= 3;
    let repeated_fivefold = *count >= 5;

    let result = if next_position.is_checkmate() {
        Some(GameResult::Checkmate)
    } else if next_position.is_stalemate() {
        Some(GameResult::Stalemate)
    } else if next_position.has_insufficient_material() {
        Some(GameResult::InsufficientMaterial)
    } else if repeated_threefold || repeated_fivefold {
        Some(GameResult::Repetition)
    } else if next_position.halfmove_clock >= 100 {
        Some(GameResult::MoveRule)
    } else {
        None
    };

    result.map(|r| {
        let winner = match r {
            GameResult::Checkmate => Some(mover),
            _ => None,
        };
        let record = ResultRecord { result: r, winner, ended_at: now_ms };
        session.status = SessionStatus::Finished;
        session.result = Some(record.clone());
        record
    })
}

pub fn resolve_timeout(session: &mut Session, loser: Force, now_ms: u64) -> ResultRecord {
    let record = ResultRecord { result: GameResult::Timeout, winner: Some(loser.opponent()), ended_at: now_ms };
    session.status = SessionStatus::Finished;
    session.result = Some(record.clone());
    record
}

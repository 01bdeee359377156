// Six-Pointer (SPEC_FULL.md section 4.E.4). A capped-move-count, points-
// scoring variant with a non-cumulative per-move clock and a non-fatal
// timeout penalty. Grounded on `board.rs::try_turn`'s validate/apply shape;
// the move-count cap and points bookkeeping are new (the teacher has no
// concept of either).

use crate::clock::SIX_POINTER_PER_MOVE_MS;
use crate::engines::{current_position, finish_turn, Action, Outcome, VariantEngine};
use crate::error::{CoreError, ErrorCode};
use crate::force::Force;
use crate::position::Move;
use crate::session::{FoulIncident, FoulKind, GameResult, MoveKind, MoveRecord, ResultRecord, Session, SessionStatus, VariantState};

pub struct SixPointerEngine;

impl VariantEngine for SixPointerEngine {
    fn validate_and_apply(&self, session: &Session, action: Action, acting: Force, now_ms: u64) -> Outcome {
        match self.try_validate_and_apply(session, action, acting, now_ms) {
            Ok(outcome) => outcome,
            Err(e) => e.into(),
        }
    }

    fn legal_actions(&self, session: &Session, acting: Force, now_ms: u64) -> Vec<Action> {
        let _ = now_ms;
        if session.active_color != acting {
            return Vec::new();
        }
        let VariantState::SixPointer(state) = &session.variant_state else { return Vec::new() };
        if *state.moves_played.get(acting) + *state.bonus_moves.get(acting) >= state.max_moves {
            return Vec::new();
        }
        let Ok(position) = current_position(session) else { return Vec::new() };
        position
            .legal_moves()
            .into_iter()
            .filter_map(|mv| match mv {
                Move::Normal { from, to, promotion } => Some(Action::Move { from, to, promotion }),
                Move::Castle(_) => None,
            })
            .collect()
    }
}

impl SixPointerEngine {
    fn try_validate_and_apply(&self, session: &Session, action: Action, acting: Force, now_ms: u64) -> Result<Outcome, CoreError> {
        let mut session = session.clone();
        if session.status != SessionStatus::Active {
            return Err(CoreError::new(ErrorCode::GameEnded, "session already finished"));
        }
        if acting != session.active_color {
            return Err(CoreError::new(ErrorCode::WrongTurn, "it is not this player's turn"));
        }
        let timed_out = if session.game_started {
            let charged = crate::clock::charge_elapsed(*session.main_clocks.get(acting), session.turn_start_timestamp, now_ms);
            *session.main_clocks.get_mut(acting) = charged;
            charged == 0
        } else {
            session.game_started = true;
            session.first_move_timestamp = Some(now_ms);
            session.turn_start_timestamp = now_ms;
            false
        };
        if timed_out {
            return Ok(Outcome::Applied { session: self.apply_timeout_penalty(session, acting, now_ms), terminal: false });
        }

        let (from, to, promotion) = match action {
            Action::Move { from, to, promotion } => (from, to, promotion),
            Action::TimeoutPenalty => {
                return Err(CoreError::new(ErrorCode::InvalidState, "per-move clock has not expired yet"));
            }
            Action::Drop { .. } => return Err(CoreError::new(ErrorCode::InvalidInput, "six-pointer has no drops")),
        };
        {
            let VariantState::SixPointer(ref state) = session.variant_state else {
                return Err(CoreError::new(ErrorCode::InvalidState, "session is not configured for six-pointer"));
            };
            if *state.moves_played.get(acting) + *state.bonus_moves.get(acting) >= state.max_moves {
                return Err(CoreError::new(ErrorCode::MoveLimitExceeded, "no moves remain under this player's cap"));
            }
        }

        let position = current_position(&session)?;
        let mv = position.move_from_coords(from, to, promotion);
        let san = position.to_san(mv);
        let (next, captured) = position.apply_move(mv)?;

        let VariantState::SixPointer(ref mut state) = session.variant_state else { unreachable!() };
        if let Some(kind) = captured {
            *state.points.get_mut(acting) += kind.point_value();
        }
        *state.moves_played.get_mut(acting) += 1;

        let mover_at_cap = *state.moves_played.get(acting) + *state.bonus_moves.get(acting) >= state.max_moves;
        if mover_at_cap && captured.is_some() {
            let opponent = acting.opponent();
            let opponent_at_cap = *state.moves_played.get(opponent) + *state.bonus_moves.get(opponent) >= state.max_moves;
            if opponent_at_cap {
                let opponent_has_recapture = next.legal_moves().iter().any(|m| matches!(m, Move::Normal { to: t, .. } if *t == to));
                if opponent_has_recapture {
                    *state.bonus_moves.get_mut(opponent) += 1;
                    state.foul_incidents.push(FoulIncident { kind: FoulKind::FinalMoveRecapture, by: acting, timestamp: now_ms });
                }
            }
        }

        let terminal = finish_turn(&mut session, acting, &next, san, MoveKind::Move, now_ms);
        session.main_clocks.white = SIX_POINTER_PER_MOVE_MS;
        session.main_clocks.black = SIX_POINTER_PER_MOVE_MS;

        let terminal = if terminal.is_some() {
            terminal
        } else {
            let VariantState::SixPointer(ref state) = session.variant_state else { unreachable!() };
            let white_done = *state.moves_played.get(Force::White) + *state.bonus_moves.get(Force::White) >= state.max_moves;
            let black_done = *state.moves_played.get(Force::Black) + *state.bonus_moves.get(Force::Black) >= state.max_moves;
            if white_done && black_done {
                let winner = match state.points.white.cmp(&state.points.black) {
                    std::cmp::Ordering::Greater => Some(Force::White),
                    std::cmp::Ordering::Less => Some(Force::Black),
                    std::cmp::Ordering::Equal => None,
                };
                let record = ResultRecord { result: GameResult::Points, winner, ended_at: now_ms };
                session.status = SessionStatus::Finished;
                session.result = Some(record.clone());
                Some(record)
            } else {
                None
            }
        };

        Ok(Outcome::Applied { session, terminal: terminal.is_some() })
    }

    /// Non-fatal timeout: penalizes the mover and passes the turn instead of
    /// ending the session (SPEC_FULL.md section 4.E.4, "Timeout penalty").
    fn apply_timeout_penalty(&self, mut session: Session, loser: Force, now_ms: u64) -> Session {
        let fen_after = {
            let mut position = current_position(&session).expect("stored FEN must remain valid");
            position.active_force = loser.opponent();
            position.to_fen()
        };
        {
            let VariantState::SixPointer(ref mut state) = session.variant_state else {
                unreachable!("apply_timeout_penalty only called for six-pointer sessions")
            };
            *state.points.get_mut(loser) = state.points.get(loser).saturating_sub(1);
            *state.timeout_penalties.get_mut(loser) += 1;
            *state.last_timeout_penalty.get_mut(loser) = Some(now_ms);
            *state.moves_played.get_mut(loser) += 1;
        }
        session.move_history.push(MoveRecord { by: loser, san: "timeout".to_string(), fen_after: fen_after.clone(), timestamp: now_ms, kind: MoveKind::Timeout });
        session.fen = fen_after.clone();
        session.position_history.push(fen_after);
        session.main_clocks.white = SIX_POINTER_PER_MOVE_MS;
        session.main_clocks.black = SIX_POINTER_PER_MOVE_MS;
        session.active_color = loser.opponent();
        session.turn_start_timestamp = now_ms;
        session.last_move_timestamp = now_ms;
        session
    }
}

// Crazyhouse with Drop Timer (SPEC_FULL.md section 4.E.3). Adds the
// sequential drop-timer state machine on top of crazyhouse_standard's
// capture/drop mechanics: only the head of a color's pocket may carry an
// active timer, only the head of the mover's pocket is droppable, and the
// timer is paused (stashed on the piece, not as a live timestamp) whenever
// it is not that color's turn, so it survives a store round-trip.

use crate::clock::DROP_TIMER_MS;
use crate::engines::{begin_turn, current_position, finish_turn, resolve_timeout, Action, Outcome, VariantEngine};
use crate::error::{CoreError, ErrorCode};
use crate::force::Force;
use crate::piece::PieceKind;
use crate::position::Move;
use crate::session::{CrazyhouseTimerState, MoveKind, PocketPiece, Session, VariantState};

pub struct CrazyhouseTimerEngine;

fn head(state: &CrazyhouseTimerState, force: Force) -> Option<PocketPiece> {
    state.pocketed_pieces.get(force).first().copied()
}

/// Evicts the mover's head if its timer has expired as of `now_ms`, arming
/// a fresh full timer on the new head if it is a non-pawn. Returns the
/// evicted piece's kind, if any.
fn expire_head_if_needed(state: &mut CrazyhouseTimerState, force: Force, now_ms: u64) -> Option<PieceKind> {
    let Some(h) = head(state, force) else { return None };
    let expiration = *state.drop_timers.get(&h.id)?;
    if now_ms < expiration {
        return None;
    }
    state.pocketed_pieces.get_mut(force).remove(0);
    state.drop_timers.remove(&h.id);
    state.frozen_pieces.get_mut(force).push(h.kind);
    if let Some(next_head) = head(state, force) {
        if next_head.kind != PieceKind::Pawn {
            state.drop_timers.insert(next_head.id, now_ms + DROP_TIMER_MS);
        }
    }
    Some(h.kind)
}

fn arm_head_if_idle(state: &mut CrazyhouseTimerState, force: Force, now_ms: u64) {
    if let Some(h) = head(state, force) {
        if h.kind != PieceKind::Pawn && !state.drop_timers.contains_key(&h.id) && !h.timer_paused {
            state.drop_timers.insert(h.id, now_ms + DROP_TIMER_MS);
        }
    }
}

/// Called once a move/drop has actually changed whose turn it is: pauses
/// the side that just moved's head (if ticking) and resumes or freshly arms
/// the side now on move's head.
fn transition_turn(state: &mut CrazyhouseTimerState, old_mover: Force, now_ms: u64) {
    if let Some(h) = head(state, old_mover) {
        if let Some(expiration) = state.drop_timers.remove(&h.id) {
            let remaining = expiration.saturating_sub(now_ms);
            if let Some(h_mut) = state.pocketed_pieces.get_mut(old_mover).first_mut() {
                h_mut.timer_paused = true;
                h_mut.remaining_ms = Some(remaining);
            }
        }
    }
    let new_mover = old_mover.opponent();
    if let Some(h) = head(state, new_mover) {
        if h.kind != PieceKind::Pawn {
            if h.timer_paused {
                let remaining = h.remaining_ms.unwrap_or(DROP_TIMER_MS);
                if let Some(h_mut) = state.pocketed_pieces.get_mut(new_mover).first_mut() {
                    h_mut.timer_paused = false;
                    h_mut.remaining_ms = None;
                }
                state.drop_timers.insert(h.id, now_ms + remaining);
            } else if !state.drop_timers.contains_key(&h.id) {
                state.drop_timers.insert(h.id, now_ms + DROP_TIMER_MS);
            }
        }
    }
}

impl VariantEngine for CrazyhouseTimerEngine {
    fn validate_and_apply(&self, session: &Session, action: Action, acting: Force, now_ms: u64) -> Outcome {
        match self.try_validate_and_apply(session, action, acting, now_ms) {
            Ok(outcome) => outcome,
            Err(e) => e.into(),
        }
    }

    fn legal_actions(&self, session: &Session, acting: Force, now_ms: u64) -> Vec<Action> {
        if session.active_color != acting {
            return Vec::new();
        }
        let Ok(position) = current_position(session) else { return Vec::new() };
        let mut actions: Vec<Action> = position
            .legal_moves()
            .into_iter()
            .filter_map(|mv| match mv {
                Move::Normal { from, to, promotion } => Some(Action::Move { from, to, promotion }),
                Move::Castle(_) => None,
            })
            .collect();
        if let VariantState::CrazyhouseWithTimer(state) = &session.variant_state {
            let expired = state
                .drop_timers
                .get(&head(state, acting).map(|h| h.id).unwrap_or(u64::MAX))
                .map(|&exp| now_ms >= exp)
                .unwrap_or(false);
            if !expired {
                if let Some(h) = head(state, acting) {
                    for to in crate::coord::Coord::all() {
                        if position.grid[to].is_none() {
                            actions.push(Action::Drop { piece: h.kind, to });
                        }
                    }
                }
            }
        }
        actions
    }
}

impl CrazyhouseTimerEngine {
    fn try_validate_and_apply(&self, session: &Session, action: Action, acting: Force, now_ms: u64) -> Result<Outcome, CoreError> {
        let mut session = session.clone();
        let timed_out = begin_turn(&mut session, acting, now_ms)?;
        if timed_out {
            resolve_timeout(&mut session, acting, now_ms);
            return Ok(Outcome::Applied { session, terminal: true });
        }
        let position = current_position(&session)?;
        let VariantState::CrazyhouseWithTimer(ref mut state) = session.variant_state else {
            return Err(CoreError::new(ErrorCode::InvalidState, "session is not configured for crazyhouse with timer"));
        };
        let expired_kind = expire_head_if_needed(state, acting, now_ms);

        match action {
            Action::Move { from, to, promotion } => {
                let mv = position.move_from_coords(from, to, promotion);
                let san = position.to_san(mv);
                let (next, captured) = position.apply_move(mv)?;
                if let Some(kind) = captured {
                    let VariantState::CrazyhouseWithTimer(ref mut state) = session.variant_state else { unreachable!() };
                    state.next_piece_id += 1;
                    let id = state.next_piece_id;
                    state.pocketed_pieces.get_mut(acting).push(PocketPiece {
                        id,
                        kind,
                        captured_at: now_ms,
                        timer_paused: false,
                        remaining_ms: None,
                    });
                    if kind != PieceKind::Pawn {
                        arm_head_if_idle(state, acting, now_ms);
                    }
                    session.captured_pieces.get_mut(acting.opponent()).push(kind);
                }
                let terminal = finish_turn(&mut session, acting, &next, san, MoveKind::Move, now_ms);
                if terminal.is_none() {
                    let VariantState::CrazyhouseWithTimer(ref mut state) = session.variant_state else { unreachable!() };
                    transition_turn(state, acting, now_ms);
                }
                Ok(Outcome::Applied { session, terminal: terminal.is_some() })
            }
            Action::Drop { piece, to } => {
                if expired_kind == Some(piece) {
                    session.turn_start_timestamp = now_ms;
                    return Ok(Outcome::Warning {
                        code: ErrorCode::DropExpired,
                        message: "drop timer expired; piece forfeited".to_string(),
                        session,
                    });
                }
                let VariantState::CrazyhouseWithTimer(ref state) = session.variant_state else { unreachable!() };
                let head_piece = head(state, acting).ok_or_else(|| CoreError::new(ErrorCode::PieceNotInPocket, "pocket is empty"))?;
                if head_piece.kind != piece {
                    return Err(CoreError::new(ErrorCode::SequentialDropOnly, "only the head of the pocket may be dropped"));
                }
                let next = position.put_piece(acting, piece, to)?;
                let VariantState::CrazyhouseWithTimer(ref mut state) = session.variant_state else { unreachable!() };
                state.pocketed_pieces.get_mut(acting).remove(0);
                state.drop_timers.remove(&head_piece.id);
                let san = format!("{}@{}", piece.to_fen_letter(Force::White), to.to_algebraic());
                let terminal = finish_turn(&mut session, acting, &next, san, MoveKind::Drop, now_ms);
                if terminal.is_none() {
                    let VariantState::CrazyhouseWithTimer(ref mut state) = session.variant_state else { unreachable!() };
                    transition_turn(state, acting, now_ms);
                }
                Ok(Outcome::Applied { session, terminal: terminal.is_some() })
            }
            Action::TimeoutPenalty => Err(CoreError::new(ErrorCode::InvalidInput, "crazyhouse with timer has no timeout penalty action")),
        }
    }
}

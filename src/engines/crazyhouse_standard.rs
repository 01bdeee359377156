// Crazyhouse Standard (SPEC_FULL.md section 4.E.2). Captures feed the
// capturer's pocket (a multiset per section 9's resolved ambiguity: any
// pocketed type may be dropped, since no timer constrains ordering here).
// Drops use `Position::put_piece`, the drop primitive grounded on
// `board.rs::try_turn`'s `Turn::Drop` handling and `is_bughouse_mate_to`'s
// virtual-placement technique (generalized to a single put instead of a
// full drop-aggression sweep, since this variant has no mate-allowed knob).

use crate::engines::{begin_turn, current_position, finish_turn, resolve_timeout, Action, Outcome, VariantEngine};
use crate::error::{CoreError, ErrorCode};
use crate::force::Force;
use crate::position::Move;
use crate::session::{MoveKind, PocketPiece, Session, VariantState};

pub struct CrazyhouseStandardEngine;

impl VariantEngine for CrazyhouseStandardEngine {
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
        let Ok(position) = current_position(session) else { return Vec::new() };
        let mut actions: Vec<Action> = position
            .legal_moves()
            .into_iter()
            .filter_map(|mv| match mv {
                Move::Normal { from, to, promotion } => Some(Action::Move { from, to, promotion }),
                Move::Castle(_) => None,
            })
            .collect();
        if let VariantState::Crazyhouse(state) = &session.variant_state {
            let mut kinds: Vec<_> = state.pocketed_pieces.get(acting).iter().map(|p| p.kind).collect();
            kinds.sort_by_key(|k| format!("{k:?}"));
            kinds.dedup();
            for kind in kinds {
                for to in crate::coord::Coord::all() {
                    if position.grid[to].is_none() {
                        actions.push(Action::Drop { piece: kind, to });
                    }
                }
            }
        }
        actions
    }
}

impl CrazyhouseStandardEngine {
    fn try_validate_and_apply(&self, session: &Session, action: Action, acting: Force, now_ms: u64) -> Result<Outcome, CoreError> {
        let mut session = session.clone();
        let timed_out = begin_turn(&mut session, acting, now_ms)?;
        if timed_out {
            resolve_timeout(&mut session, acting, now_ms);
            return Ok(Outcome::Applied { session, terminal: true });
        }
        let position = current_position(&session)?;
        let VariantState::Crazyhouse(ref mut state) = session.variant_state else {
            return Err(CoreError::new(ErrorCode::InvalidState, "session is not configured for crazyhouse standard"));
        };
        match action {
            Action::Move { from, to, promotion } => {
                let mv = position.move_from_coords(from, to, promotion);
                let san = position.to_san(mv);
                let (next, captured) = position.apply_move(mv)?;
                if let Some(kind) = captured {
                    state.pocketed_pieces.get_mut(acting).push(PocketPiece {
                        id: 0,
                        kind,
                        captured_at: now_ms,
                        timer_paused: false,
                        remaining_ms: None,
                    });
                    session.captured_pieces.get_mut(acting.opponent()).push(kind);
                }
                let terminal = finish_turn(&mut session, acting, &next, san, MoveKind::Move, now_ms);
                Ok(Outcome::Applied { session, terminal: terminal.is_some() })
            }
            Action::Drop { piece, to } => {
                let VariantState::Crazyhouse(ref mut state) = session.variant_state else { unreachable!() };
                let pocket = state.pocketed_pieces.get_mut(acting);
                let idx = pocket
                    .iter()
                    .position(|p| p.kind == piece)
                    .ok_or_else(|| CoreError::new(ErrorCode::PieceNotInPocket, "piece not in pocket"))?;
                let next = position.put_piece(acting, piece, to)?;
                pocket.remove(idx);
                let san = format!("{}@{}", piece.to_fen_letter(Force::White), to.to_algebraic());
                let terminal = finish_turn(&mut session, acting, &next, san, MoveKind::Drop, now_ms);
                Ok(Outcome::Applied { session, terminal: terminal.is_some() })
            }
            Action::TimeoutPenalty => Err(CoreError::new(ErrorCode::InvalidInput, "crazyhouse standard has no timeout penalty action")),
        }
    }
}

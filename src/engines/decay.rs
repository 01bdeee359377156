// Decay (SPEC_FULL.md section 4.E.5). Queen and, later, a single major
// piece per color carry an independent countdown that freezes the piece on
// expiry. Grounded on `board.rs::try_turn`'s validate/apply/flip shape, with
// the timer aging folded into the preamble the way the common
// `engines::mod` preamble ages the main clock.

use crate::engines::{begin_turn, current_position, finish_turn, resolve_timeout, Action, Outcome, VariantEngine};
use crate::error::{CoreError, ErrorCode};
use crate::force::Force;
use crate::piece::PieceKind;
use crate::position::{Move, Position};
use crate::session::{DecayState, DecayTimer, MoveKind, Session, VariantState};

pub struct DecayEngine;

fn is_major(kind: PieceKind) -> bool {
    matches!(kind, PieceKind::Rook | PieceKind::Knight | PieceKind::Bishop)
}

/// Subtracts `elapsed_ms` from any active, non-frozen timer belonging to
/// `color`; freezes a timer (and records its square) if it reaches zero.
fn age_timers(state: &mut DecayState, color: Force, elapsed_ms: u64) {
    let queen = state.queen_decay_timers.get_mut(color);
    if queen.active && !queen.frozen {
        queen.time_remaining_ms = queen.time_remaining_ms.saturating_sub(elapsed_ms);
        if queen.time_remaining_ms == 0 {
            queen.frozen = true;
            queen.active = false;
            if let Some(sq) = queen.square {
                state.frozen_pieces.get_mut(color).push(sq);
            }
        }
    }
    let major = state.major_piece_decay_timers.get_mut(color);
    if major.active && !major.frozen {
        major.time_remaining_ms = major.time_remaining_ms.saturating_sub(elapsed_ms);
        if major.time_remaining_ms == 0 {
            major.frozen = true;
            major.active = false;
            if let Some(sq) = major.square {
                state.frozen_pieces.get_mut(color).push(sq);
            }
        }
    }
}

/// If the tracked major piece has been captured (or is otherwise no longer
/// at its recorded square), clears the timer so a later major move can
/// re-arm it on a fresh piece.
fn lapse_major_if_missing(state: &mut DecayState, color: Force, position: &Position) {
    let major = state.major_piece_decay_timers.get_mut(color);
    if !major.active {
        return;
    }
    let still_present = major
        .square
        .and_then(|sq| position.grid[sq])
        .map(|occ| occ.force == color && Some(occ.kind) == major.piece_kind)
        .unwrap_or(false);
    if !still_present {
        *major = DecayTimer::default();
    }
}

impl VariantEngine for DecayEngine {
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
        let frozen: Vec<_> = match &session.variant_state {
            VariantState::Decay(state) => state.frozen_pieces.get(acting).clone(),
            _ => Vec::new(),
        };
        position
            .legal_moves()
            .into_iter()
            .filter_map(|mv| match mv {
                Move::Normal { from, to, promotion } if !frozen.contains(&from) => Some(Action::Move { from, to, promotion }),
                _ => None,
            })
            .collect()
    }
}

impl DecayEngine {
    fn try_validate_and_apply(&self, session: &Session, action: Action, acting: Force, now_ms: u64) -> Result<Outcome, CoreError> {
        let mut session = session.clone();
        let elapsed = now_ms.saturating_sub(session.turn_start_timestamp);
        let timed_out = begin_turn(&mut session, acting, now_ms)?;
        if timed_out {
            resolve_timeout(&mut session, acting, now_ms);
            return Ok(Outcome::Applied { session, terminal: true });
        }
        let Action::Move { from, to, promotion } = action else {
            return Err(CoreError::new(ErrorCode::InvalidInput, "decay only accepts moves"));
        };
        let position = current_position(&session)?;
        let VariantState::Decay(ref mut state) = session.variant_state else {
            return Err(CoreError::new(ErrorCode::InvalidState, "session is not configured for decay"));
        };
        age_timers(state, acting, elapsed);
        lapse_major_if_missing(state, acting, &position);
        if state.frozen_pieces.get(acting).contains(&from) {
            return Err(CoreError::new(ErrorCode::PieceFrozen, "this piece has decayed and may no longer move"));
        }
        let moved_kind = position.grid[from].ok_or_else(|| CoreError::new(ErrorCode::InvalidInput, "no piece on the origin square"))?.kind;

        let mv = position.move_from_coords(from, to, promotion);
        let san = position.to_san(mv);
        let (next, captured) = position.apply_move(mv)?;

        let VariantState::Decay(ref mut state) = session.variant_state else { unreachable!() };
        if captured.is_some() {
            let opponent_frozen = state.frozen_pieces.get_mut(acting.opponent());
            opponent_frozen.retain(|&sq| sq != to);
        }

        if moved_kind == PieceKind::Queen {
            let queen = state.queen_decay_timers.get_mut(acting);
            if queen.active && !queen.frozen {
                queen.move_count += 1;
                queen.time_remaining_ms = (queen.time_remaining_ms + 2_000).min(25_000);
                queen.square = Some(to);
            } else if !queen.frozen {
                *queen = DecayTimer { active: true, frozen: false, time_remaining_ms: 25_000, move_count: 1, square: Some(to), piece_kind: Some(PieceKind::Queen) };
            }
            state.decay_active = true;
        } else if is_major(moved_kind) && state.queen_decay_timers.get(acting).frozen {
            let major = state.major_piece_decay_timers.get_mut(acting);
            let same_piece_continuing = major.active && major.square == Some(from) && major.piece_kind == Some(moved_kind);
            if same_piece_continuing {
                major.move_count += 1;
                major.time_remaining_ms = (major.time_remaining_ms + 2_000).min(20_000);
                major.square = Some(to);
            } else if !major.active {
                *major = DecayTimer { active: true, frozen: false, time_remaining_ms: 20_000, move_count: 1, square: Some(to), piece_kind: Some(moved_kind) };
            }
        }

        let terminal = finish_turn(&mut session, acting, &next, san, MoveKind::Move, now_ms);
        Ok(Outcome::Applied { session, terminal: terminal.is_some() })
    }
}

// Classic (SPEC_FULL.md section 4.E.1): standard FIDE rules, no extra state.
// Directly mirrors `board.rs::try_turn`'s control flow (validate, apply,
// check mate, flip side, restart clock) with the common preamble/postamble
// factored into `engines::mod`.

use crate::engines::{begin_turn, current_position, finish_turn, resolve_timeout, Action, Outcome, VariantEngine};
use crate::error::{CoreError, ErrorCode};
use crate::force::Force;
use crate::position::Move;
use crate::session::{MoveKind, Session};

pub struct ClassicEngine;

impl VariantEngine for ClassicEngine {
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

impl ClassicEngine {
    fn try_validate_and_apply(&self, session: &Session, action: Action, acting: Force, now_ms: u64) -> Result<Outcome, CoreError> {
        let mut session = session.clone();
        let timed_out = begin_turn(&mut session, acting, now_ms)?;
        if timed_out {
            resolve_timeout(&mut session, acting, now_ms);
            return Ok(Outcome::Applied { session, terminal: true });
        }
        let Action::Move { from, to, promotion } = action else {
            return Err(CoreError::new(ErrorCode::InvalidInput, "classic chess only accepts moves"));
        };
        let position = current_position(&session)?;
        let mv = position.move_from_coords(from, to, promotion);
        let san = position.to_san(mv);
        let (next, _captured) = position.apply_move(mv)?;
        let terminal = finish_turn(&mut session, acting, &next, san, MoveKind::Move, now_ms);
        Ok(Outcome::Applied { session, terminal: terminal.is_some() })
    }
}

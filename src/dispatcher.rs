// The Dispatcher (component D, SPEC_FULL.md section 4.D). Serializes
// actions per session through a per-session lane — an
// `async_std::sync::Mutex<()>` keyed by `SessionId` in a `dashmap::DashMap`
// (section 5.1) — fetches session state, hands it to the right
// `VariantEngine` with a freshly-read `nowMs`, and commits the result in
// full or not at all. `ResignOrDraw` is resolved once, uniformly, above
// the variant engines (section 4.R), since resigning or agreeing a draw
// means the same thing in every variant.

use std::sync::Arc;

use async_std::sync::Mutex;
use dashmap::DashMap;

use crate::engines::classic::ClassicEngine;
use crate::engines::crazyhouse_standard::CrazyhouseStandardEngine;
use crate::engines::crazyhouse_timer::CrazyhouseTimerEngine;
use crate::engines::decay::DecayEngine;
use crate::engines::six_pointer::SixPointerEngine;
use crate::engines::{Action, Outcome, VariantEngine};
use crate::error::{CoreError, ErrorCode};
use crate::force::Force;
use crate::rules::VariantKey;
use crate::session::{GameResult, ResultRecord, Session, SessionId, SessionStatus};
use crate::store::session_store::SessionStore;

#[derive(Clone, Copy, Debug)]
pub enum ResignOrDrawAction {
    Resign,
    OfferDraw,
    AcceptDraw,
    DeclineDraw,
}

pub enum DispatchRequest {
    Engine(Action),
    ResignOrDraw(ResignOrDrawAction),
}

pub struct Dispatcher {
    sessions: SessionStore,
    lanes: DashMap<SessionId, Arc<Mutex<()>>>,
}

fn engine_for(key: VariantKey) -> Box<dyn VariantEngine + Send + Sync> {
    use crate::rules::CrazyhouseSubvariant;
    match key {
        VariantKey::Classic(_) => Box::new(ClassicEngine),
        VariantKey::Crazyhouse(CrazyhouseSubvariant::Standard) => Box::new(CrazyhouseStandardEngine),
        VariantKey::Crazyhouse(CrazyhouseSubvariant::WithTimer) => Box::new(CrazyhouseTimerEngine),
        VariantKey::Decay => Box::new(DecayEngine),
        VariantKey::SixPointer => Box::new(SixPointerEngine),
    }
}

impl Dispatcher {
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions, lanes: DashMap::new() }
    }

    fn lane(&self, id: SessionId) -> Arc<Mutex<()>> {
        self.lanes.entry(id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Runs `request` against `session_id`'s lane. Returns the committed
    /// `Outcome`, or an `INTERNAL_ERROR` if the engine panicked or the
    /// store round-trip failed — in neither case is partial state committed.
    pub async fn dispatch(&self, session_id: SessionId, request: DispatchRequest, acting_user: &str, now_ms: u64) -> Result<Outcome, CoreError> {
        let lane = self.lane(session_id);
        let _guard = lane.lock().await;

        let Some(session) = self.sessions.get(session_id).await? else {
            return Err(CoreError::new(ErrorCode::InvalidState, "no such session"));
        };
        let Some(acting) = session.color_of(acting_user) else {
            return Err(CoreError::new(ErrorCode::InvalidPlayer, "user is not a participant in this session"));
        };

        let outcome = match request {
            DispatchRequest::Engine(action) => {
                let engine = engine_for(session.variant_key);
                engine.validate_and_apply(&session, action, acting, now_ms)
            }
            DispatchRequest::ResignOrDraw(rd) => self.resolve_resign_or_draw(&session, acting, rd, now_ms),
        };

        if let Outcome::Applied { session: ref next, .. } | Outcome::Warning { session: ref next, .. } = outcome {
            self.sessions.commit(next).await?;
        }
        Ok(outcome)
    }

    /// Uniform handling for the four resign/draw wire events (SPEC_FULL.md
    /// section 4.R): identical semantics across every variant, so this lives
    /// above the `VariantEngine` dispatch rather than duplicated in each.
    fn resolve_resign_or_draw(&self, session: &Session, acting: Force, action: ResignOrDrawAction, now_ms: u64) -> Outcome {
        if session.status != SessionStatus::Active {
            return Outcome::Rejected { code: ErrorCode::GameEnded, message: "session already finished".to_string() };
        }
        let mut session = session.clone();
        match action {
            ResignOrDrawAction::Resign => {
                let record = ResultRecord { result: GameResult::Resignation, winner: Some(acting.opponent()), ended_at: now_ms };
                session.status = SessionStatus::Finished;
                session.result = Some(record);
                Outcome::Applied { session, terminal: true }
            }
            ResignOrDrawAction::OfferDraw => {
                session.pending_draw_offer = Some(acting);
                Outcome::Applied { session, terminal: false }
            }
            ResignOrDrawAction::AcceptDraw => {
                if session.pending_draw_offer != Some(acting.opponent()) {
                    return Outcome::Rejected { code: ErrorCode::InvalidState, message: "no pending draw offer from the opponent".to_string() };
                }
                let record = ResultRecord { result: GameResult::DrawAgreed, winner: None, ended_at: now_ms };
                session.status = SessionStatus::Finished;
                session.result = Some(record);
                session.pending_draw_offer = None;
                Outcome::Applied { session, terminal: true }
            }
            ResignOrDrawAction::DeclineDraw => {
                session.pending_draw_offer = None;
                Outcome::Applied { session, terminal: false }
            }
        }
    }
}

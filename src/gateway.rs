// The Gateway (component G, SPEC_FULL.md section 4.G / 6). Owns only the
// mapping from one decoded client message to one Dispatcher/Matchmaker
// action, and from the resulting outcome back to one or more server
// messages — the actual socket framing, connection bookkeeping and
// keepalive live in the "realtime message bus" collaborator outside this
// core (section 4.G), so the mapping is exercised here as a pure function
// plus a `Connection` trait a test double can implement without a socket.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::dispatcher::{Dispatcher, DispatchRequest, ResignOrDrawAction};
use crate::engines::{Action, Outcome};
use crate::error::{CoreError, ErrorCode};
use crate::matchmaker::Matchmaker;
use crate::piece::PieceKind;
use crate::rules::VariantKey;
use crate::session::{Session, SessionId};
use crate::tournament::TournamentManager;

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    #[serde(rename = "queue:join")]
    QueueJoin { variant_key: VariantKey },
    #[serde(rename = "queue:leave")]
    QueueLeave,
    #[serde(rename = "tournament:join")]
    TournamentJoin,
    #[serde(rename = "tournament:leave")]
    TournamentLeave,
    #[serde(rename = "queue:get_live_counts")]
    QueueGetLiveCounts,
    #[serde(rename = "game:makeMove")]
    GameMakeMove { session_id: SessionId, from: Coord, to: Coord, promotion: Option<PieceKind>, ts: u64 },
    #[serde(rename = "game:dropPiece")]
    GameDropPiece { session_id: SessionId, piece: PieceKind, to: Coord, ts: u64 },
    #[serde(rename = "game:timeoutPenalty")]
    GameTimeoutPenalty { session_id: SessionId, ts: u64 },
    #[serde(rename = "game:resign")]
    GameResign { session_id: SessionId },
    #[serde(rename = "game:offerDraw")]
    GameOfferDraw { session_id: SessionId },
    #[serde(rename = "game:acceptDraw")]
    GameAcceptDraw { session_id: SessionId },
    #[serde(rename = "game:declineDraw")]
    GameDeclineDraw { session_id: SessionId },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename = "queue:matched")]
    QueueMatched { opponent: String, variant_key: VariantKey, session_id: SessionId },
    #[serde(rename = "queue:cooldown")]
    QueueCooldown,
    #[serde(rename = "game:gameState")]
    GameState { session: Box<Session> },
    #[serde(rename = "game:end")]
    GameEnd { session: Box<Session> },
    #[serde(rename = "game:warning")]
    GameWarning { code: ErrorCode, message: String, session: Box<Session> },
    #[serde(rename = "game:error")]
    GameError { code: ErrorCode, message: String },
}

/// One outbound server message to one user id; the transport-level send is
/// the collaborator's job, not this core's.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn send(&self, user_id: &str, message: ServerMessage);
}

/// Maps one `ClientMessage` from `user_id` to Dispatcher/Matchmaker calls,
/// then emits the resulting server messages to every affected participant.
pub async fn handle_client_message(
    dispatcher: &Dispatcher,
    matchmaker: &Matchmaker,
    tournament: &TournamentManager,
    connection: &dyn Connection,
    user_id: &str,
    message: ClientMessage,
    now_ms: u64,
) -> Result<(), CoreError> {
    match message {
        ClientMessage::QueueJoin { variant_key } => {
            let rating = 1500; // resolved from the user directory in a full deployment
            match matchmaker.enqueue(user_id, rating, variant_key, now_ms).await {
                Ok(Some(result)) => {
                    notify_match(connection, dispatcher, &result.white, &result.black, variant_key, result.session_id).await?;
                }
                Ok(None) => {}
                Err(e) if e.code == ErrorCode::InvalidState => connection.send(user_id, ServerMessage::QueueCooldown).await,
                Err(e) => return Err(e),
            }
        }
        ClientMessage::QueueLeave => matchmaker.leave(user_id).await?,
        ClientMessage::TournamentJoin => {
            tournament.join(user_id, now_ms).await?;
        }
        ClientMessage::TournamentLeave => tournament.leave(user_id).await?,
        ClientMessage::QueueGetLiveCounts => {
            // Per-variant counts are a store read the transport layer can
            // batch across connections; left to the collaborator.
        }
        ClientMessage::GameMakeMove { session_id, from, to, promotion, ts } => {
            dispatch_and_notify(dispatcher, connection, session_id, DispatchRequest::Engine(Action::Move { from, to, promotion }), user_id, ts).await?;
        }
        ClientMessage::GameDropPiece { session_id, piece, to, ts } => {
            dispatch_and_notify(dispatcher, connection, session_id, DispatchRequest::Engine(Action::Drop { piece, to }), user_id, ts).await?;
        }
        ClientMessage::GameTimeoutPenalty { session_id, ts } => {
            dispatch_and_notify(dispatcher, connection, session_id, DispatchRequest::Engine(Action::TimeoutPenalty), user_id, ts).await?;
        }
        ClientMessage::GameResign { session_id } => {
            dispatch_and_notify(dispatcher, connection, session_id, DispatchRequest::ResignOrDraw(ResignOrDrawAction::Resign), user_id, now_ms).await?;
        }
        ClientMessage::GameOfferDraw { session_id } => {
            dispatch_and_notify(dispatcher, connection, session_id, DispatchRequest::ResignOrDraw(ResignOrDrawAction::OfferDraw), user_id, now_ms).await?;
        }
        ClientMessage::GameAcceptDraw { session_id } => {
            dispatch_and_notify(dispatcher, connection, session_id, DispatchRequest::ResignOrDraw(ResignOrDrawAction::AcceptDraw), user_id, now_ms).await?;
        }
        ClientMessage::GameDeclineDraw { session_id } => {
            dispatch_and_notify(dispatcher, connection, session_id, DispatchRequest::ResignOrDraw(ResignOrDrawAction::DeclineDraw), user_id, now_ms).await?;
        }
    }
    Ok(())
}

async fn dispatch_and_notify(dispatcher: &Dispatcher, connection: &dyn Connection, session_id: SessionId, request: DispatchRequest, user_id: &str, now_ms: u64) -> Result<(), CoreError> {
    let outcome = match dispatcher.dispatch(session_id, request, user_id, now_ms).await {
        Ok(outcome) => outcome,
        Err(e) => {
            connection.send(user_id, ServerMessage::GameError { code: e.code, message: e.message.clone() }).await;
            return Err(e);
        }
    };
    match outcome {
        Outcome::Applied { session, terminal } => {
            let recipients = [session.players.white.user_id.clone(), session.players.black.user_id.clone()];
            let message = if terminal { ServerMessage::GameEnd { session: Box::new(session) } } else { ServerMessage::GameState { session: Box::new(session) } };
            for recipient in recipients {
                connection.send(&recipient, message.clone()).await;
            }
        }
        Outcome::Warning { code, message, session } => {
            let recipients = [session.players.white.user_id.clone(), session.players.black.user_id.clone()];
            for recipient in recipients {
                connection.send(&recipient, ServerMessage::GameWarning { code, message: message.clone(), session: Box::new(session.clone()) }).await;
            }
        }
        Outcome::Rejected { code, message } => {
            connection.send(user_id, ServerMessage::GameError { code, message }).await;
        }
    }
    Ok(())
}

async fn notify_match(connection: &dyn Connection, dispatcher: &Dispatcher, white: &str, black: &str, variant_key: VariantKey, session_id: SessionId) -> Result<(), CoreError> {
    let _ = dispatcher;
    connection.send(white, ServerMessage::QueueMatched { opponent: black.to_string(), variant_key, session_id }).await;
    connection.send(black, ServerMessage::QueueMatched { opponent: white.to_string(), variant_key, session_id }).await;
    Ok(())
}

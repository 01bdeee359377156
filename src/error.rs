use serde::{Deserialize, Serialize};
use std::fmt;

#[macro_export]
macro_rules! internal_error_message {
    () => {
        format!("Internal error at {}:{}.", file!(), line!())
    };
    ($($arg:tt)+) => {
        format!("Internal error at {}:{}: {}.", file!(), line!(), format!($($arg)*))
    };
}

/// Wire-visible error codes. Rule-violation codes reject an action without touching
/// session state; `DropExpired` and `TimeoutPenalty` are "soft" in that they *do*
/// mutate state (see SPEC_FULL.md section 7) but are still reported as warnings, not
/// fatal errors.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidInput,
    InvalidMove,
    InvalidPlayer,
    InvalidState,
    InvalidFen,
    MissingFen,
    WrongTurn,
    IllegalMove,
    ChessJsError,
    PieceFrozen,
    InvalidPawnDrop,
    SquareOccupied,
    SelfCheck,
    PieceNotInPocket,
    SequentialDropOnly,
    PieceNotAvailable,
    MoveLimitExceeded,
    DropExpired,
    TimeoutPenalty,
    Timeout,
    GameEnded,
    InternalError,
}

#[derive(Clone, Debug)]
pub struct CoreError {
    pub code: ErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for CoreError {}

pub type CoreResult<T> = Result<T, CoreError>;

use enum_map::Enum;
use serde::{Deserialize, Serialize};


/// The two sides of a chess game. Named `Force` rather than `Color` to match the
/// vocabulary used throughout the position library (`active_force`, `opponent`, ...).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Enum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Force {
    White,
    Black,
}

impl Force {
    pub fn opponent(self) -> Force {
        match self {
            Force::White => Force::Black,
            Force::Black => Force::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Force::White => "white",
            Force::Black => "black",
        }
    }
}

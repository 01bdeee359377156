// The session data model (SPEC_FULL.md section 3): the single struct that
// the Session Store persists and every Variant Engine mutates. Structurally
// grounded on how the teacher composes game state in `game.rs`'s
// `BughouseGame` (player records + per-board state + overall status) and
// `player.rs`'s `Player`, generalized from bughouse's two-board pairing into
// this crate's single-board, five-variant shape. `PocketPiece`/drop-timer
// bookkeeping is new: the teacher's Crazyhouse-less engine has no pocket.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::TimeControl;
use crate::coord::Coord;
use crate::force::Force;
use crate::piece::PieceKind;
use crate::rules::VariantKey;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub user_id: String,
    pub display_name: String,
    pub rating: i32,
    pub avatar: Option<String>,
    pub title: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum SessionStatus {
    Active,
    Finished,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GameResult {
    Checkmate,
    Timeout,
    Resignation,
    DrawAgreed,
    Stalemate,
    InsufficientMaterial,
    Repetition,
    MoveRule,
    Points,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResultRecord {
    pub result: GameResult,
    pub winner: Option<Force>,
    pub ended_at: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveRecord {
    pub by: Force,
    pub san: String,
    pub fen_after: String,
    pub timestamp: u64,
    pub kind: MoveKind,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum MoveKind {
    Move,
    Drop,
    Timeout,
}

// --- Crazyhouse ---

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PocketPiece {
    pub id: u64,
    pub kind: PieceKind,
    pub captured_at: u64,
    /// Set while this piece is head-of-pocket but it is not its owner's
    /// turn (Crazyhouse withTimer only): the timer is frozen at
    /// `remaining_ms` instead of tracking a live expiration timestamp, so it
    /// survives a store round-trip (SPEC_FULL.md section 9).
    pub timer_paused: bool,
    pub remaining_ms: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CrazyhouseState {
    pub pocketed_pieces: EnumMapSeq<PocketPiece>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CrazyhouseTimerState {
    pub pocketed_pieces: EnumMapSeq<PocketPiece>,
    /// piece id -> absolute expiration timestamp, for the currently-unpaused head only.
    pub drop_timers: BTreeMap<u64, u64>,
    pub frozen_pieces: EnumMapSeq<PieceKind>,
    pub next_piece_id: u64,
}

/// A per-force sequence, serialized as a plain map so JSON round-trips don't
/// need `enum_map`'s serde adapter for non-`Copy`, variable-length payloads.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EnumMapSeq<T> {
    pub white: Vec<T>,
    pub black: Vec<T>,
}

impl<T> EnumMapSeq<T> {
    pub fn get(&self, force: Force) -> &Vec<T> {
        match force {
            Force::White => &self.white,
            Force::Black => &self.black,
        }
    }
    pub fn get_mut(&mut self, force: Force) -> &mut Vec<T> {
        match force {
            Force::White => &mut self.white,
            Force::Black => &mut self.black,
        }
    }
}

// --- Decay ---

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct DecayTimer {
    pub active: bool,
    pub frozen: bool,
    pub time_remaining_ms: u64,
    pub move_count: u32,
    pub square: Option<Coord>,
    pub piece_kind: Option<PieceKind>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DecayState {
    pub decay_active: bool,
    pub queen_decay_timers: EnumMapBy<DecayTimer>,
    pub major_piece_decay_timers: EnumMapBy<DecayTimer>,
    pub frozen_pieces: EnumMapSeq<Coord>,
}

/// A per-force pair of `T`, serialized as a plain `{white, black}` object.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct EnumMapBy<T> {
    pub white: T,
    pub black: T,
}

impl<T> EnumMapBy<T> {
    pub fn get(&self, force: Force) -> &T {
        match force {
            Force::White => &self.white,
            Force::Black => &self.black,
        }
    }
    pub fn get_mut(&mut self, force: Force) -> &mut T {
        match force {
            Force::White => &mut self.white,
            Force::Black => &mut self.black,
        }
    }
}

// --- Six-Pointer ---

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SixPointerState {
    pub moves_played: EnumMapBy<u32>,
    pub bonus_moves: EnumMapBy<u32>,
    pub max_moves: u32,
    pub points: EnumMapBy<u32>,
    pub timeout_penalties: EnumMapBy<u32>,
    pub foul_incidents: Vec<FoulIncident>,
    pub last_timeout_penalty: EnumMapBy<Option<u64>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FoulIncident {
    pub kind: FoulKind,
    pub by: Force,
    pub timestamp: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum FoulKind {
    FinalMoveRecapture,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "variant", content = "state")]
pub enum VariantState {
    Classic,
    Crazyhouse(CrazyhouseState),
    CrazyhouseWithTimer(CrazyhouseTimerState),
    Decay(DecayState),
    SixPointer(SixPointerState),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub variant_key: VariantKey,
    pub players: EnumMapBy<PlayerRecord>,
    pub status: SessionStatus,
    pub fen: String,
    pub active_color: Force,
    pub move_history: Vec<MoveRecord>,
    pub position_history: Vec<String>,
    pub repetition_map: BTreeMap<String, u32>,
    pub main_clocks: EnumMapBy<u64>,
    pub time_control: TimeControl,
    pub turn_start_timestamp: u64,
    pub last_move_timestamp: u64,
    pub game_started: bool,
    pub first_move_timestamp: Option<u64>,
    pub captured_pieces: EnumMapSeq<PieceKind>,
    pub result: Option<ResultRecord>,
    pub pending_draw_offer: Option<Force>,
    pub variant_state: VariantState,
    pub created_at: u64,
    pub last_activity: u64,
}

impl Session {
    pub fn opponent_of(&self, user_id: &str) -> Option<&PlayerRecord> {
        if self.players.white.user_id == user_id {
            Some(&self.players.black)
        } else if self.players.black.user_id == user_id {
            Some(&self.players.white)
        } else {
            None
        }
    }

    pub fn color_of(&self, user_id: &str) -> Option<Force> {
        if self.players.white.user_id == user_id {
            Some(Force::White)
        } else if self.players.black.user_id == user_id {
            Some(Force::Black)
        } else {
            None
        }
    }

    /// Repetition key folds in the pocket composition for Crazyhouse so that
    /// "same board, different pocket" never collides (SPEC_FULL.md section
    /// 8, property 12).
    pub fn repetition_key(&self, fen: &str) -> String {
        let board_and_turn: String = fen.split_whitespace().take(2).collect::<Vec<_>>().join(" ");
        match &self.variant_state {
            VariantState::Crazyhouse(s) => {
                format!("{board_and_turn}|{}|{}", pocket_summary(&s.pocketed_pieces.white), pocket_summary(&s.pocketed_pieces.black))
            }
            VariantState::CrazyhouseWithTimer(s) => {
                format!("{board_and_turn}|{}|{}", pocket_summary(&s.pocketed_pieces.white), pocket_summary(&s.pocketed_pieces.black))
            }
            _ => board_and_turn,
        }
    }
}

fn pocket_summary(pocket: &[PocketPiece]) -> String {
    let mut kinds: Vec<&str> = pocket
        .iter()
        .map(|p| match p.kind {
            PieceKind::Pawn => "p",
            PieceKind::Knight => "n",
            PieceKind::Bishop => "b",
            PieceKind::Rook => "r",
            PieceKind::Queen => "q",
            PieceKind::King => "k",
        })
        .collect();
    kinds.sort_unstable();
    kinds.join("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repetition_key_distinguishes_pockets() {
        let mut state_a = CrazyhouseState::default();
        state_a.pocketed_pieces.white.push(PocketPiece {
            id: 1,
            kind: PieceKind::Knight,
            captured_at: 0,
            timer_paused: false,
            remaining_ms: None,
        });
        let state_b = CrazyhouseState::default();
        let key_a = pocket_summary(&state_a.pocketed_pieces.white);
        let key_b = pocket_summary(&state_b.pocketed_pieces.white);
        assert_ne!(key_a, key_b);
    }
}

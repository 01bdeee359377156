// Variant and time-control identifiers. Grounded on the teacher's
// `rules.rs` in spirit (a handful of plain enums plus small `to_*` helpers)
// though the actual rule *parameters* — time control, drop aggression,
// promotion policy — were version-skewed against the rest of this retrieval
// (they referenced board-shape/Chess960 concepts `board.rs` doesn't have)
// and are rewritten here from scratch against this crate's `Position`.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::clock::{self, TimeControl};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClassicSubvariant {
    Bullet,
    Blitz,
    Standard,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum CrazyhouseSubvariant {
    Standard,
    WithTimer,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Variant {
    Classic,
    Crazyhouse,
    Decay,
    SixPointer,
}

/// A variant plus whichever subvariant field applies to it. Subvariant is
/// `None` for `Decay` and `SixPointer`, which have exactly one ruleset.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "variant", content = "subvariant")]
pub enum VariantKey {
    Classic(ClassicSubvariant),
    Crazyhouse(CrazyhouseSubvariant),
    Decay,
    SixPointer,
}

impl VariantKey {
    pub fn variant(self) -> Variant {
        match self {
            VariantKey::Classic(_) => Variant::Classic,
            VariantKey::Crazyhouse(_) => Variant::Crazyhouse,
            VariantKey::Decay => Variant::Decay,
            VariantKey::SixPointer => Variant::SixPointer,
        }
    }

    pub fn subvariant_str(self) -> Option<String> {
        match self {
            VariantKey::Classic(s) => Some(s.to_string()),
            VariantKey::Crazyhouse(s) => Some(s.to_string()),
            VariantKey::Decay | VariantKey::SixPointer => None,
        }
    }

    /// The key used for matchmaking waiting sets and queue storage
    /// (SPEC_FULL.md section 6: `queue:{variantKey}`).
    pub fn queue_key(self) -> String {
        let variant = match self {
            VariantKey::SixPointer => "sixpointer".to_string(),
            _ => self.variant().to_string(),
        };
        match self.subvariant_str() {
            Some(sub) => format!("{variant}:{sub}"),
            None => variant,
        }
    }

    pub fn time_control(self) -> TimeControl {
        match self {
            VariantKey::Classic(ClassicSubvariant::Bullet) => clock::BULLET,
            VariantKey::Classic(ClassicSubvariant::Blitz) => clock::BLITZ,
            VariantKey::Classic(ClassicSubvariant::Standard) => clock::STANDARD,
            VariantKey::Crazyhouse(_) => clock::CRAZYHOUSE,
            VariantKey::Decay => clock::DECAY,
            VariantKey::SixPointer => TimeControl::new(clock::SIX_POINTER_PER_MOVE_MS, 0),
        }
    }

    pub fn all() -> Vec<VariantKey> {
        vec![
            VariantKey::Classic(ClassicSubvariant::Bullet),
            VariantKey::Classic(ClassicSubvariant::Blitz),
            VariantKey::Classic(ClassicSubvariant::Standard),
            VariantKey::Crazyhouse(CrazyhouseSubvariant::Standard),
            VariantKey::Crazyhouse(CrazyhouseSubvariant::WithTimer),
            VariantKey::Decay,
            VariantKey::SixPointer,
        ]
    }
}

/// A small set of pre-vetted, legal, non-terminal middlegame FENs the
/// Six-Pointer engine samples from at session creation (SPEC_FULL.md
/// section 9: "the list of candidate FENs is a process-static constant").
pub const SIX_POINTER_STARTING_FENS: &[&str] = &[
    "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    "r2qkbnr/ppp2ppp/2np4/4p3/2B1P1b1/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 2 6",
    "rnbq1rk1/ppp1bppp/4pn2/3p4/2PP4/2N1PN2/PP3PPP/R1BQKB1R w KQ - 0 7",
];

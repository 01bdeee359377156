// The position library (component L): FEN parsing/serialization, legal move
// generation, check/checkmate/stalemate/insufficient-material detection, SAN
// rendering and the "put piece" primitive used by the Crazyhouse engines for
// drops. Grounded on the move-generation and check-testing logic in the
// teacher's `board.rs` (`is_reachable`, `get_capture`, `is_chess_mate_to`,
// castling square-clearance), generalized from a single mutable `Board` into
// a FEN-addressable, side-effect-free `Position` value so it can be embedded
// directly in `Session::fen` and round-tripped through the key-value store.

use enum_map::{enum_map, EnumMap};

use crate::coord::{Col, Coord, Row, SubjectiveRow};
use crate::error::{CoreError, ErrorCode};
use crate::force::Force;
use crate::grid::Grid;
use crate::piece::{CastleDirection, PieceKind, PieceOnBoard, PieceOrigin};
use crate::util::sort_two;


#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CastlingRights {
    pub kingside: bool,
    pub queenside: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Move {
    Normal { from: Coord, to: Coord, promotion: Option<PieceKind> },
    Castle(CastleDirection),
}

#[derive(Clone, Copy, Debug)]
pub struct AppliedMove {
    pub mv: Move,
    pub captured: Option<PieceKind>,
    pub is_check: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Position {
    pub grid: Grid,
    pub active_force: Force,
    pub castling: EnumMap<Force, CastlingRights>,
    pub en_passant: Option<Coord>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

fn direction_forward(force: Force) -> i8 {
    match force {
        Force::White => 1,
        Force::Black => -1,
    }
}

fn back_rank(force: Force) -> Row {
    SubjectiveRow::from_one_based(1).unwrap().to_row(force)
}

fn last_rank(force: Force) -> Row {
    SubjectiveRow::from_one_based(8).unwrap().to_row(force)
}

fn col_range_inclusive(a: Col, b: Col) -> impl Iterator<Item = Col> {
    let (lo, hi) = sort_two((a.to_zero_based(), b.to_zero_based()));
    (lo..=hi).map(|idx| Col::from_zero_based(idx).unwrap())
}

// Tests that the piece at `from` could reach `to` on an otherwise-empty-path
// basis: direction, range and blocking are checked, but the destination's
// occupancy compatibility with `capturing` is the caller's responsibility for
// pawns (captures and pushes move differently).
fn is_reachable(grid: &Grid, from: Coord, to: Coord, capturing: bool) -> bool {
    if to == from {
        return false;
    }
    let Some(piece) = grid[from] else { return false };
    if let Some(target) = grid[to] {
        if target.force == piece.force {
            return false;
        }
    }
    let (d_row, d_col) = to - from;
    match piece.kind {
        PieceKind::Pawn => {
            let dir = direction_forward(piece.force);
            if capturing {
                d_col.abs() == 1 && d_row == dir
            } else {
                let second_row = SubjectiveRow::from_one_based(2).unwrap().to_row(piece.force);
                d_col == 0 && (d_row == dir || (from.row == second_row && d_row == dir * 2))
            }
        }
        PieceKind::Knight => sort_two((d_row.abs(), d_col.abs())) == (1, 2),
        PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => {
            let straight = d_row == 0 || d_col == 0;
            let diagonal = d_row.abs() == d_col.abs();
            if (straight && piece.kind != PieceKind::Bishop) || (diagonal && piece.kind != PieceKind::Rook) {
                let direction = (d_row.signum(), d_col.signum());
                let mut pos = (from + direction).unwrap();
                while pos != to {
                    if grid[pos].is_some() {
                        return false;
                    }
                    pos = (pos + direction).unwrap();
                }
                true
            } else {
                false
            }
        }
        PieceKind::King => d_row.abs() <= 1 && d_col.abs() <= 1,
    }
}

fn find_king(grid: &Grid, force: Force) -> Option<Coord> {
    Coord::all().find(|&pos| matches!(grid[pos], Some(p) if p.kind == PieceKind::King && p.force == force))
}

fn is_attacked(grid: &Grid, target: Coord, by: Force) -> bool {
    Coord::all().any(|from| matches!(grid[from], Some(p) if p.force == by) && is_reachable(grid, from, target, true))
}

fn should_promote(force: Force, kind: PieceKind, to: Coord) -> bool {
    kind == PieceKind::Pawn && to.row == last_rank(force)
}

fn can_promote_to(kind: PieceKind) -> bool {
    matches!(kind, PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)
}

impl Position {
    pub fn starting() -> Self {
        Self::from_fen(STARTING_FEN).expect("starting FEN is always valid")
    }

    /// Parses a standard six-field FEN. Differences from the teacher's
    /// Shredder-FEN dialect (`fen.rs`): castling rights are expressed with
    /// plain `KQkq`, there is no reserve-in-brackets suffix, and only the two
    /// standard castling columns (kingside/queenside) are recognized.
    pub fn from_fen(fen: &str) -> Result<Self, CoreError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(CoreError::new(ErrorCode::InvalidFen, "FEN must have six fields"));
        }
        let mut grid = Grid::new();
        let rows: Vec<&str> = fields[0].split('/').collect();
        if rows.len() != 8 {
            return Err(CoreError::new(ErrorCode::InvalidFen, "FEN board must have eight ranks"));
        }
        for (rank_from_top, row_str) in rows.iter().enumerate() {
            let row = Row::from_zero_based(7 - rank_from_top as u8).unwrap();
            let mut col_idx: u8 = 0;
            for c in row_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col_idx += skip as u8;
                } else {
                    let force = if c.is_uppercase() { Force::White } else { Force::Black };
                    let kind = PieceKind::from_fen_letter(c)
                        .ok_or_else(|| CoreError::new(ErrorCode::InvalidFen, format!("bad piece letter {c}")))?;
                    let col = Col::from_zero_based(col_idx)
                        .ok_or_else(|| CoreError::new(ErrorCode::InvalidFen, "rank too long"))?;
                    grid[Coord::new(row, col)] = Some(PieceOnBoard::new(kind, PieceOrigin::Innate, None, force));
                    col_idx += 1;
                }
            }
            if col_idx != 8 {
                return Err(CoreError::new(ErrorCode::InvalidFen, "rank does not sum to eight"));
            }
        }
        let active_force = match fields[1] {
            "w" => Force::White,
            "b" => Force::Black,
            _ => return Err(CoreError::new(ErrorCode::InvalidFen, "bad side to move")),
        };
        let mut castling: EnumMap<Force, CastlingRights> = enum_map! { _ => CastlingRights::default() };
        if fields[2] != "-" {
            for c in fields[2].chars() {
                match c {
                    'K' => castling[Force::White].kingside = true,
                    'Q' => castling[Force::White].queenside = true,
                    'k' => castling[Force::Black].kingside = true,
                    'q' => castling[Force::Black].queenside = true,
                    _ => return Err(CoreError::new(ErrorCode::InvalidFen, "bad castling field")),
                }
            }
        }
        let en_passant = if fields[3] == "-" {
            None
        } else {
            Some(Coord::from_algebraic(fields[3]).ok_or_else(|| CoreError::new(ErrorCode::InvalidFen, "bad en passant square"))?)
        };
        let halfmove_clock: u32 = fields[4]
            .parse()
            .map_err(|_| CoreError::new(ErrorCode::InvalidFen, "bad halfmove clock"))?;
        let fullmove_number: u32 = fields[5]
            .parse()
            .map_err(|_| CoreError::new(ErrorCode::InvalidFen, "bad fullmove number"))?;
        Ok(Position { grid, active_force, castling, en_passant, halfmove_clock, fullmove_number })
    }

    pub fn to_fen(&self) -> String {
        let mut board = String::new();
        for rank_from_top in 0..8u8 {
            let row = Row::from_zero_based(7 - rank_from_top).unwrap();
            let mut empty_run = 0;
            for col in Col::all() {
                match self.grid[Coord::new(row, col)] {
                    Some(piece) => {
                        if empty_run > 0 {
                            board.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        board.push(piece.kind.to_fen_letter(piece.force));
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                board.push_str(&empty_run.to_string());
            }
            if rank_from_top != 7 {
                board.push('/');
            }
        }
        let side = match self.active_force {
            Force::White => "w",
            Force::Black => "b",
        };
        let mut castling = String::new();
        if self.castling[Force::White].kingside {
            castling.push('K');
        }
        if self.castling[Force::White].queenside {
            castling.push('Q');
        }
        if self.castling[Force::Black].kingside {
            castling.push('k');
        }
        if self.castling[Force::Black].queenside {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }
        let en_passant = self.en_passant.map(|c| c.to_algebraic()).unwrap_or_else(|| "-".to_string());
        format!("{board} {side} {castling} {en_passant} {} {}", self.halfmove_clock, self.fullmove_number)
    }

    pub fn is_in_check(&self, force: Force) -> bool {
        match find_king(&self.grid, force) {
            Some(king_pos) => is_attacked(&self.grid, king_pos, force.opponent()),
            None => false,
        }
    }

    /// Pseudo-legal destinations for the piece at `from`, without castling.
    fn pseudo_targets(&self, from: Coord) -> Vec<Coord> {
        Coord::all()
            .filter(|&to| {
                let capturing = self.grid[to].is_some() || (self.grid[from].unwrap().kind == PieceKind::Pawn && Some(to) == self.en_passant);
                is_reachable(&self.grid, from, to, capturing)
            })
            .collect()
    }

    fn leaves_mover_in_check(&self, mv: Move) -> bool {
        let force = self.active_force;
        match self.try_apply(mv) {
            Ok((next, _)) => next.is_in_check(force),
            Err(_) => true,
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let force = self.active_force;
        let mut moves = Vec::new();
        for from in Coord::all() {
            let Some(piece) = self.grid[from] else { continue };
            if piece.force != force {
                continue;
            }
            for to in self.pseudo_targets(from) {
                if should_promote(force, piece.kind, to) {
                    for promo in [PieceKind::Queen, PieceKind::Rook, PieceKind::Bishop, PieceKind::Knight] {
                        let mv = Move::Normal { from, to, promotion: Some(promo) };
                        if !self.leaves_mover_in_check(mv) {
                            moves.push(mv);
                        }
                    }
                } else {
                    let mv = Move::Normal { from, to, promotion: None };
                    if !self.leaves_mover_in_check(mv) {
                        moves.push(mv);
                    }
                }
            }
        }
        for dir in [CastleDirection::ASide, CastleDirection::HSide] {
            let mv = Move::Castle(dir);
            if self.castle_path_clear(dir).is_ok() && !self.leaves_mover_in_check(mv) {
                moves.push(mv);
            }
        }
        moves
    }

    fn castle_path_clear(&self, dir: CastleDirection) -> Result<(Coord, Coord, Coord, Coord), CoreError> {
        let force = self.active_force;
        let rights = self.castling[force];
        let allowed = match dir {
            CastleDirection::ASide => rights.queenside,
            CastleDirection::HSide => rights.kingside,
        };
        if !allowed {
            return Err(CoreError::new(ErrorCode::IllegalMove, "no castling rights"));
        }
        let row = back_rank(force);
        let king_from = Coord::new(row, Col::E);
        let (king_to, rook_from, rook_to) = match dir {
            CastleDirection::ASide => (Coord::new(row, Col::C), Coord::new(row, Col::A), Coord::new(row, Col::D)),
            CastleDirection::HSide => (Coord::new(row, Col::G), Coord::new(row, Col::H), Coord::new(row, Col::F)),
        };
        if self.grid[king_from].map(|p| p.kind) != Some(PieceKind::King) {
            return Err(CoreError::new(ErrorCode::IllegalMove, "king not on home square"));
        }
        if self.grid[rook_from].map(|p| p.kind) != Some(PieceKind::Rook) {
            return Err(CoreError::new(ErrorCode::IllegalMove, "rook not on home square"));
        }
        for col in col_range_inclusive(king_from.col, king_to.col) {
            let pos = Coord::new(row, col);
            if pos != king_from && self.grid[pos].is_some() {
                return Err(CoreError::new(ErrorCode::IllegalMove, "castling path blocked"));
            }
            if is_attacked(&self.grid, pos, force.opponent()) {
                return Err(CoreError::new(ErrorCode::SelfCheck, "king passes through check"));
            }
        }
        for col in col_range_inclusive(rook_from.col, rook_to.col) {
            let pos = Coord::new(row, col);
            if pos != rook_from && pos != king_from && self.grid[pos].is_some() {
                return Err(CoreError::new(ErrorCode::IllegalMove, "castling path blocked"));
            }
        }
        Ok((king_from, king_to, rook_from, rook_to))
    }

    /// Applies a move without checking whether the mover ends up in check.
    /// Returns the resulting position and any captured piece kind (pawn for
    /// a captured promoted pawn, matching the teacher's reserve-crediting
    /// convention in `board.rs::try_turn_no_check_test`).
    fn try_apply(&self, mv: Move) -> Result<(Position, Option<PieceKind>), CoreError> {
        let force = self.active_force;
        let mut next = self.clone();
        let mut captured = None;
        let mut is_pawn_double_push = false;
        let mut reset_halfmove = false;
        match mv {
            Move::Normal { from, to, promotion } => {
                let piece = self.grid[from].ok_or_else(|| CoreError::new(ErrorCode::IllegalMove, "no piece to move"))?;
                if piece.force != force {
                    return Err(CoreError::new(ErrorCode::WrongTurn, "not this side's piece"));
                }
                let en_passant_capture = piece.kind == PieceKind::Pawn && Some(to) == self.en_passant && self.grid[to].is_none();
                let capturing = self.grid[to].is_some() || en_passant_capture;
                if !is_reachable(&self.grid, from, to, capturing) {
                    return Err(CoreError::new(ErrorCode::IllegalMove, "unreachable"));
                }
                next.grid[from] = None;
                if en_passant_capture {
                    let captured_pos = Coord::new(from.row, to.col);
                    let victim = next.grid[captured_pos].take().ok_or_else(|| CoreError::new(ErrorCode::InternalError, "en passant target missing"))?;
                    captured = Some(victim.kind);
                    reset_halfmove = true;
                } else if let Some(victim) = next.grid[to] {
                    captured = Some(match victim.origin {
                        PieceOrigin::Promoted => PieceKind::Pawn,
                        _ => victim.kind,
                    });
                    reset_halfmove = true;
                }
                if piece.kind == PieceKind::Pawn {
                    reset_halfmove = true;
                    is_pawn_double_push = (to.row - from.row).abs() == 2;
                }
                if should_promote(force, piece.kind, to) {
                    let promo = promotion.ok_or_else(|| CoreError::new(ErrorCode::IllegalMove, "promotion required"))?;
                    if !can_promote_to(promo) {
                        return Err(CoreError::new(ErrorCode::IllegalMove, "cannot promote to that piece"));
                    }
                    next.grid[to] = Some(PieceOnBoard::new(promo, PieceOrigin::Promoted, None, force));
                } else {
                    if promotion.is_some() {
                        return Err(CoreError::new(ErrorCode::IllegalMove, "unexpected promotion"));
                    }
                    let mut moved = piece;
                    if moved.kind == PieceKind::King {
                        next.castling[force] = CastlingRights::default();
                    }
                    if moved.rook_castling.is_some() {
                        match moved.rook_castling.unwrap() {
                            CastleDirection::ASide => next.castling[force].queenside = false,
                            CastleDirection::HSide => next.castling[force].kingside = false,
                        }
                        moved.rook_castling = None;
                    }
                    next.grid[to] = Some(moved);
                }
                if let Some(victim) = self.grid[to] {
                    if victim.rook_castling.is_some() {
                        match victim.rook_castling.unwrap() {
                            CastleDirection::ASide => next.castling[force.opponent()].queenside = false,
                            CastleDirection::HSide => next.castling[force.opponent()].kingside = false,
                        }
                    }
                }
                next.en_passant = if is_pawn_double_push {
                    Some(Coord::new(Row::from_zero_based(((from.row.to_zero_based() as i8 + to.row.to_zero_based() as i8) / 2) as u8).unwrap(), from.col))
                } else {
                    None
                };
            }
            Move::Castle(dir) => {
                let (king_from, king_to, rook_from, rook_to) = self.castle_path_clear(dir)?;
                let king = next.grid[king_from].take().unwrap();
                let mut rook = next.grid[rook_from].take().unwrap();
                rook.rook_castling = None;
                next.grid[king_to] = Some(king);
                next.grid[rook_to] = Some(rook);
                next.castling[force] = CastlingRights::default();
                next.en_passant = None;
            }
        }
        next.active_force = force.opponent();
        if reset_halfmove {
            next.halfmove_clock = 0;
        } else {
            next.halfmove_clock += 1;
        }
        if force == Force::Black {
            next.fullmove_number += 1;
        }
        Ok((next, captured))
    }

    /// Validates and applies `mv`, rejecting it if it leaves the mover in check.
    pub fn apply_move(&self, mv: Move) -> Result<(Position, Option<PieceKind>), CoreError> {
        let force = self.active_force;
        let (next, captured) = self.try_apply(mv)?;
        if next.is_in_check(force) {
            return Err(CoreError::new(ErrorCode::SelfCheck, "move leaves own king in check"));
        }
        Ok((next, captured))
    }

    /// The Crazyhouse drop primitive: place `kind` owned by `force` on an
    /// empty `to`, then pass the turn. Rejects placements on occupied
    /// squares, pawn drops on the back/last rank, and placements that leave
    /// the mover in check.
    pub fn put_piece(&self, force: Force, kind: PieceKind, to: Coord) -> Result<Position, CoreError> {
        if force != self.active_force {
            return Err(CoreError::new(ErrorCode::WrongTurn, "not this side's turn"));
        }
        if self.grid[to].is_some() {
            return Err(CoreError::new(ErrorCode::SquareOccupied, "drop target occupied"));
        }
        if kind == PieceKind::Pawn && (to.row == back_rank(force) || to.row == last_rank(force)) {
            return Err(CoreError::new(ErrorCode::InvalidPawnDrop, "pawns cannot be dropped on the back or last rank"));
        }
        let mut next = self.clone();
        next.grid[to] = Some(PieceOnBoard::new(kind, PieceOrigin::Dropped, None, force));
        next.en_passant = None;
        next.halfmove_clock = 0;
        next.active_force = force.opponent();
        if force == Force::Black {
            next.fullmove_number += 1;
        }
        if next.is_in_check(force) {
            return Err(CoreError::new(ErrorCode::SelfCheck, "drop leaves own king in check"));
        }
        Ok(next)
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_in_check(self.active_force) && self.legal_moves().is_empty()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_in_check(self.active_force) && self.legal_moves().is_empty()
    }

    /// King vs king, and king+minor vs king, using piece counts only (no
    /// same-color-bishops refinement, matching the coarse-but-sufficient
    /// detection level this family of variants needs).
    pub fn has_insufficient_material(&self) -> bool {
        let mut minor_count: EnumMap<Force, u32> = enum_map! { _ => 0 };
        for pos in Coord::all() {
            if let Some(piece) = self.grid[pos] {
                match piece.kind {
                    PieceKind::King => {}
                    PieceKind::Knight | PieceKind::Bishop => minor_count[piece.force] += 1,
                    _ => return false,
                }
            }
        }
        minor_count[Force::White] <= 1 && minor_count[Force::Black] <= 1 && minor_count[Force::White] + minor_count[Force::Black] <= 1
    }

    pub fn to_san(&self, mv: Move) -> String {
        match mv {
            Move::Castle(CastleDirection::HSide) => "O-O".to_string(),
            Move::Castle(CastleDirection::ASide) => "O-O-O".to_string(),
            Move::Normal { from, to, promotion } => {
                let piece = self.grid[from];
                let is_capture = self.grid[to].is_some()
                    || matches!(piece, Some(p) if p.kind == PieceKind::Pawn && Some(to) == self.en_passant);
                let kind = piece.map(|p| p.kind).unwrap_or(PieceKind::Pawn);
                let mut s = String::new();
                match kind {
                    PieceKind::Pawn => {
                        if is_capture {
                            s.push(from.col.to_algebraic());
                            s.push('x');
                        }
                    }
                    _ => {
                        s.push(kind.to_fen_letter(Force::White));
                        if is_capture {
                            s.push('x');
                        }
                    }
                }
                s.push_str(&to.to_algebraic());
                if let Some(promo) = promotion {
                    s.push('=');
                    s.push(promo.to_fen_letter(Force::White));
                }
                let (next, _) = self.try_apply(mv).expect("already validated");
                if next.is_checkmate() {
                    s.push('#');
                } else if next.is_in_check(next.active_force) {
                    s.push('+');
                }
                s
            }
        }
    }

    pub fn parse_uci_move(&self, s: &str) -> Result<Move, CoreError> {
        let s = s.trim();
        if s.len() != 4 && s.len() != 5 {
            return Err(CoreError::new(ErrorCode::InvalidMove, "move must be 4 or 5 characters"));
        }
        let from = Coord::from_algebraic(&s[0..2]).ok_or_else(|| CoreError::new(ErrorCode::InvalidMove, "bad from square"))?;
        let to = Coord::from_algebraic(&s[2..4]).ok_or_else(|| CoreError::new(ErrorCode::InvalidMove, "bad to square"))?;
        let promotion = if s.len() == 5 {
            Some(PieceKind::from_fen_letter(s.chars().nth(4).unwrap()).ok_or_else(|| CoreError::new(ErrorCode::InvalidMove, "bad promotion letter"))?)
        } else {
            None
        };
        Ok(self.move_from_coords(from, to, promotion))
    }

    /// Builds a `Move` from plain coordinates, recognizing a king e1-g1/e1-c1
    /// style move as castling the way `board.rs::make_turn_from_algebraic`'s
    /// castling regexes do for its SAN-like dialect.
    pub fn move_from_coords(&self, from: Coord, to: Coord, promotion: Option<PieceKind>) -> Move {
        if let Some(piece) = self.grid[from] {
            if piece.kind == PieceKind::King {
                let row = back_rank(piece.force);
                if from == Coord::new(row, Col::E) && to == Coord::new(row, Col::G) {
                    return Move::Castle(CastleDirection::HSide);
                }
                if from == Coord::new(row, Col::E) && to == Coord::new(row, Col::C) {
                    return Move::Castle(CastleDirection::ASide);
                }
            }
        }
        Move::Normal { from, to, promotion }
    }
}

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Parses the placement+rights fields of a starting-grid FEN and wires up
/// the rook `rook_castling` markers `board.rs`'s castling code relies on,
/// mirroring `game.rs::generate_starting_grid`'s intent for the standard
/// (non-Fischer-Random) starting position.
pub fn standard_starting_position() -> Position {
    let mut pos = Position::starting();
    for force in [Force::White, Force::Black] {
        let row = back_rank(force);
        if let Some(p) = pos.grid[Coord::new(row, Col::A)].as_mut() {
            p.rook_castling = Some(CastleDirection::ASide);
        }
        if let Some(p) = pos.grid[Coord::new(row, Col::H)].as_mut() {
            p.rook_castling = Some(CastleDirection::HSide);
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fen_round_trip() {
        let pos = standard_starting_position();
        assert_eq!(Position::from_fen(&pos.to_fen()).unwrap().to_fen(), pos.to_fen());
    }

    #[test]
    fn starting_position_has_twenty_moves() {
        let pos = standard_starting_position();
        assert_eq!(pos.legal_moves().len(), 20);
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut pos = standard_starting_position();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            let mv = pos.parse_uci_move(uci).unwrap();
            pos = pos.apply_move(mv).unwrap().0;
        }
        assert!(pos.is_checkmate());
    }

    #[test]
    fn stalemate_detected() {
        // Classic king-in-the-corner stalemate: black king a8, white king c7, white queen b6.
        let fen = "k7/1Q6/2K5/8/8/8/8/8 b - - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert!(pos.is_stalemate());
        assert!(!pos.is_checkmate());
    }

    #[test]
    fn drop_rejects_occupied_square() {
        let pos = standard_starting_position();
        let err = pos.put_piece(Force::White, PieceKind::Knight, Coord::E4);
        assert!(err.is_ok());
        let err = pos.put_piece(Force::White, PieceKind::Knight, Coord::E2);
        assert!(err.is_err());
    }

    #[test]
    fn drop_rejects_pawn_on_last_rank() {
        let pos = standard_starting_position();
        let err = pos.put_piece(Force::White, PieceKind::Pawn, Coord::E8);
        assert!(err.is_err());
    }
}

//! Attack geometry shared by the move generator and the check detector.
//!
//! `is_attacked` answers "does `by` attack this square?" by walking every
//! piece of that color and testing its attack pattern against the target.
//! Sliders need a clear path; pawns only attack one step diagonally forward.

use crate::{board::Position, types::*};

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];

pub const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 1),
    (1, 0),
    (1, -1),
    (0, 1),
    (0, -1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

pub const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// True if any piece of color `by` attacks `target`.
pub fn is_attacked(pos: &Position, target: u8, by: Color) -> bool {
    pos.pieces(by).any(|(from, pc)| attacks_square(pos, from, pc, target))
}

/// Squares holding pieces of color `by` that attack `target`.
pub fn attackers(pos: &Position, target: u8, by: Color) -> Vec<u8> {
    pos.pieces(by)
        .filter(|&(from, pc)| attacks_square(pos, from, pc, target))
        .map(|(from, _)| from)
        .collect()
}

/// Whether the piece `pc` standing on `from` attacks `target`.
pub fn attacks_square(pos: &Position, from: u8, pc: Piece, target: u8) -> bool {
    if from == target {
        return false;
    }
    let df = file_of(target) - file_of(from);
    let dr = rank_of(target) - rank_of(from);

    match pc.kind {
        PieceKind::Pawn => dr == pc.color.pawn_dir() && df.abs() == 1,
        PieceKind::Knight => KNIGHT_OFFSETS.contains(&(df, dr)),
        PieceKind::King => df.abs() <= 1 && dr.abs() <= 1,
        PieceKind::Bishop => df.abs() == dr.abs() && is_path_clear(pos, from, target),
        PieceKind::Rook => (df == 0 || dr == 0) && is_path_clear(pos, from, target),
        PieceKind::Queen => {
            (df.abs() == dr.abs() || df == 0 || dr == 0) && is_path_clear(pos, from, target)
        }
    }
}

/// True if every square strictly between `from` and `to` is empty. The two
/// squares must share a rank, file or diagonal.
pub fn is_path_clear(pos: &Position, from: u8, to: u8) -> bool {
    let step_f = (file_of(to) - file_of(from)).signum();
    let step_r = (rank_of(to) - rank_of(from)).signum();
    let mut f = file_of(from) + step_f;
    let mut r = rank_of(from) + step_r;
    while let Some(s) = sq(f, r) {
        if s == to {
            return true;
        }
        if pos.piece_at(s).is_some() {
            return false;
        }
        f += step_f;
        r += step_r;
    }
    false
}

#[cfg(test)]
#[path = "attacks_tests.rs"]
mod attacks_tests;

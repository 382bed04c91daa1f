//! Check and terminal-state queries.
//!
//! Draws that depend on history (repetition, fifty-move rule) and the
//! material rule are decided by the session, which sees the whole game.

use crate::{attacks::is_attacked, board::Position, movegen::legal_moves_from, types::*};

/// True if `color`'s king is attacked. A side without a king is never in
/// check.
pub fn in_check(pos: &Position, color: Color) -> bool {
    match pos.king_sq(color) {
        Some(k) => is_attacked(pos, k, color.other()),
        None => false,
    }
}

/// Stops at the first piece of `color` with a legal move.
pub fn has_any_legal_move(pos: &Position, color: Color) -> bool {
    pos.pieces(color)
        .any(|(from, _)| !legal_moves_from(pos, from).is_empty())
}

pub fn is_checkmate(pos: &Position) -> bool {
    let side = pos.side_to_move;
    in_check(pos, side) && !has_any_legal_move(pos, side)
}

pub fn is_stalemate(pos: &Position) -> bool {
    let side = pos.side_to_move;
    !in_check(pos, side) && !has_any_legal_move(pos, side)
}

/// Board-level verdict for the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardStatus {
    Ongoing,
    Check,
    Checkmate,
    Stalemate,
}

pub fn board_status(pos: &Position) -> BoardStatus {
    let side = pos.side_to_move;
    let check = in_check(pos, side);
    let any = has_any_legal_move(pos, side);
    match (check, any) {
        (true, false) => BoardStatus::Checkmate,
        (false, false) => BoardStatus::Stalemate,
        (true, true) => BoardStatus::Check,
        (false, true) => BoardStatus::Ongoing,
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;

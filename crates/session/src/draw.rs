//! Draw rules that need more than the board: the material rule looks at
//! every piece, the other two at the game's history.

use chess_core::{Color, PieceKind, Position, is_light_square};

/// Halfmove clock value at which the fifty-move rule ends the game.
pub const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// True when neither side can ever deliver mate: bare kings, a single
/// minor piece against a bare king, or any number of bishops that all
/// stand on squares of one color.
pub fn is_insufficient_material(pos: &Position) -> bool {
    let mut knights = 0;
    let mut bishops_light = 0;
    let mut bishops_dark = 0;

    for color in [Color::White, Color::Black] {
        for (sq, pc) in pos.pieces(color) {
            match pc.kind {
                PieceKind::King => {}
                PieceKind::Knight => knights += 1,
                PieceKind::Bishop if is_light_square(sq) => bishops_light += 1,
                PieceKind::Bishop => bishops_dark += 1,
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
            }
        }
    }

    let bishops = bishops_light + bishops_dark;
    match (knights, bishops) {
        (0, 0) => true,
        (1, 0) | (0, 1) => true,
        (0, _) => bishops_light == 0 || bishops_dark == 0,
        _ => false,
    }
}

pub fn is_fifty_move_draw(pos: &Position) -> bool {
    pos.halfmove_clock >= FIFTY_MOVE_HALFMOVES
}

/// Counts how often `current` appears in `keys`, which must include the
/// current position itself.
pub fn repetition_count(keys: &[String], current: &str) -> usize {
    keys.iter().filter(|k| k.as_str() == current).count()
}

pub fn is_threefold_repetition(keys: &[String]) -> bool {
    match keys.last() {
        Some(current) => repetition_count(keys, current) >= 3,
        None => false,
    }
}

#[cfg(test)]
#[path = "draw_tests.rs"]
mod draw_tests;

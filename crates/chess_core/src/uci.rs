//! Coordinate ("long algebraic") notation such as `e2e4` or `e7e8q`.

use crate::{board::Position, movegen::legal_moves, types::*};

pub fn move_to_uci(mv: Move) -> String {
    let mut s = String::with_capacity(5);
    s.push_str(&sq_to_coord(mv.from));
    s.push_str(&sq_to_coord(mv.to));
    if let Some(p) = mv.promo {
        s.push(p.lower_letter());
    }
    s
}

/// Matches coordinate notation against the legal moves of the side to move,
/// so castling and en-passant flags come from the generator. A missing
/// promotion letter is rejected rather than guessed.
pub fn parse_uci_move(pos: &Position, txt: &str) -> Option<Move> {
    let txt = txt.trim();
    if txt.len() < 4 || txt.len() > 5 || !txt.is_ascii() {
        return None;
    }
    let from = coord_to_sq(&txt[0..2])?;
    let to = coord_to_sq(&txt[2..4])?;
    let promo = match txt.as_bytes().get(4) {
        Some(&c) => match PieceKind::from_letter(c as char)? {
            PieceKind::Pawn | PieceKind::King => return None,
            kind => Some(kind),
        },
        None => None,
    };

    legal_moves(pos)
        .into_iter()
        .find(|m| m.from == from && m.to == to && m.promo == promo)
}

/// Replays a list of coordinate moves from `start`, stopping at the first
/// one that is not legal. Returns the position and how many moves applied.
pub fn replay_uci(start: &Position, moves: &[&str]) -> (Position, usize) {
    let mut pos = start.clone();
    for (i, txt) in moves.iter().enumerate() {
        match parse_uci_move(&pos, txt) {
            Some(mv) => pos.make_move(mv),
            None => return (pos, i),
        }
    }
    (pos, moves.len())
}

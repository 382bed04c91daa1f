//! Standard Algebraic Notation.
//!
//! Rendering follows the usual conventions: piece letter, minimal
//! disambiguation (file, then rank, then both), `x` for captures, `=Q` for
//! promotion, `O-O`/`O-O-O` for castling and a `+`/`#` suffix.
//!
//! Parsing is deliberately lenient about decoration: check suffixes and
//! annotation glyphs are ignored, `0-0` is accepted for `O-O`, `e8Q` for
//! `e8=Q`, extra disambiguation such as `Ng1f3` is allowed, and plain
//! coordinate notation (`e2e4`) is tried as a last resort. The structured
//! part (piece, destination, promotion) must still identify exactly one
//! legal move.

use thiserror::Error;

use crate::{
    board::Position,
    movegen::{legal_moves, legal_moves_into},
    status::{in_check, is_checkmate},
    types::*,
    uci::parse_uci_move,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("'{0}' is not a move in algebraic notation")]
    Malformed(String),

    #[error("'{0}' is not a legal move in this position")]
    Illegal(String),

    #[error("'{notation}' is ambiguous, candidates: {}", candidates.join(", "))]
    Ambiguous {
        notation: String,
        candidates: Vec<String>,
    },
}

impl NotationError {
    /// The notation the caller submitted.
    pub fn notation(&self) -> &str {
        match self {
            NotationError::Malformed(n) | NotationError::Illegal(n) => n,
            NotationError::Ambiguous { notation, .. } => notation,
        }
    }
}

/// Renders a legal move of `pos` in SAN, including the check or mate
/// suffix.
pub fn move_to_san(pos: &Position, mv: Move) -> String {
    let mut san = san_without_suffix(pos, mv);
    let after = pos.after(mv);
    if in_check(&after, after.side_to_move) {
        san.push(if is_checkmate(&after) { '#' } else { '+' });
    }
    san
}

/// SAN for every legal move of the side to move, in generation order.
pub fn legal_sans(pos: &Position) -> Vec<String> {
    legal_moves(pos)
        .into_iter()
        .map(|mv| move_to_san(pos, mv))
        .collect()
}

fn san_without_suffix(pos: &Position, mv: Move) -> String {
    if mv.is_castle {
        return if file_of(mv.to) > file_of(mv.from) {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let mut san = String::with_capacity(8);
    let is_capture = pos.piece_at(mv.to).is_some() || mv.is_en_passant;

    match mv.piece.kind.san_letter() {
        Some(letter) => {
            san.push(letter);
            san.push_str(&disambiguation(pos, mv));
        }
        None => {
            if is_capture {
                san.push((b'a' + file_of(mv.from) as u8) as char);
            }
        }
    }

    if is_capture {
        san.push('x');
    }
    san.push_str(&sq_to_coord(mv.to));

    if let Some(promo) = mv.promo {
        san.push('=');
        san.push(promo.san_letter().unwrap_or('Q'));
    }
    san
}

/// Shortest origin hint distinguishing `mv` from other legal moves of the
/// same piece kind landing on the same square.
fn disambiguation(pos: &Position, mv: Move) -> String {
    let mut all = Vec::with_capacity(64);
    let mut scratch = pos.clone();
    scratch.side_to_move = mv.piece.color;
    legal_moves_into(&scratch, &mut all);

    let rivals: Vec<u8> = all
        .iter()
        .filter(|m| m.to == mv.to && m.piece == mv.piece && m.from != mv.from)
        .map(|m| m.from)
        .collect();
    if rivals.is_empty() {
        return String::new();
    }

    let coord = sq_to_coord(mv.from);
    let same_file = rivals.iter().any(|&s| file_of(s) == file_of(mv.from));
    let same_rank = rivals.iter().any(|&s| rank_of(s) == rank_of(mv.from));
    if !same_file {
        coord[..1].to_string()
    } else if !same_rank {
        coord[1..].to_string()
    } else {
        coord
    }
}

/// Structured reading of a SAN token.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SanToken {
    kind: PieceKind,
    from_file: Option<i8>,
    from_rank: Option<i8>,
    to: u8,
    promo: Option<PieceKind>,
    capture: bool,
}

enum Parsed {
    Castle { kingside: bool },
    Normal(SanToken),
}

/// Strips check marks, annotation glyphs and surrounding whitespace.
fn clean(text: &str) -> String {
    text.trim()
        .trim_end_matches(['+', '#', '!', '?'])
        .trim()
        .to_string()
}

fn tokenize(text: &str) -> Option<Parsed> {
    match text {
        "O-O" | "0-0" | "o-o" => return Some(Parsed::Castle { kingside: true }),
        "O-O-O" | "0-0-0" | "o-o-o" => return Some(Parsed::Castle { kingside: false }),
        _ => {}
    }

    let mut chars: Vec<char> = text.chars().collect();

    // Promotion suffix: "=Q", "Q" or "(Q)"
    let mut promo = None;
    if let Some(&last) = chars.last() {
        if last == ')' && chars.len() >= 4 && chars[chars.len() - 3] == '(' {
            promo = Some(PieceKind::from_letter(chars[chars.len() - 2])?);
            chars.truncate(chars.len() - 3);
        } else if last.is_ascii_uppercase() && chars.len() >= 3 {
            promo = Some(PieceKind::from_letter(last)?);
            chars.pop();
            if chars.last() == Some(&'=') {
                chars.pop();
            }
        }
    }

    let kind = match chars.first() {
        Some(&c) if c.is_ascii_uppercase() => {
            chars.remove(0);
            PieceKind::from_letter(c)?
        }
        _ => PieceKind::Pawn,
    };

    if chars.len() < 2 {
        return None;
    }
    let dest: String = chars[chars.len() - 2..].iter().collect();
    let to = coord_to_sq(&dest)?;
    chars.truncate(chars.len() - 2);

    let mut capture = false;
    if chars.last() == Some(&'x') || chars.last() == Some(&':') {
        capture = true;
        chars.pop();
    }
    // Long-algebraic separator ("e2-e4")
    if chars.last() == Some(&'-') {
        chars.pop();
    }

    let mut from_file = None;
    let mut from_rank = None;
    for c in chars {
        match c {
            'a'..='h' if from_file.is_none() => from_file = Some((c as u8 - b'a') as i8),
            '1'..='8' if from_rank.is_none() => from_rank = Some((c as u8 - b'1') as i8),
            _ => return None,
        }
    }

    if promo.is_some() && kind != PieceKind::Pawn {
        return None;
    }

    Some(Parsed::Normal(SanToken {
        kind,
        from_file,
        from_rank,
        to,
        promo,
        capture,
    }))
}

/// Resolves `text` to the unique legal move of the side to move it names.
pub fn parse_san(pos: &Position, text: &str) -> Result<Move, NotationError> {
    let original = text.trim().to_string();
    let cleaned = clean(text);
    let legal = legal_moves(pos);

    let parsed = match tokenize(&cleaned) {
        Some(p) => p,
        None => {
            // Coordinate notation is not valid SAN but agents produce it.
            return parse_uci_move(pos, &cleaned.to_ascii_lowercase())
                .ok_or(NotationError::Malformed(original));
        }
    };

    let candidates: Vec<Move> = match parsed {
        Parsed::Castle { kingside } => legal
            .into_iter()
            .filter(|m| m.is_castle && (file_of(m.to) > file_of(m.from)) == kingside)
            .collect(),
        Parsed::Normal(tok) => legal
            .into_iter()
            .filter(|m| token_matches(pos, &tok, m))
            .collect(),
    };

    match candidates.len() {
        1 => Ok(candidates[0]),
        0 => {
            // "e2e4" also tokenizes as a pawn move with a from-square
            parse_uci_move(pos, &cleaned.to_ascii_lowercase())
                .ok_or(NotationError::Illegal(original))
        }
        _ => Err(NotationError::Ambiguous {
            notation: original,
            candidates: candidates.iter().map(|m| move_to_san(pos, *m)).collect(),
        }),
    }
}

fn token_matches(pos: &Position, tok: &SanToken, mv: &Move) -> bool {
    if mv.piece.kind != tok.kind || mv.to != tok.to || mv.is_castle {
        return false;
    }
    if let Some(f) = tok.from_file {
        if file_of(mv.from) != f {
            return false;
        }
    }
    if let Some(r) = tok.from_rank {
        if rank_of(mv.from) != r {
            return false;
        }
    }
    let is_capture = mv.is_en_passant || pos.piece_at(mv.to).is_some();
    if tok.kind == PieceKind::Pawn {
        // A bare "d5" is a push; pawn captures always name their file.
        if tok.from_file.is_none() && is_capture {
            return false;
        }
        if tok.capture && !is_capture {
            return false;
        }
        // Promotion must be spelled out
        mv.promo == tok.promo
    } else {
        true
    }
}

#[cfg(test)]
#[path = "san_tests.rs"]
mod san_tests;

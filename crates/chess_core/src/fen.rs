//! Forsyth-Edwards Notation: the compact position encoding handed to agents
//! and used for repetition keys.

use thiserror::Error;

use crate::{board::Position, types::*};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("expected at least 4 fields, found {0}")]
    MissingFields(usize),

    #[error("board section must have 8 ranks, found {0}")]
    RankCount(usize),

    #[error("rank {rank} does not describe exactly 8 files")]
    FileCount { rank: usize },

    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),

    #[error("invalid side to move '{0}'")]
    InvalidSideToMove(String),

    #[error("invalid castling field '{0}'")]
    InvalidCastling(String),

    #[error("invalid en-passant square '{0}'")]
    InvalidEnPassant(String),

    #[error("invalid move counter '{0}'")]
    InvalidCounter(String),
}

impl Position {
    /// Parses a FEN string. The two move counters are optional and default
    /// to `0 1`.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::MissingFields(parts.len()));
        }

        let board_part = parts[0];
        let stm_part = parts[1];
        let castle_part = parts[2];
        let ep_part = parts[3];
        let halfmove_part = parts.get(4).copied().unwrap_or("0");
        let fullmove_part = parts.get(5).copied().unwrap_or("1");

        let mut pos = Position::empty();
        let ranks: Vec<&str> = board_part.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let mut file: i8 = 0;
            let rank: i8 = 7 - rank_idx as i8; // FEN lists rank 8 .. 1
            for ch in rank_str.chars() {
                if let Some(d) = ch.to_digit(10) {
                    if !(1..=8).contains(&d) {
                        return Err(FenError::FileCount { rank: 8 - rank_idx });
                    }
                    file += d as i8;
                } else {
                    let pc = Piece::from_fen_char(ch).ok_or(FenError::InvalidPiece(ch))?;
                    let s = sq(file, rank).ok_or(FenError::FileCount { rank: 8 - rank_idx })?;
                    pos.set_piece(s, Some(pc));
                    file += 1;
                }
                if file > 8 {
                    return Err(FenError::FileCount { rank: 8 - rank_idx });
                }
            }
            if file != 8 {
                return Err(FenError::FileCount { rank: 8 - rank_idx });
            }
        }

        pos.side_to_move = match stm_part {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidSideToMove(other.to_string())),
        };

        if castle_part != "-" {
            for c in castle_part.chars() {
                match c {
                    'K' => pos.castling.wk = true,
                    'Q' => pos.castling.wq = true,
                    'k' => pos.castling.bk = true,
                    'q' => pos.castling.bq = true,
                    _ => return Err(FenError::InvalidCastling(castle_part.to_string())),
                }
            }
        }

        pos.en_passant = if ep_part == "-" {
            None
        } else {
            let s = coord_to_sq(ep_part)
                .ok_or_else(|| FenError::InvalidEnPassant(ep_part.to_string()))?;
            // Only the third and sixth ranks can hold a target
            if rank_of(s) != 2 && rank_of(s) != 5 {
                return Err(FenError::InvalidEnPassant(ep_part.to_string()));
            }
            Some(s)
        };

        pos.halfmove_clock = halfmove_part
            .parse()
            .map_err(|_| FenError::InvalidCounter(halfmove_part.to_string()))?;
        pos.fullmove_number = fullmove_part
            .parse()
            .map_err(|_| FenError::InvalidCounter(fullmove_part.to_string()))?;

        Ok(pos)
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match sq(file, rank).and_then(|s| self.piece_at(s)) {
                    Some(pc) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(pc.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(self.side_to_move.fen_char());
        out.push(' ');

        let rights = [
            (self.castling.wk, 'K'),
            (self.castling.wq, 'Q'),
            (self.castling.bk, 'k'),
            (self.castling.bq, 'q'),
        ];
        let before = out.len();
        for (held, c) in rights {
            if held {
                out.push(c);
            }
        }
        if out.len() == before {
            out.push('-');
        }

        out.push(' ');
        match self.en_passant {
            Some(s) => out.push_str(&sq_to_coord(s)),
            None => out.push('-'),
        }
        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        out
    }
}

impl std::str::FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}

#[cfg(test)]
#[path = "fen_tests.rs"]
mod fen_tests;

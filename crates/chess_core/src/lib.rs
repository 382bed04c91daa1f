//! Chess rules for a two-player game: board representation, legal move
//! generation, check/mate/stalemate detection, FEN and algebraic notation.
//!
//! Squares are indexed `0..64` from a1 to h8. Positions are small `Clone`
//! values; "what if" questions are answered on a scratch copy with
//! [`Position::after`] so callers never observe a half-applied move.

pub mod attacks;
pub mod board;
pub mod fen;
pub mod movegen;
pub mod perft;
pub mod san;
pub mod status;
pub mod types;
pub mod uci;

pub use attacks::*;
pub use board::*;
pub use fen::{FenError, START_FEN};
pub use movegen::*;
pub use perft::{divide, perft};
pub use san::{NotationError, legal_sans, move_to_san, parse_san};
pub use status::*;
pub use types::*;
pub use uci::*;

//! Game sessions on top of `chess_core`: turn sequencing, results, draw
//! bookkeeping, pause and history playback, per-move agent statistics and
//! PGN export.
//!
//! A [`GameSession`] is a plain owned value. Callers that share one between
//! tasks wrap it in a lock; nothing in here is global.

pub mod draw;
pub mod error;
pub mod pgn;
pub mod players;
pub mod result;
pub mod session;
pub mod stats;

pub use error::{SessionError, SessionResult};
pub use pgn::{PgnHeader, export_pgn};
pub use players::{GameMode, PlayerKind, Players};
pub use result::{GameOverReason, GameResult};
pub use session::{GameSession, MoveRecord, SessionState, try_move};
pub use stats::{AgentTotals, MoveStats};

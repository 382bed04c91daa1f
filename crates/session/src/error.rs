use thiserror::Error;

use crate::session::SessionState;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The notation matched no legal move. `legal` lists what was
    /// available, in SAN.
    #[error("illegal move '{notation}': {reason}")]
    IllegalMove {
        notation: String,
        reason: String,
        legal: Vec<String>,
    },

    #[error("the game is already finished")]
    GameFinished,

    #[error("the game is {state}, not playing")]
    NotPlaying { state: SessionState },

    #[error("no draw offer is pending")]
    NoDrawOffer,

    #[error("history index {index} is out of range, the game has {len} moves")]
    InvalidHistoryIndex { index: usize, len: usize },

    #[error("start position is not playable: {0}")]
    InvalidStartPosition(String),
}

impl SessionError {
    /// The rejected notation, when the error is about a move.
    pub fn notation(&self) -> Option<&str> {
        match self {
            SessionError::IllegalMove { notation, .. } => Some(notation),
            _ => None,
        }
    }
}

//! What a human can type at the prompt.

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Anything that is not a keyword is tried as a move.
    Move(String),
    Resign,
    OfferDraw,
    AcceptDraw,
    DeclineDraw,
    Pause,
    Resume,
    Board,
    Moves,
    /// `None` returns to the live position.
    History(Option<usize>),
    Pgn,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("nothing entered")]
    Empty,

    #[error("'{0}' is not a move number; use 'history <n>' or 'history live'")]
    BadHistoryIndex(String),
}

pub const HELP: &str = "\
commands:
  <move>           play a move, e.g. e4, Nf3, O-O, e8=Q or e2e4
  moves            list legal moves
  board            show the board
  draw             offer a draw
  accept/decline   answer a draw offer
  resign           resign the game
  pause/resume     suspend or continue agent play
  history <n>      show the position after n moves ('history live' to return)
  pgn              print the game so far
  quit             leave without finishing";

impl Command {
    /// Commands that never change the game and may be used while an agent
    /// is thinking.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Command::Board | Command::Moves | Command::History(_) | Command::Pgn | Command::Help
        )
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Err(CommandError::Empty);
        };
        Ok(match first.to_ascii_lowercase().as_str() {
            "resign" => Command::Resign,
            "draw" | "offer" => Command::OfferDraw,
            "accept" => Command::AcceptDraw,
            "decline" => Command::DeclineDraw,
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "board" => Command::Board,
            "moves" => Command::Moves,
            "pgn" => Command::Pgn,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "history" | "view" => match words.next() {
                None | Some("live") => Command::History(None),
                Some(n) => Command::History(Some(
                    n.parse()
                        .map_err(|_| CommandError::BadHistoryIndex(n.to_string()))?,
                )),
            },
            _ => Command::Move(line.to_string()),
        })
    }
}

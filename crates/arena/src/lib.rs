//! Pieces of the `llmchess` binary that do not touch the terminal.

pub mod cli;
pub mod command;
pub mod render;

pub use cli::{Cli, SeatSpec, build_seat};
pub use command::{Command, CommandError};

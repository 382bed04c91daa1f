use std::fmt;

use chess_core::Color;
use serde::{Deserialize, Serialize};

use crate::players::{GameMode, Players};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameOverReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    FiftyMoveRule,
    Resignation,
    DrawAgreement,
}

impl GameOverReason {
    /// Short label shown under the result headline.
    pub fn text(self) -> &'static str {
        match self {
            GameOverReason::Checkmate => "Checkmate",
            GameOverReason::Stalemate => "Stalemate",
            GameOverReason::InsufficientMaterial => "Insufficient Material",
            GameOverReason::ThreefoldRepetition => "Threefold Repetition",
            GameOverReason::FiftyMoveRule => "50-Move Rule",
            GameOverReason::Resignation => "Resignation",
            GameOverReason::DrawAgreement => "Draw Agreement",
        }
    }

    pub fn is_draw(self) -> bool {
        !matches!(self, GameOverReason::Checkmate | GameOverReason::Resignation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// `None` for every kind of draw.
    pub winner: Option<Color>,
    pub reason: GameOverReason,
}

impl GameResult {
    pub fn win(winner: Color, reason: GameOverReason) -> Self {
        GameResult {
            winner: Some(winner),
            reason,
        }
    }

    pub fn draw(reason: GameOverReason) -> Self {
        GameResult {
            winner: None,
            reason,
        }
    }

    /// `1-0`, `0-1` or `1/2-1/2`.
    pub fn pgn_marker(&self) -> &'static str {
        match self.winner {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        }
    }

    /// Headline from the point of view of the seat at the board: the human
    /// when one is playing, otherwise the winning model or color.
    pub fn headline(&self, players: &Players, mode: GameMode, playing_as: Color) -> String {
        let Some(winner) = self.winner else {
            return "Draw".to_string();
        };

        if mode == GameMode::HumanVsAgent {
            if winner == playing_as {
                return "You win!".to_string();
            }
            let model = players.get(winner).model().unwrap_or("AI");
            return format!("{model} wins!");
        }

        format!("{} wins!", players.display_name(winner))
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner {
            Some(c) => write!(f, "{} wins by {}", c, self.reason.text().to_lowercase()),
            None => write!(f, "Draw by {}", self.reason.text().to_lowercase()),
        }
    }
}

use chess_core::Color;
use serde::{Deserialize, Serialize};

/// Who sits on one side of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    /// A language-model agent identified by its model name.
    Agent { model: String },
}

impl PlayerKind {
    pub fn agent(model: impl Into<String>) -> Self {
        PlayerKind::Agent {
            model: model.into(),
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, PlayerKind::Agent { .. })
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            PlayerKind::Agent { model } => Some(model),
            PlayerKind::Human => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    pub white: PlayerKind,
    pub black: PlayerKind,
}

impl Default for Players {
    fn default() -> Self {
        Players {
            white: PlayerKind::Human,
            black: PlayerKind::Human,
        }
    }
}

impl Players {
    pub fn new(white: PlayerKind, black: PlayerKind) -> Self {
        Players { white, black }
    }

    /// A human on `human` facing `model` on the other side.
    pub fn human_vs_agent(human: Color, model: impl Into<String>) -> Self {
        match human {
            Color::White => Players::new(PlayerKind::Human, PlayerKind::agent(model)),
            Color::Black => Players::new(PlayerKind::agent(model), PlayerKind::Human),
        }
    }

    pub fn get(&self, color: Color) -> &PlayerKind {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    /// Name used in transcripts: the model for agents, the color otherwise.
    pub fn display_name(&self, color: Color) -> String {
        match self.get(color) {
            PlayerKind::Agent { model } => model.clone(),
            PlayerKind::Human => match color {
                Color::White => "White".to_string(),
                Color::Black => "Black".to_string(),
            },
        }
    }

    /// The mode implied by the seats.
    pub fn mode(&self) -> GameMode {
        match (self.white.is_agent(), self.black.is_agent()) {
            (true, true) => GameMode::AgentVsAgent,
            (false, false) => GameMode::HumanVsHuman,
            _ => GameMode::HumanVsAgent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    #[default]
    HumanVsAgent,
    AgentVsAgent,
    HumanVsHuman,
}

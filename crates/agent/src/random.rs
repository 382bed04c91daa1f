//! An agent that plays uniformly random legal moves.
//!
//! Needs no network, so it stands in for a model in offline games and
//! drives the controller in tests.

use async_trait::async_trait;
use chess_core::{Position, legal_moves, move_to_san};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    agent::{AgentReply, AgentRequest, MoveAgent},
    error::TransportError,
    tools::{MoveSubmission, ToolCall},
};

/// Never offers, accepts or resigns.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: StdRng,
    moves_played: u32,
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomAgent {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            moves_played: 0,
        }
    }

    /// Reproducible move choice.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            moves_played: 0,
        }
    }

    pub fn moves_played(&self) -> u32 {
        self.moves_played
    }
}

#[async_trait]
impl MoveAgent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    async fn exchange(&mut self, request: &AgentRequest) -> Result<AgentReply, TransportError> {
        let pos = Position::from_fen(&request.fen)
            .map_err(|e| TransportError::Unusable(format!("bad position: {e}")))?;
        let moves = legal_moves(&pos);
        let call = match moves.choose(&mut self.rng) {
            Some(&mv) => {
                self.moves_played += 1;
                ToolCall::SubmitMove(MoveSubmission::play(move_to_san(&pos, mv)))
            }
            // Nothing to play; only reachable if asked about a finished game
            None => ToolCall::SubmitMove(MoveSubmission::resign()),
        };
        Ok(AgentReply::new(call))
    }

    fn new_game(&mut self) {
        self.moves_played = 0;
    }
}

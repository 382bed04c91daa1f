use serde::{Deserialize, Serialize};

/// What it cost an agent to produce one move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStats {
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Round trips spent on this move, the accepted one included.
    pub attempts: u32,
}

impl MoveStats {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Running totals for one side over the whole game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTotals {
    pub moves: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub attempts: u32,
}

impl AgentTotals {
    pub fn record(&mut self, stats: &MoveStats) {
        self.moves += 1;
        self.input_tokens += stats.input_tokens;
        self.output_tokens += stats.output_tokens;
        self.attempts += stats.attempts;
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Average round trips per move, zero before the first move.
    pub fn attempts_per_move(&self) -> f64 {
        if self.moves == 0 {
            0.0
        } else {
            f64::from(self.attempts) / f64::from(self.moves)
        }
    }
}

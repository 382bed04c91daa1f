use std::{path::PathBuf, str::FromStr};

use agent_play::{ArenaConfig, ChatCompletionsAgent, LlmConfig, RandomAgent, Seat};
use anyhow::Context;
use chess_core::Color;
use clap::Parser;

/// Play chess against language models, or watch them play each other.
#[derive(Parser, Debug)]
#[command(name = "llmchess", version, about)]
pub struct Cli {
    /// Who plays white: human, random, model or model:<name>
    #[arg(long, default_value = "human")]
    pub white: SeatSpec,

    /// Who plays black: human, random, model or model:<name>
    #[arg(long, default_value = "model")]
    pub black: SeatSpec,

    /// TOML config with [acquisition], [prompts] and [llm] sections
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Start from this FEN instead of the initial position
    #[arg(long)]
    pub fen: Option<String>,

    /// Write the finished game as PGN to this file
    #[arg(long)]
    pub pgn: Option<PathBuf>,

    /// Stop after this many agent moves
    #[arg(long)]
    pub max_plies: Option<usize>,

    /// Seed for random seats
    #[arg(long)]
    pub seed: Option<u64>,

    /// PGN Event tag
    #[arg(long, default_value = "Casual Game")]
    pub event: String,
}

impl Cli {
    /// The perspective the game is shown from: the first human seat, or
    /// white when nobody is human.
    pub fn playing_as(&self) -> Color {
        if self.black == SeatSpec::Human && self.white != SeatSpec::Human {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn seed_for(&self, color: Color) -> Option<u64> {
        self.seed.map(|s| s.wrapping_add(color.idx() as u64))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatSpec {
    Human,
    Random,
    /// `None` uses the model from the config file.
    Model(Option<String>),
}

impl FromStr for SeatSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once(':') {
            Some(("model", name)) if !name.trim().is_empty() => {
                Ok(SeatSpec::Model(Some(name.trim().to_string())))
            }
            Some(_) => Err(format!("unknown seat '{s}'")),
            None => match s.to_ascii_lowercase().as_str() {
                "human" => Ok(SeatSpec::Human),
                "random" => Ok(SeatSpec::Random),
                "model" | "llm" => Ok(SeatSpec::Model(None)),
                _ => Err(format!(
                    "unknown seat '{s}', expected human, random, model or model:<name>"
                )),
            },
        }
    }
}

pub fn build_seat(
    spec: &SeatSpec,
    config: &ArenaConfig,
    seed: Option<u64>,
) -> anyhow::Result<Seat> {
    Ok(match spec {
        SeatSpec::Human => Seat::Human,
        SeatSpec::Random => match seed {
            Some(seed) => Seat::agent(RandomAgent::seeded(seed)),
            None => Seat::agent(RandomAgent::new()),
        },
        SeatSpec::Model(name) => {
            let llm = LlmConfig {
                model: name.clone().unwrap_or_else(|| config.llm.model.clone()),
                ..config.llm.clone()
            };
            let model = llm.model.clone();
            let agent = ChatCompletionsAgent::from_env(llm)
                .with_context(|| format!("setting up model seat '{model}'"))?;
            Seat::agent(agent)
        }
    })
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;

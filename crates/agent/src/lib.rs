//! Driving external agents through a chess game.
//!
//! An agent is anything that implements [`MoveAgent`]: it receives a
//! prompt and answers with one of two tool calls. [`acquire`] turns those
//! answers into exactly one decision per turn within a fixed attempt
//! budget, and [`GameController`] applies decisions to a
//! [`game_session::GameSession`], discarding work a newer command has
//! made stale.

pub mod acquisition;
pub mod agent;
pub mod config;
pub mod controller;
pub mod error;
pub mod generation;
pub mod llm;
pub mod prompts;
pub mod random;
pub mod tools;

pub use acquisition::{Acquisition, AcquisitionOutcome, AcquisitionState, Decision, acquire};
pub use agent::{AgentReply, AgentRequest, MoveAgent, Usage};
pub use config::{AcquisitionConfig, ArenaConfig, LlmConfig};
pub use controller::{ControllerSettings, GameController, Seat, TurnOutcome};
pub use error::{
    AcquisitionError, AcquisitionResult, ConfigError, ControllerError, ControllerResult,
    TransportError,
};
pub use generation::{GenerationCounter, GenerationToken};
pub use llm::ChatCompletionsAgent;
pub use prompts::Prompts;
pub use random::RandomAgent;
pub use tools::{MoveSubmission, ToolCall, ToolResponse, tool_definitions};

//! The agent seam: anything that can answer one tool-calling round trip.

use std::ops::AddAssign;

use async_trait::async_trait;
use chess_core::Color;
use serde::{Deserialize, Serialize};

use crate::{
    error::TransportError,
    tools::{ToolCall, ToolResponse},
};

/// Tokens billed for one or more round trips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Usage) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
    }
}

/// What an agent is shown for one round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    pub color: Color,
    /// Position the acquisition started from.
    pub fen: String,
    /// Rendered prompt, including the reply to the previous call if any.
    pub prompt: String,
    /// 1-based.
    pub attempt: u32,
    pub max_attempts: u32,
    pub draw_offered: bool,
    pub previous_invalid: Vec<String>,
    pub last_response: Option<ToolResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub call: ToolCall,
    pub usage: Usage,
}

impl AgentReply {
    pub fn new(call: ToolCall) -> Self {
        AgentReply {
            call,
            usage: Usage::default(),
        }
    }
}

/// An external move source. Implementations only talk; validation and the
/// attempt budget live in the acquisition loop.
#[async_trait]
pub trait MoveAgent: Send {
    fn name(&self) -> &str;

    /// One request, one tool call back.
    async fn exchange(&mut self, request: &AgentRequest) -> Result<AgentReply, TransportError>;

    /// Called when a new game starts.
    fn new_game(&mut self) {}
}

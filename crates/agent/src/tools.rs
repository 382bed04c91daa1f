//! The two tools an agent can call, their replies, and the JSON schemas
//! published to function-calling APIs.

use chess_core::Color;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::TransportError;

pub const INSPECT_POSITION: &str = "inspect_position";
pub const SUBMIT_MOVE: &str = "submit_move";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolCall {
    InspectPosition,
    SubmitMove(MoveSubmission),
}

/// Arguments of `submit_move`. Field names follow the JSON answer format
/// agents are prompted with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSubmission {
    #[serde(rename = "move", default)]
    pub notation: String,
    #[serde(default)]
    pub offer_draw: bool,
    #[serde(default)]
    pub resign: bool,
    /// Only meaningful while the opponent has a draw offer open.
    #[serde(default)]
    pub accept_draw: bool,
}

impl MoveSubmission {
    pub fn play(notation: impl Into<String>) -> Self {
        MoveSubmission {
            notation: notation.into(),
            ..Default::default()
        }
    }

    pub fn resign() -> Self {
        MoveSubmission {
            resign: true,
            ..Default::default()
        }
    }

    pub fn accept_draw() -> Self {
        MoveSubmission {
            accept_draw: true,
            ..Default::default()
        }
    }
}

impl ToolCall {
    /// Decodes a function call by name and JSON-encoded arguments.
    pub fn from_function(name: &str, arguments: &str) -> Result<ToolCall, TransportError> {
        match name {
            INSPECT_POSITION => Ok(ToolCall::InspectPosition),
            SUBMIT_MOVE => {
                let args = if arguments.trim().is_empty() { "{}" } else { arguments };
                serde_json::from_str(args)
                    .map(ToolCall::SubmitMove)
                    .map_err(|e| {
                        TransportError::Unusable(format!("bad {SUBMIT_MOVE} arguments: {e}"))
                    })
            }
            other => Err(TransportError::Unusable(format!("unknown tool '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResponse {
    /// Answer to `inspect_position`.
    Position {
        fen: String,
        turn: Color,
        legal_moves: Vec<String>,
        draw_offered: bool,
    },
    /// The submission ended the turn.
    Accepted {
        #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
        san: Option<String>,
        offer_draw: bool,
        resign: bool,
        accept_draw: bool,
    },
    /// The submitted move is not legal here. Try again.
    Rejected {
        #[serde(rename = "move")]
        notation: String,
        reason: String,
        legal_moves: Vec<String>,
    },
}

/// OpenAI-style `tools` array describing both tools.
pub fn tool_definitions() -> Value {
    json!([
        {
            "type": "function",
            "function": {
                "name": INSPECT_POSITION,
                "description": "Get the current position as FEN, the side to move and every legal move in SAN.",
                "parameters": { "type": "object", "properties": {}, "additionalProperties": false }
            }
        },
        {
            "type": "function",
            "function": {
                "name": SUBMIT_MOVE,
                "description": "Play a move in standard algebraic notation, optionally offering a draw, or resign, or accept a pending draw offer.",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "move": { "type": "string", "description": "Move in SAN, e.g. e4, Nf3, O-O, e8=Q" },
                        "offerDraw": { "type": "boolean", "description": "Offer a draw along with the move" },
                        "resign": { "type": "boolean", "description": "Resign instead of moving" },
                        "acceptDraw": { "type": "boolean", "description": "Accept the opponent's pending draw offer" }
                    },
                    "required": ["move"],
                    "additionalProperties": false
                }
            }
        }
    ])
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tools_tests;

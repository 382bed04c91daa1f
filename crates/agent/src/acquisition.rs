//! Turn-level negotiation with an agent.
//!
//! [`Acquisition`] is the synchronous state machine: it builds requests,
//! validates replies against a snapshot of the position and counts
//! attempts. [`acquire`] drives it over the network, bounding every round
//! trip with a timeout and checking the generation token between rounds.

use std::time::Duration;

use chess_core::{Color, Move, Position, legal_sans, move_to_san, parse_san};
use tracing::{debug, warn};

use crate::{
    agent::{AgentReply, AgentRequest, MoveAgent, Usage},
    error::{AcquisitionError, AcquisitionResult, TransportError},
    generation::{GenerationCounter, GenerationToken},
    prompts::Prompts,
    tools::{MoveSubmission, ToolCall, ToolResponse},
};

/// What the agent decided for its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Move {
        mv: Move,
        san: String,
        offer_draw: bool,
    },
    Resign,
    AcceptDraw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionState {
    AwaitingProposal,
    ValidatingProposal,
    Accepted(Decision),
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionOutcome {
    pub decision: Decision,
    pub attempts_used: u32,
    pub usage: Usage,
    /// The opponent's draw offer was open and the agent moved instead.
    pub draw_declined: bool,
}

#[derive(Debug, Clone)]
pub struct Acquisition {
    token: GenerationToken,
    color: Color,
    snapshot: Position,
    fen: String,
    draw_offered: bool,
    max_attempts: u32,
    attempts_used: u32,
    usage: Usage,
    rejected: Vec<String>,
    last_response: Option<ToolResponse>,
    last_transport_error: Option<TransportError>,
    state: AcquisitionState,
}

impl Acquisition {
    /// `draw_offered` is true when the opponent has an offer open.
    pub fn new(
        token: GenerationToken,
        color: Color,
        snapshot: Position,
        draw_offered: bool,
        max_attempts: u32,
    ) -> Self {
        Acquisition {
            token,
            color,
            fen: snapshot.to_fen(),
            snapshot,
            draw_offered,
            max_attempts: max_attempts.max(1),
            attempts_used: 0,
            usage: Usage::default(),
            rejected: Vec::new(),
            last_response: None,
            last_transport_error: None,
            state: AcquisitionState::AwaitingProposal,
        }
    }

    pub fn token(&self) -> GenerationToken {
        self.token
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn snapshot(&self) -> &Position {
        &self.snapshot
    }

    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Notations rejected so far, in order.
    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn is_awaiting(&self) -> bool {
        self.state == AcquisitionState::AwaitingProposal
    }

    /// The request for the next round trip. The prompt switches to the
    /// correction template once a move has been rejected, and carries the
    /// reply to the previous tool call.
    pub fn request(&self, prompts: &Prompts) -> AgentRequest {
        let turn = self.color.name();
        let mut prompt = if self.rejected.is_empty() {
            prompts.move_prompt(&self.fen, turn)
        } else {
            prompts.correction_prompt(&self.fen, turn, &self.rejected)
        };
        if self.draw_offered {
            prompt.push_str("\n\n");
            prompt.push_str(&prompts.draw_offer_notice);
        }
        if let Some(response) = &self.last_response {
            if let Ok(json) = serde_json::to_string(response) {
                prompt.push_str("\n\nResult of your last tool call: ");
                prompt.push_str(&json);
            }
        }
        AgentRequest {
            color: self.color,
            fen: self.fen.clone(),
            prompt,
            attempt: self.attempts_used + 1,
            max_attempts: self.max_attempts,
            draw_offered: self.draw_offered,
            previous_invalid: self.rejected.clone(),
            last_response: self.last_response.clone(),
        }
    }

    /// Consumes one attempt and answers the agent's tool call.
    pub fn handle_reply(&mut self, reply: AgentReply) -> ToolResponse {
        self.attempts_used += 1;
        self.usage += reply.usage;
        self.state = AcquisitionState::ValidatingProposal;

        let response = match reply.call {
            ToolCall::InspectPosition => {
                self.state = self.after_round();
                ToolResponse::Position {
                    fen: self.fen.clone(),
                    turn: self.color,
                    legal_moves: legal_sans(&self.snapshot),
                    draw_offered: self.draw_offered,
                }
            }
            ToolCall::SubmitMove(submission) => self.validate(submission),
        };
        self.last_response = Some(response.clone());
        response
    }

    fn validate(&mut self, submission: MoveSubmission) -> ToolResponse {
        if submission.resign {
            self.state = AcquisitionState::Accepted(Decision::Resign);
            return ToolResponse::Accepted {
                san: None,
                offer_draw: false,
                resign: true,
                accept_draw: false,
            };
        }
        if submission.accept_draw && self.draw_offered {
            self.state = AcquisitionState::Accepted(Decision::AcceptDraw);
            return ToolResponse::Accepted {
                san: None,
                offer_draw: false,
                resign: false,
                accept_draw: true,
            };
        }

        let notation = submission.notation.trim().to_string();
        match parse_san(&self.snapshot, &notation) {
            Ok(mv) => {
                let san = move_to_san(&self.snapshot, mv);
                self.state = AcquisitionState::Accepted(Decision::Move {
                    mv,
                    san: san.clone(),
                    offer_draw: submission.offer_draw,
                });
                ToolResponse::Accepted {
                    san: Some(san),
                    offer_draw: submission.offer_draw,
                    resign: false,
                    accept_draw: false,
                }
            }
            Err(e) => {
                let reason = if submission.accept_draw && notation.is_empty() {
                    "there is no draw offer to accept".to_string()
                } else {
                    e.to_string()
                };
                self.rejected.push(notation.clone());
                self.state = self.after_round();
                ToolResponse::Rejected {
                    notation,
                    reason,
                    legal_moves: legal_sans(&self.snapshot),
                }
            }
        }
    }

    /// Consumes one attempt for a round trip that produced nothing.
    pub fn record_transport_failure(&mut self, error: TransportError) {
        self.attempts_used += 1;
        self.last_transport_error = Some(error);
        self.state = self.after_round();
    }

    fn after_round(&self) -> AcquisitionState {
        if self.attempts_used >= self.max_attempts {
            AcquisitionState::Exhausted
        } else {
            AcquisitionState::AwaitingProposal
        }
    }

    /// The final verdict. An acquisition that never reached a decision
    /// counts as exhausted.
    pub fn into_outcome(self) -> AcquisitionResult<AcquisitionOutcome> {
        match self.state {
            AcquisitionState::Accepted(decision) => {
                let draw_declined =
                    self.draw_offered && matches!(decision, Decision::Move { .. });
                Ok(AcquisitionOutcome {
                    decision,
                    attempts_used: self.attempts_used,
                    usage: self.usage,
                    draw_declined,
                })
            }
            _ => Err(AcquisitionError::BudgetExhausted {
                attempts: self.attempts_used,
                rejected: self.rejected,
                last_transport_error: self.last_transport_error,
            }),
        }
    }
}

/// Runs `acquisition` against `agent` until it is accepted or exhausted.
///
/// Returns [`AcquisitionError::Cancelled`] as soon as `counter` has moved
/// past the acquisition's token, checked before every round trip and once
/// more at the end.
pub async fn acquire(
    agent: &mut dyn MoveAgent,
    mut acquisition: Acquisition,
    counter: &GenerationCounter,
    round_trip_timeout: Duration,
    prompts: &Prompts,
) -> AcquisitionResult<AcquisitionOutcome> {
    let color = acquisition.color();
    let name = agent.name().to_string();
    let generation = acquisition.token().value();
    while acquisition.is_awaiting() {
        if !counter.is_current(acquisition.token()) {
            debug!(agent = %name, %color, generation, "acquisition superseded");
            return Err(AcquisitionError::Cancelled);
        }

        let request = acquisition.request(prompts);
        debug!(
            agent = %name,
            %color,
            generation,
            attempt = request.attempt,
            max_attempts = request.max_attempts,
            "requesting move"
        );
        let exchanged = tokio::time::timeout(round_trip_timeout, agent.exchange(&request)).await;
        match exchanged {
            Ok(Ok(reply)) => match acquisition.handle_reply(reply) {
                ToolResponse::Rejected {
                    notation, reason, ..
                } => {
                    warn!(agent = %name, %color, %notation, %reason, "illegal proposal");
                }
                ToolResponse::Position { .. } => {
                    debug!(agent = %name, %color, "position inspected");
                }
                ToolResponse::Accepted { .. } => {}
            },
            Ok(Err(e)) => {
                warn!(agent = %name, %color, error = %e, "round trip failed");
                acquisition.record_transport_failure(e);
            }
            Err(_) => {
                warn!(agent = %name, %color, timeout = ?round_trip_timeout, "round trip timed out");
                acquisition.record_transport_failure(TransportError::Timeout(round_trip_timeout));
            }
        }
    }

    if !counter.is_current(acquisition.token()) {
        debug!(agent = %name, %color, generation, "acquisition superseded");
        return Err(AcquisitionError::Cancelled);
    }
    acquisition.into_outcome()
}

#[cfg(test)]
#[path = "acquisition_tests.rs"]
mod acquisition_tests;

use std::collections::VecDeque;

use async_trait::async_trait;

use super::*;

/// Replays a fixed list of replies and remembers what it was asked.
struct Scripted {
    replies: VecDeque<Result<AgentReply, TransportError>>,
    requests: Vec<AgentRequest>,
}

impl Scripted {
    fn new(replies: Vec<Result<AgentReply, TransportError>>) -> Self {
        Scripted {
            replies: replies.into(),
            requests: Vec::new(),
        }
    }

    fn moves(notations: &[&str]) -> Self {
        Self::new(
            notations
                .iter()
                .map(|n| Ok(AgentReply::new(ToolCall::SubmitMove(MoveSubmission::play(*n)))))
                .collect(),
        )
    }
}

#[async_trait]
impl MoveAgent for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn exchange(&mut self, request: &AgentRequest) -> Result<AgentReply, TransportError> {
        self.requests.push(request.clone());
        self.replies
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Unusable("script ran out".into())))
    }
}

fn start(counter: &GenerationCounter, draw_offered: bool, max_attempts: u32) -> Acquisition {
    Acquisition::new(
        counter.begin(),
        Color::White,
        Position::startpos(),
        draw_offered,
        max_attempts,
    )
}

async fn run(
    agent: &mut Scripted,
    acquisition: Acquisition,
    counter: &GenerationCounter,
) -> AcquisitionResult<AcquisitionOutcome> {
    acquire(agent, acquisition, counter, Duration::from_secs(5), &Prompts::default()).await
}

#[tokio::test]
async fn test_legal_move_is_accepted_first_try() {
    let counter = GenerationCounter::new();
    let mut agent = Scripted::moves(&["e4"]);
    let outcome = run(&mut agent, start(&counter, false, 3), &counter).await.unwrap();
    assert_eq!(outcome.attempts_used, 1);
    assert!(!outcome.draw_declined);
    match outcome.decision {
        Decision::Move { san, offer_draw, .. } => {
            assert_eq!(san, "e4");
            assert!(!offer_draw);
        }
        other => panic!("unexpected decision {other:?}"),
    }
    assert_eq!(agent.requests.len(), 1);
    assert!(agent.requests[0].prompt.contains("TURN: white"));
}

#[tokio::test]
async fn test_always_illegal_exhausts_after_exactly_n() {
    let counter = GenerationCounter::new();
    let mut agent = Scripted::moves(&["Ke2"; 10]);
    let err = run(&mut agent, start(&counter, false, 4), &counter).await.unwrap_err();
    assert_eq!(
        err,
        AcquisitionError::BudgetExhausted {
            attempts: 4,
            rejected: vec!["Ke2".to_string(); 4],
            last_transport_error: None,
        }
    );
    assert_eq!(agent.requests.len(), 4);
    assert_eq!(agent.requests[3].attempt, 4);
}

#[tokio::test]
async fn test_rejection_switches_to_correction_prompt() {
    let counter = GenerationCounter::new();
    let mut agent = Scripted::moves(&["e5", "Nf3"]);
    let outcome = run(&mut agent, start(&counter, false, 5), &counter).await.unwrap();
    assert_eq!(outcome.attempts_used, 2);

    let second = &agent.requests[1];
    assert_eq!(second.previous_invalid, vec!["e5".to_string()]);
    assert!(second.prompt.contains(r#"PREVIOUS INVALID MOVES: ["e5"]"#));
    match &second.last_response {
        Some(ToolResponse::Rejected { notation, legal_moves, .. }) => {
            assert_eq!(notation, "e5");
            assert_eq!(legal_moves.len(), 20);
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_inspect_position_costs_an_attempt() {
    let counter = GenerationCounter::new();
    let mut agent = Scripted::new(vec![
        Ok(AgentReply::new(ToolCall::InspectPosition)),
        Ok(AgentReply::new(ToolCall::SubmitMove(MoveSubmission::play("d4")))),
    ]);
    let outcome = run(&mut agent, start(&counter, false, 5), &counter).await.unwrap();
    assert_eq!(outcome.attempts_used, 2);
    match &agent.requests[1].last_response {
        Some(ToolResponse::Position { turn, legal_moves, .. }) => {
            assert_eq!(*turn, Color::White);
            assert!(legal_moves.contains(&"Nf3".to_string()));
        }
        other => panic!("expected the position, got {other:?}"),
    }
}

#[tokio::test]
async fn test_inspecting_forever_exhausts_the_budget() {
    let counter = GenerationCounter::new();
    let mut agent = Scripted::new(
        (0..5)
            .map(|_| Ok(AgentReply::new(ToolCall::InspectPosition)))
            .collect(),
    );
    let err = run(&mut agent, start(&counter, false, 2), &counter).await.unwrap_err();
    assert!(matches!(err, AcquisitionError::BudgetExhausted { attempts: 2, .. }));
}

#[tokio::test]
async fn test_resign_ends_acquisition() {
    let counter = GenerationCounter::new();
    let mut agent = Scripted::new(vec![Ok(AgentReply::new(ToolCall::SubmitMove(
        MoveSubmission::resign(),
    )))]);
    let outcome = run(&mut agent, start(&counter, false, 3), &counter).await.unwrap();
    assert_eq!(outcome.decision, Decision::Resign);
}

#[test]
fn test_accepting_a_draw_needs_an_open_offer() {
    let counter = GenerationCounter::new();

    let mut with_offer = start(&counter, true, 3);
    with_offer.handle_reply(AgentReply::new(ToolCall::SubmitMove(MoveSubmission::accept_draw())));
    assert_eq!(with_offer.state(), &AcquisitionState::Accepted(Decision::AcceptDraw));

    let mut without = start(&counter, false, 3);
    let response =
        without.handle_reply(AgentReply::new(ToolCall::SubmitMove(MoveSubmission::accept_draw())));
    match response {
        ToolResponse::Rejected { reason, .. } => assert!(reason.contains("no draw offer")),
        other => panic!("expected a rejection, got {other:?}"),
    }
    assert!(without.is_awaiting());
}

#[test]
fn test_moving_with_an_open_offer_declines_it() {
    let counter = GenerationCounter::new();
    let mut acquisition = start(&counter, true, 3);
    let request = acquisition.request(&Prompts::default());
    assert!(request.draw_offered);
    assert!(request.prompt.contains("offered a draw"));

    acquisition.handle_reply(AgentReply::new(ToolCall::SubmitMove(MoveSubmission {
        notation: "e4".into(),
        offer_draw: true,
        ..Default::default()
    })));
    let outcome = acquisition.into_outcome().unwrap();
    assert!(outcome.draw_declined);
    assert!(matches!(outcome.decision, Decision::Move { offer_draw: true, .. }));
}

#[tokio::test]
async fn test_stale_token_is_cancelled_before_any_round_trip() {
    let counter = GenerationCounter::new();
    let acquisition = start(&counter, false, 3);
    counter.invalidate();
    let mut agent = Scripted::moves(&["e4"]);
    assert_eq!(
        run(&mut agent, acquisition, &counter).await,
        Err(AcquisitionError::Cancelled)
    );
    assert!(agent.requests.is_empty());
}

#[tokio::test]
async fn test_transport_failures_consume_attempts() {
    let counter = GenerationCounter::new();
    let mut agent = Scripted::new(vec![
        Err(TransportError::Http("connection reset".into())),
        Err(TransportError::Status {
            status: 502,
            body: "bad gateway".into(),
        }),
    ]);
    let err = run(&mut agent, start(&counter, false, 2), &counter).await.unwrap_err();
    assert_eq!(
        err,
        AcquisitionError::BudgetExhausted {
            attempts: 2,
            rejected: Vec::new(),
            last_transport_error: Some(TransportError::Status {
                status: 502,
                body: "bad gateway".into(),
            }),
        }
    );
}

#[tokio::test]
async fn test_usage_is_summed_over_round_trips() {
    let counter = GenerationCounter::new();
    let reply = |n: &str, input: u64, output: u64| -> Result<AgentReply, TransportError> {
        Ok(AgentReply {
            call: ToolCall::SubmitMove(MoveSubmission::play(n)),
            usage: Usage {
                input_tokens: input,
                output_tokens: output,
            },
        })
    };
    let mut agent = Scripted::new(vec![reply("Qh5", 100, 10), reply("e4", 120, 12)]);
    let outcome = run(&mut agent, start(&counter, false, 3), &counter).await.unwrap();
    assert_eq!(
        outcome.usage,
        Usage {
            input_tokens: 220,
            output_tokens: 22,
        }
    );
}

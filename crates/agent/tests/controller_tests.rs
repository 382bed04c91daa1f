//! Controller behaviour with scripted agents: budgets, cancellation, draw
//! offers and forced resignation.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use agent_play::{
    AcquisitionError, AgentReply, AgentRequest, ControllerError, ControllerSettings,
    GameController, MoveAgent, MoveSubmission, Prompts, RandomAgent, Seat, ToolCall,
    TransportError, TurnOutcome, Usage,
};
use async_trait::async_trait;
use chess_core::Color;
use game_session::{GameMode, GameOverReason, SessionError, SessionState};
use parking_lot::Mutex;
use tokio::sync::Notify;

/// Answers from a fixed list and records every request it receives.
struct Scripted {
    replies: VecDeque<AgentReply>,
    log: Arc<Mutex<Vec<AgentRequest>>>,
}

impl Scripted {
    fn new(calls: Vec<ToolCall>) -> (Self, Arc<Mutex<Vec<AgentRequest>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let agent = Scripted {
            replies: calls.into_iter().map(AgentReply::new).collect(),
            log: log.clone(),
        };
        (agent, log)
    }

    fn moves(notations: &[&str]) -> (Self, Arc<Mutex<Vec<AgentRequest>>>) {
        Self::new(
            notations
                .iter()
                .map(|n| ToolCall::SubmitMove(MoveSubmission::play(*n)))
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
        self.log.lock().push(request.clone());
        self.replies
            .pop_front()
            .ok_or_else(|| TransportError::Unusable("script ran out".into()))
    }
}

/// Blocks inside its first round trip until released.
struct Gated {
    entered: Arc<Notify>,
    release: Arc<Notify>,
    call: ToolCall,
}

#[async_trait]
impl MoveAgent for Gated {
    fn name(&self) -> &str {
        "gated"
    }

    async fn exchange(&mut self, _request: &AgentRequest) -> Result<AgentReply, TransportError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(AgentReply::new(self.call.clone()))
    }
}

/// Never answers.
struct Silent;

#[async_trait]
impl MoveAgent for Silent {
    fn name(&self) -> &str {
        "silent"
    }

    async fn exchange(&mut self, _request: &AgentRequest) -> Result<AgentReply, TransportError> {
        std::future::pending().await
    }
}

fn controller(max_attempts: u32) -> GameController {
    GameController::new(ControllerSettings {
        max_attempts,
        round_trip_timeout: Duration::from_secs(30),
        prompts: Prompts::default(),
    })
}

fn gated(notation: &str) -> (Gated, Arc<Notify>, Arc<Notify>) {
    gated_call(ToolCall::SubmitMove(MoveSubmission::play(notation)))
}

fn gated_call(call: ToolCall) -> (Gated, Arc<Notify>, Arc<Notify>) {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let agent = Gated {
        entered: entered.clone(),
        release: release.clone(),
        call,
    };
    (agent, entered, release)
}

const CANCELLED: ControllerError = ControllerError::Acquisition(AcquisitionError::Cancelled);

#[tokio::test]
async fn test_always_illegal_agent_is_forced_to_resign_after_n_attempts() {
    let game = controller(3);
    let (agent, log) = Scripted::moves(&["Ke2"; 10]);
    game.start_game(Seat::agent(agent), Seat::Human, Color::Black);

    match game.play_agent_turn().await.unwrap() {
        TurnOutcome::Forfeited { result, reason } => {
            assert_eq!(result.winner, Some(Color::Black));
            assert_eq!(result.reason, GameOverReason::Resignation);
            assert!(reason.contains("3 attempts"), "{reason}");
        }
        other => panic!("expected a forfeit, got {other:?}"),
    }
    assert_eq!(log.lock().len(), 3);
    let session = game.snapshot();
    assert_eq!(session.state(), SessionState::Finished);
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_legal_move_after_rejections_records_stats() {
    let game = controller(5);
    let (agent, log) = Scripted::new(vec![
        ToolCall::SubmitMove(MoveSubmission::play("e5")),
        ToolCall::InspectPosition,
        ToolCall::SubmitMove(MoveSubmission::play("e4")),
    ]);
    game.start_game(Seat::agent(agent), Seat::Human, Color::Black);

    match game.play_agent_turn().await.unwrap() {
        TurnOutcome::Moved(record) => {
            assert_eq!(record.san, "e4");
            assert_eq!(record.color, Color::White);
            assert_eq!(record.stats.map(|s| s.attempts), Some(3));
        }
        other => panic!("expected a move, got {other:?}"),
    }
    assert_eq!(log.lock()[2].previous_invalid, vec!["e5".to_string()]);
    let session = game.snapshot();
    assert_eq!(session.turn(), Color::Black);
    assert_eq!(session.totals(Color::White).attempts, 3);
    assert_eq!(session.mode(), GameMode::HumanVsAgent);
    assert_eq!(session.players().display_name(Color::White), "scripted");
}

#[tokio::test]
async fn test_new_game_discards_in_flight_acquisition() {
    let game = controller(3);
    let (agent, entered, release) = gated("e4");
    game.start_game(Seat::agent(agent), Seat::Human, Color::Black);

    let pending = game.clone();
    let task = tokio::spawn(async move { pending.play_agent_turn().await });
    entered.notified().await;

    game.start_game(Seat::Human, Seat::agent(RandomAgent::seeded(3)), Color::White);
    release.notify_one();

    assert_eq!(task.await.unwrap(), Err(CANCELLED));
    let session = game.snapshot();
    assert!(session.history().is_empty());
    assert_eq!(session.state(), SessionState::Playing);
    assert!(!game.is_agent_turn());
}

#[tokio::test]
async fn test_pause_cancels_and_resume_allows_a_fresh_turn() {
    let game = controller(3);
    let (agent, entered, release) = gated("d4");
    game.start_game(Seat::agent(agent), Seat::Human, Color::Black);

    let pending = game.clone();
    let task = tokio::spawn(async move { pending.play_agent_turn().await });
    entered.notified().await;
    game.pause().unwrap();
    release.notify_one();

    assert_eq!(task.await.unwrap(), Err(CANCELLED));
    assert_eq!(game.snapshot().state(), SessionState::Paused);
    assert!(game.snapshot().history().is_empty());
    assert_eq!(
        game.play_agent_turn().await,
        Err(ControllerError::Session(SessionError::NotPlaying {
            state: SessionState::Paused
        }))
    );

    game.resume().unwrap();
    assert!(game.is_agent_turn());
    release.notify_one();
    let outcome = game.play_agent_turn().await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Moved(ref r) if r.san == "d4"));
}

#[tokio::test]
async fn test_identical_new_game_never_receives_the_old_move() {
    let game = controller(3);
    let (agent, entered, release) = gated("e4");
    game.start_game(Seat::agent(agent), Seat::Human, Color::Black);

    let pending = game.clone();
    let task = tokio::spawn(async move { pending.play_agent_turn().await });
    entered.notified().await;

    // Same seats and same starting position as the abandoned game
    let (fresh, _, _) = gated("d4");
    game.start_game(Seat::agent(fresh), Seat::Human, Color::Black);
    release.notify_one();

    assert_eq!(task.await.unwrap(), Err(CANCELLED));
    let session = game.snapshot();
    assert!(session.history().is_empty());
    assert!(game.is_agent_turn());
}

#[tokio::test]
async fn test_quick_pause_and_resume_still_discards_old_move() {
    let game = controller(3);
    let (agent, entered, release) = gated("e4");
    game.start_game(Seat::agent(agent), Seat::Human, Color::Black);

    let pending = game.clone();
    let task = tokio::spawn(async move { pending.play_agent_turn().await });
    entered.notified().await;
    game.pause().unwrap();
    game.resume().unwrap();
    release.notify_one();

    assert_eq!(task.await.unwrap(), Err(CANCELLED));
    let session = game.snapshot();
    assert!(session.history().is_empty());
    assert!(session.is_playing());
}

#[tokio::test]
async fn test_human_resignation_while_agent_thinks() {
    let game = controller(3);
    let (agent, entered, release) = gated("e4");
    game.start_game(Seat::agent(agent), Seat::Human, Color::Black);

    let pending = game.clone();
    let task = tokio::spawn(async move { pending.play_agent_turn().await });
    entered.notified().await;
    let result = game.resign(Color::Black).unwrap();
    release.notify_one();

    assert_eq!(task.await.unwrap(), Err(CANCELLED));
    assert_eq!(game.snapshot().result(), Some(result));
    assert_eq!(result.winner, Some(Color::White));
}

#[tokio::test]
async fn test_agent_accepts_human_draw_offer() {
    let game = controller(3);
    let (agent, log) = Scripted::new(vec![ToolCall::SubmitMove(MoveSubmission::accept_draw())]);
    game.start_game(Seat::Human, Seat::agent(agent), Color::White);

    game.submit_human_move("e4").unwrap();
    game.offer_draw(Color::White, true).unwrap();

    match game.play_agent_turn().await.unwrap() {
        TurnOutcome::DrawAgreed(result) => {
            assert_eq!(result.winner, None);
            assert_eq!(result.reason, GameOverReason::DrawAgreement);
        }
        other => panic!("expected a draw, got {other:?}"),
    }
    let request = &log.lock()[0];
    assert!(request.draw_offered);
    assert!(request.prompt.contains("offered a draw"));
}

#[tokio::test]
async fn test_withdrawn_offer_voids_agent_acceptance() {
    let game = controller(3);
    let (agent, entered, release) = gated_call(ToolCall::SubmitMove(MoveSubmission::accept_draw()));
    game.start_game(Seat::Human, Seat::agent(agent), Color::White);
    game.submit_human_move("e4").unwrap();
    game.offer_draw(Color::White, true).unwrap();

    let pending = game.clone();
    let task = tokio::spawn(async move { pending.play_agent_turn().await });
    entered.notified().await;
    game.offer_draw(Color::White, false).unwrap();
    release.notify_one();

    assert_eq!(task.await.unwrap(), Err(CANCELLED));
    let session = game.snapshot();
    assert!(session.is_playing());
    assert_eq!(session.result(), None);
    assert_eq!(session.draw_offered_by(), None);
    assert_eq!(session.turn(), Color::Black);
    assert!(game.is_agent_turn());
}

#[tokio::test]
async fn test_agent_declines_by_moving_in_the_same_round_trip() {
    let game = controller(3);
    let (agent, log) = Scripted::moves(&["e5"]);
    game.start_game(Seat::Human, Seat::agent(agent), Color::White);

    game.submit_human_move("e4").unwrap();
    game.offer_draw(Color::White, true).unwrap();

    let outcome = game.play_agent_turn().await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Moved(ref r) if r.san == "e5"));
    assert_eq!(log.lock().len(), 1);
    let session = game.snapshot();
    assert_eq!(session.draw_offered_by(), None);
    assert!(session.is_playing());
}

#[tokio::test]
async fn test_agent_draw_offer_is_left_for_the_human() {
    let game = controller(3);
    let (agent, _log) = Scripted::new(vec![ToolCall::SubmitMove(MoveSubmission {
        notation: "e4".into(),
        offer_draw: true,
        ..Default::default()
    })]);
    game.start_game(Seat::agent(agent), Seat::Human, Color::Black);

    game.play_agent_turn().await.unwrap();
    assert_eq!(game.snapshot().draw_offered_by(), Some(Color::White));

    // The offerer cannot accept its own offer
    assert_eq!(
        game.accept_draw(Color::White),
        Err(ControllerError::Session(SessionError::NoDrawOffer))
    );
    let result = game.accept_draw(Color::Black).unwrap();
    assert_eq!(result.reason, GameOverReason::DrawAgreement);
}

#[tokio::test]
async fn test_agent_resignation() {
    let game = controller(3);
    let (agent, _log) = Scripted::new(vec![ToolCall::SubmitMove(MoveSubmission::resign())]);
    game.start_game(Seat::Human, Seat::agent(agent), Color::White);
    game.submit_human_move("Nf3").unwrap();

    match game.play_agent_turn().await.unwrap() {
        TurnOutcome::Resigned(result) => assert_eq!(result.winner, Some(Color::White)),
        other => panic!("expected resignation, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_silent_agent_times_out_every_attempt() {
    let game = controller(2);
    game.start_game(Seat::agent(Silent), Seat::Human, Color::Black);

    let started = tokio::time::Instant::now();
    match game.play_agent_turn().await.unwrap() {
        TurnOutcome::Forfeited { reason, .. } => assert!(reason.contains("2 attempts")),
        other => panic!("expected a forfeit, got {other:?}"),
    }
    assert!(started.elapsed() >= Duration::from_secs(60));
}

#[tokio::test]
async fn test_turn_ownership_is_enforced() {
    let game = controller(3);
    let (agent, _log) = Scripted::moves(&["e5"]);
    game.start_game(Seat::Human, Seat::agent(agent), Color::White);

    assert_eq!(
        game.play_agent_turn().await,
        Err(ControllerError::NotAgentTurn(Color::White))
    );
    game.submit_human_move("e4").unwrap();
    assert_eq!(
        game.submit_human_move("e5"),
        Err(ControllerError::NotHumanTurn(Color::Black))
    );
}

#[tokio::test]
async fn test_usage_is_carried_into_move_stats() {
    let game = controller(3);
    let agent = UsageAgent;
    game.start_game(Seat::agent(agent), Seat::Human, Color::Black);

    let outcome = game.play_agent_turn().await.unwrap();
    let TurnOutcome::Moved(record) = outcome else {
        panic!("expected a move");
    };
    let stats = record.stats.unwrap();
    assert_eq!((stats.input_tokens, stats.output_tokens), (640, 12));
    assert_eq!(game.snapshot().totals(Color::White).total_tokens(), 652);
}

struct UsageAgent;

#[async_trait]
impl MoveAgent for UsageAgent {
    fn name(&self) -> &str {
        "metered"
    }

    async fn exchange(&mut self, _request: &AgentRequest) -> Result<AgentReply, TransportError> {
        Ok(AgentReply {
            call: ToolCall::SubmitMove(MoveSubmission::play("c4")),
            usage: Usage {
                input_tokens: 640,
                output_tokens: 12,
            },
        })
    }
}

#[tokio::test]
async fn test_random_agents_play_a_game_to_the_end() {
    let game = controller(1);
    game.start_game(
        Seat::agent(RandomAgent::seeded(11)),
        Seat::agent(RandomAgent::seeded(12)),
        Color::White,
    );
    assert_eq!(game.snapshot().mode(), GameMode::AgentVsAgent);

    let outcomes = game.run_agent_turns(None).await.unwrap();
    let session = game.snapshot();
    assert_eq!(session.state(), SessionState::Finished);
    assert_eq!(outcomes.len(), session.history().len());
    assert!(session.result().is_some());
}

#[tokio::test]
async fn test_run_agent_turns_respects_ply_limit() {
    let game = controller(1);
    game.start_game(
        Seat::agent(RandomAgent::seeded(5)),
        Seat::agent(RandomAgent::seeded(6)),
        Color::White,
    );
    let outcomes = game.run_agent_turns(Some(6)).await.unwrap();
    assert_eq!(outcomes.len(), 6);
    assert_eq!(game.snapshot().history().len(), 6);
}

//! Owns a live game and the agents seated in it.
//!
//! The session sits behind a `parking_lot::Mutex` that is only ever held
//! for synchronous work; agent round trips happen with the lock released.
//! Every command that changes whose move it is (or whether anyone moves)
//! bumps the generation counter, so an acquisition still in flight finds
//! its token stale and drops its result.

use std::{sync::Arc, time::Duration};

use chess_core::{Color, Position};
use game_session::{
    GameResult, GameSession, MoveRecord, MoveStats, PlayerKind, Players, SessionError,
    SessionState,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    acquisition::{Acquisition, Decision, acquire},
    agent::MoveAgent,
    config::ArenaConfig,
    error::{AcquisitionError, ControllerError, ControllerResult},
    generation::GenerationCounter,
    prompts::Prompts,
};

type SharedAgent = Arc<tokio::sync::Mutex<Box<dyn MoveAgent>>>;

/// Who sits on one side of the board.
pub enum Seat {
    Human,
    Agent(Box<dyn MoveAgent>),
}

impl Seat {
    pub fn agent(agent: impl MoveAgent + 'static) -> Self {
        Seat::Agent(Box::new(agent))
    }

    fn player_kind(&self) -> PlayerKind {
        match self {
            Seat::Human => PlayerKind::Human,
            Seat::Agent(agent) => PlayerKind::agent(agent.name()),
        }
    }

    fn into_shared(self) -> Option<SharedAgent> {
        match self {
            Seat::Human => None,
            Seat::Agent(mut agent) => {
                agent.new_game();
                Some(Arc::new(tokio::sync::Mutex::new(agent)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub max_attempts: u32,
    pub round_trip_timeout: Duration,
    pub prompts: Prompts,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&ArenaConfig::default())
    }
}

impl ControllerSettings {
    pub fn from_config(config: &ArenaConfig) -> Self {
        Self {
            max_attempts: config.acquisition.max_attempts,
            round_trip_timeout: config.acquisition.round_trip_timeout(),
            prompts: config.prompts.clone(),
        }
    }
}

/// How an agent's turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Moved(MoveRecord),
    Resigned(GameResult),
    DrawAgreed(GameResult),
    /// The agent ran out of attempts, or its move could not be applied, and
    /// lost by resignation.
    Forfeited { result: GameResult, reason: String },
}

/// Cheap to clone; clones drive the same game.
#[derive(Clone)]
pub struct GameController {
    session: Arc<Mutex<GameSession>>,
    generation: GenerationCounter,
    agents: Arc<Mutex<[Option<SharedAgent>; 2]>>,
    settings: Arc<ControllerSettings>,
}

impl Default for GameController {
    fn default() -> Self {
        Self::new(ControllerSettings::default())
    }
}

impl GameController {
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            session: Arc::new(Mutex::new(GameSession::new())),
            generation: GenerationCounter::new(),
            agents: Arc::new(Mutex::new([None, None])),
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Seats both sides and starts from the initial position. Anything in
    /// flight for the previous game is abandoned.
    pub fn start_game(&self, white: Seat, black: Seat, playing_as: Color) {
        let mut session = self.session.lock();
        let players = self.seat(white, black);
        let mode = players.mode();
        session.start_game(players, mode, playing_as);
    }

    pub fn start_game_from(
        &self,
        white: Seat,
        black: Seat,
        playing_as: Color,
        position: Position,
    ) -> ControllerResult<()> {
        let mut session = self.session.lock();
        let players = self.seat(white, black);
        let mode = players.mode();
        session.start_game_from(players, mode, playing_as, position)?;
        Ok(())
    }

    /// Callers hold the session lock across the bump and the reset.
    fn seat(&self, white: Seat, black: Seat) -> Players {
        self.generation.invalidate();
        let players = Players::new(white.player_kind(), black.player_kind());
        *self.agents.lock() = [white.into_shared(), black.into_shared()];
        players
    }

    fn agent_for(&self, color: Color) -> Option<SharedAgent> {
        self.agents.lock()[color.idx()].clone()
    }

    pub fn has_agent(&self, color: Color) -> bool {
        self.agents.lock()[color.idx()].is_some()
    }

    /// True while the game is running and an agent is to move.
    pub fn is_agent_turn(&self) -> bool {
        let session = self.session.lock();
        session.is_playing() && self.has_agent(session.turn())
    }

    /// Plays a move for the human whose turn it is.
    pub fn submit_human_move(&self, notation: &str) -> ControllerResult<MoveRecord> {
        let mut session = self.session.lock();
        let turn = session.turn();
        if session.is_playing() && self.has_agent(turn) {
            return Err(ControllerError::NotHumanTurn(turn));
        }
        Ok(session.submit_move(notation, None)?)
    }

    pub fn resign(&self, color: Color) -> ControllerResult<GameResult> {
        let mut session = self.session.lock();
        self.generation.invalidate();
        Ok(session.resign(color)?)
    }

    pub fn offer_draw(&self, color: Color, offered: bool) -> ControllerResult<()> {
        Ok(self.session.lock().offer_draw_from(color, offered)?)
    }

    /// `color` accepts the offer its opponent made.
    pub fn accept_draw(&self, color: Color) -> ControllerResult<GameResult> {
        let mut session = self.session.lock();
        if session.state() == SessionState::Finished {
            return Err(SessionError::GameFinished.into());
        }
        if session.draw_offered_by() != Some(color.other()) {
            return Err(SessionError::NoDrawOffer.into());
        }
        self.generation.invalidate();
        Ok(session.accept_draw()?)
    }

    pub fn decline_draw(&self) -> ControllerResult<()> {
        Ok(self.session.lock().decline_draw()?)
    }

    /// Suspends the game and abandons any acquisition in flight.
    pub fn pause(&self) -> ControllerResult<()> {
        let mut session = self.session.lock();
        self.generation.invalidate();
        Ok(session.pause()?)
    }

    /// Resumes a paused game. The caller restarts agent play.
    pub fn resume(&self) -> ControllerResult<()> {
        Ok(self.session.lock().resume()?)
    }

    pub fn view_history(&self, index: Option<usize>) -> ControllerResult<Position> {
        Ok(self.session.lock().view_history(index)?)
    }

    /// A copy of the session as it is now.
    pub fn snapshot(&self) -> GameSession {
        self.session.lock().clone()
    }

    pub fn with_session<R>(&self, f: impl FnOnce(&GameSession) -> R) -> R {
        f(&self.session.lock())
    }

    /// Asks the agent to move for the side to move and applies its
    /// decision.
    ///
    /// Returns [`AcquisitionError::Cancelled`] if the game moved on while
    /// the agent was thinking; the session is then left as it is. An agent
    /// that cannot produce a legal move resigns.
    pub async fn play_agent_turn(&self) -> ControllerResult<TurnOutcome> {
        let (acquisition, agent) = {
            let session = self.session.lock();
            match session.state() {
                SessionState::Playing => {}
                SessionState::Finished => return Err(SessionError::GameFinished.into()),
                state => return Err(SessionError::NotPlaying { state }.into()),
            }
            let color = session.turn();
            let agent = self
                .agent_for(color)
                .ok_or(ControllerError::NotAgentTurn(color))?;
            let draw_offered = session.draw_offered_by() == Some(color.other());
            let acquisition = Acquisition::new(
                self.generation.begin(),
                color,
                session.position().clone(),
                draw_offered,
                self.settings.max_attempts,
            );
            (acquisition, agent)
        };
        let token = acquisition.token();
        let color = acquisition.color();
        let snapshot = acquisition.snapshot().clone();

        let result = {
            let mut agent = agent.lock().await;
            acquire(
                &mut **agent,
                acquisition,
                &self.generation,
                self.settings.round_trip_timeout,
                &self.settings.prompts,
            )
            .await
        };

        let mut session = self.session.lock();
        let stale = matches!(result, Err(AcquisitionError::Cancelled))
            || !self.generation.is_current(token)
            || !session.is_playing()
            || session.turn() != color
            || session.position() != &snapshot;
        if stale {
            debug!(session = %session.id(), %color, "discarding stale acquisition");
            return Err(AcquisitionError::Cancelled.into());
        }

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => return forfeit(&mut session, color, e.to_string()),
        };
        match outcome.decision {
            Decision::Resign => {
                info!(session = %session.id(), %color, "agent resigns");
                Ok(TurnOutcome::Resigned(session.resign(color)?))
            }
            Decision::AcceptDraw => {
                if session.draw_offered_by() != Some(color.other()) {
                    debug!(session = %session.id(), %color, "draw offer withdrawn while thinking");
                    return Err(AcquisitionError::Cancelled.into());
                }
                info!(session = %session.id(), %color, "agent accepts draw");
                Ok(TurnOutcome::DrawAgreed(session.accept_draw()?))
            }
            Decision::Move {
                san, offer_draw, ..
            } => {
                if outcome.draw_declined && session.draw_offered_by() == Some(color.other()) {
                    session.decline_draw()?;
                }
                let stats = MoveStats {
                    input_tokens: outcome.usage.input_tokens,
                    output_tokens: outcome.usage.output_tokens,
                    attempts: outcome.attempts_used,
                };
                match session.submit_move(&san, Some(stats)) {
                    Ok(record) => {
                        if offer_draw && session.is_playing() {
                            session.offer_draw_from(color, true)?;
                        }
                        Ok(TurnOutcome::Moved(record))
                    }
                    Err(e) => forfeit(&mut session, color, e.to_string()),
                }
            }
        }
    }

    /// Plays agent turns until a human is to move, the game stops, or
    /// `max_plies` agent moves have been made. A cancelled turn ends the
    /// run quietly.
    pub async fn run_agent_turns(
        &self,
        max_plies: Option<usize>,
    ) -> ControllerResult<Vec<TurnOutcome>> {
        let mut outcomes = Vec::new();
        while self.is_agent_turn() {
            if max_plies.is_some_and(|max| outcomes.len() >= max) {
                break;
            }
            match self.play_agent_turn().await {
                Ok(outcome) => outcomes.push(outcome),
                Err(ControllerError::Acquisition(AcquisitionError::Cancelled)) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(outcomes)
    }
}

fn forfeit(
    session: &mut GameSession,
    color: Color,
    reason: String,
) -> ControllerResult<TurnOutcome> {
    warn!(session = %session.id(), %color, %reason, "agent forfeits");
    let result = session.resign(color)?;
    Ok(TurnOutcome::Forfeited { result, reason })
}

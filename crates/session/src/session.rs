//! The game session: one explicitly owned object holding the live position,
//! the move history and the result. Every command validates first and only
//! then mutates, so a rejected command leaves the session exactly as it was.

use std::fmt;

use chess_core::{
    BoardStatus, CapturedPieces, Color, Move, Piece, PieceKind, Position, board_status, in_check,
    legal_moves, legal_moves_from, legal_sans, move_to_san, parse_san,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    draw::{is_fifty_move_draw, is_insufficient_material, is_threefold_repetition},
    error::{SessionError, SessionResult},
    players::{GameMode, Players},
    result::{GameOverReason, GameResult},
    stats::{AgentTotals, MoveStats},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Playing,
    Paused,
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// One applied move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub san: String,
    pub mv: Move,
    pub color: Color,
    /// `None` for human moves.
    pub stats: Option<MoveStats>,
}

/// Validates `notation` against `position` and returns the resulting
/// position. Nothing else is touched.
pub fn try_move(position: &Position, notation: &str) -> SessionResult<Position> {
    let mv = resolve(position, notation)?;
    Ok(position.after(mv))
}

fn resolve(position: &Position, notation: &str) -> SessionResult<Move> {
    parse_san(position, notation).map_err(|e| SessionError::IllegalMove {
        notation: notation.trim().to_string(),
        reason: e.to_string(),
        legal: legal_sans(position),
    })
}

#[derive(Debug, Clone)]
pub struct GameSession {
    id: Uuid,
    state: SessionState,
    initial: Position,
    position: Position,
    history: Vec<MoveRecord>,
    /// Repetition keys of every position so far, the initial one included.
    seen: Vec<String>,
    result: Option<GameResult>,
    draw_offered_by: Option<Color>,
    viewing: Option<usize>,
    players: Players,
    mode: GameMode,
    playing_as: Color,
    started_at: Option<DateTime<Utc>>,
    totals: [AgentTotals; 2],
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// An idle session showing the initial position.
    pub fn new() -> Self {
        let position = Position::startpos();
        GameSession {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            seen: vec![position.repetition_key()],
            initial: position.clone(),
            position,
            history: Vec::new(),
            result: None,
            draw_offered_by: None,
            viewing: None,
            players: Players::default(),
            mode: GameMode::HumanVsHuman,
            playing_as: Color::White,
            started_at: None,
            totals: [AgentTotals::default(); 2],
        }
    }

    /// Starts a fresh game from the initial position. Allowed in any state;
    /// whatever was going on before is discarded.
    pub fn start_game(&mut self, players: Players, mode: GameMode, playing_as: Color) {
        self.reset(players, mode, playing_as, Position::startpos());
        info!(
            session = %self.id,
            ?mode,
            white = ?self.players.white,
            black = ?self.players.black,
            "game started"
        );
    }

    /// Like [`start_game`](Self::start_game) but from an arbitrary position,
    /// which must have exactly one king per side and must not leave the
    /// side that just moved in check.
    pub fn start_game_from(
        &mut self,
        players: Players,
        mode: GameMode,
        playing_as: Color,
        position: Position,
    ) -> SessionResult<()> {
        for color in [Color::White, Color::Black] {
            let kings = position.count(Piece::new(color, PieceKind::King));
            if kings != 1 {
                return Err(SessionError::InvalidStartPosition(format!(
                    "{color} has {kings} kings"
                )));
            }
        }
        if in_check(&position, position.side_to_move.other()) {
            return Err(SessionError::InvalidStartPosition(
                "the side not to move is in check".to_string(),
            ));
        }

        self.reset(players, mode, playing_as, position);
        info!(session = %self.id, fen = %self.position.to_fen(), "game started from position");
        // A handed-in position can already be over
        self.evaluate_terminal();
        Ok(())
    }

    fn reset(&mut self, players: Players, mode: GameMode, playing_as: Color, position: Position) {
        *self = GameSession {
            id: Uuid::new_v4(),
            state: SessionState::Playing,
            seen: vec![position.repetition_key()],
            initial: position.clone(),
            position,
            players,
            mode,
            playing_as,
            started_at: Some(Utc::now()),
            ..GameSession::new()
        };
    }

    fn ensure_not_finished(&self) -> SessionResult<()> {
        if self.state == SessionState::Finished {
            Err(SessionError::GameFinished)
        } else {
            Ok(())
        }
    }

    fn ensure_playing(&self) -> SessionResult<()> {
        match self.state {
            SessionState::Playing => Ok(()),
            SessionState::Finished => Err(SessionError::GameFinished),
            state => Err(SessionError::NotPlaying { state }),
        }
    }

    /// Validates and applies a move for the side to move. `stats` carries
    /// agent metadata and is `None` for human moves.
    ///
    /// Making a move lets a pending draw offer from the opponent lapse. An
    /// offer the mover made before moving stays open for the opponent.
    pub fn submit_move(
        &mut self,
        notation: &str,
        stats: Option<MoveStats>,
    ) -> SessionResult<MoveRecord> {
        self.ensure_playing()?;
        let mv = resolve(&self.position, notation)?;

        let color = self.position.side_to_move;
        let san = move_to_san(&self.position, mv);
        self.position.make_move(mv);
        self.seen.push(self.position.repetition_key());
        if let Some(s) = &stats {
            self.totals[color.idx()].record(s);
        }
        if self.draw_offered_by == Some(color.other()) {
            debug!(session = %self.id, "draw offer lapsed");
            self.draw_offered_by = None;
        }
        self.viewing = None;

        info!(session = %self.id, %color, %san, "move applied");
        let record = MoveRecord {
            san,
            mv,
            color,
            stats,
        };
        self.history.push(record.clone());
        self.evaluate_terminal();
        Ok(record)
    }

    /// Runs the terminal checks in order: mate and stalemate, then the
    /// material rule, repetition and the fifty-move rule.
    fn evaluate_terminal(&mut self) {
        let side = self.position.side_to_move;
        let result = match board_status(&self.position) {
            BoardStatus::Checkmate => {
                Some(GameResult::win(side.other(), GameOverReason::Checkmate))
            }
            BoardStatus::Stalemate => Some(GameResult::draw(GameOverReason::Stalemate)),
            BoardStatus::Check | BoardStatus::Ongoing => {
                if is_insufficient_material(&self.position) {
                    Some(GameResult::draw(GameOverReason::InsufficientMaterial))
                } else if is_threefold_repetition(&self.seen) {
                    Some(GameResult::draw(GameOverReason::ThreefoldRepetition))
                } else if is_fifty_move_draw(&self.position) {
                    Some(GameResult::draw(GameOverReason::FiftyMoveRule))
                } else {
                    None
                }
            }
        };
        if let Some(result) = result {
            self.finish(result);
        }
    }

    fn finish(&mut self, result: GameResult) {
        info!(session = %self.id, %result, moves = self.history.len(), "game over");
        self.result = Some(result);
        self.state = SessionState::Finished;
        self.draw_offered_by = None;
    }

    /// `color` resigns. Works from every state except Finished, including
    /// while an agent is thinking or the game is paused.
    pub fn resign(&mut self, color: Color) -> SessionResult<GameResult> {
        self.ensure_not_finished()?;
        let result = GameResult::win(color.other(), GameOverReason::Resignation);
        self.finish(result);
        Ok(result)
    }

    /// Sets or withdraws a draw offer on behalf of the side to move.
    pub fn offer_draw(&mut self, offered: bool) -> SessionResult<()> {
        let side = self.position.side_to_move;
        self.offer_draw_from(side, offered)
    }

    /// Sets or withdraws a draw offer made by `color`. Withdrawing only
    /// clears an offer `color` made itself.
    pub fn offer_draw_from(&mut self, color: Color, offered: bool) -> SessionResult<()> {
        self.ensure_not_finished()?;
        if self.state == SessionState::Idle {
            return Err(SessionError::NotPlaying { state: self.state });
        }
        if offered {
            debug!(session = %self.id, %color, "draw offered");
            self.draw_offered_by = Some(color);
        } else if self.draw_offered_by == Some(color) {
            self.draw_offered_by = None;
        }
        Ok(())
    }

    /// Accepts the pending offer and ends the game as a draw.
    pub fn accept_draw(&mut self) -> SessionResult<GameResult> {
        self.ensure_not_finished()?;
        if self.draw_offered_by.is_none() {
            return Err(SessionError::NoDrawOffer);
        }
        let result = GameResult::draw(GameOverReason::DrawAgreement);
        self.finish(result);
        Ok(result)
    }

    /// Turns down the pending offer.
    pub fn decline_draw(&mut self) -> SessionResult<()> {
        self.ensure_not_finished()?;
        if self.draw_offered_by.take().is_none() {
            return Err(SessionError::NoDrawOffer);
        }
        debug!(session = %self.id, "draw declined");
        Ok(())
    }

    pub fn pause(&mut self) -> SessionResult<()> {
        self.ensure_playing()?;
        self.state = SessionState::Paused;
        info!(session = %self.id, "paused");
        Ok(())
    }

    pub fn resume(&mut self) -> SessionResult<()> {
        match self.state {
            SessionState::Paused => {
                self.state = SessionState::Playing;
                info!(session = %self.id, "resumed");
                Ok(())
            }
            SessionState::Finished => Err(SessionError::GameFinished),
            state => Err(SessionError::NotPlaying { state }),
        }
    }

    /// Selects a read-only view of the position after the first `index`
    /// moves (`0` is the starting position) and returns it. `None` returns
    /// to the live position. The live game is never affected.
    pub fn view_history(&mut self, index: Option<usize>) -> SessionResult<Position> {
        match index {
            None => {
                self.viewing = None;
                Ok(self.position.clone())
            }
            Some(index) if index > self.history.len() => Err(SessionError::InvalidHistoryIndex {
                index,
                len: self.history.len(),
            }),
            Some(index) => {
                self.viewing = Some(index);
                Ok(self.replay(index))
            }
        }
    }

    fn replay(&self, plies: usize) -> Position {
        let mut pos = self.initial.clone();
        for record in &self.history[..plies] {
            pos.make_move(record.mv);
        }
        pos
    }

    /// The position to display: the history view if one is selected,
    /// otherwise the live position.
    pub fn displayed_position(&self) -> Position {
        match self.viewing {
            Some(i) => self.replay(i),
            None => self.position.clone(),
        }
    }

    /// Legal moves for the side to move; empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.state == SessionState::Finished {
            return Vec::new();
        }
        legal_moves(&self.position)
    }

    pub fn legal_sans(&self) -> Vec<String> {
        if self.state == SessionState::Finished {
            return Vec::new();
        }
        legal_sans(&self.position)
    }

    /// Legal moves of the piece on `from`, if it belongs to the side to move.
    pub fn legal_moves_from(&self, from: u8) -> Vec<Move> {
        match self.position.piece_at(from) {
            Some(pc)
                if pc.color == self.position.side_to_move
                    && self.state != SessionState::Finished =>
            {
                legal_moves_from(&self.position, from)
            }
            _ => Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
    pub fn state(&self) -> SessionState {
        self.state
    }
    pub fn is_playing(&self) -> bool {
        self.state == SessionState::Playing
    }
    pub fn position(&self) -> &Position {
        &self.position
    }
    pub fn initial_position(&self) -> &Position {
        &self.initial
    }
    pub fn turn(&self) -> Color {
        self.position.side_to_move
    }
    pub fn fen(&self) -> String {
        self.position.to_fen()
    }
    pub fn is_check(&self) -> bool {
        in_check(&self.position, self.position.side_to_move)
    }
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }
    /// Move list in SAN.
    pub fn sans(&self) -> Vec<&str> {
        self.history.iter().map(|r| r.san.as_str()).collect()
    }
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }
    pub fn draw_offered_by(&self) -> Option<Color> {
        self.draw_offered_by
    }
    pub fn viewing(&self) -> Option<usize> {
        self.viewing
    }
    pub fn players(&self) -> &Players {
        &self.players
    }
    pub fn mode(&self) -> GameMode {
        self.mode
    }
    pub fn playing_as(&self) -> Color {
        self.playing_as
    }
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }
    pub fn totals(&self, color: Color) -> AgentTotals {
        self.totals[color.idx()]
    }
    pub fn captured(&self) -> CapturedPieces {
        self.position.captured_pieces()
    }
    pub fn material_balance(&self) -> i32 {
        self.position.material_balance()
    }

    /// Headline for the finished game, `None` while it is still running.
    pub fn headline(&self) -> Option<String> {
        self.result
            .map(|r| r.headline(&self.players, self.mode, self.playing_as))
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;

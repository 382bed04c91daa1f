//! Plain-text views of a game.

use agent_play::TurnOutcome;
use chess_core::{Color, Piece, Position, sq};
use game_session::{GameSession, SessionState};

/// The board as seen by `perspective`, rank labels on the left.
pub fn board(pos: &Position, perspective: Color) -> String {
    let ranks: Vec<i8> = match perspective {
        Color::White => (0..8).rev().collect(),
        Color::Black => (0..8).collect(),
    };
    let files: Vec<i8> = match perspective {
        Color::White => (0..8).collect(),
        Color::Black => (0..8).rev().collect(),
    };

    let mut out = String::new();
    for &rank in &ranks {
        out.push_str(&format!("{} ", rank + 1));
        for &file in &files {
            let c = sq(file, rank)
                .and_then(|s| pos.piece_at(s))
                .map(|p| p.fen_char())
                .unwrap_or('.');
            out.push(' ');
            out.push(c);
        }
        out.push('\n');
    }
    out.push_str("  ");
    for &file in &files {
        out.push(' ');
        out.push((b'a' + file as u8) as char);
    }
    out
}

/// One line describing whose move it is and anything pending.
pub fn status_line(session: &GameSession) -> String {
    let mut line = match session.state() {
        SessionState::Idle => "no game running".to_string(),
        SessionState::Finished => match session.result() {
            Some(result) => format!("game over: {result}"),
            None => "game over".to_string(),
        },
        SessionState::Paused => format!("paused, {} to move", session.turn()),
        SessionState::Playing => {
            let turn = session.turn();
            let mut s = format!(
                "move {}, {} ({}) to move",
                session.position().fullmove_number,
                turn,
                session.players().display_name(turn)
            );
            if session.is_check() {
                s.push_str(", check");
            }
            s
        }
    };
    if let Some(by) = session.draw_offered_by() {
        line.push_str(&format!("; {by} offers a draw"));
    }
    if let Some(index) = session.viewing() {
        line.push_str(&format!("; viewing after move {index} of {}", session.history().len()));
    }
    let balance = session.material_balance();
    if balance != 0 {
        line.push_str(&format!("; material {balance:+}"));
    }
    line
}

/// Pieces each side has lost, e.g. `white lost: P P N`.
pub fn captured_line(session: &GameSession) -> String {
    let captured = session.captured();
    let list = |color: Color, kinds: &[chess_core::PieceKind]| {
        kinds
            .iter()
            .map(|&k| Piece::new(color, k).fen_char().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    };
    format!(
        "white lost: {} | black lost: {}",
        list(Color::White, &captured.white),
        list(Color::Black, &captured.black)
    )
}

pub fn outcome_line(outcome: &TurnOutcome) -> String {
    match outcome {
        TurnOutcome::Moved(record) => {
            let mut s = format!("{} plays {}", record.color, record.san);
            if let Some(stats) = record.stats {
                s.push_str(&format!(
                    " ({} attempt{}, {} tokens)",
                    stats.attempts,
                    if stats.attempts == 1 { "" } else { "s" },
                    stats.total_tokens()
                ));
            }
            s
        }
        TurnOutcome::Resigned(result) | TurnOutcome::DrawAgreed(result) => result.to_string(),
        TurnOutcome::Forfeited { result, reason } => format!("{result} ({reason})"),
    }
}

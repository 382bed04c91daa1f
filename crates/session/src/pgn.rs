//! PGN export. A projection of the session: no decisions are made here.

use chess_core::{Color, START_FEN};

use crate::session::GameSession;

/// Width movetext lines are wrapped at.
pub const PGN_LINE_WIDTH: usize = 80;

/// Tag values the session cannot know by itself.
#[derive(Debug, Clone)]
pub struct PgnHeader {
    pub event: String,
    pub site: String,
    pub round: String,
}

impl Default for PgnHeader {
    fn default() -> Self {
        PgnHeader {
            event: "Casual Game".to_string(),
            site: "?".to_string(),
            round: "-".to_string(),
        }
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renders the session as a PGN record: the seven-tag roster plus
/// `Termination`, `SetUp`/`FEN` for games that did not start from the
/// initial position, and the movetext ending in the result marker.
pub fn export_pgn(session: &GameSession, header: &PgnHeader) -> String {
    let players = session.players();
    let marker = session.result().map(|r| r.pgn_marker()).unwrap_or("*");
    let date = session
        .started_at()
        .map(|d| d.format("%Y.%m.%d").to_string())
        .unwrap_or_else(|| "????.??.??".to_string());
    let termination = session
        .result()
        .map(|r| r.reason.text())
        .unwrap_or("unterminated");

    let mut tags = vec![
        ("Event", header.event.clone()),
        ("Site", header.site.clone()),
        ("Date", date),
        ("Round", header.round.clone()),
        ("White", players.display_name(Color::White)),
        ("Black", players.display_name(Color::Black)),
        ("Result", marker.to_string()),
        ("Termination", termination.to_string()),
    ];
    let start_fen = session.initial_position().to_fen();
    if start_fen != START_FEN {
        tags.push(("SetUp", "1".to_string()));
        tags.push(("FEN", start_fen));
    }

    let mut out = String::new();
    for (name, value) in tags {
        out.push_str(&format!("[{} \"{}\"]\n", name, escape(&value)));
    }
    out.push('\n');
    out.push_str(&movetext(session, marker));
    out.push('\n');
    out
}

fn movetext(session: &GameSession, marker: &str) -> String {
    let initial = session.initial_position();
    let mut number = initial.fullmove_number;
    let mut tokens = Vec::with_capacity(session.history().len() * 3 / 2 + 1);

    for (i, record) in session.history().iter().enumerate() {
        match record.color {
            Color::White => tokens.push(format!("{number}.")),
            Color::Black if i == 0 => tokens.push(format!("{number}...")),
            Color::Black => {}
        }
        tokens.push(record.san.clone());
        if record.color == Color::Black {
            number += 1;
        }
    }
    tokens.push(marker.to_string());

    wrap(&tokens, PGN_LINE_WIDTH)
}

fn wrap(tokens: &[String], width: usize) -> String {
    let mut out = String::new();
    let mut line_len = 0;
    for tok in tokens {
        if line_len > 0 && line_len + 1 + tok.len() > width {
            out.push('\n');
            line_len = 0;
        } else if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(tok);
        line_len += tok.len();
    }
    out
}

#[cfg(test)]
#[path = "pgn_tests.rs"]
mod pgn_tests;

//! Prompt templates. Placeholders are written `{NAME}` and replaced
//! verbatim; unknown placeholders are left alone.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MOVE_PROMPT: &str = r##"You are a strong chess player. You will be given a chess position in FEN and the color you are playing. Choose the best move for that color.

Think about material, king safety, piece activity, pawn structure and any tactics (checks, captures, threats) before deciding.

Answer by calling the submit_move tool. If tools are unavailable, answer with exactly this JSON object:

{
  "move": "string",
  "offerDraw": boolean,
  "resign": boolean
}

Write the move in standard algebraic notation: piece letters K, Q, R, B, N (none for pawns), "x" for captures, "+" for check, "#" for mate, "O-O" and "O-O-O" for castling, "=Q" for promotion, and a file or rank after the piece letter when two pieces of the same kind can reach the square (Nbd2, R1e1).

Set offerDraw only in an objectively level or clearly drawn position. Set resign only when the position is hopeless. You may call inspect_position to get the list of legal moves.

FEN: {FEN}
TURN: {TURN}"##;

pub const DEFAULT_CORRECTION_PROMPT: &str = r#"Your previous suggestions for this position were not legal moves. Look at the position again, check that the piece you move exists, belongs to your color and can legally reach the target square without leaving your king in check, and pick a legal move.

Answer by calling the submit_move tool, or with the JSON object {"move": "...", "offerDraw": false, "resign": false}. Use standard algebraic notation.

FEN: {FEN}
TURN: {TURN}
PREVIOUS INVALID MOVES: {PREVIOUS_INVALID_MOVES}"#;

pub const DEFAULT_DRAW_OFFER_NOTICE: &str = r#"Your opponent has offered a draw. To accept, call submit_move with "acceptDraw": true. Any move you submit instead declines the offer."#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    /// First request of a turn. Placeholders: `{FEN}`, `{TURN}`.
    pub move_template: String,
    /// Requests after a rejected move. Adds `{PREVIOUS_INVALID_MOVES}`.
    pub correction_template: String,
    /// Appended while the opponent has a draw offer open.
    pub draw_offer_notice: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Prompts {
            move_template: DEFAULT_MOVE_PROMPT.to_string(),
            correction_template: DEFAULT_CORRECTION_PROMPT.to_string(),
            draw_offer_notice: DEFAULT_DRAW_OFFER_NOTICE.to_string(),
        }
    }
}

/// Replaces every `{KEY}` in `template` with its value.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

impl Prompts {
    pub fn move_prompt(&self, fen: &str, turn: &str) -> String {
        fill(&self.move_template, &[("FEN", fen), ("TURN", turn)])
    }

    /// `invalid` is rendered as a JSON array of strings.
    pub fn correction_prompt(&self, fen: &str, turn: &str, invalid: &[String]) -> String {
        let list = serde_json::to_string(invalid).unwrap_or_else(|_| "[]".to_string());
        fill(
            &self.correction_template,
            &[("FEN", fen), ("TURN", turn), ("PREVIOUS_INVALID_MOVES", &list)],
        )
    }
}

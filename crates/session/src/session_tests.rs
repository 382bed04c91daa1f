use super::*;
use crate::players::PlayerKind;

fn playing() -> GameSession {
    let mut s = GameSession::new();
    s.start_game(Players::default(), GameMode::HumanVsHuman, Color::White);
    s
}

fn play(s: &mut GameSession, moves: &[&str]) {
    for m in moves {
        s.submit_move(m, None).unwrap();
    }
}

#[test]
fn test_new_session_is_idle_and_rejects_moves() {
    let mut s = GameSession::new();
    assert_eq!(s.state(), SessionState::Idle);
    assert_eq!(
        s.submit_move("e4", None),
        Err(SessionError::NotPlaying {
            state: SessionState::Idle
        })
    );
    assert!(s.history().is_empty());
}

#[test]
fn test_start_game_resets_everything() {
    let mut s = playing();
    play(&mut s, &["e4", "e5"]);
    s.offer_draw(true).unwrap();
    let old_id = s.id();

    s.start_game(
        Players::human_vs_agent(Color::Black, "gpt-4.1"),
        GameMode::HumanVsAgent,
        Color::Black,
    );
    assert_ne!(s.id(), old_id);
    assert_eq!(s.state(), SessionState::Playing);
    assert_eq!(s.position(), &Position::startpos());
    assert!(s.history().is_empty());
    assert_eq!(s.draw_offered_by(), None);
    assert_eq!(s.playing_as(), Color::Black);
    assert!(s.players().white.is_agent());
}

#[test]
fn test_rejected_move_names_notation_and_lists_legal_moves() {
    let mut s = playing();
    let before = s.position().clone();

    match s.submit_move("Ke2", None) {
        Err(SessionError::IllegalMove {
            notation, legal, ..
        }) => {
            assert_eq!(notation, "Ke2");
            assert_eq!(legal.len(), 20);
            assert!(legal.contains(&"Nf3".to_string()));
        }
        other => panic!("expected illegal move, got {other:?}"),
    }
    assert_eq!(s.position(), &before);
    assert_eq!(s.turn(), Color::White);
    assert!(s.history().is_empty());
}

#[test]
fn test_accepted_move_records_san_and_stats() {
    let mut s = playing();
    let stats = MoveStats {
        input_tokens: 120,
        output_tokens: 30,
        attempts: 2,
    };
    let record = s.submit_move("Ng1f3", Some(stats)).unwrap();
    assert_eq!(record.san, "Nf3");
    assert_eq!(record.color, Color::White);
    assert_eq!(s.history()[0].stats, Some(stats));

    s.submit_move("e5", None).unwrap();
    let totals = s.totals(Color::White);
    assert_eq!(totals.moves, 1);
    assert_eq!(totals.total_tokens(), 150);
    assert_eq!(totals.attempts, 2);
    assert_eq!(s.totals(Color::Black), AgentTotals::default());
}

#[test]
fn test_pause_blocks_moves_until_resume() {
    let mut s = playing();
    s.pause().unwrap();
    assert_eq!(s.pause(), Err(SessionError::NotPlaying { state: SessionState::Paused }));
    assert!(matches!(
        s.submit_move("e4", None),
        Err(SessionError::NotPlaying { .. })
    ));
    assert_eq!(s.position(), &Position::startpos());

    s.resume().unwrap();
    assert_eq!(s.resume(), Err(SessionError::NotPlaying { state: SessionState::Playing }));
    s.submit_move("e4", None).unwrap();
}

#[test]
fn test_resign_works_while_paused() {
    let mut s = playing();
    play(&mut s, &["e4"]);
    s.pause().unwrap();
    let result = s.resign(Color::Black).unwrap();
    assert_eq!(result, GameResult::win(Color::White, GameOverReason::Resignation));
    assert_eq!(s.state(), SessionState::Finished);
}

#[test]
fn test_finished_session_rejects_commands() {
    let mut s = playing();
    s.resign(Color::White).unwrap();
    let snapshot = s.position().clone();

    assert_eq!(s.submit_move("e4", None), Err(SessionError::GameFinished));
    assert_eq!(s.resign(Color::Black), Err(SessionError::GameFinished));
    assert_eq!(s.offer_draw(true), Err(SessionError::GameFinished));
    assert_eq!(s.accept_draw(), Err(SessionError::GameFinished));
    assert_eq!(s.pause(), Err(SessionError::GameFinished));
    assert_eq!(s.result().map(|r| r.winner), Some(Some(Color::Black)));
    assert_eq!(s.position(), &snapshot);
    assert!(s.legal_moves().is_empty());
}

#[test]
fn test_draw_offer_accept() {
    let mut s = playing();
    assert_eq!(s.accept_draw(), Err(SessionError::NoDrawOffer));
    s.offer_draw(true).unwrap();
    assert_eq!(s.draw_offered_by(), Some(Color::White));
    let result = s.accept_draw().unwrap();
    assert_eq!(result.winner, None);
    assert_eq!(result.reason, GameOverReason::DrawAgreement);
    assert_eq!(s.headline().as_deref(), Some("Draw"));
}

#[test]
fn test_draw_offer_survives_own_move_and_lapses_on_reply() {
    let mut s = playing();
    s.offer_draw(true).unwrap();
    play(&mut s, &["e4"]);
    // Black may still accept
    assert_eq!(s.draw_offered_by(), Some(Color::White));
    play(&mut s, &["e5"]);
    assert_eq!(s.draw_offered_by(), None);
}

#[test]
fn test_decline_and_withdraw() {
    let mut s = playing();
    assert_eq!(s.decline_draw(), Err(SessionError::NoDrawOffer));
    s.offer_draw_from(Color::Black, true).unwrap();
    // White cannot withdraw black's offer
    s.offer_draw_from(Color::White, false).unwrap();
    assert_eq!(s.draw_offered_by(), Some(Color::Black));
    s.decline_draw().unwrap();
    assert_eq!(s.draw_offered_by(), None);
    assert_eq!(s.state(), SessionState::Playing);
}

#[test]
fn test_view_history_is_read_only() {
    let mut s = playing();
    play(&mut s, &["e4", "e5", "Nf3"]);
    let live = s.position().clone();

    let start = s.view_history(Some(0)).unwrap();
    assert_eq!(start, Position::startpos());
    let after_one = s.view_history(Some(1)).unwrap();
    assert_eq!(after_one.side_to_move, Color::Black);
    assert_eq!(s.displayed_position(), after_one);
    assert_eq!(s.viewing(), Some(1));

    assert_eq!(s.position(), &live);
    assert_eq!(s.turn(), Color::Black);
    assert_eq!(s.legal_moves().len(), legal_moves(&live).len());

    assert_eq!(
        s.view_history(Some(4)),
        Err(SessionError::InvalidHistoryIndex { index: 4, len: 3 })
    );
    assert_eq!(s.view_history(Some(3)).unwrap(), live);
    assert_eq!(s.view_history(None).unwrap(), live);
    assert_eq!(s.viewing(), None);
}

#[test]
fn test_move_clears_history_view() {
    let mut s = playing();
    play(&mut s, &["e4"]);
    s.view_history(Some(0)).unwrap();
    play(&mut s, &["c5"]);
    assert_eq!(s.viewing(), None);
}

#[test]
fn test_legal_moves_from_only_for_side_to_move() {
    let s = playing();
    let e2 = chess_core::coord_to_sq("e2").unwrap();
    let e7 = chess_core::coord_to_sq("e7").unwrap();
    assert_eq!(s.legal_moves_from(e2).len(), 2);
    assert!(s.legal_moves_from(e7).is_empty());
}

#[test]
fn test_try_move_is_pure() {
    let start = Position::startpos();
    let next = try_move(&start, "d4").unwrap();
    assert_eq!(next.side_to_move, Color::Black);
    assert_eq!(start, Position::startpos());

    let err = try_move(&start, "d5").unwrap_err();
    assert_eq!(err.notation(), Some("d5"));
}

#[test]
fn test_start_from_position_validates_kings() {
    let mut s = GameSession::new();
    let no_black_king = Position::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert!(matches!(
        s.start_game_from(Players::default(), GameMode::HumanVsHuman, Color::White, no_black_king),
        Err(SessionError::InvalidStartPosition(_))
    ));
    assert_eq!(s.state(), SessionState::Idle);

    let fine = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 0 1").unwrap();
    assert!(
        s.start_game_from(Players::default(), GameMode::HumanVsHuman, Color::White, fine)
            .is_ok()
    );

    // Black to be in check with white to move cannot arise in play
    let checked = Position::from_fen("4k2R/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert!(s
        .start_game_from(Players::default(), GameMode::HumanVsHuman, Color::White, checked)
        .is_err());
}

#[test]
fn test_headline_for_human_vs_agent() {
    let mut s = GameSession::new();
    s.start_game(
        Players::human_vs_agent(Color::White, "gpt-4.1-mini"),
        GameMode::HumanVsAgent,
        Color::White,
    );
    s.resign(Color::White).unwrap();
    assert_eq!(s.headline().as_deref(), Some("gpt-4.1-mini wins!"));

    s.start_game(
        Players::human_vs_agent(Color::White, "gpt-4.1-mini"),
        GameMode::HumanVsAgent,
        Color::White,
    );
    s.resign(Color::Black).unwrap();
    assert_eq!(s.headline().as_deref(), Some("You win!"));

    s.start_game(
        Players::new(PlayerKind::agent("a"), PlayerKind::Human),
        GameMode::HumanVsHuman,
        Color::White,
    );
    s.resign(Color::White).unwrap();
    assert_eq!(s.headline().as_deref(), Some("Black wins!"));
}

#[test]
fn test_results_and_players_serialize_for_transcripts() {
    let result = GameResult::draw(GameOverReason::FiftyMoveRule);
    assert_eq!(
        serde_json::to_value(result).unwrap(),
        serde_json::json!({ "winner": null, "reason": "fifty-move-rule" })
    );

    let players = Players::human_vs_agent(Color::Black, "gpt-4.1");
    assert_eq!(
        serde_json::to_value(&players).unwrap(),
        serde_json::json!({
            "white": { "type": "agent", "model": "gpt-4.1" },
            "black": { "type": "human" }
        })
    );
    let back: Players = serde_json::from_value(serde_json::to_value(&players).unwrap()).unwrap();
    assert_eq!(back, players);
}

use super::*;

fn at(c: &str) -> u8 {
    coord_to_sq(c).unwrap()
}

#[test]
fn test_knight_attacks() {
    let pos = Position::from_fen("8/8/8/8/4N3/8/8/k6K w - - 0 1").unwrap();
    let knight = pos.piece_at(at("e4")).unwrap();
    let hits: Vec<&str> = ["d6", "f6", "g5", "g3", "f2", "d2", "c3", "c5"].to_vec();
    for target in hits {
        assert!(attacks_square(&pos, at("e4"), knight, at(target)), "{target}");
    }
    assert!(!attacks_square(&pos, at("e4"), knight, at("e5")));
}

#[test]
fn test_pawn_attacks_are_diagonal_only() {
    let pos = Position::from_fen("k7/8/8/8/4p3/8/8/7K w - - 0 1").unwrap();
    assert!(is_attacked(&pos, at("d3"), Color::Black));
    assert!(is_attacked(&pos, at("f3"), Color::Black));
    assert!(!is_attacked(&pos, at("e3"), Color::Black));
    assert!(!is_attacked(&pos, at("d5"), Color::Black));
}

#[test]
fn test_sliders_need_clear_path() {
    // Rook on a1, own pawn on a4 blocks the file
    let pos = Position::from_fen("k7/8/8/8/P7/8/8/R6K w - - 0 1").unwrap();
    assert!(is_attacked(&pos, at("a3"), Color::White));
    assert!(is_attacked(&pos, at("a4"), Color::White));
    assert!(!is_attacked(&pos, at("a5"), Color::Black));
    assert!(!attacks_square(
        &pos,
        at("a1"),
        pos.piece_at(at("a1")).unwrap(),
        at("a6")
    ));
}

#[test]
fn test_queen_diagonal_and_file() {
    let pos = Position::from_fen("k7/8/8/8/3Q4/8/8/7K w - - 0 1").unwrap();
    assert!(is_attacked(&pos, at("h8"), Color::White));
    assert!(is_attacked(&pos, at("d8"), Color::White));
    assert!(!is_attacked(&pos, at("e6"), Color::White));
}

#[test]
fn test_attackers_lists_every_attacker() {
    let pos = Position::from_fen("k7/8/8/3r4/8/1b6/8/3K4 w - - 0 1").unwrap();
    let mut found = attackers(&pos, at("d1"), Color::Black);
    found.sort();
    assert_eq!(found, vec![at("b3"), at("d5")]);
}

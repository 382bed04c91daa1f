use crate::{
    attacks::{is_attacked, DIAGONALS, KING_OFFSETS, KNIGHT_OFFSETS, ORTHOGONALS},
    board::{CastleSide, Position},
    types::*,
};

/// Legal moves of the piece standing on `from`.
///
/// The piece's own color is used, not the side to move; callers match
/// turns themselves. An empty square yields no moves. No returned move
/// leaves the mover's king attacked.
pub fn legal_moves_from(pos: &Position, from: u8) -> Vec<Move> {
    let mut out = Vec::with_capacity(28);
    pseudo_moves_from(pos, from, &mut out);
    out.retain(|&mv| leaves_king_safe(pos, mv));
    out
}

/// All legal moves for the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut out = Vec::with_capacity(64);
    legal_moves_into(pos, &mut out);
    out
}

/// Generate all legal moves for the side to move into the provided buffer,
/// reusing it across calls.
pub fn legal_moves_into(pos: &Position, out: &mut Vec<Move>) {
    out.clear();
    for (from, _) in pos.pieces(pos.side_to_move) {
        pseudo_moves_from(pos, from, out);
    }
    out.retain(|&mv| leaves_king_safe(pos, mv));
}

/// Simulates `mv` on a scratch copy and reports whether the mover's king is
/// safe afterwards. Positions without a king for the mover are treated as
/// safe.
pub fn leaves_king_safe(pos: &Position, mv: Move) -> bool {
    let mover = mv.piece.color;
    let scratch = pos.after(mv);
    match scratch.king_sq(mover) {
        Some(k) => !is_attacked(&scratch, k, mover.other()),
        None => true,
    }
}

/// Movement-pattern moves for the piece on `from`, appended to `out`.
pub fn pseudo_moves_from(pos: &Position, from: u8, out: &mut Vec<Move>) {
    let pc = match pos.piece_at(from) {
        Some(p) => p,
        None => return,
    };
    match pc.kind {
        PieceKind::Pawn => gen_pawn(pos, from, pc, out),
        PieceKind::Knight => gen_steps(pos, from, pc, &KNIGHT_OFFSETS, out),
        PieceKind::Bishop => gen_slider(pos, from, pc, &DIAGONALS, out),
        PieceKind::Rook => gen_slider(pos, from, pc, &ORTHOGONALS, out),
        PieceKind::Queen => {
            gen_slider(pos, from, pc, &DIAGONALS, out);
            gen_slider(pos, from, pc, &ORTHOGONALS, out);
        }
        PieceKind::King => {
            gen_steps(pos, from, pc, &KING_OFFSETS, out);
            gen_castle(pos, from, pc, out);
        }
    }
}

fn push_pawn_move(from: u8, to: u8, pc: Piece, out: &mut Vec<Move>) {
    let promo_rank = pc.color.other().home_rank();
    if rank_of(to) == promo_rank {
        for pk in PieceKind::PROMOTIONS {
            out.push(Move::new(from, to, pc).with_promo(pk));
        }
    } else {
        out.push(Move::new(from, to, pc));
    }
}

fn gen_pawn(pos: &Position, from: u8, pc: Piece, out: &mut Vec<Move>) {
    let f = file_of(from);
    let r = rank_of(from);
    let dir = pc.color.pawn_dir();
    let start_rank = pc.color.home_rank() + dir;

    // forward 1
    if let Some(to) = sq(f, r + dir) {
        if pos.piece_at(to).is_none() {
            push_pawn_move(from, to, pc, out);

            // forward 2 from start, both squares empty
            if r == start_rank {
                if let Some(to2) = sq(f, r + 2 * dir) {
                    if pos.piece_at(to2).is_none() {
                        out.push(Move::new(from, to2, pc));
                    }
                }
            }
        }
    }

    // captures + en-passant
    for df in [-1, 1] {
        let to = match sq(f + df, r + dir) {
            Some(to) => to,
            None => continue,
        };
        match pos.piece_at(to) {
            Some(tpc) if tpc.color != pc.color => push_pawn_move(from, to, pc, out),
            Some(_) => {}
            None if pos.en_passant == Some(to) => {
                // The passed pawn sits beside us, not on the target square.
                let victim_sq = sq(f + df, r);
                let victim = victim_sq.and_then(|s| pos.piece_at(s));
                if let (Some(vs), Some(v)) = (victim_sq, victim) {
                    if v.kind == PieceKind::Pawn && v.color != pc.color {
                        let mut mv = Move::new(from, to, pc);
                        mv.is_en_passant = true;
                        mv.affected = Some(Relocation { from: vs, to: None });
                        out.push(mv);
                    }
                }
            }
            None => {}
        }
    }
}

fn gen_steps(pos: &Position, from: u8, pc: Piece, deltas: &[(i8, i8)], out: &mut Vec<Move>) {
    let f = file_of(from);
    let r = rank_of(from);
    for (df, dr) in deltas {
        if let Some(to) = sq(f + df, r + dr) {
            match pos.piece_at(to) {
                None => out.push(Move::new(from, to, pc)),
                Some(other) if other.color != pc.color => out.push(Move::new(from, to, pc)),
                _ => {}
            }
        }
    }
}

fn gen_slider(pos: &Position, from: u8, pc: Piece, dirs: &[(i8, i8)], out: &mut Vec<Move>) {
    let f0 = file_of(from);
    let r0 = rank_of(from);
    for (df, dr) in dirs {
        let mut f = f0 + df;
        let mut r = r0 + dr;
        while let Some(to) = sq(f, r) {
            match pos.piece_at(to) {
                None => out.push(Move::new(from, to, pc)),
                Some(other) if other.color != pc.color => {
                    out.push(Move::new(from, to, pc));
                    break;
                }
                _ => break,
            }
            f += df;
            r += dr;
        }
    }
}

fn gen_castle(pos: &Position, from: u8, king: Piece, out: &mut Vec<Move>) {
    let c = king.color;
    let rank = c.home_rank();
    // Must be on the original king square
    if sq(4, rank) != Some(from) {
        return;
    }
    let enemy = c.other();
    // Can't castle out of check
    if is_attacked(pos, from, enemy) {
        return;
    }

    for side in [CastleSide::King, CastleSide::Queen] {
        if !pos.castling.has(c, side) {
            continue;
        }
        let rook_from = side.rook_home(c);
        if pos.piece_at(rook_from) != Some(Piece::new(c, PieceKind::Rook)) {
            continue;
        }
        // Squares that must be empty, and the ones the king crosses or lands on.
        let (between, transit): (&[i8], &[i8]) = match side {
            CastleSide::King => (&[5, 6], &[5, 6]),
            CastleSide::Queen => (&[1, 2, 3], &[3, 2]),
        };
        let empty = between
            .iter()
            .filter_map(|&file| sq(file, rank))
            .all(|s| pos.piece_at(s).is_none());
        if !empty {
            continue;
        }
        let safe = transit
            .iter()
            .filter_map(|&file| sq(file, rank))
            .all(|s| !is_attacked(pos, s, enemy));
        if !safe {
            continue;
        }
        let (king_to, rook_to) = side.targets(c);
        let mut mv = Move::new(from, king_to, king);
        mv.is_castle = true;
        mv.affected = Some(Relocation {
            from: rook_from,
            to: Some(rook_to),
        });
        out.push(mv);
    }
}

#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;

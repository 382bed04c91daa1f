use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub wk: bool,
    pub wq: bool,
    pub bk: bool,
    pub bq: bool,
}

/// Which wing a castling move goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        wk: true,
        wq: true,
        bk: true,
        bq: true,
    };
    pub const NONE: CastlingRights = CastlingRights {
        wk: false,
        wq: false,
        bk: false,
        bq: false,
    };

    pub fn has(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::King) => self.wk,
            (Color::White, CastleSide::Queen) => self.wq,
            (Color::Black, CastleSide::King) => self.bk,
            (Color::Black, CastleSide::Queen) => self.bq,
        }
    }

    /// Clears one right. Rights are never set again after a clear.
    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        match (color, side) {
            (Color::White, CastleSide::King) => self.wk = false,
            (Color::White, CastleSide::Queen) => self.wq = false,
            (Color::Black, CastleSide::King) => self.bk = false,
            (Color::Black, CastleSide::Queen) => self.bq = false,
        }
    }

    pub fn revoke_all(&mut self, color: Color) {
        self.revoke(color, CastleSide::King);
        self.revoke(color, CastleSide::Queen);
    }

    /// True if `self` holds no right that `earlier` had already lost.
    pub fn is_subset_of(&self, earlier: &CastlingRights) -> bool {
        (!self.wk || earlier.wk)
            && (!self.wq || earlier.wq)
            && (!self.bk || earlier.bk)
            && (!self.bq || earlier.bq)
    }
}

impl CastleSide {
    /// Home square of the rook guarding this wing.
    pub fn rook_home(self, color: Color) -> u8 {
        let file = match self {
            CastleSide::King => 7,
            CastleSide::Queen => 0,
        };
        sq(file, color.home_rank()).unwrap_or(0)
    }

    /// (king destination, rook destination)
    pub fn targets(self, color: Color) -> (u8, u8) {
        let rank = color.home_rank();
        let (k, r) = match self {
            CastleSide::King => (6, 5),
            CastleSide::Queen => (2, 3),
        };
        (sq(k, rank).unwrap_or(0), sq(r, rank).unwrap_or(0))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub board: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<u8>, // square behind a pawn that just advanced 2
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    /// Board with no pieces, white to move and no rights.
    pub fn empty() -> Self {
        Position {
            board: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn startpos() -> Self {
        let mut p = Position {
            castling: CastlingRights::ALL,
            ..Position::empty()
        };

        // Pawns
        for f in 0..8 {
            p.board[8 + f] = Some(Piece::new(Color::White, PieceKind::Pawn));
            p.board[48 + f] = Some(Piece::new(Color::Black, PieceKind::Pawn));
        }
        // Back ranks
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (f, &kind) in back.iter().enumerate() {
            p.board[f] = Some(Piece::new(Color::White, kind));
            p.board[56 + f] = Some(Piece::new(Color::Black, kind));
        }
        p
    }

    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        self.board[sq as usize]
    }
    pub fn set_piece(&mut self, sq: u8, pc: Option<Piece>) {
        self.board[sq as usize] = pc;
    }

    pub fn king_sq(&self, c: Color) -> Option<u8> {
        self.pieces(c)
            .find(|(_, pc)| pc.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// All occupied squares holding a piece of color `c`, a1 first.
    pub fn pieces(&self, c: Color) -> impl Iterator<Item = (u8, Piece)> + '_ {
        self.board
            .iter()
            .enumerate()
            .filter_map(move |(i, pc)| match pc {
                Some(p) if p.color == c => Some((i as u8, *p)),
                _ => None,
            })
    }

    pub fn count(&self, piece: Piece) -> usize {
        self.pieces(piece.color).filter(|(_, p)| *p == piece).count()
    }

    /// Plays a move without any legality check. The move must come from the
    /// move generator (or describe a piece actually standing on `from`);
    /// moves from an empty square leave the position untouched.
    pub fn make_move(&mut self, mv: Move) {
        let from = mv.from;
        let to = mv.to;
        let moved = match self.piece_at(from) {
            Some(pc) => pc,
            None => return,
        };
        let mut captured = self.piece_at(to);

        self.en_passant = None;

        // Halfmove clock reset on capture or pawn move
        let mut reset_hmc = moved.kind == PieceKind::Pawn || captured.is_some();

        if mv.is_en_passant {
            if let Some(cs) = sq(file_of(to), rank_of(from)) {
                captured = self.piece_at(cs);
                self.set_piece(cs, None);
                reset_hmc = true;
            }
        }

        self.set_piece(from, None);
        let placed = match mv.promo {
            Some(kind) if moved.kind == PieceKind::Pawn => Piece::new(moved.color, kind),
            _ => moved,
        };
        self.set_piece(to, Some(placed));

        if mv.is_castle && moved.kind == PieceKind::King {
            if let Some(rel) = mv.affected {
                let rook = self.piece_at(rel.from);
                self.set_piece(rel.from, None);
                if let Some(rt) = rel.to {
                    self.set_piece(rt, rook);
                }
            }
        }

        // Rights go when the king or a home rook moves, or a home rook is captured
        if moved.kind == PieceKind::King {
            self.castling.revoke_all(moved.color);
        }
        for side in [CastleSide::King, CastleSide::Queen] {
            if moved.kind == PieceKind::Rook && from == side.rook_home(moved.color) {
                self.castling.revoke(moved.color, side);
            }
            if let Some(cp) = captured {
                if cp.kind == PieceKind::Rook && to == side.rook_home(cp.color) {
                    self.castling.revoke(cp.color, side);
                }
            }
        }

        // Double pawn push sets en-passant square
        if moved.kind == PieceKind::Pawn && (rank_of(to) - rank_of(from)).abs() == 2 {
            self.en_passant = sq(file_of(from), (rank_of(from) + rank_of(to)) / 2);
        }

        self.halfmove_clock = if reset_hmc {
            0
        } else {
            self.halfmove_clock + 1
        };

        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.other();
    }

    /// Copy of the position with `mv` applied.
    pub fn after(&self, mv: Move) -> Position {
        let mut next = self.clone();
        next.make_move(mv);
        next
    }

    /// Identity used for repetition counting: placement, side to move,
    /// castling rights and en-passant target (the first four FEN fields).
    /// The en-passant target only counts while a legal capture onto it exists.
    pub fn repetition_key(&self) -> String {
        let mut key = self.clone();
        if key.en_passant.is_some()
            && !crate::movegen::legal_moves(self)
                .iter()
                .any(|mv| mv.is_en_passant)
        {
            key.en_passant = None;
        }
        let fen = key.to_fen();
        fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
    }

    /// Pieces of each color missing relative to the initial set, most
    /// valuable first. Promotions can make a count go negative; those are
    /// clamped to zero.
    pub fn captured_pieces(&self) -> CapturedPieces {
        let start = [
            (PieceKind::Queen, 1),
            (PieceKind::Rook, 2),
            (PieceKind::Bishop, 2),
            (PieceKind::Knight, 2),
            (PieceKind::Pawn, 8),
        ];
        let mut out = CapturedPieces::default();
        for color in [Color::White, Color::Black] {
            let list = match color {
                Color::White => &mut out.white,
                Color::Black => &mut out.black,
            };
            for (kind, n) in start {
                let missing = n - self.count(Piece::new(color, kind)).min(n);
                list.extend(std::iter::repeat(kind).take(missing));
            }
        }
        out
    }

    /// Material balance in pawns from white's point of view.
    pub fn material_balance(&self) -> i32 {
        let side = |c| -> i32 { self.pieces(c).map(|(_, p)| p.kind.value()).sum() };
        side(Color::White) - side(Color::Black)
    }
}

/// Pieces lost by each side, as reported next to the board.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapturedPieces {
    pub white: Vec<PieceKind>,
    pub black: Vec<PieceKind>,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = sq(file, rank)
                    .and_then(|s| self.piece_at(s))
                    .map(|p| p.fen_char())
                    .unwrap_or('.');
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later

use crate::bitboard::*;
use crate::material::MaterialSource;
use crate::types::*;

pub mod zobrist {
    use crate::misc;
    use crate::types::*;

    use lazy_static::lazy_static;

    lazy_static! {
        // One key per (piece, index) pair. For material hashing the index
        // is the running count of that piece, not a square.
        static ref PSQ: [[Key; 64]; 16] = {
            let mut rng = misc::Prng::new(1070372);
            let mut psq = [[Key(0); 64]; 16];
            for (i, keys) in psq.iter_mut().enumerate() {
                if i != 0 && i != 7 && i != 8 && i != 15 {
                    for k in keys.iter_mut() {
                        *k = Key(rng.rand64());
                    }
                }
            }
            psq
        };
    }

    pub fn material(pc: Piece, num: i32) -> Key {
        PSQ[pc.0 as usize][num as usize]
    }

    pub fn init() {
        lazy_static::initialize(&PSQ);
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("empty FEN string")]
    Empty,

    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),

    #[error("expected 8 ranks in piece placement, found {0}")]
    RankCount(usize),

    #[error("rank {0} does not describe exactly 8 squares")]
    BadRank(u32),

    #[error("invalid side to move '{0}'")]
    InvalidSideToMove(String),

    #[error("{0} must have exactly one king")]
    KingCount(&'static str),

    #[error("pawn on a back rank at {0}")]
    PawnOnBackRank(Square),
}

/// Piece placement plus the material bookkeeping the evaluator reads. There
/// is no move making here: a position is set up once from a FEN string.
#[derive(Clone)]
pub struct Position {
    board: [Piece; 64],
    by_color_bb: [Bitboard; 2],
    by_type_bb: [Bitboard; 8],
    piece_count: [i32; 16],
    side_to_move: Color,
    material_key: Key,
    non_pawn_material: [Value; 2],
}

impl Position {
    pub const PIECE_TO_CHAR: &'static str = " PNBRQK  pnbrqk";

    fn empty_board() -> Position {
        Position {
            board: [NO_PIECE; 64],
            by_color_bb: [Bitboard(0); 2],
            by_type_bb: [Bitboard(0); 8],
            piece_count: [0; 16],
            side_to_move: WHITE,
            material_key: Key(0),
            non_pawn_material: [Value::ZERO; 2],
        }
    }

    // from_fen() reads the piece placement and the side to move. Castling,
    // en passant and move counters are accepted but ignored since nothing
    // here depends on them.
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(FenError::Empty)?;

        let mut pos = Position::empty_board();

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankCount(ranks.len()));
        }

        for (i, row) in ranks.iter().enumerate() {
            let r = RANK_8 - i as Rank;
            let mut f: File = 0;
            for ch in row.chars() {
                if let Some(d) = ch.to_digit(10) {
                    f += d;
                } else {
                    let idx = Position::PIECE_TO_CHAR.find(ch)
                        .filter(|_| ch != ' ')
                        .ok_or(FenError::InvalidPiece(ch))?;
                    if f >= 8 {
                        return Err(FenError::BadRank(r + 1));
                    }
                    pos.put_piece(Piece(idx as u32), Square::make(f, r));
                    f += 1;
                }
                if f > 8 {
                    return Err(FenError::BadRank(r + 1));
                }
            }
            if f != 8 {
                return Err(FenError::BadRank(r + 1));
            }
        }

        pos.side_to_move = match fields.next() {
            None | Some("w") => WHITE,
            Some("b") => BLACK,
            Some(s) => return Err(FenError::InvalidSideToMove(s.to_string())),
        };

        if pos.count(WHITE, KING) != 1 {
            return Err(FenError::KingCount("white"));
        }
        if pos.count(BLACK, KING) != 1 {
            return Err(FenError::KingCount("black"));
        }
        if let Some(s) = (pos.pieces_p(PAWN) & (rank_bb(RANK_1) | rank_bb(RANK_8))).next() {
            return Err(FenError::PawnOnBackRank(s));
        }

        pos.set_state();
        Ok(pos)
    }

    fn put_piece(&mut self, pc: Piece, s: Square) {
        self.board[s.0 as usize] = pc;
        self.by_type_bb[ALL_PIECES.0 as usize] |= s;
        self.by_type_bb[pc.piece_type().0 as usize] |= s;
        self.by_color_bb[pc.color().idx()] |= s;
        self.piece_count[pc.0 as usize] += 1;
    }

    // set_state() derives the material key and non-pawn material from the
    // piece counts. Both depend on nothing but the counts.
    fn set_state(&mut self) {
        self.material_key = Key(0);
        self.non_pawn_material = [Value::ZERO; 2];

        for &c in COLORS.iter() {
            for pt in KNIGHT.0..KING.0 {
                self.non_pawn_material[c.idx()] +=
                    self.count(c, PieceType(pt)) * piece_value(MG, PieceType(pt));
            }

            for pt in PAWN.0..=KING.0 {
                let pc = Piece::make(c, PieceType(pt));
                for cnt in 0..self.count(c, PieceType(pt)) {
                    self.material_key ^= zobrist::material(pc, cnt);
                }
            }
        }
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn piece_on(&self, s: Square) -> Piece {
        self.board[s.0 as usize]
    }

    pub fn pieces(&self) -> Bitboard {
        self.by_type_bb[ALL_PIECES.0 as usize]
    }

    pub fn pieces_c(&self, c: Color) -> Bitboard {
        self.by_color_bb[c.idx()]
    }

    pub fn pieces_p(&self, pt: PieceType) -> Bitboard {
        self.by_type_bb[pt.0 as usize]
    }

    pub fn pieces_pp(&self, pt1: PieceType, pt2: PieceType) -> Bitboard {
        self.pieces_p(pt1) | self.pieces_p(pt2)
    }

    pub fn pieces_cp(&self, c: Color, pt: PieceType) -> Bitboard {
        self.pieces_c(c) & self.pieces_p(pt)
    }

    pub fn count(&self, c: Color, pt: PieceType) -> i32 {
        self.piece_count[Piece::make(c, pt).0 as usize]
    }

    pub fn square(&self, c: Color, pt: PieceType) -> Square {
        debug_assert!(self.count(c, pt) == 1);
        lsb(self.pieces_cp(c, pt))
    }

    pub fn material_key(&self) -> Key {
        self.material_key
    }

    pub fn non_pawn_material_c(&self, c: Color) -> Value {
        self.non_pawn_material[c.idx()]
    }

    pub fn non_pawn_material(&self) -> Value {
        self.non_pawn_material_c(WHITE) + self.non_pawn_material_c(BLACK)
    }

    pub fn attacks_from(&self, pt: PieceType, s: Square) -> Bitboard {
        attacks_bb(pt, s, self.pieces())
    }

    pub fn attacks_from_pawn(&self, s: Square, c: Color) -> Bitboard {
        pawn_attacks(c, s)
    }

    // attackers_to_occ() computes a bitboard of all pieces which attack a
    // given square. Slider attacks use the occupied bitboard to indicate
    // occupancy.
    pub fn attackers_to_occ(&self, s: Square, occupied: Bitboard) -> Bitboard {
          (pawn_attacks(BLACK, s) & self.pieces_cp(WHITE, PAWN))
        | (pawn_attacks(WHITE, s) & self.pieces_cp(BLACK, PAWN))
        | (pseudo_attacks(KNIGHT, s) & self.pieces_p(KNIGHT))
        | (attacks_bb(ROOK, s, occupied) & self.pieces_pp(ROOK, QUEEN))
        | (attacks_bb(BISHOP, s, occupied) & self.pieces_pp(BISHOP, QUEEN))
        | (pseudo_attacks(KING, s) & self.pieces_p(KING))
    }

    pub fn attackers_to(&self, s: Square) -> Bitboard {
        self.attackers_to_occ(s, self.pieces())
    }

    pub fn checkers(&self) -> Bitboard {
        let us = self.side_to_move;
        self.attackers_to(self.square(us, KING)) & self.pieces_c(!us)
    }
}

impl MaterialSource for Position {
    fn material_key(&self) -> Key {
        self.material_key
    }

    fn non_pawn_material_c(&self, c: Color) -> Value {
        self.non_pawn_material[c.idx()]
    }

    fn count(&self, c: Color, pt: PieceType) -> i32 {
        self.piece_count[Piece::make(c, pt).0 as usize]
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later

use crate::bitbases;
use crate::bitboard::*;
use crate::position::Position;
use crate::types::*;

use lazy_static::lazy_static;
use log::debug;

pub type EvalFn = fn(&Position, Color) -> Value;
pub type ScaleFn = fn(&Position, Color) -> ScaleFactor;

/// Material signatures with a hand-written specialist. Each of them covers
/// more than one material key, so they are recognised by `matches()` rather
/// than by key lookup.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Signature {
    /// King and plenty of material vs lone king
    KXK,
    /// King, bishop and pawns vs king (and possibly pawns)
    KBPsK,
    /// King and queen vs king, rook and pawns
    KQKRPs,
    /// King and pawns vs lone king
    KPsK,
    /// King and pawn vs king and pawn
    KPKP,
}

impl Signature {
    pub const ALL: [Signature; 5] = [
        Signature::KXK,
        Signature::KBPsK,
        Signature::KQKRPs,
        Signature::KPsK,
        Signature::KPKP,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Signature::KXK => "KXK",
            Signature::KBPsK => "KBPsK",
            Signature::KQKRPs => "KQKRPs",
            Signature::KPsK => "KPsK",
            Signature::KPKP => "KPKP",
        }
    }

    // matches() tells whether the material distribution of pos, with
    // strong_side as the stronger side, is one this signature's specialist
    // is valid for.
    pub fn matches(self, pos: &Position, strong_side: Color) -> bool {
        let weak_side = !strong_side;

        match self {
            Signature::KXK => {
                !more_than_one(pos.pieces_c(weak_side))
                && pos.non_pawn_material_c(strong_side) >= RookValueMg
            }
            Signature::KBPsK => {
                pos.non_pawn_material_c(strong_side) == BishopValueMg
                && pos.count(strong_side, BISHOP) == 1
                && pos.count(strong_side, PAWN) >= 1
            }
            Signature::KQKRPs => {
                pos.count(strong_side, PAWN) == 0
                && pos.non_pawn_material_c(strong_side) == QueenValueMg
                && pos.count(strong_side, QUEEN) == 1
                && pos.count(weak_side, ROOK) == 1
                && pos.count(weak_side, PAWN) >= 1
            }
            Signature::KPsK => {
                pos.non_pawn_material() == Value::ZERO
                && pos.count(strong_side, PAWN) >= 2
                && pos.count(weak_side, PAWN) == 0
            }
            Signature::KPKP => {
                pos.non_pawn_material() == Value::ZERO
                && pos.count(strong_side, PAWN) == 1
                && pos.count(weak_side, PAWN) == 1
            }
        }
    }

    fn func(self) -> EndgameFn {
        match self {
            Signature::KXK => EndgameFn::Evaluate(evaluate_kxk),
            Signature::KBPsK => EndgameFn::Scale(scale_kbpsk),
            Signature::KQKRPs => EndgameFn::Scale(scale_kqkrps),
            Signature::KPsK => EndgameFn::Scale(scale_kpsk),
            Signature::KPKP => EndgameFn::Scale(scale_kpkp),
        }
    }
}

#[derive(Clone, Copy)]
pub enum EndgameFn {
    Evaluate(EvalFn),
    Scale(ScaleFn),
}

/// A specialist bound to one signature and one strong side.
#[derive(Clone, Copy)]
pub struct Specialist {
    signature: Signature,
    strong_side: Color,
    func: EndgameFn,
}

impl Specialist {
    fn new(signature: Signature, strong_side: Color) -> Specialist {
        Specialist { signature, strong_side, func: signature.func() }
    }

    pub fn signature(&self) -> Signature {
        self.signature
    }

    pub fn strong_side(&self) -> Color {
        self.strong_side
    }

    pub fn is_evaluator(&self) -> bool {
        matches!(self.func, EndgameFn::Evaluate(_))
    }

    /// Exact score from the side to move's point of view, or None if this
    /// specialist only scales.
    pub fn evaluate(&self, pos: &Position) -> Option<Value> {
        match self.func {
            EndgameFn::Evaluate(f) => Some(f(pos, self.strong_side)),
            EndgameFn::Scale(_) => None,
        }
    }

    /// Scale factor for the strong side, or None if this specialist
    /// evaluates. ScaleFactor::NONE means the position is not recognised.
    pub fn scale(&self, pos: &Position) -> Option<ScaleFactor> {
        match self.func {
            EndgameFn::Scale(f) => Some(f(pos, self.strong_side)),
            EndgameFn::Evaluate(_) => None,
        }
    }
}

/// Two specialists per signature, one for each possible strong side.
pub struct Endgames {
    table: [[Specialist; 2]; 5],
}

impl Endgames {
    fn new() -> Endgames {
        let pair = |sig| [Specialist::new(sig, WHITE), Specialist::new(sig, BLACK)];
        let table = Signature::ALL.map(pair);
        debug!("endgame registry: {} signatures", table.len());
        Endgames { table }
    }

    pub fn get(&self, signature: Signature, strong_side: Color) -> &Specialist {
        &self.table[signature as usize][strong_side.idx()]
    }

    pub fn pair(&self, signature: Signature) -> &[Specialist; 2] {
        &self.table[signature as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Specialist> {
        self.table.iter().flat_map(|p| p.iter())
    }
}

lazy_static! {
    static ref ENDGAMES: Endgames = Endgames::new();
}

pub fn endgames() -> &'static Endgames {
    &ENDGAMES
}

/// Forces construction of the registry and the KPK bitbase behind it.
pub fn init() {
    lazy_static::initialize(&ENDGAMES);
    bitbases::init();
}

// Table used to drive the king towards the edge of the board
// in KX vs K endgames.
const PUSH_TO_EDGES: [i32; 64] = [
    100, 90, 80, 70, 70, 80, 90, 100,
     90, 70, 60, 50, 50, 60, 70,  90,
     80, 60, 40, 30, 30, 40, 60,  80,
     70, 50, 30, 20, 20, 30, 50,  70,
     70, 50, 30, 20, 20, 30, 50,  70,
     80, 60, 40, 30, 30, 40, 60,  80,
     90, 70, 60, 50, 50, 60, 70,  90,
    100, 90, 80, 70, 70, 80, 90, 100,
];

// Drives the attacking king towards the defending one.
const PUSH_CLOSE: [i32; 8] = [0, 0, 100, 80, 60, 40, 20, 10];

fn verify_material(pos: &Position, c: Color, npm: Value, pawns_cnt: i32) -> bool {
    pos.non_pawn_material_c(c) == npm && pos.count(c, PAWN) == pawns_cnt
}

// Map the square as if strong_side is white and strong_side's only pawn
// is on the left half of the board.
fn normalize(pos: &Position, strong_side: Color, mut sq: Square) -> Square {
    debug_assert!(pos.count(strong_side, PAWN) == 1);

    if pos.square(strong_side, PAWN).file() >= FILE_E {
        sq = Square(sq.0 ^ 7); // Mirror H1 -> A1
    }

    if strong_side == BLACK {
        sq = !sq;
    }

    sq
}

// A lone king not in check with nowhere to go
fn lone_king_stalemated(pos: &Position, c: Color) -> bool {
    let ksq = pos.square(c, KING);
    let occupied = pos.pieces() ^ ksq;

    if pos.attackers_to(ksq) & pos.pieces_c(!c) != 0 {
        return false;
    }

    pseudo_attacks(KING, ksq)
        .all(|s| pos.attackers_to_occ(s, occupied) & pos.pieces_c(!c) != 0)
}

// Mate with KX vs K. This function is used to evaluate positions with king
// and plenty of material vs a lone king. It simply gives the attacking side
// a bonus for driving the defending king towards the edge of the board
// and for keeping the distance between the two kings small.
pub fn evaluate_kxk(pos: &Position, strong_side: Color) -> Value {
    let weak_side = !strong_side;

    debug_assert!(verify_material(pos, weak_side, Value::ZERO, 0));

    if pos.side_to_move() == weak_side && lone_king_stalemated(pos, weak_side) {
        return Value::DRAW;
    }

    let winner_ksq = pos.square(strong_side, KING);
    let loser_ksq = pos.square(weak_side, KING);

    let mut result =
        pos.non_pawn_material_c(strong_side)
        + pos.count(strong_side, PAWN) * PawnValueEg
        + PUSH_TO_EDGES[loser_ksq.0 as usize]
        + PUSH_CLOSE[Square::distance(winner_ksq, loser_ksq) as usize];

    let bishops = pos.pieces_cp(strong_side, BISHOP);
    if pos.count(strong_side, QUEEN) > 0
        || pos.count(strong_side, ROOK) > 0
        || (bishops != 0 && pos.count(strong_side, KNIGHT) > 0)
        || (bishops & !DARK_SQUARES != 0 && bishops & DARK_SQUARES != 0)
    {
        result = std::cmp::min(result + Value::KNOWN_WIN, Value::MATE_IN_MAX_PLY - 1);
    }

    if strong_side == pos.side_to_move() { result } else { -result }
}

// KB and one or more pawns vs K. It checks for draws with rook pawns and
// a bishop of the wrong color. If such a draw is detected,
// ScaleFactor::DRAW is returned. If not, the return value is
// ScaleFactor::NONE, i.e. no scaling will be used.
pub fn scale_kbpsk(pos: &Position, strong_side: Color) -> ScaleFactor {
    let weak_side = !strong_side;

    debug_assert!(pos.non_pawn_material_c(strong_side) == BishopValueMg);
    debug_assert!(pos.count(strong_side, PAWN) >= 1);

    // No assertions about the material of weak_side, because we want draws
    // to be detected even when the weaker side has some pawns.

    let pawns = pos.pieces_cp(strong_side, PAWN);
    let pawns_file = lsb(pawns).file();

    // All pawns are on a single rook file?
    if (pawns_file == FILE_A || pawns_file == FILE_H)
        && pawns & !file_bb(pawns_file) == 0
    {
        let bishop_sq = pos.square(strong_side, BISHOP);
        let queening_sq = Square::make(pawns_file, RANK_8).relative(strong_side);
        let king_sq = pos.square(weak_side, KING);

        if opposite_colors(queening_sq, bishop_sq)
            && Square::distance(queening_sq, king_sq) <= 1
        {
            return ScaleFactor::DRAW;
        }
    }

    // If all the pawns are on the same B or G file, then it is potentially
    // a draw
    if (pawns_file == FILE_B || pawns_file == FILE_G)
        && pos.pieces_p(PAWN) & !file_bb(pawns_file) == 0
        && pos.non_pawn_material_c(weak_side) == Value::ZERO
        && pos.count(weak_side, PAWN) >= 1
    {
        // Get weak_side pawn that is closest to the home rank
        let weak_pawn_sq = backmost_sq(weak_side, pos.pieces_cp(weak_side, PAWN));

        let strong_king_sq = pos.square(strong_side, KING);
        let weak_king_sq = pos.square(weak_side, KING);
        let bishop_sq = pos.square(strong_side, BISHOP);

        // There is potential for a draw if our pawn is blocked on the 7th
        // rank, the bishop cannot attack it or they only have one pawn left
        if weak_pawn_sq.relative_rank(strong_side) == RANK_7
            && pos.pieces_cp(strong_side, PAWN) & (weak_pawn_sq + pawn_push(weak_side)) != 0
            && (opposite_colors(bishop_sq, weak_pawn_sq)
                || pos.count(strong_side, PAWN) == 1)
        {
            let strong_king_dist = Square::distance(weak_pawn_sq, strong_king_sq);
            let weak_king_dist = Square::distance(weak_pawn_sq, weak_king_sq);

            // It is a draw if the weak king is on its back two ranks, within
            // 2 squares of the blocking pawn and the strong king is not
            // closer.
            if weak_king_sq.relative_rank(strong_side) >= RANK_7
                && weak_king_dist <= 2
                && weak_king_dist <= strong_king_dist
            {
                return ScaleFactor::DRAW;
            }
        }
    }

    ScaleFactor::NONE
}

// KQ vs KR and one or more pawns. It tests for fortress draws with a rook
// on the third rank defended by a pawn.
pub fn scale_kqkrps(pos: &Position, strong_side: Color) -> ScaleFactor {
    let weak_side = !strong_side;

    debug_assert!(verify_material(pos, strong_side, QueenValueMg, 0));
    debug_assert!(pos.count(weak_side, ROOK) == 1);
    debug_assert!(pos.count(weak_side, PAWN) >= 1);

    let king_sq = pos.square(weak_side, KING);
    let rsq = pos.square(weak_side, ROOK);

    if king_sq.relative_rank(weak_side) <= RANK_2
        && pos.square(strong_side, KING).relative_rank(weak_side) >= RANK_4
        && rsq.relative_rank(weak_side) == RANK_3
        && pos.pieces_cp(weak_side, PAWN)
            & pos.attacks_from(KING, king_sq)
            & pos.attacks_from_pawn(rsq, strong_side) != 0
    {
        return ScaleFactor::DRAW;
    }

    ScaleFactor::NONE
}

// K and two or more pawns vs K. There is just a single rule here: if all
// pawns are on the same rook file and are blocked by the defending king,
// it's a draw.
pub fn scale_kpsk(pos: &Position, strong_side: Color) -> ScaleFactor {
    let weak_side = !strong_side;

    debug_assert!(pos.non_pawn_material_c(strong_side) == Value::ZERO);
    debug_assert!(pos.count(strong_side, PAWN) >= 2);
    debug_assert!(verify_material(pos, weak_side, Value::ZERO, 0));

    let ksq = pos.square(weak_side, KING);
    let pawns = pos.pieces_cp(strong_side, PAWN);

    // If all pawns are ahead of the king, on a single rook file and
    // the king is within one file of the pawns, it's a draw.
    if pawns & !forward_ranks_bb(weak_side, ksq) == 0
        && !(pawns & !FILEA_BB != 0 && pawns & !FILEH_BB != 0)
        && u32::distance(ksq.file(), lsb(pawns).file()) <= 1
    {
        return ScaleFactor::DRAW;
    }

    ScaleFactor::NONE
}

// KP vs KP. This is done by removing the weakest side's pawn and probing
// the KP vs K bitbase: if the weakest side has a draw without the pawn,
// it probably has at least a draw with the pawn as well. The exception
// is when the stronger side's pawn is far advanced and not on a rook
// file; in this case it is often possible to win (e.g. 8/4k3/3p4/3P4/
// 6K1/8/8/8 w - - 0 1).
pub fn scale_kpkp(pos: &Position, strong_side: Color) -> ScaleFactor {
    let weak_side = !strong_side;

    debug_assert!(verify_material(pos, strong_side, Value::ZERO, 1));
    debug_assert!(verify_material(pos, weak_side, Value::ZERO, 1));

    // Assume strong_side is white and the pawn is on files A-D
    let wksq = normalize(pos, strong_side, pos.square(strong_side, KING));
    let bksq = normalize(pos, strong_side, pos.square(weak_side, KING));
    let psq  = normalize(pos, strong_side, pos.square(strong_side, PAWN));

    let us = if strong_side == pos.side_to_move() { WHITE } else { BLACK };

    // If the pawn has advanced to the fifth rank or further and is not a
    // rook pawn, it's too dangerous to assume that it's at least a draw.
    if psq.rank() >= RANK_5 && psq.file() != FILE_A {
        return ScaleFactor::NONE;
    }

    // Probe the KPK bitbase with the weakest side's pawn removed. If it's
    // a draw, it's probably at least a draw even with the pawn.
    if bitbases::probe(wksq, psq, bksq, us) {
        ScaleFactor::NONE
    } else {
        ScaleFactor::DRAW
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn registry_has_two_specialists_per_signature() {
        let eg = endgames();
        assert_eq!(eg.iter().count(), 2 * Signature::ALL.len());

        for &sig in Signature::ALL.iter() {
            let [w, b] = eg.pair(sig);
            assert_eq!(w.signature(), sig);
            assert_eq!(b.signature(), sig);
            assert_eq!(w.strong_side(), WHITE);
            assert_eq!(b.strong_side(), BLACK);
            assert_eq!(w.is_evaluator(), sig == Signature::KXK);
            assert_eq!(b.is_evaluator(), sig == Signature::KXK);
        }
    }

    #[test]
    fn registry_is_shared() {
        let a = endgames().get(Signature::KPKP, BLACK) as *const Specialist;
        let b = endgames().get(Signature::KPKP, BLACK) as *const Specialist;
        assert_eq!(a, b);
    }

    #[test]
    fn capabilities_are_exclusive() {
        let p = pos("8/8/8/4k3/8/8/8/R3K3 w - - 0 1");
        let kxk = endgames().get(Signature::KXK, WHITE);
        assert!(kxk.evaluate(&p).is_some());
        assert!(kxk.scale(&p).is_none());

        let p = pos("8/8/8/4k3/8/8/P7/B3K3 w - - 0 1");
        let kbpsk = endgames().get(Signature::KBPsK, WHITE);
        assert!(kbpsk.evaluate(&p).is_none());
        assert!(kbpsk.scale(&p).is_some());
    }

    #[test]
    fn kxk_rook_is_a_known_win() {
        let p = pos("8/8/8/4k3/8/8/8/R3K3 w - - 0 1");
        let v = evaluate_kxk(&p, WHITE);
        assert!(v > Value::KNOWN_WIN);
        assert!(v < Value::MATE_IN_MAX_PLY);

        // Same position, defending side to move: sign flips.
        let q = pos("8/8/8/4k3/8/8/8/R3K3 b - - 0 1");
        assert_eq!(evaluate_kxk(&q, WHITE), -v);
    }

    #[test]
    fn kxk_prefers_king_on_the_edge() {
        let center = evaluate_kxk(&pos("8/8/8/4k3/8/4K3/8/R7 w - - 0 1"), WHITE);
        let edge = evaluate_kxk(&pos("4k3/8/4K3/8/8/8/8/R7 w - - 0 1"), WHITE);
        assert!(edge > center);
    }

    #[test]
    fn kxk_black_strong_side() {
        let p = pos("r3k3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert!(Signature::KXK.matches(&p, BLACK));
        assert!(evaluate_kxk(&p, BLACK) > Value::KNOWN_WIN);
    }

    #[test]
    fn kxk_same_colored_bishops_are_not_a_known_win() {
        // Two dark-squared bishops cannot force mate.
        let p = pos("8/8/8/4k3/8/4B3/8/2B1K3 w - - 0 1");
        let v = evaluate_kxk(&p, WHITE);
        assert!(v > Value::ZERO);
        assert!(v < Value::KNOWN_WIN);
    }

    #[test]
    fn kxk_detects_stalemate() {
        // Black king on a8, white queen on b6, black to move: no moves.
        let p = pos("k7/8/1Q6/8/8/8/8/4K3 b - - 0 1");
        assert_eq!(evaluate_kxk(&p, WHITE), Value::DRAW);

        // With white to move it is just a won ending.
        let w = pos("k7/8/1Q6/8/8/8/8/4K3 w - - 0 1");
        assert!(evaluate_kxk(&w, WHITE) > Value::KNOWN_WIN);
    }

    #[test]
    fn kxk_check_is_not_stalemate() {
        // Black king in check from the queen on a6, escapes to b8.
        let p = pos("k7/8/Q7/8/8/8/8/4K3 b - - 0 1");
        assert_ne!(evaluate_kxk(&p, WHITE), Value::DRAW);
    }

    #[test]
    fn kbpsk_wrong_bishop_rook_pawn() {
        // Light-squared bishop cannot cover h8, defending king sits on it.
        let p = pos("7k/8/8/8/7P/8/8/4KB2 w - - 0 1");
        assert!(Signature::KBPsK.matches(&p, WHITE));
        assert_eq!(scale_kbpsk(&p, WHITE), ScaleFactor::DRAW);

        // Dark-squared bishop controls h8: no draw recognised.
        let q = pos("7k/8/8/8/7P/8/8/2B1K3 w - - 0 1");
        assert_eq!(scale_kbpsk(&q, WHITE), ScaleFactor::NONE);
    }

    #[test]
    fn kbpsk_black_strong_side() {
        // Mirror of the wrong bishop draw: black pawn on h5, dark-squared
        // bishop on f8 (h1 is light), white king on h1.
        let p = pos("4kb2/8/8/7p/8/8/8/7K b - - 0 1");
        assert!(Signature::KBPsK.matches(&p, BLACK));
        assert_eq!(scale_kbpsk(&p, BLACK), ScaleFactor::DRAW);
    }

    #[test]
    fn kqkrps_third_rank_fortress() {
        // Rook on f6 defended by the g7 pawn, king next to the pawn.
        let p = pos("8/5kp1/5r2/8/3QK3/8/8/8 w - - 0 1");
        assert!(Signature::KQKRPs.matches(&p, WHITE));
        assert_eq!(scale_kqkrps(&p, WHITE), ScaleFactor::DRAW);

        // Attacking king has not crossed to the fourth rank.
        let q = pos("K7/5kp1/5r2/8/3Q4/8/8/8 w - - 0 1");
        assert_eq!(scale_kqkrps(&q, WHITE), ScaleFactor::NONE);
    }

    #[test]
    fn kpsk_rook_pawns_with_king_in_front() {
        let p = pos("k7/8/8/8/P7/P7/8/4K3 w - - 0 1");
        assert!(Signature::KPsK.matches(&p, WHITE));
        assert_eq!(scale_kpsk(&p, WHITE), ScaleFactor::DRAW);

        // Pawns on different files: no rule applies.
        let q = pos("k7/8/8/8/P7/1P6/8/4K3 w - - 0 1");
        assert_eq!(scale_kpsk(&q, WHITE), ScaleFactor::NONE);
    }

    #[test]
    fn kpkp_uses_the_bitbase() {
        // Black king in front of white's rook pawn: draw without the black
        // pawn, so at least a draw with it.
        let p = pos("k7/8/8/8/P6p/8/8/4K3 w - - 0 1");
        assert!(Signature::KPKP.matches(&p, WHITE));
        assert!(Signature::KPKP.matches(&p, BLACK));
        assert_eq!(scale_kpkp(&p, WHITE), ScaleFactor::DRAW);

        // Far advanced central pawn: no opinion.
        let q = pos("8/4k3/3p4/3P4/6K1/8/8/8 w - - 0 1");
        assert_eq!(scale_kpkp(&q, WHITE), ScaleFactor::NONE);
    }

    #[test]
    fn signatures_reject_other_material() {
        let p = pos("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        for &sig in Signature::ALL.iter() {
            for &c in COLORS.iter() {
                assert!(!sig.matches(&p, c), "{} matched the start position", sig.code());
            }
        }
    }
}

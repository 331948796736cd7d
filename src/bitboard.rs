// SPDX-License-Identifier: GPL-3.0-or-later

use crate::types::*;

use lazy_static::lazy_static;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Bitboard(pub u64);

pub fn popcount(bb: Bitboard) -> u32 {
    bb.0.count_ones()
}

pub const DARK_SQUARES: Bitboard = Bitboard(0xaa55aa55aa55aa55);

pub const FILEA_BB: Bitboard = Bitboard(0x0101010101010101);
pub const FILEH_BB: Bitboard = Bitboard(0x8080808080808080);

pub const RANK1_BB: Bitboard = Bitboard(0xff);

struct Tables {
    square_distance: [[u32; 64]; 64],
    forward_ranks: [[Bitboard; 8]; 2],
    pseudo_attacks: [[Bitboard; 64]; 8],
    pawn_attacks: [[Bitboard; 64]; 2],
}

lazy_static! {
    static ref TABLES: Tables = Tables::new();
}

const ROOK_DIRS: [Direction; 4] = [NORTH, EAST, SOUTH, WEST];
const BISHOP_DIRS: [Direction; 4] =
    [NORTH_EAST, SOUTH_EAST, SOUTH_WEST, NORTH_WEST];

impl Tables {
    fn new() -> Tables {
        let mut t = Tables {
            square_distance: [[0; 64]; 64],
            forward_ranks: [[Bitboard(0); 8]; 2],
            pseudo_attacks: [[Bitboard(0); 64]; 8],
            pawn_attacks: [[Bitboard(0); 64]; 2],
        };

        for s1 in Square::all() {
            for s2 in Square::all() {
                t.square_distance[s1.0 as usize][s2.0 as usize] = std::cmp::max(
                    u32::distance(s1.file(), s2.file()),
                    u32::distance(s1.rank(), s2.rank()));
            }
        }

        for r in 0..7 {
            t.forward_ranks[BLACK.idx()][r + 1] =
                t.forward_ranks[BLACK.idx()][r] | rank_bb(r as Rank);
            t.forward_ranks[WHITE.idx()][r] =
                !t.forward_ranks[BLACK.idx()][r + 1];
        }

        // Leaper steps never wrap more than two files, so a distance check
        // weeds out the ones that fall off the board edge.
        for s in Square::all() {
            for &c in COLORS.iter() {
                for &d in [7, 9].iter() {
                    let to = s + if c == WHITE { Direction(d) } else { -Direction(d) };
                    if to.is_ok() && t.square_distance[s.0 as usize][to.0 as usize] < 3 {
                        t.pawn_attacks[c.idx()][s.0 as usize] |= to;
                    }
                }
            }

            for &(pt, steps) in [(KNIGHT, [6, 10, 15, 17]), (KING, [1, 7, 8, 9])].iter() {
                for &d in steps.iter() {
                    for &to in [s + Direction(d), s - Direction(d)].iter() {
                        if to.is_ok() && t.square_distance[s.0 as usize][to.0 as usize] < 3 {
                            t.pseudo_attacks[pt.0 as usize][s.0 as usize] |= to;
                        }
                    }
                }
            }

            let b_att = sliding_attack(&BISHOP_DIRS, s, Bitboard(0));
            let r_att = sliding_attack(&ROOK_DIRS, s, Bitboard(0));
            t.pseudo_attacks[BISHOP.0 as usize][s.0 as usize] = b_att;
            t.pseudo_attacks[ROOK.0 as usize][s.0 as usize] = r_att;
            t.pseudo_attacks[QUEEN.0 as usize][s.0 as usize] = b_att | r_att;
        }

        t
    }
}

impl From<Square> for Bitboard {
    fn from(s: Square) -> Self {
        debug_assert!(s.is_ok());
        Bitboard(1u64 << s.0)
    }
}

impl Square {
    pub fn bb(self) -> Bitboard {
        Bitboard::from(self)
    }
}

impl std::ops::BitOr<Bitboard> for Bitboard {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Bitboard(self.0 | rhs.0)
    }
}

impl std::ops::BitOr<Square> for Bitboard {
    type Output = Bitboard;
    fn bitor(self, rhs: Square) -> Self {
        self | Bitboard::from(rhs)
    }
}

impl std::ops::BitAnd<Bitboard> for Bitboard {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Bitboard(self.0 & rhs.0)
    }
}

impl std::ops::BitAnd<Square> for Bitboard {
    type Output = Bitboard;
    fn bitand(self, rhs: Square) -> Self {
        self & Bitboard::from(rhs)
    }
}

impl std::ops::BitXor<Square> for Bitboard {
    type Output = Bitboard;
    fn bitxor(self, rhs: Square) -> Self {
        Bitboard(self.0 ^ Bitboard::from(rhs).0)
    }
}

impl std::ops::Not for Bitboard {
    type Output = Bitboard;
    fn not(self) -> Self {
        Bitboard(!self.0)
    }
}

impl std::ops::Shl<u32> for Bitboard {
    type Output = Bitboard;
    fn shl(self, rhs: u32) -> Self {
        Bitboard(self.0 << rhs)
    }
}

impl<RHS> std::ops::BitOrAssign<RHS> for Bitboard
    where Bitboard: std::ops::BitOr<RHS, Output=Bitboard>
{
    fn bitor_assign(&mut self, rhs: RHS) {
        *self = *self | rhs;
    }
}

impl<RHS> std::ops::BitAndAssign<RHS> for Bitboard
    where Bitboard: std::ops::BitAnd<RHS, Output=Bitboard>
{
    fn bitand_assign(&mut self, rhs: RHS) {
        *self = *self & rhs;
    }
}

impl<RHS> std::ops::BitXorAssign<RHS> for Bitboard
    where Bitboard: std::ops::BitXor<RHS, Output=Bitboard>
{
    fn bitxor_assign(&mut self, rhs: RHS) {
        *self = *self ^ rhs;
    }
}

impl PartialEq<u64> for Bitboard {
    fn eq(&self, rhs: &u64) -> bool {
        debug_assert!(*rhs == 0);
        self.0 == *rhs
    }
}

pub fn more_than_one(b: Bitboard) -> bool {
    (b.0 & u64::wrapping_sub(b.0, 1)) != 0
}

pub fn lsb(b: Bitboard) -> Square {
    debug_assert!(b != 0);
    Square(u64::trailing_zeros(b.0))
}

pub fn msb(b: Bitboard) -> Square {
    debug_assert!(b != 0);
    Square(63 ^ u64::leading_zeros(b.0))
}

pub fn pop_lsb(b: &mut Bitboard) -> Square {
    let s = lsb(*b);
    b.0 &= u64::wrapping_sub(b.0, 1);
    s
}

pub fn backmost_sq(c: Color, b: Bitboard) -> Square {
    if c == WHITE { lsb(b) } else { msb(b) }
}

impl Iterator for Bitboard {
    type Item = Square;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 != 0 {
            Some(pop_lsb(self))
        } else {
            None
        }
    }
}

pub fn rank_bb(r: Rank) -> Bitboard {
    RANK1_BB << (8 * r)
}

pub fn file_bb(f: File) -> Bitboard {
    FILEA_BB << f
}

// forward_ranks_bb() returns all the squares on the ranks in front of the
// given one, from the point of view of the given color. For instance,
// forward_ranks_bb(BLACK, D3) is the 16 squares on ranks 1 and 2.
pub fn forward_ranks_bb(c: Color, s: Square) -> Bitboard {
    TABLES.forward_ranks[c.idx()][s.rank() as usize]
}

pub fn pseudo_attacks(pt: PieceType, s: Square) -> Bitboard {
    TABLES.pseudo_attacks[pt.0 as usize][s.0 as usize]
}

pub fn pawn_attacks(c: Color, s: Square) -> Bitboard {
    TABLES.pawn_attacks[c.idx()][s.0 as usize]
}

pub trait Distance {
    fn distance(x: Self, y: Self) -> u32;
}

impl Distance for u32 {
    fn distance(x: Self, y: Self) -> u32 {
        if x > y { x - y } else { y - x }
    }
}

impl Distance for Square {
    fn distance(x: Self, y: Self) -> u32 {
        TABLES.square_distance[x.0 as usize][y.0 as usize]
    }
}

fn sliding_attack(directions: &[Direction], sq: Square, occupied: Bitboard) -> Bitboard {
    let mut attack = Bitboard(0);
    for &d in directions {
        let mut s = sq + d;
        while s.is_ok() && u32::distance(s.file(), (s - d).file()) <= 1 {
            attack |= s;
            if occupied & s != 0 {
                break;
            }
            s += d;
        }
    }
    attack
}

// attacks_bb() returns the squares attacked by a piece of type pt on s.
// Sliders are traced ray by ray; only lone-king endings need them, so
// there are no magic tables behind this.
pub fn attacks_bb(pt: PieceType, s: Square, occupied: Bitboard) -> Bitboard {
    match pt {
        BISHOP => sliding_attack(&BISHOP_DIRS, s, occupied),
        ROOK => sliding_attack(&ROOK_DIRS, s, occupied),
        QUEEN => {
            sliding_attack(&BISHOP_DIRS, s, occupied)
            | sliding_attack(&ROOK_DIRS, s, occupied)
        }
        _ => pseudo_attacks(pt, s),
    }
}

/// Forces construction of the lookup tables.
pub fn init() {
    lazy_static::initialize(&TABLES);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        let b = name.as_bytes();
        Square::make((b[0] - b'a') as File, (b[1] - b'1') as Rank)
    }

    #[test]
    fn leaper_attacks() {
        assert_eq!(popcount(pseudo_attacks(KING, sq("a1"))), 3);
        assert_eq!(popcount(pseudo_attacks(KING, sq("e4"))), 8);
        assert_eq!(popcount(pseudo_attacks(KNIGHT, sq("a1"))), 2);
        assert_eq!(popcount(pseudo_attacks(KNIGHT, sq("d4"))), 8);
        assert_eq!(pawn_attacks(WHITE, sq("a2")), sq("b3").bb());
        assert_eq!(pawn_attacks(BLACK, sq("e5")), sq("d4").bb() | sq("f4"));
    }

    #[test]
    fn slider_attacks_stop_at_blockers() {
        assert_eq!(popcount(attacks_bb(ROOK, sq("a1"), Bitboard(0))), 14);
        assert_eq!(popcount(attacks_bb(BISHOP, sq("d4"), Bitboard(0))), 13);

        let blocked = attacks_bb(ROOK, sq("a1"), sq("a3").bb() | sq("c1"));
        assert_eq!(blocked, sq("a2").bb() | sq("a3") | sq("b1") | sq("c1"));
    }

    #[test]
    fn distances_and_ranks() {
        assert_eq!(Square::distance(sq("a1"), sq("h8")), 7);
        assert_eq!(Square::distance(sq("e4"), sq("f6")), 2);
        assert_eq!(forward_ranks_bb(WHITE, sq("d7")), rank_bb(RANK_8));
        assert_eq!(popcount(forward_ranks_bb(BLACK, sq("d3"))), 16);
    }
}

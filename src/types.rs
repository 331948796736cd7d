// SPDX-License-Identifier: GPL-3.0-or-later

/// Zobrist-style hash. The material key of a position depends only on how
/// many pieces of each kind both sides hold.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Key(pub u64);

impl std::ops::BitXor<Key> for Key {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self { Key(self.0 ^ rhs.0) }
}

impl std::ops::BitXorAssign<Key> for Key {
    fn bitxor_assign(&mut self, rhs: Key) { *self = *self ^ rhs; }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{:X}", self.0)
    }
}

pub const MAX_PLY: i32 = 128;
pub const MAX_MATE_PLY: i32 = 128;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Color(pub u32);

pub const WHITE: Color = Color(0);
pub const BLACK: Color = Color(1);

pub const COLORS: [Color; 2] = [WHITE, BLACK];

impl Color {
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl std::ops::Not for Color {
    type Output = Color;
    fn not(self) -> Self { Color(self.0 ^ 1) }
}

pub type Phase = i32;

pub const PHASE_ENDGAME: Phase = 0;
pub const PHASE_MIDGAME: Phase = 128;

pub const MG: usize = 0;
pub const EG: usize = 1;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct ScaleFactor(pub i32);

impl ScaleFactor {
    pub const DRAW  : ScaleFactor = ScaleFactor(0);
    pub const NORMAL: ScaleFactor = ScaleFactor(64);
    pub const MAX   : ScaleFactor = ScaleFactor(128);
    pub const NONE  : ScaleFactor = ScaleFactor(255);
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct PieceType(pub u32);

pub const PAWN  : PieceType = PieceType(1);
pub const KNIGHT: PieceType = PieceType(2);
pub const BISHOP: PieceType = PieceType(3);
pub const ROOK  : PieceType = PieceType(4);
pub const QUEEN : PieceType = PieceType(5);
pub const KING  : PieceType = PieceType(6);

pub const ALL_PIECES: PieceType = PieceType(0);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece(pub u32);

pub const NO_PIECE: Piece = Piece(0);

impl Piece {
    pub fn piece_type(self) -> PieceType { PieceType(self.0 & 7) }

    pub fn color(self) -> Color { Color(self.0 >> 3) }

    pub fn make(c: Color, pt: PieceType) -> Piece { Piece((c.0 << 3) + pt.0) }
}

pub type File = u32;
pub type Rank = u32;

pub const FILE_A: File = 0;
pub const FILE_B: File = 1;
pub const FILE_D: File = 3;
pub const FILE_E: File = 4;
pub const FILE_G: File = 6;
pub const FILE_H: File = 7;

pub const RANK_1: Rank = 0;
pub const RANK_2: Rank = 1;
pub const RANK_3: Rank = 2;
pub const RANK_4: Rank = 3;
pub const RANK_5: Rank = 4;
pub const RANK_6: Rank = 5;
pub const RANK_7: Rank = 6;
pub const RANK_8: Rank = 7;

pub fn relative_rank(c: Color, r: Rank) -> Rank {
    r ^ (c.0 * 7)
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Square(pub u32);

impl Square {
    pub const A1: Square = Square(0);
    pub const H8: Square = Square(63);

    pub const NONE: Square = Square(64);

    pub fn file(self) -> File {
        self.0 & 7
    }

    pub fn rank(self) -> Rank {
        self.0 >> 3
    }

    pub fn relative(self, c: Color) -> Self {
        Square(self.0 ^ (c.0 * 56))
    }

    pub fn relative_rank(self, c: Color) -> Rank {
        relative_rank(c, self.rank())
    }

    pub fn is_ok(self) -> bool {
        self >= Square::A1 && self <= Square::H8
    }

    pub fn make(f: File, r: Rank) -> Square {
        Square((r << 3) | f)
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }
}

// Flips the square vertically (A1 <-> A8).
impl std::ops::Not for Square {
    type Output = Self;
    fn not(self) -> Self { Square(self.0 ^ 56) }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}{}", (b'a' + self.file() as u8) as char,
            (b'1' + self.rank() as u8) as char)
    }
}

pub fn opposite_colors(s1: Square, s2: Square) -> bool {
    let s = s1.0 ^ s2.0;
    (((s >> 3) ^ s) & 1) != 0
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Direction(pub i32);

impl std::ops::Neg for Direction {
    type Output = Self;
    fn neg(self) -> Self { Direction(-self.0) }
}

pub const NORTH: Direction = Direction( 8);
pub const EAST : Direction = Direction( 1);
pub const SOUTH: Direction = Direction(-8);
pub const WEST : Direction = Direction(-1);

pub const NORTH_EAST: Direction = Direction( 9);
pub const NORTH_WEST: Direction = Direction( 7);
pub const SOUTH_EAST: Direction = Direction(-7);
pub const SOUTH_WEST: Direction = Direction(-9);

impl std::ops::Add<Direction> for Square {
    type Output = Square;
    fn add(self, rhs: Direction) -> Self {
        Square(u32::wrapping_add(self.0, rhs.0 as u32))
    }
}

impl std::ops::Sub<Direction> for Square {
    type Output = Square;
    fn sub(self, rhs: Direction) -> Self {
        Square(u32::wrapping_sub(self.0, rhs.0 as u32))
    }
}

impl std::ops::AddAssign<Direction> for Square {
    fn add_assign(&mut self, rhs: Direction) { *self = *self + rhs; }
}

impl std::ops::Mul<Direction> for i32 {
    type Output = Direction;
    fn mul(self, rhs: Direction) -> Direction { Direction(self * rhs.0) }
}

pub fn pawn_push(c: Color) -> Direction {
    match c {
        WHITE => NORTH,
        _     => SOUTH
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Value(pub i32);

impl Value {
    pub const ZERO     : Value = Value(0);
    pub const DRAW     : Value = Value(0);
    pub const KNOWN_WIN: Value = Value(10000);
    pub const MATE     : Value = Value(32000);

    pub const MATE_IN_MAX_PLY: Value =
        Value(Value::MATE.0 - MAX_MATE_PLY - MAX_PLY);
}

#[allow(non_upper_case_globals)]
pub const PawnValueMg  : Value = Value(126);
#[allow(non_upper_case_globals)]
pub const KnightValueMg: Value = Value(781);
#[allow(non_upper_case_globals)]
pub const BishopValueMg: Value = Value(825);
#[allow(non_upper_case_globals)]
pub const RookValueMg  : Value = Value(1276);
#[allow(non_upper_case_globals)]
pub const QueenValueMg : Value = Value(2538);

#[allow(non_upper_case_globals)]
pub const PawnValueEg  : Value = Value(208);
#[allow(non_upper_case_globals)]
pub const KnightValueEg: Value = Value(854);
#[allow(non_upper_case_globals)]
pub const BishopValueEg: Value = Value(915);
#[allow(non_upper_case_globals)]
pub const RookValueEg  : Value = Value(1380);
#[allow(non_upper_case_globals)]
pub const QueenValueEg : Value = Value(2682);

pub const MIDGAME_LIMIT: Value = Value(15258);
pub const ENDGAME_LIMIT: Value = Value(3915);

const PIECE_VALUE: [[Value; 8]; 2] = [
    [ Value::ZERO, PawnValueMg, KnightValueMg, BishopValueMg,
      RookValueMg, QueenValueMg, Value::ZERO, Value::ZERO ],
    [ Value::ZERO, PawnValueEg, KnightValueEg, BishopValueEg,
      RookValueEg, QueenValueEg, Value::ZERO, Value::ZERO ],
];

pub fn piece_value(phase: usize, pt: PieceType) -> Value {
    PIECE_VALUE[phase][pt.0 as usize]
}

impl std::ops::Neg for Value {
    type Output = Self;
    fn neg(self) -> Self { Value(-self.0) }
}

impl std::ops::Add<Value> for Value {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { Value(self.0 + rhs.0) }
}

impl std::ops::Add<i32> for Value {
    type Output = Self;
    fn add(self, rhs: i32) -> Self { self + Value(rhs) }
}

impl std::ops::Sub<Value> for Value {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { Value(self.0 - rhs.0) }
}

impl std::ops::Sub<i32> for Value {
    type Output = Self;
    fn sub(self, rhs: i32) -> Self { self - Value(rhs) }
}

impl std::ops::AddAssign<Value> for Value {
    fn add_assign(&mut self, rhs: Self) { *self = *self + rhs; }
}

impl std::ops::SubAssign<Value> for Value {
    fn sub_assign(&mut self, rhs: Self) { *self = *self - rhs; }
}

impl std::ops::Mul<i32> for Value {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self { Value(self.0 * rhs) }
}

impl std::ops::Mul<Value> for i32 {
    type Output = Value;
    fn mul(self, rhs: Value) -> Value { Value(self * rhs.0) }
}

impl std::ops::Div<Value> for Value {
    type Output = i32;
    fn div(self, rhs: Self) -> i32 { self.0 / rhs.0 }
}

/// A midgame/endgame score pair. The two lanes never interact: every
/// operation is applied to each of them separately.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Score {
    mg: i32,
    eg: i32,
}

impl Score {
    pub const ZERO: Score = Score { mg: 0, eg: 0 };

    pub const fn make(mg: i32, eg: i32) -> Self {
        Score { mg, eg }
    }

    pub fn mg(self) -> Value {
        Value(self.mg)
    }

    pub fn eg(self) -> Value {
        Value(self.eg)
    }
}

impl std::ops::Add<Score> for Score {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Score::make(self.mg + rhs.mg, self.eg + rhs.eg)
    }
}

impl std::ops::AddAssign<Score> for Score {
    fn add_assign(&mut self, rhs: Self) { *self = *self + rhs; }
}

impl std::ops::Sub<Score> for Score {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Score::make(self.mg - rhs.mg, self.eg - rhs.eg)
    }
}

impl std::ops::SubAssign<Score> for Score {
    fn sub_assign(&mut self, rhs: Self) { *self = *self - rhs; }
}

impl std::ops::Neg for Score {
    type Output = Self;
    fn neg(self) -> Self { Score::make(-self.mg, -self.eg) }
}

impl std::ops::Mul<i32> for Score {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self {
        Score::make(rhs * self.mg, rhs * self.eg)
    }
}

impl std::ops::Mul<Score> for i32 {
    type Output = Score;
    fn mul(self, rhs: Score) -> Score { rhs * self }
}

impl std::ops::Div<i32> for Score {
    type Output = Self;
    fn div(self, rhs: i32) -> Self {
        Score::make(self.mg / rhs, self.eg / rhs)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "({}, {})", self.mg, self.eg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_lanes_are_independent() {
        let a = Score::make(100, -40);
        let b = Score::make(-7, 13);

        assert_eq!(a + b, Score::make(93, -27));
        assert_eq!(a - b, Score::make(107, -53));
        assert_eq!(-a, Score::make(-100, 40));
        assert_eq!(a * 3, Score::make(300, -120));
        assert_eq!(3 * b, Score::make(-21, 39));
    }

    #[test]
    fn score_division_truncates_each_lane() {
        assert_eq!(Score::make(33, -33) / 16, Score::make(2, -2));
        assert_eq!(Score::make(-15, 15) / 16, Score::ZERO);
        // A large eg lane must not leak into mg.
        assert_eq!(Score::make(1, 1 << 20) / 2, Score::make(0, 1 << 19));
    }

    #[test]
    fn square_helpers() {
        let e4 = Square::make(FILE_E, RANK_4);
        assert_eq!(e4.to_string(), "e4");
        assert_eq!((!e4).rank(), RANK_5);
        assert_eq!(e4.relative_rank(BLACK), RANK_5);
        assert!(opposite_colors(Square::A1, Square::make(FILE_B, RANK_1)));
        assert!(!opposite_colors(Square::A1, Square::H8));
    }
}

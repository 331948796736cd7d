// SPDX-License-Identifier: GPL-3.0-or-later

use crate::config::MaterialConfig;
use crate::types::*;

use log::{debug, trace};

/// What the material table needs to know about a position. The key must
/// depend on the per-side piece counts only.
pub trait MaterialSource {
    fn material_key(&self) -> Key;
    fn non_pawn_material_c(&self, c: Color) -> Value;
    fn count(&self, c: Color, pt: PieceType) -> i32;
}

/// One material configuration: its imbalance, game phase and per-side
/// scale factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    key: Key,
    score: Score,
    game_phase: Phase,
    factor: [u8; 2],
}

impl Entry {
    pub fn new() -> Entry {
        Entry {
            key: Key(0),
            score: Score::ZERO,
            game_phase: 0,
            factor: [0; 2],
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    pub fn imbalance(&self) -> Score {
        self.score
    }

    pub fn game_phase(&self) -> Phase {
        self.game_phase
    }

    pub fn scale_factor(&self, c: Color) -> ScaleFactor {
        ScaleFactor(self.factor[c.idx()] as i32)
    }
}

impl Default for Entry {
    fn default() -> Entry {
        Entry::new()
    }
}

// Polynomial material imbalance parameters

const fn s(mg: i32, eg: i32) -> Score {
    Score::make(mg, eg)
}

const Z: Score = Score::ZERO;

// One Score for each pair (our piece, another of our pieces)
pub const QUADRATIC_OURS: [[Score; 6]; 6] = [
    //                                OUR PIECE 2
    // bishop pair     pawn         knight       bishop       rook          queen
    [s(1419, 1455), Z,            Z,           Z,           Z,            Z         ], // Bishop pair
    [s( 101,   28), s( 37,  39),  Z,           Z,           Z,            Z         ], // Pawn
    [s(  57,   64), s(249, 187),  s(-49, -62), Z,           Z,            Z         ], // Knight  OUR PIECE 1
    [s(   0,    0), s(118, 137),  s( 10,  27), s(  0,   0), Z,            Z         ], // Bishop
    [s( -63,  -68), s( -5,   3),  s(100,  81), s(132, 118), s(-246,-244), Z         ], // Rook
    [s(-210, -211), s( 37,  14),  s(147, 141), s(161, 105), s(-158,-174), s(-9,-31)], // Queen
];

// One Score for each pair (our piece, their piece)
pub const QUADRATIC_THEIRS: [[Score; 6]; 6] = [
    //                              THEIR PIECE
    // bishop pair    pawn         knight       bishop       rook         queen
    [Z,            Z,            Z,           Z,           Z,           Z], // Bishop pair
    [s( 33,  30),  Z,            Z,           Z,           Z,           Z], // Pawn
    [s( 46,  18),  s(106,  84),  Z,           Z,           Z,           Z], // Knight  OUR PIECE
    [s( 75,  35),  s( 59,  44),  s( 60,  15), Z,           Z,           Z], // Bishop
    [s( 26,  35),  s(  6,  22),  s( 38,  39), s(-12,  -2), Z,           Z], // Rook
    [s( 97,  93),  s(100, 163),  s(-58, -91), s(112, 192), s(276, 225), Z], // Queen
];

/// Divisor applied to the difference of the two sides' imbalance bonuses.
pub const IMBALANCE_DAMPING: i32 = 16;

// imbalance() calculates the imbalance by comparing the piece count of
// each piece type for both colors. Slot 0 of each count vector is the
// bishop pair flag, slots 1-5 count pawns to queens.
pub fn imbalance(pc: &[[i32; 6]; 2], us: Color) -> Score {
    let ours = &pc[us.idx()];
    let theirs = &pc[(!us).idx()];

    let mut bonus = Score::ZERO;

    // Second-degree polynomial material imbalance, by Tord Romstad
    for pt1 in 0..6 {
        if ours[pt1] == 0 {
            continue;
        }

        let mut v = QUADRATIC_OURS[pt1][pt1] * ours[pt1];

        for pt2 in 0..pt1 {
            v += QUADRATIC_OURS[pt1][pt2] * ours[pt2]
                + QUADRATIC_THEIRS[pt1][pt2] * theirs[pt2];
        }

        bonus += v * ours[pt1];
    }

    bonus
}

// game_phase() maps total non-pawn material into
// [PHASE_ENDGAME, PHASE_MIDGAME].
pub fn game_phase(npm: Value) -> Phase {
    let npm = std::cmp::max(ENDGAME_LIMIT, std::cmp::min(npm, MIDGAME_LIMIT));
    ((npm - ENDGAME_LIMIT) * PHASE_MIDGAME) / (MIDGAME_LIMIT - ENDGAME_LIMIT)
}

// The bishop pair is an extra "piece type" in slot 0, which allows us to
// be more flexible in defining bishop pair bonuses.
pub fn piece_counts<P: MaterialSource + ?Sized>(pos: &P) -> [[i32; 6]; 2] {
    let side = |c: Color| [
        (pos.count(c, BISHOP) > 1) as i32,
        pos.count(c, PAWN),
        pos.count(c, KNIGHT),
        pos.count(c, BISHOP),
        pos.count(c, ROOK),
        pos.count(c, QUEEN),
    ];
    [side(WHITE), side(BLACK)]
}

/// Direct-mapped material hash table owned by a single search thread.
/// Each slot keeps at most one configuration; a colliding key simply
/// overwrites it.
pub struct Table {
    entries: Box<[Entry]>,
    mask: u64,
}

impl Table {
    pub fn new(config: &MaterialConfig) -> Table {
        Table::with_size(config.table_size)
    }

    pub fn with_size(size: usize) -> Table {
        assert!(size.is_power_of_two(), "material table size must be a power of two");
        debug!("material table: {} entries", size);
        Table {
            entries: vec![Entry::new(); size].into_boxed_slice(),
            mask: (size - 1) as u64,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn index(&self, key: Key) -> usize {
        (key.0 & self.mask) as usize
    }

    pub fn clear(&mut self) {
        for e in self.entries.iter_mut() {
            *e = Entry::new();
        }
    }

    // probe() looks up the current position's material configuration in
    // the table. On a hit the stored entry is returned untouched. Otherwise
    // the slot is recomputed from the piece counts and overwritten, so we
    // don't have to recompute all when the same configuration occurs again.
    pub fn probe<P: MaterialSource + ?Sized>(&mut self, pos: &P) -> &Entry {
        let key = pos.material_key();
        let idx = self.index(key);
        let e = &mut self.entries[idx];

        if e.key == key {
            return e;
        }

        trace!("material miss: key {} slot {}", key, idx);

        *e = Entry::new();
        e.key = key;
        e.factor[WHITE.idx()] = ScaleFactor::NORMAL.0 as u8;
        e.factor[BLACK.idx()] = ScaleFactor::NORMAL.0 as u8;

        e.game_phase = game_phase(
            pos.non_pawn_material_c(WHITE) + pos.non_pawn_material_c(BLACK));

        let pc = piece_counts(pos);
        e.score = (imbalance(&pc, WHITE) - imbalance(&pc, BLACK)) / IMBALANCE_DAMPING;

        e
    }
}

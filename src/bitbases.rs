// SPDX-License-Identifier: GPL-3.0-or-later

use crate::bitboard::*;
use crate::types::*;

use lazy_static::lazy_static;
use log::debug;

// There are 24 possible pawn squares: files A to D and ranks from 2 to 7
const MAX_INDEX: usize = 2 * 24 * 64 * 64;

lazy_static! {
    // Each u32 stores results of 32 positions, one per bit
    static ref KPK_BITBASE: Vec<u32> = generate();
}

// A KPK bitbase index is an integer in [0, MAX_INDEX) range
//
// bit  0- 5: white king square (from A1 to H8)
// bit  6-11: black king square (from A1 to H8)
// bit    12: side to move (WHITE or BLACK)
// bit 13-14: white pawn file (from FILE_A to FILE_D)
// bit 15-17: white pawn RANK_7 - rank (from RANK_7 - RANK_7 to RANK_7 - RANK_2)
fn index(us: Color, bksq: Square, wksq: Square, psq: Square) -> usize {
    (wksq.0 | (bksq.0 << 6) | (us.0 << 12) | (psq.file() << 13)
        | ((RANK_7 - psq.rank()) << 15)) as usize
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct Outcome(u8);

impl Outcome {
    const INVALID: Outcome = Outcome(0);
    const UNKNOWN: Outcome = Outcome(1);
    const DRAW   : Outcome = Outcome(2);
    const WIN    : Outcome = Outcome(4);

    fn has(self, other: Outcome) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOrAssign for Outcome {
    fn bitor_assign(&mut self, rhs: Outcome) {
        self.0 |= rhs.0;
    }
}

struct KpkPosition {
    us: Color,
    ksq: [Square; 2],
    psq: Square,
    result: Outcome,
}

impl KpkPosition {
    fn new(idx: usize) -> KpkPosition {
        let idx = idx as u32;
        let ksq = [Square(idx & 0x3f), Square((idx >> 6) & 0x3f)];
        let us = Color((idx >> 12) & 0x01);
        let psq = Square::make((idx >> 13) & 0x03, RANK_7 - ((idx >> 15) & 0x07));

        let wk = ksq[WHITE.idx()];
        let bk = ksq[BLACK.idx()];
        let push = psq + NORTH;

        // Two pieces on one square, or the side to move can take a king
        let result = if Square::distance(wk, bk) <= 1
            || wk == psq
            || bk == psq
            || (us == WHITE && pawn_attacks(WHITE, psq) & bk != 0)
        {
            Outcome::INVALID
        }
        // The pawn promotes and the new queen cannot be taken
        else if us == WHITE
            && psq.rank() == RANK_7
            && wk != push
            && (Square::distance(bk, push) > 1
                || pseudo_attacks(KING, wk) & push != 0)
        {
            Outcome::WIN
        }
        // Stalemate, or the black king takes an undefended pawn
        else if us == BLACK
            && ((pseudo_attacks(KING, bk)
                    & !(pseudo_attacks(KING, wk) | pawn_attacks(WHITE, psq))) == 0
                || pseudo_attacks(KING, bk) & psq & !pseudo_attacks(KING, wk) != 0)
        {
            Outcome::DRAW
        }
        else {
            Outcome::UNKNOWN
        };

        KpkPosition { us, ksq, psq, result }
    }

    // White to move: one move reaching a WIN makes this a WIN, all moves
    // reaching a DRAW make it a DRAW. Black to move is the mirror image
    // with the roles of WIN and DRAW swapped. Anything else stays UNKNOWN.
    fn classify(&self, db: &[KpkPosition]) -> Outcome {
        let us = self.us;
        let them = !us;
        let psq = self.psq;

        let (good, bad) = if us == WHITE {
            (Outcome::WIN, Outcome::DRAW)
        } else {
            (Outcome::DRAW, Outcome::WIN)
        };

        let mut r = Outcome::INVALID;

        for s in pseudo_attacks(KING, self.ksq[us.idx()]) {
            r |= if us == WHITE {
                db[index(them, self.ksq[them.idx()], s, psq)].result
            } else {
                db[index(them, s, self.ksq[them.idx()], psq)].result
            };
        }

        if us == WHITE {
            let wk = self.ksq[WHITE.idx()];
            let bk = self.ksq[BLACK.idx()];

            if psq.rank() < RANK_7 {
                r |= db[index(them, bk, wk, psq + NORTH)].result;
            }

            if psq.rank() == RANK_2 && psq + NORTH != wk && psq + NORTH != bk {
                r |= db[index(them, bk, wk, psq + 2 * NORTH)].result;
            }
        }

        if r.has(good) {
            good
        } else if r.has(Outcome::UNKNOWN) {
            Outcome::UNKNOWN
        } else {
            bad
        }
    }
}

fn generate() -> Vec<u32> {
    let mut db: Vec<KpkPosition> = (0..MAX_INDEX).map(KpkPosition::new).collect();

    // Iterate until none of the unknown positions can be resolved to
    // either a win or a draw.
    let mut passes = 0;
    let mut repeat = true;
    while repeat {
        repeat = false;
        passes += 1;
        for idx in 0..MAX_INDEX {
            if db[idx].result == Outcome::UNKNOWN {
                let result = db[idx].classify(&db);
                if result != Outcome::UNKNOWN {
                    db[idx].result = result;
                    repeat = true;
                }
            }
        }
    }

    let mut bitbase = vec![0u32; MAX_INDEX / 32];
    let mut wins = 0;
    for (idx, p) in db.iter().enumerate() {
        if p.result == Outcome::WIN {
            bitbase[idx / 32] |= 1u32 << (idx & 0x1f);
            wins += 1;
        }
    }

    debug!("KPK bitbase: {} wins out of {} positions after {} passes",
        wins, MAX_INDEX, passes);

    bitbase
}

/// Forces generation of the bitbase.
pub fn init() {
    lazy_static::initialize(&KPK_BITBASE);
}

/// True if white wins. The pawn must be on files A to D.
pub fn probe(wksq: Square, wpsq: Square, bksq: Square, us: Color) -> bool {
    debug_assert!(wpsq.file() <= FILE_D);

    let idx = index(us, bksq, wksq, wpsq);
    KPK_BITBASE[idx / 32] & (1 << (idx & 0x1f)) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        let b = name.as_bytes();
        Square::make((b[0] - b'a') as File, (b[1] - b'1') as Rank)
    }

    #[test]
    fn pawn_runs_away_from_distant_king() {
        // Pawn on c6, black king far away on h1: unstoppable.
        assert!(probe(sq("a1"), sq("c6"), sq("h1"), WHITE));
        assert!(probe(sq("a1"), sq("c6"), sq("h1"), BLACK));
    }

    #[test]
    fn king_in_front_of_rook_pawn_draws() {
        assert!(!probe(sq("e1"), sq("a4"), sq("a8"), WHITE));
        assert!(!probe(sq("e1"), sq("a4"), sq("a8"), BLACK));
    }

    #[test]
    fn opposition_decides() {
        // White Kd5, Pd4, black Kd7: whoever does not have to move holds
        // the opposition.
        assert!(!probe(sq("d5"), sq("d4"), sq("d7"), WHITE));
        assert!(probe(sq("d5"), sq("d4"), sq("d7"), BLACK));

        // King on the sixth in front of its pawn wins either way.
        assert!(probe(sq("d6"), sq("d5"), sq("d8"), WHITE));
        assert!(probe(sq("d6"), sq("d5"), sq("d8"), BLACK));
    }

    #[test]
    fn undefended_pawn_is_lost() {
        // Black to move takes the pawn on d2.
        assert!(!probe(sq("h8"), sq("d2"), sq("e3"), BLACK));
    }
}

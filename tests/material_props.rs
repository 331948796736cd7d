// SPDX-License-Identifier: GPL-3.0-or-later

use proptest::prelude::*;
use rustfish_material::types::*;
use rustfish_material::{Position, Table};

// Material for one side: pawns, knights, bishops, rooks, queens.
type Army = (usize, usize, usize, usize, usize);

fn arb_army() -> impl Strategy<Value = Army> {
    (0usize..=8, 0usize..=2, 0usize..=2, 0usize..=2, 0usize..=1)
}

// Lays the white army out on ranks 1-2 and the black army on ranks 7-8,
// kings on e1 and e8. `offset` rotates the officers along their back rank
// so that different placements share one material configuration.
fn fen(white: Army, black: Army, offset: usize, black_to_move: bool) -> String {
    let mut board = [None::<char>; 64];

    for (army, back, pawn_rank, lower) in [(white, 0, 1, false), (black, 7, 6, true)] {
        let (p, n, b, r, q) = army;
        let case = |c: char| if lower { c } else { c.to_ascii_uppercase() };

        board[back * 8 + 4] = Some(case('k'));
        for f in 0..p {
            board[pawn_rank * 8 + f] = Some(case('p'));
        }

        let officers = std::iter::repeat('n').take(n)
            .chain(std::iter::repeat('b').take(b))
            .chain(std::iter::repeat('r').take(r))
            .chain(std::iter::repeat('q').take(q));
        let files = [0, 1, 2, 3, 5, 6, 7];
        for (i, c) in officers.enumerate() {
            let f = files[(i + offset) % files.len()];
            board[back * 8 + f] = Some(case(c));
        }
    }

    let mut s = String::new();
    for r in (0..8).rev() {
        let mut empty = 0;
        for f in 0..8 {
            match board[r * 8 + f] {
                Some(c) => {
                    if empty > 0 {
                        s.push_str(&empty.to_string());
                        empty = 0;
                    }
                    s.push(c);
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            s.push_str(&empty.to_string());
        }
        if r > 0 {
            s.push('/');
        }
    }
    s.push_str(if black_to_move { " b" } else { " w" });
    s
}

fn probe(table: &mut Table, fen: &str) -> (Score, Phase) {
    let pos = Position::from_fen(fen).unwrap();
    let e = table.probe(&pos);
    (e.imbalance(), e.game_phase())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn swapping_colors_negates_the_imbalance(w in arb_army(), b in arb_army()) {
        let mut table = Table::with_size(1024);
        let (s1, p1) = probe(&mut table, &fen(w, b, 0, false));
        let (s2, p2) = probe(&mut table, &fen(b, w, 0, false));

        prop_assert_eq!(s1, -s2);
        prop_assert_eq!(p1, p2);
    }

    #[test]
    fn same_army_on_both_sides_is_balanced(a in arb_army()) {
        let mut table = Table::with_size(64);
        let (s, _) = probe(&mut table, &fen(a, a, 0, false));
        prop_assert_eq!(s, Score::ZERO);
    }

    #[test]
    fn phase_stays_in_range(w in arb_army(), b in arb_army()) {
        let mut table = Table::with_size(64);
        let (_, phase) = probe(&mut table, &fen(w, b, 0, false));
        prop_assert!((PHASE_ENDGAME..=PHASE_MIDGAME).contains(&phase));
    }

    #[test]
    fn only_material_matters(
        w in arb_army(),
        b in arb_army(),
        offset in 0usize..7,
        black_to_move in any::<bool>(),
    ) {
        let mut t1 = Table::with_size(16);
        let mut t2 = Table::with_size(4096);
        let a = probe(&mut t1, &fen(w, b, 0, false));
        let c = probe(&mut t2, &fen(w, b, offset, black_to_move));
        prop_assert_eq!(a, c);
    }
}

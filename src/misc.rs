// SPDX-License-Identifier: GPL-3.0-or-later

/// xorshift64star generator (Sebastiano Vigna, 2014). Used to fill the
/// zobrist tables, so a fixed seed gives the same material keys on every
/// run and every thread.
#[derive(Clone, Copy)]
pub struct Prng(u64);

impl Prng {
    pub fn new(seed: u64) -> Prng {
        debug_assert!(seed != 0);
        Prng(seed)
    }

    pub fn rand64(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        u64::wrapping_mul(self.0, 2685821657736338717)
    }
}

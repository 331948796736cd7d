// SPDX-License-Identifier: GPL-3.0-or-later

//! Material evaluation for a chess engine: a per-thread table caching the
//! imbalance and game phase of each material configuration, and a registry
//! of endgame specialists for configurations general evaluation gets wrong.

pub mod bitbases;
pub mod bitboard;
pub mod config;
pub mod endgame;
pub mod material;
pub mod misc;
pub mod position;
pub mod types;

pub use config::{ConfigError, MaterialConfig};
pub use endgame::{endgames, Endgames, Signature, Specialist};
pub use material::{Entry, MaterialSource, Table};
pub use position::{FenError, Position};

/// Builds every process-wide table up front: bitboards, zobrist keys, the
/// KPK bitbase and the endgame registry. Calling it is optional since each
/// table is also built on first use.
pub fn init() {
    bitboard::init();
    position::zobrist::init();
    endgame::init();
}

//! Cascade resolution.
//!
//! Starting from the matches a swap produced, each round:
//! 1. records the identity of every tile on a matched cell (a set, so a
//!    tile matched on both axes or in two rounds is counted once),
//! 2. lets the surviving tiles of each column fall to the bottom in their
//!    original order and refills the vacated top cells with fresh tiles,
//! 3. re-detects matches on the settled board and repeats until none remain.
//!
//! Fresh refills can in principle keep producing matches forever. With four
//! or more colors this is practically impossible, and `max_cascade_rounds`
//! gives an optional hard stop.

use crate::board::{Board, Tile, TileFactory, TileId};
use crate::config::EngineConfig;
use crate::matches::{find_matches, matched_positions, Match};
use crate::position::Position;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// Outcome of resolving a cascade to a stable board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeResult {
    /// The settled board
    pub board: Board,
    /// Identities of every physical tile cleared, each exactly once
    pub cleared: BTreeSet<TileId>,
    /// Number of clear/gravity/refill rounds executed
    pub rounds: u32,
    /// True if the round cap stopped resolution before the board was stable
    pub capped: bool,
}

impl CascadeResult {
    /// Number of distinct tiles cleared
    pub fn tiles_cleared(&self) -> usize {
        self.cleared.len()
    }

    /// Points earned under a flat per-tile score
    pub fn points(&self, config: &EngineConfig) -> u64 {
        config.points_for(self.cleared.len())
    }
}

/// Resolve `seed_matches` on `board` until no match remains.
///
/// An empty seed falls back to detecting matches on `board` itself, so the
/// returned board is match-free whenever `capped` is false.
pub fn resolve<R: Rng + ?Sized>(
    board: Board,
    seed_matches: Vec<Match>,
    config: &EngineConfig,
    factory: &mut TileFactory,
    rng: &mut R,
) -> CascadeResult {
    let mut board = board;
    let mut cleared = BTreeSet::new();
    let mut rounds = 0u32;
    let mut capped = false;

    let mut round_matches = if seed_matches.is_empty() {
        find_matches(&board)
    } else {
        seed_matches
    };

    while !round_matches.is_empty() {
        if config.max_cascade_rounds.is_some_and(|cap| rounds >= cap) {
            warn!(rounds, "cascade round cap reached with matches remaining");
            capped = true;
            break;
        }

        let positions = matched_positions(&round_matches);
        let before = cleared.len();
        cleared.extend(positions.iter().map(|&pos| board.get(pos).id));
        rounds += 1;

        debug!(
            round = rounds,
            matches = round_matches.len(),
            cells = positions.len(),
            newly_cleared = cleared.len() - before,
            "cascade round"
        );

        apply_gravity_and_refill(&mut board, &positions, config.color_count, factory, rng);
        round_matches = find_matches(&board);
    }

    CascadeResult {
        board,
        cleared,
        rounds,
        capped,
    }
}

/// Drop surviving tiles to the bottom of each column and refill from the top.
///
/// Columns are independent. Within a column, tiles not on a cleared cell
/// keep their relative order; the vacated cells above them are filled top
/// down with newly minted tiles.
pub fn apply_gravity_and_refill<R: Rng + ?Sized>(
    board: &mut Board,
    cleared: &BTreeSet<Position>,
    color_count: usize,
    factory: &mut TileFactory,
    rng: &mut R,
) {
    let n = board.dimension();
    let cleared_cols: HashSet<usize> = cleared.iter().map(|p| p.col).collect();

    for col in 0..n {
        if !cleared_cols.contains(&col) {
            continue;
        }

        // Survivors, top to bottom
        let survivors: Vec<Tile> = (0..n)
            .map(|row| Position::new(row, col))
            .filter(|pos| !cleared.contains(pos))
            .map(|pos| *board.get(pos))
            .collect();

        let vacated = n - survivors.len();
        for row in 0..vacated {
            let tile = factory.create_random(rng, color_count);
            board.set(Position::new(row, col), tile);
        }
        for (offset, tile) in survivors.into_iter().enumerate() {
            board.set(Position::new(vacated + offset, col), tile);
        }
    }
}

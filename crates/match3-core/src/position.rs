//! Grid coordinates.
//!
//! Rows grow downward (row 0 is the top of the board, where refills enter)
//! and columns grow to the right.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A (row, column) cell address on the square grid
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// Create a new position
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether the position lies on a grid of side `dimension`
    pub const fn in_bounds(&self, dimension: usize) -> bool {
        self.row < dimension && self.col < dimension
    }

    /// Whether two positions share an edge (4-neighborhood)
    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }

    /// The in-bounds neighbors to the right and below.
    ///
    /// Enumerating only these two directions visits every adjacent pair
    /// exactly once.
    pub fn forward_neighbors(&self, dimension: usize) -> impl Iterator<Item = Position> {
        let right = Position::new(self.row, self.col + 1);
        let down = Position::new(self.row + 1, self.col);
        [right, down]
            .into_iter()
            .filter(move |p| p.in_bounds(dimension))
    }

    /// All in-bounds 4-neighbors
    pub fn neighbors(&self, dimension: usize) -> Vec<Position> {
        let mut out = Vec::with_capacity(4);
        if self.row > 0 {
            out.push(Position::new(self.row - 1, self.col));
        }
        if self.col > 0 {
            out.push(Position::new(self.row, self.col - 1));
        }
        out.extend(self.forward_neighbors(dimension));
        out
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

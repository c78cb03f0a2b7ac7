//! Match detection.
//!
//! Rows are scanned left to right and columns top to bottom for maximal
//! runs of three or more equal tokens. The two axes are independent: a cell
//! at the crossing of a row run and a column run appears in both matches.

use crate::board::{Board, TokenType};
use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Minimum run length that counts as a match
pub const MIN_RUN: usize = 3;

/// Orientation of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Row,
    Column,
}

/// A maximal same-token run of at least `MIN_RUN` cells along one axis
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    #[serde(rename = "type")]
    pub token: TokenType,
    pub axis: Axis,
    pub positions: Vec<Position>,
}

impl Match {
    /// Number of cells in the run
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Runs are never empty; provided for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }
}

/// Find every maximal run of three or more along rows and columns.
///
/// The result has no meaningful order; treat it as a set.
pub fn find_matches(board: &Board) -> Vec<Match> {
    let n = board.dimension();
    let mut matches = Vec::new();

    for row in 0..n {
        scan_line(board, Axis::Row, row, &mut matches);
    }
    for col in 0..n {
        scan_line(board, Axis::Column, col, &mut matches);
    }

    matches
}

/// Distinct positions covered by a set of matches
pub fn matched_positions(matches: &[Match]) -> BTreeSet<Position> {
    matches
        .iter()
        .flat_map(|m| m.positions.iter().copied())
        .collect()
}

/// Scan one row or column, pushing each maximal run.
///
/// The cursor jumps past the end of every run, so a shorter sub-run of a
/// reported run is never reported again.
fn scan_line(board: &Board, axis: Axis, line: usize, out: &mut Vec<Match>) {
    let n = board.dimension();
    let at = |i: usize| match axis {
        Axis::Row => Position::new(line, i),
        Axis::Column => Position::new(i, line),
    };

    let mut start = 0;
    while start < n {
        let token = board.token_at(at(start));
        let mut end = start + 1;
        while end < n && board.token_at(at(end)) == token {
            end += 1;
        }

        if end - start >= MIN_RUN {
            out.push(Match {
                token,
                axis,
                positions: (start..end).map(at).collect(),
            });
        }

        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TileFactory;

    fn board(rows: &[&str]) -> Board {
        let tokens: Vec<Vec<TokenType>> = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| match c {
                        'R' => TokenType::Red,
                        'B' => TokenType::Blue,
                        'G' => TokenType::Green,
                        'Y' => TokenType::Yellow,
                        'P' => TokenType::Purple,
                        _ => TokenType::Orange,
                    })
                    .collect()
            })
            .collect();
        Board::from_tokens(&tokens, &mut TileFactory::new())
    }

    #[test]
    fn test_no_matches() {
        let b = board(&["RGBY", "GBYR", "BYRG", "YRGB"]);
        assert!(find_matches(&b).is_empty());
    }

    #[test]
    fn test_row_run_of_three() {
        let b = board(&["RRRY", "GBYR", "BYRG", "YRGB"]);
        let matches = find_matches(&b);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].axis, Axis::Row);
        assert_eq!(matches[0].token, TokenType::Red);
        assert_eq!(
            matches[0].positions,
            vec![Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)]
        );
    }

    #[test]
    fn test_run_is_reported_once_at_full_length() {
        let b = board(&["GGGGG", "RBYRB", "BYRBY", "YRBYR", "RBYRB"]);
        let matches = find_matches(&b);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].len(), 5);
    }

    #[test]
    fn test_column_run() {
        let b = board(&["RGBY", "RBYG", "RYGB", "YGBR"]);
        let matches = find_matches(&b);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].axis, Axis::Column);
        assert!(matches[0].contains(Position::new(2, 0)));
        assert!(!matches[0].contains(Position::new(3, 0)));
    }

    #[test]
    fn test_crossing_runs_are_independent() {
        // An L/T shape: row 0 and column 1 share cell (0, 1)
        let b = board(&["RRRY", "GRYB", "BRGY", "YGBR"]);
        let matches = find_matches(&b);
        assert_eq!(matches.len(), 2);

        let shared = Position::new(0, 1);
        assert!(matches.iter().all(|m| m.contains(shared)));

        // Five cells are touched, one of them twice
        assert_eq!(matched_positions(&matches).len(), 5);
    }

    #[test]
    fn test_two_runs_in_one_row() {
        let b = board(&["RRRBBB", "GYGYGY", "YGYGYG", "GYGYGY", "YGYGYG", "GYGYGY"]);
        let matches = find_matches(&b);
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.axis == Axis::Row && m.len() == 3));
    }
}

//! Swap validation.
//!
//! A swap is attempted on a copy of the board. The caller's board is only
//! borrowed, so a rejected swap leaves no trace; an accepted swap hands back
//! the post-swap board for the caller to commit.

use crate::board::Board;
use crate::matches::{find_matches, Match};
use crate::position::Position;
use serde::{Deserialize, Serialize};

/// Why a swap was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapRejection {
    /// The two cells do not share an edge
    NotAdjacent,
    /// The exchange would not produce any run of three
    NoMatch,
}

/// Result of attempting a swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    Rejected(SwapRejection),
    Accepted {
        /// The board with the two tiles exchanged
        board: Board,
        /// Matches on the post-swap board; the seed for cascade resolution
        seed_matches: Vec<Match>,
    },
}

impl SwapOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SwapOutcome::Accepted { .. })
    }

    /// Seed matches of an accepted swap, empty when rejected
    pub fn seed_matches(&self) -> &[Match] {
        match self {
            SwapOutcome::Accepted { seed_matches, .. } => seed_matches,
            SwapOutcome::Rejected(_) => &[],
        }
    }
}

/// Validate and speculatively apply a swap between two cells.
pub fn attempt_swap(board: &Board, a: Position, b: Position) -> SwapOutcome {
    debug_assert!(a.in_bounds(board.dimension()) && b.in_bounds(board.dimension()));

    if !a.is_adjacent(&b) {
        return SwapOutcome::Rejected(SwapRejection::NotAdjacent);
    }

    let swapped = board.swapped(a, b);
    let seed_matches = find_matches(&swapped);

    if seed_matches.is_empty() {
        SwapOutcome::Rejected(SwapRejection::NoMatch)
    } else {
        SwapOutcome::Accepted {
            board: swapped,
            seed_matches,
        }
    }
}

/// Every adjacent swap on the board that would be accepted.
///
/// Each pair is listed once, in row-major order of its first cell, with the
/// second cell to the right of or below the first.
pub fn valid_swaps(board: &Board) -> Vec<(Position, Position)> {
    let n = board.dimension();
    board
        .positions()
        .flat_map(|p| p.forward_neighbors(n).map(move |q| (p, q)))
        .filter(|&(p, q)| !find_matches(&board.swapped(p, q)).is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{TileFactory, TokenType};

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
    fn test_non_adjacent_is_rejected() {
        let b = board(&["RRGB", "GBRY", "BYGR", "YGBR"]);
        let before = b.clone();

        let outcome = attempt_swap(&b, Position::new(0, 0), Position::new(1, 1));
        assert_eq!(outcome, SwapOutcome::Rejected(SwapRejection::NotAdjacent));

        let outcome = attempt_swap(&b, Position::new(0, 0), Position::new(0, 0));
        assert_eq!(outcome, SwapOutcome::Rejected(SwapRejection::NotAdjacent));

        assert_eq!(b, before);
    }

    #[test]
    fn test_swap_without_match_is_rejected() {
        let b = board(&["RGBY", "GBYR", "BYRG", "YRGB"]);
        let outcome = attempt_swap(&b, Position::new(0, 0), Position::new(0, 1));
        assert_eq!(outcome, SwapOutcome::Rejected(SwapRejection::NoMatch));
        assert!(outcome.seed_matches().is_empty());
    }

    #[test]
    fn test_swap_creating_match_is_accepted() {
        // Swapping (1,2) up into (0,2) completes R R R on row 0
        let b = board(&["RRGB", "GBRY", "BYGR", "YGBR"]);
        let a = Position::new(0, 2);
        let c = Position::new(1, 2);

        match attempt_swap(&b, a, c) {
            SwapOutcome::Accepted {
                board: swapped,
                seed_matches,
            } => {
                assert_eq!(swapped.get(a), b.get(c));
                assert_eq!(swapped.get(c), b.get(a));
                assert_eq!(seed_matches.len(), 1);
                assert_eq!(seed_matches[0].token, TokenType::Red);
            }
            other => panic!("expected accepted swap, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_swaps_lists_accepted_moves() {
        let b = board(&["RRGB", "GBRY", "BYGR", "YGBR"]);
        let swaps = valid_swaps(&b);
        assert!(swaps.contains(&(Position::new(0, 2), Position::new(1, 2))));
        for (p, q) in swaps {
            assert!(attempt_swap(&b, p, q).is_accepted());
        }
    }

    #[test]
    fn test_valid_swaps_empty_on_dead_board() {
        let b = board(&["RGBY", "GBYR", "BYRG", "YRGB"]);
        assert!(valid_swaps(&b).is_empty());
    }
}

//! Board representation: token colors, tiles with identities, and the grid.
//!
//! This module contains:
//! - `TokenType`: the six color categories
//! - `TileId` and `TileFactory`: per-session identity registry
//! - `Tile`: a token paired with its identity
//! - `Board`: the N x N row-major grid of tiles

use crate::position::Position;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Token color category. Purely a tag with no ordering semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl TokenType {
    /// Number of token categories the engine knows about
    pub const COUNT: usize = 6;

    /// All token types in index order
    pub const ALL: [TokenType; TokenType::COUNT] = [
        TokenType::Red,
        TokenType::Blue,
        TokenType::Green,
        TokenType::Yellow,
        TokenType::Purple,
        TokenType::Orange,
    ];

    /// Token type for a color index in `0..COUNT`
    pub fn from_index(index: usize) -> Self {
        debug_assert!(index < Self::COUNT, "color index {index} out of range");
        Self::ALL[index % Self::COUNT]
    }

    /// Color index of this token type
    pub fn index(self) -> usize {
        self as usize
    }

    /// Draw a token type uniformly from the first `color_count` categories
    pub fn random<R: Rng + ?Sized>(rng: &mut R, color_count: usize) -> Self {
        debug_assert!(
            (1..=Self::COUNT).contains(&color_count),
            "color count {color_count} out of range"
        );
        Self::from_index(rng.gen_range(0..color_count))
    }
}

/// Opaque tile identity, unique among all tiles created by one `TileFactory`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(u64);

impl TileId {
    /// Raw counter value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile-{}", self.0)
    }
}

/// A colored token occupying one cell, with its physical identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    #[serde(rename = "type")]
    pub token: TokenType,
    pub id: TileId,
}

/// Identity registry: the only place tiles are minted.
///
/// Owned by a session and threaded explicitly through generation and
/// cascade refills, so two sessions never share or collide on identities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileFactory {
    next_id: u64,
}

impl TileFactory {
    /// Create a registry whose first tile gets identity 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a tile of the given type with a fresh identity
    pub fn create(&mut self, token: TokenType) -> Tile {
        let id = TileId(self.next_id);
        self.next_id += 1;
        Tile { token, id }
    }

    /// Mint a tile with a uniformly drawn type
    pub fn create_random<R: Rng + ?Sized>(&mut self, rng: &mut R, color_count: usize) -> Tile {
        self.create(TokenType::random(rng, color_count))
    }

    /// Total number of tiles minted so far
    pub fn issued(&self) -> u64 {
        self.next_id
    }
}

/// The N x N grid, stored row-major.
///
/// Every cell holds exactly one tile; there is no empty-cell representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    dimension: usize,
    cells: Vec<Tile>,
}

impl Board {
    /// Build a board from row-major cells
    pub(crate) fn from_cells(dimension: usize, cells: Vec<Tile>) -> Self {
        debug_assert_eq!(cells.len(), dimension * dimension);
        Self { dimension, cells }
    }

    /// Build a board from explicit rows of token types, minting one tile per cell.
    ///
    /// Intended for scripted boards; panics if the rows are not square.
    pub fn from_tokens(rows: &[Vec<TokenType>], factory: &mut TileFactory) -> Self {
        let dimension = rows.len();
        assert!(
            rows.iter().all(|row| row.len() == dimension),
            "Board rows must form a square grid"
        );

        let cells = rows
            .iter()
            .flat_map(|row| row.iter())
            .map(|&token| factory.create(token))
            .collect();

        Self { dimension, cells }
    }

    /// Side length of the grid
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    fn index(&self, pos: Position) -> usize {
        debug_assert!(
            pos.in_bounds(self.dimension),
            "position {} outside {}x{} board",
            pos,
            self.dimension,
            self.dimension
        );
        pos.row * self.dimension + pos.col
    }

    /// The tile at a position
    pub fn get(&self, pos: Position) -> &Tile {
        &self.cells[self.index(pos)]
    }

    /// The token type at a position
    pub fn token_at(&self, pos: Position) -> TokenType {
        self.get(pos).token
    }

    pub(crate) fn set(&mut self, pos: Position, tile: Tile) {
        let idx = self.index(pos);
        self.cells[idx] = tile;
    }

    /// Exchange the whole tiles (type and identity) held by two cells
    pub(crate) fn swap(&mut self, a: Position, b: Position) {
        let (ia, ib) = (self.index(a), self.index(b));
        self.cells.swap(ia, ib);
    }

    /// Copy of this board with two cells' tiles exchanged
    pub fn swapped(&self, a: Position, b: Position) -> Board {
        let mut board = self.clone();
        board.swap(a, b);
        board
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let n = self.dimension;
        (0..n).flat_map(move |row| (0..n).map(move |col| Position::new(row, col)))
    }

    /// All tiles in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.cells.iter()
    }

    /// Rows of tiles, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.cells.chunks(self.dimension)
    }

    /// Identities of every live tile on the board
    pub fn ids(&self) -> HashSet<TileId> {
        self.cells.iter().map(|t| t.id).collect()
    }

    /// Whether a tile with this identity is on the board
    pub fn contains_id(&self, id: TileId) -> bool {
        self.cells.iter().any(|t| t.id == id)
    }

    /// Compact color grid, one letter per cell, rows separated by newlines
    pub fn to_ascii(&self) -> String {
        self.rows()
            .map(|row| {
                row.iter()
                    .map(|t| match t.token {
                        TokenType::Red => 'R',
                        TokenType::Blue => 'B',
                        TokenType::Green => 'G',
                        TokenType::Yellow => 'Y',
                        TokenType::Purple => 'P',
                        TokenType::Orange => 'O',
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tokens(rows: &[&str]) -> Vec<Vec<TokenType>> {
        rows.iter()
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
            .collect()
    }

    #[test]
    fn test_token_index_roundtrip() {
        for (i, token) in TokenType::ALL.iter().enumerate() {
            assert_eq!(token.index(), i);
            assert_eq!(TokenType::from_index(i), *token);
        }
    }

    #[test]
    fn test_random_token_respects_color_count() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert!(TokenType::random(&mut rng, 4).index() < 4);
        }
    }

    #[test]
    fn test_factory_identities_are_unique_and_monotonic() {
        let mut factory = TileFactory::new();
        let a = factory.create(TokenType::Red);
        let b = factory.create(TokenType::Red);
        assert_ne!(a.id, b.id);
        assert!(a.id < b.id);
        assert_eq!(factory.issued(), 2);
        assert_eq!(a.id.to_string(), "tile-0");
    }

    #[test]
    fn test_independent_factories_do_not_share_state() {
        let mut first = TileFactory::new();
        let mut second = TileFactory::new();
        first.create(TokenType::Blue);
        first.create(TokenType::Blue);
        assert_eq!(second.create(TokenType::Blue).id.raw(), 0);
        assert_eq!(first.issued(), 2);
    }

    #[test]
    fn test_from_tokens_and_ascii() {
        let mut factory = TileFactory::new();
        let board = Board::from_tokens(&tokens(&["RGB", "YPO", "BRG"]), &mut factory);

        assert_eq!(board.dimension(), 3);
        assert_eq!(board.token_at(Position::new(1, 2)), TokenType::Orange);
        assert_eq!(board.to_ascii(), "RGB\nYPO\nBRG");
        assert_eq!(board.ids().len(), 9);
    }

    #[test]
    fn test_swap_moves_whole_tiles() {
        let mut factory = TileFactory::new();
        let board = Board::from_tokens(&tokens(&["RGB", "YPO", "BRG"]), &mut factory);
        let a = Position::new(0, 0);
        let b = Position::new(0, 1);

        let swapped = board.swapped(a, b);
        assert_eq!(swapped.get(a), board.get(b));
        assert_eq!(swapped.get(b), board.get(a));

        // Swapping is its own inverse
        assert_eq!(swapped.swapped(b, a), board);
    }

    #[test]
    #[should_panic(expected = "square grid")]
    fn test_from_tokens_rejects_ragged_rows() {
        let mut factory = TileFactory::new();
        Board::from_tokens(&tokens(&["RG", "YPO", "BRG"]), &mut factory);
    }
}

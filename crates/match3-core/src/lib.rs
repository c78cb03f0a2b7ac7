//! Match-3 - a deterministic tile-matching puzzle engine
//!
//! This crate provides the core game logic, including:
//! - Board generation without pre-existing matches
//! - Detection of maximal same-color runs along rows and columns
//! - Swap validation against the post-swap board
//! - Multi-round cascade resolution with exact-once tile accounting
//! - A session state machine that locks input while a cascade is pending
//!
//! # Architecture
//!
//! Every board transformation is a synchronous function of its inputs. The
//! session splits a move into a commit step and a resolution step so that a
//! host can insert presentation time between them. It can be compiled to:
//! - Native Rust for server-side session hosting
//! - WebAssembly for in-browser play
//!
//! # Modules
//!
//! - [`position`]: Grid coordinates and adjacency
//! - [`board`]: Tokens, tiles, identities and the grid
//! - [`generator`]: Initial board generation
//! - [`matches`]: Match detection
//! - [`swap`]: Swap validation and move enumeration
//! - [`cascade`]: Clear/gravity/refill resolution
//! - [`session`]: Input-gating state machine
//! - [`config`]: Engine configuration

pub mod actions;
pub mod board;
pub mod cascade;
pub mod config;
pub mod generator;
pub mod matches;
pub mod position;
pub mod session;
pub mod swap;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{SessionCommand, SessionEvent};
pub use board::{Board, Tile, TileFactory, TileId, TokenType};
pub use cascade::{apply_gravity_and_refill, resolve, CascadeResult};
pub use config::{ConfigError, EngineConfig};
pub use generator::initialize;
pub use matches::{find_matches, matched_positions, Axis, Match};
pub use position::Position;
pub use session::{
    CascadeSummary, GameSession, ResolutionOutcome, ResolutionTicket, SelectOutcome,
    SessionSnapshot, SessionState,
};
pub use swap::{attempt_swap, valid_swaps, SwapOutcome, SwapRejection};

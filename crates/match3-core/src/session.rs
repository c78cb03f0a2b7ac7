//! Game session state machine.
//!
//! A session owns the board, score, identity registry and random source, and
//! gates player input through three states:
//!
//! - `Idle`: nothing selected, input accepted
//! - `Selected(p)`: one cell highlighted, input accepted
//! - `Resolving(ticket)`: a swap was committed and its cascade is pending;
//!   every selection is ignored until the matching ticket is completed
//!
//! Resolution is split in two so the host can impose presentation time
//! between the swap and the cascade: `select` commits the post-swap board and
//! hands out a `ResolutionTicket`, and `complete_resolution` later runs the
//! cascade. Tickets are never reused, and `restart` drops the pending one, so
//! a completion scheduled before a restart cannot touch the new game.
//!
//! All checks read the session's live state at the moment a command is
//! handled. Hosts must route every command through one `&mut GameSession`
//! rather than acting on copies of earlier state.

use crate::actions::{SessionCommand, SessionEvent};
use crate::board::{Board, Tile, TileFactory};
use crate::cascade::{resolve, CascadeResult};
use crate::config::{ConfigError, EngineConfig};
use crate::generator::initialize;
use crate::matches::Match;
use crate::position::Position;
use crate::swap::{attempt_swap, valid_swaps, SwapOutcome, SwapRejection};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Handle identifying one committed swap awaiting its cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolutionTicket(u64);

impl fmt::Display for ResolutionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Input-gating state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Selected(Position),
    Resolving(ResolutionTicket),
}

/// Result of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The cell is now selected
    Selected(Position),
    /// The selected cell was clicked again and deselected
    Deselected(Position),
    /// The swap was refused and the selection dropped
    Rejected {
        from: Position,
        to: Position,
        reason: SwapRejection,
    },
    /// The swap was committed; the cascade waits on `ticket`
    Committed {
        from: Position,
        to: Position,
        ticket: ResolutionTicket,
        seed_matches: usize,
    },
    /// Input is locked while a resolution is pending
    Ignored,
}

/// Summary of an applied cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeSummary {
    pub tiles_cleared: usize,
    pub points: u64,
    pub rounds: u32,
    pub capped: bool,
}

/// Result of completing a resolution ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Applied(CascadeSummary),
    /// The ticket was superseded (by a restart) or already completed
    Stale,
}

/// Read-only view handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub dimension: usize,
    /// Rows of `{type, id}` cells, top to bottom
    pub cells: Vec<Vec<Tile>>,
    pub selection: Option<Position>,
    pub locked: bool,
    pub score: u64,
    pub moves: u32,
    pub tiles_cleared: u64,
}

/// One player's game
#[derive(Debug, Clone)]
pub struct GameSession {
    config: EngineConfig,
    board: Board,
    state: SessionState,
    score: u64,
    moves: u32,
    tiles_cleared: u64,
    factory: TileFactory,
    rng: StdRng,
    /// Seed matches of the committed swap while `Resolving`
    pending_seed: Vec<Match>,
    next_ticket: u64,
}

impl GameSession {
    /// Start a session seeded from system entropy
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Start a session with a fixed seed for deterministic replay
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, mut rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut factory = TileFactory::new();
        let board = initialize(&config, &mut factory, &mut rng);
        Ok(Self::from_parts(config, board, factory, rng))
    }

    /// Start a session on a prepared board.
    ///
    /// `factory` must be the registry that minted the board's tiles so that
    /// refills keep identities unique.
    pub fn with_board(
        config: EngineConfig,
        board: Board,
        factory: TileFactory,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        assert_eq!(
            board.dimension(),
            config.dimension,
            "Board dimension must match configuration"
        );
        Ok(Self::from_parts(
            config,
            board,
            factory,
            StdRng::seed_from_u64(seed),
        ))
    }

    fn from_parts(config: EngineConfig, board: Board, factory: TileFactory, rng: StdRng) -> Self {
        Self {
            config,
            board,
            state: SessionState::Idle,
            score: 0,
            moves: 0,
            tiles_cleared: 0,
            factory,
            rng,
            pending_seed: Vec::new(),
            next_ticket: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The committed board. While resolving this is the post-swap board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn selection(&self) -> Option<Position> {
        match self.state {
            SessionState::Selected(p) => Some(p),
            _ => None,
        }
    }

    /// Whether input is locked by a pending resolution
    pub fn is_locked(&self) -> bool {
        matches!(self.state, SessionState::Resolving(_))
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Accepted swaps since the last restart
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Physical tiles cleared since the last restart
    pub fn tiles_cleared(&self) -> u64 {
        self.tiles_cleared
    }

    /// Handle a click on a cell
    pub fn select(&mut self, pos: Position) -> SelectOutcome {
        debug_assert!(
            pos.in_bounds(self.config.dimension),
            "selection {} outside the board",
            pos
        );

        match self.state {
            SessionState::Resolving(ticket) => {
                debug!(%pos, %ticket, "input ignored while resolving");
                SelectOutcome::Ignored
            }
            SessionState::Idle => {
                self.state = SessionState::Selected(pos);
                SelectOutcome::Selected(pos)
            }
            SessionState::Selected(current) if current == pos => {
                self.state = SessionState::Idle;
                SelectOutcome::Deselected(pos)
            }
            SessionState::Selected(from) => match attempt_swap(&self.board, from, pos) {
                SwapOutcome::Rejected(reason) => {
                    debug!(%from, to = %pos, ?reason, "swap rejected");
                    self.state = SessionState::Idle;
                    SelectOutcome::Rejected {
                        from,
                        to: pos,
                        reason,
                    }
                }
                SwapOutcome::Accepted {
                    board,
                    seed_matches,
                } => {
                    let ticket = ResolutionTicket(self.next_ticket);
                    self.next_ticket += 1;

                    let count = seed_matches.len();
                    self.board = board;
                    self.pending_seed = seed_matches;
                    self.moves += 1;
                    self.state = SessionState::Resolving(ticket);

                    debug!(%from, to = %pos, %ticket, seed_matches = count, "swap committed");
                    SelectOutcome::Committed {
                        from,
                        to: pos,
                        ticket,
                        seed_matches: count,
                    }
                }
            },
        }
    }

    /// Run the cascade for a committed swap and unlock input.
    ///
    /// Only the ticket of the currently pending resolution is honored;
    /// anything else is reported as stale and changes nothing.
    pub fn complete_resolution(&mut self, ticket: ResolutionTicket) -> ResolutionOutcome {
        if self.state != SessionState::Resolving(ticket) {
            debug!(%ticket, state = ?self.state, "dropping stale resolution");
            return ResolutionOutcome::Stale;
        }

        let seed = std::mem::take(&mut self.pending_seed);
        let CascadeResult {
            board,
            cleared,
            rounds,
            capped,
        } = resolve(
            self.board.clone(),
            seed,
            &self.config,
            &mut self.factory,
            &mut self.rng,
        );

        let points = self.config.points_for(cleared.len());
        self.board = board;
        self.score += points;
        self.tiles_cleared += cleared.len() as u64;
        self.state = SessionState::Idle;

        if capped {
            warn!(
                %ticket,
                rounds,
                "cascade capped; committed board still holds a match"
            );
        }

        debug!(
            %ticket,
            tiles = cleared.len(),
            points,
            rounds,
            score = self.score,
            "cascade applied"
        );

        ResolutionOutcome::Applied(CascadeSummary {
            tiles_cleared: cleared.len(),
            points,
            rounds,
            capped,
        })
    }

    /// Deal a new board and reset score and statistics.
    ///
    /// Allowed from any state. A pending resolution is superseded: its
    /// ticket will be reported stale when it eventually completes.
    pub fn restart(&mut self) {
        if let SessionState::Resolving(ticket) = self.state {
            debug!(%ticket, "restart supersedes pending resolution");
        }

        self.board = initialize(&self.config, &mut self.factory, &mut self.rng);
        self.state = SessionState::Idle;
        self.pending_seed.clear();
        self.score = 0;
        self.moves = 0;
        self.tiles_cleared = 0;
    }

    /// Apply a serialized command and report what happened
    pub fn apply(&mut self, command: SessionCommand) -> Vec<SessionEvent> {
        match command {
            SessionCommand::Select(pos) => {
                let event = match self.select(pos) {
                    SelectOutcome::Selected(position) => SessionEvent::TileSelected { position },
                    SelectOutcome::Deselected(position) => {
                        SessionEvent::SelectionCleared { position }
                    }
                    SelectOutcome::Rejected { from, to, reason } => {
                        SessionEvent::SwapRejected { from, to, reason }
                    }
                    SelectOutcome::Committed {
                        from,
                        to,
                        ticket,
                        seed_matches,
                    } => SessionEvent::SwapCommitted {
                        from,
                        to,
                        ticket,
                        seed_matches,
                    },
                    SelectOutcome::Ignored => SessionEvent::InputIgnored { position: pos },
                };
                vec![event]
            }

            SessionCommand::Restart => {
                self.restart();
                vec![SessionEvent::Restarted]
            }

            SessionCommand::CompleteResolution(ticket) => match self.complete_resolution(ticket) {
                ResolutionOutcome::Applied(summary) => vec![SessionEvent::CascadeResolved {
                    tiles_cleared: summary.tiles_cleared,
                    points: summary.points,
                    rounds: summary.rounds,
                    score: self.score,
                }],
                ResolutionOutcome::Stale => vec![SessionEvent::StaleResolutionDropped { ticket }],
            },
        }
    }

    /// Every swap the player could make right now
    pub fn valid_moves(&self) -> Vec<(Position, Position)> {
        if self.is_locked() {
            return Vec::new();
        }
        valid_swaps(&self.board)
    }

    /// One swap the player could make right now, if any
    pub fn hint(&self) -> Option<(Position, Position)> {
        self.valid_moves().into_iter().next()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            dimension: self.board.dimension(),
            cells: self.board.rows().map(|row| row.to_vec()).collect(),
            selection: self.selection(),
            locked: self.is_locked(),
            score: self.score,
            moves: self.moves,
            tiles_cleared: self.tiles_cleared,
        }
    }
}

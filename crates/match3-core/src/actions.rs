//! Commands a presentation layer can issue and the events they produce.

use crate::position::Position;
use crate::session::ResolutionTicket;
use crate::swap::SwapRejection;
use serde::{Deserialize, Serialize};

/// Serialized input to a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionCommand {
    /// The player clicked or tapped a cell
    Select(Position),
    /// Throw away the current game and deal a new board
    Restart,
    /// The presentation delay for a committed swap has elapsed
    CompleteResolution(ResolutionTicket),
}

/// Observable effects of a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A cell became the current selection
    TileSelected { position: Position },

    /// The selection was dropped without a swap
    SelectionCleared { position: Position },

    /// A swap was refused; the board is unchanged
    SwapRejected {
        from: Position,
        to: Position,
        reason: SwapRejection,
    },

    /// A swap was accepted and the post-swap board committed; input is
    /// locked until the ticket is completed
    SwapCommitted {
        from: Position,
        to: Position,
        ticket: ResolutionTicket,
        seed_matches: usize,
    },

    /// The cascade for a committed swap was applied and input unlocked
    CascadeResolved {
        tiles_cleared: usize,
        points: u64,
        rounds: u32,
        score: u64,
    },

    /// Input arrived while a resolution was pending and was dropped
    InputIgnored { position: Position },

    /// A new board was dealt and the score reset
    Restarted,

    /// A resolution completed for a ticket that is no longer current
    StaleResolutionDropped { ticket: ResolutionTicket },
}

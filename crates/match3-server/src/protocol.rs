//! WebSocket protocol messages for the match-3 host.

use match3_core::{Position, SessionEvent, SessionSnapshot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Start a fresh game on this connection
    NewGame { seed: Option<u64> },

    /// Reattach to a game left by an earlier connection
    ResumeGame { session_id: Uuid },

    /// Click a cell
    Select { row: usize, col: usize },

    /// Deal a new board and reset the score
    Restart,

    /// Ask for a suggested move
    Hint,

    /// Discard the game entirely
    EndGame,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// A game is attached to this connection
    Welcome { session_id: Uuid },

    /// Current board, selection, lock and score
    Snapshot { snapshot: SessionSnapshot },

    /// What a command did
    Events { events: Vec<SessionEvent> },

    /// Suggested move, if the board has one
    Hint { swap: Option<(Position, Position)> },

    /// The game was discarded
    GameEnded,

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

//! Per-game session actor.
//!
//! Each game runs on its own task that owns the `GameSession` and drains a
//! command queue one message at a time. Player input, restarts and the
//! delayed cascade completion all travel through the same queue, so every
//! command sees the session as it is when the command is handled, never a
//! copy captured when it was sent.
//!
//! A game with no client attached stays alive for a resume window and ends
//! itself once that window passes without any command.

use match3_core::{
    EngineConfig, GameSession, Position, SessionCommand, SessionEvent, SessionSnapshot,
};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info};
use uuid::Uuid;

use crate::protocol::ServerMessage;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("Session has shut down")]
    SessionClosed,

    #[error("Cell ({row}, {col}) is off the board")]
    OffBoard { row: usize, col: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] match3_core::ConfigError),
}

/// Messages accepted by a session actor
#[derive(Debug)]
enum Command {
    Attach(mpsc::UnboundedSender<ServerMessage>),
    /// Detach only if the given client is still the attached one
    Detach(mpsc::UnboundedSender<ServerMessage>),
    Apply(SessionCommand),
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Hint(oneshot::Sender<Option<(Position, Position)>>),
    Shutdown,
}

/// Timers governing a session actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimers {
    /// Pause between a committed swap and its cascade
    pub resolve_delay: Duration,
    /// How long the game waits for a client to resume it
    pub idle_ttl: Duration,
}

/// Cloneable handle to a running session actor.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    dimension: usize,
    tx: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    /// Start a new game on its own task. `on_exit` runs once the actor has
    /// stopped, whether it was shut down or expired.
    pub fn spawn<F>(
        id: Uuid,
        config: EngineConfig,
        timers: SessionTimers,
        seed: Option<u64>,
        on_exit: F,
    ) -> Result<Self, SessionError>
    where
        F: FnOnce(Uuid) + Send + 'static,
    {
        let dimension = config.dimension;
        let session = match seed {
            Some(seed) => GameSession::with_seed(config, seed)?,
            None => GameSession::new(config)?,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let actor = SessionActor {
            id,
            session,
            timers,
            outbound: None,
            tx: tx.clone(),
            rx,
        };
        tokio::spawn(async move {
            actor.run().await;
            on_exit(id);
        });

        info!("Session {} started", id);
        Ok(Self { id, dimension, tx })
    }

    fn send(&self, command: Command) -> Result<(), SessionError> {
        self.tx.send(command).map_err(|_| SessionError::SessionClosed)
    }

    /// Route pushed messages for this session to `outbound`, replacing any
    /// previous client. A snapshot is pushed immediately.
    pub fn attach(&self, outbound: mpsc::UnboundedSender<ServerMessage>) -> Result<(), SessionError> {
        self.send(Command::Attach(outbound))
    }

    /// Stop pushing messages to `outbound`; the game keeps running and can
    /// be resumed. Has no effect if another client has attached since.
    pub fn detach(
        &self,
        outbound: &mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<(), SessionError> {
        self.send(Command::Detach(outbound.clone()))
    }

    /// Click a cell. Coordinates come from the network and are checked here.
    pub fn select(&self, row: usize, col: usize) -> Result<(), SessionError> {
        let pos = Position::new(row, col);
        if !pos.in_bounds(self.dimension) {
            return Err(SessionError::OffBoard { row, col });
        }
        self.send(Command::Apply(SessionCommand::Select(pos)))
    }

    pub fn restart(&self) -> Result<(), SessionError> {
        self.send(Command::Apply(SessionCommand::Restart))
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        rx.await.map_err(|_| SessionError::SessionClosed)
    }

    pub async fn hint(&self) -> Result<Option<(Position, Position)>, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Hint(reply))?;
        rx.await.map_err(|_| SessionError::SessionClosed)
    }

    pub fn shutdown(&self) -> Result<(), SessionError> {
        self.send(Command::Shutdown)
    }
}

struct SessionActor {
    id: Uuid,
    session: GameSession,
    timers: SessionTimers,
    outbound: Option<mpsc::UnboundedSender<ServerMessage>>,
    /// Sender into our own queue, for delayed resolution
    tx: mpsc::UnboundedSender<Command>,
    rx: mpsc::UnboundedReceiver<Command>,
}

impl SessionActor {
    async fn run(mut self) {
        loop {
            let next = if self.outbound.is_some() {
                self.rx.recv().await
            } else {
                match timeout(self.timers.idle_ttl, self.rx.recv()).await {
                    Ok(next) => next,
                    Err(_) => {
                        info!(
                            "Session {} expired after {:?} without a client",
                            self.id, self.timers.idle_ttl
                        );
                        break;
                    }
                }
            };
            let Some(command) = next else { break };

            match command {
                Command::Attach(outbound) => {
                    self.outbound = Some(outbound);
                    self.push(ServerMessage::Welcome {
                        session_id: self.id,
                    });
                    self.push_snapshot();
                }
                Command::Detach(outbound) => {
                    if self
                        .outbound
                        .as_ref()
                        .is_some_and(|current| current.same_channel(&outbound))
                    {
                        self.outbound = None;
                    }
                }
                Command::Apply(command) => {
                    let events = self.session.apply(command);
                    self.schedule_resolutions(&events);
                    self.push(ServerMessage::Events { events });
                    self.push_snapshot();
                }
                Command::Snapshot(reply) => {
                    let _ = reply.send(self.session.snapshot());
                }
                Command::Hint(reply) => {
                    let _ = reply.send(self.session.hint());
                }
                Command::Shutdown => break,
            }
        }

        self.push(ServerMessage::GameEnded);
        info!("Session {} ended", self.id);
    }

    /// Enqueue the cascade completion for every committed swap after the
    /// presentation delay. The completion goes through the queue like any
    /// other command and is dropped as stale if a restart got there first.
    fn schedule_resolutions(&self, events: &[SessionEvent]) {
        for event in events {
            if let SessionEvent::SwapCommitted { ticket, .. } = event {
                let ticket = *ticket;
                let tx = self.tx.clone();
                let delay = self.timers.resolve_delay;
                debug!(session = %self.id, %ticket, ?delay, "scheduling resolution");

                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(Command::Apply(SessionCommand::CompleteResolution(ticket)));
                });
            }
        }
    }

    fn push(&mut self, msg: ServerMessage) {
        let delivered = match &self.outbound {
            Some(outbound) => outbound.send(msg).is_ok(),
            None => return,
        };
        if !delivered {
            debug!(session = %self.id, "client gone, detaching");
            self.outbound = None;
        }
    }

    fn push_snapshot(&mut self) {
        let snapshot = self.session.snapshot();
        self.push(ServerMessage::Snapshot { snapshot });
    }
}

//! WebSocket server and connection handling.

use crate::config::ServerConfig;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{SessionError, SessionHandle, SessionTimers};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// All live games, attached to a connection or waiting to be resumed.
    /// A game removes itself when its actor stops.
    pub sessions: Arc<DashMap<Uuid, SessionHandle>>,
    pub config: ServerConfig,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Start a new game and register it.
    pub fn create_session(&self, seed: Option<u64>) -> Result<SessionHandle, SessionError> {
        let id = Uuid::new_v4();
        let timers = SessionTimers {
            resolve_delay: self.config.resolve_delay,
            idle_ttl: self.config.session_idle_ttl,
        };
        let sessions = Arc::clone(&self.sessions);
        let handle = SessionHandle::spawn(
            id,
            self.config.engine.clone(),
            timers,
            seed,
            move |id| {
                sessions.remove(&id);
            },
        )?;
        self.sessions.insert(id, handle.clone());
        Ok(handle)
    }

    /// Look up a live game by ID.
    pub fn find_session(&self, id: Uuid) -> Result<SessionHandle, SessionError> {
        self.sessions
            .get(&id)
            .map(|h| h.clone())
            .ok_or(SessionError::SessionNotFound)
    }

    /// Stop a game and forget it.
    pub fn end_session(&self, id: Uuid) {
        if let Some((_, handle)) = self.sessions.remove(&id) {
            let _ = handle.shutdown();
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Run the WebSocket server.
pub async fn run_server(state: Arc<ServerState>) -> anyhow::Result<()> {
    let addr = state.config.addr;
    let listener = TcpListener::bind(addr).await?;
    info!("Match-3 server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    let mut connection = Connection {
        current: None,
        outbound: tx,
    };

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => connection.handle_message(client_msg, &state).await,
                Err(e) => {
                    warn!("Invalid message from {}: {}", addr, text);
                    connection.send(ServerMessage::Error {
                        message: format!("Invalid message: {}", e),
                    });
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", addr);
                break;
            }
            Ok(Message::Ping(_)) => {
                connection.send(ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", addr, e);
                break;
            }
            _ => {}
        }
    }

    connection.close();
    send_task.abort();

    info!(
        live_sessions = state.session_count(),
        "Connection closed for {}",
        addr
    );
    Ok(())
}

/// Per-connection state: the game currently attached, if any.
pub struct Connection {
    pub current: Option<SessionHandle>,
    pub outbound: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    fn send(&self, msg: ServerMessage) {
        let _ = self.outbound.send(msg);
    }

    fn send_error(&self, e: SessionError) {
        self.send(ServerMessage::Error {
            message: e.to_string(),
        });
    }

    /// Leave the attached game running for a later `ResumeGame`.
    pub fn close(&mut self) {
        if let Some(handle) = self.current.take() {
            let _ = handle.detach(&self.outbound);
        }
    }

    fn game(&self) -> Option<&SessionHandle> {
        if self.current.is_none() {
            self.send(ServerMessage::Error {
                message: "No game in progress".to_string(),
            });
        }
        self.current.as_ref()
    }

    /// Handle a client message.
    pub async fn handle_message(&mut self, msg: ClientMessage, state: &ServerState) {
        match msg {
            ClientMessage::NewGame { seed } => {
                if let Some(previous) = self.current.take() {
                    state.end_session(previous.id);
                }
                match state.create_session(seed) {
                    Ok(handle) => match handle.attach(self.outbound.clone()) {
                        Ok(()) => self.current = Some(handle),
                        Err(e) => self.send_error(e),
                    },
                    Err(e) => self.send_error(e),
                }
            }

            ClientMessage::ResumeGame { session_id } => {
                match state.find_session(session_id) {
                    Ok(handle) => {
                        if let Some(previous) = self.current.take() {
                            if previous.id != session_id {
                                let _ = previous.detach(&self.outbound);
                            }
                        }
                        match handle.attach(self.outbound.clone()) {
                            Ok(()) => self.current = Some(handle),
                            Err(e) => {
                                // The actor is gone; drop the stale registration
                                state.sessions.remove(&session_id);
                                self.send_error(e);
                            }
                        }
                    }
                    Err(e) => self.send_error(e),
                }
            }

            ClientMessage::Select { row, col } => {
                if let Some(game) = self.game() {
                    if let Err(e) = game.select(row, col) {
                        self.send_error(e);
                    }
                }
            }

            ClientMessage::Restart => {
                if let Some(game) = self.game() {
                    if let Err(e) = game.restart() {
                        self.send_error(e);
                    }
                }
            }

            ClientMessage::Hint => {
                if let Some(game) = self.game() {
                    match game.hint().await {
                        Ok(swap) => self.send(ServerMessage::Hint { swap }),
                        Err(e) => self.send_error(e),
                    }
                }
            }

            ClientMessage::EndGame => {
                if let Some(game) = self.current.take() {
                    state.end_session(game.id);
                } else {
                    self.send(ServerMessage::Error {
                        message: "No game in progress".to_string(),
                    });
                }
            }

            ClientMessage::Ping => {
                self.send(ServerMessage::Pong);
            }
        }
    }
}

//! Connection Gateway
//!
//! WebSocket boundary of the maze server. Translates inbound protocol
//! events into registry/session operations and fans results out: direct
//! replies go only to the originating connection, room broadcasts go to
//! every connection associated with the game name (both participants and
//! all spectators).
//!
//! One task per connection; all mutation of a given session goes through
//! its mutex, so simultaneous moves resolve in arrival order and the
//! loser of the race gets `not_your_turn` instead of corrupt state.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::game::session::{ConnectionId, GameError, GameSession, GameStatus, MoveOutcome};
use crate::network::protocol::{
    ClientMessage, CreateGame, ErrorCode, GameOver, GameStarted, GameUpdate, JoinGame, MakeMove,
    ReconnectGame, ServerError, ServerMessage, SpectateGame,
};
use crate::network::registry::GameRegistry;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4000".parse().expect("static addr"),
            max_connections: 1000,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Room membership: which live connections receive broadcasts for a game
/// name. Kept apart from session state so the game layer stays pure.
struct Rooms {
    inner: RwLock<HashMap<String, HashMap<ConnectionId, mpsc::Sender<ServerMessage>>>>,
}

impl Rooms {
    fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    async fn join(&self, room: &str, conn: ConnectionId, sender: mpsc::Sender<ServerMessage>) {
        let mut rooms = self.inner.write().await;
        rooms.entry(room.to_string()).or_default().insert(conn, sender);
    }

    /// Drop a connection from every room it is in. Called on disconnect.
    async fn remove_conn(&self, conn: ConnectionId) {
        let mut rooms = self.inner.write().await;
        for members in rooms.values_mut() {
            members.remove(&conn);
        }
        rooms.retain(|_, members| !members.is_empty());
    }

    /// Drop a whole room. Called when the game ends.
    async fn remove_room(&self, room: &str) {
        let mut rooms = self.inner.write().await;
        rooms.remove(room);
    }

    /// Send to every connection in the room.
    async fn broadcast(&self, room: &str, message: ServerMessage) {
        let rooms = self.inner.read().await;
        if let Some(members) = rooms.get(room) {
            for sender in members.values() {
                let _ = sender.send(message.clone()).await;
            }
        }
    }

    /// Send to one connection in the room, if it is present.
    async fn send_to(&self, room: &str, conn: ConnectionId, message: ServerMessage) {
        let rooms = self.inner.read().await;
        if let Some(sender) = rooms.get(room).and_then(|members| members.get(&conn)) {
            let _ = sender.send(message).await;
        }
    }

    #[cfg(test)]
    async fn member_count(&self, room: &str) -> usize {
        let rooms = self.inner.read().await;
        rooms.get(room).map(|members| members.len()).unwrap_or(0)
    }
}

/// The gateway server.
pub struct GatewayServer {
    /// Server configuration.
    config: ServerConfig,
    /// Active game sessions.
    registry: Arc<GameRegistry>,
    /// Broadcast membership per game name.
    rooms: Arc<Rooms>,
    /// Live connection count.
    connections: Arc<AtomicUsize>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl GatewayServer {
    /// Create a new gateway with an empty registry.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            registry: Arc::new(GameRegistry::new()),
            rooms: Arc::new(Rooms::new()),
            connections: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
        }
    }

    /// Run the accept loop until shutdown.
    pub async fn run(&self) -> Result<(), GatewayError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!(
            "Labyrinth gateway v{} listening on {}",
            self.config.version, self.config.bind_addr
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            if self.connections.load(Ordering::Relaxed) >= self.config.max_connections {
                                warn!("Connection limit reached, rejecting {}", addr);
                                continue;
                            }
                            debug!("New connection from {}", addr);
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle a new WebSocket connection on its own task.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let registry = self.registry.clone();
        let rooms = self.rooms.clone();
        let connections = self.connections.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake failed for {}: {}", addr, e);
                    return;
                }
            };

            let conn: ConnectionId = Uuid::new_v4();
            connections.fetch_add(1, Ordering::Relaxed);
            debug!("Connection {} bound to {}", addr, conn);

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(64);

            // Outbound writer task
            let sender_task = tokio::spawn(async move {
                while let Some(msg) = msg_rx.recv().await {
                    let text = match msg.to_json() {
                        Ok(t) => t,
                        Err(e) => {
                            error!("Failed to serialize message: {}", e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            });

            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                let client_msg = match ClientMessage::from_json(&text) {
                                    Ok(m) => m,
                                    Err(e) => {
                                        debug!("Invalid message from {}: {}", conn, e);
                                        let _ = msg_tx.send(ServerMessage::Error(ServerError {
                                            code: ErrorCode::InvalidMessage,
                                            message: "Invalid message format".to_string(),
                                        })).await;
                                        continue;
                                    }
                                };

                                Self::handle_client_message(
                                    conn,
                                    client_msg,
                                    &registry,
                                    &rooms,
                                    &msg_tx,
                                ).await;
                            }
                            Some(Ok(Message::Ping(payload))) => {
                                // tungstenite answers pings at the protocol
                                // level; nothing to do beyond noting it.
                                debug!("Ping from {} ({} bytes)", conn, payload.len());
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Client {} disconnected", conn);
                                break;
                            }
                            Some(Err(e)) => {
                                warn!("WebSocket error for {}: {}", conn, e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }

            // A drop rolls back nothing: session state is untouched and
            // the slot can be reclaimed later via reconnect_game. Only
            // delivery to this connection stops.
            sender_task.abort();
            rooms.remove_conn(conn).await;
            connections.fetch_sub(1, Ordering::Relaxed);
            debug!("Connection {} cleaned up", conn);
        });
    }

    /// Route one client message to its handler.
    async fn handle_client_message(
        conn: ConnectionId,
        msg: ClientMessage,
        registry: &Arc<GameRegistry>,
        rooms: &Arc<Rooms>,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        match msg {
            ClientMessage::CreateGame(create) => {
                Self::handle_create(conn, create, registry, rooms, sender).await;
            }
            ClientMessage::JoinGame(join) => {
                Self::handle_join(conn, join, registry, rooms, sender).await;
            }
            ClientMessage::ReconnectGame(reconnect) => {
                Self::handle_reconnect(conn, reconnect, registry, rooms, sender).await;
            }
            ClientMessage::SpectateGame(spectate) => {
                Self::handle_spectate(conn, spectate, registry, rooms, sender).await;
            }
            ClientMessage::MakeMove(mv) => {
                Self::handle_move(conn, mv, registry, rooms, sender).await;
            }
        }
    }

    /// Handle `create_game`.
    async fn handle_create(
        conn: ConnectionId,
        create: CreateGame,
        registry: &Arc<GameRegistry>,
        rooms: &Arc<Rooms>,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        let name = create.name.trim().to_string();
        let secret = create.password.trim().to_string();

        let session = GameSession::new(
            name.clone(),
            secret,
            conn,
            create.username.clone(),
            create.board,
            create.start,
            create.end,
        );

        match registry.create(session).await {
            Ok(_) => {
                rooms.join(&name, conn, sender.clone()).await;
                info!("Game created: {} by {}", name, create.username);
                let _ = sender.send(ServerMessage::GameCreated { name }).await;
            }
            Err(e) => {
                debug!("Create rejected for {}: {}", name, e);
                Self::send_error(sender, &e).await;
            }
        }
    }

    /// Handle `join_game`.
    async fn handle_join(
        conn: ConnectionId,
        join: JoinGame,
        registry: &Arc<GameRegistry>,
        rooms: &Arc<Rooms>,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        let name = join.name.trim().to_string();
        let secret = join.password.trim().to_string();

        let Some(shared) = registry.get(&name).await else {
            debug!("Join failed: game {} not found", name);
            Self::send_error(sender, &GameError::NotFound).await;
            return;
        };

        let mut session = shared.lock().await;
        match session.join(conn, &secret, join.username.clone(), join.board, join.start, join.end) {
            Ok(joined) => {
                rooms.join(&name, conn, sender.clone()).await;
                info!("{} joined game {}", join.username, name);

                let started = GameStarted {
                    host: joined.host,
                    joiner: joined.joiner,
                    host_pos: joined.host_pos,
                    joiner_pos: joined.joiner_pos,
                    host_target: joined.host_target,
                    joiner_target: joined.joiner_target,
                    turn: joined.turn,
                    log: joined.log_text,
                    name: name.clone(),
                    password: session.secret().to_string(),
                };
                rooms
                    .broadcast(&name, ServerMessage::GameStarted(started))
                    .await;

                // Private reveals: each participant learns only the
                // opponent's start and end, never the opponent's walls.
                rooms
                    .send_to(
                        &name,
                        joined.host_conn,
                        ServerMessage::OpponentData(joined.host_opponent),
                    )
                    .await;
                let _ = sender
                    .send(ServerMessage::OpponentData(joined.joiner_opponent))
                    .await;
            }
            Err(e) => {
                debug!("Join rejected for {}: {}", name, e);
                Self::send_error(sender, &e).await;
            }
        }
    }

    /// Handle `reconnect_game`.
    async fn handle_reconnect(
        conn: ConnectionId,
        reconnect: ReconnectGame,
        registry: &Arc<GameRegistry>,
        rooms: &Arc<Rooms>,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        let name = reconnect.name.trim().to_string();
        let secret = reconnect.password.trim().to_string();

        let Some(shared) = registry.get(&name).await else {
            // Same reply as a wrong password: a probe learns nothing.
            let _ = sender
                .send(ServerMessage::Error(ServerError {
                    code: ErrorCode::NotFound,
                    message: "Game not found or invalid credentials".to_string(),
                }))
                .await;
            return;
        };

        let mut session = shared.lock().await;
        match session.reconnect(&secret, &reconnect.username, conn) {
            Ok(view) => {
                rooms.join(&name, conn, sender.clone()).await;
                info!("{} reconnected to game {}", reconnect.username, name);

                let _ = sender
                    .send(ServerMessage::Reconnected(view.into()))
                    .await;
                rooms
                    .broadcast(
                        &name,
                        ServerMessage::PlayerReconnected {
                            username: reconnect.username,
                        },
                    )
                    .await;
            }
            Err(GameError::NotFound) => {
                let _ = sender
                    .send(ServerMessage::Error(ServerError {
                        code: ErrorCode::NotFound,
                        message: "Game not found or invalid credentials".to_string(),
                    }))
                    .await;
            }
            Err(e) => {
                debug!("Reconnect rejected for {}: {}", name, e);
                Self::send_error(sender, &e).await;
            }
        }
    }

    /// Handle `spectate_game`.
    async fn handle_spectate(
        conn: ConnectionId,
        spectate: SpectateGame,
        registry: &Arc<GameRegistry>,
        rooms: &Arc<Rooms>,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        let name = spectate.name.trim().to_string();

        let Some(shared) = registry.get(&name).await else {
            Self::send_error(sender, &GameError::NotFound).await;
            return;
        };

        let mut session = shared.lock().await;
        session.add_spectator(conn);
        let view = session.spectate_view();
        drop(session);

        rooms.join(&name, conn, sender.clone()).await;
        debug!("Spectator {} watching game {}", conn, name);

        let _ = sender
            .send(ServerMessage::SpectatingStarted(view.into()))
            .await;
    }

    /// Handle `make_move`.
    async fn handle_move(
        conn: ConnectionId,
        mv: MakeMove,
        registry: &Arc<GameRegistry>,
        rooms: &Arc<Rooms>,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        let name = mv.game_name.trim().to_string();

        let Some(shared) = registry.get(&name).await else {
            debug!("Move on unknown game {} ignored", name);
            return;
        };

        let mut session = shared.lock().await;
        if session.status() != GameStatus::Playing {
            debug!("Move on non-playing game {} ignored", name);
            return;
        }

        match session.attempt_move(conn, mv.target_cell) {
            Ok(MoveOutcome::Invalid { turn }) => {
                let _ = sender
                    .send(ServerMessage::MoveResult {
                        success: false,
                        message: Some("Invalid move: must be adjacent".to_string()),
                        position: None,
                    })
                    .await;
                rooms
                    .broadcast(&name, ServerMessage::TurnUpdate { turn, log: None })
                    .await;
            }
            Ok(MoveOutcome::Blocked {
                move_str,
                turn,
                log_text,
            }) => {
                let _ = sender
                    .send(ServerMessage::MoveResult {
                        success: false,
                        message: Some(format!("You hit a wall at {}!", move_str)),
                        position: None,
                    })
                    .await;
                rooms
                    .broadcast(
                        &name,
                        ServerMessage::TurnUpdate {
                            turn,
                            log: Some(log_text),
                        },
                    )
                    .await;
            }
            Ok(MoveOutcome::Moved {
                player,
                from,
                to,
                move_str,
                turn,
            }) => {
                let _ = sender
                    .send(ServerMessage::MoveResult {
                        success: true,
                        message: None,
                        position: Some(to),
                    })
                    .await;
                rooms
                    .broadcast(
                        &name,
                        ServerMessage::GameUpdate(GameUpdate {
                            player,
                            from,
                            to,
                            move_str,
                            turn,
                        }),
                    )
                    .await;
            }
            Ok(MoveOutcome::Won {
                winner,
                host_board,
                joiner_board,
                log_text,
            }) => {
                info!("Game {} won by {}", name, winner);
                rooms
                    .broadcast(
                        &name,
                        ServerMessage::GameOver(GameOver {
                            winner,
                            host_board,
                            joiner_board,
                            log: log_text,
                        }),
                    )
                    .await;
                drop(session);
                registry.remove(&name).await;
                rooms.remove_room(&name).await;
            }
            Err(GameError::NotPlaying) => {
                debug!("Move on non-playing game {} ignored", name);
            }
            Err(e) => {
                debug!("Move rejected on {}: {}", name, e);
                Self::send_error(sender, &e).await;
            }
        }
    }

    async fn send_error(sender: &mpsc::Sender<ServerMessage>, err: &GameError) {
        let _ = sender
            .send(ServerMessage::Error(ServerError::from_game_error(err)))
            .await;
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get active connection count.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }

    /// Get active session count.
    pub async fn session_count(&self) -> usize {
        self.registry.len().await
    }
}

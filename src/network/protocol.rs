//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! All messages are JSON, tagged by a `type` field; payload keys follow
//! the camelCase convention the browser client uses.

use serde::{Deserialize, Serialize};

use crate::game::grid::Cell;
use crate::game::session::{
    GameError, GameStatus, LogEntry, OpponentView, ReconnectView, SpectateView,
};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Open a new game room and seat the host.
    CreateGame(CreateGame),

    /// Join an existing room as the second player.
    JoinGame(JoinGame),

    /// Rebind a participant's connection after a drop.
    ReconnectGame(ReconnectGame),

    /// Watch a game read-only. No password required.
    SpectateGame(SpectateGame),

    /// Attempt a single-cell move.
    MakeMove(MakeMove),
}

/// Payload for `create_game`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGame {
    /// Room name, unique in the registry (trimmed server-side).
    pub name: String,
    /// Room password.
    pub password: String,
    /// Wall keys of the maze the opponent must cross.
    pub board: Vec<String>,
    /// Entry cell of this maze.
    pub start: Cell,
    /// Goal cell of this maze.
    pub end: Cell,
    /// Creator's username (supplied by the host application's auth).
    pub username: String,
}

/// Payload for `join_game`. Same shape as `create_game`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinGame {
    /// Room name to join.
    pub name: String,
    /// Room password.
    pub password: String,
    /// Wall keys of the maze the opponent must cross.
    pub board: Vec<String>,
    /// Entry cell of this maze.
    pub start: Cell,
    /// Goal cell of this maze.
    pub end: Cell,
    /// Joiner's username.
    pub username: String,
}

/// Payload for `reconnect_game`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectGame {
    /// Room name.
    pub name: String,
    /// Room password.
    pub password: String,
    /// Username of the returning participant.
    pub username: String,
}

/// Payload for `spectate_game`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectateGame {
    /// Room name to watch.
    pub name: String,
}

/// Payload for `make_move`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeMove {
    /// Room name the move targets.
    pub game_name: String,
    /// Destination cell.
    pub target_cell: Cell,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Room created, host seated. Direct reply to `create_game`.
    GameCreated {
        /// Registered (trimmed) room name.
        name: String,
    },

    /// Match started. Room broadcast on a successful join.
    GameStarted(GameStarted),

    /// The opponent's declared entry/goal. Private, one per participant.
    OpponentData(OpponentView),

    /// Full snapshot for a returning participant. Private reply.
    Reconnected(Reconnected),

    /// A participant rebound their connection. Room broadcast.
    PlayerReconnected {
        /// Returning participant's username.
        username: String,
    },

    /// Read-only snapshot for a new spectator. Private reply.
    SpectatingStarted(SpectatingStarted),

    /// Outcome of the caller's own move attempt. Private reply.
    MoveResult {
        /// Whether the move was applied.
        success: bool,
        /// Failure description, present when `success` is false.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        /// New position, present when `success` is true.
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<Cell>,
    },

    /// Turn changed after an invalid or blocked attempt. Room broadcast.
    TurnUpdate {
        /// Username now holding the turn.
        turn: String,
        /// Collision log line, absent for non-adjacent attempts.
        #[serde(skip_serializing_if = "Option::is_none")]
        log: Option<String>,
    },

    /// A successful non-winning move. Room broadcast.
    GameUpdate(GameUpdate),

    /// Match over; both boards revealed. Room broadcast.
    GameOver(GameOver),

    /// Error reply, only ever sent to the originating connection.
    Error(ServerError),
}

/// `game_started` room broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStarted {
    /// Host username.
    pub host: String,
    /// Joiner username.
    pub joiner: String,
    /// Host's live position.
    pub host_pos: Cell,
    /// Joiner's live position.
    pub joiner_pos: Cell,
    /// Host's objective (joiner's home cell).
    pub host_target: Cell,
    /// Joiner's objective (host's home cell).
    pub joiner_target: Cell,
    /// Turn owner (the host at start).
    pub turn: String,
    /// Match-start log line.
    pub log: String,
    /// Room name.
    pub name: String,
    /// Room password, echoed so clients can persist reconnect credentials.
    pub password: String,
}

/// `reconnected` private snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconnected {
    /// Current lifecycle state.
    pub status: GameStatus,
    /// Current turn owner.
    pub turn: String,
    /// Caller's live position.
    pub my_position: Cell,
    /// Opponent's live position, if seated.
    pub opponent_position: Option<Cell>,
    /// Opponent's declared entry/goal, if seated. Never their walls.
    pub opponent_data: Option<OpponentView>,
    /// Full match log.
    pub log: Vec<LogEntry>,
    /// Host username.
    pub host_name: String,
    /// Joiner username, if seated.
    pub joiner_name: Option<String>,
    /// Caller's own declared start.
    pub start_cell: Cell,
    /// Caller's own declared end.
    pub end_cell: Cell,
    /// Caller's own board, for self-reference.
    pub walls: Vec<String>,
}

impl From<ReconnectView> for Reconnected {
    fn from(view: ReconnectView) -> Self {
        Self {
            status: view.status,
            turn: view.turn,
            my_position: view.my_position,
            opponent_position: view.opponent_position,
            opponent_data: view.opponent_data,
            log: view.log,
            host_name: view.host_name,
            joiner_name: view.joiner_name,
            start_cell: view.start_cell,
            end_cell: view.end_cell,
            walls: view.walls,
        }
    }
}

/// `spectating_started` private snapshot. Carries no boards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectatingStarted {
    /// Host username.
    pub host_name: String,
    /// Joiner username, if seated.
    pub joiner_name: Option<String>,
    /// Host's live position.
    pub host_pos: Cell,
    /// Joiner's live position, if seated.
    pub joiner_pos: Option<Cell>,
    /// Host's objective, known once a joiner is seated.
    pub host_target: Option<Cell>,
    /// Joiner's objective.
    pub joiner_target: Cell,
    /// Current lifecycle state.
    pub status: GameStatus,
    /// Current turn owner.
    pub turn: String,
    /// Full match log.
    pub log: Vec<LogEntry>,
}

impl From<SpectateView> for SpectatingStarted {
    fn from(view: SpectateView) -> Self {
        Self {
            host_name: view.host_name,
            joiner_name: view.joiner_name,
            host_pos: view.host_pos,
            joiner_pos: view.joiner_pos,
            host_target: view.host_target,
            joiner_target: view.joiner_target,
            status: view.status,
            turn: view.turn,
            log: view.log,
        }
    }
}

/// `game_update` room broadcast for a successful non-winning move.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdate {
    /// Acting player's username.
    pub player: String,
    /// Position before the move.
    pub from: Cell,
    /// Position after the move.
    pub to: Cell,
    /// Human-readable move, e.g. `A1-B1`.
    pub move_str: String,
    /// Turn owner (unchanged: still the mover).
    pub turn: String,
}

/// `game_over` room broadcast. The only message that reveals boards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOver {
    /// Winning player's username.
    pub winner: String,
    /// Host's full board.
    pub host_board: Vec<String>,
    /// Joiner's full board.
    pub joiner_board: Vec<String>,
    /// Win log line.
    pub log: String,
}

/// Error reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerError {
    /// Machine-readable code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Game name already taken.
    DuplicateName,
    /// No such game (or wrong reconnect credentials).
    NotFound,
    /// Password mismatch.
    WrongSecret,
    /// Second player already seated.
    GameFull,
    /// Connection is not bound to a player slot.
    NotAPlayer,
    /// Caller does not hold the turn.
    NotYourTurn,
    /// Target cell not adjacent.
    InvalidMove,
    /// Unparseable client message.
    InvalidMessage,
}

impl ServerError {
    /// Build the wire error for a domain error.
    pub fn from_game_error(err: &GameError) -> Self {
        let code = match err {
            GameError::DuplicateName => ErrorCode::DuplicateName,
            GameError::NotFound => ErrorCode::NotFound,
            GameError::WrongSecret => ErrorCode::WrongSecret,
            GameError::GameFull => ErrorCode::GameFull,
            GameError::NotAPlayer => ErrorCode::NotAPlayer,
            GameError::NotYourTurn => ErrorCode::NotYourTurn,
            GameError::InvalidMove => ErrorCode::InvalidMove,
            // Dropped by the gateway before serialization; mapped anyway
            // so the conversion stays total.
            GameError::NotPlaying => ErrorCode::NotFound,
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

//! Game Session
//!
//! Authoritative state of a single match: two player slots, turn owner,
//! status, spectators, and the ordered event log. Each player supplies a
//! hidden board of walls that the *opponent* must cross; walls are only
//! revealed through collisions during play.
//!
//! This module is pure and synchronous. All async coordination and
//! serialization live in `network/`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::grid::{self, Cell};

/// Volatile transport handle for a live connection.
///
/// Rebound on every reconnect; never used as an identity key across
/// reconnects. Stable identity is the player's username.
pub type ConnectionId = Uuid;

/// Lifecycle state of a match.
///
/// A session is `Waiting` from creation until a joiner arrives, then
/// `Playing` until a win. The win marks it `Finished` and removes it
/// from the registry; the marker keeps any still-live handle to the
/// session inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Host only, no joiner yet.
    Waiting,
    /// Both participants present, moves accepted.
    Playing,
    /// A player won. Terminal: every further move is ignored.
    Finished,
}

/// Category of a match log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Lifecycle notices (created, started, game over).
    System,
    /// Successful moves.
    Info,
    /// Wall collisions.
    Warning,
}

/// One entry in the append-only match log.
///
/// Replayed in full to reconnecting participants and spectators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Human-readable message.
    pub text: String,
    /// Entry category.
    #[serde(rename = "type")]
    pub kind: LogKind,
    /// Wall-clock time the entry was appended (`HH:MM:SS`).
    pub time: String,
}

impl LogEntry {
    fn new(kind: LogKind, text: String) -> Self {
        Self {
            text,
            kind,
            time: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

/// The opponent's declared entry and goal cells, as shared with the
/// player who must cross that maze. The opponent's walls are never
/// included here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OpponentView {
    /// Cell where the crossing player begins.
    pub start: Cell,
    /// Cell the crossing player must reach to win.
    pub end: Cell,
}

/// Game errors. All are session-local and recoverable; each is surfaced
/// as a direct reply to the originating connection only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A session with that name already exists (registry-level).
    #[error("Game name already exists")]
    DuplicateName,

    /// No session with that name (or, on reconnect, wrong credentials).
    #[error("Game not found")]
    NotFound,

    /// Room password mismatch.
    #[error("Incorrect password")]
    WrongSecret,

    /// A joiner is already seated.
    #[error("Game is full")]
    GameFull,

    /// Connection is bound to neither player slot.
    #[error("Not a player in this game")]
    NotAPlayer,

    /// Acting player does not hold the turn.
    #[error("Not your turn")]
    NotYourTurn,

    /// Target cell is not adjacent to the current position.
    #[error("Invalid move: must be adjacent")]
    InvalidMove,

    /// Move attempted while the session is not in progress. Never sent
    /// on the wire; the gateway drops these silently.
    #[error("Game is not in progress")]
    NotPlaying,
}

/// One participant slot.
#[derive(Debug, Clone)]
pub struct PlayerSlot {
    /// Current transport handle (rebound on reconnect).
    pub conn: ConnectionId,
    /// Stable identity, unique within the session.
    pub username: String,
    /// Wall keys of the maze this player defined for the opponent.
    /// Kept in the order the client submitted them.
    pub board: Vec<String>,
    /// Entry cell of this player's maze (where the opponent begins).
    pub start: Cell,
    /// Home cell of this player's maze (the opponent's objective).
    pub end: Cell,
    /// This player's live position while crossing the opponent's maze.
    pub pos: Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Host,
    Joiner,
}

/// Resolution of a single move attempt.
///
/// Turn rotation is deliberately asymmetric: the turn passes to the
/// opponent on `Invalid` and `Blocked` outcomes, while a successful
/// non-winning `Moved` keeps the turn with the mover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Target was not adjacent. The attempt still costs the turn.
    Invalid {
        /// New turn owner (the opponent).
        turn: String,
    },
    /// Adjacent move blocked by a wall in the opponent's board.
    /// Position is unchanged.
    Blocked {
        /// Human-readable move, e.g. `A1-B1`.
        move_str: String,
        /// New turn owner (the opponent).
        turn: String,
        /// Log line appended for the collision.
        log_text: String,
    },
    /// Legal move to an open cell that is not the goal.
    Moved {
        /// Acting player's username.
        player: String,
        /// Position before the move.
        from: Cell,
        /// Position after the move.
        to: Cell,
        /// Human-readable move, e.g. `A1-B1`.
        move_str: String,
        /// Turn owner (unchanged: still the mover).
        turn: String,
    },
    /// The move reached the opponent's goal cell. Both boards are
    /// revealed for post-game review; the session must be removed from
    /// the registry by the caller.
    Won {
        /// Winning player's username.
        winner: String,
        /// Host's full board.
        host_board: Vec<String>,
        /// Joiner's full board.
        joiner_board: Vec<String>,
        /// Log line appended for the win.
        log_text: String,
    },
}

/// Summary returned by a successful `join`, carrying everything the
/// gateway needs for the room broadcast and the two private
/// `opponent_data` replies.
#[derive(Debug, Clone)]
pub struct JoinedGame {
    /// Host username.
    pub host: String,
    /// Joiner username.
    pub joiner: String,
    /// Host's live position (entry of the joiner's maze).
    pub host_pos: Cell,
    /// Joiner's live position (entry of the host's maze).
    pub joiner_pos: Cell,
    /// Host's objective (joiner's home cell).
    pub host_target: Cell,
    /// Joiner's objective (host's home cell).
    pub joiner_target: Cell,
    /// Turn owner (always the host at start).
    pub turn: String,
    /// Log line appended for the match start.
    pub log_text: String,
    /// Host's current connection, for the private reply.
    pub host_conn: ConnectionId,
    /// Maze data privately revealed to the host.
    pub host_opponent: OpponentView,
    /// Maze data privately revealed to the joiner.
    pub joiner_opponent: OpponentView,
}

/// Full state snapshot for a reconnecting participant.
///
/// Contains the player's own board (for self-reference) and the
/// opponent's declared start/end, but never the opponent's walls.
#[derive(Debug, Clone)]
pub struct ReconnectView {
    /// Current lifecycle state.
    pub status: GameStatus,
    /// Current turn owner.
    pub turn: String,
    /// Reconnecting player's live position.
    pub my_position: Cell,
    /// Opponent's live position, if a joiner is seated.
    pub opponent_position: Option<Cell>,
    /// Opponent's declared entry/goal, if a joiner is seated.
    pub opponent_data: Option<OpponentView>,
    /// Full match log.
    pub log: Vec<LogEntry>,
    /// Host username.
    pub host_name: String,
    /// Joiner username, if seated.
    pub joiner_name: Option<String>,
    /// Reconnecting player's own declared start.
    pub start_cell: Cell,
    /// Reconnecting player's own declared end.
    pub end_cell: Cell,
    /// Reconnecting player's own board.
    pub walls: Vec<String>,
}

/// Read-only snapshot for a spectator. Carries no board data at all.
#[derive(Debug, Clone)]
pub struct SpectateView {
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
    /// Joiner's objective (host's home cell).
    pub joiner_target: Cell,
    /// Current lifecycle state.
    pub status: GameStatus,
    /// Current turn owner.
    pub turn: String,
    /// Full match log.
    pub log: Vec<LogEntry>,
}

/// Authoritative state of one match.
#[derive(Debug)]
pub struct GameSession {
    name: String,
    secret: String,
    host: PlayerSlot,
    joiner: Option<PlayerSlot>,
    turn: String,
    status: GameStatus,
    spectators: HashSet<ConnectionId>,
    log: Vec<LogEntry>,
}

impl GameSession {
    /// Create a session in `Waiting` state with the host seated.
    ///
    /// The host's position is provisionally their own declared start; it
    /// is reassigned to the joiner's declared start when the match
    /// begins, since each player crosses the opponent's maze.
    pub fn new(
        name: String,
        secret: String,
        host_conn: ConnectionId,
        username: String,
        board: Vec<String>,
        start: Cell,
        end: Cell,
    ) -> Self {
        let log = vec![LogEntry::new(
            LogKind::System,
            format!(
                "System initialized. Game \"{}\" created. Waiting for opponent...",
                name
            ),
        )];

        Self {
            name,
            secret,
            turn: username.clone(),
            host: PlayerSlot {
                conn: host_conn,
                username,
                board,
                start,
                end,
                pos: start,
            },
            joiner: None,
            status: GameStatus::Waiting,
            spectators: HashSet::new(),
            log,
        }
    }

    /// Seat the joiner and start the match.
    ///
    /// Each player begins at the entry cell the opponent declared:
    /// `host.pos = joiner.start` and `joiner.pos = host.start`. The host
    /// always moves first.
    pub fn join(
        &mut self,
        conn: ConnectionId,
        secret: &str,
        username: String,
        board: Vec<String>,
        start: Cell,
        end: Cell,
    ) -> Result<JoinedGame, GameError> {
        if self.secret != secret {
            return Err(GameError::WrongSecret);
        }
        if self.joiner.is_some() {
            return Err(GameError::GameFull);
        }

        let joiner = PlayerSlot {
            conn,
            username,
            board,
            start,
            end,
            pos: self.host.start,
        };
        self.host.pos = start;
        self.turn = self.host.username.clone();
        self.status = GameStatus::Playing;

        let log_text = format!(
            "Match initiated: {} vs {}",
            self.host.username, joiner.username
        );
        self.log
            .push(LogEntry::new(LogKind::System, log_text.clone()));

        let joined = JoinedGame {
            host: self.host.username.clone(),
            joiner: joiner.username.clone(),
            host_pos: self.host.pos,
            joiner_pos: joiner.pos,
            host_target: joiner.end,
            joiner_target: self.host.end,
            turn: self.turn.clone(),
            log_text,
            host_conn: self.host.conn,
            host_opponent: OpponentView {
                start: joiner.start,
                end: joiner.end,
            },
            joiner_opponent: OpponentView {
                start: self.host.start,
                end: self.host.end,
            },
        };

        self.joiner = Some(joiner);
        Ok(joined)
    }

    /// Resolve a move attempt from the given connection.
    ///
    /// The acting player is resolved by connection identity, the turn
    /// check by username. Invalid (non-adjacent) and blocked attempts
    /// forfeit the turn; rejected attempts (`NotAPlayer`, `NotYourTurn`)
    /// change nothing.
    pub fn attempt_move(
        &mut self,
        conn: ConnectionId,
        target: Cell,
    ) -> Result<MoveOutcome, GameError> {
        if self.status != GameStatus::Playing {
            return Err(GameError::NotPlaying);
        }

        let role = self.role_of(conn).ok_or(GameError::NotAPlayer)?;
        let (player_name, from) = {
            let player = self.slot(role);
            (player.username.clone(), player.pos)
        };
        if self.turn != player_name {
            return Err(GameError::NotYourTurn);
        }

        let wall = grid::wall_between(from, target);
        let (opponent_name, opponent_end, blocked) = {
            let opponent = self.opponent(role)?;
            let blocked = wall.map(|w| opponent.board.contains(&w.to_string()));
            (opponent.username.clone(), opponent.end, blocked)
        };
        let move_str = grid::move_label(from, target);

        match blocked {
            // Not adjacent: no wall lookup, but the attempt costs the turn.
            None => {
                self.turn = opponent_name;
                Ok(MoveOutcome::Invalid {
                    turn: self.turn.clone(),
                })
            }
            // Collision: position unchanged, turn passes.
            Some(true) => {
                let log_text = format!("{} hit a wall at {}", player_name, move_str);
                self.log
                    .push(LogEntry::new(LogKind::Warning, log_text.clone()));
                self.turn = opponent_name;
                Ok(MoveOutcome::Blocked {
                    move_str,
                    turn: self.turn.clone(),
                    log_text,
                })
            }
            Some(false) => {
                self.slot_mut(role).pos = target;
                if target == opponent_end {
                    let log_text = format!("{} reached the destination! GAME OVER.", player_name);
                    self.log
                        .push(LogEntry::new(LogKind::System, log_text.clone()));
                    // Terminal: a stale handle to this session must not be
                    // able to mutate it after the win broadcast.
                    self.status = GameStatus::Finished;
                    let joiner = self.joiner.as_ref().ok_or(GameError::NotPlaying)?;
                    Ok(MoveOutcome::Won {
                        winner: player_name,
                        host_board: self.host.board.clone(),
                        joiner_board: joiner.board.clone(),
                        log_text,
                    })
                } else {
                    let log_text = format!("{} moved to {}", player_name, target.label());
                    self.log.push(LogEntry::new(LogKind::Info, log_text));
                    // Turn stays with the mover: only invalid and blocked
                    // attempts rotate it.
                    Ok(MoveOutcome::Moved {
                        player: player_name,
                        from,
                        to: target,
                        move_str,
                        turn: self.turn.clone(),
                    })
                }
            }
        }
    }

    /// Rebind a participant's connection and return a full snapshot.
    ///
    /// A wrong secret is reported as `NotFound` so a probe cannot confirm
    /// a game's existence. Idempotent: repeated calls with the same
    /// credentials yield the same snapshot and alter nothing else.
    pub fn reconnect(
        &mut self,
        secret: &str,
        username: &str,
        conn: ConnectionId,
    ) -> Result<ReconnectView, GameError> {
        if self.secret != secret {
            return Err(GameError::NotFound);
        }

        let role = if self.host.username == username {
            Role::Host
        } else if self
            .joiner
            .as_ref()
            .is_some_and(|j| j.username == username)
        {
            Role::Joiner
        } else {
            return Err(GameError::NotAPlayer);
        };

        self.slot_mut(role).conn = conn;

        let me = self.slot(role);
        let opponent = match role {
            Role::Host => self.joiner.as_ref(),
            Role::Joiner => Some(&self.host),
        };

        Ok(ReconnectView {
            status: self.status,
            turn: self.turn.clone(),
            my_position: me.pos,
            opponent_position: opponent.map(|o| o.pos),
            opponent_data: opponent.map(|o| OpponentView {
                start: o.start,
                end: o.end,
            }),
            log: self.log.clone(),
            host_name: self.host.username.clone(),
            joiner_name: self.joiner.as_ref().map(|j| j.username.clone()),
            start_cell: me.start,
            end_cell: me.end,
            walls: me.board.clone(),
        })
    }

    /// Register a read-only spectator connection.
    pub fn add_spectator(&mut self, conn: ConnectionId) {
        self.spectators.insert(conn);
    }

    /// Snapshot for spectators. Exposes positions, targets, turn, and the
    /// log, but neither board.
    pub fn spectate_view(&self) -> SpectateView {
        SpectateView {
            host_name: self.host.username.clone(),
            joiner_name: self.joiner.as_ref().map(|j| j.username.clone()),
            host_pos: self.host.pos,
            joiner_pos: self.joiner.as_ref().map(|j| j.pos),
            host_target: self.joiner.as_ref().map(|j| j.end),
            joiner_target: self.host.end,
            status: self.status,
            turn: self.turn.clone(),
            log: self.log.clone(),
        }
    }

    /// Session name (registry key).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Room password. Echoed in the `game_started` broadcast so clients
    /// can persist credentials for reconnection.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Current lifecycle state.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Username currently holding the turn.
    pub fn turn(&self) -> &str {
        &self.turn
    }

    /// Number of registered spectators.
    pub fn spectator_count(&self) -> usize {
        self.spectators.len()
    }

    fn role_of(&self, conn: ConnectionId) -> Option<Role> {
        if self.host.conn == conn {
            Some(Role::Host)
        } else if self.joiner.as_ref().is_some_and(|j| j.conn == conn) {
            Some(Role::Joiner)
        } else {
            None
        }
    }

    fn slot(&self, role: Role) -> &PlayerSlot {
        match role {
            Role::Host => &self.host,
            // Role::Joiner is only constructed from a seated joiner.
            Role::Joiner => self.joiner.as_ref().unwrap_or(&self.host),
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut PlayerSlot {
        match role {
            Role::Host => &mut self.host,
            Role::Joiner => self.joiner.as_mut().unwrap_or(&mut self.host),
        }
    }

    fn opponent(&self, role: Role) -> Result<&PlayerSlot, GameError> {
        match role {
            Role::Host => self.joiner.as_ref().ok_or(GameError::NotPlaying),
            Role::Joiner => Ok(&self.host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Cell {
        s.parse().unwrap()
    }

    fn conn() -> ConnectionId {
        Uuid::new_v4()
    }

    /// Host "H" waiting in game "g1", start 0-0, end 2-2, empty board.
    fn waiting_session(host_conn: ConnectionId) -> GameSession {
        GameSession::new(
            "g1".to_string(),
            "pw".to_string(),
            host_conn,
            "H".to_string(),
            vec![],
            cell("0-0"),
            cell("2-2"),
        )
    }

    fn playing_session(
        host_conn: ConnectionId,
        joiner_conn: ConnectionId,
        joiner_board: Vec<String>,
    ) -> GameSession {
        let mut session = waiting_session(host_conn);
        session
            .join(
                joiner_conn,
                "pw",
                "J".to_string(),
                joiner_board,
                cell("0-0"),
                cell("2-2"),
            )
            .unwrap();
        session
    }

    #[test]
    fn test_create_initializes_waiting() {
        let session = waiting_session(conn());
        assert_eq!(session.status(), GameStatus::Waiting);
        assert_eq!(session.turn(), "H");
        assert_eq!(session.log.len(), 1);
        assert_eq!(session.log[0].kind, LogKind::System);
    }

    #[test]
    fn test_join_wrong_secret() {
        let mut session = waiting_session(conn());
        let err = session
            .join(conn(), "nope", "J".into(), vec![], cell("0-0"), cell("2-2"))
            .unwrap_err();
        assert_eq!(err, GameError::WrongSecret);
        assert_eq!(session.status(), GameStatus::Waiting);
    }

    #[test]
    fn test_join_full() {
        let mut session = playing_session(conn(), conn(), vec![]);
        let err = session
            .join(conn(), "pw", "K".into(), vec![], cell("0-0"), cell("2-2"))
            .unwrap_err();
        assert_eq!(err, GameError::GameFull);
    }

    #[test]
    fn test_join_cross_assigns_starts_and_targets() {
        let host = conn();
        let mut session = waiting_session(host);
        let joined = session
            .join(conn(), "pw", "J".into(), vec![], cell("1-0"), cell("3-3"))
            .unwrap();

        // Each player begins at the entry the opponent declared.
        assert_eq!(joined.host_pos, cell("1-0"));
        assert_eq!(joined.joiner_pos, cell("0-0"));
        // Each player's target is the opponent's home cell.
        assert_eq!(joined.host_target, cell("3-3"));
        assert_eq!(joined.joiner_target, cell("2-2"));
        assert_eq!(joined.turn, "H");
        assert_eq!(session.status(), GameStatus::Playing);

        // Private reveals carry start/end only; board types cannot leak here.
        assert_eq!(joined.host_opponent.start, cell("1-0"));
        assert_eq!(joined.host_opponent.end, cell("3-3"));
        assert_eq!(joined.joiner_opponent.start, cell("0-0"));
        assert_eq!(joined.joiner_opponent.end, cell("2-2"));
    }

    #[test]
    fn test_move_before_playing_is_not_playing() {
        let host = conn();
        let mut session = waiting_session(host);
        let err = session.attempt_move(host, cell("0-1")).unwrap_err();
        assert_eq!(err, GameError::NotPlaying);
    }

    // Scenario A: empty boards, host walks 0-0 -> 2-2 and wins.
    #[test]
    fn test_open_board_walk_to_win() {
        let host = conn();
        let mut session = playing_session(host, conn(), vec![]);

        for target in ["0-1", "0-2", "1-2"] {
            match session.attempt_move(host, cell(target)).unwrap() {
                MoveOutcome::Moved { to, turn, .. } => {
                    assert_eq!(to, cell(target));
                    // Successful non-winning moves keep the turn.
                    assert_eq!(turn, "H");
                }
                other => panic!("expected Moved, got {:?}", other),
            }
        }

        match session.attempt_move(host, cell("2-2")).unwrap() {
            MoveOutcome::Won {
                winner,
                host_board,
                joiner_board,
                ..
            } => {
                assert_eq!(winner, "H");
                assert!(host_board.is_empty());
                assert!(joiner_board.is_empty());
            }
            other => panic!("expected Won, got {:?}", other),
        }
    }

    // Scenario B: wall v-0-1 blocks 0-0 -> 0-1; turn passes, position holds.
    #[test]
    fn test_collision_passes_turn_and_holds_position() {
        let host = conn();
        let joiner = conn();
        let mut session = playing_session(host, joiner, vec!["v-0-1".to_string()]);

        match session.attempt_move(host, cell("0-1")).unwrap() {
            MoveOutcome::Blocked {
                move_str,
                turn,
                log_text,
            } => {
                assert_eq!(move_str, "A1-B1");
                assert_eq!(turn, "J");
                assert!(log_text.contains("hit a wall"));
            }
            other => panic!("expected Blocked, got {:?}", other),
        }

        // Pass the turn back via an invalid attempt, then confirm the
        // host's position is still 0-0: the same boundary blocks again.
        session.attempt_move(joiner, cell("9-9")).unwrap();
        assert_eq!(session.turn(), "H");
        match session.attempt_move(host, cell("0-1")).unwrap() {
            MoveOutcome::Blocked { move_str, .. } => assert_eq!(move_str, "A1-B1"),
            other => panic!("expected Blocked, got {:?}", other),
        }
    }

    // Scenario C: distance-4 jump forfeits the turn without moving.
    #[test]
    fn test_invalid_move_forfeits_turn() {
        let host = conn();
        let mut session = playing_session(host, conn(), vec![]);
        let before = session.log.len();

        match session.attempt_move(host, cell("2-2")).unwrap() {
            MoveOutcome::Invalid { turn } => assert_eq!(turn, "J"),
            other => panic!("expected Invalid, got {:?}", other),
        }
        // Invalid adjacency appends no log entry.
        assert_eq!(session.log.len(), before);
        assert_eq!(session.turn(), "J");
    }

    // Scenario D: a stranger's connection is rejected without state change.
    #[test]
    fn test_stranger_is_not_a_player() {
        let host = conn();
        let mut session = playing_session(host, conn(), vec![]);

        let err = session.attempt_move(conn(), cell("0-1")).unwrap_err();
        assert_eq!(err, GameError::NotAPlayer);
        assert_eq!(session.turn(), "H");
    }

    #[test]
    fn test_won_session_is_terminal() {
        let host = conn();
        let mut session = playing_session(host, conn(), vec![]);

        for target in ["0-1", "0-2", "1-2", "2-2"] {
            session.attempt_move(host, cell(target)).unwrap();
        }
        assert_eq!(session.status(), GameStatus::Finished);

        // A handle still held after the win cannot mutate anything.
        let err = session.attempt_move(host, cell("1-2")).unwrap_err();
        assert_eq!(err, GameError::NotPlaying);
        let before = session.log.len();
        assert!(session.attempt_move(host, cell("2-1")).is_err());
        assert_eq!(session.log.len(), before);
    }

    #[test]
    fn test_out_of_turn_is_rejected_without_rotation() {
        let host = conn();
        let joiner = conn();
        let mut session = playing_session(host, joiner, vec![]);

        let err = session.attempt_move(joiner, cell("0-1")).unwrap_err();
        assert_eq!(err, GameError::NotYourTurn);
        assert_eq!(session.turn(), "H");
    }

    #[test]
    fn test_turn_always_names_a_participant() {
        let host = conn();
        let joiner = conn();
        let mut session = playing_session(host, joiner, vec!["v-0-1".to_string()]);

        session.attempt_move(host, cell("0-1")).unwrap(); // blocked -> J
        assert_eq!(session.turn(), "J");
        session.attempt_move(joiner, cell("9-9")).unwrap(); // invalid -> H
        assert_eq!(session.turn(), "H");
        session.attempt_move(host, cell("1-0")).unwrap(); // moved -> still H
        assert_eq!(session.turn(), "H");
    }

    #[test]
    fn test_reconnect_rebinds_and_is_idempotent() {
        let host = conn();
        let joiner = conn();
        let mut session = playing_session(host, joiner, vec!["h-1-0".to_string()]);

        let fresh = conn();
        let first = session.reconnect("pw", "H", fresh).unwrap();
        let second = session.reconnect("pw", "H", fresh).unwrap();

        assert_eq!(first.my_position, second.my_position);
        assert_eq!(first.turn, second.turn);
        assert_eq!(first.log.len(), second.log.len());
        assert_eq!(first.walls, Vec::<String>::new());
        assert_eq!(first.opponent_data.unwrap().end.to_string(), "2-2");

        // The rebound connection can act; the stale one cannot.
        assert_eq!(
            session.attempt_move(host, cell("0-1")).unwrap_err(),
            GameError::NotAPlayer
        );
        assert!(session.attempt_move(fresh, cell("0-1")).is_ok());
    }

    #[test]
    fn test_reconnect_wrong_secret_reads_as_not_found() {
        let mut session = playing_session(conn(), conn(), vec![]);
        let err = session.reconnect("nope", "H", conn()).unwrap_err();
        assert_eq!(err, GameError::NotFound);
    }

    #[test]
    fn test_reconnect_stranger_denied() {
        let mut session = playing_session(conn(), conn(), vec![]);
        let err = session.reconnect("pw", "X", conn()).unwrap_err();
        assert_eq!(err, GameError::NotAPlayer);
    }

    #[test]
    fn test_reconnect_while_waiting_has_no_opponent() {
        let mut session = waiting_session(conn());
        let view = session.reconnect("pw", "H", conn()).unwrap();
        assert_eq!(view.status, GameStatus::Waiting);
        assert!(view.opponent_position.is_none());
        assert!(view.opponent_data.is_none());
        assert!(view.joiner_name.is_none());
    }

    #[test]
    fn test_spectate_view_carries_no_boards() {
        let mut session = playing_session(conn(), conn(), vec!["v-0-1".to_string()]);
        session.add_spectator(conn());
        assert_eq!(session.spectator_count(), 1);

        let view = session.spectate_view();
        assert_eq!(view.host_name, "H");
        assert_eq!(view.joiner_name.as_deref(), Some("J"));
        assert_eq!(view.turn, "H");
        assert_eq!(view.host_target, Some(cell("2-2")));
        // SpectateView has no board field; the strongest guarantee the
        // compiler gives us. Log text must not mention wall keys either.
        for entry in &view.log {
            assert!(!entry.text.contains("v-0-1"));
        }
    }

    #[test]
    fn test_log_accumulates_in_order() {
        let host = conn();
        let joiner = conn();
        let mut session = playing_session(host, joiner, vec!["v-0-1".to_string()]);

        session.attempt_move(host, cell("0-1")).unwrap(); // warning
        session.attempt_move(joiner, cell("0-1")).unwrap(); // info
        let kinds: Vec<LogKind> = session.log.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LogKind::System,
                LogKind::System,
                LogKind::Warning,
                LogKind::Info
            ]
        );
    }
}

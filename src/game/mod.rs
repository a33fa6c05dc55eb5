//! Game Logic Module
//!
//! Pure, synchronous match state. No I/O, no channels.
//!
//! ## Module Structure
//!
//! - `grid`: cell coordinates and wall canonicalization
//! - `session`: the per-match state machine and move resolution

pub mod grid;
pub mod session;

// Re-export key types
pub use grid::{move_label, wall_between, Cell, Wall};
pub use session::{
    ConnectionId, GameError, GameSession, GameStatus, LogEntry, LogKind, MoveOutcome,
};

//! # Labyrinth Server
//!
//! Real-time server for the hidden-maze race: a turn-based duel where
//! each player privately defines a maze the *opponent* must cross,
//! discovering walls only through collision.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    LABYRINTH SERVER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  game/           - Pure match logic (no I/O)                 │
//! │  ├── grid.rs     - Cells and wall canonicalization           │
//! │  └── session.rs  - Per-match state machine                   │
//! │                                                              │
//! │  network/        - Async boundary                            │
//! │  ├── gateway.rs  - WebSocket server and event routing        │
//! │  ├── protocol.rs - Wire message types                        │
//! │  └── registry.rs - Name -> live session mapping              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Hidden Information
//!
//! A player's board is revealed to the opponent one wall at a time,
//! through collisions, and in full only inside the final `game_over`
//! broadcast. The gateway never serializes a board anywhere else.
//!
//! Match state is in-memory only and single-process; a win deletes the
//! session immediately, and abandoned sessions stay resident until the
//! process exits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod game;
pub mod network;

// Re-export commonly used types
pub use game::grid::{wall_between, Cell, Wall};
pub use game::session::{GameError, GameSession, GameStatus, MoveOutcome};
pub use network::gateway::{GatewayServer, ServerConfig};
pub use network::registry::GameRegistry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

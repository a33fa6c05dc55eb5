//! Network Layer
//!
//! WebSocket gateway for the real-time maze protocol. All game logic
//! lives in `game/`; this layer only routes, locks, and serializes.

pub mod gateway;
pub mod protocol;
pub mod registry;

pub use gateway::{GatewayError, GatewayServer, ServerConfig};
pub use protocol::{ClientMessage, ErrorCode, ServerError, ServerMessage};
pub use registry::{GameRegistry, SharedSession};

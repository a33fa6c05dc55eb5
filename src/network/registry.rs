//! Game Registry
//!
//! Process-wide mapping from game name to live session. Owned by the
//! gateway's composition root; created at process start, dropped at
//! shutdown. Nothing here persists.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::game::session::{GameError, GameSession};

/// Shared handle to one session. The mutex serializes all mutation, so
/// two simultaneous moves on the same game resolve in lock-acquisition
/// order and can never interleave.
pub type SharedSession = Arc<Mutex<GameSession>>;

/// All active sessions, keyed by trimmed game name.
///
/// Sessions are removed the instant a player wins; abandoned sessions
/// stay resident (no reaping).
pub struct GameRegistry {
    games: RwLock<HashMap<String, SharedSession>>,
}

impl GameRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a new session under its name.
    ///
    /// Check-then-insert happens under a single write lock, so two
    /// concurrent creates with the same name cannot both succeed, and a
    /// losing create leaves the existing session untouched.
    pub async fn create(&self, session: GameSession) -> Result<SharedSession, GameError> {
        let mut games = self.games.write().await;
        if games.contains_key(session.name()) {
            return Err(GameError::DuplicateName);
        }
        let name = session.name().to_string();
        let shared = Arc::new(Mutex::new(session));
        games.insert(name, shared.clone());
        Ok(shared)
    }

    /// Look up a session by name.
    pub async fn get(&self, name: &str) -> Option<SharedSession> {
        let games = self.games.read().await;
        games.get(name).cloned()
    }

    /// Remove a session. Called only when a player wins.
    pub async fn remove(&self, name: &str) {
        let mut games = self.games.write().await;
        games.remove(name);
    }

    /// Number of active sessions.
    pub async fn len(&self) -> usize {
        let games = self.games.read().await;
        games.len()
    }

    /// Whether no sessions are active.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

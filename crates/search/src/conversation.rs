//! Bounded conversation window and per-session registry.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default window size: two exchanges.
pub const DEFAULT_WINDOW_TURNS: usize = 4;

/// Sessions kept before the least recently used one is dropped.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// FIFO window of the most recent turns.
///
/// `append` is the only mutation; the oldest turns are evicted first.
#[derive(Debug, Clone)]
pub struct ConversationWindow {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl ConversationWindow {
    /// A window holding at most `capacity` turns (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Current turns, oldest first.
    pub fn snapshot(&self) -> Vec<ConversationTurn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ConversationWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_TURNS)
    }
}

/// Shared handle to one session's window.
pub type SessionHandle = Arc<Mutex<ConversationWindow>>;

#[derive(Debug)]
struct SessionEntry {
    handle: SessionHandle,
    last_used: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    entries: HashMap<String, SessionEntry>,
    /// Bumped on every lookup; orders entries by recency
    clock: u64,
}

/// Session id → window.
///
/// Each window sits behind its own async mutex, so requests of one session
/// run one at a time while distinct sessions never contend.
///
/// At most `max_sessions` windows are kept. Opening one more drops the least
/// recently used session; a caller still holding its handle keeps a working
/// window, but the next lookup of that id starts empty.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Mutex<Sessions>,
    window_turns: usize,
    max_sessions: usize,
}

impl SessionRegistry {
    pub fn new(window_turns: usize) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            window_turns,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// Cap the number of live sessions (at least one).
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Get the session's window, creating an empty one on first use.
    pub async fn session(&self, id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        sessions.clock += 1;
        let now = sessions.clock;

        if let Some(entry) = sessions.entries.get_mut(id) {
            entry.last_used = now;
            return entry.handle.clone();
        }

        while sessions.entries.len() >= self.max_sessions {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    tracing::debug!(session = %key, "Evicting least recently used session");
                    sessions.entries.remove(&key);
                }
                None => break,
            }
        }

        tracing::debug!(session = id, "Creating conversation window");
        let handle = Arc::new(Mutex::new(ConversationWindow::new(self.window_turns)));
        sessions.entries.insert(
            id.to_string(),
            SessionEntry {
                handle: handle.clone(),
                last_used: now,
            },
        );
        handle
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.lock().await.entries.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.entries.len()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_TURNS)
    }
}

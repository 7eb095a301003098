use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Disconnected,
}

/// Lifecycle of one connection: opened on connect, invalidated on
/// disconnect, never reopened.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    state: SessionState,
    opened_at: Instant,
    closed_at: Option<Instant>,
}

impl Session {
    pub(crate) fn open() -> Self {
        Self {
            id: SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)),
            state: SessionState::Connected,
            opened_at: Instant::now(),
            closed_at: None,
        }
    }

    /// Mark the session disconnected. Returns false if it already was.
    pub(crate) fn invalidate(&mut self) -> bool {
        if self.state == SessionState::Disconnected {
            return false;
        }
        self.state = SessionState::Disconnected;
        self.closed_at = Some(Instant::now());
        true
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Time connected so far, or in total once disconnected.
    pub fn duration(&self) -> Duration {
        self.closed_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.opened_at)
    }
}

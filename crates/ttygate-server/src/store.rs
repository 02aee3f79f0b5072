//! Process-wide registry of live sessions.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use ttygate_common::SessionId;

/// What the listener knows about a running session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub peer: SocketAddr,
    pub user: String,
    pub started_at: Instant,
}

impl SessionInfo {
    pub fn new(peer: SocketAddr, user: impl Into<String>) -> Self {
        Self {
            peer,
            user: user.into(),
            started_at: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Thread-safe session registry with a concurrency cap.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionInfo>>>,
    limit: usize,
}

impl SessionStore {
    pub fn new(limit: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            limit,
        }
    }

    /// Register a session. Returns false if the store is full.
    pub async fn register(&self, id: SessionId, info: SessionInfo) -> bool {
        let mut map = self.sessions.write().await;
        if map.len() >= self.limit {
            return false;
        }
        map.insert(id, info);
        true
    }

    /// Remove a session. Returns its info if it was registered.
    pub async fn unregister(&self, id: &SessionId) -> Option<SessionInfo> {
        self.sessions.write().await.remove(id)
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

//! Session lifecycle states and the events that drive them.

use std::fmt;

use ttygate_common::Geometry;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Channel open, no PTY yet.
    Negotiating,
    /// PTY granted, waiting for a shell request.
    PtyGranted,
    /// Process running, data flowing.
    Active,
    /// Cleanup in progress.
    Closing,
    Closed,
    /// A command-execution request was refused.
    Rejected,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Negotiating => "negotiating",
            SessionState::PtyGranted => "pty-granted",
            SessionState::Active => "active",
            SessionState::Closing => "closing",
            SessionState::Closed => "closed",
            SessionState::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Everything the SSH layer can tell a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    PtyRequest { term: String, geometry: Geometry },
    WindowChange(Geometry),
    Exec { command: String },
    Shell,
    Data(Vec<u8>),
    Eof,
    /// The channel or the whole connection went away.
    Closed,
    /// The connection failed.
    Error(String),
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::PtyRequest { .. } => "pty-req",
            SessionEvent::WindowChange(_) => "window-change",
            SessionEvent::Exec { .. } => "exec",
            SessionEvent::Shell => "shell",
            SessionEvent::Data(_) => "data",
            SessionEvent::Eof => "eof",
            SessionEvent::Closed => "closed",
            SessionEvent::Error(_) => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display_matches_lifecycle_names() {
        assert_eq!(SessionState::PtyGranted.to_string(), "pty-granted");
        assert_eq!(SessionState::Closed.to_string(), "closed");
    }
}

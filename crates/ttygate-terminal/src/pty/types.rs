//! PTY host types: errors, events, the spawn request, and the host traits.

use std::path::PathBuf;

use tokio::sync::mpsc;
use ttygate_common::Geometry;

use crate::env::EnvSnapshot;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Maximum bytes to read from a PTY in a single read (8 KB).
pub const PTY_READ_CHUNK: usize = 8_192;

/// Output chunks buffered per process before the reader stops reading.
///
/// Bounds per-session memory at `PTY_EVENT_QUEUE * PTY_READ_CHUNK`; a slow
/// remote end pushes back on the PTY, and from there on the process.
pub const PTY_EVENT_QUEUE: usize = 32;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors originating from PTY operations.
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("failed to spawn process: {0}")]
    SpawnFailed(String),

    #[error("invalid terminal geometry {0}")]
    InvalidGeometry(Geometry),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("failed to resize PTY: {0}")]
    ResizeFailed(String),

    #[error("failed to write to PTY: {0}")]
    WriteFailed(String),
}

// =============================================================================
// EVENTS
// =============================================================================

/// Notifications from a hosted process, delivered in production order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PtyEvent {
    /// A chunk of terminal output.
    Output(Vec<u8>),
    /// The process exited. Always the last event.
    Exited(u32),
}

// =============================================================================
// SPAWN REQUEST
// =============================================================================

/// Everything needed to start one session's process.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub program: String,
    pub args: Vec<String>,
    pub working_directory: Option<PathBuf>,
    pub geometry: Geometry,
    pub term: String,
    pub env: EnvSnapshot,
}

/// A freshly spawned process and the bounded stream of its output and exit.
pub struct SpawnedProcess {
    pub host: Box<dyn ProcessHost>,
    pub events: mpsc::Receiver<PtyEvent>,
}

// =============================================================================
// TRAITS
// =============================================================================

/// Exclusive handle to one process bound to a pseudo-terminal.
pub trait ProcessHost: Send {
    fn pid(&self) -> Option<u32>;

    fn geometry(&self) -> Geometry;

    fn is_alive(&self) -> bool;

    /// Queue bytes for the process's terminal input. Never blocks.
    fn write(&mut self, data: &[u8]) -> Result<(), PtyError>;

    /// Inform the process of a new terminal size. No-op once the process is gone.
    fn resize(&mut self, geometry: Geometry) -> Result<(), PtyError>;

    /// Kill the process. Safe to call repeatedly and after exit.
    fn terminate(&mut self);
}

/// Starts processes inside pseudo-terminals.
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, request: SpawnRequest) -> Result<SpawnedProcess, PtyError>;
}

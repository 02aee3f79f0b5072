//! Terminal plumbing for ttygate sessions: PTY process hosting, the
//! session environment filter, and full-screen control sequences.

pub mod env;
pub mod mode;
pub mod pty;
pub mod shell;

pub use env::{EnvPolicy, EnvSnapshot};
pub use mode::{normalize_newlines, ScreenMode, ENTER_FULL_SCREEN, EXIT_FULL_SCREEN};
pub use pty::{
    NativePtyHost, NativePtySpawner, ProcessHost, ProcessSpawner, PtyError, PtyEvent,
    SpawnRequest, SpawnedProcess, PTY_EVENT_QUEUE, PTY_READ_CHUNK,
};
pub use shell::resolve_command;

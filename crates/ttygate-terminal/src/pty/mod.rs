//! Pseudo-terminal process hosting.
//!
//! A [`ProcessSpawner`] starts a program inside a PTY and hands back a
//! [`ProcessHost`] plus an ordered stream of [`PtyEvent`]s. The native
//! implementation uses `portable-pty` with background threads for reading,
//! writing, and waiting, so async callers never block on PTY I/O.

mod native;
mod types;

pub use native::{NativePtyHost, NativePtySpawner};
pub use types::*;

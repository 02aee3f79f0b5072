//! ttygate server: SSH listener, authentication policies, and the
//! per-session lifecycle actor.

pub mod auth;
pub mod channel;
pub mod error;
pub mod handler;
pub mod listener;
pub mod session;
pub mod store;

pub use error::{ChannelError, ServerError};

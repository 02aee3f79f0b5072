//! Server-side error types.

use ttygate_common::GatewayError;

/// Errors surfaced by the listener and the SSH handler.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("ssh error: {0}")]
    Russh(#[from] russh::Error),

    #[error("host key error: {0}")]
    Key(#[from] russh_keys::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// A write, exit status, or close could not be delivered to the remote end.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("remote channel is closed")]
    Closed,

    #[error("remote channel refused {0}")]
    Refused(&'static str),
}

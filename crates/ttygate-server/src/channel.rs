//! The remote side of a session, as seen by the session actor.

use async_trait::async_trait;
use russh::server::Handle;
use russh::{ChannelId, CryptoVec};

use crate::error::ChannelError;

/// Output half of one SSH session channel.
#[async_trait]
pub trait RemoteChannel: Send + Sync + 'static {
    /// Send bytes to the remote terminal.
    async fn write(&self, data: &[u8]) -> Result<(), ChannelError>;

    /// Report the session's exit status.
    async fn exit(&self, code: u32) -> Result<(), ChannelError>;

    /// Signal end of output and close the channel.
    async fn close(&self) -> Result<(), ChannelError>;
}

/// A russh session channel, driven through the connection's [`Handle`].
pub struct RusshChannel {
    handle: Handle,
    id: ChannelId,
}

impl RusshChannel {
    pub fn new(handle: Handle, id: ChannelId) -> Self {
        Self { handle, id }
    }
}

#[async_trait]
impl RemoteChannel for RusshChannel {
    async fn write(&self, data: &[u8]) -> Result<(), ChannelError> {
        self.handle
            .data(self.id, CryptoVec::from_slice(data))
            .await
            .map_err(|_| ChannelError::Closed)
    }

    async fn exit(&self, code: u32) -> Result<(), ChannelError> {
        self.handle
            .exit_status_request(self.id, code)
            .await
            .map_err(|_| ChannelError::Refused("exit status"))
    }

    async fn close(&self) -> Result<(), ChannelError> {
        if self.handle.eof(self.id).await.is_err() {
            tracing::debug!(channel = ?self.id, "eof not delivered before close");
        }
        self.handle
            .close(self.id)
            .await
            .map_err(|_| ChannelError::Closed)
    }
}

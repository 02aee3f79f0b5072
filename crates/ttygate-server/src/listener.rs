//! TCP listener, host key handling, and the per-connection task.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use russh::server::{run_stream, Config};
use russh::MethodSet;
use russh_keys::key::KeyPair;
use tokio::net::{TcpListener, TcpStream};
use ttygate_common::GatewayError;
use ttygate_config::schema::ServerConfig;

use crate::auth::AuthPolicy;
use crate::error::ServerError;
use crate::handler::{ConnectionHandler, GatewayContext};
use crate::session::SessionEvent;

/// Delay before answering a failed authentication attempt.
const AUTH_REJECTION_DELAY: Duration = Duration::from_secs(1);

/// Load the host key, or generate an ephemeral one if allowed.
pub fn load_host_key(server: &ServerConfig) -> Result<KeyPair, ServerError> {
    let path = Path::new(&server.host_key_path);
    if path.exists() {
        tracing::debug!(path = %path.display(), "loading host key");
        return Ok(russh_keys::load_secret_key(path, None)?);
    }
    if !server.generate_host_key {
        return Err(ServerError::Gateway(GatewayError::Key(format!(
            "{} does not exist and generate_host_key is false",
            path.display()
        ))));
    }
    tracing::warn!(
        path = %path.display(),
        "host key not found, generating an ephemeral Ed25519 key"
    );
    KeyPair::generate_ed25519().ok_or_else(|| {
        ServerError::Gateway(GatewayError::Key(
            "failed to generate Ed25519 host key".into(),
        ))
    })
}

/// Build the russh server configuration.
pub fn ssh_config(key: KeyPair, auth: &dyn AuthPolicy) -> Config {
    let mut methods = MethodSet::PASSWORD | MethodSet::PUBLICKEY;
    if auth.allows_anonymous() {
        methods |= MethodSet::NONE;
    }

    Config {
        methods,
        keys: vec![key],
        auth_rejection_time: AUTH_REJECTION_DELAY,
        auth_rejection_time_initial: Some(Duration::ZERO),
        ..Default::default()
    }
}

/// Accepts SSH connections and hands each to its own task.
pub struct Listener {
    listener: TcpListener,
    config: Arc<Config>,
    ctx: GatewayContext,
}

impl Listener {
    /// Bind the listening socket. Failure here is fatal for the gateway.
    pub async fn bind(addr: &str, config: Config, ctx: GatewayContext) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            config: Arc::new(config),
            ctx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. Per-connection failures never end it.
    pub async fn serve(self) -> Result<(), ServerError> {
        loop {
            match self.listener.accept().await {
                Ok((socket, peer)) => {
                    tracing::info!(peer = %peer, "connection accepted");
                    let config = Arc::clone(&self.config);
                    let ctx = self.ctx.clone();
                    tokio::spawn(handle_connection(config, socket, peer, ctx));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "TCP accept error");
                }
            }
        }
    }
}

/// Run one SSH connection to completion, then tell its sessions.
async fn handle_connection(
    config: Arc<Config>,
    socket: TcpStream,
    peer: SocketAddr,
    ctx: GatewayContext,
) {
    let handler = ConnectionHandler::new(peer, ctx);
    let channels = handler.channels();

    let ending = match run_stream(config, socket, handler).await {
        Ok(running) => match running.await {
            Ok(()) => {
                tracing::info!(peer = %peer, "connection closed");
                SessionEvent::Closed
            }
            Err(e) => {
                tracing::warn!(peer = %peer, error = %e, "connection error");
                SessionEvent::Error(e.to_string())
            }
        },
        Err(e) => {
            tracing::warn!(peer = %peer, error = %e, "SSH handshake failed");
            SessionEvent::Error(e.to_string())
        }
    };

    let notified = channels.broadcast_and_clear(ending);
    if notified > 0 {
        tracing::debug!(peer = %peer, sessions = notified, "notified sessions of connection end");
    }
}

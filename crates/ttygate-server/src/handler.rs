//! russh callback adapter.
//!
//! Translates SSH callbacks into [`SessionEvent`]s for the session actors
//! of one connection. No session logic lives here.

use std::collections::HashMap;
use std::hash::Hash;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use russh::server::{Auth, Handler, Msg, Session};
use russh::{Channel, ChannelId, Pty};
use russh_keys::key::PublicKey;
use tokio::sync::mpsc;
use ttygate_common::{Geometry, SessionId};
use ttygate_terminal::ProcessSpawner;

use crate::auth::{AuthDecision, AuthPolicy, Credentials};
use crate::channel::RusshChannel;
use crate::error::ServerError;
use crate::session::{SessionEvent, SessionManager, SessionSettings};
use crate::store::{SessionInfo, SessionStore};

/// Event senders for the live sessions of one connection, by channel.
pub struct ChannelRegistry<K = ChannelId> {
    inner: Arc<Mutex<HashMap<K, mpsc::UnboundedSender<SessionEvent>>>>,
}

impl<K> Clone for ChannelRegistry<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K> Default for ChannelRegistry<K> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash + Copy> ChannelRegistry<K> {
    fn insert(&self, id: K, tx: mpsc::UnboundedSender<SessionEvent>) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(id, tx);
        }
    }

    fn remove(&self, id: K) {
        if let Ok(mut map) = self.inner.lock() {
            map.remove(&id);
        }
    }

    /// Deliver an event to one session. Returns false if it is gone.
    pub fn send(&self, id: K, event: SessionEvent) -> bool {
        let Ok(map) = self.inner.lock() else {
            return false;
        };
        match map.get(&id) {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Deliver an event to every session and forget them all.
    pub fn broadcast_and_clear(&self, event: SessionEvent) -> usize {
        let Ok(mut map) = self.inner.lock() else {
            return 0;
        };
        let count = map.len();
        for (_, tx) in map.drain() {
            let _ = tx.send(event.clone());
        }
        count
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared by every connection the listener accepts.
#[derive(Clone)]
pub struct GatewayContext {
    pub auth: Arc<dyn AuthPolicy>,
    pub spawner: Arc<dyn ProcessSpawner>,
    pub settings: Arc<SessionSettings>,
    pub store: SessionStore,
}

/// One SSH connection.
pub struct ConnectionHandler {
    peer: SocketAddr,
    ctx: GatewayContext,
    user: Option<String>,
    channels: ChannelRegistry,
}

impl ConnectionHandler {
    pub fn new(peer: SocketAddr, ctx: GatewayContext) -> Self {
        Self {
            peer,
            ctx,
            user: None,
            channels: ChannelRegistry::default(),
        }
    }

    /// Registry handle that outlives the handler, for end-of-connection fan-out.
    pub fn channels(&self) -> ChannelRegistry {
        self.channels.clone()
    }

    fn authenticate(&mut self, credentials: Credentials<'_>) -> Auth {
        let decision = self.ctx.auth.check(&credentials);
        tracing::debug!(
            peer = %self.peer,
            user = credentials.user(),
            method = credentials.method(),
            policy = self.ctx.auth.name(),
            ?decision,
            "auth attempt"
        );
        match decision {
            AuthDecision::Accept => {
                self.user = Some(credentials.user().to_string());
                Auth::Accept
            }
            AuthDecision::Reject => Auth::Reject {
                proceed_with_methods: None,
            },
        }
    }

    /// Claim a slot in the session store for a new channel.
    async fn reserve_session(&self, user: &str) -> Option<SessionId> {
        let id = SessionId::new();
        if self
            .ctx
            .store
            .register(id.clone(), SessionInfo::new(self.peer, user))
            .await
        {
            return Some(id);
        }
        tracing::warn!(
            peer = %self.peer,
            limit = self.ctx.store.limit(),
            "session limit reached, refusing channel"
        );
        None
    }

    fn dispatch(&self, channel: ChannelId, event: SessionEvent) {
        let name = event.name();
        if !self.channels.send(channel, event) {
            tracing::trace!(peer = %self.peer, ?channel, event = name, "no session for channel");
        }
    }
}

#[async_trait]
impl Handler for ConnectionHandler {
    type Error = ServerError;

    async fn auth_none(&mut self, user: &str) -> Result<Auth, Self::Error> {
        Ok(self.authenticate(Credentials::None { user }))
    }

    async fn auth_password(&mut self, user: &str, password: &str) -> Result<Auth, Self::Error> {
        Ok(self.authenticate(Credentials::Password { user, password }))
    }

    async fn auth_publickey(
        &mut self,
        user: &str,
        public_key: &PublicKey,
    ) -> Result<Auth, Self::Error> {
        let fingerprint = public_key.fingerprint();
        Ok(self.authenticate(Credentials::PublicKey {
            user,
            fingerprint: &fingerprint,
        }))
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        session: &mut Session,
    ) -> Result<bool, Self::Error> {
        let channel_id = channel.id();
        let user = self.user.clone().unwrap_or_default();
        let Some(id) = self.reserve_session(&user).await else {
            return Ok(false);
        };

        let (tx, rx) = mpsc::unbounded_channel();
        self.channels.insert(channel_id, tx);

        let manager = SessionManager::new(
            id.clone(),
            RusshChannel::new(session.handle(), channel_id),
            Arc::clone(&self.ctx.spawner),
            Arc::clone(&self.ctx.settings),
        );
        let channels = self.channels.clone();
        let store = self.ctx.store.clone();
        let peer = self.peer;
        let live = store.count().await;

        tracing::info!(
            session = %id,
            peer = %peer,
            user = %user,
            channel = ?channel_id,
            live,
            "session opened"
        );

        tokio::spawn(async move {
            manager.run(rx).await;
            channels.remove(channel_id);
            if let Some(info) = store.unregister(&id).await {
                tracing::debug!(session = %id, peer = %peer, elapsed = ?info.age(), "session released");
            }
        });

        Ok(true)
    }

    #[allow(clippy::too_many_arguments)]
    async fn pty_request(
        &mut self,
        channel: ChannelId,
        term: &str,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.dispatch(
            channel,
            SessionEvent::PtyRequest {
                term: term.to_string(),
                geometry: Geometry::from_wire(col_width, row_height),
            },
        );
        session.channel_success(channel);
        Ok(())
    }

    async fn window_change_request(
        &mut self,
        channel: ChannelId,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.dispatch(
            channel,
            SessionEvent::WindowChange(Geometry::from_wire(col_width, row_height)),
        );
        Ok(())
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        session.channel_success(channel);
        self.dispatch(channel, SessionEvent::Shell);
        Ok(())
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        session.channel_success(channel);
        self.dispatch(
            channel,
            SessionEvent::Exec {
                command: String::from_utf8_lossy(data).into_owned(),
            },
        );
        Ok(())
    }

    async fn data(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.dispatch(channel, SessionEvent::Data(data.to_vec()));
        Ok(())
    }

    async fn channel_eof(
        &mut self,
        channel: ChannelId,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.dispatch(channel, SessionEvent::Eof);
        Ok(())
    }

    async fn channel_close(
        &mut self,
        channel: ChannelId,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.dispatch(channel, SessionEvent::Closed);
        self.channels.remove(channel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttygate_config::GatewayConfig;
    use ttygate_terminal::NativePtySpawner;

    use crate::auth::AcceptAll;

    fn registry() -> ChannelRegistry<u32> {
        ChannelRegistry::default()
    }

    fn handler(limit: usize) -> ConnectionHandler {
        ConnectionHandler::new(
            "127.0.0.1:50000".parse().unwrap(),
            GatewayContext {
                auth: Arc::new(AcceptAll),
                spawner: Arc::new(NativePtySpawner),
                settings: Arc::new(SessionSettings::from_config(&GatewayConfig::default())),
                store: SessionStore::new(limit),
            },
        )
    }

    #[test]
    fn send_reaches_the_registered_session() {
        let channels = registry();
        let (tx, mut rx) = mpsc::unbounded_channel();
        channels.insert(1, tx);

        assert!(channels.send(1, SessionEvent::Shell));
        assert_eq!(rx.try_recv().ok(), Some(SessionEvent::Shell));
    }

    #[test]
    fn send_to_unknown_channel_fails() {
        let channels = registry();
        let (tx, mut rx) = mpsc::unbounded_channel();
        channels.insert(1, tx);

        assert!(!channels.send(2, SessionEvent::Eof));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn send_to_finished_session_fails() {
        let channels = registry();
        let (tx, rx) = mpsc::unbounded_channel();
        channels.insert(1, tx);
        drop(rx);

        assert!(!channels.send(1, SessionEvent::Data(b"ls".to_vec())));
    }

    #[test]
    fn removed_channel_no_longer_receives() {
        let channels = registry();
        let (tx, _rx) = mpsc::unbounded_channel();
        channels.insert(1, tx);

        channels.remove(1);
        assert!(channels.is_empty());
        assert!(!channels.send(1, SessionEvent::Shell));

        // Removing twice is harmless.
        channels.remove(1);
    }

    #[test]
    fn broadcast_reaches_every_session_and_clears() {
        let channels = registry();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let (tx_gone, rx_gone) = mpsc::unbounded_channel();
        channels.insert(1, tx_a);
        channels.insert(2, tx_b);
        channels.insert(3, tx_gone);
        drop(rx_gone);

        let clone = channels.clone();
        assert_eq!(clone.broadcast_and_clear(SessionEvent::Closed), 3);

        assert_eq!(rx_a.try_recv().ok(), Some(SessionEvent::Closed));
        assert_eq!(rx_b.try_recv().ok(), Some(SessionEvent::Closed));
        assert!(channels.is_empty());
        assert_eq!(channels.broadcast_and_clear(SessionEvent::Closed), 0);
    }

    #[tokio::test]
    async fn full_store_refuses_new_sessions() {
        let handler = handler(1);

        let first = handler.reserve_session("alice").await;
        assert!(first.is_some());
        assert!(handler.reserve_session("bob").await.is_none());
        assert_eq!(handler.ctx.store.count().await, 1);

        // The slot is reusable once the first session is released.
        handler.ctx.store.unregister(&first.unwrap()).await;
        assert!(handler.reserve_session("bob").await.is_some());
    }
}

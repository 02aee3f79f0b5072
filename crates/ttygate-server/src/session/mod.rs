//! Per-session lifecycle actor.
//!
//! Each SSH session channel gets one [`SessionManager`] running on its own
//! task. The SSH handler feeds it [`SessionEvent`]s; the manager owns the
//! process host, the resize debouncer, and the remote channel, and is the
//! only code that touches them. Every way a session can end goes through
//! [`SessionManager::finish`], which runs at most once.
//!
//! ```text
//!   negotiating ──pty-req──► pty-granted ──shell──► active ──► closing ──► closed
//!        │                        │
//!        └──────exec──────────────┴──► rejected
//! ```

mod debounce;
mod state;


pub use debounce::{ResizeDebouncer, DEFAULT_RESIZE_DEBOUNCE};
pub use state::{SessionEvent, SessionState};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use ttygate_common::{Geometry, SessionId};
use ttygate_config::GatewayConfig;
use ttygate_terminal::{
    normalize_newlines, resolve_command, EnvPolicy, ProcessHost, ProcessSpawner, PtyError,
    PtyEvent, ScreenMode, SpawnRequest, SpawnedProcess,
};

use crate::channel::RemoteChannel;

pub const EXEC_REJECTED: [&str; 2] = [
    "This SSH server only supports interactive shells.\r\n",
    "Please connect without the -t flag or command arguments.\r\n",
];
pub const PTY_REQUIRED: &str = "Error: PTY required\r\n";
pub const PTY_INFO_MISSING: &str = "Error: PTY info not available\r\n";

// =============================================================================
// SETTINGS
// =============================================================================

/// Deployment-wide inputs shared by every session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub program: String,
    pub args: Vec<String>,
    pub working_directory: Option<PathBuf>,
    pub full_screen: bool,
    pub default_term: String,
    pub resize_debounce: Duration,
    pub env: EnvPolicy,
}

impl SessionSettings {
    pub fn from_config(config: &GatewayConfig) -> Self {
        let (program, args) = resolve_command(&config.app.program, &config.app.args);
        Self {
            program,
            args,
            working_directory: config
                .app
                .working_directory
                .as_deref()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            full_screen: config.app.full_screen,
            default_term: config.app.default_term.clone(),
            resize_debounce: Duration::from_millis(u64::from(config.session.resize_debounce_ms)),
            env: EnvPolicy::new(
                config.environment.allow.clone(),
                config.environment.overrides.clone(),
            ),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub state: SessionState,
    pub exit_code: u32,
}

// =============================================================================
// MANAGER
// =============================================================================

enum Wake {
    Remote(SessionEvent),
    Process(Option<PtyEvent>),
    Resize(Geometry),
}

pub struct SessionManager<C: RemoteChannel> {
    id: SessionId,
    channel: C,
    spawner: Arc<dyn ProcessSpawner>,
    settings: Arc<SessionSettings>,
    state: SessionState,
    pty_granted: bool,
    geometry: Option<Geometry>,
    term: Option<String>,
    process: Option<Box<dyn ProcessHost>>,
    process_events: Option<mpsc::Receiver<PtyEvent>>,
    debouncer: ResizeDebouncer,
    screen: ScreenMode,
    cleaned_up: bool,
    exit_code: Option<u32>,
}

impl<C: RemoteChannel> SessionManager<C> {
    pub fn new(
        id: SessionId,
        channel: C,
        spawner: Arc<dyn ProcessSpawner>,
        settings: Arc<SessionSettings>,
    ) -> Self {
        let debouncer = ResizeDebouncer::new(settings.resize_debounce);
        Self {
            id,
            channel,
            spawner,
            settings,
            state: SessionState::Negotiating,
            pty_granted: false,
            geometry: None,
            term: None,
            process: None,
            process_events: None,
            debouncer,
            screen: ScreenMode::new(),
            cleaned_up: false,
            exit_code: None,
        }
    }

    /// Drive the session until it is finished.
    ///
    /// A closed event stream counts as a remote close.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) -> SessionOutcome {
        tracing::debug!(session = %self.id, "session opened");

        while !self.cleaned_up {
            let wake = tokio::select! {
                event = events.recv() => Wake::Remote(event.unwrap_or(SessionEvent::Closed)),
                event = next_process_event(&mut self.process_events) => Wake::Process(event),
                geometry = self.debouncer.fired() => Wake::Resize(geometry),
            };

            match wake {
                Wake::Remote(event) => self.handle_event(event).await,
                Wake::Process(event) => self.handle_process_event(event).await,
                Wake::Resize(geometry) => self.apply_resize(geometry),
            }
        }

        let outcome = SessionOutcome {
            state: self.state,
            exit_code: self.exit_code.unwrap_or(0),
        };
        tracing::info!(
            session = %self.id,
            state = %outcome.state,
            exit_code = outcome.exit_code,
            "session finished"
        );
        outcome
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        tracing::trace!(session = %self.id, event = event.name(), state = %self.state, "event");

        match event {
            SessionEvent::PtyRequest { term, geometry } => self.on_pty_request(term, geometry),
            SessionEvent::WindowChange(geometry) => self.on_window_change(geometry),
            SessionEvent::Exec { command } => self.on_exec(&command).await,
            SessionEvent::Shell => self.on_shell().await,
            SessionEvent::Data(bytes) => self.on_data(&bytes),
            SessionEvent::Eof => {
                tracing::debug!(session = %self.id, "remote sent EOF");
            }
            SessionEvent::Closed => {
                tracing::debug!(session = %self.id, "remote closed");
                self.finish(0).await;
            }
            SessionEvent::Error(reason) => {
                tracing::warn!(session = %self.id, error = %reason, "connection error");
                self.finish(0).await;
            }
        }
    }

    fn on_pty_request(&mut self, term: String, geometry: Geometry) {
        match self.state {
            SessionState::Negotiating | SessionState::PtyGranted => {
                tracing::debug!(session = %self.id, %geometry, term = %term, "pty granted");
                self.pty_granted = true;
                self.geometry = geometry.is_valid().then_some(geometry);
                self.term = Some(term);
                self.state = SessionState::PtyGranted;
            }
            state => {
                tracing::warn!(session = %self.id, %state, "ignoring pty request");
            }
        }
    }

    fn on_window_change(&mut self, geometry: Geometry) {
        if !geometry.is_valid() {
            tracing::debug!(session = %self.id, %geometry, "ignoring window change");
            return;
        }
        self.geometry = Some(geometry);
        if self.state == SessionState::Active {
            tracing::trace!(session = %self.id, %geometry, "resize scheduled");
            self.debouncer.schedule(geometry);
        }
    }

    async fn on_exec(&mut self, command: &str) {
        if !matches!(self.state, SessionState::Negotiating | SessionState::PtyGranted) {
            tracing::warn!(session = %self.id, state = %self.state, "ignoring exec request");
            return;
        }

        tracing::info!(session = %self.id, command = %command, "rejecting exec request");
        for line in EXEC_REJECTED {
            self.write_text(line).await;
        }
        self.state = SessionState::Rejected;
        self.finish(1).await;
    }

    async fn on_shell(&mut self) {
        match self.state {
            SessionState::Negotiating | SessionState::PtyGranted => {}
            state => {
                tracing::warn!(session = %self.id, %state, "ignoring shell request");
                return;
            }
        }

        if !self.pty_granted {
            tracing::info!(session = %self.id, "shell requested without a pty");
            self.write_text(PTY_REQUIRED).await;
            self.finish(1).await;
            return;
        }

        match self.geometry {
            Some(geometry) => self.start(geometry).await,
            None => {
                tracing::info!(session = %self.id, "shell requested without usable geometry");
                self.write_text(PTY_INFO_MISSING).await;
                self.finish(1).await;
            }
        }
    }

    /// Enter `active`: build the environment, switch the display, spawn.
    async fn start(&mut self, geometry: Geometry) {
        let term = self
            .term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.settings.default_term.as_str())
            .to_string();
        let env = self.settings.env.snapshot(&term);

        self.state = SessionState::Active;
        if self.settings.full_screen {
            if let Some(seq) = self.screen.enter() {
                self.write_best_effort(seq).await;
            }
        }

        let request = SpawnRequest {
            program: self.settings.program.clone(),
            args: self.settings.args.clone(),
            working_directory: self.settings.working_directory.clone(),
            geometry,
            term: term.clone(),
            env,
        };

        // Opening a PTY and forking block the calling thread.
        let spawner = Arc::clone(&self.spawner);
        let spawned = tokio::task::spawn_blocking(move || spawner.spawn(request))
            .await
            .unwrap_or_else(|e| Err(PtyError::SpawnFailed(format!("spawn task failed: {e}"))));

        match spawned {
            Ok(SpawnedProcess { host, events }) => {
                tracing::info!(
                    session = %self.id,
                    pid = ?host.pid(),
                    %geometry,
                    term = %term,
                    "session active"
                );
                self.process = Some(host);
                self.process_events = Some(events);
            }
            Err(e) => {
                tracing::error!(session = %self.id, error = %e, "failed to start session process");
                self.finish(1).await;
            }
        }
    }

    fn on_data(&mut self, bytes: &[u8]) {
        if self.state != SessionState::Active {
            tracing::trace!(session = %self.id, len = bytes.len(), "dropping input before shell");
            return;
        }
        if let Some(process) = self.process.as_mut() {
            if let Err(e) = process.write(bytes) {
                tracing::debug!(session = %self.id, error = %e, "input not delivered");
            }
        }
    }

    async fn handle_process_event(&mut self, event: Option<PtyEvent>) {
        match event {
            Some(PtyEvent::Output(bytes)) => {
                if let Err(e) = self.channel.write(&bytes).await {
                    tracing::debug!(session = %self.id, error = %e, "output not delivered");
                }
            }
            Some(PtyEvent::Exited(code)) => {
                tracing::info!(session = %self.id, code, "process exited");
                self.finish(code).await;
            }
            None => {
                tracing::warn!(session = %self.id, "process events ended without an exit status");
                self.finish(1).await;
            }
        }
    }

    fn apply_resize(&mut self, geometry: Geometry) {
        let Some(process) = self.process.as_mut() else {
            return;
        };
        match process.resize(geometry) {
            Ok(()) => tracing::debug!(session = %self.id, %geometry, "resized"),
            Err(e) => tracing::debug!(session = %self.id, error = %e, "resize failed"),
        }
    }

    /// Release everything the session holds. Runs once; later calls are no-ops.
    async fn finish(&mut self, code: u32) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;
        let rejected = self.state == SessionState::Rejected;
        self.state = SessionState::Closing;

        if let Some(mut process) = self.process.take() {
            process.terminate();
        }
        self.debouncer.cancel();

        if let Some(seq) = self.screen.exit() {
            self.write_best_effort(seq).await;
        }
        if let Err(e) = self.channel.exit(code).await {
            tracing::debug!(session = %self.id, error = %e, "exit status not delivered");
        }
        if let Err(e) = self.channel.close().await {
            tracing::debug!(session = %self.id, error = %e, "channel close failed");
        }

        self.process_events = None;
        self.exit_code = Some(code);
        self.state = if rejected {
            SessionState::Rejected
        } else {
            SessionState::Closed
        };
    }

    async fn write_text(&mut self, text: &str) {
        let text = normalize_newlines(text);
        self.write_best_effort(text.as_bytes()).await;
    }

    async fn write_best_effort(&mut self, bytes: &[u8]) {
        if let Err(e) = self.channel.write(bytes).await {
            tracing::debug!(session = %self.id, error = %e, "write to remote failed");
        }
    }
}

/// Next event from the hosted process, or pending forever if there is none.
async fn next_process_event(
    events: &mut Option<mpsc::Receiver<PtyEvent>>,
) -> Option<PtyEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

//! ttygate: SSH gateway that runs a terminal application in a PTY for every
//! interactive session.
//!
//! Accepts SSH connections, applies the configured authentication policy,
//! and gives each shell session its own pseudo-terminal process. Exec
//! requests are refused; only interactive shells are served.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use ttygate_config::schema::LogLevel;
use ttygate_config::GatewayConfig;
use ttygate_server::handler::GatewayContext;
use ttygate_server::listener::{self, Listener};
use ttygate_server::session::SessionSettings;
use ttygate_server::store::SessionStore;
use ttygate_server::{auth, ServerError};
use ttygate_terminal::NativePtySpawner;

const LOG_TARGETS: &[&str] = &["ttygate_server", "ttygate_terminal", "ttygate_config"];

/// Filter directive for our crates at `level`, keeping russh quiet.
fn default_directive(level: LogLevel) -> String {
    let level = level.as_directive();
    let mut parts: Vec<String> = LOG_TARGETS.iter().map(|t| format!("{t}={level}")).collect();
    parts.push("russh=warn".to_string());
    parts.join(",")
}

fn init_logging(cli_level: Option<&str>, config_level: LogLevel) {
    let filter = match cli_level {
        Some(directive) => EnvFilter::try_new(directive)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(config_level))),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(config_level))),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let loaded = ttygate_config::load_config(args.config.as_deref());
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level)
        .unwrap_or_default();
    init_logging(args.log_level.as_deref(), level);

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    args.apply(&mut config);
    if let Err(e) = ttygate_config::validation::validate(&config) {
        tracing::error!("Invalid command-line override: {e}");
        return ExitCode::FAILURE;
    }

    if args.print_config {
        println!("{}", ttygate_config::config_to_json(&config));
        return ExitCode::SUCCESS;
    }

    tracing::info!("ttygate v{} starting...", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: GatewayConfig) -> Result<(), ServerError> {
    let key = listener::load_host_key(&config.server)?;
    let auth = auth::policy_from_config(&config.auth);
    let ssh_config = listener::ssh_config(key, auth.as_ref());
    tracing::info!(policy = auth.name(), "auth policy selected");

    let settings = SessionSettings::from_config(&config);
    tracing::info!(program = %settings.program, args = ?settings.args, "hosted program");

    let ctx = GatewayContext {
        auth,
        spawner: Arc::new(NativePtySpawner),
        settings: Arc::new(settings),
        store: SessionStore::new(config.server.max_sessions as usize),
    };

    let addr = config.server.bind_address();
    let listener = Listener::bind(&addr, ssh_config, ctx).await.map_err(|e| {
        tracing::error!(addr = %addr, "Failed to bind listener");
        e
    })?;
    tracing::info!("ttygate listening on {}", listener.local_addr()?);

    tokio::select! {
        result = listener.serve() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
            Ok(())
        }
    }
}

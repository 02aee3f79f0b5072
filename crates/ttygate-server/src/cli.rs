use std::path::PathBuf;

use clap::Parser;
use ttygate_config::GatewayConfig;

/// ttygate: serve a terminal application to anyone with an SSH client.
#[derive(Parser, Debug)]
#[command(name = "ttygate", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log filter directive (e.g. `debug`, `ttygate_server=trace`).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

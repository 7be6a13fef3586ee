//! NRPC calculator daemon
//!
//! Listens for NRPC clients (port 2600 by default) and serves one session
//! per connection.

use clap::Parser as ClapParser;
use nrpc_server::{Server, ServerConfig};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "nrpcd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "NRPC calculator server - evaluates RPN expressions over TCP", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Maximum number of concurrent sessions (0 = unbounded)
    #[arg(long)]
    max_connections: Option<usize>,

    /// Idle read timeout in seconds (0 = none)
    #[arg(long, value_name = "SECS")]
    read_timeout: Option<u64>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "nrpc_server=info,nrpcd=info")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    info!("Starting NRPC server {}", env!("CARGO_PKG_VERSION"));
    server.serve();
}

fn load_config(cli: &Cli) -> Result<ServerConfig, nrpc_server::ServerError> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    config.apply_env();

    if let Some(bind) = &cli.bind {
        config.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(max) = cli.max_connections {
        config.set_max_connections(max);
    }
    if let Some(secs) = cli.read_timeout {
        config.read_timeout_secs = Some(secs);
    }
    Ok(config)
}

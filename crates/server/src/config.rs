//! Server configuration
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `NRPC_*` environment variables, then command-line flags (applied by
//! `nrpcd`). Invalid environment values are warned about and ignored.
//!
//! ```toml
//! bind = "127.0.0.1"
//! port = 2600
//! max_connections = 512
//! read_timeout_secs = 300
//! ```

use crate::error::ServerError;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Port fixed by the NRPC protocol
pub const DEFAULT_PORT: u16 = 2600;

pub const DEFAULT_BIND: &str = "0.0.0.0";

/// Default coroutine stack size: 128KB
pub const DEFAULT_STACK_SIZE: usize = 0x20000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: String,
    pub port: u16,
    /// Upper bound on concurrent sessions; unbounded when unset
    pub max_connections: Option<usize>,
    /// Idle read timeout in seconds; no timeout when unset or zero
    pub read_timeout_secs: Option<u64>,
    /// Stack size for each session coroutine, in bytes
    pub stack_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            max_connections: None,
            read_timeout_secs: None,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn from_toml(toml_str: &str) -> Result<Self, ServerError> {
        let mut config: ServerConfig = toml::from_str(toml_str)?;
        config.max_connections = config.max_connections.filter(|&max| max > 0);
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ServerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Apply `NRPC_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup("NRPC_BIND").filter(|b| !b.is_empty()) {
            self.bind = bind;
        }
        if let Some(port) = parse_env("NRPC_PORT", lookup("NRPC_PORT")) {
            self.port = port;
        }
        if let Some(max) = parse_env::<usize>("NRPC_MAX_CONNECTIONS", lookup("NRPC_MAX_CONNECTIONS")) {
            self.set_max_connections(max);
        }
        if let Some(secs) = parse_env("NRPC_READ_TIMEOUT", lookup("NRPC_READ_TIMEOUT")) {
            self.read_timeout_secs = Some(secs);
        }
        match parse_env::<usize>("NRPC_STACK_SIZE", lookup("NRPC_STACK_SIZE")) {
            Some(0) => warn!(
                "NRPC_STACK_SIZE=0 is invalid, keeping {}",
                self.stack_size
            ),
            Some(size) => self.stack_size = size,
            None => {}
        }
    }

    /// Bound concurrent sessions; 0 means unbounded
    pub fn set_max_connections(&mut self, max: usize) {
        self.max_connections = (max > 0).then_some(max);
    }

    /// `bind:port` for the listener
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

fn parse_env<T: FromStr>(key: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("{}='{}' is not valid, ignoring", key, value);
            None
        }
    }
}

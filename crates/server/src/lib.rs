//! NRPC Server
//!
//! TCP front end for the NRPC calculator protocol. Each accepted connection
//! runs a [`Session`] on its own May coroutine; the evaluation itself lives in
//! `nrpc-core`.

pub mod config;
pub mod error;
pub mod listener;
pub mod protocol;
pub mod session;

pub use config::ServerConfig;
pub use error::ServerError;
pub use listener::Server;
pub use protocol::{Command, GREETING, PROTOCOL_VERSION, Response};
pub use session::{Close, Session, SessionEnd};

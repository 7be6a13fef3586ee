//! Connection acceptor
//!
//! Binds the listening socket and hands every accepted connection to a new
//! May coroutine running a [`Session`]. The accept loop never waits for a
//! session to finish, and sessions share nothing except the live-session
//! counter used to enforce `max_connections`.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::session::{Session, SessionEnd};
use may::coroutine;
use may::net::{TcpListener, TcpStream};
use std::io::{self, BufReader};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::{debug, error, info, warn};

static RUNTIME_INIT: Once = Once::new();

/// Configure May once per process; later calls are no-ops.
fn configure_runtime(config: &ServerConfig) {
    RUNTIME_INIT.call_once(|| {
        may::config().set_stack_size(config.stack_size);
    });
}

/// Close a connection that never got a session
fn shutdown(stream: &TcpStream, peer: SocketAddr) {
    if let Err(e) = stream.shutdown(std::net::Shutdown::Both) {
        debug!(%peer, error = %e, "shutdown failed");
    }
}

/// Decrements the live-session counter when the session's coroutine ends,
/// whichever way it ends.
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    active: Arc<AtomicUsize>,
    accepted: AtomicU64,
}

impl Server {
    pub fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        configure_runtime(&config);

        let addr = config.addr();
        let listener =
            TcpListener::bind(&addr).map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Server {
            listener,
            config,
            active: Arc::new(AtomicUsize::new(0)),
            accepted: AtomicU64::new(0),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Sessions currently running
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Accept connections forever.
    ///
    /// Accept failures are logged and the loop keeps going.
    pub fn serve(&self) {
        if let Ok(addr) = self.local_addr() {
            info!(%addr, "waiting for clients");
        }

        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(e) => error!(error = %e, "accept failed"),
            }
        }
    }

    /// Run [`Server::serve`] on its own coroutine.
    pub fn spawn(self) -> coroutine::JoinHandle<()> {
        // SAFETY: the coroutine owns the server and touches no thread-local state
        unsafe { coroutine::spawn(move || self.serve()) }
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        let id = self.accepted.fetch_add(1, Ordering::Relaxed) + 1;

        let live = self.active.fetch_add(1, Ordering::AcqRel) + 1;
        let guard = ActiveGuard(Arc::clone(&self.active));
        if let Some(max) = self.config.max_connections
            && live > max
        {
            warn!(%peer, max, "connection limit reached, refusing client");
            shutdown(&stream, peer);
            return;
        }

        let read_half = match stream.try_clone() {
            Ok(read_half) => read_half,
            Err(e) => {
                error!(%peer, error = %e, "could not split stream");
                shutdown(&stream, peer);
                return;
            }
        };
        if let Err(e) = read_half.set_read_timeout(self.config.read_timeout()) {
            warn!(%peer, error = %e, "could not set read timeout");
        }

        info!(session = id, %peer, "client connected");
        // SAFETY: the session coroutine owns its stream and evaluator and
        // touches no thread-local state
        unsafe {
            coroutine::spawn(move || {
                let _guard = guard;
                let mut session = Session::new(BufReader::new(read_half), stream);
                match session.run() {
                    SessionEnd::Quit => info!(session = id, %peer, "client quit"),
                    SessionEnd::Disconnected => info!(session = id, %peer, "client disconnected"),
                    SessionEnd::Failed(err) => info!(session = id, %peer, %err, "closed after error"),
                    SessionEnd::Io(e) => error!(session = id, %peer, error = %e, "connection failed"),
                }
                debug!(session = id, "resources released");
            });
        }
    }
}

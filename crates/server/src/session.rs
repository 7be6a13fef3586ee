//! Per-connection session
//!
//! A [`Session`] owns one [`Evaluator`] and one duplex line stream. It sends
//! the greeting, then reads commands until the client quits, the stream ends,
//! or something fails:
//!
//! ```text
//! GREETING -> READING_COMMAND -> (READING_OPERATION_BLOCK) -> READING_COMMAND -> ... -> TERMINATED
//! ```
//!
//! Any [`SessionError`] is terminal: the stack is cleared, one `ERROR` block
//! is written, and the stream is closed. There is no recovery.

use crate::protocol::{Command, GREETING, Response};
use nrpc_core::{Evaluator, LineOutcome, SessionError};
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

/// A writer whose underlying stream can be shut down
pub trait Close {
    fn close(&mut self) -> io::Result<()>;
}

impl Close for may::net::TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(std::net::Shutdown::Both)
    }
}

impl Close for Vec<u8> {
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Close + ?Sized> Close for &mut W {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Why a session ended
#[derive(Debug)]
pub enum SessionEnd {
    /// Client sent `QUIT`
    Quit,
    /// Stream reached end of input
    Disconnected,
    /// A protocol error was reported to the client
    Failed(SessionError),
    /// The stream itself failed; nothing more could be sent
    Io(io::Error),
}

enum Fault {
    Protocol(SessionError),
    Io(io::Error),
}

impl From<SessionError> for Fault {
    fn from(err: SessionError) -> Self {
        Fault::Protocol(err)
    }
}

impl From<io::Error> for Fault {
    fn from(err: io::Error) -> Self {
        Fault::Io(err)
    }
}

pub struct Session<R: BufRead, W: Write + Close> {
    reader: R,
    writer: W,
    evaluator: Evaluator,
    open: bool,
    quit: bool,
    line: Vec<u8>,
}

impl<R: BufRead, W: Write + Close> Session<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Session {
            reader,
            writer,
            evaluator: Evaluator::new(),
            open: true,
            quit: false,
            line: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Run the session to completion and close the stream.
    pub fn run(&mut self) -> SessionEnd {
        let end = match self.drive() {
            Ok(end) => end,
            Err(Fault::Protocol(err)) => self.fail(err),
            Err(Fault::Io(err)) => {
                self.evaluator.clear();
                SessionEnd::Io(err)
            }
        };
        self.close();
        end
    }

    fn drive(&mut self) -> Result<SessionEnd, Fault> {
        self.send(GREETING)?;

        while self.open && !self.quit {
            let Some(line) = self.read_line()? else {
                return Ok(SessionEnd::Disconnected);
            };
            let command = Command::parse(&line)?;
            debug!(?command, "command");

            match command {
                Command::NumericOperation => self.operation_block()?,
                Command::Active => {}
                Command::Quit => self.quit = true,
            }
        }
        Ok(SessionEnd::Quit)
    }

    /// Feed lines to the evaluator until a blank line or end of input.
    ///
    /// Only a block whose last line applied an operator reports a result.
    fn operation_block(&mut self) -> Result<(), Fault> {
        let mut last: Option<LineOutcome> = None;
        while let Some(line) = self.read_line()? {
            if line.is_empty() {
                break;
            }
            last = Some(self.evaluator.eval_line(&line)?);
        }

        if last.is_some_and(|outcome| outcome.has_result())
            && let Some(response) = Response::from_stack(self.evaluator.stack())
        {
            debug!(?response, depth = self.evaluator.stack().depth(), "result");
            self.send(&response.to_wire())?;
        }
        Ok(())
    }

    /// Clear the stack and report the error; the caller closes the stream.
    fn fail(&mut self, err: SessionError) -> SessionEnd {
        warn!(code = err.code, class = %err.class(), detail = ?err.detail, "session error");
        self.evaluator.clear();
        match self.send(&err.to_wire()) {
            Ok(()) => SessionEnd::Failed(err),
            Err(io_err) => SessionEnd::Io(io_err),
        }
    }

    /// Read one line without its terminator; `None` at end of input.
    ///
    /// Bytes that are not UTF-8 are replaced with U+FFFD, so a garbled line
    /// is rejected as a command or operator rather than failing the stream.
    fn read_line(&mut self) -> Result<Option<String>, Fault> {
        self.line.clear();
        match self.reader.read_until(b'\n', &mut self.line) {
            Ok(0) => return Ok(None),
            Ok(_) => {}
            // Only reachable when the stream has a read timeout configured
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Err(Fault::Protocol(SessionError::timeout()));
            }
            Err(e) => return Err(Fault::Io(e)),
        }
        let line = self.line.strip_suffix(b"\n").unwrap_or(&self.line[..]);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        Ok(Some(String::from_utf8_lossy(line).into_owned()))
    }

    fn send(&mut self, message: &str) -> io::Result<()> {
        self.writer.write_all(message.as_bytes())?;
        self.writer.flush()
    }

    /// Flush and shut down the stream. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = self.writer.flush() {
            debug!(error = %e, "flush on close failed");
        }
        if let Err(e) = self.writer.close() {
            debug!(error = %e, "shutdown on close failed");
        }
    }
}

impl<R: BufRead, W: Write + Close> Drop for Session<R, W> {
    fn drop(&mut self) {
        self.close();
    }
}

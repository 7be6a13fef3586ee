//! NRPC wire messages
//!
//! Every message is a block of `\n`-terminated lines closed by an empty line:
//!
//! ```text
//! VERSION\n1.0.0\n\n                  greeting, once per connection
//! RESULT\n<value>\n\n                 single value left on the stack
//! PARTIAL_RESULT\n<value>\n\n         more operands remain to combine
//! ERROR\n<code>\n<name>\n<detail>\n\n see nrpc_core::SessionError
//! ```

use nrpc_core::{SessionError, Stack, format_value};

pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Sent immediately after a connection is accepted
pub const GREETING: &str = "VERSION\n1.0.0\n\n";

/// Top-level commands accepted between operation blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `NUMERIC_OPERATION` or its alias `OP`: an operation block follows
    NumericOperation,
    /// Liveness probe; no response
    Active,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, SessionError> {
        match line {
            "NUMERIC_OPERATION" | "OP" => Ok(Command::NumericOperation),
            "ACTIVE" => Ok(Command::Active),
            "QUIT" => Ok(Command::Quit),
            _ => Err(SessionError::wrong_message_type()),
        }
    }
}

/// Result of an operation block
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    Result(f64),
    PartialResult(f64),
}

impl Response {
    /// Report the top of the stack; `None` when there is nothing to report
    pub fn from_stack(stack: &Stack) -> Option<Self> {
        let top = stack.peek()?;
        if stack.depth() > 1 {
            Some(Response::PartialResult(top))
        } else {
            Some(Response::Result(top))
        }
    }

    pub fn to_wire(&self) -> String {
        match self {
            Response::Result(value) => format!("RESULT\n{}\n\n", format_value(*value)),
            Response::PartialResult(value) => {
                format!("PARTIAL_RESULT\n{}\n\n", format_value(*value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrpc_core::error::WRONG_MESSAGE_TYPE;

    #[test]
    fn test_greeting_carries_version() {
        assert_eq!(GREETING, format!("VERSION\n{}\n\n", PROTOCOL_VERSION));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("NUMERIC_OPERATION"), Ok(Command::NumericOperation));
        assert_eq!(Command::parse("OP"), Ok(Command::NumericOperation));
        assert_eq!(Command::parse("ACTIVE"), Ok(Command::Active));
        assert_eq!(Command::parse("QUIT"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_everything_else() {
        for line in ["GARBAGE", "op", "quit", " QUIT", "", "1", "+"] {
            let err = Command::parse(line).unwrap_err();
            assert_eq!(err.code, WRONG_MESSAGE_TYPE, "line {:?}", line);
        }
    }

    #[test]
    fn test_response_from_stack() {
        let mut stack = Stack::new();
        assert_eq!(Response::from_stack(&stack), None);

        stack.push(3.0);
        assert_eq!(Response::from_stack(&stack), Some(Response::Result(3.0)));

        stack.push(4.0);
        assert_eq!(
            Response::from_stack(&stack),
            Some(Response::PartialResult(4.0))
        );
        // Reporting never consumes
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_response_wire_format() {
        assert_eq!(Response::Result(3.0).to_wire(), "RESULT\n3.0\n\n");
        assert_eq!(
            Response::PartialResult(-7.0).to_wire(),
            "PARTIAL_RESULT\n-7.0\n\n"
        );
    }
}

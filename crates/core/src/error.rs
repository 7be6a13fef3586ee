//! Protocol Error Taxonomy
//!
//! Every failure a session can report is a [`SessionError`]: a numeric code
//! plus an optional detail line. The symbolic name sent on the wire is derived
//! from the code's range, so any code inside a class maps to the same name.
//!
//! Building an error has no side effects. Clearing the stack and writing the
//! response are explicit steps in the session's error path.

use std::fmt;

pub const DIVIDE_BY_ZERO: u16 = 0;
/// Reserved; only raised when a read timeout is configured
pub const TIMEOUT: u16 = 10;
pub const WRONG_MESSAGE_TYPE: u16 = 200;
pub const UNRECOGNIZED_OPERATOR: u16 = 210;
pub const TOO_FEW_ARGUMENTS: u16 = 220;
pub const WRONG_SYNTAX: u16 = 230;

/// Symbolic class of an error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    DivideByZero,
    Timeout,
    WrongMessageTypeSyntax,
    UnrecognizedOperator,
    TooFewArguments,
    WrongSyntax,
    Unknown,
}

impl ErrorClass {
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => ErrorClass::DivideByZero,
            10..=99 => ErrorClass::Timeout,
            200..=209 => ErrorClass::WrongMessageTypeSyntax,
            210..=219 => ErrorClass::UnrecognizedOperator,
            220..=229 => ErrorClass::TooFewArguments,
            230..=299 => ErrorClass::WrongSyntax,
            _ => ErrorClass::Unknown,
        }
    }

    /// Name sent on the wire
    pub fn name(&self) -> &'static str {
        match self {
            ErrorClass::DivideByZero => "divideByZero",
            ErrorClass::Timeout => "timeout",
            ErrorClass::WrongMessageTypeSyntax => "wrongMessageTypeSyntax",
            ErrorClass::UnrecognizedOperator => "unrecognizedOperator",
            ErrorClass::TooFewArguments => "tooFewArguments",
            ErrorClass::WrongSyntax => "wrongSyntax",
            ErrorClass::Unknown => "Unknown error",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn class_name(code: &u16) -> &'static str {
    ErrorClass::from_code(*code).name()
}

/// A protocol failure, terminal for the session that raised it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{:03} {}", .code, class_name(.code))]
pub struct SessionError {
    pub code: u16,
    pub detail: Option<String>,
}

impl SessionError {
    /// Create an error; an empty detail is treated as no detail
    pub fn new(code: u16, detail: Option<String>) -> Self {
        SessionError {
            code,
            detail: detail.filter(|d| !d.is_empty()),
        }
    }

    pub fn divide_by_zero() -> Self {
        Self::new(DIVIDE_BY_ZERO, None)
    }

    pub fn timeout() -> Self {
        Self::new(TIMEOUT, None)
    }

    pub fn wrong_message_type() -> Self {
        Self::new(WRONG_MESSAGE_TYPE, None)
    }

    pub fn unrecognized_operator(token: &str) -> Self {
        Self::new(
            UNRECOGNIZED_OPERATOR,
            Some(format!("Problem with : '{}'", token)),
        )
    }

    pub fn too_few_arguments() -> Self {
        Self::new(TOO_FEW_ARGUMENTS, None)
    }

    pub fn class(&self) -> ErrorClass {
        ErrorClass::from_code(self.code)
    }

    /// Wire form: `ERROR\n<code>\n<name>\n<detail>\n\n`
    pub fn to_wire(&self) -> String {
        format!(
            "ERROR\n{:03}\n{}\n{}\n\n",
            self.code,
            self.class().name(),
            self.detail.as_deref().unwrap_or("")
        )
    }
}

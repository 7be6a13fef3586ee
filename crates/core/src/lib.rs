//! NRPC Core: the calculator half of the NRPC protocol
//!
//! Everything here is pure state-transition logic with no I/O, so a session
//! can drive it from any transport.
//!
//! # Modules
//!
//! - `stack`: LIFO `f64` operand stack with an all-or-nothing `pop_two`
//! - `evaluator`: line-at-a-time RPN evaluation and the operator table
//! - `error`: `SessionError` and the code-range error classes
//! - `number`: literal parsing and wire rendering of values

pub mod error;
pub mod evaluator;
pub mod number;
pub mod stack;

pub use error::{ErrorClass, SessionError};
pub use evaluator::{BinaryOp, Evaluator, LineOutcome, OPERATORS, Operator};
pub use number::{format_value, parse_literal};
pub use stack::Stack;

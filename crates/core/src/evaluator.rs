//! RPN Evaluator
//!
//! Interprets one operation-block line at a time against an owned [`Stack`].
//! A line is either a literal to push or one of the operators in
//! [`OPERATORS`]; nothing else is accepted.
//!
//! # Operand order
//!
//! Binary operators pop `b` (the most recently pushed value) and then `a`.
//! `+ - * %` compute `b op a`, so `10 3 -` yields `-7` and `10 3 %` yields
//! `3`. `/` and `^` compute `a / b` and `a ^ b`. Clients of this protocol
//! depend on that asymmetry.

use crate::error::SessionError;
use crate::number::parse_literal;
use crate::stack::Stack;

/// Operators that combine the two topmost operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl BinaryOp {
    /// Combine `top` (most recently pushed) with `next`
    fn combine(&self, top: f64, next: f64) -> f64 {
        match self {
            BinaryOp::Add => top + next,
            BinaryOp::Subtract => top - next,
            BinaryOp::Multiply => top * next,
            BinaryOp::Modulo => top % next,
            BinaryOp::Divide => next / top,
            BinaryOp::Power => next.powf(top),
        }
    }
}

/// Operators accepted inside an operation block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Binary(BinaryOp),
    /// `rst`: clear the stack
    Reset,
}

/// Token table for operator lookup
pub const OPERATORS: &[(&str, Operator)] = &[
    ("+", Operator::Binary(BinaryOp::Add)),
    ("-", Operator::Binary(BinaryOp::Subtract)),
    ("*", Operator::Binary(BinaryOp::Multiply)),
    ("/", Operator::Binary(BinaryOp::Divide)),
    ("%", Operator::Binary(BinaryOp::Modulo)),
    ("^", Operator::Binary(BinaryOp::Power)),
    ("rst", Operator::Reset),
];

impl Operator {
    /// Exact-match lookup; no trimming or case folding
    pub fn from_token(token: &str) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, op)| *op)
    }

    pub fn token(&self) -> &'static str {
        match self {
            Operator::Binary(BinaryOp::Add) => "+",
            Operator::Binary(BinaryOp::Subtract) => "-",
            Operator::Binary(BinaryOp::Multiply) => "*",
            Operator::Binary(BinaryOp::Divide) => "/",
            Operator::Binary(BinaryOp::Modulo) => "%",
            Operator::Binary(BinaryOp::Power) => "^",
            Operator::Reset => "rst",
        }
    }
}

/// What a single line did to the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// A literal was pushed; nothing to report yet
    Pushed,
    /// A binary operator was applied; the top of the stack is a result
    Applied(BinaryOp),
    /// The stack was cleared by `rst`
    Reset,
}

impl LineOutcome {
    /// Whether a block ending on this line should report a result
    pub fn has_result(&self) -> bool {
        matches!(self, LineOutcome::Applied(_))
    }
}

/// Stack machine for one session
#[derive(Debug, Default)]
pub struct Evaluator {
    stack: Stack,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Discard all operands
    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Evaluate one line of an operation block.
    ///
    /// On error the stack is exactly as it was before the call.
    pub fn eval_line(&mut self, line: &str) -> Result<LineOutcome, SessionError> {
        if let Some(value) = parse_literal(line) {
            self.stack.push(value);
            return Ok(LineOutcome::Pushed);
        }

        let op = Operator::from_token(line).ok_or_else(|| SessionError::unrecognized_operator(line))?;
        self.apply(op)
    }

    /// Apply an operator to the stack
    pub fn apply(&mut self, op: Operator) -> Result<LineOutcome, SessionError> {
        match op {
            Operator::Reset => {
                self.stack.clear();
                Ok(LineOutcome::Reset)
            }
            Operator::Binary(binary) => self.apply_binary(binary),
        }
    }

    fn apply_binary(&mut self, op: BinaryOp) -> Result<LineOutcome, SessionError> {
        // Depth is checked first: a lone zero is too few arguments, not a zero divisor
        if op == BinaryOp::Divide && self.stack.depth() >= 2 && self.stack.peek() == Some(0.0) {
            return Err(SessionError::divide_by_zero());
        }

        let (top, next) = self
            .stack
            .pop_two()
            .ok_or_else(SessionError::too_few_arguments)?;
        self.stack.push(op.combine(top, next));
        Ok(LineOutcome::Applied(op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DIVIDE_BY_ZERO, TOO_FEW_ARGUMENTS, UNRECOGNIZED_OPERATOR};

    fn eval_all(evaluator: &mut Evaluator, lines: &[&str]) -> Result<LineOutcome, SessionError> {
        let mut last = LineOutcome::Pushed;
        for line in lines {
            last = evaluator.eval_line(line)?;
        }
        Ok(last)
    }

    fn top_after(lines: &[&str]) -> f64 {
        let mut evaluator = Evaluator::new();
        eval_all(&mut evaluator, lines).expect("evaluation should succeed");
        evaluator.stack().peek().expect("stack should not be empty")
    }

    #[test]
    fn test_literal_push_has_no_result() {
        let mut evaluator = Evaluator::new();
        assert_eq!(evaluator.eval_line("4"), Ok(LineOutcome::Pushed));
        assert_eq!(evaluator.eval_line("2.5"), Ok(LineOutcome::Pushed));
        assert!(!LineOutcome::Pushed.has_result());
        assert_eq!(evaluator.stack().depth(), 2);
    }

    #[test]
    fn test_addition_and_multiplication() {
        assert_eq!(top_after(&["2", "3", "+"]), 5.0);
        assert_eq!(top_after(&["4", "2.5", "*"]), 10.0);
    }

    #[test]
    fn test_subtraction_uses_top_first() {
        assert_eq!(top_after(&["10", "3", "-"]), -7.0);
    }

    #[test]
    fn test_modulo_uses_top_first() {
        assert_eq!(top_after(&["10", "3", "%"]), 3.0);
        assert_eq!(top_after(&["3", "10", "%"]), 1.0);
    }

    #[test]
    fn test_division_is_conventional() {
        assert_eq!(top_after(&["6", "2", "/"]), 3.0);
        assert_eq!(top_after(&["1", "4", "/"]), 0.25);
    }

    #[test]
    fn test_power_is_conventional() {
        assert_eq!(top_after(&["2", "10", "^"]), 1024.0);
    }

    #[test]
    fn test_binary_operator_reduces_depth_by_one() {
        for op in ["+", "-", "*", "/", "%", "^"] {
            let mut evaluator = Evaluator::new();
            eval_all(&mut evaluator, &["1", "2", "3"]).unwrap();
            let outcome = evaluator.eval_line(op).unwrap();
            assert!(outcome.has_result(), "{} should report a result", op);
            assert_eq!(evaluator.stack().depth(), 2, "after {}", op);
        }
    }

    #[test]
    fn test_too_few_arguments_leaves_stack_untouched() {
        for op in ["+", "-", "*", "/", "%", "^"] {
            let mut evaluator = Evaluator::new();
            let err = evaluator.eval_line(op).unwrap_err();
            assert_eq!(err.code, TOO_FEW_ARGUMENTS);
            assert!(evaluator.stack().is_empty());

            evaluator.eval_line("5").unwrap();
            let err = evaluator.eval_line(op).unwrap_err();
            assert_eq!(err.code, TOO_FEW_ARGUMENTS);
            assert_eq!(evaluator.stack().depth(), 1);
            assert_eq!(evaluator.stack().peek(), Some(5.0));
        }
    }

    #[test]
    fn test_divide_by_zero_does_not_mutate() {
        let mut evaluator = Evaluator::new();
        eval_all(&mut evaluator, &["5", "0"]).unwrap();
        let err = evaluator.eval_line("/").unwrap_err();
        assert_eq!(err.code, DIVIDE_BY_ZERO);
        assert_eq!(evaluator.stack().depth(), 2);
        assert_eq!(evaluator.stack().peek(), Some(0.0));
    }

    #[test]
    fn test_lone_zero_divisor_is_too_few_arguments() {
        let mut evaluator = Evaluator::new();
        evaluator.eval_line("0").unwrap();
        assert_eq!(evaluator.eval_line("/").unwrap_err().code, TOO_FEW_ARGUMENTS);
        assert_eq!(evaluator.stack().depth(), 1);
    }

    #[test]
    fn test_applied_outcome_names_the_operator() {
        let mut evaluator = Evaluator::new();
        eval_all(&mut evaluator, &["1", "2"]).unwrap();
        assert_eq!(
            evaluator.eval_line("%"),
            Ok(LineOutcome::Applied(BinaryOp::Modulo))
        );
    }

    #[test]
    fn test_divide_by_negative_zero() {
        let mut evaluator = Evaluator::new();
        eval_all(&mut evaluator, &["5", "-0.0"]).unwrap();
        assert_eq!(evaluator.eval_line("/").unwrap_err().code, DIVIDE_BY_ZERO);
    }

    #[test]
    fn test_modulo_by_zero_is_not_an_error() {
        let mut evaluator = Evaluator::new();
        eval_all(&mut evaluator, &["0", "5", "%"]).unwrap();
        assert!(evaluator.stack().peek().is_some_and(f64::is_nan));
    }

    #[test]
    fn test_reset_clears_and_reports_nothing() {
        let mut evaluator = Evaluator::new();
        eval_all(&mut evaluator, &["1", "2"]).unwrap();
        let outcome = evaluator.eval_line("rst").unwrap();
        assert_eq!(outcome, LineOutcome::Reset);
        assert!(!outcome.has_result());
        assert!(evaluator.stack().is_empty());

        // Reset on an empty stack is fine too
        assert_eq!(evaluator.eval_line("rst"), Ok(LineOutcome::Reset));
    }

    #[test]
    fn test_reset_then_operator_is_too_few_arguments() {
        for op in ["+", "-", "*", "/", "%", "^"] {
            let mut evaluator = Evaluator::new();
            eval_all(&mut evaluator, &["1", "2", "rst"]).unwrap();
            assert_eq!(evaluator.eval_line(op).unwrap_err().code, TOO_FEW_ARGUMENTS);
        }
    }

    #[test]
    fn test_unrecognized_operator() {
        let mut evaluator = Evaluator::new();
        evaluator.eval_line("1").unwrap();
        let err = evaluator.eval_line("sqrt").unwrap_err();
        assert_eq!(err.code, UNRECOGNIZED_OPERATOR);
        assert_eq!(err.detail.as_deref(), Some("Problem with : 'sqrt'"));
        assert_eq!(evaluator.stack().depth(), 1);
    }

    #[test]
    fn test_operator_match_is_exact() {
        let mut evaluator = Evaluator::new();
        eval_all(&mut evaluator, &["1", "2"]).unwrap();
        for token in [" +", "+ ", "RST", "add"] {
            assert_eq!(
                evaluator.eval_line(token).unwrap_err().code,
                UNRECOGNIZED_OPERATOR
            );
        }
        assert_eq!(evaluator.stack().depth(), 2);
    }

    #[test]
    fn test_operator_table_round_trips_tokens() {
        for (token, op) in OPERATORS {
            assert_eq!(Operator::from_token(token), Some(*op));
            assert_eq!(op.token(), *token);
        }
    }
}

//! Operand Stack
//!
//! A LIFO stack of `f64` operands owned by exactly one evaluator.
//!
//! Operators that consume several operands go through [`Stack::pop_two`],
//! which checks the depth before touching anything: either both operands
//! come off the stack or the stack is left exactly as it was.

/// LIFO operand stack
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    values: Vec<f64>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a value onto the top of the stack
    #[inline]
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// Pop the top value, if any
    #[inline]
    pub fn pop(&mut self) -> Option<f64> {
        self.values.pop()
    }

    /// Read the top value without removing it
    #[inline]
    pub fn peek(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Pop the two topmost values as `(top, next)`.
    ///
    /// Returns `None` without mutating the stack when fewer than two values
    /// are present.
    pub fn pop_two(&mut self) -> Option<(f64, f64)> {
        if self.values.len() < 2 {
            return None;
        }
        let top = self.values.pop()?;
        let next = self.values.pop()?;
        Some((top, next))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of values currently on the stack
    #[inline]
    pub fn depth(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

//! Operand stack
//!
//! Every operation here is forgiving: asking for more values than the stack
//! holds is a no-op, never an error. Callers that need to know whether
//! anything happened get a `bool` back.
//!
//! ## Layout
//!
//! ```text
//! ┌──────┬──────┬──────┬──────┐
//! │  v0  │  v1  │  v2  │  v3  │
//! └──────┴──────┴──────┴──────┘
//!                          ↑ top
//! ```
//!
//! Binary operations read `a` as second-from-top and `b` as top, pop both,
//! and push `a op b`.

/// LIFO stack of integers shared by a whole program run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperandStack {
    values: Vec<i64>,
}

impl OperandStack {
    /// Create an empty stack
    pub fn new() -> Self {
        OperandStack::default()
    }

    pub fn push(&mut self, value: i64) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Option<i64> {
        self.values.pop()
    }

    /// Top of stack without removing it
    pub fn peek(&self) -> Option<i64> {
        self.values.last().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values from bottom to top
    pub fn as_slice(&self) -> &[i64] {
        &self.values
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Duplicate the top value
    ///
    /// Stack effect: ( a -- a a )
    pub fn dup(&mut self) -> bool {
        match self.peek() {
            Some(top) => {
                self.values.push(top);
                true
            }
            None => false,
        }
    }

    /// Discard the top value
    ///
    /// Stack effect: ( a -- )
    pub fn drop_top(&mut self) -> bool {
        self.values.pop().is_some()
    }

    /// Swap the top two values
    ///
    /// Stack effect: ( a b -- b a )
    pub fn swap(&mut self) -> bool {
        let len = self.values.len();
        if len < 2 {
            return false;
        }
        self.values.swap(len - 1, len - 2);
        true
    }

    /// Pop up to `n` values, stopping early when the stack runs out
    ///
    /// Returns how many values were actually removed.
    pub fn pop_n(&mut self, n: usize) -> usize {
        let removed = n.min(self.values.len());
        self.values.truncate(self.values.len() - removed);
        removed
    }

    /// Apply a binary operator to the top two values
    ///
    /// Stack effect: ( a b -- a op b )
    ///
    /// With fewer than two values, or when `op` declines (returns `None`,
    /// e.g. on division by zero), the stack is left untouched.
    pub fn binary_op(&mut self, op: impl FnOnce(i64, i64) -> Option<i64>) -> bool {
        let len = self.values.len();
        if len < 2 {
            return false;
        }
        let (a, b) = (self.values[len - 2], self.values[len - 1]);
        match op(a, b) {
            Some(result) => {
                self.values.truncate(len - 2);
                self.values.push(result);
                true
            }
            None => false,
        }
    }
}

impl From<Vec<i64>> for OperandStack {
    fn from(values: Vec<i64>) -> Self {
        OperandStack { values }
    }
}

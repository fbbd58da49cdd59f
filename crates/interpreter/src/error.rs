//! Fatal errors
//!
//! Only two kinds of condition stop a program: syntax errors (a malformed
//! construct or a character the tokenizer does not know) and reads of
//! undefined variables. Everything else the engine treats as a silent
//! no-op. A fatal error propagates with `?` out of every sub-program and
//! loop, and the run records it exactly once.

use bluenexus_core::VarName;
use thiserror::Error;

/// Which of the two fatal categories an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    UndefinedVariable,
}

/// A condition that halts the current run
///
/// Offsets are character positions in the cleaned source (whitespace and
/// commas removed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    /// A bracket, brace, paren or quote construct that is not closed properly
    #[error("[BN-02] Syntax Error @ char {offset}")]
    Malformed { offset: usize },

    #[error("[BN-02] Syntax Error @ char {offset}: nesting deeper than {limit}")]
    NestingTooDeep { offset: usize, limit: usize },

    #[error("[BN-02] Syntax Error @ char {offset}: integer literal out of range")]
    BadLiteral { offset: usize },

    #[error("[BN-06] Unknown Command @ char {offset}: {found}")]
    UnknownCommand { offset: usize, found: char },

    #[error("[BN-01] Undefined Variable @ char {offset}: {name}")]
    UndefinedVariable { offset: usize, name: VarName },
}

impl FatalError {
    pub fn offset(&self) -> usize {
        match self {
            FatalError::Malformed { offset }
            | FatalError::NestingTooDeep { offset, .. }
            | FatalError::BadLiteral { offset }
            | FatalError::UnknownCommand { offset, .. }
            | FatalError::UndefinedVariable { offset, .. } => *offset,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FatalError::UndefinedVariable { .. } => ErrorKind::UndefinedVariable,
            _ => ErrorKind::Syntax,
        }
    }
}

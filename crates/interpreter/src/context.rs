//! Execution context
//!
//! All mutable state of one run lives here and is passed explicitly, as
//! `&mut ExecutionContext`, into every execution call, top-level and nested
//! alike. A run builds a fresh context and hands it back in its report.

use bluenexus_core::{OperandStack, VariableTable};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    pub stack: OperandStack,
    pub variables: VariableTable,
    /// Set once by a fatal error; never cleared within a run
    pub halted: bool,
    /// Everything printed during the run, error messages included
    pub output: Vec<String>,
    /// Current sub-program nesting
    pub(crate) depth: usize,
}

impl ExecutionContext {
    pub fn new() -> Self {
        ExecutionContext::default()
    }
}

//! BlueNexus Interpreter Library
//!
//! Tokenizes and executes programs in BlueNexus, a small stack-based
//! esoteric language whose variables hold either scalars or rotating
//! integer sequences.
//!
//! # Embedding
//!
//! Everything the language can do to the outside world goes through a
//! [`Host`]. [`RecordingHost`] keeps output in memory and serves input from
//! a queue:
//!
//! ```rust
//! use bluenexus::{Interpreter, RecordingHost};
//!
//! let mut interp = Interpreter::new(RecordingHost::new().with_inputs(["4"]));
//! let report = interp.run(r#">n<&< ▲n ▲n × #"#);
//!
//! assert!(!report.is_halted());
//! assert_eq!(report.stack(), &[16]);
//! assert_eq!(interp.host().output_text(), "16");
//! ```

mod assign;
pub mod config;
pub mod context;
mod control;
pub mod engine;
pub mod error;
pub mod host;
pub mod lexer;
pub mod token;

pub use config::{ConfigError, InterpreterConfig};
pub use context::ExecutionContext;
pub use engine::{
    COMPLETION_NOTICE, Interpreter, RunOutcome, RunReport, merge_push_markers, tokenize_program,
};
pub use error::{ErrorKind, FatalError};
pub use host::{Host, InputReply, RecordingHost, parse_scalar_input};
pub use token::{CompareOp, ConditionalKind, Fragment, Glyph, Token, TokenKind};

pub use bluenexus_core::{OperandStack, Value, VarName, VariableTable};

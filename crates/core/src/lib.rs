//! BlueNexus Core: the value model shared by the tokenizer, engine and tools
//!
//! Key design principles:
//! - Value: what a variable holds (a scalar Int or a rotating Sequence)
//! - OperandStack: the LIFO of integers every operator works on
//! - VariableTable: single-letter names bound to values
//!
//! # Modules
//!
//! - `arithmetic`: Floor division and remainder with wrapping overflow
//! - `stack`: Operand stack and its forgiving stack operations
//! - `value`: Scalar / Sequence values and rotation
//! - `variables`: Variable names and the variable table

pub mod arithmetic;
pub mod stack;
pub mod value;
pub mod variables;

pub use arithmetic::{floor_div, remainder};
pub use stack::OperandStack;
pub use value::{Value, char_from_code};
pub use variables::{VarName, VariableTable};

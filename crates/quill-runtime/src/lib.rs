//! Embedding facade for the Quill language.
//!
//! Quill compiles a minimal typed arithmetic/boolean/statement language
//! into stack-machine code at run time, from a text string:
//!
//! ```
//! use quill_runtime::{compile_expression, HostType};
//! use std::sync::Arc;
//!
//! let host = Arc::new(HostType::new());
//! let compiled = compile_expression("x * y * z * x", host).unwrap();
//! assert_eq!(compiled.call(2, 3, 4).unwrap(), 48);
//! ```

pub mod compile;
pub mod error;

pub use compile::{
    compile_expression, compile_expression_with, compile_statements, compile_statements_with,
    evaluate, CompiledExpression, CompiledProgram,
};
pub use error::QuillError;

// Re-export the pieces embedders interact with.
pub use quill_core::{HostType, Value, VmError};
pub use quill_parser::{CompileError, CompileOptions, CompilerType};

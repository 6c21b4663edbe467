//! Compilation errors.
//!
//! A single reported category with distinguishable sub-kinds. Every error
//! aborts the compile call immediately; compilation is all-or-nothing.
//! Parser-raised variants carry an excerpt of the tokens surrounding the
//! failure point.

use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error("unexpected character '{character}' at {line}:{column}")]
    Lex {
        character: char,
        line: u32,
        column: u32,
    },

    #[error("{message} (near: {context})")]
    Syntax { message: String, context: String },

    #[error("{message} (near: {context})")]
    Type { message: String, context: String },

    #[error("{message} (near: {context})")]
    Scope { message: String, context: String },

    #[error("Integral constant is too large (near: {context})")]
    ConstantTooLarge { context: String },

    #[error("operation is overflow in compile mode (near: {context})")]
    Overflow { context: String },

    #[error("Divide by zero (near: {context})")]
    DivideByZero { context: String },

    #[error("end of program is reachable without any return statement")]
    MissingReturn,

    #[error("too many local variables (max 65535)")]
    TooManyLocals,

    #[error("internal compiler error: {0}")]
    Internal(String),
}

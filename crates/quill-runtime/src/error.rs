//! Combined error type for embedders.

use quill_core::VmError;
use quill_parser::CompileError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QuillError {
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("runtime error: {0}")]
    Vm(#[from] VmError),
}

//! VM execution errors.

use thiserror::Error;

pub type VmResult<T> = Result<T, VmError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum VmError {
    #[error("operand stack underflow")]
    StackUnderflow,

    #[error("Attempted to divide by zero")]
    DivisionByZero,

    #[error("operand type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("jump to label L{0} is out of bounds")]
    InvalidJump(u32),

    #[error("slot index {index} is out of bounds")]
    BadSlot { index: u16 },

    #[error("program references unbound host method '{0}'")]
    UnboundMethod(String),

    #[error("program references unbound host field '{0}'")]
    UnboundField(String),

    #[error("expected {expected} argument(s), found {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error("argument {index} does not fit the parameter type")]
    ArgumentOutOfRange { index: usize },

    #[error("execution ran past the end of the instruction stream")]
    EndOfCode,
}

//! Program construction errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BytecodeError {
    #[error("label L{0} was defined but never marked")]
    UnboundLabel(u32),

    #[error("too many host methods (max 65535)")]
    TooManyMethods,

    #[error("too many host fields (max 65535)")]
    TooManyFields,
}

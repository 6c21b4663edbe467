//! Instruction set, program container and builder for the Quill VM.

pub mod builder;
pub mod error;
pub mod instr;
pub mod program;

pub use builder::ProgramBuilder;
pub use error::BytecodeError;
pub use instr::{Instr, Label};
pub use program::{FieldRef, MethodRef, Program, SlotType};

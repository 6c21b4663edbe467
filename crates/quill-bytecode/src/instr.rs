//! Instruction set for the Quill VM.
//!
//! The VM is a stack machine. Instructions are kept as a typed stream
//! (one enum value per instruction) rather than an encoded byte stream;
//! branch targets are opaque label handles resolved through the program's
//! label table.
//!
//! Instructions are organized into categories:
//! - constants
//! - slot access (arguments, locals, static fields; value and address forms)
//! - arithmetic (width-homogeneous, wrapping at run time)
//! - widening
//! - comparison (`Lt`/`Gt`/`Eq` only; richer comparisons are synthesized
//!   by the code generator)
//! - control flow
//! - calls and stack maintenance

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque branch target, created by `ProgramBuilder::define_label` and
/// resolved through `Program::labels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A single VM instruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Instr {
    // ===== Constants =====
    /// Push a 32-bit integer constant
    ConstI32(i32),
    /// Push a 64-bit integer constant
    ConstI64(i64),
    /// Push boolean true
    ConstTrue,
    /// Push boolean false
    ConstFalse,

    // ===== Arguments =====
    /// Load argument value onto the stack
    LoadArg(u16),
    /// Store top of stack to an argument slot
    StoreArg(u16),
    /// Push the address of an argument slot
    LoadArgRef(u16),

    // ===== Locals =====
    /// Load local value onto the stack
    LoadLocal(u16),
    /// Store top of stack to a local slot
    StoreLocal(u16),
    /// Push the address of a local slot
    LoadLocalRef(u16),

    // ===== Static fields =====
    /// Load a host static field value
    LoadStatic(u16),
    /// Store top of stack to a host static field
    StoreStatic(u16),
    /// Push the address of a host static field
    LoadStaticRef(u16),

    // ===== Arithmetic =====
    /// pop b, pop a, push a + b (wrapping)
    Add,
    /// pop b, pop a, push a - b (wrapping)
    Sub,
    /// pop b, pop a, push a * b (wrapping)
    Mul,
    /// pop b, pop a, push a / b; faults on zero divisor
    Div,
    /// pop a, push -a (wrapping)
    Neg,

    // ===== Widening =====
    /// pop a 32-bit integer, push it widened to 64 bits
    I2L,

    // ===== Comparison =====
    /// pop b, pop a, push a < b
    Lt,
    /// pop b, pop a, push a > b
    Gt,
    /// pop b, pop a, push a == b
    Eq,

    // ===== Control flow =====
    /// Unconditional jump
    Jump(Label),
    /// pop a boolean; jump when false
    JumpIfFalse(Label),

    // ===== Calls and stack maintenance =====
    /// Call the bound host method at this index in the method table
    Call(u16),
    /// Return the top of stack to the caller
    Ret,
    /// Discard the top of stack
    Pop,
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::ConstI32(v) => write!(f, "const.i32 {v}"),
            Instr::ConstI64(v) => write!(f, "const.i64 {v}"),
            Instr::ConstTrue => write!(f, "const.true"),
            Instr::ConstFalse => write!(f, "const.false"),
            Instr::LoadArg(i) => write!(f, "ldarg {i}"),
            Instr::StoreArg(i) => write!(f, "starg {i}"),
            Instr::LoadArgRef(i) => write!(f, "ldarga {i}"),
            Instr::LoadLocal(i) => write!(f, "ldloc {i}"),
            Instr::StoreLocal(i) => write!(f, "stloc {i}"),
            Instr::LoadLocalRef(i) => write!(f, "ldloca {i}"),
            Instr::LoadStatic(i) => write!(f, "ldsfld {i}"),
            Instr::StoreStatic(i) => write!(f, "stsfld {i}"),
            Instr::LoadStaticRef(i) => write!(f, "ldsflda {i}"),
            Instr::Add => write!(f, "add"),
            Instr::Sub => write!(f, "sub"),
            Instr::Mul => write!(f, "mul"),
            Instr::Div => write!(f, "div"),
            Instr::Neg => write!(f, "neg"),
            Instr::I2L => write!(f, "conv.i8"),
            Instr::Lt => write!(f, "clt"),
            Instr::Gt => write!(f, "cgt"),
            Instr::Eq => write!(f, "ceq"),
            Instr::Jump(l) => write!(f, "br {l}"),
            Instr::JumpIfFalse(l) => write!(f, "brfalse {l}"),
            Instr::Call(i) => write!(f, "call {i}"),
            Instr::Ret => write!(f, "ret"),
            Instr::Pop => write!(f, "pop"),
        }
    }
}

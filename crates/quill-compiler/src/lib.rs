//! Quill Compiler - typed AST to stack-machine code generation.
//!
//! This crate lowers the parser's type-checked AST into the linear,
//! label-based instruction stream executed by the Quill VM. It assumes a
//! type-correct, reachability-checked input and performs no re-validation.

pub mod codegen;

pub use codegen::CodeGenerator;

// Re-export the shared error type and the bytecode surface for convenience
pub use quill_bytecode::{Instr, Label, Program, ProgramBuilder, SlotType};
pub use quill_parser::{CompileError, CompileResult};

use quill_parser::ast::{Block, Expression};
use quill_parser::SlotLayout;

/// Generate a program from a statement block.
pub fn generate_program(name: &str, block: &Block, layout: &SlotLayout) -> CompileResult<Program> {
    let mut generator = CodeGenerator::new(name, layout)?;
    generator.emit_block(block)?;
    generator.finish()
}

/// Generate a program from a single expression: the expression's value,
/// widened to a long where necessary, is returned to the caller.
pub fn generate_expression(
    name: &str,
    expr: &Expression,
    layout: &SlotLayout,
) -> CompileResult<Program> {
    let mut generator = CodeGenerator::new(name, layout)?;
    generator.emit_return_value(expr)?;
    generator.finish()
}

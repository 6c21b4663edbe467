//! The compile pipeline: source text in, invocable program out.
//!
//! Compilation is stateless and in-memory: lex, parse/fold, generate,
//! bind host symbols, return a handle. Nothing persists between calls,
//! and independent calls may run concurrently against one shared
//! `HostType`.

use crate::error::QuillError;
use quill_bytecode::{Program, SlotType};
use quill_core::{HostBinding, HostType, Value, Vm, VmError};
use quill_parser::symbols::{Env, ParamTable};
use quill_parser::{CompileError, CompileOptions, CompilerType, Parser};
use std::sync::Arc;

/// The fixed parameter convention of the expression entry point.
const EXPRESSION_PARAMS: [(&str, CompilerType); 3] = [
    ("x", CompilerType::Long),
    ("y", CompilerType::Long),
    ("z", CompilerType::Long),
];

/// A compiled expression, invocable as `(i64, i64, i64) -> i64` with the
/// fixed long parameters `x`, `y`, `z`.
#[derive(Debug)]
pub struct CompiledExpression {
    program: Program,
    host: Arc<HostType>,
    binding: HostBinding,
}

impl CompiledExpression {
    pub fn call(&self, x: i64, y: i64, z: i64) -> Result<i64, VmError> {
        let args = vec![Value::I64(x), Value::I64(y), Value::I64(z)];
        let result = Vm::new().execute(&self.program, args, &self.host, &self.binding)?;
        result.as_long().ok_or(VmError::TypeMismatch {
            expected: "scalar result",
            found: result.type_name(),
        })
    }

    /// The emitted instruction trace, as a label-marked listing.
    pub fn disassemble(&self) -> String {
        self.program.disassemble()
    }

    /// The emitted instruction trace as JSON, for tooling.
    pub fn trace_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.program)
    }

    pub fn program(&self) -> &Program {
        &self.program
    }
}

/// A compiled statement program, invocable with positional arguments.
#[derive(Debug)]
pub struct CompiledProgram {
    program: Program,
    host: Arc<HostType>,
    binding: HostBinding,
}

impl CompiledProgram {
    pub fn call(&self, args: &[i64]) -> Result<i64, VmError> {
        let values = convert_args(args, &self.program.param_types)?;
        let result = Vm::new().execute(&self.program, values, &self.host, &self.binding)?;
        result.as_long().ok_or(VmError::TypeMismatch {
            expected: "scalar result",
            found: result.type_name(),
        })
    }

    pub fn disassemble(&self) -> String {
        self.program.disassemble()
    }

    pub fn trace_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.program)
    }

    pub fn program(&self) -> &Program {
        &self.program
    }
}

/// Compile an expression against a host type.
pub fn compile_expression(
    source: &str,
    host: Arc<HostType>,
) -> Result<CompiledExpression, CompileError> {
    compile_expression_with(source, host, CompileOptions::default())
}

pub fn compile_expression_with(
    source: &str,
    host: Arc<HostType>,
    options: CompileOptions,
) -> Result<CompiledExpression, CompileError> {
    let env = Env::new(ParamTable::new(&EXPRESSION_PARAMS), host.signatures());
    let parser = Parser::with_options(source, env, options)?;
    let (expr, layout) = parser.parse_expression()?;
    let program = quill_compiler::generate_expression("expression", &expr, &layout)?;
    let binding = bind(&program, &host)?;
    Ok(CompiledExpression {
        program,
        host,
        binding,
    })
}

/// Compile a statement sequence against a host type, with caller-chosen
/// parameters. The source must guarantee return on every path.
pub fn compile_statements(
    source: &str,
    host: Arc<HostType>,
    params: &[(&str, CompilerType)],
) -> Result<CompiledProgram, CompileError> {
    compile_statements_with(source, host, params, CompileOptions::default())
}

pub fn compile_statements_with(
    source: &str,
    host: Arc<HostType>,
    params: &[(&str, CompilerType)],
    options: CompileOptions,
) -> Result<CompiledProgram, CompileError> {
    let env = Env::new(ParamTable::new(params), host.signatures());
    let parser = Parser::with_options(source, env, options)?;
    let (block, layout) = parser.parse_program()?;
    let program = quill_compiler::generate_program("program", &block, &layout)?;
    let binding = bind(&program, &host)?;
    Ok(CompiledProgram {
        program,
        host,
        binding,
    })
}

/// Compile and immediately invoke an expression.
pub fn evaluate(source: &str, host: Arc<HostType>, x: i64, y: i64, z: i64) -> Result<i64, QuillError> {
    let compiled = compile_expression(source, host)?;
    Ok(compiled.call(x, y, z)?)
}

/// The parser resolved every symbol against this host's signature export,
/// so binding can only fail if the two drift apart mid-compile.
fn bind(program: &Program, host: &HostType) -> Result<HostBinding, CompileError> {
    HostBinding::resolve(program, host)
        .map_err(|err| CompileError::Internal(format!("host binding failed: {err}")))
}

fn convert_args(args: &[i64], params: &[SlotType]) -> Result<Vec<Value>, VmError> {
    if args.len() != params.len() {
        return Err(VmError::ArgumentCount {
            expected: params.len(),
            found: args.len(),
        });
    }
    args.iter()
        .zip(params)
        .enumerate()
        .map(|(index, (&raw, ty))| match ty {
            SlotType::I32 => i32::try_from(raw)
                .map(Value::I32)
                .map_err(|_| VmError::ArgumentOutOfRange { index }),
            SlotType::I64 => Ok(Value::I64(raw)),
            SlotType::Bool => Ok(Value::Bool(raw != 0)),
        })
        .collect()
}

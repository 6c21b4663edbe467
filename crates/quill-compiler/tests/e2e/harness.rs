//! Test harness for end-to-end compilation and execution.
//!
//! Compiles Quill source through the full pipeline (lex → parse/fold →
//! generate) and executes the result on the VM.

use quill_bytecode::Program;
use quill_core::{HostBinding, HostType, Value, Vm, VmError};
use quill_parser::symbols::{Env, ParamTable};
use quill_parser::{CompileError, CompileOptions, CompilerType, Parser};

/// Error type for e2e tests.
#[derive(Debug)]
pub enum E2eError {
    Compile(CompileError),
    Vm(VmError),
}

impl std::fmt::Display for E2eError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            E2eError::Compile(e) => write!(f, "Compile error: {e}"),
            E2eError::Vm(e) => write!(f, "VM error: {e}"),
        }
    }
}

impl std::error::Error for E2eError {}

pub type E2eResult<T> = Result<T, E2eError>;

/// The expression entry point's fixed parameters.
pub fn xyz_params() -> ParamTable {
    ParamTable::new(&[
        ("x", CompilerType::Long),
        ("y", CompilerType::Long),
        ("z", CompilerType::Long),
    ])
}

/// Compile an expression against the fixed x/y/z convention.
pub fn compile_expr(source: &str, host: &HostType) -> Result<Program, CompileError> {
    compile_expr_with(source, host, CompileOptions::default())
}

pub fn compile_expr_with(
    source: &str,
    host: &HostType,
    options: CompileOptions,
) -> Result<Program, CompileError> {
    let env = Env::new(xyz_params(), host.signatures());
    let parser = Parser::with_options(source, env, options)?;
    let (expr, layout) = parser.parse_expression()?;
    quill_compiler::generate_expression("expression", &expr, &layout)
}

/// Compile a statement program with caller-chosen parameters.
pub fn compile_stmts(
    source: &str,
    host: &HostType,
    params: &[(&str, CompilerType)],
) -> Result<Program, CompileError> {
    let env = Env::new(ParamTable::new(params), host.signatures());
    let parser = Parser::new(source, env)?;
    let (block, layout) = parser.parse_program()?;
    quill_compiler::generate_program("program", &block, &layout)
}

pub fn run(program: &Program, args: Vec<Value>, host: &HostType) -> Result<Value, VmError> {
    let binding = HostBinding::resolve(program, host)?;
    Vm::new().execute(program, args, host, &binding)
}

/// Compile and run an expression with the given x/y/z arguments.
pub fn run_expr(source: &str, host: &HostType, x: i64, y: i64, z: i64) -> E2eResult<Value> {
    let program = compile_expr(source, host).map_err(E2eError::Compile)?;
    run(
        &program,
        vec![Value::I64(x), Value::I64(y), Value::I64(z)],
        host,
    )
    .map_err(E2eError::Vm)
}

/// Compile and run an expression, expecting a specific long result.
pub fn expect_long(source: &str, args: (i64, i64, i64), expected: i64) {
    let host = HostType::new();
    match run_expr(source, &host, args.0, args.1, args.2) {
        Ok(value) => {
            let actual = value
                .as_long()
                .unwrap_or_else(|| panic!("expected scalar result, got {value:?}\nSource:\n{source}"));
            assert_eq!(actual, expected, "Wrong result for:\n{source}");
        }
        Err(e) => panic!("Compilation/execution failed: {e}\nSource:\n{source}"),
    }
}

/// Compile and run an expression, expecting a boolean result.
pub fn expect_bool(source: &str, args: (i64, i64, i64), expected: bool) {
    let host = HostType::new();
    match run_expr(source, &host, args.0, args.1, args.2) {
        Ok(value) => {
            let actual = value
                .as_bool()
                .unwrap_or_else(|| panic!("expected bool result, got {value:?}\nSource:\n{source}"));
            assert_eq!(actual, expected, "Wrong result for:\n{source}");
        }
        Err(e) => panic!("Compilation/execution failed: {e}\nSource:\n{source}"),
    }
}

/// Compile a statement program and run it, expecting a long result.
pub fn expect_stmts_long(
    source: &str,
    params: &[(&str, CompilerType)],
    args: Vec<Value>,
    expected: i64,
) {
    let host = HostType::new();
    expect_stmts_long_with_host(source, &host, params, args, expected);
}

pub fn expect_stmts_long_with_host(
    source: &str,
    host: &HostType,
    params: &[(&str, CompilerType)],
    args: Vec<Value>,
    expected: i64,
) {
    let program = match compile_stmts(source, host, params) {
        Ok(p) => p,
        Err(e) => panic!("Compilation failed: {e}\nSource:\n{source}"),
    };
    match run(&program, args, host) {
        Ok(value) => {
            let actual = value
                .as_long()
                .unwrap_or_else(|| panic!("expected scalar result, got {value:?}\nSource:\n{source}"));
            assert_eq!(actual, expected, "Wrong result for:\n{source}");
        }
        Err(e) => panic!("Execution failed: {e}\nSource:\n{source}"),
    }
}

/// Expect compilation to fail with an error whose message contains the
/// given pattern.
pub fn expect_compile_error(source: &str, pattern: &str) {
    let host = HostType::new();
    match compile_expr(source, &host) {
        Ok(_) => panic!(
            "Expected compile error containing '{pattern}', but compilation succeeded\nSource:\n{source}"
        ),
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(pattern),
                "Expected error containing '{pattern}', got: {message}\nSource:\n{source}"
            );
        }
    }
}

/// Expect statement compilation to fail with a matching message.
pub fn expect_stmts_compile_error(source: &str, params: &[(&str, CompilerType)], pattern: &str) {
    let host = HostType::new();
    match compile_stmts(source, &host, params) {
        Ok(_) => panic!(
            "Expected compile error containing '{pattern}', but compilation succeeded\nSource:\n{source}"
        ),
        Err(e) => {
            let message = e.to_string();
            assert!(
                message.contains(pattern),
                "Expected error containing '{pattern}', got: {message}\nSource:\n{source}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_works() {
        let host = HostType::new();
        assert!(compile_expr("1 + 2", &host).is_ok());
    }
}

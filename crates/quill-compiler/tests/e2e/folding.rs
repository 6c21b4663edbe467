//! Constant folding: observable equivalence and compile-time error
//! surfacing.

use crate::harness::{compile_expr, compile_expr_with, expect_compile_error, expect_long, run};
use quill_bytecode::Instr;
use quill_core::{HostType, Value, VmError};
use quill_parser::CompileOptions;

#[test]
fn test_literal_chain_folds_to_one_constant() {
    let host = HostType::new();
    let program = compile_expr("1 + 2 + 3", &host).unwrap();
    assert!(program.code.contains(&Instr::ConstI32(6)));
    // Only the folded constant, its widening, and the return remain.
    assert_eq!(program.code.len(), 3);
}

#[test]
fn test_folded_and_unfolded_agree() {
    let host = HostType::new();
    let sources = [
        "1 + 2 * 3 - 4",
        "(5 + 5) / 3",
        "2147483647 - 1 + 1",
        "x + 10 * 10",
        "-3 * -4",
    ];
    let options = CompileOptions {
        fold_constants: false,
    };
    for source in sources {
        let folded = compile_expr(source, &host).unwrap();
        let unfolded = compile_expr_with(source, &host, options).unwrap();
        let args = vec![Value::I64(9), Value::I64(0), Value::I64(0)];
        assert_eq!(
            run(&folded, args.clone(), &host).unwrap(),
            run(&unfolded, args, &host).unwrap(),
            "fold changed the result of {source}"
        );
    }
}

#[test]
fn test_fold_overflow_errors() {
    expect_compile_error("2147483647 + 1", "overflow in compile mode");
    expect_compile_error("int.MinValue - 1", "overflow in compile mode");
    expect_compile_error("long.MaxValue + 1", "overflow in compile mode");
    expect_compile_error("long.MinValue * 2", "overflow in compile mode");
}

#[test]
fn test_divide_by_zero_errors() {
    expect_compile_error("12 / 0", "Divide by zero");
    expect_compile_error("12 / (1 + 2 - 3)", "Divide by zero");
    expect_compile_error("x / 0", "Divide by zero");
}

#[test]
fn test_zero_divisor_expressions_that_compile() {
    let host = HostType::new();
    assert!(compile_expr("x / (y - y)", &host).is_ok());
    assert!(compile_expr("12 / (0 * (x + y))", &host).is_ok());
}

#[test]
fn test_unfolded_zero_divisor_faults_at_run_time_instead() {
    // With folding disabled the compound divisor is left to run time,
    // where the same zero surfaces as a VM fault.
    let host = HostType::new();
    let options = CompileOptions {
        fold_constants: false,
    };
    let program = compile_expr_with("12 / (1 + 2 - 3)", &host, options).unwrap();
    let args = vec![Value::I64(0), Value::I64(0), Value::I64(0)];
    assert_eq!(run(&program, args, &host), Err(VmError::DivisionByZero));
}

#[test]
fn test_identity_folds_do_not_change_results() {
    expect_long("1 * x", (41, 0, 0), 41);
    expect_long("x * 1", (41, 0, 0), 41);
    expect_long("x / 1", (41, 0, 0), 41);
    expect_long("0 * x", (41, 0, 0), 0);
    expect_long("x * 0", (41, 0, 0), 0);
}

#[test]
fn test_constant_too_large() {
    expect_compile_error("9223372036854775808", "Integral constant is too large");
    expect_compile_error("99999999999999999999 + 1", "Integral constant is too large");
}

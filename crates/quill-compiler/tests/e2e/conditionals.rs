//! If/else lowering and reachability.

use crate::harness::{expect_stmts_compile_error, expect_stmts_long};
use quill_core::Value;
use quill_parser::CompilerType;

fn x_param() -> Vec<(&'static str, CompilerType)> {
    vec![("x", CompilerType::Long)]
}

#[test]
fn test_if_taken_and_skipped() {
    let source = "if (x == 12) { return 1; } return 2;";
    expect_stmts_long(source, &x_param(), vec![Value::I64(12)], 1);
    expect_stmts_long(source, &x_param(), vec![Value::I64(13)], 2);
}

#[test]
fn test_if_with_declaration_in_then_block() {
    let source = "if (x == 12) { int t = 33; } return 1;";
    expect_stmts_long(source, &x_param(), vec![Value::I64(12)], 1);
    expect_stmts_long(source, &x_param(), vec![Value::I64(0)], 1);
}

#[test]
fn test_if_else_branches() {
    let source = "if (x < 0) { return -1; } else { return 1; }";
    expect_stmts_long(source, &x_param(), vec![Value::I64(-5)], -1);
    expect_stmts_long(source, &x_param(), vec![Value::I64(5)], 1);
}

#[test]
fn test_else_if_chain() {
    let source = "
        if (x == 1) { return 10; }
        else if (x == 2) { return 20; }
        else { return 30; }
    ";
    expect_stmts_long(source, &x_param(), vec![Value::I64(1)], 10);
    expect_stmts_long(source, &x_param(), vec![Value::I64(2)], 20);
    expect_stmts_long(source, &x_param(), vec![Value::I64(3)], 30);
}

#[test]
fn test_nested_ifs() {
    let source = "
        if (x > 0) {
            if (x > 10) { return 2; }
            return 1;
        }
        return 0;
    ";
    expect_stmts_long(source, &x_param(), vec![Value::I64(20)], 2);
    expect_stmts_long(source, &x_param(), vec![Value::I64(5)], 1);
    expect_stmts_long(source, &x_param(), vec![Value::I64(-1)], 0);
}

#[test]
fn test_then_without_return_falls_through_to_else_join() {
    let source = "
        int r = 0;
        if (x == 1) { r = 10; } else { r = 20; }
        return r;
    ";
    expect_stmts_long(source, &x_param(), vec![Value::I64(1)], 10);
    expect_stmts_long(source, &x_param(), vec![Value::I64(2)], 20);
}

#[test]
fn test_short_circuit_condition_in_if() {
    let source = "if (x != 0 && 100 / x > 10) { return 1; } return 0;";
    // x = 0 must not reach the division
    expect_stmts_long(source, &x_param(), vec![Value::I64(0)], 0);
    expect_stmts_long(source, &x_param(), vec![Value::I64(5)], 1);
    expect_stmts_long(source, &x_param(), vec![Value::I64(50)], 0);
}

#[test]
fn test_reachability_errors() {
    expect_stmts_compile_error(
        "if (x == 1) { return 1; } else {}",
        &x_param(),
        "reachable without any return statement",
    );
    expect_stmts_compile_error(
        "if (x == 1) { return 1; }",
        &x_param(),
        "reachable without any return statement",
    );
    expect_stmts_compile_error("int a = 1;", &x_param(), "reachable");
}

#[test]
fn test_reachability_fixed_by_trailing_return() {
    let source = "if (x == 1) { return 1; } else {} return 9;";
    expect_stmts_long(source, &x_param(), vec![Value::I64(2)], 9);
}

//! Arithmetic evaluation.

use crate::harness::{expect_long, run_expr};
use quill_core::{HostType, VmError};

#[test]
fn test_basic_operations() {
    expect_long("x + y", (3, 4, 0), 7);
    expect_long("x - y", (10, 4, 0), 6);
    expect_long("x * y", (6, 7, 0), 42);
    expect_long("x / y", (42, 6, 0), 7);
}

#[test]
fn test_left_associative_evaluation() {
    // (10 - 3) - 4, never 10 - (3 - 4)
    expect_long("x - y - z", (10, 3, 4), 3);
    // (100 / 10) / 5
    expect_long("x / y / z", (100, 10, 5), 2);
}

#[test]
fn test_precedence() {
    expect_long("x + y * z", (2, 3, 4), 14);
    expect_long("(x + y) * z", (2, 3, 4), 20);
}

#[test]
fn test_repeated_variable() {
    expect_long("x * y * z * x", (2, 3, 4), 48);
}

#[test]
fn test_unary_negation() {
    expect_long("-x", (5, 0, 0), -5);
    expect_long("-(x + y)", (2, 3, 0), -5);
    expect_long("x - -y", (1, 2, 0), 3);
}

#[test]
fn test_mixed_width_widening() {
    // int literals widen against the long parameters
    expect_long("x + 1", (i32::MAX as i64, 0, 0), i32::MAX as i64 + 1);
    expect_long("x * 1000000000 / y", (4, 2, 0), 2000000000);
}

#[test]
fn test_runtime_arithmetic_is_unchecked() {
    // Folding would reject this at compile time, but a variable keeps the
    // arithmetic at run time, where it wraps.
    expect_long("long.MaxValue + x", (1, 0, 0), i64::MIN);
    expect_long("long.MinValue - x", (1, 0, 0), i64::MAX);
}

#[test]
fn test_division_truncates_toward_zero() {
    expect_long("x / y", (-7, 2, 0), -3);
    expect_long("x / y", (7, -2, 0), -3);
}

#[test]
fn test_runtime_division_by_zero_faults() {
    let host = HostType::new();
    let err = run_expr("x / (y - y)", &host, 1, 5, 0).unwrap_err();
    assert!(matches!(
        err,
        crate::harness::E2eError::Vm(VmError::DivisionByZero)
    ));
}

#[test]
fn test_named_constants_evaluate() {
    expect_long("int.MaxValue", (0, 0, 0), i32::MAX as i64);
    expect_long("long.MinValue + x", (1, 0, 0), i64::MIN + 1);
}

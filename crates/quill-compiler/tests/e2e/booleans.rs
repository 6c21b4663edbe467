//! Boolean lowering: comparisons, short-circuit evaluation, De Morgan
//! normalization.

use crate::harness::{expect_bool, expect_stmts_long_with_host};
use quill_core::{HostType, Value};
use quill_parser::CompilerType;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

#[test]
fn test_comparisons() {
    expect_bool("x < y", (1, 2, 0), true);
    expect_bool("x < y", (2, 2, 0), false);
    expect_bool("x <= y", (2, 2, 0), true);
    expect_bool("x > y", (3, 2, 0), true);
    expect_bool("x >= y", (2, 3, 0), false);
    expect_bool("x == y", (5, 5, 0), true);
    expect_bool("x != y", (5, 5, 0), false);
    expect_bool("x != y", (5, 6, 0), true);
}

#[test]
fn test_comparisons_against_literals_widen() {
    expect_bool("x == 12", (12, 0, 0), true);
    expect_bool("x < 0", (-1, 0, 0), true);
    expect_bool("x >= 2147483648", (1 << 40, 0, 0), true);
}

#[test]
fn test_and_or_values() {
    expect_bool("x < y && y < z", (1, 2, 3), true);
    expect_bool("x < y && y < z", (1, 3, 2), false);
    expect_bool("x < y || y < z", (3, 2, 3), true);
    expect_bool("x < y || y < z", (3, 2, 1), false);
}

#[test]
fn test_negation_normalizes() {
    expect_bool("!(x < y)", (2, 1, 0), true);
    expect_bool("!(x == y)", (1, 1, 0), false);
    expect_bool("!(x < y && y < z)", (1, 3, 2), true);
    expect_bool("!(x < y || y < z)", (3, 2, 1), true);
    expect_bool("!(!(x < y))", (1, 2, 0), true);
}

#[test]
fn test_chained_logic() {
    expect_bool("x == 1 && y == 2 && z == 3", (1, 2, 3), true);
    expect_bool("x == 1 && y == 2 && z == 3", (1, 2, 4), false);
    expect_bool("x == 9 || y == 9 || z == 9", (0, 9, 0), true);
}

/// A host method standing in for the right operand's evaluation: the
/// counter observes whether the VM actually reached it.
fn probe_host() -> (HostType, Arc<AtomicI64>) {
    let count = Arc::new(AtomicI64::new(0));
    let probe_count = Arc::clone(&count);
    let mut host = HostType::new();
    host.define_method("probe", &[], CompilerType::Long, move |_| {
        probe_count.fetch_add(1, Ordering::SeqCst);
        Value::I64(1)
    });
    (host, count)
}

#[test]
fn test_and_short_circuits_the_right_operand() {
    let (host, count) = probe_host();
    // x == 1 decides the conjunction; probe() must not run.
    expect_stmts_long_with_host(
        "bool b = x != 1 && probe() != 1; if (b) { return 1; } return 0;",
        &host,
        &[("x", CompilerType::Long)],
        vec![Value::I64(1)],
        0,
    );
    assert_eq!(count.load(Ordering::SeqCst), 0, "probe was not skipped");
}

#[test]
fn test_and_evaluates_right_when_left_is_true() {
    let (host, count) = probe_host();
    expect_stmts_long_with_host(
        "bool b = x != 1 && probe() != 1; if (b) { return 1; } return 0;",
        &host,
        &[("x", CompilerType::Long)],
        vec![Value::I64(2)],
        0,
    );
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_or_short_circuits_the_right_operand() {
    let (host, count) = probe_host();
    expect_stmts_long_with_host(
        "bool b = x == 1 || probe() == 1; if (b) { return 1; } return 0;",
        &host,
        &[("x", CompilerType::Long)],
        vec![Value::I64(1)],
        1,
    );
    assert_eq!(count.load(Ordering::SeqCst), 0, "probe was not skipped");
}

#[test]
fn test_or_evaluates_right_when_left_is_false() {
    let (host, count) = probe_host();
    expect_stmts_long_with_host(
        "bool b = x == 1 || probe() == 1; if (b) { return 1; } return 0;",
        &host,
        &[("x", CompilerType::Long)],
        vec![Value::I64(2)],
        1,
    );
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_bool_locals_in_conditions() {
    expect_stmts_long_with_host(
        "bool b = x < 10; bool c = !b; if (c) { return 1; } return 2;",
        &HostType::new(),
        &[("x", CompilerType::Long)],
        vec![Value::I64(50)],
        1,
    );
}

#[test]
fn test_bool_expression_result_is_zero_or_one() {
    expect_bool("x == 1 && true", (1, 0, 0), true);
    expect_bool("false || x == 1", (0, 0, 0), false);
}

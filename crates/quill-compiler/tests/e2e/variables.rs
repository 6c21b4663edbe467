//! Locals, parameters, and host static fields.

use crate::harness::{
    compile_stmts, expect_stmts_compile_error, expect_stmts_long, expect_stmts_long_with_host, run,
};
use quill_core::{HostType, Value};
use quill_parser::CompilerType;

fn x_param() -> Vec<(&'static str, CompilerType)> {
    vec![("x", CompilerType::Long)]
}

#[test]
fn test_locals_declare_and_read() {
    expect_stmts_long(
        "int a = 1; long b = a; long c = b + x; return c;",
        &x_param(),
        vec![Value::I64(40)],
        41,
    );
}

#[test]
fn test_local_reassignment() {
    expect_stmts_long(
        "long a = 1; a = a + 10; a = a * 2; return a;",
        &x_param(),
        vec![Value::I64(0)],
        22,
    );
}

#[test]
fn test_parameter_assignment() {
    expect_stmts_long(
        "x = x + 5; x = x * 2; return x;",
        &x_param(),
        vec![Value::I64(10)],
        30,
    );
}

#[test]
fn test_int_parameters() {
    expect_stmts_long(
        "int doubled = w * 2; return doubled;",
        &[("w", CompilerType::Int)],
        vec![Value::I32(21)],
        42,
    );
}

#[test]
fn test_bool_parameter_in_condition() {
    let params = vec![("flag", CompilerType::Bool)];
    expect_stmts_long(
        "if (flag) { return 1; } return 0;",
        &params,
        vec![Value::Bool(true)],
        1,
    );
    expect_stmts_long(
        "if (flag) { return 1; } return 0;",
        &params,
        vec![Value::Bool(false)],
        0,
    );
}

#[test]
fn test_field_reads_and_writes_persist_in_host() {
    let mut host = HostType::new();
    host.define_field("Counter", CompilerType::Long, 5);

    expect_stmts_long_with_host(
        "Counter = Counter + 1; return Counter;",
        &host,
        &[],
        vec![],
        6,
    );
    // The store went through the host cell, not a program-local copy.
    assert_eq!(host.field_value("Counter"), Some(6));

    // A second execution of a fresh program sees the stored value.
    expect_stmts_long_with_host(
        "Counter = Counter + 1; return Counter;",
        &host,
        &[],
        vec![],
        7,
    );
}

#[test]
fn test_same_program_rerun_sees_field_updates() {
    let mut host = HostType::new();
    host.define_field("Counter", CompilerType::Long, 0);
    let program = compile_stmts("Counter = Counter + 1; return Counter;", &host, &[]).unwrap();
    assert_eq!(run(&program, vec![], &host).unwrap(), Value::I64(1));
    assert_eq!(run(&program, vec![], &host).unwrap(), Value::I64(2));
}

#[test]
fn test_local_shadows_field() {
    let mut host = HostType::new();
    host.define_field("F", CompilerType::Long, 100);
    expect_stmts_long_with_host("long F = 1; F = F + 1; return F;", &host, &[], vec![], 2);
    // The host field is untouched.
    assert_eq!(host.field_value("F"), Some(100));
}

#[test]
fn test_int_field_width() {
    let mut host = HostType::new();
    host.define_field("Small", CompilerType::Int, 7);
    expect_stmts_long_with_host("return Small + 1;", &host, &[], vec![], 8);
}

#[test]
fn test_narrowing_rules_applied_to_assignment() {
    expect_stmts_compile_error(
        "long q = 5; int w = q; return w;",
        &[],
        "Cannot implicitly convert type 'long' to 'int'",
    );
    expect_stmts_long(
        "int a = 1; long b = a; return b;",
        &[],
        vec![],
        1,
    );
}

#[test]
fn test_declaration_order_is_slot_order() {
    // Mixed-width locals land in their declaration slots.
    expect_stmts_long(
        "int a = 1; long b = 2; int c = 3; bool d = true; return a + b + c;",
        &[],
        vec![],
        6,
    );
}

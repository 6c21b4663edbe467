//! Host method calls: argument passing, widening, void statements, and
//! by-reference arguments.

use crate::harness::{compile_stmts, expect_stmts_compile_error, expect_stmts_long_with_host, run};
use quill_core::{HostType, Value};
use quill_parser::CompilerType::{Int, Long, Void};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

fn math_host() -> HostType {
    let mut host = HostType::new();
    host.define_method("add", &[Long, Long], Long, |args| {
        let a = args[0].as_i64().unwrap_or(0);
        let b = args[1].as_i64().unwrap_or(0);
        Value::I64(a + b)
    });
    host.define_method("square", &[Long], Long, |args| {
        let v = args[0].as_i64().unwrap_or(0);
        Value::I64(v * v)
    });
    host
}

#[test]
fn test_call_in_expression() {
    let host = math_host();
    expect_stmts_long_with_host(
        "return add(x, 10) + square(2);",
        &host,
        &[("x", Long)],
        vec![Value::I64(5)],
        19,
    );
}

#[test]
fn test_nested_calls() {
    let host = math_host();
    expect_stmts_long_with_host(
        "return square(add(x, 1));",
        &host,
        &[("x", Long)],
        vec![Value::I64(3)],
        16,
    );
}

#[test]
fn test_int_arguments_widen_to_long_parameters() {
    let host = math_host();
    // Both literals are int; the formals are long.
    expect_stmts_long_with_host("return add(1, 2);", &host, &[], vec![], 3);
}

#[test]
fn test_void_call_statement() {
    let seen = Arc::new(AtomicI64::new(0));
    let sink = Arc::clone(&seen);
    let mut host = HostType::new();
    host.define_method("log", &[Long], Void, move |args| {
        sink.store(args[0].as_i64().unwrap_or(0), Ordering::SeqCst);
        Value::I64(0)
    });

    expect_stmts_long_with_host("log(x + 1); return 0;", &host, &[("x", Long)], vec![Value::I64(41)], 0);
    assert_eq!(seen.load(Ordering::SeqCst), 42);
}

#[test]
fn test_non_void_call_statement_discards_result() {
    let host = math_host();
    // The unused result is popped; the stack stays balanced.
    expect_stmts_long_with_host(
        "square(x); square(x); return 7;",
        &host,
        &[("x", Long)],
        vec![Value::I64(3)],
        7,
    );
}

#[test]
fn test_ref_argument_writes_back_to_local() {
    let mut host = HostType::new();
    host.define_method("bump", &[Int], Void, |args| {
        let v = args[0].as_i32().unwrap_or(0);
        args[0] = Value::I32(v + 1);
        Value::I32(0)
    });

    expect_stmts_long_with_host(
        "int v = 5; bump(ref v); bump(ref v); return v;",
        &host,
        &[],
        vec![],
        7,
    );
}

#[test]
fn test_ref_argument_writes_back_to_parameter() {
    let mut host = HostType::new();
    host.define_method("zero", &[Long], Void, |args| {
        args[0] = Value::I64(0);
        Value::I64(0)
    });

    expect_stmts_long_with_host(
        "zero(ref x); return x + 1;",
        &host,
        &[("x", Long)],
        vec![Value::I64(99)],
        1,
    );
}

#[test]
fn test_ref_argument_writes_back_to_field() {
    let mut host = HostType::new();
    host.define_field("Total", Long, 10);
    host.define_method("double", &[Long], Void, |args| {
        let v = args[0].as_i64().unwrap_or(0);
        args[0] = Value::I64(v * 2);
        Value::I64(0)
    });

    let program = compile_stmts("double(ref Total); return Total;", &host, &[]).unwrap();
    assert_eq!(run(&program, vec![], &host).unwrap(), Value::I64(20));
    assert_eq!(host.field_value("Total"), Some(20));
}

#[test]
fn test_plain_argument_is_not_written_back() {
    let mut host = HostType::new();
    host.define_method("clobber", &[Long], Long, |args| {
        args[0] = Value::I64(-1);
        Value::I64(1)
    });

    expect_stmts_long_with_host(
        "clobber(x); return x;",
        &host,
        &[("x", Long)],
        vec![Value::I64(5)],
        5,
    );
}

#[test]
fn test_call_argument_type_errors() {
    expect_stmts_compile_error("missing(); return 0;", &[], "does not exist");
}

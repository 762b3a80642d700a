mod common;
use common::*;

use funpy::codegen::literal::render_const;
use funpy::ir::{Const, Expr};

/// Compile `value` as the body of `lit()` and compare it in Python against a
/// hand-written Python literal.
fn round_trip(value: Const, python: &str) {
    let decls = vec![fun("lit", &[], Expr::Const(value.clone()))];
    let check = format!("(lambda v: (type(v).__name__, v == {python}))(lit())");
    if let Some(out) = eval(decls, &check) {
        assert!(out.ends_with(", True)"), "{value:?} rendered as {}: {out}", render_const(&value).unwrap());
    }
}

#[test]
fn integers() {
    round_trip(Const::Int(0), "0");
    round_trip(Const::Int(-1), "-1");
    round_trip(Const::Int(9876543210), "9876543210");
    round_trip(Const::Int(i64::MIN), "-9223372036854775808");
}

#[test]
fn big_integers() {
    round_trip(Const::BigInt("123456789012345678901234567890".into()), "123456789012345678901234567890");
    round_trip(Const::BigInt("-000042".into()), "-42");
}

#[test]
fn floats() {
    round_trip(Const::Float(2.5), "2.5");
    round_trip(Const::Float(-0.1), "-0.1");
    round_trip(Const::Float(1e300), "1e300");
    round_trip(Const::Float(f64::INFINITY), "float('inf')");
}

#[test]
fn nan_is_not_equal_to_itself() {
    let decls = vec![fun("lit", &[], Expr::Const(Const::Float(f64::NAN)))];
    if let Some(out) = eval(decls, "(lambda v: v != v)(lit())") {
        assert_eq!(out, "True");
    }
}

#[test]
fn characters() {
    round_trip(Const::Char('x'), "'x'");
    round_trip(Const::Char('\''), "\"'\"");
    round_trip(Const::Char('\n'), "'\\n'");
    round_trip(Const::Char('é'), "'\\u00e9'");
}

#[test]
fn strings() {
    round_trip(Const::Str("say \"hi\"\nbye".into()), "'say \"hi\"\\nbye'");
    round_trip(Const::Str(String::new()), "''");
    round_trip(Const::Str("back\\slash\ttab".into()), "'back\\\\slash\\ttab'");
    round_trip(Const::Str("\u{1}\u{7f}\u{85}".into()), "'\\x01\\x7f\\x85'");
    round_trip(Const::Str("日本".into()), "'\\u65e5\\u672c'");
}

#[test]
fn negative_literal_is_safe_in_operator_position() {
    let body = sub(int(3), int(-2));
    let module = compile(vec![fun("f", &[], body.clone())]);
    assert!(module.contains("(3 - (-2))"), "{module}");
    if let Some(out) = eval(vec![fun("f", &[], body)], "f()") {
        assert_eq!(out, "5");
    }
}

#[test]
fn invalid_big_integer_is_rejected() {
    let decls = vec![fun("f", &[], Expr::Const(Const::BigInt("12a".into())))];
    let err = funpy::compile_program(&funpy::ir::Program { decls }, &library()).unwrap_err();
    assert!(err.to_string().contains("12a"), "{err}");
}

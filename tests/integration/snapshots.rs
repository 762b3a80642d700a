//! Snapshot tests for generated Python.
//!
//! Uses insta inline snapshots; run `cargo insta review` after intended
//! changes to the emitted shape.

mod common;
use common::*;

use funpy::codegen::CodegenOptions;
use funpy::ir::{Decl, Expr, Program};
use insta::assert_snapshot;

fn render(decls: Vec<Decl>) -> String {
    let options = CodegenOptions { entry: None, preamble: false, jobs: 1 };
    let out = funpy::compile_program(&Program { decls }, &options).unwrap();
    out.trim_end().to_string()
}

fn render_err(decls: Vec<Decl>) -> String {
    funpy::compile_program(&Program { decls }, &library()).unwrap_err().to_string()
}

#[test]
fn tail_recursive_loop() {
    assert_snapshot!(render(vec![sum_loop()]), @"def loop(n, acc):\n    while True:\n        if n == 0:\n            _t1 = acc\n        else:\n            n, acc = (n - 1), (acc + n)\n            continue\n        return _t1");
}

#[test]
fn non_tail_recursion() {
    assert_snapshot!(render(vec![fact()]), @"def fact(n):\n    while True:\n        if n == 0:\n            _t1 = 1\n        else:\n            _t1 = (n * fact((n - 1)))\n        return _t1");
}

#[test]
fn six_way_match_becomes_a_tree() {
    let mut decls: Vec<Decl> = (0..6).map(|i| con(&format!("K{i}"), 0)).collect();
    let alts = (0..6).map(|i| on_con(&format!("K{i}"), &[], int(i * 10))).collect();
    decls.push(fun("name", &["x"], Expr::case(var("x"), alts)));
    assert_snapshot!(render(decls), @"def name(x):\n    while True:\n        if x[0] < 3:\n            if x[0] == 0:\n                _t1 = 0\n            elif x[0] == 1:\n                _t1 = 10\n            elif x[0] == 2:\n                _t1 = 20\n            else:\n                _rt_fail(\"unreachable case\")\n        else:\n            if x[0] == 3:\n                _t1 = 30\n            elif x[0] == 4:\n                _t1 = 40\n            elif x[0] == 5:\n                _t1 = 50\n            else:\n                _rt_fail(\"unreachable case\")\n        return _t1");
}

#[test]
fn closure_over_shadowed_local() {
    // adder(n) = let k = n + 1 in \x -> let k = x * k in k
    let inner = Expr::Lam {
        params: vec!["x".into()],
        body: Box::new(Expr::let_in("k", mul(var("x"), var("k")), var("k"))),
    };
    let body = Expr::let_in("k", add(var("n"), int(1)), inner);
    assert_snapshot!(render(vec![fun("adder", &["n"], body)]), @"def adder(n):\n    while True:\n        k = (n + 1)\n        def _t2(x, k=k):\n            _t1 = (x * k)\n            return _t1\n        return _t2");
}

#[test]
fn unknown_constructor_message() {
    let body = Expr::case(var("x"), vec![on_con("Ghost", &[], int(0))]);
    assert_snapshot!(render_err(vec![fun("f", &["x"], body)]), @"Codegen error: unknown constructor 'Ghost'");
}

#[test]
fn missing_entry_message() {
    let program = Program { decls: vec![fun("helper", &[], int(0))] };
    let err = funpy::compile_program(&program, &CodegenOptions::default()).unwrap_err();
    assert_snapshot!(err.to_string(), @"Codegen error: entry point 'main' is not a declared function");
}

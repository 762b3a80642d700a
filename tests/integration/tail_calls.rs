mod common;
use common::*;

use funpy::ir::Expr;

#[test]
fn accumulator_loop_runs_in_constant_stack() {
    let module = compile(vec![sum_loop()]);
    assert!(module.contains("n, acc = (n - 1), (acc + n)\n"), "{module}");
    assert!(module.contains("continue"), "{module}");
    if let Some(out) = eval(vec![sum_loop()], "loop(100000, 0)") {
        assert_eq!(out, "5000050000");
    }
}

#[test]
fn constructor_walk_restarts_instead_of_recursing() {
    // last(x) = case x of { Cons h t -> case t of { Nil -> h ; _ -> last(t) } ; Nil -> 0 }
    let body = Expr::case(
        var("x"),
        vec![
            on_con(
                "Cons",
                &["h", "t"],
                Expr::case(var("t"), vec![on_con("Nil", &[], var("h")), otherwise(call("last", vec![var("t")]))]),
            ),
            on_con("Nil", &[], int(0)),
        ],
    );
    let decls = vec![con("Nil", 0), con("Cons", 2), fun("last", &["x"], body)];
    let module = compile(decls.clone());
    assert!(module.contains("x = t\n"), "{module}");
    assert!(!module.contains("last(t)"), "{module}");

    // a 5000-element list is far deeper than the default recursion limit
    let build = "(lambda: __import__('functools').reduce(lambda acc, i: (1, i, acc), range(5000), (0,)))()";
    if let Some(out) = eval(decls, &format!("last({build})")) {
        assert_eq!(out, "0");
    }
}

#[test]
fn single_parameter_self_call_in_case_branch() {
    // f(x) = case x of { C a -> f(a) ; D -> 7 }
    let body = Expr::case(
        var("x"),
        vec![on_con("C", &["a"], call("f", vec![var("a")])), on_con("D", &[], int(7))],
    );
    let decls = vec![con("C", 1), con("D", 0), fun("f", &["x"], body)];
    let build = "(lambda: __import__('functools').reduce(lambda acc, _: (0, acc), range(3000), (1,)))()";
    if let Some(out) = eval(decls, &format!("f({build})")) {
        assert_eq!(out, "7");
    }
}

#[test]
fn swapping_arguments_is_simultaneous() {
    // f(x, y, n) = case n of { 0 -> Pair(x, y) ; _ -> f(y, x, n - 1) }
    let body = Expr::case(
        var("n"),
        vec![
            on_int(0, make("Pair", vec![var("x"), var("y")])),
            otherwise(call("f", vec![var("y"), var("x"), sub(var("n"), int(1))])),
        ],
    );
    let decls = vec![con("Pair", 2), fun("f", &["x", "y", "n"], body)];
    let module = compile(decls.clone());
    assert!(module.contains("x, y, n = y, x, (n - 1)\n"), "{module}");
    if let Some(out) = eval(decls, "[f(1, 2, 1), f(1, 2, 2), f(1, 2, 1001)]") {
        assert_eq!(out, "[(0, 2, 1), (0, 1, 2), (0, 2, 1)]");
    }
}

#[test]
fn closures_created_in_a_loop_keep_their_iteration_values() {
    // build(n, acc) = case n of { 0 -> acc ; _ -> build(n - 1, Cons(\u -> n, acc)) }
    // total(l, s) = case l of { Nil -> s ; Cons g t -> total(t, s + g(0)) }
    let thunk = Expr::Lam { params: vec!["u".into()], body: Box::new(var("n")) };
    let build = Expr::case(
        var("n"),
        vec![
            on_int(0, var("acc")),
            otherwise(call("build", vec![sub(var("n"), int(1)), make("Cons", vec![thunk, var("acc")])])),
        ],
    );
    let total = Expr::case(
        var("l"),
        vec![
            on_con("Nil", &[], var("s")),
            on_con("Cons", &["g", "t"], call("total", vec![var("t"), add(var("s"), call("g", vec![int(0)]))])),
        ],
    );
    let decls = vec![
        con("Nil", 0),
        con("Cons", 2),
        fun("build", &["n", "acc"], build),
        fun("total", &["l", "s"], total),
    ];
    if let Some(out) = eval(decls, "total(build(100, (0,)), 0)") {
        assert_eq!(out, "5050");
    }
}

#[test]
fn calls_to_other_functions_stay_calls() {
    // even(n) = case n of { 0 -> 1 ; _ -> odd(n - 1) }
    let even = fun(
        "even",
        &["n"],
        Expr::case(var("n"), vec![on_int(0, int(1)), otherwise(call("odd", vec![sub(var("n"), int(1))]))]),
    );
    let odd = fun(
        "odd",
        &["n"],
        Expr::case(var("n"), vec![on_int(0, int(0)), otherwise(call("even", vec![sub(var("n"), int(1))]))]),
    );
    let module = compile(vec![even.clone(), odd.clone()]);
    assert!(!module.contains("continue"), "{module}");
    if let Some(out) = eval(vec![even, odd], "[even(10), even(7)]") {
        assert_eq!(out, "[1, 0]");
    }
}

#[test]
fn self_call_under_a_lambda_is_not_a_restart() {
    // f(n) = case n of { 0 -> 0 ; _ -> (\u -> f(n - 1))(0) + 1 }
    let inner = Expr::Lam { params: vec!["u".into()], body: Box::new(call("f", vec![sub(var("n"), int(1))])) };
    let body = Expr::case(
        var("n"),
        vec![on_int(0, int(0)), otherwise(add(Expr::app(inner, vec![int(0)]), int(1)))],
    );
    let decls = vec![fun("f", &["n"], body)];
    let module = compile(decls.clone());
    assert!(!module.contains("continue"), "{module}");
    if let Some(out) = eval(decls, "f(20)") {
        assert_eq!(out, "20");
    }
}

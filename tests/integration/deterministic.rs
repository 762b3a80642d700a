mod common;
use common::*;

use funpy::codegen::CodegenOptions;
use funpy::ir::{Decl, Expr, Program};

/// A program exercising every kind of statement the lowerer emits.
fn mixed_program() -> Program {
    let mut decls: Vec<Decl> = (0..8).map(|i| con(&format!("K{i}"), i % 3)).collect();
    for f in 0..24 {
        let alts = (0..8)
            .map(|i| {
                let fields: Vec<String> = (0..i % 3).map(|j| format!("v{j}")).collect();
                let refs: Vec<&str> = fields.iter().map(String::as_str).collect();
                let body = Expr::Lam {
                    params: vec!["u".into()],
                    body: Box::new(Expr::let_in("w", add(var("u"), int(i as i64)), var("w"))),
                };
                on_con(&format!("K{i}"), &refs, body)
            })
            .collect();
        decls.push(fun(&format!("f{f}"), &["x"], Expr::case(var("x"), alts)));
    }
    decls.push(sum_loop());
    decls.push(fact());
    Program { decls }
}

#[test]
fn compiling_twice_is_byte_identical() {
    let program = mixed_program();
    let first = funpy::compile_program(&program, &library()).unwrap();
    let second = funpy::compile_program(&program, &library()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn thread_count_does_not_change_output() {
    let program = mixed_program();
    let sequential = funpy::compile_program(&program, &library()).unwrap();
    for jobs in [2, 3, 7, 32] {
        let options = CodegenOptions { jobs, ..library() };
        let parallel = funpy::compile_program(&program, &options).unwrap();
        assert_eq!(parallel, sequential, "jobs = {jobs}");
    }
}

#[test]
fn fresh_names_restart_for_every_function() {
    let body = Expr::case(var("n"), vec![on_int(0, int(1)), otherwise(int(2))]);
    let program = Program { decls: vec![fun("a", &["n"], body.clone()), fun("b", &["n"], body)] };
    let options = CodegenOptions { preamble: false, ..library() };
    let module = funpy::compile_program(&program, &options).unwrap();
    let defs: Vec<&str> = module.split("\n\n\n").collect();
    assert_eq!(defs.len(), 2, "{module}");
    assert_eq!(defs[0].replacen("def a(", "def b(", 1), defs[1].trim_end());
}

#[test]
fn output_follows_declaration_order() {
    let names = ["zeta", "alpha", "mid", "beta"];
    let decls = names.iter().map(|n| fun(n, &[], int(0))).collect();
    let module = compile(decls);
    let positions: Vec<usize> = names
        .iter()
        .map(|n| module.find(&format!("def {n}(")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{module}");
}

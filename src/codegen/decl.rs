use std::collections::HashSet;

use crate::diagnostics::CompileError;
use crate::ir::{Expr, Name};

use super::context::{LowerContext, Lowered};
use super::lower::lower_expr;
use super::mangle::mangle;
use super::stmt::{self, Stmt};
use super::tags::TagTable;
use super::tailcall::mark_self_tail_calls;

/// Lower one function declaration to a Python `def`.
///
/// The body always sits inside `while True:` so self tail calls can restart
/// it; every path that does not restart ends in `return`.
pub fn emit_function(
    tags: &TagTable,
    globals: &HashSet<Name>,
    name: &Name,
    params: &[Name],
    body: &Expr,
) -> Result<Stmt, CompileError> {
    let mut seen = HashSet::new();
    if let Some(dup) = params.iter().find(|p| !seen.insert(*p)) {
        return Err(CompileError::codegen(format!(
            "function '{name}' declares parameter '{dup}' more than once"
        )));
    }

    let mut body = body.clone();
    // A parameter named like the function hides it; nothing is self-recursive then.
    let marked = if params.contains(name) {
        0
    } else {
        mark_self_tail_calls(&mut body, name, params.len())
    };

    let mut cx = LowerContext::new(tags, globals, name);
    let rendered: Vec<String> = params.iter().map(|p| cx.bind(p)).collect();
    cx.set_params(rendered.clone());

    let lowered = lower_expr(&mut cx, &body)?;
    let mut block = cx.into_block();
    if let Lowered::Expr(value) = lowered {
        block.push(Stmt::Return(value));
    }

    tracing::debug!(
        function = %name,
        params = params.len(),
        tail_calls = marked,
        statements = stmt::count(&block),
        "lowered function"
    );

    Ok(Stmt::Def { name: mangle(name), params: rendered, body: vec![Stmt::Loop(block)] })
}

use std::collections::BTreeSet;

use crate::diagnostics::CompileError;
use crate::ir::{CallKind, Expr, ForeignDesc, Name};

use super::case::lower_case;
use super::context::{LowerContext, Lowered};
use super::literal::{py_str, render_const};
use super::mangle::{is_dotted_path, is_identifier};
use super::prim;
use super::runtime;
use super::stmt::Stmt;

/// Lower `expr`, emitting its statements into `cx`.
///
/// Returns [`Lowered::Restart`] only for a self tail call, which the
/// normalizer places exclusively in tail position.
pub fn lower_expr(cx: &mut LowerContext, expr: &Expr) -> Result<Lowered, CompileError> {
    match expr {
        Expr::Var(name) => Ok(Lowered::Expr(cx.resolve(name))),

        Expr::App { call: CallKind::SelfTail, func: _, args } => lower_self_tail_call(cx, args),

        Expr::App { func, args, .. } => lower_call(cx, func, args).map(Lowered::Expr),

        Expr::LazyApp { func, args } => {
            let mut free = func.free_vars();
            for a in args {
                free.extend(a.free_vars());
            }
            lower_deferred(cx, None, &free, |cx| lower_call(cx, func, args)).map(Lowered::Expr)
        }

        Expr::Lazy(body) => {
            let free = body.free_vars();
            lower_deferred(cx, None, &free, |cx| lower_value(cx, body)).map(Lowered::Expr)
        }

        Expr::Force(e) => {
            let v = lower_value(cx, e)?;
            Ok(Lowered::Expr(format!("{}()", callee(e, v))))
        }

        Expr::Lam { params, body } => {
            let free = body.free_vars();
            lower_lambda(cx, params, body, &free).map(Lowered::Expr)
        }

        Expr::Let { name, value, body } => {
            let v = lower_value(cx, value)?;
            cx.scoped(|cx| {
                let target = cx.bind(name);
                cx.emit(Stmt::Assign { target, value: v });
                lower_expr(cx, body)
            })
        }

        Expr::Con { name, args } => {
            let info = cx.con_info(name)?;
            if info.arity != args.len() {
                return Err(CompileError::codegen(format!(
                    "constructor '{name}' applied to {} arguments but declared with {}",
                    args.len(),
                    info.arity
                )));
            }
            let fields = lower_seq(cx, args)?;
            let mut slots = vec![info.tag.to_string()];
            slots.extend(fields);
            Ok(Lowered::Expr(tuple(&slots)))
        }

        Expr::Case { scrutinee, alts } => {
            let scrut = match scrutinee.as_ref() {
                Expr::Var(name) => cx.resolve(name),
                other => {
                    let v = lower_value(cx, other)?;
                    let tmp = cx.fresh();
                    cx.emit(Stmt::Assign { target: tmp.clone(), value: v });
                    tmp
                }
            };
            lower_case(cx, &scrut, alts)
        }

        Expr::Proj { expr: inner, index } => {
            let v = lower_value(cx, inner)?;
            Ok(Lowered::Expr(format!("{}[{}]", callee(inner, v), index + 1)))
        }

        Expr::Const(c) => render_const(c).map(Lowered::Expr),

        Expr::Foreign { target, args } => {
            let ForeignDesc::Str(target) = target else {
                return Err(CompileError::codegen(format!(
                    "unsupported foreign call descriptor {target:?}"
                )));
            };
            if !is_dotted_path(target) {
                return Err(CompileError::codegen(format!(
                    "foreign call target '{target}' is not a Python name"
                )));
            }
            let args = lower_seq(cx, args)?;
            Ok(Lowered::Expr(format!("{}({})", foreign_callee(target), args.join(", "))))
        }

        Expr::Prim { op, args } => {
            let args = lower_seq(cx, args)?;
            Ok(Lowered::Expr(prim::translate(op, &args)))
        }

        Expr::Error(msg) => Ok(Lowered::Expr(format!("{}({})", runtime::FAIL, py_str(msg)))),

        Expr::Nothing => Ok(Lowered::Expr("None".to_string())),
    }
}

/// Lower an expression that must produce a value.
pub fn lower_value(cx: &mut LowerContext, expr: &Expr) -> Result<String, CompileError> {
    lower_expr(cx, expr)?.into_expr()
}

/// Lower expressions left to right, preserving evaluation order.
///
/// When a later expression needs statements, earlier values that are not
/// stable are spilled into temporaries ahead of those statements.
fn lower_seq<'e>(
    cx: &mut LowerContext,
    exprs: impl IntoIterator<Item = &'e Expr>,
) -> Result<Vec<String>, CompileError> {
    // (value, may be evaluated later without reordering effects)
    let mut lowered: Vec<(String, bool)> = Vec::new();
    for e in exprs {
        let (block, v) = cx.isolated(|cx| lower_value(cx, e))?;
        if !block.is_empty() {
            for (value, stable) in lowered.iter_mut().filter(|(_, stable)| !*stable) {
                let tmp = cx.fresh();
                let earlier = std::mem::replace(value, tmp.clone());
                cx.emit(Stmt::Assign { target: tmp, value: earlier });
                *stable = true;
            }
            cx.emit_all(block);
        }
        lowered.push((v, is_stable(e)));
    }
    Ok(lowered.into_iter().map(|(v, _)| v).collect())
}

/// Values whose evaluation can move past other statements.
fn is_stable(e: &Expr) -> bool {
    matches!(
        e,
        Expr::Var(_) | Expr::Const(_) | Expr::Nothing | Expr::Lam { .. } | Expr::Lazy(_)
    )
}

fn lower_call(cx: &mut LowerContext, func: &Expr, args: &[Expr]) -> Result<String, CompileError> {
    let mut values = lower_seq(cx, std::iter::once(func).chain(args))?;
    let f = values.remove(0);
    Ok(format!("{}({})", callee(func, f), values.join(", ")))
}

fn lower_self_tail_call(cx: &mut LowerContext, args: &[Expr]) -> Result<Lowered, CompileError> {
    if args.len() != cx.params().len() {
        return Err(CompileError::internal(format!(
            "self tail call of '{}' with {} arguments, expected {}",
            cx.fn_name(),
            args.len(),
            cx.params().len()
        )));
    }
    let values = lower_seq(cx, args)?;
    tracing::trace!(fn_name = %cx.fn_name(), "self tail call becomes loop restart");
    if !values.is_empty() {
        let targets = cx.params().to_vec();
        cx.emit(Stmt::AssignMany { targets, values });
    }
    cx.emit(Stmt::Continue);
    Ok(Lowered::Restart)
}

/// Curried lambda: one nesting level per parameter.
fn lower_lambda(
    cx: &mut LowerContext,
    params: &[Name],
    body: &Expr,
    free: &BTreeSet<Name>,
) -> Result<String, CompileError> {
    match params.split_first() {
        None => lower_deferred(cx, None, free, |cx| lower_value(cx, body)),
        Some((first, [])) => lower_deferred(cx, Some(first), free, |cx| lower_value(cx, body)),
        Some((first, rest)) => {
            lower_deferred(cx, Some(first), free, |cx| lower_lambda(cx, rest, body, free))
        }
    }
}

/// Build a deferred computation over an optional parameter.
///
/// A body without statements becomes a `lambda`; otherwise it becomes a
/// nested `def`. Free locals are bound by value as default parameters so a
/// later loop restart cannot change what the closure sees.
fn lower_deferred(
    cx: &mut LowerContext,
    param: Option<&Name>,
    free: &BTreeSet<Name>,
    body: impl FnOnce(&mut LowerContext) -> Result<String, CompileError>,
) -> Result<String, CompileError> {
    let captures: Vec<String> = free
        .iter()
        .filter(|n| Some(*n) != param)
        .filter_map(|n| cx.lookup(n).map(str::to_string))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let (mut block, (rendered_param, value)) = cx.isolated(|cx| {
        cx.scoped(|cx| {
            let rendered_param = param.map(|p| cx.bind(p));
            let value = body(cx)?;
            Ok((rendered_param, value))
        })
    })?;

    let mut signature: Vec<String> = rendered_param.into_iter().collect();
    signature.extend(captures.iter().map(|c| format!("{c}={c}")));

    if block.is_empty() {
        if signature.is_empty() {
            Ok(format!("(lambda: ({value}))"))
        } else {
            Ok(format!("(lambda {}: ({value}))", signature.join(", ")))
        }
    } else {
        let name = cx.fresh();
        block.push(Stmt::Return(value));
        cx.emit(Stmt::Def { name: name.clone(), params: signature, body: block });
        Ok(name)
    }
}

/// `a.b.f` imports `a` and resolves each later segment as an attribute,
/// falling back to a submodule import. A bare name is looked up on
/// `builtins`, so locals of the same name cannot shadow it.
fn foreign_callee(target: &str) -> String {
    let mut segments = target.split('.');
    let (root, rest) = match segments.next() {
        Some(head) if target.contains('.') => (head, segments),
        _ => ("builtins", target.split('.')),
    };
    rest.fold(format!("{}({})", runtime::IMPORT, py_str(root)), |obj, attr| {
        format!("{}({obj}, {})", runtime::GETATTR, py_str(attr))
    })
}

/// Parenthesize `value` unless its source expression renders as a bare name.
fn callee(source: &Expr, value: String) -> String {
    if matches!(source, Expr::Var(_)) && is_identifier(&value) {
        value
    } else {
        format!("({value})")
    }
}

fn tuple(slots: &[String]) -> String {
    if slots.len() == 1 {
        format!("({},)", slots[0])
    } else {
        format!("({})", slots.join(", "))
    }
}

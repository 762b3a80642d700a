use crate::ir::{Alt, CallKind, Expr, Name};

/// Mark applications of `fn_name` to itself in tail position as
/// [`CallKind::SelfTail`].
///
/// Only the let-body / case-branch spine is walked. Calls under lambdas,
/// lazy wrappers, constructor fields or arguments keep their kind, and so do
/// calls to other functions (mutual recursion is not converted). A call is
/// only marked when it passes exactly `arity` arguments.
pub fn mark_self_tail_calls(expr: &mut Expr, fn_name: &Name, arity: usize) -> usize {
    match expr {
        Expr::App { call, func, args } => {
            if matches!(func.as_ref(), Expr::Var(n) if n == fn_name) && args.len() == arity {
                *call = CallKind::SelfTail;
                1
            } else {
                0
            }
        }
        // A binding of the function's own name hides it for the rest of the spine.
        Expr::Let { name, body, .. } if *name != *fn_name => {
            mark_self_tail_calls(body, fn_name, arity)
        }
        Expr::Case { alts, .. } => alts
            .iter_mut()
            .filter(|alt| match alt {
                Alt::Con { bindings, .. } => !bindings.contains(fn_name),
                _ => true,
            })
            .map(|alt| mark_self_tail_calls(alt.body_mut(), fn_name, arity))
            .sum(),
        _ => 0,
    }
}

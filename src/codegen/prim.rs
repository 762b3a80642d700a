use crate::ir::{NumKind, PrimOp};

use super::literal::py_str;
use super::runtime;

/// Translate a primitive applied to already-lowered arguments.
///
/// Total: anything without a rule (or with the wrong number of arguments)
/// becomes a call that fails at run time naming the operation.
pub fn translate(op: &PrimOp, args: &[String]) -> String {
    translate_known(op, args).unwrap_or_else(|| unimplemented_call(op, args))
}

fn translate_known(op: &PrimOp, args: &[String]) -> Option<String> {
    use PrimOp::*;

    match (op, args) {
        (Add(k), [a, b]) if numeric(*k) => Some(format!("({a} + {b})")),
        (Sub(k), [a, b]) if numeric(*k) => Some(format!("({a} - {b})")),
        (Mul(k), [a, b]) if numeric(*k) => Some(format!("({a} * {b})")),
        (Div(NumKind::Float), [a, b]) => Some(format!("({a} / {b})")),
        (Div(k), [a, b]) if numeric(*k) => Some(format!("({a} // {b})")),
        (Rem(k), [a, b]) if numeric(*k) => Some(format!("({a} % {b})")),
        (Eq(_), [a, b]) => Some(format!("int({a} == {b})")),
        (Lt(_), [a, b]) => Some(format!("int({a} < {b})")),
        (Resize, [a]) => Some(a.clone()),
        (IntToStr, [a]) => Some(format!("str({a})")),
        (StrToInt, [a]) => Some(format!("int({a})")),
        (StrConcat, [a, b]) => Some(format!("({a} + {b})")),
        (StrRev, [a]) => Some(format!("({a})[::-1]")),
        (StrHead, [a]) => Some(format!("({a})[0]")),
        (StrTail, [a]) => Some(format!("({a})[1:]")),
        // An optional leading world token is ignored.
        (ReadLine, [] | [_]) => Some("sys.stdin.readline()".to_string()),
        (WriteStr, [s] | [_, s]) => Some(format!("sys.stdout.write({s})")),
        _ => None,
    }
}

fn numeric(k: NumKind) -> bool {
    !matches!(k, NumKind::Char)
}

fn unimplemented_call(op: &PrimOp, args: &[String]) -> String {
    let msg = format!("unimplemented primitive {op} applied to ({})", args.join(", "));
    format!("{}({})", runtime::FAIL, py_str(&msg))
}

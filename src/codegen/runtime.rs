//! Runtime support emitted at the top of every generated module.
//!
//! Lowered code only ever calls these helpers by name; the helpers themselves
//! are plain Python and live in [`PREAMBLE`].

/// Raises `RuntimeFailure` carrying a diagnostic string.
pub const FAIL: &str = "_rt_fail";
/// Imports a module once and memoizes the handle.
pub const IMPORT: &str = "_rt_import";
/// Attribute getter falling back to a submodule import on modules and to
/// item lookup otherwise.
pub const GETATTR: &str = "_rt_getattr";
/// Calls a target with arguments given as a tagged cons list.
pub const CALL: &str = "_rt_call";
/// Folds a curried function over a native iterable.
pub const FOREACH: &str = "_rt_foreach";
/// Integer-coded `is None`.
pub const IS_NONE: &str = "_rt_is_none";

/// Message carried by the guard of a match without a default branch.
pub const UNREACHABLE_CASE: &str = "unreachable case";

pub const PREAMBLE: &str = r#"import sys
import importlib
import types


class RuntimeFailure(Exception):
    pass


_rt_modules = {}


def _rt_import(name):
    mod = _rt_modules.get(name)
    if mod is None:
        mod = importlib.import_module(name)
        _rt_modules[name] = mod
    return mod


def _rt_getattr(obj, name):
    try:
        return getattr(obj, name)
    except AttributeError:
        if isinstance(obj, types.ModuleType):
            return _rt_import(obj.__name__ + "." + name)
        return obj[name]


def _rt_call(f, args):
    unpacked = []
    while len(args) == 3:
        unpacked.append(args[1])
        args = args[2]
    return f(*unpacked)


def _rt_foreach(it, st, f):
    for x in it:
        st = f(x)(st)(None)
    return st


def _rt_is_none(x):
    return 1 if x is None else 0


def _rt_fail(msg):
    raise RuntimeFailure(msg)
"#;

/// Launcher calling `entry` when the module runs as a program.
pub fn launcher(entry: &str) -> String {
    format!("if __name__ == \"__main__\":\n    {entry}()\n")
}

/// Helper names defined by the preamble. Mangled identifiers never start
/// with `_r`, so user names cannot shadow these.
pub fn helper_names() -> [&'static str; 6] {
    [FAIL, IMPORT, GETATTR, CALL, FOREACH, IS_NONE]
}

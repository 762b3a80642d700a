//! Behavior of the preamble helpers, evaluated against a compiled module.

mod common;
use common::*;

#[test]
fn call_unpacks_a_cons_list_into_positional_arguments() {
    if let Some(out) = eval(vec![], "_rt_call(lambda a, b: (a, b), (1, 10, (1, 20, (0,))))") {
        assert_eq!(out, "(10, 20)");
    }
    if let Some(out) = eval(vec![], "_rt_call(lambda: 'none', (0,))") {
        assert_eq!(out, "'none'");
    }
}

#[test]
fn foreach_threads_the_accumulator() {
    if let Some(out) = eval(vec![], "_rt_foreach([1, 2, 3], 0, lambda x: lambda st: lambda _: st + x)") {
        assert_eq!(out, "6");
    }
    if let Some(out) = eval(vec![], "_rt_foreach('ab', '', lambda x: lambda st: lambda u: st + x + str(u))") {
        assert_eq!(out, "'aNonebNone'");
    }
}

#[test]
fn getattr_falls_back_to_item_lookup() {
    if let Some(out) = eval(vec![], "[_rt_getattr({'k': 4}, 'k'), _rt_getattr(1j, 'imag')]") {
        assert_eq!(out, "[4, 1.0]");
    }
}

#[test]
fn getattr_imports_missing_submodules() {
    if let Some(out) = eval(vec![], "_rt_getattr(_rt_import('xml'), 'sax').__name__") {
        assert_eq!(out, "'xml.sax'");
    }
}

#[test]
fn import_is_memoized() {
    if let Some(out) = eval(vec![], "_rt_import('math') is _rt_import('math')") {
        assert_eq!(out, "True");
    }
}

#[test]
fn is_none_is_integer_coded() {
    if let Some(out) = eval(vec![], "[_rt_is_none(None), _rt_is_none(0), _rt_is_none(())]") {
        assert_eq!(out, "[1, 0, 0]");
    }
}

#[test]
fn fail_raises_runtime_failure() {
    if let Some(stderr) = eval_failure(vec![], "_rt_fail('gone')") {
        assert!(stderr.contains("RuntimeFailure: gone"), "{stderr}");
    }
}

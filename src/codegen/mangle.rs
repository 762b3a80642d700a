use std::fmt::Write;

use crate::ir::Name;

/// Prefix for mangled names that would otherwise hit a keyword or a builtin.
const RESERVED_PREFIX: &str = "u_";

/// Python keywords plus the builtins and module names generated code relies on.
const RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield", "match", "case", "type",
    // builtins and modules referenced by lowered code and the preamble
    "sys", "importlib", "types", "isinstance", "int", "str", "float", "len", "print", "chr", "ord", "getattr",
    "Exception", "AttributeError", "RuntimeFailure",
];

/// Render an IR name as a Python identifier.
///
/// ASCII letters and digits pass through (except a leading digit), `_`
/// doubles to `__`, and everything else becomes `_x<hex>_`. The scheme is
/// injective: after a `_` the next character is always `_` or `x`.
pub fn mangle(name: &Name) -> String {
    let raw = name.as_str();
    if raw.is_empty() {
        return "_e".to_string();
    }

    let mut out = String::with_capacity(raw.len());
    for (i, c) in raw.chars().enumerate() {
        match c {
            '_' => out.push_str("__"),
            c if c.is_ascii_alphabetic() => out.push(c),
            c if c.is_ascii_digit() && i > 0 => out.push(c),
            c => {
                let _ = write!(out, "_x{:x}_", c as u32);
            }
        }
    }

    if RESERVED.contains(&out.as_str()) {
        format!("{RESERVED_PREFIX}{out}")
    } else {
        out
    }
}

/// Name of the `index`-th compiler temporary of a declaration.
pub fn synthetic(index: u32) -> String {
    format!("_t{index}")
}

/// Whether `s` is a plain Python identifier (not checked against keywords).
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Whether `s` is a dotted path of identifiers such as `math.sqrt`.
pub fn is_dotted_path(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_identifier)
}

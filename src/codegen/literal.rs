use std::fmt::Write;

use crate::diagnostics::CompileError;
use crate::ir::Const;

/// Python source for a constant. Negative numbers are parenthesized so the
/// result can be used as an operand anywhere.
pub fn render_const(c: &Const) -> Result<String, CompileError> {
    Ok(match c {
        Const::Int(n) if *n < 0 => format!("({n})"),
        Const::Int(n) => n.to_string(),
        Const::BigInt(digits) => {
            let (sign, body) = match digits.strip_prefix('-') {
                Some(rest) => ("-", rest),
                None => ("", digits.as_str()),
            };
            if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CompileError::codegen(format!(
                    "malformed big integer literal '{digits}'"
                )));
            }
            let body = body.trim_start_matches('0');
            let body = if body.is_empty() { "0" } else { body };
            if sign.is_empty() || body == "0" {
                body.to_string()
            } else {
                format!("(-{body})")
            }
        }
        Const::Float(f) => render_float(*f),
        Const::Char(ch) => py_str(&ch.to_string()),
        Const::Str(s) => py_str(s),
    })
}

fn render_float(f: f64) -> String {
    if f.is_nan() {
        "float(\"nan\")".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "float(\"inf\")".to_string() } else { "float(\"-inf\")".to_string() }
    } else if f.is_sign_negative() {
        // Debug formatting is the shortest representation that reads back exactly.
        format!("({f:?})")
    } else {
        format!("{f:?}")
    }
}

/// Double-quoted Python string literal for `s`.
pub fn py_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || ('\u{7f}'..='\u{9f}').contains(&c) => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

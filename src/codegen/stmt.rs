//! Python statements produced by lowering, and their textual rendering.

/// One emitted statement. Expressions are already rendered Python text.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { target: String, value: String },
    /// Simultaneous assignment `a, b = x, y`.
    AssignMany { targets: Vec<String>, values: Vec<String> },
    /// Expression evaluated for its effect.
    Eval(String),
    /// `if`/`elif` chain with an optional `else` (empty `orelse` = none).
    If { arms: Vec<(String, Vec<Stmt>)>, orelse: Vec<Stmt> },
    Def { name: String, params: Vec<String>, body: Vec<Stmt> },
    Return(String),
    Continue,
    /// `while True:` loop.
    Loop(Vec<Stmt>),
}

/// Render statements as Python source at indentation level zero.
pub fn render(stmts: &[Stmt]) -> String {
    let mut pp = Printer::new();
    pp.emit_block(stmts);
    pp.buf
}

/// Number of statements in a block, nested blocks included.
pub fn count(stmts: &[Stmt]) -> usize {
    stmts
        .iter()
        .map(|s| {
            1 + match s {
                Stmt::If { arms, orelse } => {
                    arms.iter().map(|(_, b)| count(b)).sum::<usize>() + count(orelse)
                }
                Stmt::Def { body, .. } | Stmt::Loop(body) => count(body),
                _ => 0,
            }
        })
        .sum()
}

struct Printer {
    buf: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Self { buf: String::new(), indent: 0 }
    }

    fn line(&mut self, s: &str) {
        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
        self.buf.push_str(s);
        self.buf.push('\n');
    }

    fn nested(&mut self, stmts: &[Stmt]) {
        self.indent += 1;
        if stmts.is_empty() {
            self.line("pass");
        } else {
            self.emit_block(stmts);
        }
        self.indent -= 1;
    }

    fn emit_block(&mut self, stmts: &[Stmt]) {
        for s in stmts {
            self.emit_stmt(s);
        }
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { target, value } => self.line(&format!("{target} = {value}")),
            Stmt::AssignMany { targets, values } => {
                if targets.len() == 1 {
                    self.line(&format!("{} = {}", targets[0], values[0]));
                } else {
                    self.line(&format!("{} = {}", targets.join(", "), values.join(", ")));
                }
            }
            Stmt::Eval(e) => self.line(e),
            Stmt::If { arms, orelse } => {
                for (i, (cond, body)) in arms.iter().enumerate() {
                    let kw = if i == 0 { "if" } else { "elif" };
                    self.line(&format!("{kw} {cond}:"));
                    self.nested(body);
                }
                if !orelse.is_empty() {
                    self.line("else:");
                    self.nested(orelse);
                }
            }
            Stmt::Def { name, params, body } => {
                self.line(&format!("def {name}({}):", params.join(", ")));
                self.nested(body);
            }
            Stmt::Return(e) => self.line(&format!("return {e}")),
            Stmt::Continue => self.line("continue"),
            Stmt::Loop(body) => {
                self.line("while True:");
                self.nested(body);
            }
        }
    }
}

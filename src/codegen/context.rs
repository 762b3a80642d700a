use std::collections::HashSet;

use crate::diagnostics::CompileError;
use crate::ir::Name;

use super::mangle::{mangle, synthetic};
use super::stmt::Stmt;
use super::tags::{ConInfo, TagTable};

/// Result of lowering one IR node.
#[derive(Debug, Clone, PartialEq)]
pub enum Lowered {
    Expr(String),
    /// A self tail call was emitted; control restarts the enclosing loop and
    /// no value is ever produced here.
    Restart,
}

impl Lowered {
    pub fn into_expr(self) -> Result<String, CompileError> {
        match self {
            Lowered::Expr(e) => Ok(e),
            Lowered::Restart => Err(CompileError::internal(
                "self tail call used as a value outside tail position",
            )),
        }
    }
}

/// Per-declaration lowering state.
///
/// Accumulates statements in emission order, hands out fresh temporaries and
/// resolves IR names to Python identifiers. A new context is created for
/// every declaration; the tag table and global names are shared read-only.
pub struct LowerContext<'a> {
    tags: &'a TagTable,
    globals: &'a HashSet<Name>,
    fn_name: &'a Name,
    params: Vec<String>,
    next_fresh: u32,
    block: Vec<Stmt>,
    /// Innermost binding last.
    locals: Vec<(Name, String)>,
}

impl<'a> LowerContext<'a> {
    pub fn new(tags: &'a TagTable, globals: &'a HashSet<Name>, fn_name: &'a Name) -> Self {
        Self {
            tags,
            globals,
            fn_name,
            params: Vec::new(),
            // Index zero is never handed out.
            next_fresh: 1,
            block: Vec::new(),
            locals: Vec::new(),
        }
    }

    pub fn emit(&mut self, stmt: Stmt) {
        self.block.push(stmt);
    }

    pub fn emit_all(&mut self, stmts: impl IntoIterator<Item = Stmt>) {
        self.block.extend(stmts);
    }

    pub fn fresh(&mut self) -> String {
        let name = synthetic(self.next_fresh);
        self.next_fresh += 1;
        name
    }

    pub fn tag_of(&self, con: &Name) -> Result<u32, CompileError> {
        self.tags.tag_of(con)
    }

    pub fn con_info(&self, con: &Name) -> Result<ConInfo, CompileError> {
        self.tags.lookup(con)
    }

    pub fn fn_name(&self) -> &Name {
        self.fn_name
    }

    /// Rendered formal parameters of the function being lowered.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn set_params(&mut self, params: Vec<String>) {
        self.params = params;
    }

    /// Bind `name` in the current scope and return its Python spelling.
    /// Shadowing a visible local or a top-level function gets a fresh name.
    pub fn bind(&mut self, name: &Name) -> String {
        let rendered = if self.lookup(name).is_some() || self.globals.contains(name) {
            self.fresh()
        } else {
            mangle(name)
        };
        self.locals.push((name.clone(), rendered.clone()));
        rendered
    }

    /// Python spelling of a bound local, if `name` is one.
    pub fn lookup(&self, name: &Name) -> Option<&str> {
        self.locals
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r.as_str())
    }

    /// Python spelling of any variable reference: locals first, then globals.
    pub fn resolve(&self, name: &Name) -> String {
        match self.lookup(name) {
            Some(r) => r.to_string(),
            None => mangle(name),
        }
    }

    /// Run `f` with its own binding scope.
    pub fn scoped<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, CompileError>,
    ) -> Result<R, CompileError> {
        let mark = self.locals.len();
        let out = f(self);
        self.locals.truncate(mark);
        out
    }

    /// Run `f` collecting its statements into a separate block.
    pub fn isolated<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R, CompileError>,
    ) -> Result<(Vec<Stmt>, R), CompileError> {
        let outer = std::mem::take(&mut self.block);
        let out = f(self);
        let inner = std::mem::replace(&mut self.block, outer);
        out.map(|r| (inner, r))
    }

    pub fn into_block(self) -> Vec<Stmt> {
        self.block
    }
}

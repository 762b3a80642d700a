use std::collections::{BTreeSet, HashMap};

use crate::diagnostics::CompileError;
use crate::ir::{Decl, Name, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConInfo {
    pub tag: u32,
    pub arity: usize,
}

/// Constructor name → tag mapping for one compilation unit.
///
/// Built once before any function is lowered and read-only afterwards, so it
/// can be shared by reference between lowering threads.
#[derive(Debug, Default)]
pub struct TagTable {
    cons: HashMap<Name, ConInfo>,
}

impl TagTable {
    /// Explicit tags are kept; the rest are numbered in declaration order
    /// starting after the largest explicit tag.
    pub fn build(program: &Program) -> Result<Self, CompileError> {
        let mut explicit = BTreeSet::new();
        for decl in &program.decls {
            if let Decl::Con { name, tag: Some(tag), .. } = decl {
                if !explicit.insert(*tag) {
                    return Err(CompileError::codegen(format!(
                        "constructor '{name}' reuses tag {tag}"
                    )));
                }
            }
        }

        let mut next = match explicit.last() {
            Some(max) => max.checked_add(1).ok_or_else(|| {
                CompileError::codegen("constructor tags exhausted the tag space")
            })?,
            None => 0,
        };

        let mut cons = HashMap::new();
        for decl in &program.decls {
            let Decl::Con { name, tag, arity } = decl else { continue };
            let tag = match tag {
                Some(t) => *t,
                None => {
                    let t = next;
                    next = next.checked_add(1).ok_or_else(|| {
                        CompileError::codegen("constructor tags exhausted the tag space")
                    })?;
                    t
                }
            };
            if cons.insert(name.clone(), ConInfo { tag, arity: *arity }).is_some() {
                return Err(CompileError::codegen(format!(
                    "constructor '{name}' is declared more than once"
                )));
            }
        }
        Ok(Self { cons })
    }

    pub fn get(&self, con: &Name) -> Option<ConInfo> {
        self.cons.get(con).copied()
    }

    pub fn tag_of(&self, con: &Name) -> Result<u32, CompileError> {
        self.lookup(con).map(|info| info.tag)
    }

    pub fn lookup(&self, con: &Name) -> Result<ConInfo, CompileError> {
        self.get(con)
            .ok_or_else(|| CompileError::codegen(format!("unknown constructor '{con}'")))
    }

    pub fn len(&self) -> usize {
        self.cons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cons.is_empty()
    }
}

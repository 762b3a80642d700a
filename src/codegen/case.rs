//! Pattern-match compilation.
//!
//! A case analysis is first turned into a [`Plan`]: either a linear test
//! chain or a balanced binary search over constructor tags. The plan is then
//! emitted as `if`/`elif` statements that all assign one result variable.

use std::collections::HashSet;

use crate::diagnostics::CompileError;
use crate::ir::{Alt, Const, Name};

use super::context::{LowerContext, Lowered};
use super::literal::{py_str, render_const};
use super::lower::lower_expr;
use super::runtime;
use super::stmt::Stmt;

/// Largest group dispatched by a linear chain inside a search tree. Trees
/// are only built for at least twice this many constructor alternatives.
pub const GROUP_THRESHOLD: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    Tag(u32),
    /// Equality against a rendered constant.
    Const(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Default(usize),
    Unreachable,
}

/// Decision procedure over alternative indices.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// A lone default alternative: no test at all.
    Direct(usize),
    Chain { arms: Vec<(Test, usize)>, fallback: Fallback },
    /// `tag < pivot` selects `below`, otherwise `above`.
    Split { pivot: u32, below: Box<Plan>, above: Box<Plan> },
}

impl Plan {
    /// Alternative chosen for a scrutinee with constructor tag `tag`;
    /// `None` means the unreachable-case error.
    pub fn select_tag(&self, tag: u32) -> Option<usize> {
        match self {
            Plan::Direct(i) => Some(*i),
            Plan::Chain { arms, fallback } => arms
                .iter()
                .find(|(test, _)| *test == Test::Tag(tag))
                .map(|(_, i)| *i)
                .or(match fallback {
                    Fallback::Default(i) => Some(*i),
                    Fallback::Unreachable => None,
                }),
            Plan::Split { pivot, below, above } => {
                if tag < *pivot {
                    below.select_tag(tag)
                } else {
                    above.select_tag(tag)
                }
            }
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Plan::Split { .. })
    }
}

/// Check the shape of `alts` and choose a decision procedure for them.
pub fn plan(
    alts: &[Alt],
    tag_of: impl Fn(&Name) -> Result<u32, CompileError>,
) -> Result<Plan, CompileError> {
    let Some(last) = alts.last() else {
        return Err(CompileError::codegen("case analysis has no alternatives"));
    };
    if alts[..alts.len() - 1].iter().any(Alt::is_default) {
        return Err(CompileError::codegen(
            "default alternative must be the last alternative of a case analysis",
        ));
    }

    let (branches, fallback) = if last.is_default() {
        if alts.len() == 1 {
            return Ok(Plan::Direct(0));
        }
        (&alts[..alts.len() - 1], Fallback::Default(alts.len() - 1))
    } else {
        (alts, Fallback::Unreachable)
    };

    let mut arms = Vec::with_capacity(branches.len());
    for (i, alt) in branches.iter().enumerate() {
        let test = match alt {
            Alt::Con { name, .. } => Test::Tag(tag_of(name)?),
            Alt::Const { value: Const::Float(f), .. } if f.is_nan() => {
                return Err(CompileError::codegen(
                    "case alternative on a NaN constant can never match",
                ));
            }
            Alt::Const { value, .. } => Test::Const(render_const(value)?),
            Alt::Default { .. } => unreachable!("defaults were split off above"),
        };
        arms.push((test, i));
    }

    let all_tagged = arms.iter().all(|(t, _)| matches!(t, Test::Tag(_)));
    if !all_tagged || arms.len() < 2 * GROUP_THRESHOLD {
        return Ok(Plan::Chain { arms, fallback });
    }

    // Later alternatives for an already-seen tag can never be selected.
    let mut seen = HashSet::new();
    let mut sorted: Vec<(u32, usize)> = arms
        .iter()
        .filter_map(|(t, i)| match t {
            Test::Tag(tag) if seen.insert(*tag) => Some((*tag, *i)),
            _ => None,
        })
        .collect();
    sorted.sort_by_key(|(tag, _)| *tag);
    Ok(build_tree(&sorted, fallback))
}

/// Linear chain over the same alternatives, whatever their count.
pub fn linear_plan(
    alts: &[Alt],
    tag_of: impl Fn(&Name) -> Result<u32, CompileError>,
) -> Result<Plan, CompileError> {
    match plan(alts, &tag_of)? {
        Plan::Split { .. } => {
            let fallback = match alts.last() {
                Some(a) if a.is_default() => Fallback::Default(alts.len() - 1),
                _ => Fallback::Unreachable,
            };
            let mut arms = Vec::new();
            for (i, alt) in alts.iter().enumerate() {
                if let Alt::Con { name, .. } = alt {
                    arms.push((Test::Tag(tag_of(name)?), i));
                }
            }
            Ok(Plan::Chain { arms, fallback })
        }
        other => Ok(other),
    }
}

fn build_tree(sorted: &[(u32, usize)], fallback: Fallback) -> Plan {
    if sorted.len() <= GROUP_THRESHOLD {
        return Plan::Chain {
            arms: sorted.iter().map(|(tag, i)| (Test::Tag(*tag), *i)).collect(),
            fallback,
        };
    }
    let mid = sorted.len() / 2;
    Plan::Split {
        pivot: sorted[mid].0,
        below: Box::new(build_tree(&sorted[..mid], fallback)),
        above: Box::new(build_tree(&sorted[mid..], fallback)),
    }
}

/// Lower a case analysis whose scrutinee is already the variable `scrut`.
pub fn lower_case(
    cx: &mut LowerContext,
    scrut: &str,
    alts: &[Alt],
) -> Result<Lowered, CompileError> {
    let plan = plan(alts, |name| cx.tag_of(name))?;

    if let Plan::Direct(i) = plan {
        return lower_branch(cx, scrut, &alts[i]);
    }

    if plan.is_tree() {
        tracing::trace!(fn_name = %cx.fn_name(), alts = alts.len(), "emitting tag search tree");
    }

    let result = cx.fresh();
    let stmts = emit_plan(cx, &plan, scrut, alts, &result)?;
    cx.emit_all(stmts);
    Ok(Lowered::Expr(result))
}

fn emit_plan(
    cx: &mut LowerContext,
    plan: &Plan,
    scrut: &str,
    alts: &[Alt],
    result: &str,
) -> Result<Vec<Stmt>, CompileError> {
    match plan {
        Plan::Direct(i) => branch_block(cx, scrut, &alts[*i], result),
        Plan::Chain { arms, fallback } => {
            let mut if_arms = Vec::with_capacity(arms.len());
            for (test, i) in arms {
                let cond = match test {
                    Test::Tag(tag) => format!("{scrut}[0] == {tag}"),
                    Test::Const(c) => format!("{scrut} == {c}"),
                };
                if_arms.push((cond, branch_block(cx, scrut, &alts[*i], result)?));
            }
            let orelse = match fallback {
                Fallback::Default(i) => branch_block(cx, scrut, &alts[*i], result)?,
                Fallback::Unreachable => vec![Stmt::Eval(format!(
                    "{}({})",
                    runtime::FAIL,
                    py_str(runtime::UNREACHABLE_CASE)
                ))],
            };
            Ok(vec![Stmt::If { arms: if_arms, orelse }])
        }
        Plan::Split { pivot, below, above } => {
            let then = emit_plan(cx, below, scrut, alts, result)?;
            let orelse = emit_plan(cx, above, scrut, alts, result)?;
            Ok(vec![Stmt::If { arms: vec![(format!("{scrut}[0] < {pivot}"), then)], orelse }])
        }
    }
}

/// Statements of one branch, ending in the assignment of `result`.
fn branch_block(
    cx: &mut LowerContext,
    scrut: &str,
    alt: &Alt,
    result: &str,
) -> Result<Vec<Stmt>, CompileError> {
    let (mut block, lowered) = cx.isolated(|cx| lower_branch(cx, scrut, alt))?;
    if let Lowered::Expr(value) = lowered {
        block.push(Stmt::Assign { target: result.to_string(), value });
    }
    Ok(block)
}

fn lower_branch(cx: &mut LowerContext, scrut: &str, alt: &Alt) -> Result<Lowered, CompileError> {
    cx.scoped(|cx| {
        if let Alt::Con { name, bindings, .. } = alt {
            let info = cx.con_info(name)?;
            if info.arity != bindings.len() {
                return Err(CompileError::codegen(format!(
                    "alternative for '{name}' binds {} fields but the constructor has {}",
                    bindings.len(),
                    info.arity
                )));
            }
            for (i, b) in bindings.iter().enumerate() {
                let target = cx.bind(b);
                cx.emit(Stmt::Assign { target, value: format!("{scrut}[{}]", i + 1) });
            }
        }
        lower_expr(cx, alt.body())
    })
}

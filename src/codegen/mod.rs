pub mod case;
pub mod context;
pub mod decl;
pub mod literal;
pub mod lower;
pub mod mangle;
pub mod prim;
pub mod runtime;
pub mod stmt;
pub mod tags;
pub mod tailcall;

use std::collections::HashSet;

use crate::diagnostics::CompileError;
use crate::ir::{Expr, Name, Program};

use decl::emit_function;
use mangle::mangle;
use tags::TagTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Function invoked by the launcher; `None` omits the launcher.
    pub entry: Option<String>,
    /// Emit the runtime helper preamble.
    pub preamble: bool,
    /// Worker threads used to lower declarations.
    pub jobs: usize,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self { entry: Some("main".to_string()), preamble: true, jobs: 1 }
    }
}

/// Lower a whole program to the text of one Python module.
pub fn codegen(program: &Program, options: &CodegenOptions) -> Result<String, CompileError> {
    let tags = TagTable::build(program)?;

    let mut globals = HashSet::new();
    for (name, _, _) in program.functions() {
        if !globals.insert(name.clone()) {
            return Err(CompileError::codegen(format!(
                "function '{name}' is declared more than once"
            )));
        }
    }

    let entry = match &options.entry {
        Some(entry) => {
            let entry = Name::from(entry.as_str());
            if !globals.contains(&entry) {
                return Err(CompileError::codegen(format!(
                    "entry point '{entry}' is not a declared function"
                )));
            }
            Some(entry)
        }
        None => None,
    };

    let functions: Vec<(&Name, &[Name], &Expr)> = program.functions().collect();
    let jobs = options.jobs.max(1).min(functions.len().max(1));
    let defs = if jobs == 1 {
        lower_all(&tags, &globals, &functions)?
    } else {
        lower_parallel(&tags, &globals, &functions, jobs)?
    };

    let mut out = String::new();
    if options.preamble {
        out.push_str(runtime::PREAMBLE);
        out.push_str("\n\n");
    }
    out.push_str(&defs.join("\n\n"));
    if let Some(entry) = &entry {
        if !defs.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&runtime::launcher(&mangle(entry)));
    }

    tracing::info!(
        functions = functions.len(),
        constructors = tags.len(),
        jobs,
        bytes = out.len(),
        "generated module"
    );
    Ok(out)
}

fn lower_all(
    tags: &TagTable,
    globals: &HashSet<Name>,
    functions: &[(&Name, &[Name], &Expr)],
) -> Result<Vec<String>, CompileError> {
    functions
        .iter()
        .map(|(name, params, body)| {
            emit_function(tags, globals, name, params, body).map(|def| stmt::render(&[def]))
        })
        .collect()
}

/// Contiguous chunks on scoped threads; results are joined in chunk order so
/// the output matches sequential lowering byte for byte.
fn lower_parallel(
    tags: &TagTable,
    globals: &HashSet<Name>,
    functions: &[(&Name, &[Name], &Expr)],
    jobs: usize,
) -> Result<Vec<String>, CompileError> {
    let chunk = functions.len().div_ceil(jobs);
    std::thread::scope(|scope| {
        let handles: Vec<_> = functions
            .chunks(chunk)
            .map(|part| scope.spawn(move || lower_all(tags, globals, part)))
            .collect();

        let mut defs = Vec::with_capacity(functions.len());
        for handle in handles {
            let part = handle
                .join()
                .map_err(|_| CompileError::internal("lowering thread panicked"))??;
            defs.extend(part);
        }
        Ok(defs)
    })
}

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::codegen::CodegenOptions;
use crate::diagnostics::CompileError;

pub const MANIFEST_FILE: &str = "funpy.toml";

// ---- TOML deserialization types ----

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlManifest {
    #[serde(default)]
    codegen: TomlCodegen,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlCodegen {
    #[serde(default = "default_entry")]
    entry: String,
    #[serde(default = "default_preamble")]
    preamble: bool,
    #[serde(default = "default_jobs")]
    jobs: i64,
}

impl Default for TomlCodegen {
    fn default() -> Self {
        Self { entry: default_entry(), preamble: default_preamble(), jobs: default_jobs() }
    }
}

fn default_entry() -> String {
    "main".to_string()
}

fn default_preamble() -> bool {
    true
}

fn default_jobs() -> i64 {
    1
}

/// Values from the command line; `None` keeps the manifest's value.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub entry: Option<String>,
    pub no_preamble: bool,
    pub jobs: Option<usize>,
}

// ---- Manifest discovery ----

/// Walk from start_dir up to .git or FS root, looking for funpy.toml.
pub fn find_manifest_walk(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let candidate = dir.join(MANIFEST_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        // .git may be a file for worktrees and submodules
        if dir.join(".git").exists() {
            return None;
        }
        if !dir.pop() {
            return None;
        }
    }
}

// ---- Parsing & validation ----

/// Read and validate one manifest file.
pub fn load_manifest(manifest_path: &Path) -> Result<CodegenOptions, CompileError> {
    let content = std::fs::read_to_string(manifest_path).map_err(|e| {
        CompileError::manifest(
            format!("{MANIFEST_FILE}: could not read file: {e}"),
            manifest_path.to_path_buf(),
        )
    })?;
    parse_manifest(&content, manifest_path)
}

fn parse_manifest(content: &str, manifest_path: &Path) -> Result<CodegenOptions, CompileError> {
    let manifest: TomlManifest = toml::from_str(content).map_err(|e| {
        CompileError::manifest(
            format!("{MANIFEST_FILE}: invalid syntax: {e}"),
            manifest_path.to_path_buf(),
        )
    })?;

    let codegen = manifest.codegen;
    if codegen.jobs < 1 {
        return Err(CompileError::manifest(
            format!("{MANIFEST_FILE}: 'jobs' must be at least 1, got {}", codegen.jobs),
            manifest_path.to_path_buf(),
        ));
    }
    let jobs = usize::try_from(codegen.jobs).map_err(|_| {
        CompileError::manifest(
            format!("{MANIFEST_FILE}: 'jobs' is too large"),
            manifest_path.to_path_buf(),
        )
    })?;

    let entry = codegen.entry.trim();
    Ok(CodegenOptions {
        entry: (!entry.is_empty()).then(|| entry.to_string()),
        preamble: codegen.preamble,
        jobs,
    })
}

/// Options for compiling a file in `start_dir`: manifest values (or the
/// defaults when no manifest is found) with command-line overrides applied.
pub fn resolve_options(start_dir: &Path, overrides: &Overrides) -> Result<CodegenOptions, CompileError> {
    let mut options = match find_manifest_walk(start_dir) {
        Some(path) => {
            tracing::debug!(manifest = %path.display(), "using manifest");
            load_manifest(&path)?
        }
        None => CodegenOptions::default(),
    };

    if let Some(entry) = &overrides.entry {
        options.entry = (!entry.is_empty()).then(|| entry.clone());
    }
    if overrides.no_preamble {
        options.preamble = false;
    }
    if let Some(jobs) = overrides.jobs {
        if jobs == 0 {
            return Err(CompileError::manifest(
                "--jobs must be at least 1",
                start_dir.to_path_buf(),
            ));
        }
        options.jobs = jobs;
    }
    Ok(options)
}

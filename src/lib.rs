pub mod binary;
pub mod codegen;
pub mod diagnostics;
pub mod ir;
pub mod manifest;

use std::path::Path;

use codegen::CodegenOptions;
use diagnostics::CompileError;
use ir::Program;

/// Decode IR from either the binary container or JSON text.
pub fn decode_program(bytes: &[u8]) -> Result<Program, CompileError> {
    if binary::is_binary_format(bytes) {
        return Ok(binary::deserialize_program(bytes)?);
    }
    let text = std::str::from_utf8(bytes)
        .map_err(|e| CompileError::decode(format!("IR input is neither FPIR nor UTF-8 JSON: {e}")))?;
    Ok(serde_json::from_str(text)?)
}

/// Lower a decoded program to the text of a Python module.
pub fn compile_program(program: &Program, options: &CodegenOptions) -> Result<String, CompileError> {
    codegen::codegen(program, options)
}

/// Decode JSON IR text and compile it.
pub fn compile_str(json: &str, options: &CodegenOptions) -> Result<String, CompileError> {
    let program: Program = serde_json::from_str(json)?;
    compile_program(&program, options)
}

/// Read an IR file (JSON or FPIR) and compile it.
pub fn compile_file(path: &Path, options: &CodegenOptions) -> Result<String, CompileError> {
    let bytes = std::fs::read(path)
        .map_err(|e| CompileError::io(format!("could not read IR file: {e}"), path.to_path_buf()))?;
    let program = decode_program(&bytes)?;
    tracing::debug!(path = %path.display(), decls = program.decls.len(), "decoded IR");
    compile_program(&program, options)
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Decode error: {msg}")]
    Decode { msg: String, line: Option<usize>, column: Option<usize> },

    #[error("Codegen error: {msg}")]
    Codegen { msg: String },

    #[error("Manifest error: {msg}")]
    Manifest { msg: String, path: PathBuf },

    #[error("I/O error: {msg}")]
    Io { msg: String, path: PathBuf },

    #[error("Internal error: {msg}")]
    Internal { msg: String },
}

impl CompileError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode { msg: msg.into(), line: None, column: None }
    }

    pub fn decode_at(msg: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Decode { msg: msg.into(), line: Some(line), column: Some(column) }
    }

    pub fn codegen(msg: impl Into<String>) -> Self {
        Self::Codegen { msg: msg.into() }
    }

    pub fn manifest(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Manifest { msg: msg.into(), path }
    }

    pub fn io(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Io { msg: msg.into(), path }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal { msg: msg.into() }
    }
}

impl From<serde_json::Error> for CompileError {
    fn from(e: serde_json::Error) -> Self {
        match e.line() {
            0 => CompileError::decode(e.to_string()),
            line => CompileError::decode_at(e.to_string(), line, e.column()),
        }
    }
}

impl From<crate::binary::BinaryError> for CompileError {
    fn from(e: crate::binary::BinaryError) -> Self {
        CompileError::decode(e.to_string())
    }
}

/// Byte offset of a 1-based line / 1-based column position.
fn offset_of(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (i, l) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            return (offset + column.saturating_sub(1)).min(source.len());
        }
        offset += l.len();
    }
    source.len()
}

/// Render a CompileError for terminal output. `source` is the IR text when
/// it was read as JSON.
pub fn render_error(source: Option<&str>, filename: &str, err: &CompileError) {
    use ariadne::{Label, Report, ReportKind, Source};

    match err {
        CompileError::Decode { msg, line: Some(line), column: Some(column) } if source.is_some() => {
            let source = source.unwrap_or_default();
            let start = offset_of(source, *line, *column);
            let end = (start + 1).min(source.len()).max(start);
            let printed = Report::build(ReportKind::Error, (), start)
                .with_message(format!("could not decode IR in {filename}"))
                .with_label(Label::new(start..end).with_message(msg))
                .finish()
                .eprint(Source::from(source));
            if printed.is_err() {
                eprintln!("error [{filename}]: {err}");
            }
        }
        CompileError::Manifest { msg, path } => {
            eprintln!("error[manifest]: {msg}");
            eprintln!("  --> {}", path.display());
        }
        CompileError::Io { msg, path } => {
            eprintln!("error[io]: {msg}");
            eprintln!("  --> {}", path.display());
        }
        _ => {
            eprintln!("error [{filename}]: {err}");
        }
    }
}

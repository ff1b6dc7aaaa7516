//! The error type returned by every decoder in this crate.

use std::fmt;

use crate::error::{Diagnostic, ErrorCode};

/// A type alias for `Result<T, Diagnostic>`.
pub type Result<T> = std::result::Result<T, Diagnostic>;

/// One or more diagnostics produced while decoding a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    diagnostics: Vec<Diagnostic>,
}

impl DecodeError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Wraps a `serde_json` syntax error, locating it in `source`.
    pub(crate) fn from_json(err: &serde_json::Error, source: &str) -> Self {
        let offset = line_column_to_offset(source, err.line(), err.column());
        let end = (offset + 1).min(source.len()).max(offset);
        Diagnostic::error(format!("invalid JSON: {err}"))
            .with_code(ErrorCode::E001)
            .with_span(offset..end)
            .into()
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.diagnostics.first() {
            write!(f, "{first}")?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for DecodeError {}

impl From<Diagnostic> for DecodeError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for DecodeError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

/// Converts serde_json's 1-based line/column into a byte offset.
fn line_column_to_offset(source: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len())
}

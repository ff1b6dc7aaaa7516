//! A single decode problem.

use std::{fmt, ops::Range};

use crate::error::ErrorCode;

/// A decode error with its code, location and optional help text.
///
/// The location is a JSON path (`$.body[0].value`) when the document parsed
/// but a value was wrong, or a byte span when the document itself is not
/// valid JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    code: Option<ErrorCode>,
    message: String,
    path: Option<String>,
    span: Option<Range<usize>>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            path: None,
            span: None,
            help: None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// JSON path of the offending value, if known.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Byte range in the source document, if known.
    pub fn span(&self) -> Option<Range<usize>> {
        self.span.clone()
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "error[{code}]: {}", self.message)?,
            None => write!(f, "error: {}", self.message)?,
        }
        if let Some(path) = &self.path {
            write!(f, " at {path}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_code_and_path() {
        let diag = Diagnostic::error("missing field `left`")
            .with_code(ErrorCode::E102)
            .with_path("$.value");

        assert_eq!(diag.to_string(), "error[E102]: missing field `left` at $.value");
    }

    #[test]
    fn test_display_without_code() {
        let diag = Diagnostic::error("something went wrong");
        assert_eq!(diag.to_string(), "error: something went wrong");
        assert!(diag.path().is_none());
        assert!(diag.span().is_none());
    }

    #[test]
    fn test_builder_methods() {
        let diag = Diagnostic::error("bad json")
            .with_code(ErrorCode::E001)
            .with_span(3..4)
            .with_help("check for a trailing comma");

        assert_eq!(diag.code(), Some(ErrorCode::E001));
        assert_eq!(diag.span(), Some(3..4));
        assert_eq!(diag.help(), Some("check for a trailing comma"));
    }
}

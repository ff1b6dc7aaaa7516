//! Error codes for input decoding.
//!
//! - `E0xx` - Document errors
//! - `E1xx` - Syntax tree errors
//! - `E2xx` - Object graph errors
//! - `E3xx` - Token stream errors

use std::fmt;

/// Error codes for categorizing decode diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The input is not well-formed JSON.
    E001,

    /// A syntax node has no `_astname` (or `_type`) tag.
    E100,

    /// A syntax node is tagged with a kind this crate does not know.
    ///
    /// This signals a mismatch between the parser that produced the input and
    /// the set of node kinds understood here; decoding aborts.
    E101,

    /// A required field of a syntax node is missing.
    E102,

    /// A field of a syntax node has the wrong JSON type.
    E103,

    /// An operator field holds something other than an operator of the
    /// expected class.
    E104,

    /// An object record is malformed.
    E200,

    /// A property or array-slot value is malformed.
    E201,

    /// A reference names a record that is not part of the graph.
    E202,

    /// A token record is malformed.
    E300,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E300 => "E300",
        }
    }

    /// Short human-readable description of the error class.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "malformed JSON",
            ErrorCode::E100 => "missing node kind tag",
            ErrorCode::E101 => "unknown node kind",
            ErrorCode::E102 => "missing field",
            ErrorCode::E103 => "wrong field type",
            ErrorCode::E104 => "invalid operator",
            ErrorCode::E200 => "malformed object record",
            ErrorCode::E201 => "malformed value",
            ErrorCode::E202 => "dangling reference",
            ErrorCode::E300 => "malformed token",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E101.to_string(), "E101");
        assert_eq!(ErrorCode::E202.to_string(), "E202");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E101.description(), "unknown node kind");
        assert_eq!(ErrorCode::E202.description(), "dangling reference");
    }
}

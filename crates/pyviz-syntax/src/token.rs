//! Token streams from an external Python tokenizer.
//!
//! The tokenizer callback records one object per token:
//!
//! ```json
//! {"type": "NAME", "token": "print", "start": [1, 0], "end": [1, 5], "line": "print('a' + b)\n"}
//! ```
//!
//! A document is a JSON array of such objects, in emission order.

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    decode::JsonPath,
    error::{DecodeError, Diagnostic, ErrorCode},
};

/// Row and column of a token boundary, as reported by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "(usize, usize)")]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// One token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Token {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "token")]
    text: String,
    start: Position,
    end: Position,
    #[serde(default)]
    line: String,
}

impl Token {
    pub fn new(kind: impl Into<String>, text: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            kind: kind.into(),
            text: text.into(),
            start,
            end,
            line: String::new(),
        }
    }

    /// Token type name (`NAME`, `OP`, `STRING`, ...).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Source text of the token.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// The physical source line the token was read from.
    pub fn line(&self) -> &str {
        &self.line
    }
}

/// Tokens in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// `(kind, text)` pairs, one per table row of the tokenizer view.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens.iter().map(|token| (token.kind(), token.text()))
    }
}

/// Decodes a token stream, reporting every malformed token.
pub(crate) fn decode_tokens(document: &Value) -> Result<TokenStream, DecodeError> {
    let root = JsonPath::root();
    let Value::Array(items) = document else {
        return Err(Diagnostic::error("expected an array of tokens")
            .with_code(ErrorCode::E300)
            .with_path(root.as_str())
            .into());
    };

    let mut tokens = Vec::with_capacity(items.len());
    let mut diagnostics = Vec::new();
    for (i, item) in items.iter().enumerate() {
        match Token::deserialize(item) {
            Ok(token) => tokens.push(token),
            Err(err) => diagnostics.push(
                Diagnostic::error(format!("malformed token: {err}"))
                    .with_code(ErrorCode::E300)
                    .with_path(root.index(i).as_str()),
            ),
        }
    }
    if !diagnostics.is_empty() {
        return Err(diagnostics.into());
    }

    debug!(tokens = tokens.len(); "Decoded token stream");
    Ok(TokenStream::new(tokens))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_tokenizer_records() {
        let stream = decode_tokens(&json!([
            {"type": "NAME", "token": "print", "start": [1, 0], "end": [1, 5], "line": "print('a' + b)\n"},
            {"type": "OP", "token": "(", "start": [1, 5], "end": [1, 6], "line": "print('a' + b)\n"},
        ]))
        .unwrap();

        assert_eq!(stream.len(), 2);
        let first = &stream.tokens()[0];
        assert_eq!(first.kind(), "NAME");
        assert_eq!(first.start(), Position { row: 1, col: 0 });
        assert_eq!(first.end().col, 5);

        let rows: Vec<_> = stream.rows().collect();
        assert_eq!(rows, [("NAME", "print"), ("OP", "(")]);
    }

    #[test]
    fn test_line_is_optional() {
        let stream = decode_tokens(&json!([
            {"type": "ENDMARKER", "token": "", "start": [2, 0], "end": [2, 0]},
        ]))
        .unwrap();
        assert_eq!(stream.tokens()[0].line(), "");
    }

    #[test]
    fn test_malformed_tokens_are_located() {
        let err = decode_tokens(&json!([
            {"type": "NAME", "token": "a", "start": [1, 0], "end": [1, 1]},
            {"type": "NAME", "start": [1, 2], "end": [1, 3]},
            {"type": "OP", "token": "+", "start": "1:4", "end": [1, 5]},
        ]))
        .unwrap_err();

        let paths: Vec<_> = err.diagnostics().iter().map(|d| d.path()).collect();
        assert_eq!(paths, [Some("$[1]"), Some("$[2]")]);
        assert!(err
            .diagnostics()
            .iter()
            .all(|d| d.code() == Some(ErrorCode::E300)));
    }

    #[test]
    fn test_non_array_document() {
        let err = decode_tokens(&json!({"type": "NAME"})).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E300));
    }
}

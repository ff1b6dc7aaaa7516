//! # pyviz syntax
//!
//! Input types for pyviz diagrams and their JSON adapters. Everything here
//! arrives from external Python tooling:
//!
//! - [`SyntaxNode`] - a parse tree from a Python parser
//! - [`ObjectGraph`] - a snapshot of live objects and the references between them
//! - [`TokenStream`] - the output of a Python tokenizer
//!
//! ## Usage
//!
//! ```
//! # use pyviz_syntax::{parse_syntax_tree, DecodeError, SyntaxNode};
//!
//! fn main() -> Result<(), DecodeError> {
//!     let source = r#"{"_astname": "Name", "id": {"v": "a"}}"#;
//!     let tree = parse_syntax_tree(source)?;
//!     assert_eq!(tree, SyntaxNode::Name { id: "a".into() });
//!     Ok(())
//! }
//! ```

mod decode;
pub mod error;
pub mod object;
pub mod syntax;
pub mod token;

pub use error::{DecodeError, Diagnostic, ErrorCode};
pub use object::{ObjectGraph, ObjectRecord, Primitive, Value};
pub use syntax::{Operator, OperatorClass, SyntaxNode};
pub use token::{Position, Token, TokenStream};

use log::{debug, trace};

fn parse_json(source: &str) -> Result<serde_json::Value, DecodeError> {
    serde_json::from_str(source).map_err(|err| DecodeError::from_json(&err, source))
}

/// Decode a syntax tree from its JSON form.
///
/// A top-level JSON array is read as the body of a `Module`.
///
/// # Errors
///
/// Returns a [`DecodeError`] holding the first problem found. An unknown node
/// kind (`E101`) aborts decoding instead of being skipped.
pub fn parse_syntax_tree(source: &str) -> Result<SyntaxNode, DecodeError> {
    let document = parse_json(source)?;
    let tree = decode::decode_syntax_tree(&document)?;
    debug!(kind = tree.kind_name(), nodes = tree.subtree_size(); "Decoded syntax tree");
    trace!(tree:?; "Syntax tree");
    Ok(tree)
}

/// Decode a live-object snapshot from its JSON form.
///
/// # Errors
///
/// Returns a [`DecodeError`] holding every malformed record and every
/// dangling reference in the document.
pub fn parse_object_graph(source: &str) -> Result<ObjectGraph, DecodeError> {
    let document = parse_json(source)?;
    object::decode_object_graph(&document)
}

/// Decode a tokenizer's output from its JSON form.
///
/// # Errors
///
/// Returns a [`DecodeError`] holding every malformed token record.
pub fn parse_tokens(source: &str) -> Result<TokenStream, DecodeError> {
    let document = parse_json(source)?;
    token::decode_tokens(&document)
}

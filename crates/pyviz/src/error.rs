//! Error types for pyviz operations.
//!
//! [`PyvizError`] wraps every failure that can occur between reading an input
//! document and producing an SVG string.

use std::io;

use thiserror::Error;

use pyviz_syntax::DecodeError;

/// The main error type for pyviz operations.
///
/// # Diagnostic Variants
///
/// The `Decode` variant keeps the source document next to the structured
/// diagnostics so that callers can point into it when reporting.
#[derive(Debug, Error)]
pub enum PyvizError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Decode { err: DecodeError, src: String },

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<crate::export::Error> for PyvizError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl PyvizError {
    /// Create a new `Decode` error with the associated source document.
    pub fn new_decode_error(err: DecodeError, src: impl Into<String>) -> Self {
        Self::Decode {
            err,
            src: src.into(),
        }
    }
}

//! Export of laid-out diagrams and token streams.
//!
//! # Pipeline Position
//!
//! ```text
//! DiagramModel + DiagramLayout      TokenStream
//!                 ↓ export (this module)
//!               SVG document
//! ```
//!
//! # Available Backends
//!
//! - [`svg`] - SVG output via [`svg::SvgBuilder`] and [`svg::Svg`]
//!
//! # Error Handling
//!
//! Export operations return [`Error`], covering rendering failures and I/O
//! errors. [`Error`] converts into [`PyvizError::Export`] at the crate
//! boundary.
//!
//! [`PyvizError::Export`]: crate::PyvizError::Export

pub mod svg;

use pyviz_syntax::TokenStream;

use crate::{layout::DiagramLayout, structure::DiagramModel};

/// Abstraction for export backends.
pub trait Exporter {
    /// Exports a positioned node/link diagram.
    ///
    /// `layout` must have been computed for `model`: its nodes are aligned
    /// with `model.nodes()`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the diagram cannot be converted to the
    /// target format, or [`Error::Io`] if writing the output fails.
    fn export_diagram(&mut self, model: &DiagramModel, layout: &DiagramLayout)
    -> Result<(), Error>;

    /// Exports a token stream as a two-column table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if writing the output fails.
    fn export_tokens(&mut self, tokens: &TokenStream) -> Result<(), Error>;
}

/// Errors that can occur during export.
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}

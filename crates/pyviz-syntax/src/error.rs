//! Errors raised while decoding external input.
//!
//! Every problem found in an input document is reported as a [`Diagnostic`]
//! carrying an [`ErrorCode`], the JSON path of the offending value and, for
//! malformed JSON, a byte span into the source. One or more diagnostics are
//! returned together as a [`DecodeError`].
//!
//! # Example
//!
//! ```
//! # use pyviz_syntax::error::{Diagnostic, ErrorCode};
//! let diag = Diagnostic::error("unknown syntax node kind `Walrus`")
//!     .with_code(ErrorCode::E101)
//!     .with_path("$.body[0].value")
//!     .with_help("the input was produced by a newer parser");
//!
//! assert_eq!(diag.path(), Some("$.body[0].value"));
//! ```

mod decode_error;
mod diagnostic;
mod error_code;

pub(crate) use decode_error::Result;

pub use decode_error::DecodeError;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;

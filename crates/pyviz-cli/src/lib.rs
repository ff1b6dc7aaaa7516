//! CLI logic for the pyviz diagram tool.
//!
//! Reads a JSON document, renders it with [`DiagramBuilder`] according to
//! its [`InputKind`] and writes the SVG.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, InputKind};

use std::fs;

use log::info;

use pyviz::{DiagramBuilder, PyvizError};

/// Run the pyviz CLI application
///
/// # Errors
///
/// Returns `PyvizError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Decode errors
/// - Layout errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), PyvizError> {
    info!(
        input_path = args.input,
        output_path = args.output,
        kind:? = args.kind;
        "Processing document"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let svg = match args.kind {
        InputKind::ParseTree => {
            let diagram = builder.parse_tree_from_json(&source)?;
            builder.render_svg(&diagram)?
        }
        InputKind::ObjectTree => {
            let diagram = builder.object_tree_from_json(&source)?;
            builder.render_svg(&diagram)?
        }
        InputKind::Tokens => {
            let tokens = builder.tokens_from_json(&source)?;
            builder.render_tokens_svg(&tokens)?
        }
    };

    fs::write(&args.output, svg)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}

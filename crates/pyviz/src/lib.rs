//! pyviz - Diagrams of Python program internals.
//!
//! Turns the JSON output of external Python tooling into SVG: parse trees
//! and live-object snapshots become node/port/link diagrams, token lists
//! become a two-column table.
//!
//! # Pipeline
//!
//! ```text
//! JSON ──decode──▶ SyntaxNode / ObjectGraph ──flatten──▶ DiagramModel
//!      ──layout──▶ DiagramLayout ──export──▶ SVG
//! ```

pub mod config;
pub mod flatten;

mod error;
mod export;
mod layout;
mod structure;

pub use pyviz_core::{color, diagram, draw, geometry, identifier};
pub use pyviz_syntax::{DecodeError, Diagnostic, ErrorCode, ObjectGraph, SyntaxNode, TokenStream};

pub use error::PyvizError;
pub use layout::{DiagramLayout, EngineBuilder, PositionedNode};
pub use structure::DiagramModel;

use log::{debug, info, trace};

use config::AppConfig;
use export::{
    Exporter,
    svg::{SvgBuilder, Theme},
};

/// Builder for decoding, laying out and rendering pyviz diagrams.
///
/// # Examples
///
/// ```rust,no_run
/// use pyviz::{DiagramBuilder, config::AppConfig};
///
/// let source = r#"{"_astname": "Expr", "value": {"_astname": "Name", "id": "x"}}"#;
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let diagram = builder.parse_tree_from_json(source)
///     .expect("Failed to decode");
/// let svg = builder.render_svg(&diagram)
///     .expect("Failed to render");
///
/// // Or use the default config
/// let builder = DiagramBuilder::default();
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Flatten a syntax tree into a diagram.
    ///
    /// A `Module` root is drawn like any other node, with its statements
    /// hanging off its `Body` ports.
    pub fn parse_tree(&self, tree: &SyntaxNode) -> DiagramModel {
        info!(kind = tree.kind_name(); "Flattening parse tree");
        let flattened = flatten::flatten_ast(tree);
        debug!(nodes = flattened.node_count(), links = flattened.links.len(); "Parse tree flattened");
        DiagramModel::from_flattened(flattened)
    }

    /// Decode a JSON syntax tree and flatten it.
    ///
    /// # Errors
    ///
    /// Returns `PyvizError::Decode` carrying `source` if the document is not
    /// a valid syntax tree.
    pub fn parse_tree_from_json(&self, source: &str) -> Result<DiagramModel, PyvizError> {
        info!("Decoding parse tree");
        let tree = pyviz_syntax::parse_syntax_tree(source)
            .map_err(|err| PyvizError::new_decode_error(err, source))?;
        trace!(tree:?; "Decoded parse tree");
        Ok(self.parse_tree(&tree))
    }

    /// Flatten an object snapshot into a diagram.
    pub fn object_tree(&self, graph: &ObjectGraph) -> DiagramModel {
        info!(records = graph.len(); "Flattening object graph");
        let (nodes, links) = flatten::flatten_objects(graph);
        debug!(nodes = nodes.len(), links = links.len(); "Object graph flattened");
        DiagramModel::from_object_parts(nodes, links)
    }

    /// Decode a JSON object snapshot and flatten it.
    ///
    /// # Errors
    ///
    /// Returns `PyvizError::Decode` carrying `source` if a record is
    /// malformed or a reference names no record.
    pub fn object_tree_from_json(&self, source: &str) -> Result<DiagramModel, PyvizError> {
        info!("Decoding object graph");
        let graph = pyviz_syntax::parse_object_graph(source)
            .map_err(|err| PyvizError::new_decode_error(err, source))?;
        trace!(graph:?; "Decoded object graph");
        Ok(self.object_tree(&graph))
    }

    /// Decode a JSON token list.
    ///
    /// # Errors
    ///
    /// Returns `PyvizError::Decode` carrying `source` listing every
    /// malformed token.
    pub fn tokens_from_json(&self, source: &str) -> Result<TokenStream, PyvizError> {
        info!("Decoding token list");
        let tokens = pyviz_syntax::parse_tokens(source)
            .map_err(|err| PyvizError::new_decode_error(err, source))?;
        debug!(tokens = tokens.len(); "Token list decoded");
        Ok(tokens)
    }

    /// Position every node of `diagram` with the configured engine.
    ///
    /// # Errors
    ///
    /// Returns `PyvizError::Layout` if the engine fails.
    pub fn layout(&self, diagram: &DiagramModel) -> Result<DiagramLayout, PyvizError> {
        info!(nodes = diagram.nodes().len(); "Calculating layout");
        let engine = layout::EngineBuilder::from_config(self.config.layout());
        let layout = engine.build(diagram, &self.config.style().text())?;
        info!(
            ranks = layout.rank_count(),
            width = layout.size().width(),
            height = layout.size().height();
            "Layout calculated"
        );
        Ok(layout)
    }

    /// Lay out and render a diagram to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns `PyvizError::Config` for an invalid style color,
    /// `PyvizError::Layout` if layout fails, or `PyvizError::Export` if
    /// rendering fails.
    pub fn render_svg(&self, diagram: &DiagramModel) -> Result<String, PyvizError> {
        let theme = self.theme()?;
        let layout = self.layout(diagram)?;

        let mut exporter = SvgBuilder::new(Vec::new()).with_theme(theme).build()?;
        exporter.export_diagram(diagram, &layout)?;

        let svg = into_string(exporter.into_inner())?;
        info!(bytes = svg.len(); "SVG rendered successfully");
        Ok(svg)
    }

    /// Render a token list as an SVG table.
    ///
    /// # Errors
    ///
    /// Returns `PyvizError::Config` for an invalid style color or
    /// `PyvizError::Export` if rendering fails.
    pub fn render_tokens_svg(&self, tokens: &TokenStream) -> Result<String, PyvizError> {
        info!(tokens = tokens.len(); "Rendering token table");
        let theme = self.theme()?;

        let mut exporter = SvgBuilder::new(Vec::new()).with_theme(theme).build()?;
        exporter.export_tokens(tokens)?;

        let svg = into_string(exporter.into_inner())?;
        info!(bytes = svg.len(); "SVG rendered successfully");
        Ok(svg)
    }

    fn theme(&self) -> Result<Theme, PyvizError> {
        Theme::from_style(self.config.style()).map_err(PyvizError::Config)
    }
}

fn into_string(bytes: Vec<u8>) -> Result<String, PyvizError> {
    String::from_utf8(bytes).map_err(|err| PyvizError::Export(Box::new(err)))
}

//! SVG export backend.
//!
//! [`SvgBuilder`] pairs a [`Theme`] resolved from a [`StyleConfig`] with any
//! [`io::Write`] sink; [`Svg`] then renders documents into it. Rendering to a
//! `Vec<u8>` keeps the whole pipeline in memory.
//!
//! [`StyleConfig`]: crate::config::StyleConfig

mod diagram;
mod tokens;

use std::io;

use log::debug;
use svg::{Document, node::element as svg_element};

use pyviz_core::{color::Color, draw::TextDefinition, geometry::Size};
use pyviz_syntax::TokenStream;

use super::{Error, Exporter};
use crate::{config::StyleConfig, layout::DiagramLayout, structure::DiagramModel};

/// Resolved colors and font for one export.
#[derive(Debug, Clone)]
pub struct Theme {
    background: Option<Color>,
    node_fill: Color,
    node_stroke: Color,
    link: Color,
    text: TextDefinition,
}

impl Theme {
    /// Parses every color of `style`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first color that does not parse.
    pub fn from_style(style: &StyleConfig) -> Result<Self, String> {
        let node_stroke = style.node_stroke_color()?;
        // Labels share the outline color.
        let mut text = style.text();
        text.set_color(Some(node_stroke));

        Ok(Self {
            background: style.background_color()?,
            node_fill: style.node_fill_color()?,
            node_stroke,
            link: style.link_color()?,
            text,
        })
    }

    pub fn text(&self) -> &TextDefinition {
        &self.text
    }

    /// Bold variant of the text settings, used for headers.
    fn header_text(&self) -> TextDefinition {
        let mut text = self.text.clone();
        text.set_bold(true);
        text
    }
}

/// Builder for [`Svg`] exporters.
pub struct SvgBuilder<W> {
    writer: W,
    theme: Option<Theme>,
}

impl<W: io::Write> SvgBuilder<W> {
    /// Create a builder writing into `writer`
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            theme: None,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Finish the builder, falling back to the default style.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if no theme was set and the default style
    /// does not resolve.
    pub fn build(self) -> Result<Svg<W>, Error> {
        let theme = match self.theme {
            Some(theme) => theme,
            None => Theme::from_style(&StyleConfig::default()).map_err(Error::Render)?,
        };
        Ok(Svg {
            writer: self.writer,
            theme,
        })
    }
}

/// SVG exporter writing into `W`.
pub struct Svg<W> {
    writer: W,
    theme: Theme,
}

impl<W> Svg<W> {
    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Creates a document of `size` with the background applied.
    fn document(&self, size: Size) -> Document {
        let doc = Document::new()
            .set("viewBox", format!("0 0 {} {}", size.width(), size.height()))
            .set("width", size.width())
            .set("height", size.height());

        match self.theme.background {
            Some(color) => doc.add(
                svg_element::Rectangle::new()
                    .set("x", 0)
                    .set("y", 0)
                    .set("width", size.width())
                    .set("height", size.height())
                    .set("fill", color.to_string())
                    .set("fill-opacity", color.alpha()),
            ),
            None => doc,
        }
    }
}

impl<W: io::Write> Svg<W> {
    fn write(&mut self, document: &Document) -> Result<(), Error> {
        svg::write(&mut self.writer, document).map_err(Error::Io)
    }
}

impl<W: io::Write> Exporter for Svg<W> {
    fn export_diagram(
        &mut self,
        model: &DiagramModel,
        layout: &DiagramLayout,
    ) -> Result<(), Error> {
        let document = self.render_diagram(model, layout)?;
        debug!(nodes = model.nodes().len(), links = model.links().len(); "Diagram rendered");
        self.write(&document)
    }

    fn export_tokens(&mut self, tokens: &TokenStream) -> Result<(), Error> {
        let document = self.render_tokens(tokens);
        debug!(tokens = tokens.len(); "Token table rendered");
        self.write(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exporter() -> Svg<Vec<u8>> {
        SvgBuilder::new(Vec::new()).build().unwrap()
    }

    #[test]
    fn test_document_has_viewbox_and_background() {
        let svg = exporter();
        let doc = svg.document(Size::new(120.0, 80.0)).to_string();

        assert!(doc.contains("viewBox=\"0 0 120 80\""));
        assert!(doc.contains("<rect"));
    }

    #[test]
    fn test_transparent_background_has_no_rect() {
        let style = StyleConfig::default().with_background_color(None);
        let theme = Theme::from_style(&style).unwrap();
        let svg = SvgBuilder::new(Vec::new()).with_theme(theme).build().unwrap();

        let doc = svg.document(Size::new(10.0, 10.0)).to_string();
        assert!(!doc.contains("<rect"));
    }

    #[test]
    fn test_invalid_style_names_the_color() {
        let style = StyleConfig::default().with_link_color("no-such-color");
        let err = Theme::from_style(&style).unwrap_err();
        assert!(err.contains("link"));
    }

    #[test]
    fn test_labels_use_stroke_color() {
        let theme = Theme::from_style(&StyleConfig::default()).unwrap();
        assert_eq!(theme.text().color(), Some(&theme.node_stroke));
        assert!(theme.header_text().bold());
    }

    #[test]
    fn test_written_output_is_a_document() {
        let mut svg = exporter();
        svg.export_tokens(&TokenStream::new(Vec::new())).unwrap();

        let output = String::from_utf8(svg.into_inner()).unwrap();
        assert!(output.starts_with("<svg"));
        assert!(output.trim_end().ends_with("</svg>"));
    }
}

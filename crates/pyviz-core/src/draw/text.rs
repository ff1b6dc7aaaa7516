//! Text labels with measured sizes.
//!
//! Node widths depend on the rendered width of their label, value and port
//! names, so text is measured with `cosmic-text` against the configured font.
//! When no font can be shaped (for example on a machine without system fonts)
//! the measurement falls back to a per-character estimate.

use std::sync::{Mutex, OnceLock};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::info;
use svg::{node::Text as SvgText, node::element as svg_element};

use crate::{
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer},
    geometry::{Point, Size},
};

/// Average glyph width as a fraction of the font size, used when shaping fails.
const FALLBACK_GLYPH_WIDTH: f32 = 0.6;

/// Font and color settings for a text element.
#[derive(Debug, Clone)]
pub struct TextDefinition {
    font_family: String,
    font_size: u16,
    color: Option<Color>,
    bold: bool,
}

impl TextDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_font_family(&mut self, family: &str) {
        self.font_family = family.to_string();
    }

    pub fn set_font_size(&mut self, size: u16) {
        self.font_size = size;
    }

    /// Sets the fill color; `None` keeps the SVG default.
    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.bold = bold;
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    pub fn bold(&self) -> bool {
        self.bold
    }
}

impl Default for TextDefinition {
    fn default() -> Self {
        Self {
            font_family: "monospace".to_string(),
            font_size: 12,
            color: None,
            bold: false,
        }
    }
}

/// Horizontal anchoring of a text element relative to its position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// A single-line text element.
///
/// # Examples
///
/// ```
/// # use pyviz_core::draw::{Text, TextDefinition};
/// let style = TextDefinition::new();
/// let text = Text::new(&style, "BinOp");
/// assert!(text.calculate_size().width() > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Text<'a> {
    definition: &'a TextDefinition,
    content: &'a str,
    anchor: TextAnchor,
}

impl<'a> Text<'a> {
    pub fn new(definition: &'a TextDefinition, content: &'a str) -> Self {
        Self {
            definition,
            content,
            anchor: TextAnchor::Start,
        }
    }

    pub fn with_anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn content(&self) -> &str {
        self.content
    }

    /// Measured size of the text.
    pub fn calculate_size(&self) -> Size {
        TEXT_MANAGER
            .get_or_init(TextManager::new)
            .calculate_text_size(self.content, self.definition)
    }
}

impl Drawable for Text<'_> {
    /// Renders the text vertically centered on `position.y()`, anchored
    /// horizontally at `position.x()`.
    fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let mut output = LayeredOutput::new();

        let mut rendered = svg_element::Text::new("")
            .set("x", position.x())
            .set("y", position.y())
            .set("text-anchor", self.anchor.as_svg())
            .set("dominant-baseline", "central")
            .set("font-family", self.definition.font_family())
            .set("font-size", self.definition.font_size())
            .add(SvgText::new(self.content));

        if self.definition.bold() {
            rendered = rendered.set("font-weight", "bold");
        }

        if let Some(color) = self.definition.color() {
            rendered = rendered
                .set("fill", color.to_string())
                .set("fill-opacity", color.alpha());
        }

        output.add_to_layer(RenderLayer::Text, Box::new(rendered));
        output
    }

    fn size(&self) -> Size {
        self.calculate_size()
    }
}

/// Owns the shared [`FontSystem`]; creating one scans system fonts.
struct TextManager {
    font_system: Mutex<FontSystem>,
}

impl TextManager {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Mutex::new(FontSystem::new()),
        }
    }

    fn calculate_text_size(&self, text: &str, text_def: &TextDefinition) -> Size {
        if text.is_empty() {
            return Size::default();
        }

        let font_size_px = text_def.font_size() as f32 * 1.33;
        let line_height = font_size_px * 1.15;
        let fallback_width = text.chars().count() as f32 * font_size_px * FALLBACK_GLYPH_WIDTH;

        let mut font_system = self.font_system.lock().expect("failed to lock FontSystem");
        let metrics = Metrics::new(font_size_px, line_height);
        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let attrs = Attrs::new().family(Family::Name(text_def.font_family()));
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;
        for run in buffer.layout_runs() {
            if let Some(last) = run.glyphs.last() {
                max_width = max_width.max(last.x + last.w);
            }
            total_height += line_height;
        }

        if max_width <= 0.0 {
            max_width = fallback_width;
        }
        if total_height <= 0.0 {
            total_height = line_height;
        }

        Size::new(max_width, total_height)
    }
}

static TEXT_MANAGER: OnceLock<TextManager> = OnceLock::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_definition() {
        let def = TextDefinition::default();
        assert_eq!(def.font_family(), "monospace");
        assert_eq!(def.font_size(), 12);
        assert!(def.color().is_none());
        assert!(!def.bold());
    }

    #[test]
    fn test_empty_text_has_zero_size() {
        let def = TextDefinition::default();
        assert!(Text::new(&def, "").calculate_size().is_zero());
    }

    #[test]
    fn test_longer_text_is_wider() {
        let def = TextDefinition::default();
        let short = Text::new(&def, "If").calculate_size();
        let long = Text::new(&def, "AsyncFunctionDef").calculate_size();

        assert!(short.width() > 0.0);
        assert!(long.width() > short.width());
        assert!(short.height() > 0.0);
    }

    #[test]
    fn test_render_sets_anchor_and_font() {
        let mut def = TextDefinition::default();
        def.set_bold(true);
        let text = Text::new(&def, "Value").with_anchor(TextAnchor::End);

        let rendered: Vec<String> = text
            .render_to_layers(Point::new(10.0, 20.0))
            .render()
            .iter()
            .map(|node| node.to_string())
            .collect();

        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].contains("text-anchor=\"end\""));
        assert!(rendered[0].contains("font-weight=\"bold\""));
        assert!(rendered[0].contains("Value"));
    }
}

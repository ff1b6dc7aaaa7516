//! Configuration types for pyviz diagram rendering.
//!
//! All types implement [`serde::Deserialize`] and fall back to defaults for
//! every missing key, so a partial TOML file is a valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and style settings.
//! - [`LayoutConfig`] - Layout engine, rank direction, margins and spacing.
//! - [`StyleConfig`] - Colors and font used by the SVG exporter.
//!
//! # Example
//!
//! ```
//! # use pyviz::config::{AppConfig, RankDirection};
//! let config = AppConfig::default();
//! assert_eq!(config.layout().direction(), RankDirection::LeftRight);
//! assert!(config.style().background_color().is_ok());
//! ```

use serde::Deserialize;

use pyviz_core::{color::Color, draw::TextDefinition, geometry::Insets};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its two sections.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Which layout algorithm places the nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutEngine {
    /// Sugiyama layering with crossing reduction.
    #[default]
    Sugiyama,
    /// Longest-path layering in input order.
    Layered,
}

/// The axis along which successive ranks are placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankDirection {
    /// Parents on the left, children to their right.
    #[default]
    LeftRight,
    /// Parents on top, children below.
    TopBottom,
}

/// Layout settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    engine: LayoutEngine,
    direction: RankDirection,
    margin_x: f32,
    margin_y: f32,
    /// Gap between neighboring nodes of one rank.
    node_spacing: f32,
    /// Gap between consecutive ranks.
    rank_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            engine: LayoutEngine::default(),
            direction: RankDirection::default(),
            margin_x: 25.0,
            margin_y: 25.0,
            node_spacing: 30.0,
            rank_spacing: 80.0,
        }
    }
}

impl LayoutConfig {
    pub fn new(engine: LayoutEngine, direction: RankDirection) -> Self {
        Self {
            engine,
            direction,
            ..Self::default()
        }
    }

    pub fn with_margins(mut self, margin_x: f32, margin_y: f32) -> Self {
        self.margin_x = margin_x;
        self.margin_y = margin_y;
        self
    }

    pub fn with_spacing(mut self, node_spacing: f32, rank_spacing: f32) -> Self {
        self.node_spacing = node_spacing;
        self.rank_spacing = rank_spacing;
        self
    }

    pub fn engine(&self) -> LayoutEngine {
        self.engine
    }

    pub fn direction(&self) -> RankDirection {
        self.direction
    }

    /// Margins around the whole diagram.
    pub fn margins(&self) -> Insets {
        Insets::symmetric(self.margin_x, self.margin_y)
    }

    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    pub fn rank_spacing(&self) -> f32 {
        self.rank_spacing
    }
}

/// Visual styling configuration for rendered diagrams.
///
/// Colors are kept as strings and parsed on access, so an invalid color is
/// reported when rendering starts rather than when the file is loaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    node_fill_color: String,
    node_stroke_color: String,
    link_color: String,
    font_family: String,
    font_size: u16,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: Some("white".to_string()),
            node_fill_color: "#f5f5f5".to_string(),
            node_stroke_color: "#333333".to_string(),
            link_color: "#555555".to_string(),
            font_family: "monospace".to_string(),
            font_size: 12,
        }
    }
}

impl StyleConfig {
    /// Sets the background color; `None` leaves the canvas transparent.
    pub fn with_background_color(mut self, color: Option<&str>) -> Self {
        self.background_color = color.map(str::to_string);
        self
    }

    pub fn with_link_color(mut self, color: &str) -> Self {
        self.link_color = color.to_string();
        self
    }

    pub fn with_font(mut self, family: &str, size: u16) -> Self {
        self.font_family = family.to_string();
        self.font_size = size;
        self
    }

    /// Returns the parsed background [`Color`], or `None` for a transparent
    /// background.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_deref()
            .map(|color| parse_color("background", color))
            .transpose()
    }

    pub fn node_fill_color(&self) -> Result<Color, String> {
        parse_color("node fill", &self.node_fill_color)
    }

    pub fn node_stroke_color(&self) -> Result<Color, String> {
        parse_color("node stroke", &self.node_stroke_color)
    }

    pub fn link_color(&self) -> Result<Color, String> {
        parse_color("link", &self.link_color)
    }

    /// Text settings for labels, values and port names.
    pub fn text(&self) -> TextDefinition {
        let mut text = TextDefinition::new();
        text.set_font_family(&self.font_family);
        text.set_font_size(self.font_size);
        text
    }
}

fn parse_color(role: &str, color: &str) -> Result<Color, String> {
    Color::new(color).map_err(|err| format!("Invalid {role} color in config: {err}"))
}

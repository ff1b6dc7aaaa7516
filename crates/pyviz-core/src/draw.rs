//! Drawing primitives shared by the diagram and table renderers.
//!
//! - [`Drawable`] - anything that can emit layered SVG at a position and report its size
//! - [`LayeredOutput`] / [`RenderLayer`] - z-ordered collection of SVG nodes
//! - [`Text`] / [`TextDefinition`] - measured text labels

mod layer;
mod text;

pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use text::{Text, TextAnchor, TextDefinition};

use crate::geometry::{Point, Size};

/// An element that knows its size and how to render itself.
pub trait Drawable {
    /// Renders the element anchored at `position`.
    fn render_to_layers(&self, position: Point) -> LayeredOutput;

    /// Total size of the rendered element.
    fn size(&self) -> Size;
}

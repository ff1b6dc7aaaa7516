//! Layer-based SVG output.
//!
//! Drawables push SVG nodes into a [`LayeredOutput`] tagged with a
//! [`RenderLayer`]; rendering emits one `<g data-layer="...">` group per
//! non-empty layer, bottom layer first.
//!
//! # Example
//!
//! ```
//! # use pyviz_core::draw::{LayeredOutput, RenderLayer};
//! # use svg::node::element::{Rectangle, Text};
//! let mut output = LayeredOutput::new();
//! output.add_to_layer(RenderLayer::Text, Box::new(Text::new("Assign")));
//! output.add_to_layer(RenderLayer::Node, Box::new(Rectangle::new()));
//!
//! // Node renders before Text regardless of insertion order.
//! assert_eq!(output.render().len(), 2);
//! ```

use svg::node::element as svg_element;

/// Boxed SVG node.
pub type SvgNode = Box<dyn svg::Node>;

/// Rendering layers, bottom to top in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Diagram background and table stripes
    Background,
    /// Links between nodes, drawn under the node boxes
    Link,
    /// Node boxes and table cells
    Node,
    /// Port markers on node edges
    Port,
    /// Labels, values and port names
    Text,
}

impl RenderLayer {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Link => "link",
            Self::Node => "node",
            Self::Port => "port",
            Self::Text => "text",
        }
    }
}

/// SVG nodes collected per [`RenderLayer`].
#[derive(Debug, Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `node` to `layer`.
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    /// Moves every node of `other` into this output.
    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the output and returns one SVG group per non-empty layer.
    ///
    /// Nodes keep their insertion order within a layer.
    pub fn render(mut self) -> Vec<SvgNode> {
        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result: Vec<SvgNode> = Vec::new();
        let mut current: Option<(RenderLayer, svg_element::Group)> = None;

        for (layer, node) in self.items {
            match current.take() {
                Some((current_layer, group)) if current_layer == layer => {
                    current = Some((layer, group.add(node)));
                }
                finished => {
                    if let Some((_, group)) = finished {
                        result.push(Box::new(group));
                    }
                    let group = svg_element::Group::new().set("data-layer", layer.name());
                    current = Some((layer, group.add(node)));
                }
            }
        }

        if let Some((_, group)) = current {
            result.push(Box::new(group));
        }

        result
    }
}

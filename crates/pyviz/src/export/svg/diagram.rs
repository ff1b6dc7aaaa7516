//! SVG rendering for node/link diagrams.

use svg::{
    Document,
    node::element::{self as svg_element, path::Data},
};

use pyviz_core::{
    diagram::{BASE_NODE_HEIGHT, DiagramLink, DiagramNode, NodeId},
    draw::{Drawable, LayeredOutput, RenderLayer, Text, TextAnchor},
    geometry::{Bounds, Point},
};

use super::Svg;
use crate::{
    export::Error,
    layout::{
        DiagramLayout,
        metrics::{self, NODE_PADDING},
    },
    structure::DiagramModel,
};

const CORNER_RADIUS: f32 = 4.0;
const PORT_RADIUS: f32 = 3.0;
const ARROW_MARKER_ID: &str = "pyviz-arrow";

/// Minimum horizontal reach of a link's control points.
const MIN_CURVE: f32 = 30.0;

impl<W> Svg<W> {
    /// Renders a laid-out diagram into a standalone document.
    pub(super) fn render_diagram(
        &self,
        model: &DiagramModel,
        layout: &DiagramLayout,
    ) -> Result<Document, Error> {
        if model.nodes().len() != layout.nodes().len() {
            return Err(Error::Render(format!(
                "layout has {} nodes but the diagram has {}",
                layout.nodes().len(),
                model.nodes().len()
            )));
        }

        let mut output = LayeredOutput::new();
        for (node, positioned) in model.nodes().iter().zip(layout.nodes()) {
            output.merge(self.render_node(node, positioned.bounds()));
        }
        for link in model.links() {
            let path = self.render_link(model, layout, link)?;
            output.add_to_layer(RenderLayer::Link, Box::new(path));
        }

        let doc = self
            .document(layout.size())
            .add(self.arrow_marker_definition());
        Ok(output
            .render()
            .into_iter()
            .fold(doc, |doc, group| doc.add(group)))
    }

    fn render_node(&self, node: &DiagramNode, bounds: Bounds) -> LayeredOutput {
        let mut output = LayeredOutput::new();

        let rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", CORNER_RADIUS)
            .set("fill", self.theme.node_fill.to_string())
            .set("fill-opacity", self.theme.node_fill.alpha())
            .set("stroke", self.theme.node_stroke.to_string())
            .set("stroke-width", 1)
            .set("data-node", node.id().to_string());
        output.add_to_layer(RenderLayer::Node, Box::new(rect));

        let header = metrics::header_text(node);
        let header_style = self.theme.header_text();
        output.merge(
            Text::new(&header_style, &header)
                .with_anchor(TextAnchor::Middle)
                .render_to_layers(Point::new(
                    bounds.center().x(),
                    bounds.min_y() + metrics::header_center(),
                )),
        );

        if !node.entries().is_empty() || node.port_count() > 0 {
            let y = bounds.min_y() + BASE_NODE_HEIGHT;
            let divider = svg_element::Line::new()
                .set("x1", bounds.min_x())
                .set("y1", y)
                .set("x2", bounds.max_x())
                .set("y2", y)
                .set("stroke", self.theme.node_stroke.to_string())
                .set("stroke-width", 0.5);
            output.add_to_layer(RenderLayer::Node, Box::new(divider));
        }

        let text = self.theme.text();
        for (row, entry) in node.entries().iter().enumerate() {
            let y = bounds.min_y() + metrics::row_center(row);
            output.merge(
                Text::new(text, entry.key())
                    .render_to_layers(Point::new(bounds.min_x() + NODE_PADDING, y)),
            );
            output.merge(
                Text::new(text, entry.value())
                    .with_anchor(TextAnchor::End)
                    .render_to_layers(Point::new(bounds.max_x() - NODE_PADDING, y)),
            );
        }

        for port in node.ports() {
            let y = bounds.min_y() + metrics::row_center(node.port_row(port.id()));
            output.merge(
                Text::new(text, port.label())
                    .with_anchor(TextAnchor::End)
                    .render_to_layers(Point::new(bounds.max_x() - NODE_PADDING, y)),
            );
            let marker = svg_element::Circle::new()
                .set("cx", bounds.max_x())
                .set("cy", y)
                .set("r", PORT_RADIUS)
                .set("fill", self.theme.node_stroke.to_string());
            output.add_to_layer(RenderLayer::Port, Box::new(marker));
        }

        output
    }

    /// Cubic curve from the source port anchor on the right edge to the
    /// target's in-port on the left edge of its header.
    fn render_link(
        &self,
        model: &DiagramModel,
        layout: &DiagramLayout,
        link: &DiagramLink,
    ) -> Result<svg_element::Path, Error> {
        let bounds_of = |id: NodeId| {
            model
                .position(id)
                .and_then(|position| layout.node_at(position))
                .map(|positioned| positioned.bounds())
                .ok_or_else(|| Error::Render(format!("node {id} has no position")))
        };

        let source_node = model
            .node(link.source_node())
            .ok_or_else(|| Error::Render(format!("unknown link source {}", link.source_node())))?;
        let source = bounds_of(link.source_node())?;
        let target = bounds_of(link.target_node())?;

        let start = Point::new(
            source.max_x(),
            source.min_y() + metrics::row_center(source_node.port_row(link.source())),
        );
        let end = Point::new(target.min_x(), target.min_y() + metrics::header_center());
        let reach = ((end.x() - start.x()).abs() / 2.0).max(MIN_CURVE);

        let data = Data::new()
            .move_to((start.x(), start.y()))
            .cubic_curve_to((
                start.x() + reach,
                start.y(),
                end.x() - reach,
                end.y(),
                end.x(),
                end.y(),
            ));

        Ok(svg_element::Path::new()
            .set("d", data)
            .set("fill", "none")
            .set("stroke", self.theme.link.to_string())
            .set("stroke-opacity", self.theme.link.alpha())
            .set("stroke-width", 1.5)
            .set("marker-end", format!("url(#{ARROW_MARKER_ID})")))
    }

    fn arrow_marker_definition(&self) -> svg_element::Definitions {
        let arrow = svg_element::Path::new()
            .set("d", "M 0 0 L 10 5 L 0 10 z")
            .set("fill", self.theme.link.to_string());
        let marker = svg_element::Marker::new()
            .set("id", ARROW_MARKER_ID)
            .set("viewBox", "0 0 10 10")
            .set("refX", 10)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(arrow);
        svg_element::Definitions::new().add(marker)
    }
}

#[cfg(test)]
mod tests {
    use pyviz_core::draw::TextDefinition;
    use pyviz_syntax::{
        SyntaxNode,
        syntax::{BinaryOperator, Number},
    };

    use super::*;
    use crate::{
        config::LayoutEngine, export::svg::SvgBuilder, flatten::flatten_ast, layout::EngineBuilder,
    };

    fn rendered(tree: &SyntaxNode) -> String {
        let model = DiagramModel::from_flattened(flatten_ast(tree));
        let layout = EngineBuilder::new()
            .with_engine(LayoutEngine::Layered)
            .build(&model, &TextDefinition::new())
            .unwrap();
        let svg = SvgBuilder::new(Vec::new()).build().unwrap();
        svg.render_diagram(&model, &layout).unwrap().to_string()
    }

    #[test]
    fn test_one_box_per_node_and_one_path_per_link() {
        let tree = SyntaxNode::Assign {
            value: Box::new(SyntaxNode::BinOp {
                left: Box::new(SyntaxNode::Num { n: Number::Int(42) }),
                op: BinaryOperator::Add,
                right: Box::new(SyntaxNode::Num { n: Number::Int(1) }),
            }),
            targets: vec![SyntaxNode::Name { id: "a".into() }],
        };
        let svg = rendered(&tree);

        assert_eq!(svg.matches("data-node=").count(), 6);
        assert_eq!(svg.matches("marker-end=").count(), 5);
        assert!(svg.contains("Number  42"));
        assert!(svg.contains("Value"));
        assert!(svg.contains("Target"));
    }

    #[test]
    fn test_layers_stack_links_under_nodes() {
        let tree = SyntaxNode::Expr {
            value: Box::new(SyntaxNode::Name { id: "x".into() }),
        };
        let svg = rendered(&tree);

        let link = svg.find("data-layer=\"link\"").unwrap();
        let node = svg.find("data-layer=\"node\"").unwrap();
        let text = svg.find("data-layer=\"text\"").unwrap();
        assert!(link < node);
        assert!(node < text);
    }

    #[test]
    fn test_mismatched_layout_is_rejected() {
        let model = DiagramModel::from_flattened(flatten_ast(&SyntaxNode::Pass));
        let empty = DiagramModel::from_parts(Vec::new(), Vec::new()).unwrap();
        let layout = EngineBuilder::new().build(&empty, &TextDefinition::new()).unwrap();

        let svg = SvgBuilder::new(Vec::new()).build().unwrap();
        let err = svg.render_diagram(&model, &layout).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}

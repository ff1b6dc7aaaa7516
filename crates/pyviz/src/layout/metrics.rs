//! Node box geometry shared by layout and rendering.
//!
//! A node box is a header row followed by one row per display entry and one
//! row per port:
//!
//! ```text
//! +----------------------+
//! |    label  value      |  BASE_NODE_HEIGHT
//! | key            value |  ROW_HEIGHT
//! |             Port 0 o |  ROW_HEIGHT
//! +----------------------+
//! ```

use pyviz_core::{
    diagram::{BASE_NODE_HEIGHT, DiagramNode, ROW_HEIGHT},
    draw::{Text, TextDefinition},
    geometry::Size,
};

/// Horizontal padding between the box edge and its text.
pub(crate) const NODE_PADDING: f32 = 12.0;

/// Gap between an entry's key and its value.
const ENTRY_GAP: f32 = 16.0;

const MIN_NODE_WIDTH: f32 = 80.0;

/// Text shown in the header row.
pub(crate) fn header_text(node: &DiagramNode) -> String {
    match node.value() {
        Some(value) => format!("{}  {value}", node.label()),
        None => node.label().to_string(),
    }
}

/// Vertical center of the header row, relative to the box top.
pub(crate) fn header_center() -> f32 {
    BASE_NODE_HEIGHT / 2.0
}

/// Vertical center of body row `row`, relative to the box top.
pub(crate) fn row_center(row: usize) -> f32 {
    BASE_NODE_HEIGHT + ROW_HEIGHT * row as f32 + ROW_HEIGHT / 2.0
}

/// Size of the box drawn for `node`.
pub(crate) fn node_size(node: &DiagramNode, text: &TextDefinition) -> Size {
    let width_of = |content: &str| Text::new(text, content).calculate_size().width();

    let header = width_of(&header_text(node));
    let entries = node
        .entries()
        .iter()
        .map(|entry| width_of(entry.key()) + ENTRY_GAP + width_of(entry.value()))
        .fold(0.0, f32::max);
    let ports = node
        .ports()
        .map(|port| width_of(port.label()))
        .fold(0.0, f32::max);

    let width = header.max(entries).max(ports) + 2.0 * NODE_PADDING;
    Size::new(width.max(MIN_NODE_WIDTH), node.height())
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use pyviz_core::diagram::{NodeBuilder, NodeIdAllocator, NodeKind};

    use super::*;

    #[test]
    fn test_rows_start_below_header() {
        assert_approx_eq!(f32, header_center(), BASE_NODE_HEIGHT / 2.0);
        assert_approx_eq!(f32, row_center(0), BASE_NODE_HEIGHT + ROW_HEIGHT / 2.0);
        assert_approx_eq!(f32, row_center(2) - row_center(1), ROW_HEIGHT);
    }

    #[test]
    fn test_node_size_uses_display_height() {
        let mut ids = NodeIdAllocator::new();
        let mut builder = NodeBuilder::new(ids.allocate(), NodeKind::Ast, "BinOp");
        builder.add_port("Left", "Left");
        builder.add_port("Right", "Right");
        let node = builder.build();

        let size = node_size(&node, &TextDefinition::new());
        assert_approx_eq!(f32, size.height(), node.height());
        assert!(size.width() >= MIN_NODE_WIDTH);
    }

    #[test]
    fn test_long_value_widens_node() {
        let mut ids = NodeIdAllocator::new();
        let short = NodeBuilder::new(ids.allocate(), NodeKind::Ast, "Str")
            .with_value("'a'")
            .build();
        let long = NodeBuilder::new(ids.allocate(), NodeKind::Ast, "Str")
            .with_value("'a considerably longer string literal'")
            .build();

        let text = TextDefinition::new();
        assert!(node_size(&long, &text).width() > node_size(&short, &text).width());
    }

    #[test]
    fn test_header_text() {
        let mut ids = NodeIdAllocator::new();
        let node = NodeBuilder::new(ids.allocate(), NodeKind::Ast, "Number")
            .with_value("42")
            .build();
        assert_eq!(header_text(&node), "Number  42");
    }
}

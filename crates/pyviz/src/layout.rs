//! Layout of a [`DiagramModel`] into positioned node boxes.
//!
//! # Pipeline Position
//!
//! ```text
//! SyntaxNode / ObjectGraph
//!     ↓ flatten
//! DiagramModel
//!     ↓ layout (this module)
//! DiagramLayout
//!     ↓ export
//! SVG
//! ```
//!
//! Ranks are laid out along the configured [`RankDirection`]: with
//! `left-right` parents sit to the left of their children, with
//! `top-bottom` above them.
//!
//! [`RankDirection`]: crate::config::RankDirection

mod engines;
pub(crate) mod metrics;
mod positioning;

pub use engines::EngineBuilder;

use pyviz_core::{
    diagram::NodeId,
    geometry::{Bounds, Size},
};

/// A node box with its final position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedNode {
    id: NodeId,
    bounds: Bounds,
    rank: usize,
}

impl PositionedNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Box of the node in diagram coordinates, margins included.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn rank(&self) -> usize {
        self.rank
    }
}

/// Positions of every node of a diagram plus the canvas size.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramLayout {
    nodes: Vec<PositionedNode>,
    size: Size,
}

impl DiagramLayout {
    /// Positioned nodes, aligned with `DiagramModel::nodes`.
    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    /// Positioned node at `position` in model order.
    pub fn node_at(&self, position: usize) -> Option<&PositionedNode> {
        self.nodes.get(position)
    }

    /// Canvas size, margins included.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Number of distinct ranks used.
    pub fn rank_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| node.rank + 1)
            .max()
            .unwrap_or(0)
    }
}

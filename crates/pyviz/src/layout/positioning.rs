//! Turns ranks into coordinates.
//!
//! Ranks are laid out one after another along the rank axis, separated by the
//! rank spacing; a rank is as thick as its thickest node. Within a rank,
//! nodes are stacked across the rank axis in placement order, separated by
//! the node spacing, and each rank is centered on the longest one.

use log::debug;

use pyviz_core::{
    draw::TextDefinition,
    geometry::{Bounds, Insets, Point, Size},
};

use super::{DiagramLayout, PositionedNode, engines::Placement, metrics};
use crate::{config::RankDirection, structure::DiagramModel};

pub(super) struct Spacing {
    pub direction: RankDirection,
    pub margins: Insets,
    pub node: f32,
    pub rank: f32,
}

impl Spacing {
    /// Extent of `size` along the rank axis.
    fn along(&self, size: Size) -> f32 {
        match self.direction {
            RankDirection::LeftRight => size.width(),
            RankDirection::TopBottom => size.height(),
        }
    }

    /// Extent of `size` across the rank axis.
    fn across(&self, size: Size) -> f32 {
        match self.direction {
            RankDirection::LeftRight => size.height(),
            RankDirection::TopBottom => size.width(),
        }
    }

    fn point(&self, along: f32, across: f32) -> Point {
        let (x, y) = match self.direction {
            RankDirection::LeftRight => (along, across),
            RankDirection::TopBottom => (across, along),
        };
        Point::new(self.margins.left() + x, self.margins.top() + y)
    }
}

pub(super) fn arrange(
    model: &DiagramModel,
    placements: &[Placement],
    text: &TextDefinition,
    spacing: &Spacing,
) -> DiagramLayout {
    let sizes: Vec<Size> = model
        .nodes()
        .iter()
        .map(|node| metrics::node_size(node, text))
        .collect();

    // Engines may leave gaps between ranks; close them.
    let mut used: Vec<usize> = placements.iter().map(|placement| placement.rank).collect();
    used.sort_unstable();
    used.dedup();
    let dense = |rank: usize| used.binary_search(&rank).unwrap_or_else(|slot| slot);

    let mut ranks: Vec<Vec<usize>> = vec![Vec::new(); used.len()];
    for (node, placement) in placements.iter().enumerate() {
        ranks[dense(placement.rank)].push(node);
    }
    for members in &mut ranks {
        members.sort_by(|&a, &b| {
            placements[a]
                .order
                .total_cmp(&placements[b].order)
                .then(a.cmp(&b))
        });
    }

    let thickness: Vec<f32> = ranks
        .iter()
        .map(|members| {
            members
                .iter()
                .map(|&node| spacing.along(sizes[node]))
                .fold(0.0, f32::max)
        })
        .collect();
    let extents: Vec<f32> = ranks
        .iter()
        .map(|members| {
            let gaps = members.len().saturating_sub(1) as f32 * spacing.node;
            members
                .iter()
                .map(|&node| spacing.across(sizes[node]))
                .sum::<f32>()
                + gaps
        })
        .collect();
    let longest = extents.iter().copied().fold(0.0, f32::max);

    let mut bounds = vec![Bounds::default(); sizes.len()];
    let mut rank_of = vec![0; sizes.len()];
    let mut offset = 0.0;
    for (rank, members) in ranks.iter().enumerate() {
        let mut cursor = (longest - extents[rank]) / 2.0;
        for &node in members {
            bounds[node] = spacing.point(offset, cursor).to_bounds(sizes[node]);
            rank_of[node] = rank;
            cursor += spacing.across(sizes[node]) + spacing.node;
        }
        offset += thickness[rank] + spacing.rank;
    }

    let depth = thickness.iter().sum::<f32>() + ranks.len().saturating_sub(1) as f32 * spacing.rank;
    let content = match spacing.direction {
        RankDirection::LeftRight => Size::new(depth, longest),
        RankDirection::TopBottom => Size::new(longest, depth),
    };
    let size = content.add_padding(spacing.margins);
    debug!(ranks = ranks.len(), width = size.width(), height = size.height(); "Nodes positioned");

    let nodes = model
        .nodes()
        .iter()
        .zip(bounds)
        .zip(rank_of)
        .map(|((node, bounds), rank)| PositionedNode {
            id: node.id(),
            bounds,
            rank,
        })
        .collect();

    DiagramLayout { nodes, size }
}

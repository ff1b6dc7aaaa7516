//! Sugiyama layering through `rust-sugiyama`.
//!
//! Only ranks and in-rank order are taken from the crate's coordinates; the
//! final geometry comes from the shared placement step so that both engines
//! size nodes the same way. Whenever the crate cannot be used (no links, a
//! panic, an unusable result), the layered engine takes over.

use std::{collections::HashMap, panic};

use log::{debug, warn};
use rust_sugiyama::configure::Config;

use super::{LayeredEngine, Placement, RankEngine};
use crate::{error::PyvizError, structure::DiagramModel};

/// Distance between vertices handed to `rust-sugiyama`.
const VERTEX_SPACING: f64 = 10.0;

/// Sugiyama engine with a layered fallback.
#[derive(Debug, Default)]
pub struct Engine {
    fallback: LayeredEngine,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    fn sugiyama(&self, model: &DiagramModel) -> Result<Vec<Placement>, PyvizError> {
        let count = model.nodes().len();

        let mut edges: Vec<(u32, u32)> = Vec::new();
        for link in model.links() {
            if let (Some(source), Some(target)) = (
                model.position(link.source_node()),
                model.position(link.target_node()),
            ) {
                // Skip self-loops
                if source != target {
                    edges.push((source as u32, target as u32));
                }
            }
        }

        if edges.is_empty() {
            return Err(PyvizError::Layout("diagram has no links to layer".to_string()));
        }

        debug!(nodes = count, edges = edges.len(); "Applying Sugiyama algorithm");

        let layouts = {
            let edges = edges.clone();
            panic::catch_unwind(move || {
                let config = Config {
                    minimum_length: 1,
                    vertex_spacing: VERTEX_SPACING,
                    ..Default::default()
                };
                rust_sugiyama::from_edges(&edges, &config)
            })
        };

        let results = match layouts {
            Ok(results) if !results.is_empty() => results,
            Ok(_) => {
                return Err(PyvizError::Layout(
                    "Rust-sugiyama returned empty layout results".to_string(),
                ));
            }
            Err(err) => {
                let message = if let Some(panic_msg) = err.downcast_ref::<String>() {
                    format!("Rust-sugiyama layout engine panicked: {panic_msg}")
                } else if let Some(panic_msg) = err.downcast_ref::<&str>() {
                    format!("Rust-sugiyama layout engine panicked: {panic_msg}")
                } else {
                    "Rust-sugiyama layout engine panicked with unknown error".to_string()
                };
                return Err(PyvizError::Layout(message));
            }
        };

        // Components come back separately, each starting near x = 0; shift
        // each one right of the previous.
        let mut coords: Vec<Option<(f64, f64)>> = vec![None; count];
        let mut base = 0.0;
        for (component, _, _) in &results {
            let min_x = component.iter().map(|&(_, (x, _))| x).fold(f64::MAX, f64::min);
            let max_x = component.iter().map(|&(_, (x, _))| x).fold(f64::MIN, f64::max);
            for &(id, (x, y)) in component {
                if let Some(slot) = coords.get_mut(id) {
                    *slot = Some((base + x - min_x, y));
                } else {
                    debug!(id; "Node id from rust-sugiyama result is out of range");
                }
            }
            if min_x <= max_x {
                base += max_x - min_x + VERTEX_SPACING;
            }
        }

        let connected: Vec<bool> = {
            let mut connected = vec![false; count];
            for &(source, target) in &edges {
                connected[source as usize] = true;
                connected[target as usize] = true;
            }
            connected
        };
        if let Some(missing) = (0..count).find(|&node| connected[node] && coords[node].is_none()) {
            return Err(PyvizError::Layout(format!(
                "rust-sugiyama did not place node {}",
                model.nodes()[missing].id()
            )));
        }

        // Ranks are the distinct y levels, in order.
        let level = |y: f64| (y * 1000.0).round() as i64;
        let mut levels: Vec<i64> = coords.iter().flatten().map(|&(_, y)| level(y)).collect();
        levels.sort_unstable();
        levels.dedup();
        let rank_of: HashMap<i64, usize> = levels
            .iter()
            .enumerate()
            .map(|(rank, &level)| (level, rank))
            .collect();

        let mut ranks: Vec<usize> = coords
            .iter()
            .map(|coord| coord.map_or(0, |(_, y)| rank_of[&level(y)]))
            .collect();

        // The crate's y axis may grow against the links; flip so most links
        // point to a higher rank.
        let forward = edges
            .iter()
            .filter(|&&(s, t)| ranks[s as usize] < ranks[t as usize])
            .count();
        let backward = edges
            .iter()
            .filter(|&&(s, t)| ranks[s as usize] > ranks[t as usize])
            .count();
        if backward > forward {
            let top = levels.len().saturating_sub(1);
            for (node, rank) in ranks.iter_mut().enumerate() {
                if coords[node].is_some() {
                    *rank = top - *rank;
                }
            }
        }

        // Unlinked nodes join rank 0 after everything else.
        let placements = coords
            .iter()
            .zip(ranks)
            .enumerate()
            .map(|(node, (coord, rank))| Placement {
                rank,
                order: coord.map_or(base + node as f64, |(x, _)| x),
            })
            .collect();

        Ok(placements)
    }
}

impl RankEngine for Engine {
    fn place(&self, model: &DiagramModel) -> Result<Vec<Placement>, PyvizError> {
        match self.sugiyama(model) {
            Ok(placements) => Ok(placements),
            Err(err) => {
                warn!(err:%; "Falling back to layered layout");
                self.fallback.place(model)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pyviz_core::diagram::{DiagramLink, NodeBuilder, NodeIdAllocator, NodeKind};

    use super::*;

    fn chain(length: usize) -> DiagramModel {
        let mut ids = NodeIdAllocator::new();
        let mut builders: Vec<_> = (0..length)
            .map(|i| NodeBuilder::new(ids.allocate(), NodeKind::Object, format!("o{i}")))
            .collect();
        let ports: Vec<_> = builders
            .iter_mut()
            .take(length.saturating_sub(1))
            .map(|builder| builder.add_port("next", "next"))
            .collect();
        let nodes: Vec<_> = builders.into_iter().map(NodeBuilder::build).collect();
        let links = ports
            .into_iter()
            .zip(nodes.iter().skip(1))
            .map(|(port, node)| DiagramLink::new(port, node.in_port()))
            .collect();
        DiagramModel::from_parts(nodes, links).unwrap()
    }

    #[test]
    fn test_chain_ranks_increase_along_links() {
        let model = chain(4);
        let placements = Engine::new().place(&model).unwrap();

        assert_eq!(placements.len(), 4);
        for pair in placements.windows(2) {
            assert!(pair[0].rank < pair[1].rank);
        }
    }

    #[test]
    fn test_unlinked_diagram_uses_fallback() {
        let model = chain(1);
        let placements = Engine::new().place(&model).unwrap();

        assert_eq!(placements, [Placement { rank: 0, order: 0.0 }]);
    }
}

//! Longest-path layering.
//!
//! Back edges found by a depth-first search from the roots are set aside,
//! which leaves a DAG; every node is then ranked one past its deepest
//! predecessor. Within a rank, nodes follow their first parent's order and
//! the port they hang off, so a tree comes out with children in field order.

use std::collections::HashSet;

use log::debug;
use petgraph::{
    algo::toposort,
    graph::{DiGraph, NodeIndex},
    visit::{DfsEvent, EdgeRef, depth_first_search},
};

use super::{Placement, RankEngine};
use crate::{error::PyvizError, structure::DiagramModel};

/// Deterministic layering engine built on `petgraph`.
#[derive(Debug, Default)]
pub struct Engine;

impl Engine {
    pub fn new() -> Self {
        Self
    }
}

impl RankEngine for Engine {
    fn place(&self, model: &DiagramModel) -> Result<Vec<Placement>, PyvizError> {
        let count = model.nodes().len();

        // Edge weight is the source port index.
        let mut graph: DiGraph<(), usize> = DiGraph::with_capacity(count, model.links().len());
        for _ in 0..count {
            graph.add_node(());
        }
        for link in model.links() {
            let (Some(source), Some(target)) = (
                model.position(link.source_node()),
                model.position(link.target_node()),
            ) else {
                return Err(PyvizError::Layout(format!(
                    "link {} -> {} leaves the diagram",
                    link.source_node(),
                    link.target_node()
                )));
            };
            graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), link.source().index());
        }

        let roots = model
            .roots()
            .filter_map(|node| model.position(node.id()))
            .map(NodeIndex::new);
        let starts: Vec<_> = roots.chain(graph.node_indices()).collect();

        let mut back_edges = HashSet::new();
        depth_first_search(&graph, starts, |event| {
            if let DfsEvent::BackEdge(u, v) = event {
                back_edges.insert((u, v));
            }
        });

        let mut dag: DiGraph<(), usize> = DiGraph::with_capacity(count, graph.edge_count());
        for _ in 0..count {
            dag.add_node(());
        }
        for edge in graph.edge_references() {
            let (u, v) = (edge.source(), edge.target());
            if u != v && !back_edges.contains(&(u, v)) {
                dag.add_edge(u, v, *edge.weight());
            }
        }
        debug!(back_edges = back_edges.len(); "Removed cycles for layering");

        let order = toposort(&dag, None).map_err(|cycle| {
            PyvizError::Layout(format!(
                "cycle through node {} survived back-edge removal",
                cycle.node_id().index()
            ))
        })?;

        let mut ranks = vec![0usize; count];
        for &node in &order {
            for edge in dag.edges(node) {
                let target = edge.target().index();
                ranks[target] = ranks[target].max(ranks[node.index()] + 1);
            }
        }

        // Order key: (first parent's key, port index) flattened into an f64
        // after sorting each rank.
        let max_rank = ranks.iter().copied().max().unwrap_or(0);
        let mut keys = vec![0.0f64; count];
        let mut by_rank: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
        for (node, &rank) in ranks.iter().enumerate() {
            by_rank[rank].push(node);
        }

        for (rank, members) in by_rank.iter_mut().enumerate() {
            if rank > 0 {
                let parent_key = |node: usize| {
                    dag.edges_directed(NodeIndex::new(node), petgraph::Direction::Incoming)
                        .filter(|edge| ranks[edge.source().index()] + 1 == rank)
                        .map(|edge| (keys[edge.source().index()], *edge.weight()))
                        .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                        .unwrap_or((f64::MAX, usize::MAX))
                };
                let mut keyed: Vec<_> = members.iter().map(|&node| (parent_key(node), node)).collect();
                keyed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                *members = keyed.into_iter().map(|(_, node)| node).collect();
            }
            for (slot, &node) in members.iter().enumerate() {
                keys[node] = slot as f64;
            }
        }

        Ok(ranks
            .into_iter()
            .zip(keys)
            .map(|(rank, order)| Placement { rank, order })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use pyviz_syntax::{
        SyntaxNode,
        syntax::{BinaryOperator, Number},
    };

    use super::*;
    use crate::flatten::flatten_ast;

    fn model_for(tree: &SyntaxNode) -> DiagramModel {
        DiagramModel::from_flattened(flatten_ast(tree))
    }

    #[test]
    fn test_tree_ranks_follow_depth() {
        let tree = SyntaxNode::Assign {
            value: Box::new(SyntaxNode::BinOp {
                left: Box::new(SyntaxNode::Num { n: Number::Int(42) }),
                op: BinaryOperator::Add,
                right: Box::new(SyntaxNode::Num { n: Number::Int(1) }),
            }),
            targets: vec![SyntaxNode::Name { id: "a".into() }],
        };
        let model = model_for(&tree);

        let placements = Engine::new().place(&model).unwrap();
        let ranks: Vec<_> = placements.iter().map(|p| p.rank).collect();
        // Assign, BinOp, 42, Add, 1, a
        assert_eq!(ranks, [0, 1, 2, 2, 2, 1]);
    }

    #[test]
    fn test_children_keep_port_order() {
        let tree = SyntaxNode::BinOp {
            left: Box::new(SyntaxNode::Name { id: "x".into() }),
            op: BinaryOperator::Sub,
            right: Box::new(SyntaxNode::Name { id: "y".into() }),
        };
        let model = model_for(&tree);

        let placements = Engine::new().place(&model).unwrap();
        let orders: Vec<_> = placements.iter().map(|p| p.order).collect();
        assert!(orders[1] < orders[2]);
        assert!(orders[2] < orders[3]);
    }

    #[test]
    fn test_cycle_is_ranked() {
        use indexmap::IndexMap;
        use pyviz_core::identifier::Id;
        use pyviz_syntax::{ObjectGraph, ObjectRecord, Value};

        let mut records = IndexMap::new();
        for (name, next) in [("a", "b"), ("b", "c"), ("c", "a")] {
            records.insert(
                Id::new(name),
                ObjectRecord::new(name).with_property("next", Value::reference(next)),
            );
        }
        let graph = ObjectGraph::new(records).unwrap();
        let (nodes, links) = crate::flatten::flatten_objects(&graph);
        let model = DiagramModel::from_parts(nodes, links).unwrap();

        let placements = Engine::new().place(&model).unwrap();
        let ranks: Vec<_> = placements.iter().map(|p| p.rank).collect();
        assert_eq!(ranks, [0, 1, 2]);
    }
}

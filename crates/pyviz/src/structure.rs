//! Diagram assembly.
//!
//! [`DiagramModel`] collects the nodes and links produced by a flattener and
//! indexes them for the layout engine and the exporter: lookups by id,
//! outgoing links per node, incoming link counts and roots.
//!
//! Node order is insertion order and is kept stable; layout and rendering
//! iterate in this order so identical input yields identical output.

use std::collections::HashMap;

use pyviz_core::diagram::{DiagramLink, DiagramNode, NodeId};

use crate::{error::PyvizError, flatten::Flattened};

/// A populated node/link diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramModel {
    nodes: Vec<DiagramNode>,
    links: Vec<DiagramLink>,
    positions: HashMap<NodeId, usize>,
    outgoing: HashMap<NodeId, Vec<usize>>,
    incoming: HashMap<NodeId, usize>,
}

impl DiagramModel {
    /// Assembles the output of the parse-tree flattener.
    pub fn from_flattened(flattened: Flattened) -> Self {
        let (nodes, links) = flattened.into_parts();
        Self::index(nodes, links)
    }

    /// Assembles the output of the object-graph flattener, whose links only
    /// ever join records of one validated graph.
    pub(crate) fn from_object_parts(nodes: Vec<DiagramNode>, links: Vec<DiagramLink>) -> Self {
        Self::index(nodes, links)
    }

    /// Assembles arbitrary nodes and links.
    ///
    /// # Errors
    ///
    /// Returns `PyvizError::Graph` if two nodes share an id, or if a link
    /// starts at a port that does not exist or ends at an unknown node.
    pub fn from_parts(nodes: Vec<DiagramNode>, links: Vec<DiagramLink>) -> Result<Self, PyvizError> {
        let model = Self::index(nodes, links);

        if model.positions.len() != model.nodes.len() {
            return Err(PyvizError::Graph("duplicate node id in diagram".to_string()));
        }
        for link in &model.links {
            let source = model.node(link.source_node()).ok_or_else(|| {
                PyvizError::Graph(format!("link source {} is not in the diagram", link.source_node()))
            })?;
            if source.port(link.source()).is_none() {
                return Err(PyvizError::Graph(format!(
                    "node {} has no port {}",
                    source.id(),
                    link.source().index()
                )));
            }
            if model.node(link.target_node()).is_none() {
                return Err(PyvizError::Graph(format!(
                    "link target {} is not in the diagram",
                    link.target_node()
                )));
            }
        }
        Ok(model)
    }

    fn index(nodes: Vec<DiagramNode>, links: Vec<DiagramLink>) -> Self {
        let positions = nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.id(), position))
            .collect();

        let mut outgoing: HashMap<NodeId, Vec<usize>> = HashMap::new();
        let mut incoming: HashMap<NodeId, usize> = HashMap::new();
        for (index, link) in links.iter().enumerate() {
            outgoing.entry(link.source_node()).or_default().push(index);
            *incoming.entry(link.target_node()).or_default() += 1;
        }

        Self {
            nodes,
            links,
            positions,
            outgoing,
            incoming,
        }
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[DiagramNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[DiagramLink] {
        &self.links
    }

    pub fn node(&self, id: NodeId) -> Option<&DiagramNode> {
        self.positions.get(&id).map(|&position| &self.nodes[position])
    }

    /// Position of a node in [`nodes`](Self::nodes).
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Nodes without incoming links, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &DiagramNode> {
        self.nodes
            .iter()
            .filter(|node| !self.incoming.contains_key(&node.id()))
    }

    /// Links leaving `id`, in port order.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &DiagramLink> {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&index| &self.links[index])
    }

    pub fn incoming_count(&self, id: NodeId) -> usize {
        self.incoming.get(&id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pyviz_core::diagram::{NodeBuilder, NodeIdAllocator, NodeKind};

    use super::*;

    /// `a -> b`, `a -> c`, `c -> a`.
    fn small_graph() -> (Vec<DiagramNode>, Vec<DiagramLink>) {
        let mut ids = NodeIdAllocator::new();
        let mut a = NodeBuilder::new(ids.allocate(), NodeKind::Object, "a");
        let a_b = a.add_port("b", "b");
        let a_c = a.add_port("c", "c");
        let b = NodeBuilder::new(ids.allocate(), NodeKind::Object, "b").build();
        let mut c = NodeBuilder::new(ids.allocate(), NodeKind::Object, "c");
        let c_a = c.add_port("a", "a");
        let a = a.build();
        let c = c.build();

        let links = vec![
            DiagramLink::new(a_b, b.in_port()),
            DiagramLink::new(a_c, c.in_port()),
            DiagramLink::new(c_a, a.in_port()),
        ];
        (vec![a, b, c], links)
    }

    #[test]
    fn test_indexes_links() {
        let (nodes, links) = small_graph();
        let ids: Vec<_> = nodes.iter().map(DiagramNode::id).collect();
        let model = DiagramModel::from_parts(nodes, links).expect("graph should be valid");

        assert_eq!(model.outgoing(ids[0]).count(), 2);
        assert_eq!(model.outgoing(ids[1]).count(), 0);
        assert_eq!(model.incoming_count(ids[0]), 1);
        assert_eq!(model.incoming_count(ids[1]), 1);
        assert_eq!(model.position(ids[2]), Some(2));
        assert_eq!(model.roots().count(), 0);
    }

    #[test]
    fn test_roots_of_a_tree() {
        let (mut nodes, mut links) = small_graph();
        links.pop();
        nodes[2] = NodeBuilder::new(nodes[2].id(), NodeKind::Object, "c").build();
        let model = DiagramModel::from_parts(nodes, links).expect("graph should be valid");

        let roots: Vec<_> = model.roots().map(DiagramNode::label).collect();
        assert_eq!(roots, ["a"]);
    }

    #[test]
    fn test_rejects_unknown_port() {
        let (mut nodes, links) = small_graph();
        // `c` rebuilt without its port; the `c -> a` link now dangles.
        nodes[2] = NodeBuilder::new(nodes[2].id(), NodeKind::Object, "c").build();

        let err = DiagramModel::from_parts(nodes, links).unwrap_err();
        assert!(matches!(err, PyvizError::Graph(_)));
    }

    #[test]
    fn test_rejects_unknown_target() {
        let (mut nodes, links) = small_graph();
        nodes.remove(1);

        let err = DiagramModel::from_parts(nodes, links).unwrap_err();
        assert!(matches!(err, PyvizError::Graph(msg) if msg.contains("n1")));
    }
}

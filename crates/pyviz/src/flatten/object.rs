//! Live-object flattening.
//!
//! Runs in two passes. The node pass creates one node per record in input
//! order, turns inline values into display entries and creates a port for
//! every reference, remembering the `(port, target)` pair. The link pass then
//! resolves each target by name. Nothing recurses, so self references and
//! cycles flatten like any other graph.

use std::collections::HashMap;

use log::debug;

use pyviz_core::{
    diagram::{DiagramLink, DiagramNode, NodeBuilder, NodeIdAllocator, NodeKind, PortId},
    identifier::Id,
};
use pyviz_syntax::{ObjectGraph, Value};

/// Flattens every record of `graph` into nodes and links.
///
/// Every reference is expected to name a record of `graph`, which
/// [`ObjectGraph`] construction guarantees.
pub fn flatten_objects(graph: &ObjectGraph) -> (Vec<DiagramNode>, Vec<DiagramLink>) {
    let mut ids = NodeIdAllocator::new();
    let mut nodes = Vec::with_capacity(graph.len());
    let mut positions: HashMap<Id, usize> = HashMap::with_capacity(graph.len());
    let mut deferred: Vec<(PortId, Id)> = Vec::new();

    for (id, record) in graph.iter() {
        let mut builder = NodeBuilder::new(ids.allocate(), NodeKind::Object, record.name());

        let properties = record
            .properties()
            .iter()
            .map(|(key, value)| (key.clone(), value));
        let items = record
            .items()
            .iter()
            .enumerate()
            .map(|(index, value)| (format!("[{index}]"), value));

        for (key, value) in properties.chain(items) {
            match value {
                Value::Inline(primitive) => builder.add_entry(key, primitive.to_string()),
                Value::Reference(target) => {
                    let port = builder.add_port(&key, key.as_str());
                    deferred.push((port, *target));
                }
            }
        }

        positions.insert(id, nodes.len());
        nodes.push(builder.build());
    }

    // `ObjectGraph` rejects dangling references, so every target has a node.
    let links: Vec<_> = deferred
        .into_iter()
        .map(|(port, target)| DiagramLink::new(port, nodes[positions[&target]].in_port()))
        .collect();

    debug!(nodes = nodes.len(), links = links.len(); "Flattened object graph");
    (nodes, links)
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use proptest::prelude::*;

    use pyviz_syntax::{ObjectRecord, Primitive};

    use super::*;

    fn graph(records: Vec<(&str, ObjectRecord)>) -> ObjectGraph {
        let records: IndexMap<_, _> = records
            .into_iter()
            .map(|(key, record)| (Id::new(key), record))
            .collect();
        ObjectGraph::new(records).expect("test graph should be valid")
    }

    fn label_of(nodes: &[DiagramNode], id: pyviz_core::diagram::NodeId) -> &str {
        nodes
            .iter()
            .find(|node| node.id() == id)
            .map(DiagramNode::label)
            .expect("node should exist")
    }

    #[test]
    fn test_cycle_terminates() {
        let graph = graph(vec![
            ("a", ObjectRecord::new("a").with_property("next", Value::reference("b"))),
            ("b", ObjectRecord::new("b").with_property("next", Value::reference("c"))),
            ("c", ObjectRecord::new("c").with_property("next", Value::reference("a"))),
        ]);

        let (nodes, links) = flatten_objects(&graph);

        assert_eq!(nodes.len(), 3);
        assert_eq!(links.len(), 3);
        let edges: Vec<_> = links
            .iter()
            .map(|link| {
                (
                    label_of(&nodes, link.source_node()),
                    label_of(&nodes, link.target_node()),
                )
            })
            .collect();
        assert_eq!(edges, [("a", "b"), ("b", "c"), ("c", "a")]);
    }

    #[test]
    fn test_self_reference() {
        let graph = graph(vec![(
            "me",
            ObjectRecord::new("node").with_property("self", Value::reference("me")),
        )]);

        let (nodes, links) = flatten_objects(&graph);

        assert_eq!(nodes.len(), 1);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].source_node(), links[0].target_node());
    }

    #[test]
    fn test_every_reference_is_linked() {
        let graph = graph(vec![
            (
                "root",
                ObjectRecord::new("root")
                    .with_property("left", Value::reference("leaf"))
                    .with_property("right", Value::reference("leaf"))
                    .with_item(Value::reference("leaf")),
            ),
            ("leaf", ObjectRecord::new("leaf")),
        ]);

        let (nodes, links) = flatten_objects(&graph);

        assert_eq!(links.len(), 3);
        assert!(links.iter().all(|link| label_of(&nodes, link.target_node()) == "leaf"));
    }

    #[test]
    fn test_lunch_with_arrays() {
        let graph = graph(vec![
            (
                "lunch",
                ObjectRecord::new("lunch")
                    .with_item(Value::reference("fruits"))
                    .with_item(Value::reference("drinks")),
            ),
            (
                "fruits",
                ObjectRecord::new("list")
                    .with_item("apple")
                    .with_item("banana")
                    .with_item("cherry"),
            ),
            (
                "drinks",
                ObjectRecord::new("list").with_item("water").with_item("tea"),
            ),
        ]);

        let (nodes, links) = flatten_objects(&graph);

        assert_eq!(nodes.len(), 3);
        assert_eq!(links.len(), 2);
        let entries: usize = nodes.iter().map(|node| node.entries().len()).sum();
        assert_eq!(entries, 5);

        let lunch = &nodes[0];
        let ports: Vec<_> = lunch.ports().map(|port| port.label()).collect();
        assert_eq!(ports, ["[0]", "[1]"]);
        assert!(lunch.entries().is_empty());

        let fruits = &nodes[1];
        assert_eq!(fruits.port_count(), 0);
        assert_eq!(fruits.entries()[0].key(), "[0]");
        assert_eq!(fruits.entries()[0].value(), "'apple'");
    }

    #[test]
    fn test_inline_properties_become_entries() {
        let graph = graph(vec![(
            "point",
            ObjectRecord::new("Point")
                .with_property("x", 3i64)
                .with_property("y", 4.5)
                .with_property("label", Value::Inline(Primitive::None)),
        )]);

        let (nodes, links) = flatten_objects(&graph);

        assert!(links.is_empty());
        let entries: Vec<_> = nodes[0]
            .entries()
            .iter()
            .map(|entry| (entry.key(), entry.value()))
            .collect();
        assert_eq!(entries, [("x", "3"), ("y", "4.5"), ("label", "None")]);
    }

    proptest! {
        /// Records `r0..rn`, each referencing the given targets by index.
        #[test]
        fn prop_one_link_per_reference(
            targets in prop::collection::vec(prop::collection::vec(0usize..8, 0..4), 1..8)
        ) {
            let count = targets.len();
            let records: Vec<_> = targets
                .iter()
                .enumerate()
                .map(|(i, refs)| {
                    let record = refs.iter().fold(ObjectRecord::new(format!("r{i}")), |record, t| {
                        record.with_item(Value::reference(&format!("r{}", t % count)))
                    });
                    (format!("r{i}"), record)
                })
                .collect();
            let graph = graph(records.iter().map(|(k, r)| (k.as_str(), r.clone())).collect());

            let (nodes, links) = flatten_objects(&graph);

            let references: usize = targets.iter().map(Vec::len).sum();
            prop_assert_eq!(nodes.len(), count);
            prop_assert_eq!(links.len(), references);
            prop_assert_eq!(flatten_objects(&graph), (nodes, links));
        }
    }
}

//! The node/port/link diagram model.
//!
//! Flatteners turn syntax trees and object snapshots into this model:
//!
//! - [`DiagramNode`] - a visual unit with a label, an optional inline value,
//!   one implicit unlabeled in-port and zero or more labeled outbound ports
//! - [`Port`] / [`PortGroup`] - outbound connection points, grouped by the
//!   field they were created for
//! - [`DiagramLink`] - a directed edge from one outbound port to a node's in-port
//! - [`NodeBuilder`] - assembles a [`DiagramNode`] and hands back port ids
//!   while doing so
//!
//! Nodes are immutable once built. Identity comes from a [`NodeId`] handed out
//! by a [`NodeIdAllocator`] owned by a single flatten call, so the same input
//! always produces the same ids.

use std::fmt;

/// Height of a node with no ports and no inline entries.
pub const BASE_NODE_HEIGHT: f32 = 40.0;

/// Extra height added for every port row and every inline entry row.
pub const ROW_HEIGHT: f32 = 20.0;

/// Identifier of a node within one diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the numeric index of this id.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Sequential source of [`NodeId`]s.
#[derive(Debug, Default)]
pub struct NodeIdAllocator {
    next: usize,
}

impl NodeIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh id.
    pub fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> usize {
        self.next
    }
}

/// Which diagram family a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A node of a parse-tree diagram.
    Ast,
    /// A node of a live-object diagram.
    Object,
}

/// Address of an outbound port: owning node plus position in its port list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortId {
    node: NodeId,
    index: usize,
}

impl PortId {
    pub fn node(self) -> NodeId {
        self.node
    }

    /// Position of the port among all outbound ports of its node.
    pub fn index(self) -> usize {
        self.index
    }
}

/// The single unlabeled inbound connection point of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InPort(NodeId);

impl InPort {
    pub fn node(self) -> NodeId {
        self.0
    }
}

/// A labeled outbound connection point.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    id: PortId,
    label: String,
}

impl Port {
    pub fn id(&self) -> PortId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Ports created for one field of the source value, in creation order.
///
/// A group may be present and empty (a list field with no elements) or absent
/// altogether; the two are distinguishable on purpose.
#[derive(Debug, Clone, PartialEq)]
pub struct PortGroup {
    name: String,
    ports: Vec<Port>,
}

impl PortGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

/// Inline display content: a key and its rendered value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEntry {
    key: String,
    value: String,
}

impl DisplayEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A finished diagram node.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramNode {
    id: NodeId,
    kind: NodeKind,
    label: String,
    value: Option<String>,
    port_groups: Vec<PortGroup>,
    entries: Vec<DisplayEntry>,
    height: f32,
}

impl DiagramNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Inline value shown next to the label (literal, identifier, ...).
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn in_port(&self) -> InPort {
        InPort(self.id)
    }

    pub fn port_groups(&self) -> &[PortGroup] {
        &self.port_groups
    }

    /// Looks up a port group by field name.
    pub fn port_group(&self, name: &str) -> Option<&PortGroup> {
        self.port_groups.iter().find(|group| group.name == name)
    }

    /// All outbound ports, in creation order.
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.port_groups.iter().flat_map(|group| group.ports.iter())
    }

    pub fn port_count(&self) -> usize {
        self.port_groups.iter().map(|group| group.ports.len()).sum()
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        if id.node != self.id {
            return None;
        }
        self.ports().nth(id.index)
    }

    pub fn entries(&self) -> &[DisplayEntry] {
        &self.entries
    }

    /// Display height, grown by [`ROW_HEIGHT`] per port and per entry.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Row of a port in the node body; entries come first, then ports.
    pub fn port_row(&self, id: PortId) -> usize {
        self.entries.len() + id.index
    }
}

/// Builds a [`DiagramNode`].
///
/// Ports are handed out while building so callers can record links before the
/// node is finished. Consecutive ports added under the same group name land in
/// the same [`PortGroup`].
///
/// # Examples
///
/// ```
/// use pyviz_core::diagram::{NodeBuilder, NodeIdAllocator, NodeKind};
///
/// let mut ids = NodeIdAllocator::new();
/// let mut builder = NodeBuilder::new(ids.allocate(), NodeKind::Ast, "BinOp");
/// let left = builder.add_port("Left", "Left");
/// let node = builder.build();
///
/// assert_eq!(node.port(left).unwrap().label(), "Left");
/// assert_eq!(node.port_count(), 1);
/// ```
#[derive(Debug)]
pub struct NodeBuilder {
    id: NodeId,
    kind: NodeKind,
    label: String,
    value: Option<String>,
    port_groups: Vec<PortGroup>,
    entries: Vec<DisplayEntry>,
    port_count: usize,
}

impl NodeBuilder {
    pub fn new(id: NodeId, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            label: label.into(),
            value: None,
            port_groups: Vec::new(),
            entries: Vec::new(),
            port_count: 0,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Sets the inline value shown next to the label.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Opens a port group with no ports yet.
    ///
    /// Does nothing if the last group already has this name.
    pub fn add_group(&mut self, group: &str) {
        self.group_mut(group);
    }

    /// Adds an outbound port to `group` and returns its id.
    pub fn add_port(&mut self, group: &str, label: impl Into<String>) -> PortId {
        let id = PortId {
            node: self.id,
            index: self.port_count,
        };
        self.port_count += 1;

        self.group_mut(group).ports.push(Port {
            id,
            label: label.into(),
        });
        id
    }

    fn group_mut(&mut self, group: &str) -> &mut PortGroup {
        let reuse = self.port_groups.last().is_some_and(|last| last.name == group);
        if !reuse {
            self.port_groups.push(PortGroup {
                name: group.to_string(),
                ports: Vec::new(),
            });
        }
        let last = self.port_groups.len() - 1;
        &mut self.port_groups[last]
    }

    /// Adds an inline key/value entry.
    pub fn add_entry(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(DisplayEntry::new(key, value));
    }

    /// Finishes the node and computes its display height.
    pub fn build(self) -> DiagramNode {
        let rows = self.port_count + self.entries.len();
        DiagramNode {
            id: self.id,
            kind: self.kind,
            label: self.label,
            value: self.value,
            port_groups: self.port_groups,
            entries: self.entries,
            height: BASE_NODE_HEIGHT + ROW_HEIGHT * rows as f32,
        }
    }
}

/// A directed edge from an outbound port to a node's in-port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramLink {
    source: PortId,
    target: InPort,
}

impl DiagramLink {
    pub fn new(source: PortId, target: InPort) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> PortId {
        self.source
    }

    pub fn target(&self) -> InPort {
        self.target
    }

    pub fn source_node(&self) -> NodeId {
        self.source.node
    }

    pub fn target_node(&self) -> NodeId {
        self.target.0
    }
}

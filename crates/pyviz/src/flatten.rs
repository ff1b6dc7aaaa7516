//! Conversion of input values into flat node and link collections.
//!
//! - [`ast`] - walks a [`SyntaxNode`](pyviz_syntax::SyntaxNode) tree depth-first
//! - [`object`] - indexes an [`ObjectGraph`](pyviz_syntax::ObjectGraph) in two
//!   passes, so reference cycles need no recursion
//!
//! Both flatteners are infallible and deterministic: identical input yields
//! identical node ids, labels, ports and links.

pub mod ast;
pub mod object;

use pyviz_core::diagram::{DiagramLink, DiagramNode};

pub use ast::flatten_ast;
pub use object::flatten_objects;

/// The result of flattening one syntax subtree.
///
/// `root` corresponds to the input node; `descendants` holds every other node
/// of the subtree in depth-first order; `links` connects them.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    pub root: DiagramNode,
    pub descendants: Vec<DiagramNode>,
    pub links: Vec<DiagramLink>,
}

impl Flattened {
    /// Total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        1 + self.descendants.len()
    }

    /// All nodes with the root first, and all links.
    pub fn into_parts(self) -> (Vec<DiagramNode>, Vec<DiagramLink>) {
        let mut nodes = Vec::with_capacity(self.node_count());
        nodes.push(self.root);
        nodes.extend(self.descendants);
        (nodes, self.links)
    }
}

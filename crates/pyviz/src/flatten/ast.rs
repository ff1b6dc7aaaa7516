//! Parse-tree flattening.
//!
//! Every syntax node becomes one diagram node labeled with its kind. Each
//! child field becomes a port group on the parent, in declared field order:
//!
//! - a single child gets one port named after the field (`"Left"`)
//! - a list gets one port per element (`"Body 0"`, `"Body 1"`, ...) and an
//!   empty group when the list is empty
//! - an `orelse` list is left out entirely when empty
//! - an absent optional child gets no group
//! - an absent dict key (`{**mapping}`) keeps its port but has no child
//!
//! Scalars (numbers, strings, identifiers) are shown as the node's inline
//! value instead of as children.

use log::debug;

use pyviz_core::diagram::{DiagramLink, NodeBuilder, NodeIdAllocator, NodeKind};
use pyviz_syntax::{
    Operator, SyntaxNode,
    syntax::{Comprehension, ForLoop, FunctionDef},
};

use super::Flattened;

/// Flattens the subtree rooted at `node`.
///
/// A subtree of N syntax nodes (operator fields included) yields N diagram
/// nodes and N - 1 links. Node ids are allocated in pre-order.
pub fn flatten_ast(node: &SyntaxNode) -> Flattened {
    let mut ids = NodeIdAllocator::new();
    let flattened = flatten_child(Child::Node(node), &mut ids);
    debug!(
        root = node.kind_name(),
        nodes = flattened.node_count(),
        links = flattened.links.len();
        "Flattened syntax tree"
    );
    flattened
}

/// A child slot: either a syntax node or an operator stored inline in its parent.
#[derive(Clone, Copy)]
enum Child<'a> {
    Node(&'a SyntaxNode),
    Operator(Operator),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Arity {
    /// One child, port labeled with the field label alone.
    Single,
    /// Any number of children, ports labeled `"<label> <index>"`.
    List,
    /// Like `List`, but no group at all when empty.
    ElseList,
}

struct Field<'a> {
    label: &'static str,
    arity: Arity,
    /// `None` keeps the slot's port but draws no child.
    children: Vec<Option<Child<'a>>>,
}

/// Label, inline value and child fields of one node.
struct Shape<'a> {
    label: &'static str,
    value: Option<String>,
    fields: Vec<Field<'a>>,
}

impl<'a> Shape<'a> {
    fn leaf(label: &'static str) -> Self {
        Self {
            label,
            value: None,
            fields: Vec::new(),
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    fn one(mut self, label: &'static str, child: &'a SyntaxNode) -> Self {
        self.fields.push(Field {
            label,
            arity: Arity::Single,
            children: vec![Some(Child::Node(child))],
        });
        self
    }

    fn operator(mut self, op: impl Into<Operator>) -> Self {
        self.fields.push(Field {
            label: "Operator",
            arity: Arity::Single,
            children: vec![Some(Child::Operator(op.into()))],
        });
        self
    }

    fn maybe(self, label: &'static str, child: Option<&'a SyntaxNode>) -> Self {
        match child {
            Some(child) => self.one(label, child),
            None => self,
        }
    }

    fn many(self, label: &'static str, children: &'a [SyntaxNode]) -> Self {
        let children = children.iter().map(|c| Some(Child::Node(c))).collect();
        self.push_list(label, Arity::List, children)
    }

    /// Like `many`, for lists with gaps such as the keys of `{**mapping}`.
    fn sparse(self, label: &'static str, children: &'a [Option<SyntaxNode>]) -> Self {
        let children = children.iter().map(|c| c.as_ref().map(Child::Node)).collect();
        self.push_list(label, Arity::List, children)
    }

    fn or_else(self, children: &'a [SyntaxNode]) -> Self {
        self.push_list(
            "OrElse",
            Arity::ElseList,
            children.iter().map(|c| Some(Child::Node(c))).collect(),
        )
    }

    fn operators<T: Into<Operator> + Copy>(self, ops: &[T]) -> Self {
        let children = ops.iter().map(|op| Some(Child::Operator((*op).into()))).collect();
        self.push_list("Operator", Arity::List, children)
    }

    fn push_list(
        mut self,
        label: &'static str,
        arity: Arity,
        children: Vec<Option<Child<'a>>>,
    ) -> Self {
        self.fields.push(Field {
            label,
            arity,
            children,
        });
        self
    }

    fn function_def(self, def: &'a FunctionDef) -> Self {
        self.with_value(def.name.clone())
            .many("Arg", &def.args)
            .many("Body", &def.body)
            .many("Decorator", &def.decorator_list)
            .maybe("Returns", def.returns.as_deref())
    }

    fn for_loop(self, def: &'a ForLoop) -> Self {
        self.one("Target", &def.target)
            .one("Iter", &def.iter)
            .many("Body", &def.body)
            .or_else(&def.orelse)
    }

    fn comprehension(self, comp: &'a Comprehension) -> Self {
        self.one("Elt", &comp.elt).many("Generator", &comp.generators)
    }
}

/// Describes a node's label, value and fields.
///
/// The match is exhaustive so a new kind cannot be added without deciding
/// how it is drawn.
fn describe(node: &SyntaxNode) -> Shape<'_> {
    let shape = Shape::leaf(node.label());
    match node {
        SyntaxNode::Module { body }
        | SyntaxNode::Interactive { body }
        | SyntaxNode::Expression { body }
        | SyntaxNode::Suite { body } => shape.many("Body", body),
        SyntaxNode::FunctionDef(def) | SyntaxNode::AsyncFunctionDef(def) => {
            shape.function_def(def)
        }
        SyntaxNode::Return { value } | SyntaxNode::Yield { value } => {
            shape.maybe("Value", value.as_deref())
        }
        SyntaxNode::Delete { targets } => shape.many("Target", targets),
        SyntaxNode::Assign { value, targets } => {
            let shape = shape.one("Value", value);
            match targets.as_slice() {
                [target] => shape.one("Target", target),
                targets => shape.many("Target", targets),
            }
        }
        SyntaxNode::AugAssign { target, op, value } => {
            shape.one("Target", target).operator(*op).one("Value", value)
        }
        SyntaxNode::AnnAssign {
            target,
            annotation,
            value,
        } => shape
            .one("Target", target)
            .one("Annotation", annotation)
            .maybe("Value", value.as_deref()),
        SyntaxNode::For(def) | SyntaxNode::AsyncFor(def) => shape.for_loop(def),
        SyntaxNode::While { test, body, orelse } | SyntaxNode::If { test, body, orelse } => {
            shape.one("Test", test).many("Body", body).or_else(orelse)
        }
        SyntaxNode::With { items, body } | SyntaxNode::AsyncWith { items, body } => {
            shape.many("Item", items).many("Body", body)
        }
        SyntaxNode::Global { names } | SyntaxNode::NonLocal { names } => {
            shape.with_value(names.join(", "))
        }
        SyntaxNode::Expr { value }
        | SyntaxNode::Await { value }
        | SyntaxNode::YieldFrom { value }
        | SyntaxNode::Starred { value }
        | SyntaxNode::Index { value } => shape.one("Value", value),
        SyntaxNode::Print { dest, values } => {
            shape.maybe("Dest", dest.as_deref()).many("Value", values)
        }
        SyntaxNode::BoolOp { op, values } => shape.operator(*op).many("Value", values),
        SyntaxNode::BinOp { left, op, right } => {
            shape.one("Left", left).operator(*op).one("Right", right)
        }
        SyntaxNode::UnaryOp { op, operand } => shape.operator(*op).one("Operand", operand),
        SyntaxNode::Lambda { args, body } => shape.many("Arg", args).one("Body", body),
        SyntaxNode::IfExp { test, body, orelse } => {
            shape.one("Test", test).one("Body", body).one("OrElse", orelse)
        }
        SyntaxNode::Dict { keys, values } => shape.sparse("Key", keys).many("Value", values),
        SyntaxNode::Set { elts } => shape.many("Elt", elts),
        SyntaxNode::ListComp(comp)
        | SyntaxNode::SetComp(comp)
        | SyntaxNode::GeneratorExp(comp) => shape.comprehension(comp),
        SyntaxNode::DictComp {
            key,
            value,
            generators,
        } => shape
            .one("Key", key)
            .one("Value", value)
            .many("Generator", generators),
        SyntaxNode::Compare {
            left,
            ops,
            comparators,
        } => shape
            .one("Left", left)
            .operators(ops)
            .many("Comparator", comparators),
        SyntaxNode::Call { func, args } => shape.one("Func", func).many("Arg", args),
        SyntaxNode::Num { n } => shape.with_value(n.to_string()),
        SyntaxNode::Str { s } => shape.with_value(format!("'{s}'")),
        SyntaxNode::Name { id } => shape.with_value(id.clone()),
        SyntaxNode::FormattedValue { value, format_spec } => shape
            .one("Value", value)
            .maybe("FormatSpec", format_spec.as_deref()),
        SyntaxNode::JoinedStr { values } => shape.many("Value", values),
        SyntaxNode::Attribute { value, attr } => shape.with_value(attr.clone()).one("Value", value),
        SyntaxNode::Subscript { value, slice } => shape.one("Value", value).one("Slice", slice),
        SyntaxNode::Slice { lower, upper, step } => shape
            .maybe("Lower", lower.as_deref())
            .maybe("Upper", upper.as_deref())
            .maybe("Step", step.as_deref()),
        SyntaxNode::ExtSlice { dims } => shape.many("Dim", dims),
        SyntaxNode::Operator(_)
        | SyntaxNode::Pass
        | SyntaxNode::Break
        | SyntaxNode::Continue
        | SyntaxNode::Unhandled(_) => shape,
    }
}

fn flatten_child(child: Child<'_>, ids: &mut NodeIdAllocator) -> Flattened {
    let shape = match child {
        Child::Node(node) => describe(node),
        Child::Operator(op) => Shape::leaf(op.kind_name()),
    };

    let mut builder = NodeBuilder::new(ids.allocate(), NodeKind::Ast, shape.label);
    if let Some(value) = shape.value {
        builder = builder.with_value(value);
    }

    let mut descendants = Vec::new();
    let mut links = Vec::new();
    for field in shape.fields {
        if field.arity == Arity::ElseList && field.children.is_empty() {
            continue;
        }
        builder.add_group(field.label);

        for (index, grandchild) in field.children.into_iter().enumerate() {
            let port_label = match field.arity {
                Arity::Single => field.label.to_string(),
                Arity::List | Arity::ElseList => format!("{} {index}", field.label),
            };
            let port = builder.add_port(field.label, port_label);
            let Some(grandchild) = grandchild else {
                continue;
            };

            let sub = flatten_child(grandchild, ids);
            let target = sub.root.in_port();
            descendants.push(sub.root);
            descendants.extend(sub.descendants);
            links.extend(sub.links);
            links.push(DiagramLink::new(port, target));
        }
    }

    Flattened {
        root: builder.build(),
        descendants,
        links,
    }
}

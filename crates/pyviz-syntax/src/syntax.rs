//! Python syntax trees.
//!
//! [`SyntaxNode`] is a closed sum type over the node kinds a Python parser
//! emits. Children are owned (`Box` / `Vec`), so a tree is always finite and
//! acyclic. Operator leaves are grouped into four disjoint classes
//! ([`BinaryOperator`], [`BooleanOperator`], [`CompareOperator`],
//! [`UnaryOperator`]) behind [`Operator`].
//!
//! Kinds that carry no fields in the source parser's model (`Raise`, `Try`,
//! `Import`, expression contexts, ...) are collected in [`UnhandledKind`]; they
//! are still valid nodes and still get a name.

use std::fmt;

/// Declares a field-less enum together with its Python kind names.
macro_rules! kind_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The Python AST kind name of this variant.
            pub fn kind_name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            /// Looks a variant up by its Python AST kind name.
            pub fn from_kind_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.kind_name())
            }
        }
    };
}

kind_enum! {
    /// Arithmetic and bitwise operators used by `BinOp` and `AugAssign`.
    BinaryOperator {
        Add, Sub, Mult, MatMult, Div, Mod, Pow, LShift, RShift, BitOr, BitXor, BitAnd, FloorDiv,
    }
}

kind_enum! {
    /// Operators used by `BoolOp`.
    BooleanOperator { And, Or }
}

kind_enum! {
    /// Operators used by `Compare`.
    CompareOperator { Eq, NotEq, Lt, LtE, Gt, GtE, Is, IsNot, In, NotIn }
}

kind_enum! {
    /// Operators used by `UnaryOp`.
    UnaryOperator { Invert, Not, UAdd, USub }
}

kind_enum! {
    /// Node kinds rendered by name only.
    UnhandledKind {
        Raise, Try, Assert, Import, ImportFrom, ClassDef, Bytes, NameConstant, Ellipsis,
        Constant, List, Tuple, Load, Store, Del, AugLoad, AugStore, Param,
    }
}

/// The class an operator leaf belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorClass {
    Binary,
    Boolean,
    Compare,
    Unary,
}

impl OperatorClass {
    /// The operator class of `node`, or `None` if it is not an operator leaf.
    pub fn of(node: &SyntaxNode) -> Option<Self> {
        match node {
            SyntaxNode::Operator(op) => Some(op.class()),
            _ => None,
        }
    }
}

/// An operator leaf of any class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Binary(BinaryOperator),
    Boolean(BooleanOperator),
    Compare(CompareOperator),
    Unary(UnaryOperator),
}

impl Operator {
    /// Finds the operator with the given kind name in any of the four classes.
    ///
    /// The classes are disjoint, so at most one can match.
    pub fn from_kind_name(name: &str) -> Option<Self> {
        BinaryOperator::from_kind_name(name)
            .map(Operator::Binary)
            .or_else(|| BooleanOperator::from_kind_name(name).map(Operator::Boolean))
            .or_else(|| CompareOperator::from_kind_name(name).map(Operator::Compare))
            .or_else(|| UnaryOperator::from_kind_name(name).map(Operator::Unary))
    }

    pub fn class(self) -> OperatorClass {
        match self {
            Operator::Binary(_) => OperatorClass::Binary,
            Operator::Boolean(_) => OperatorClass::Boolean,
            Operator::Compare(_) => OperatorClass::Compare,
            Operator::Unary(_) => OperatorClass::Unary,
        }
    }

    pub fn kind_name(self) -> &'static str {
        match self {
            Operator::Binary(op) => op.kind_name(),
            Operator::Boolean(op) => op.kind_name(),
            Operator::Compare(op) => op.kind_name(),
            Operator::Unary(op) => op.kind_name(),
        }
    }
}

impl From<BinaryOperator> for Operator {
    fn from(op: BinaryOperator) -> Self {
        Operator::Binary(op)
    }
}

impl From<BooleanOperator> for Operator {
    fn from(op: BooleanOperator) -> Self {
        Operator::Boolean(op)
    }
}

impl From<CompareOperator> for Operator {
    fn from(op: CompareOperator) -> Self {
        Operator::Compare(op)
    }
}

impl From<UnaryOperator> for Operator {
    fn from(op: UnaryOperator) -> Self {
        Operator::Unary(op)
    }
}

/// A numeric literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{value}"),
            Number::Float(value) if value.fract() == 0.0 && value.is_finite() => {
                write!(f, "{value:.1}")
            }
            Number::Float(value) => write!(f, "{value}"),
        }
    }
}

/// Fields shared by `FunctionDef` and `AsyncFunctionDef`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub args: Vec<SyntaxNode>,
    pub body: Vec<SyntaxNode>,
    pub decorator_list: Vec<SyntaxNode>,
    pub returns: Option<Box<SyntaxNode>>,
}

/// Fields shared by `For` and `AsyncFor`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub target: Box<SyntaxNode>,
    pub iter: Box<SyntaxNode>,
    pub body: Vec<SyntaxNode>,
    pub orelse: Vec<SyntaxNode>,
}

/// Fields shared by the single-generator comprehensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension {
    pub elt: Box<SyntaxNode>,
    pub generators: Vec<SyntaxNode>,
}

/// A node of a Python syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    Module { body: Vec<SyntaxNode> },
    Interactive { body: Vec<SyntaxNode> },
    Expression { body: Vec<SyntaxNode> },
    Suite { body: Vec<SyntaxNode> },
    FunctionDef(FunctionDef),
    AsyncFunctionDef(FunctionDef),
    Return { value: Option<Box<SyntaxNode>> },
    Delete { targets: Vec<SyntaxNode> },
    Assign { value: Box<SyntaxNode>, targets: Vec<SyntaxNode> },
    AugAssign { target: Box<SyntaxNode>, op: BinaryOperator, value: Box<SyntaxNode> },
    AnnAssign {
        target: Box<SyntaxNode>,
        annotation: Box<SyntaxNode>,
        value: Option<Box<SyntaxNode>>,
    },
    For(ForLoop),
    AsyncFor(ForLoop),
    While { test: Box<SyntaxNode>, body: Vec<SyntaxNode>, orelse: Vec<SyntaxNode> },
    If { test: Box<SyntaxNode>, body: Vec<SyntaxNode>, orelse: Vec<SyntaxNode> },
    With { items: Vec<SyntaxNode>, body: Vec<SyntaxNode> },
    AsyncWith { items: Vec<SyntaxNode>, body: Vec<SyntaxNode> },
    Global { names: Vec<String> },
    NonLocal { names: Vec<String> },
    Expr { value: Box<SyntaxNode> },
    Print { dest: Option<Box<SyntaxNode>>, values: Vec<SyntaxNode> },
    BoolOp { op: BooleanOperator, values: Vec<SyntaxNode> },
    BinOp { left: Box<SyntaxNode>, op: BinaryOperator, right: Box<SyntaxNode> },
    UnaryOp { op: UnaryOperator, operand: Box<SyntaxNode> },
    Lambda { args: Vec<SyntaxNode>, body: Box<SyntaxNode> },
    IfExp { test: Box<SyntaxNode>, body: Box<SyntaxNode>, orelse: Box<SyntaxNode> },
    /// `keys` holds `None` where a `**mapping` is unpacked.
    Dict { keys: Vec<Option<SyntaxNode>>, values: Vec<SyntaxNode> },
    Set { elts: Vec<SyntaxNode> },
    ListComp(Comprehension),
    SetComp(Comprehension),
    GeneratorExp(Comprehension),
    DictComp { key: Box<SyntaxNode>, value: Box<SyntaxNode>, generators: Vec<SyntaxNode> },
    Await { value: Box<SyntaxNode> },
    Yield { value: Option<Box<SyntaxNode>> },
    YieldFrom { value: Box<SyntaxNode> },
    Compare { left: Box<SyntaxNode>, ops: Vec<CompareOperator>, comparators: Vec<SyntaxNode> },
    Call { func: Box<SyntaxNode>, args: Vec<SyntaxNode> },
    Num { n: Number },
    Str { s: String },
    FormattedValue { value: Box<SyntaxNode>, format_spec: Option<Box<SyntaxNode>> },
    JoinedStr { values: Vec<SyntaxNode> },
    Attribute { value: Box<SyntaxNode>, attr: String },
    Subscript { value: Box<SyntaxNode>, slice: Box<SyntaxNode> },
    Starred { value: Box<SyntaxNode> },
    Name { id: String },
    Slice {
        lower: Option<Box<SyntaxNode>>,
        upper: Option<Box<SyntaxNode>>,
        step: Option<Box<SyntaxNode>>,
    },
    ExtSlice { dims: Vec<SyntaxNode> },
    Index { value: Box<SyntaxNode> },
    Operator(Operator),
    Pass,
    Break,
    Continue,
    Unhandled(UnhandledKind),
}

impl SyntaxNode {
    /// The Python AST kind name of this node.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SyntaxNode::Module { .. } => "Module",
            SyntaxNode::Interactive { .. } => "Interactive",
            SyntaxNode::Expression { .. } => "Expression",
            SyntaxNode::Suite { .. } => "Suite",
            SyntaxNode::FunctionDef(_) => "FunctionDef",
            SyntaxNode::AsyncFunctionDef(_) => "AsyncFunctionDef",
            SyntaxNode::Return { .. } => "Return",
            SyntaxNode::Delete { .. } => "Delete",
            SyntaxNode::Assign { .. } => "Assign",
            SyntaxNode::AugAssign { .. } => "AugAssign",
            SyntaxNode::AnnAssign { .. } => "AnnAssign",
            SyntaxNode::For(_) => "For",
            SyntaxNode::AsyncFor(_) => "AsyncFor",
            SyntaxNode::While { .. } => "While",
            SyntaxNode::If { .. } => "If",
            SyntaxNode::With { .. } => "With",
            SyntaxNode::AsyncWith { .. } => "AsyncWith",
            SyntaxNode::Global { .. } => "Global",
            SyntaxNode::NonLocal { .. } => "NonLocal",
            SyntaxNode::Expr { .. } => "Expr",
            SyntaxNode::Print { .. } => "Print",
            SyntaxNode::BoolOp { .. } => "BoolOp",
            SyntaxNode::BinOp { .. } => "BinOp",
            SyntaxNode::UnaryOp { .. } => "UnaryOp",
            SyntaxNode::Lambda { .. } => "Lambda",
            SyntaxNode::IfExp { .. } => "IfExp",
            SyntaxNode::Dict { .. } => "Dict",
            SyntaxNode::Set { .. } => "Set",
            SyntaxNode::ListComp(_) => "ListComp",
            SyntaxNode::SetComp(_) => "SetComp",
            SyntaxNode::GeneratorExp(_) => "GeneratorExp",
            SyntaxNode::DictComp { .. } => "DictComp",
            SyntaxNode::Await { .. } => "Await",
            SyntaxNode::Yield { .. } => "Yield",
            SyntaxNode::YieldFrom { .. } => "YieldFrom",
            SyntaxNode::Compare { .. } => "Compare",
            SyntaxNode::Call { .. } => "Call",
            SyntaxNode::Num { .. } => "Num",
            SyntaxNode::Str { .. } => "Str",
            SyntaxNode::FormattedValue { .. } => "FormattedValue",
            SyntaxNode::JoinedStr { .. } => "JoinedStr",
            SyntaxNode::Attribute { .. } => "Attribute",
            SyntaxNode::Subscript { .. } => "Subscript",
            SyntaxNode::Starred { .. } => "Starred",
            SyntaxNode::Name { .. } => "Name",
            SyntaxNode::Slice { .. } => "Slice",
            SyntaxNode::ExtSlice { .. } => "ExtSlice",
            SyntaxNode::Index { .. } => "Index",
            SyntaxNode::Operator(op) => op.kind_name(),
            SyntaxNode::Pass => "Pass",
            SyntaxNode::Break => "Break",
            SyntaxNode::Continue => "Continue",
            SyntaxNode::Unhandled(kind) => kind.kind_name(),
        }
    }

    /// The label shown on the diagram node for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            SyntaxNode::Num { .. } => "Number",
            other => other.kind_name(),
        }
    }

    /// Looks up a kind that carries no fields by name.
    ///
    /// Covers operators, `Pass`/`Break`/`Continue` and the unhandled kinds;
    /// these are the kinds a parser may emit as a bare tag instead of an
    /// object.
    pub fn payload_free(name: &str) -> Option<SyntaxNode> {
        if let Some(op) = Operator::from_kind_name(name) {
            return Some(SyntaxNode::Operator(op));
        }
        match name {
            "Pass" => Some(SyntaxNode::Pass),
            "Break" => Some(SyntaxNode::Break),
            "Continue" => Some(SyntaxNode::Continue),
            _ => UnhandledKind::from_kind_name(name).map(SyntaxNode::Unhandled),
        }
    }

    /// Total number of nodes in the subtree rooted here, operators included.
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// Visits every node of the subtree depth-first, parent before children.
    ///
    /// Operator fields (`BinOp.op`, `Compare.ops`, ...) are visited as
    /// [`SyntaxNode::Operator`] leaves.
    pub fn walk(&self, visit: &mut dyn FnMut(&SyntaxNode)) {
        visit(self);
        let op_leaf = |op: Operator, visit: &mut dyn FnMut(&SyntaxNode)| {
            visit(&SyntaxNode::Operator(op));
        };
        let many = |nodes: &[SyntaxNode], visit: &mut dyn FnMut(&SyntaxNode)| {
            for node in nodes {
                node.walk(visit);
            }
        };
        let maybe = |node: &Option<Box<SyntaxNode>>, visit: &mut dyn FnMut(&SyntaxNode)| {
            if let Some(node) = node {
                node.walk(visit);
            }
        };

        match self {
            SyntaxNode::Module { body }
            | SyntaxNode::Interactive { body }
            | SyntaxNode::Expression { body }
            | SyntaxNode::Suite { body } => many(body, visit),
            SyntaxNode::FunctionDef(def) | SyntaxNode::AsyncFunctionDef(def) => {
                many(&def.args, visit);
                many(&def.body, visit);
                many(&def.decorator_list, visit);
                maybe(&def.returns, visit);
            }
            SyntaxNode::Return { value } | SyntaxNode::Yield { value } => maybe(value, visit),
            SyntaxNode::Delete { targets } => many(targets, visit),
            SyntaxNode::Assign { value, targets } => {
                value.walk(visit);
                many(targets, visit);
            }
            SyntaxNode::AugAssign { target, op, value } => {
                target.walk(visit);
                op_leaf((*op).into(), visit);
                value.walk(visit);
            }
            SyntaxNode::AnnAssign {
                target,
                annotation,
                value,
            } => {
                target.walk(visit);
                annotation.walk(visit);
                maybe(value, visit);
            }
            SyntaxNode::For(def) | SyntaxNode::AsyncFor(def) => {
                def.target.walk(visit);
                def.iter.walk(visit);
                many(&def.body, visit);
                many(&def.orelse, visit);
            }
            SyntaxNode::While { test, body, orelse } | SyntaxNode::If { test, body, orelse } => {
                test.walk(visit);
                many(body, visit);
                many(orelse, visit);
            }
            SyntaxNode::With { items, body } | SyntaxNode::AsyncWith { items, body } => {
                many(items, visit);
                many(body, visit);
            }
            SyntaxNode::Global { .. } | SyntaxNode::NonLocal { .. } => {}
            SyntaxNode::Expr { value }
            | SyntaxNode::Await { value }
            | SyntaxNode::YieldFrom { value }
            | SyntaxNode::Starred { value }
            | SyntaxNode::Index { value } => value.walk(visit),
            SyntaxNode::Print { dest, values } => {
                maybe(dest, visit);
                many(values, visit);
            }
            SyntaxNode::BoolOp { op, values } => {
                op_leaf((*op).into(), visit);
                many(values, visit);
            }
            SyntaxNode::BinOp { left, op, right } => {
                left.walk(visit);
                op_leaf((*op).into(), visit);
                right.walk(visit);
            }
            SyntaxNode::UnaryOp { op, operand } => {
                op_leaf((*op).into(), visit);
                operand.walk(visit);
            }
            SyntaxNode::Lambda { args, body } => {
                many(args, visit);
                body.walk(visit);
            }
            SyntaxNode::IfExp { test, body, orelse } => {
                test.walk(visit);
                body.walk(visit);
                orelse.walk(visit);
            }
            SyntaxNode::Dict { keys, values } => {
                for key in keys.iter().flatten() {
                    key.walk(visit);
                }
                many(values, visit);
            }
            SyntaxNode::Set { elts } => many(elts, visit),
            SyntaxNode::ListComp(comp)
            | SyntaxNode::SetComp(comp)
            | SyntaxNode::GeneratorExp(comp) => {
                comp.elt.walk(visit);
                many(&comp.generators, visit);
            }
            SyntaxNode::DictComp {
                key,
                value,
                generators,
            } => {
                key.walk(visit);
                value.walk(visit);
                many(generators, visit);
            }
            SyntaxNode::Compare {
                left,
                ops,
                comparators,
            } => {
                left.walk(visit);
                for op in ops {
                    op_leaf((*op).into(), visit);
                }
                many(comparators, visit);
            }
            SyntaxNode::Call { func, args } => {
                func.walk(visit);
                many(args, visit);
            }
            SyntaxNode::FormattedValue { value, format_spec } => {
                value.walk(visit);
                maybe(format_spec, visit);
            }
            SyntaxNode::JoinedStr { values } => many(values, visit),
            SyntaxNode::Attribute { value, .. } => value.walk(visit),
            SyntaxNode::Subscript { value, slice } => {
                value.walk(visit);
                slice.walk(visit);
            }
            SyntaxNode::Slice { lower, upper, step } => {
                maybe(lower, visit);
                maybe(upper, visit);
                maybe(step, visit);
            }
            SyntaxNode::ExtSlice { dims } => many(dims, visit),
            SyntaxNode::Num { .. }
            | SyntaxNode::Str { .. }
            | SyntaxNode::Name { .. }
            | SyntaxNode::Operator(_)
            | SyntaxNode::Pass
            | SyntaxNode::Break
            | SyntaxNode::Continue
            | SyntaxNode::Unhandled(_) => {}
        }
    }
}

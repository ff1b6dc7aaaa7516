//! JSON adapter for Python syntax trees.
//!
//! The external parser emits every node as a JSON object tagged with its kind
//! under `_astname` (`_type` is accepted too). Leaves without fields, such as
//! operators and `Pass`, may also arrive as a bare string holding the kind
//! name. Identifiers and literals may be wrapped as `{"v": ...}`.
//!
//! Decoding stops at the first problem; the returned [`Diagnostic`] carries
//! the JSON path of the offending value.

use serde_json::{Map, Value};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    syntax::{
        BinaryOperator, BooleanOperator, CompareOperator, Comprehension, ForLoop, FunctionDef,
        Number, Operator, SyntaxNode, UnaryOperator,
    },
};

const KIND_TAGS: [&str; 2] = ["_astname", "_type"];

/// A JSON path such as `$.body[0].value`, used to locate diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct JsonPath(String);

impl JsonPath {
    pub(crate) fn root() -> Self {
        Self("$".to_string())
    }

    pub(crate) fn field(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    pub(crate) fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

/// Decodes a syntax tree from an already parsed JSON document.
///
/// A top-level array is taken as the body of a `Module`.
pub(crate) fn decode_syntax_tree(value: &Value) -> Result<SyntaxNode> {
    let root = JsonPath::root();
    match value {
        Value::Array(items) => Ok(SyntaxNode::Module {
            body: decode_list(items, &root)?,
        }),
        other => decode_node(other, &root),
    }
}

fn decode_list(items: &[Value], path: &JsonPath) -> Result<Vec<SyntaxNode>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| decode_node(item, &path.index(i)))
        .collect()
}

fn decode_node(value: &Value, path: &JsonPath) -> Result<SyntaxNode> {
    match value {
        Value::String(kind) => SyntaxNode::payload_free(kind).ok_or_else(|| {
            if KNOWN_KINDS.contains(&kind.as_str()) {
                Diagnostic::error(format!("`{kind}` cannot be given as a bare name"))
                    .with_code(ErrorCode::E103)
                    .with_path(path.as_str())
                    .with_help("only operators and field-less kinds may be bare strings")
            } else {
                unknown_kind(kind, path)
            }
        }),
        Value::Object(map) => {
            let kind = kind_tag(map, path)?;
            Fields { map, path, kind }.decode()
        }
        other => Err(wrong_type("a syntax node", other, path)),
    }
}

fn kind_tag<'a>(map: &'a Map<String, Value>, path: &JsonPath) -> Result<&'a str> {
    for tag in KIND_TAGS {
        match map.get(tag) {
            Some(Value::String(kind)) => return Ok(kind),
            Some(other) => return Err(wrong_type("a kind name", other, &path.field(tag))),
            None => {}
        }
    }
    Err(Diagnostic::error("syntax node has no kind tag")
        .with_code(ErrorCode::E100)
        .with_path(path.as_str())
        .with_help("tag every node with `_astname` (or `_type`)"))
}

fn unknown_kind(kind: &str, path: &JsonPath) -> Diagnostic {
    Diagnostic::error(format!("unknown syntax node kind `{kind}`"))
        .with_code(ErrorCode::E101)
        .with_path(path.as_str())
}

fn wrong_type(expected: &str, found: &Value, path: &JsonPath) -> Diagnostic {
    Diagnostic::error(format!("expected {expected}, found {}", describe(found)))
        .with_code(ErrorCode::E103)
        .with_path(path.as_str())
}

pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Kinds with fields; used to tell a misplaced bare name from an unknown one.
const KNOWN_KINDS: &[&str] = &[
    "Module", "Interactive", "Expression", "Suite", "FunctionDef", "AsyncFunctionDef", "Return",
    "Delete", "Assign", "AugAssign", "AnnAssign", "For", "AsyncFor", "While", "If", "With",
    "AsyncWith", "Global", "NonLocal", "Expr", "Print", "BoolOp", "BinOp", "UnaryOp", "Lambda",
    "IfExp", "Dict", "Set", "ListComp", "SetComp", "GeneratorExp", "DictComp", "Await", "Yield",
    "YieldFrom", "Compare", "Call", "Num", "Str", "FormattedValue", "JoinedStr", "Attribute",
    "Subscript", "Starred", "Name", "Slice", "ExtSlice", "Index",
];

/// The fields of one tagged node object.
struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: &'a JsonPath,
    kind: &'a str,
}

impl Fields<'_> {
    fn decode(&self) -> Result<SyntaxNode> {
        let node = match self.kind {
            "Module" => SyntaxNode::Module { body: self.list("body")? },
            "Interactive" => SyntaxNode::Interactive { body: self.list("body")? },
            "Expression" => SyntaxNode::Expression { body: self.list_or_single("body")? },
            "Suite" => SyntaxNode::Suite { body: self.list("body")? },
            "FunctionDef" => SyntaxNode::FunctionDef(self.function_def()?),
            "AsyncFunctionDef" => SyntaxNode::AsyncFunctionDef(self.function_def()?),
            "Return" => SyntaxNode::Return { value: self.optional("value")? },
            "Delete" => SyntaxNode::Delete { targets: self.list("targets")? },
            "Assign" => SyntaxNode::Assign {
                value: self.required("value")?,
                targets: self.list("targets")?,
            },
            "AugAssign" => SyntaxNode::AugAssign {
                target: self.required("target")?,
                op: self.operator("op", binary)?,
                value: self.required("value")?,
            },
            "AnnAssign" => SyntaxNode::AnnAssign {
                target: self.required("target")?,
                annotation: self.required("annotation")?,
                value: self.optional("value")?,
            },
            "For" => SyntaxNode::For(self.for_loop()?),
            "AsyncFor" => SyntaxNode::AsyncFor(self.for_loop()?),
            "While" => SyntaxNode::While {
                test: self.required("test")?,
                body: self.list("body")?,
                orelse: self.list("orelse")?,
            },
            "If" => SyntaxNode::If {
                test: self.required("test")?,
                body: self.list("body")?,
                orelse: self.list("orelse")?,
            },
            "With" => SyntaxNode::With {
                items: self.list("items")?,
                body: self.list("body")?,
            },
            "AsyncWith" => SyntaxNode::AsyncWith {
                items: self.list("items")?,
                body: self.list("body")?,
            },
            "Global" => SyntaxNode::Global { names: self.identifiers("names")? },
            "NonLocal" | "Nonlocal" => SyntaxNode::NonLocal { names: self.identifiers("names")? },
            "Expr" => SyntaxNode::Expr { value: self.required("value")? },
            "Print" => SyntaxNode::Print {
                dest: self.optional("dest")?,
                values: self.list("values")?,
            },
            "BoolOp" => SyntaxNode::BoolOp {
                op: self.operator("op", boolean)?,
                values: self.list("values")?,
            },
            "BinOp" => SyntaxNode::BinOp {
                left: self.required("left")?,
                op: self.operator("op", binary)?,
                right: self.required("right")?,
            },
            "UnaryOp" => SyntaxNode::UnaryOp {
                op: self.operator("op", unary)?,
                operand: self.required("operand")?,
            },
            "Lambda" => SyntaxNode::Lambda {
                args: self.arguments("args")?,
                body: self.required("body")?,
            },
            "IfExp" => SyntaxNode::IfExp {
                test: self.required("test")?,
                body: self.required("body")?,
                orelse: self.required("orelse")?,
            },
            "Dict" => SyntaxNode::Dict {
                keys: self.sparse_list("keys")?,
                values: self.list("values")?,
            },
            "Set" => SyntaxNode::Set { elts: self.list("elts")? },
            "ListComp" => SyntaxNode::ListComp(self.comprehension()?),
            "SetComp" => SyntaxNode::SetComp(self.comprehension()?),
            "GeneratorExp" => SyntaxNode::GeneratorExp(self.comprehension()?),
            "DictComp" => SyntaxNode::DictComp {
                key: self.required("key")?,
                value: self.required("value")?,
                generators: self.list("generators")?,
            },
            "Await" => SyntaxNode::Await { value: self.required("value")? },
            "Yield" => SyntaxNode::Yield { value: self.optional("value")? },
            "YieldFrom" => SyntaxNode::YieldFrom { value: self.required("value")? },
            "Compare" => SyntaxNode::Compare {
                left: self.required("left")?,
                ops: self.operators("ops", compare)?,
                comparators: self.list("comparators")?,
            },
            "Call" => SyntaxNode::Call {
                func: self.required("func")?,
                args: self.list("args")?,
            },
            "Num" => SyntaxNode::Num { n: self.number("n")? },
            "Str" => SyntaxNode::Str { s: self.string("s")? },
            "FormattedValue" => SyntaxNode::FormattedValue {
                value: self.required("value")?,
                format_spec: self.optional("format_spec")?,
            },
            "JoinedStr" => SyntaxNode::JoinedStr { values: self.list("values")? },
            "Attribute" => SyntaxNode::Attribute {
                value: self.required("value")?,
                attr: self.string("attr")?,
            },
            "Subscript" => SyntaxNode::Subscript {
                value: self.required("value")?,
                slice: self.required("slice")?,
            },
            "Starred" => SyntaxNode::Starred { value: self.required("value")? },
            "Name" => SyntaxNode::Name { id: self.string("id")? },
            "Slice" => SyntaxNode::Slice {
                lower: self.optional("lower")?,
                upper: self.optional("upper")?,
                step: self.optional("step")?,
            },
            "ExtSlice" => SyntaxNode::ExtSlice { dims: self.list("dims")? },
            "Index" => SyntaxNode::Index { value: self.required("value")? },
            other => {
                return SyntaxNode::payload_free(other)
                    .ok_or_else(|| unknown_kind(other, self.path));
            }
        };
        Ok(node)
    }

    fn function_def(&self) -> Result<FunctionDef> {
        Ok(FunctionDef {
            name: self.string("name")?,
            args: self.arguments("args")?,
            body: self.list("body")?,
            decorator_list: self.list("decorator_list")?,
            returns: self.optional("returns")?,
        })
    }

    fn for_loop(&self) -> Result<ForLoop> {
        Ok(ForLoop {
            target: self.required("target")?,
            iter: self.required("iter")?,
            body: self.list("body")?,
            orelse: self.list("orelse")?,
        })
    }

    fn comprehension(&self) -> Result<Comprehension> {
        Ok(Comprehension {
            elt: self.required("elt")?,
            generators: self.list("generators")?,
        })
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name).filter(|value| !value.is_null())
    }

    fn missing(&self, name: &str) -> Diagnostic {
        Diagnostic::error(format!("`{}` node is missing field `{name}`", self.kind))
            .with_code(ErrorCode::E102)
            .with_path(self.path.as_str())
    }

    fn required(&self, name: &str) -> Result<Box<SyntaxNode>> {
        let value = self.get(name).ok_or_else(|| self.missing(name))?;
        decode_node(value, &self.path.field(name)).map(Box::new)
    }

    fn optional(&self, name: &str) -> Result<Option<Box<SyntaxNode>>> {
        self.get(name)
            .map(|value| decode_node(value, &self.path.field(name)).map(Box::new))
            .transpose()
    }

    /// A list field; an absent list is empty.
    fn list(&self, name: &str) -> Result<Vec<SyntaxNode>> {
        let path = self.path.field(name);
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => decode_list(items, &path),
            Some(other) => Err(wrong_type("a list of syntax nodes", other, &path)),
        }
    }

    /// A list whose `null` slots stand for absent children, as in the keys
    /// of `{**mapping}`.
    fn sparse_list(&self, name: &str) -> Result<Vec<Option<SyntaxNode>>> {
        let path = self.path.field(name);
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Null => Ok(None),
                    item => decode_node(item, &path.index(i)).map(Some),
                })
                .collect(),
            Some(other) => Err(wrong_type("a list of syntax nodes", other, &path)),
        }
    }

    fn list_or_single(&self, name: &str) -> Result<Vec<SyntaxNode>> {
        match self.get(name) {
            Some(value @ Value::Object(_)) => {
                Ok(vec![decode_node(value, &self.path.field(name))?])
            }
            _ => self.list(name),
        }
    }

    /// Parameters: either a plain list or an `arguments` node holding `args`.
    fn arguments(&self, name: &str) -> Result<Vec<SyntaxNode>> {
        let path = self.path.field(name);
        match self.get(name) {
            Some(Value::Object(inner)) => {
                let fields = Fields {
                    map: inner,
                    path: &path,
                    kind: "arguments",
                };
                fields.list("args")
            }
            _ => self.list(name),
        }
    }

    fn scalar(&self, name: &str) -> Result<(&Value, JsonPath)> {
        let mut path = self.path.field(name);
        let mut value = self.get(name).ok_or_else(|| self.missing(name))?;
        if let Some(inner) = value.as_object().and_then(|wrapper| wrapper.get("v")) {
            path = path.field("v");
            value = inner;
        }
        Ok((value, path))
    }

    fn string(&self, name: &str) -> Result<String> {
        match self.scalar(name)? {
            (Value::String(text), _) => Ok(text.clone()),
            (other, path) => Err(wrong_type("a string", other, &path)),
        }
    }

    fn identifiers(&self, name: &str) -> Result<Vec<String>> {
        let path = self.path.field(name);
        let items = match self.get(name) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => return Err(wrong_type("a list of identifiers", other, &path)),
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(text) => Ok(text.clone()),
                Value::Object(wrapper) => match wrapper.get("v") {
                    Some(Value::String(text)) => Ok(text.clone()),
                    _ => Err(wrong_type("an identifier", item, &path.index(i))),
                },
                other => Err(wrong_type("an identifier", other, &path.index(i))),
            })
            .collect()
    }

    fn number(&self, name: &str) -> Result<Number> {
        match self.scalar(name)? {
            (Value::Number(n), path) => {
                if let Some(int) = n.as_i64() {
                    Ok(Number::Int(int))
                } else {
                    n.as_f64()
                        .map(Number::Float)
                        .ok_or_else(|| wrong_type("a finite number", &Value::Number(n.clone()), &path))
                }
            }
            (other, path) => Err(wrong_type("a number", other, &path)),
        }
    }

    fn operator<T>(&self, name: &str, class: fn(Operator) -> Option<T>) -> Result<T> {
        let value = self.get(name).ok_or_else(|| self.missing(name))?;
        decode_operator(value, &self.path.field(name), class)
    }

    fn operators<T>(&self, name: &str, class: fn(Operator) -> Option<T>) -> Result<Vec<T>> {
        let path = self.path.field(name);
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| decode_operator(item, &path.index(i), class))
                .collect(),
            Some(other) => Err(wrong_type("a list of operators", other, &path)),
        }
    }
}

/// Reads an operator given as a bare name or as a tagged object.
fn decode_operator<T>(
    value: &Value,
    path: &JsonPath,
    class: fn(Operator) -> Option<T>,
) -> Result<T> {
    let name = match value {
        Value::String(name) => name.as_str(),
        Value::Object(map) => kind_tag(map, path)?,
        other => return Err(wrong_type("an operator", other, path)),
    };
    Operator::from_kind_name(name)
        .and_then(class)
        .ok_or_else(|| {
            Diagnostic::error(format!("`{name}` is not a valid operator here"))
                .with_code(ErrorCode::E104)
                .with_path(path.as_str())
        })
}

fn binary(op: Operator) -> Option<BinaryOperator> {
    match op {
        Operator::Binary(op) => Some(op),
        _ => None,
    }
}

fn boolean(op: Operator) -> Option<BooleanOperator> {
    match op {
        Operator::Boolean(op) => Some(op),
        _ => None,
    }
}

fn compare(op: Operator) -> Option<CompareOperator> {
    match op {
        Operator::Compare(op) => Some(op),
        _ => None,
    }
}

fn unary(op: Operator) -> Option<UnaryOperator> {
    match op {
        Operator::Unary(op) => Some(op),
        _ => None,
    }
}

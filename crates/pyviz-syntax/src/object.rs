//! Snapshots of live Python objects.
//!
//! An [`ObjectGraph`] is an ordered set of named [`ObjectRecord`]s. Each record
//! holds properties and array slots whose values are either inline primitives
//! or references to other records by name. References may form cycles.
//!
//! Every reference in a constructed graph names a record of the same graph;
//! [`ObjectGraph::new`] and the JSON adapter both reject dangling references.
//!
//! # JSON format
//!
//! ```json
//! {
//!   "lunch":  { "name": "lunch", "properties": { "fruits": {"ref": "fruits"} } },
//!   "fruits": { "name": "list", "items": ["apple", "pear"] }
//! }
//! ```
//!
//! The `inlineProperties` / `linkedProperties` pair is accepted in place of
//! `properties`; linked properties hold the target name as a plain string.

use std::fmt;

use indexmap::IndexMap;
use log::debug;
use pyviz_core::identifier::Id;
use serde_json::{Map, Value as Json};

use crate::{
    decode::{JsonPath, describe},
    error::{DecodeError, Diagnostic, ErrorCode},
};

/// An inline value small enough to display inside its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

impl fmt::Display for Primitive {
    /// Formats the value the way Python's `repr` would.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Str(text) => write!(f, "'{text}'"),
            Primitive::Int(value) => write!(f, "{value}"),
            Primitive::Float(value) => write_float(f, *value),
            Primitive::Bool(true) => f.write_str("True"),
            Primitive::Bool(false) => f.write_str("False"),
            Primitive::None => f.write_str("None"),
        }
    }
}

/// Python switches to exponent notation outside `1e-4 <= |x| < 1e16`.
fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        return f.write_str("nan");
    }
    if value.is_infinite() {
        return f.write_str(if value > 0.0 { "inf" } else { "-inf" });
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{value:e}");
        let Some((mantissa, exponent)) = formatted.split_once('e') else {
            return f.write_str(&formatted);
        };
        let exponent: i32 = exponent.parse().map_err(|_| fmt::Error)?;
        let sign = if exponent < 0 { '-' } else { '+' };
        return write!(f, "{mantissa}e{sign}{:02}", exponent.abs());
    }
    if value.fract() == 0.0 {
        write!(f, "{value:.1}")
    } else {
        write!(f, "{value}")
    }
}

/// A property or array-slot value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Inline(Primitive),
    Reference(Id),
}

impl Value {
    pub fn reference(name: &str) -> Self {
        Value::Reference(Id::new(name))
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Inline(Primitive::Str(text.to_string()))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Inline(Primitive::Int(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Inline(Primitive::Float(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Inline(Primitive::Bool(value))
    }
}

/// One live object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    name: String,
    properties: IndexMap<String, Value>,
    items: Vec<Value>,
}

impl ObjectRecord {
    /// Creates a record with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
            items: Vec::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_item(mut self, value: impl Into<Value>) -> Self {
        self.items.push(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Named properties, in insertion order.
    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    /// Array slots, in index order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    fn references(&self) -> impl Iterator<Item = (String, Id)> + '_ {
        let properties = self.properties.iter().filter_map(|(key, value)| match value {
            Value::Reference(target) => Some((format!("properties.{key}"), *target)),
            Value::Inline(_) => None,
        });
        let items = self.items.iter().enumerate().filter_map(|(i, value)| match value {
            Value::Reference(target) => Some((format!("items[{i}]"), *target)),
            Value::Inline(_) => None,
        });
        properties.chain(items)
    }
}

/// An ordered collection of object records addressed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectGraph {
    records: IndexMap<Id, ObjectRecord>,
}

impl ObjectGraph {
    /// Builds a graph, checking that every reference resolves.
    ///
    /// # Errors
    ///
    /// Returns one `E202` diagnostic per dangling reference.
    pub fn new(records: IndexMap<Id, ObjectRecord>) -> Result<Self, DecodeError> {
        let graph = Self { records };
        graph.validate()?;
        Ok(graph)
    }

    pub fn get(&self, id: Id) -> Option<&ObjectRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.records.contains_key(&id)
    }

    /// Records in input order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &ObjectRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn validate(&self) -> Result<(), DecodeError> {
        let diagnostics: Vec<_> = self
            .iter()
            .flat_map(|(id, record)| {
                record
                    .references()
                    .filter(|(_, target)| !self.contains(*target))
                    .map(move |(field, target)| {
                        Diagnostic::error(format!(
                            "`{id}` refers to `{target}`, which is not in the snapshot"
                        ))
                        .with_code(ErrorCode::E202)
                        .with_path(format!("$.{id}.{field}"))
                    })
            })
            .collect();

        if diagnostics.is_empty() {
            Ok(())
        } else {
            Err(diagnostics.into())
        }
    }
}

/// Decodes an object graph from an already parsed JSON document.
pub(crate) fn decode_object_graph(document: &Json) -> Result<ObjectGraph, DecodeError> {
    let root = JsonPath::root();
    let Json::Object(entries) = document else {
        return Err(malformed_record("an object keyed by record name", document, &root).into());
    };

    let mut records = IndexMap::with_capacity(entries.len());
    let mut diagnostics = Vec::new();
    for (key, entry) in entries {
        match decode_record(key, entry, &root.field(key)) {
            Ok(record) => {
                records.insert(Id::new(key), record);
            }
            Err(mut errs) => diagnostics.append(&mut errs),
        }
    }
    if !diagnostics.is_empty() {
        return Err(diagnostics.into());
    }

    debug!(records = records.len(); "Decoded object graph");
    ObjectGraph::new(records)
}

fn decode_record(key: &str, entry: &Json, path: &JsonPath) -> Result<ObjectRecord, Vec<Diagnostic>> {
    let Json::Object(fields) = entry else {
        return Err(vec![malformed_record("an object record", entry, path)]);
    };

    let name = match fields.get("name") {
        None => key.to_string(),
        Some(Json::String(name)) => name.clone(),
        Some(other) => {
            return Err(vec![malformed_record("a string", other, &path.field("name"))]);
        }
    };
    let mut record = ObjectRecord::new(name);
    let mut diagnostics = Vec::new();

    for (field, linked) in [("inlineProperties", false), ("properties", false), ("linkedProperties", true)] {
        let field_path = path.field(field);
        match fields.get(field) {
            None => {}
            Some(Json::Object(properties)) => {
                decode_properties(properties, linked, &field_path, &mut record, &mut diagnostics);
            }
            Some(other) => diagnostics.push(malformed_record("an object", other, &field_path)),
        }
    }

    let items_path = path.field("items");
    match fields.get("items") {
        None => {}
        Some(Json::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                match decode_value(item, &items_path.index(i)) {
                    Ok(value) => record.items.push(value),
                    Err(diag) => diagnostics.push(diag),
                }
            }
        }
        Some(other) => diagnostics.push(malformed_record("an array", other, &items_path)),
    }

    if diagnostics.is_empty() {
        Ok(record)
    } else {
        Err(diagnostics)
    }
}

fn decode_properties(
    properties: &Map<String, Json>,
    linked: bool,
    path: &JsonPath,
    record: &mut ObjectRecord,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (key, raw) in properties {
        let value_path = path.field(key);
        if record.properties.contains_key(key) {
            diagnostics.push(
                Diagnostic::error(format!("duplicate property `{key}`"))
                    .with_code(ErrorCode::E200)
                    .with_path(value_path.as_str()),
            );
            continue;
        }
        let value = match (linked, raw) {
            (true, Json::String(target)) => Ok(Value::reference(target)),
            (true, other) => Err(malformed_value("a record name", other, &value_path)),
            (false, other) => decode_value(other, &value_path),
        };
        match value {
            Ok(value) => {
                record.properties.insert(key.clone(), value);
            }
            Err(diag) => diagnostics.push(diag),
        }
    }
}

fn decode_value(raw: &Json, path: &JsonPath) -> Result<Value, Diagnostic> {
    let primitive = match raw {
        Json::Null => Primitive::None,
        Json::Bool(value) => Primitive::Bool(*value),
        Json::String(text) => Primitive::Str(text.clone()),
        Json::Number(n) => match n.as_i64() {
            Some(int) => Primitive::Int(int),
            None => Primitive::Float(n.as_f64().ok_or_else(|| {
                malformed_value("a finite number", raw, path)
            })?),
        },
        Json::Object(map) => {
            return match (map.len(), map.get("ref")) {
                (1, Some(Json::String(target))) => Ok(Value::reference(target)),
                _ => Err(malformed_value("a primitive or {\"ref\": name}", raw, path)),
            };
        }
        Json::Array(_) => {
            return Err(malformed_value("a primitive or {\"ref\": name}", raw, path)
                .with_help("put nested collections in their own record and reference it"));
        }
    };
    Ok(Value::Inline(primitive))
}

fn malformed_record(expected: &str, found: &Json, path: &JsonPath) -> Diagnostic {
    Diagnostic::error(format!("expected {expected}, found {}", describe(found)))
        .with_code(ErrorCode::E200)
        .with_path(path.as_str())
}

fn malformed_value(expected: &str, found: &Json, path: &JsonPath) -> Diagnostic {
    Diagnostic::error(format!("expected {expected}, found {}", describe(found)))
        .with_code(ErrorCode::E201)
        .with_path(path.as_str())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_primitive_display() {
        assert_eq!(Primitive::Str("apple".into()).to_string(), "'apple'");
        assert_eq!(Primitive::Int(3).to_string(), "3");
        assert_eq!(Primitive::Float(1.0).to_string(), "1.0");
        assert_eq!(Primitive::Float(-0.5).to_string(), "-0.5");
        assert_eq!(Primitive::Float(1e20).to_string(), "1e+20");
        assert_eq!(Primitive::Float(1.5e-7).to_string(), "1.5e-07");
        assert_eq!(Primitive::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Primitive::Float(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(Primitive::Bool(true).to_string(), "True");
        assert_eq!(Primitive::None.to_string(), "None");
    }

    #[test]
    fn test_new_rejects_every_dangling_reference() {
        let mut records = IndexMap::new();
        records.insert(
            Id::new("a"),
            ObjectRecord::new("a")
                .with_property("x", Value::reference("missing_x"))
                .with_item(Value::reference("missing_y")),
        );

        let err = ObjectGraph::new(records).unwrap_err();
        let paths: Vec<_> = err.diagnostics().iter().map(|d| d.path()).collect();
        assert_eq!(paths, [Some("$.a.properties.x"), Some("$.a.items[0]")]);
        assert!(err
            .diagnostics()
            .iter()
            .all(|d| d.code() == Some(ErrorCode::E202)));
    }

    #[test]
    fn test_decode_preserves_input_order() {
        let graph = decode_object_graph(&json!({
            "zeta": {"name": "z", "properties": {"b": 1, "a": {"ref": "alpha"}}},
            "alpha": {"name": "a"},
        }))
        .unwrap();

        let names: Vec<_> = graph.iter().map(|(_, r)| r.name()).collect();
        assert_eq!(names, ["z", "a"]);

        let zeta = graph.get(Id::new("zeta")).unwrap();
        let keys: Vec<_> = zeta.properties().keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(zeta.properties()["a"], Value::reference("alpha"));
    }

    #[test]
    fn test_decode_inline_and_linked_properties() {
        let graph = decode_object_graph(&json!({
            "lunch": {
                "name": "lunch",
                "inlineProperties": {"price": 12},
                "linkedProperties": {"drinks": "drinks"},
            },
            "drinks": {"name": "list", "items": ["tea", 2.5, null]},
        }))
        .unwrap();

        let lunch = graph.get(Id::new("lunch")).unwrap();
        assert_eq!(lunch.properties()["price"], Value::from(12i64));
        assert_eq!(lunch.properties()["drinks"], Value::reference("drinks"));

        let drinks = graph.get(Id::new("drinks")).unwrap();
        assert_eq!(
            drinks.items(),
            [Value::from("tea"), Value::from(2.5), Value::Inline(Primitive::None)]
        );
    }

    #[test]
    fn test_duplicate_property_across_sections_is_rejected() {
        let err = decode_object_graph(&json!({
            "a": {"inlineProperties": {"x": 1}, "linkedProperties": {"x": "b"}},
            "b": {},
        }))
        .unwrap_err();

        let diag = &err.diagnostics()[0];
        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(diag.code(), Some(ErrorCode::E200));
        assert_eq!(diag.path(), Some("$.a.linkedProperties.x"));
    }

    #[test]
    fn test_name_defaults_to_key() {
        let graph = decode_object_graph(&json!({"solo": {}})).unwrap();
        assert_eq!(graph.get(Id::new("solo")).unwrap().name(), "solo");
    }

    #[test]
    fn test_cycle_is_accepted() {
        let graph = decode_object_graph(&json!({
            "a": {"properties": {"next": {"ref": "b"}}},
            "b": {"properties": {"next": {"ref": "a"}}},
        }))
        .unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_malformed_values_are_all_reported() {
        let err = decode_object_graph(&json!({
            "a": {"properties": {"x": [1, 2], "y": {"ref": 3}}},
            "b": 7,
        }))
        .unwrap_err();

        let codes: Vec<_> = err.diagnostics().iter().filter_map(|d| d.code()).collect();
        assert_eq!(codes, [ErrorCode::E201, ErrorCode::E201, ErrorCode::E200]);
    }
}

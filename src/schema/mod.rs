//! Arena model of a generated schema document.
//!
//! Every schema position in the source JSON becomes one `SchemaNode` addressed
//! by `NodeId`. Cross-references stay as pointer strings on the node that
//! carries them and are resolved against the root definitions table on demand
//! (see `resolve`), so every arrival at a shared definition lands on the same
//! `NodeId`. The source `Value` is never mutated; `to_value` re-emits the
//! document with walk annotations applied.

pub mod resolve;

use crate::error::AnnotateError;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// `id` prefix marking a standalone named type.
pub const NAMED_TYPE_PREFIX: &str = "type.";
pub const DEFINITIONS_KEY: &str = "$defs";
pub const LEGACY_DEFINITIONS_KEY: &str = "definitions";
/// Structured examples kept beside the rendered description when requested.
pub const EXAMPLES_KEY: &str = "x-doc-examples";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Decided once at load time from the node's `id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Inline,
    NamedType(String),
}

impl NodeKind {
    fn from_id(id: Option<&str>) -> Self {
        match id.and_then(|id| id.strip_prefix(NAMED_TYPE_PREFIX)) {
            Some(name) if !name.is_empty() => NodeKind::NamedType(name.to_string()),
            _ => NodeKind::Inline,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            NodeKind::NamedType(name) => Some(name),
            NodeKind::Inline => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum UnionKind {
    AnyOf,
    OneOf,
    AllOf,
}

impl UnionKind {
    pub const ALL: [UnionKind; 3] = [UnionKind::AnyOf, UnionKind::OneOf, UnionKind::AllOf];

    pub fn key(self) -> &'static str {
        match self {
            UnionKind::AnyOf => "anyOf",
            UnionKind::OneOf => "oneOf",
            UnionKind::AllOf => "allOf",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Items {
    Single(NodeId),
    Tuple(Vec<NodeId>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Additional {
    Allowed(bool),
    Single(NodeId),
    Alternatives(Vec<NodeId>),
}

#[derive(Clone, Debug)]
pub struct SchemaNode {
    pub kind: NodeKind,
    /// `$ref` pointer, if this position is a cross-reference.
    pub reference: Option<String>,
    pub properties: BTreeMap<String, NodeId>,
    pub required: BTreeSet<String>,
    pub items: Option<Items>,
    pub additional: Option<Additional>,
    pub unions: BTreeMap<UnionKind, Vec<NodeId>>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Visited marker carried over from a previous run.
    pub documented: bool,
    pub stored_gid: Option<String>,
    /// Boolean schema (`true`/`false`) in a schema position.
    pub literal: Option<bool>,
    /// Keys the walker does not interpret, re-emitted verbatim.
    pub extra: Map<String, Value>,
    /// JSON pointer of this node in the source document.
    pub location: String,
}

impl SchemaNode {
    fn empty(location: String) -> Self {
        Self {
            kind: NodeKind::Inline,
            reference: None,
            properties: BTreeMap::new(),
            required: BTreeSet::new(),
            items: None,
            additional: None,
            unions: BTreeMap::new(),
            title: None,
            description: None,
            documented: false,
            stored_gid: None,
            literal: None,
            extra: Map::new(),
            location,
        }
    }

    pub fn schema_type(&self) -> Option<&str> {
        self.extra.get("type").and_then(Value::as_str)
    }

    /// Branches of an anonymous node whose only content is one union.
    pub fn wrapped_union(&self) -> Option<&[NodeId]> {
        if self.kind != NodeKind::Inline
            || self.reference.is_some()
            || self.title.is_some()
            || self.description.is_some()
            || !self.properties.is_empty()
            || self.items.is_some()
            || self.additional.is_some()
            || self.extra.contains_key("type")
            || self.unions.len() != 1
        {
            return None;
        }
        self.unions.values().next().map(Vec::as_slice)
    }
}

/// What a walk writes back onto a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotation {
    pub gid: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub examples: Option<Value>,
}

#[derive(Debug)]
pub struct SchemaGraph {
    nodes: Vec<SchemaNode>,
    root: NodeId,
    definitions: BTreeMap<String, NodeId>,
    legacy_definitions: BTreeSet<String>,
}

impl SchemaGraph {
    pub fn from_value(document: &Value) -> Result<Self, AnnotateError> {
        let Value::Object(root_map) = document else {
            return Err(AnnotateError::invalid_schema("", "document root must be an object"));
        };

        let mut graph = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            definitions: BTreeMap::new(),
            legacy_definitions: BTreeSet::new(),
        };

        let mut root_body = root_map.clone();
        for key in [DEFINITIONS_KEY, LEGACY_DEFINITIONS_KEY] {
            let Some(table) = root_body.remove(key) else {
                continue;
            };
            let Value::Object(entries) = table else {
                return Err(AnnotateError::invalid_schema(
                    format!("/{key}"),
                    "definitions table must be an object",
                ));
            };
            for (name, body) in &entries {
                let location = format!("/{}/{}", escape_pointer(key), escape_pointer(name));
                if graph.definitions.contains_key(name) {
                    return Err(AnnotateError::invalid_schema(
                        location,
                        "definition declared under both $defs and definitions",
                    ));
                }
                let id = graph.build(body, location)?;
                graph.definitions.insert(name.clone(), id);
                if key == LEGACY_DEFINITIONS_KEY {
                    graph.legacy_definitions.insert(name.clone());
                }
            }
        }

        graph.root = graph.build(&Value::Object(root_body), String::new())?;
        Ok(graph)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn definition(&self, name: &str) -> Option<NodeId> {
        self.definitions.get(name).copied()
    }

    fn push(&mut self, node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn build(&mut self, value: &Value, location: String) -> Result<NodeId, AnnotateError> {
        let map = match value {
            Value::Object(map) => map,
            Value::Bool(flag) => {
                let mut node = SchemaNode::empty(location);
                node.literal = Some(*flag);
                return Ok(self.push(node));
            }
            _ => {
                return Err(AnnotateError::invalid_schema(
                    location,
                    "schema position must be an object or boolean",
                ));
            }
        };

        let mut node = SchemaNode::empty(location.clone());
        node.kind = NodeKind::from_id(map.get("id").and_then(Value::as_str));
        let mut extra = map.clone();

        node.reference = take_string(&mut extra, "$ref");
        node.title = take_string(&mut extra, "title");
        node.description = take_string(&mut extra, "description");
        node.stored_gid = take_string(&mut extra, "gid");
        node.documented = matches!(extra.remove("documented"), Some(Value::Bool(true)));
        node.required = map
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if let Some(properties) = extra.remove("properties") {
            let Value::Object(properties) = properties else {
                return Err(AnnotateError::invalid_schema(
                    format!("{location}/properties"),
                    "properties must be an object",
                ));
            };
            for (name, body) in &properties {
                let child = self.build(
                    body,
                    format!("{location}/properties/{}", escape_pointer(name)),
                )?;
                node.properties.insert(name.clone(), child);
            }
        }

        if let Some(items) = extra.remove("items") {
            node.items = Some(match items {
                Value::Array(entries) => {
                    Items::Tuple(self.build_list(&entries, &format!("{location}/items"))?)
                }
                single => Items::Single(self.build(&single, format!("{location}/items"))?),
            });
        }

        if let Some(additional) = extra.remove("additionalProperties") {
            let child_location = format!("{location}/additionalProperties");
            node.additional = Some(match additional {
                Value::Bool(flag) => Additional::Allowed(flag),
                Value::Array(entries) => {
                    Additional::Alternatives(self.build_list(&entries, &child_location)?)
                }
                single => Additional::Single(self.build(&single, child_location)?),
            });
        }

        for kind in UnionKind::ALL {
            let Some(branches) = extra.remove(kind.key()) else {
                continue;
            };
            let Value::Array(branches) = branches else {
                return Err(AnnotateError::invalid_schema(
                    format!("{location}/{}", kind.key()),
                    "union must be an array",
                ));
            };
            let ids = self.build_list(&branches, &format!("{location}/{}", kind.key()))?;
            node.unions.insert(kind, ids);
        }

        node.extra = extra;
        Ok(self.push(node))
    }

    fn build_list(&mut self, entries: &[Value], location: &str) -> Result<Vec<NodeId>, AnnotateError> {
        entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| self.build(entry, format!("{location}/{idx}")))
            .collect()
    }

    /// Re-emit the document with `annotations` applied to the nodes they name.
    pub fn to_value(&self, annotations: &BTreeMap<NodeId, Annotation>) -> Value {
        let mut root = self.node_value(self.root, annotations);
        if let Value::Object(map) = &mut root {
            let mut current = Map::new();
            let mut legacy = Map::new();
            for (name, id) in &self.definitions {
                let body = self.node_value(*id, annotations);
                if self.legacy_definitions.contains(name) {
                    legacy.insert(name.clone(), body);
                } else {
                    current.insert(name.clone(), body);
                }
            }
            if !current.is_empty() {
                map.insert(DEFINITIONS_KEY.to_string(), Value::Object(current));
            }
            if !legacy.is_empty() {
                map.insert(LEGACY_DEFINITIONS_KEY.to_string(), Value::Object(legacy));
            }
        }
        root
    }

    fn node_value(&self, id: NodeId, annotations: &BTreeMap<NodeId, Annotation>) -> Value {
        let node = self.node(id);
        if let Some(flag) = node.literal {
            return Value::Bool(flag);
        }

        let annotation = annotations.get(&id);
        let mut out = node.extra.clone();

        if let Some(pointer) = &node.reference {
            out.insert("$ref".to_string(), Value::String(pointer.clone()));
        }

        let title = annotation
            .map(|a| a.title.as_ref())
            .unwrap_or(node.title.as_ref());
        if let Some(title) = title {
            out.insert("title".to_string(), Value::String(title.clone()));
        }
        let description = annotation
            .map(|a| a.description.as_ref())
            .unwrap_or(node.description.as_ref());
        if let Some(description) = description {
            out.insert("description".to_string(), Value::String(description.clone()));
        }
        let gid = annotation.map(|a| &a.gid).or(node.stored_gid.as_ref());
        if let Some(gid) = gid {
            out.insert("gid".to_string(), Value::String(gid.clone()));
        }
        if annotation.is_some() || node.documented {
            out.insert("documented".to_string(), Value::Bool(true));
        }
        if let Some(examples) = annotation.and_then(|a| a.examples.as_ref()) {
            out.insert(EXAMPLES_KEY.to_string(), examples.clone());
        }

        if !node.properties.is_empty() {
            let properties = node
                .properties
                .iter()
                .map(|(name, child)| (name.clone(), self.node_value(*child, annotations)))
                .collect();
            out.insert("properties".to_string(), Value::Object(properties));
        }

        match &node.items {
            Some(Items::Single(child)) => {
                out.insert("items".to_string(), self.node_value(*child, annotations));
            }
            Some(Items::Tuple(children)) => {
                out.insert("items".to_string(), self.list_value(children, annotations));
            }
            None => {}
        }

        match &node.additional {
            Some(Additional::Allowed(flag)) => {
                out.insert("additionalProperties".to_string(), Value::Bool(*flag));
            }
            Some(Additional::Single(child)) => {
                out.insert(
                    "additionalProperties".to_string(),
                    self.node_value(*child, annotations),
                );
            }
            Some(Additional::Alternatives(children)) => {
                out.insert(
                    "additionalProperties".to_string(),
                    self.list_value(children, annotations),
                );
            }
            None => {}
        }

        for (kind, branches) in &node.unions {
            out.insert(kind.key().to_string(), self.list_value(branches, annotations));
        }

        Value::Object(out)
    }

    fn list_value(&self, ids: &[NodeId], annotations: &BTreeMap<NodeId, Annotation>) -> Value {
        Value::Array(
            ids.iter()
                .map(|id| self.node_value(*id, annotations))
                .collect(),
        )
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(value)) => Some(value),
        Some(other) => {
            // Non-string values are not ours to interpret; keep them verbatim.
            map.insert(key.to_string(), other);
            None
        }
        None => None,
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

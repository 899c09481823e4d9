//! Arena-backed JSON-like values.
//!
//! Composite nodes refer to their children by [`NodeId`], so a field may
//! point back at one of its ancestors. Such documents are representable
//! on purpose: the walkers in [`crate::depth`] and [`crate::shape`] must
//! reject them with [`ShapeError::CycleDetected`] instead of looping.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::depth::DEFAULT_MAX_DEPTH;
use crate::error::ShapeError;

/// Handle of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<NodeId>),
    Object(BTreeMap<String, NodeId>),
}

/// Runtime type of a node, as reported in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(self, Self::Array | Self::Object)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A JSON-like tree stored in an arena.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document whose root is an empty object.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Object(BTreeMap::new())],
            root: NodeId(0),
        }
    }

    /// Import a `serde_json` value. The result is always acyclic.
    pub fn from_json(value: &Value) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.add_value(value);
        doc
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_json(&value))
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { doc: self, id: self.root }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) -> Result<(), ShapeError> {
        self.check_id(id)?;
        self.root = id;
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.0 < self.nodes.len()).then_some(NodeRef { doc: self, id })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn add_object(&mut self) -> NodeId {
        self.alloc(Node::Object(BTreeMap::new()))
    }

    pub fn add_array(&mut self) -> NodeId {
        self.alloc(Node::Array(Vec::new()))
    }

    /// Copy `value` into the arena and return the id of its top node.
    pub fn add_value(&mut self, value: &Value) -> NodeId {
        let top = self.alloc(shell(value));
        let mut pending = vec![(value, top)];

        while let Some((value, id)) = pending.pop() {
            match value {
                Value::Array(items) => {
                    for item in items {
                        let child = self.alloc(shell(item));
                        if let Node::Array(children) = &mut self.nodes[id.0] {
                            children.push(child);
                        }
                        pending.push((item, child));
                    }
                }
                Value::Object(map) => {
                    for (key, item) in map {
                        let child = self.alloc(shell(item));
                        if let Node::Object(children) = &mut self.nodes[id.0] {
                            children.insert(key.clone(), child);
                        }
                        pending.push((item, child));
                    }
                }
                _ => {}
            }
        }

        top
    }

    /// Point field `key` of object `parent` at `child`, replacing any
    /// previous value. `child` may be an ancestor of `parent`.
    pub fn set(
        &mut self,
        parent: NodeId,
        key: impl Into<String>,
        child: NodeId,
    ) -> Result<(), ShapeError> {
        self.check_id(child)?;
        self.check_id(parent)?;
        match &mut self.nodes[parent.0] {
            Node::Object(children) => {
                children.insert(key.into(), child);
                Ok(())
            }
            _ => Err(ShapeError::InvalidArgument(format!(
                "node {} is not an object",
                parent.0
            ))),
        }
    }

    /// Append `child` to array `parent`.
    pub fn push(&mut self, parent: NodeId, child: NodeId) -> Result<(), ShapeError> {
        self.check_id(child)?;
        self.check_id(parent)?;
        match &mut self.nodes[parent.0] {
            Node::Array(children) => {
                children.push(child);
                Ok(())
            }
            _ => Err(ShapeError::InvalidArgument(format!(
                "node {} is not an array",
                parent.0
            ))),
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn check_id(&self, id: NodeId) -> Result<(), ShapeError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(ShapeError::InvalidArgument(format!(
                "node {} does not belong to this document",
                id.0
            )))
        }
    }
}

fn shell(value: &Value) -> Node {
    match value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Bool(*b),
        Value::Number(n) => Node::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => Node::String(s.clone()),
        Value::Array(_) => Node::Array(Vec::new()),
        Value::Object(_) => Node::Object(BTreeMap::new()),
    }
}

/// Borrowed view of one node of a [`Document`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(self) -> NodeId {
        self.id
    }

    fn node(self) -> &'a Node {
        &self.doc.nodes[self.id.0]
    }

    pub fn kind(self) -> NodeKind {
        match self.node() {
            Node::Null => NodeKind::Null,
            Node::Bool(_) => NodeKind::Bool,
            Node::Number(_) => NodeKind::Number,
            Node::String(_) => NodeKind::String,
            Node::Array(_) => NodeKind::Array,
            Node::Object(_) => NodeKind::Object,
        }
    }

    pub fn is_null(self) -> bool {
        matches!(self.node(), Node::Null)
    }

    pub fn is_object(self) -> bool {
        matches!(self.node(), Node::Object(_))
    }

    pub fn as_bool(self) -> Option<bool> {
        match self.node() {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(self) -> Option<f64> {
        match self.node() {
            Node::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(self) -> Option<&'a str> {
        match self.node() {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    /// Field `key` of an object. `None` for absent fields and non-objects.
    pub fn get(self, key: &str) -> Option<NodeRef<'a>> {
        match self.node() {
            Node::Object(children) => children.get(key).map(|&id| self.at(id)),
            _ => None,
        }
    }

    /// Number of direct children; zero for primitives.
    pub fn len(self) -> usize {
        match self.node() {
            Node::Array(children) => children.len(),
            Node::Object(children) => children.len(),
            _ => 0,
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Object keys in sorted order; empty for anything else.
    pub fn keys(self) -> impl Iterator<Item = &'a str> {
        let keys = match self.node() {
            Node::Object(children) => Some(children.keys().map(String::as_str)),
            _ => None,
        };
        keys.into_iter().flatten()
    }

    /// Enumerable fields: object keys, or array indices rendered as strings.
    pub fn entries(self) -> Vec<(String, NodeRef<'a>)> {
        match self.node() {
            Node::Object(children) => children
                .iter()
                .map(|(key, &id)| (key.clone(), self.at(id)))
                .collect(),
            Node::Array(children) => children
                .iter()
                .enumerate()
                .map(|(index, &id)| (index.to_string(), self.at(id)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Convert back to a `serde_json` value.
    pub fn to_json(self) -> Result<Value, ShapeError> {
        let mut ancestors = Vec::new();
        self.to_json_inner(&mut ancestors)
    }

    fn to_json_inner(self, ancestors: &mut Vec<NodeId>) -> Result<Value, ShapeError> {
        let value = match self.node() {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => number_to_json(*n),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(_) | Node::Object(_) => {
                if ancestors.contains(&self.id) {
                    return Err(ShapeError::CycleDetected {
                        depth: ancestors.len() + 1,
                    });
                }
                if ancestors.len() >= DEFAULT_MAX_DEPTH {
                    return Err(ShapeError::DepthLimitExceeded {
                        limit: DEFAULT_MAX_DEPTH,
                    });
                }
                ancestors.push(self.id);
                let converted = if self.is_object() {
                    let mut map = serde_json::Map::new();
                    for (key, child) in self.entries() {
                        map.insert(key, child.to_json_inner(ancestors)?);
                    }
                    Value::Object(map)
                } else {
                    let mut items = Vec::with_capacity(self.len());
                    for (_, child) in self.entries() {
                        items.push(child.to_json_inner(ancestors)?);
                    }
                    Value::Array(items)
                };
                ancestors.pop();
                converted
            }
        };
        Ok(value)
    }

    fn at(self, id: NodeId) -> NodeRef<'a> {
        NodeRef { doc: self.doc, id }
    }
}

fn is_negative_zero(n: f64) -> bool {
    n == 0.0 && n.is_sign_negative()
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 && !is_negative_zero(n) {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if is_negative_zero(n) {
        "-0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Short rendering used in diagnostics: primitives print their value,
/// composites print their kind and size so cyclic nodes stay printable.
impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Null => f.write_str("null"),
            Node::Bool(b) => write!(f, "{b}"),
            Node::Number(n) => f.write_str(&format_number(*n)),
            Node::String(s) => f.write_str(s),
            Node::Array(children) => write!(f, "array({})", children.len()),
            Node::Object(children) => write!(f, "object({})", children.len()),
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .finish()
    }
}

//! loam-par - AST Node Definitions
//!
//! This module contains the node representation produced by the parser.
//!
//! Nodes are reference-counted (`Rc<RefCell<Node>>`) so that aliases can
//! share their anchored node: mutating the target through one reference
//! is observable through every other. Cycles cannot occur because an
//! alias can only refer to an anchor whose body finished parsing.
//!
//! Mappings and sequences share one uniform shape, [`Aggregate`]: an
//! insertion-ordered map from string keys to child nodes. Sequences use
//! the decimal strings "0", "1", … as keys, which keeps every child
//! index-addressable, and carry a `sequence` origin flag so the two
//! shapes stay distinguishable when empty.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use indexmap::IndexMap;
use loam_util::Span;

/// Shared handle to a parsed node.
pub type NodeRef = Rc<RefCell<Node>>;

/// A parsed YAML node: a typed value plus the position of its first
/// token, and an optional retained custom tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub value: Value,
    pub span: Span,
    pub tag: Option<String>,
}

impl Node {
    /// Wraps a value into a shared node handle.
    pub fn new(value: Value, span: Span) -> NodeRef {
        Rc::new(RefCell::new(Node {
            value,
            span,
            tag: None,
        }))
    }

    /// A null node at the given position.
    pub fn null(span: Span) -> NodeRef {
        Self::new(Value::Null, span)
    }

    /// Wraps a value with a retained tag.
    pub fn tagged(value: Value, span: Span, tag: String) -> NodeRef {
        Rc::new(RefCell::new(Node {
            value,
            span,
            tag: Some(tag),
        }))
    }
}

/// The typed value of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// String scalar (escape decoding already applied)
    Str(String),

    /// 64-bit signed integer scalar
    Int(i64),

    /// 64-bit IEEE float scalar
    Float(f64),

    /// Boolean scalar
    Bool(bool),

    /// Null scalar
    Null,

    /// Ordered mapping or sequence
    Aggregate(Aggregate),
}

impl Value {
    /// Returns the string content, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an integer scalar.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float content, if this is a float scalar.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a boolean scalar.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns true for the null scalar.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the aggregate, if this is a mapping or sequence.
    pub fn as_aggregate(&self) -> Option<&Aggregate> {
        match self {
            Value::Aggregate(agg) => Some(agg),
            _ => None,
        }
    }

    /// The scalar's textual form: identity for strings, canonical
    /// rendering for the other scalar kinds.
    ///
    /// Returns `None` for aggregates.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Int(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Bool(v) => Some(if *v { "true" } else { "false" }.to_string()),
            Value::Null => Some("null".to_string()),
            Value::Aggregate(_) => None,
        }
    }
}

/// The uniform ordered shape behind both mappings and sequences.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregate {
    entries: IndexMap<String, NodeRef>,
    sequence: bool,
}

impl Aggregate {
    /// An empty mapping-shaped aggregate.
    pub fn mapping() -> Self {
        Self {
            entries: IndexMap::new(),
            sequence: false,
        }
    }

    /// An empty sequence-shaped aggregate.
    pub fn sequence() -> Self {
        Self {
            entries: IndexMap::new(),
            sequence: true,
        }
    }

    /// True when this aggregate was built as a sequence.
    pub fn is_sequence(&self) -> bool {
        self.sequence
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Looks up a child by key.
    pub fn get(&self, key: &str) -> Option<&NodeRef> {
        self.entries.get(key)
    }

    /// Looks up a child by insertion index.
    pub fn get_index(&self, index: usize) -> Option<&NodeRef> {
        self.entries.get_index(index).map(|(_, node)| node)
    }

    /// Inserts a keyed entry, returning the previous node if the key was
    /// already present. Replacement keeps the original insertion slot.
    pub fn insert(&mut self, key: String, node: NodeRef) -> Option<NodeRef> {
        self.entries.insert(key, node)
    }

    /// Appends a sequence element under the next decimal index key.
    pub fn push(&mut self, node: NodeRef) {
        let key = self.entries.len().to_string();
        self.entries.insert(key, node);
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &NodeRef)> {
        self.entries.iter()
    }

    /// Iterates child nodes in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &NodeRef> {
        self.entries.values()
    }
}

/// Renders a node as a mapping key, for complex (`? key`) entries:
/// scalars by their textual form, mappings as `{k: v, …}`, sequences as
/// `[v, …]`.
pub fn stringify(node: &NodeRef) -> String {
    let node = node.borrow();
    match &node.value {
        Value::Aggregate(agg) if agg.is_sequence() => {
            let mut out = String::from("[");
            for (i, child) in agg.values().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&stringify(child));
            }
            out.push(']');
            out
        }
        Value::Aggregate(agg) => {
            let mut out = String::from("{");
            for (i, (key, child)) in agg.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{}: {}", key, stringify(child));
            }
            out.push('}');
            out
        }
        other => other.scalar_text().expect("scalar kinds always render"),
    }
}

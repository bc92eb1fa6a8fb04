//! loam-bind - Typed binding from parsed YAML
//!
//! The binder populates a caller's typed structure from a parsed
//! document. Scalar receivers accept only coercions that never silently
//! lose information: signed to unsigned requires a non-negative in-range
//! value, integer to float must round-trip, and a string is never
//! re-parsed into a number - a value is numeric only when the YAML token
//! already was.
//!
//! Containers: `Option<T>` treats null as `None`, `Vec<T>` grows,
//! `[T; N]` truncates excess input, `IndexMap<String, T>` takes
//! mappings, and [`loam_par::Value`] is the generic receiver that
//! accepts anything.
//!
//! Struct receivers go through a per-type field table (see [`fields`]),
//! declared with the [`bind_fields!`] macro, with exact-name lookup
//! first and a case-insensitive fallback second. The tables are cached
//! process-wide behind a read-mostly lock.

pub mod fields;

use indexmap::IndexMap;
use loam_par::Value;
use loam_util::ReadError;
use thiserror::Error;

pub use fields::{bind_struct_fields, BindStruct, FieldDef};
pub use loam_par::NodeRef;

/// What to do with a mapping key that matches no field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    /// Skip it silently.
    #[default]
    Ignore,
    /// Report [`BindError::UnknownField`].
    Error,
}

/// Binder configuration, threaded through every [`Bind`] call.
#[derive(Clone, Copy, Debug, Default)]
pub struct BindOptions {
    pub unknown_fields: UnknownFieldPolicy,
}

/// Error type for typed binding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// Receiver and node shapes disagree
    #[error("type mismatch at line {line}, column {column}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
        line: u32,
        column: u32,
    },

    /// A numeric value that does not fit the receiver
    #[error("value out of range at line {line}, column {column}: {detail}")]
    OutOfRange {
        detail: String,
        line: u32,
        column: u32,
    },

    /// A mapping key with no matching field (policy: error)
    #[error("unknown field '{field}' at line {line}, column {column}")]
    UnknownField {
        field: String,
        line: u32,
        column: u32,
    },

    /// The underlying parse failed
    #[error(transparent)]
    Read(#[from] ReadError),
}

/// Result type alias for binding operations
pub type BindResult<T> = std::result::Result<T, BindError>;

/// A receiver that can be populated from a parsed node.
pub trait Bind: Sized {
    fn bind(node: &NodeRef, options: &BindOptions) -> BindResult<Self>;
}

/// Binds a parsed node with default options.
pub fn from_node<T: Bind>(node: &NodeRef) -> BindResult<T> {
    T::bind(node, &BindOptions::default())
}

/// Parses a buffer and binds its single document - the typed fast path.
pub fn from_str<T: Bind>(source: &str) -> BindResult<T> {
    from_str_with(source, &BindOptions::default())
}

/// Parses a buffer and binds its single document with explicit options.
pub fn from_str_with<T: Bind>(source: &str, options: &BindOptions) -> BindResult<T> {
    let root = loam_par::parse_document(source)?;
    T::bind(&root, options)
}

// ----------------------------------------------------------------------
// Error helpers (shared with the fields module)
// ----------------------------------------------------------------------

/// Human name of a node's shape, for error messages.
pub(crate) fn found_kind(node: &NodeRef) -> &'static str {
    match &node.borrow().value {
        Value::Str(_) => "string",
        Value::Int(_) => "integer",
        Value::Float(_) => "float",
        Value::Bool(_) => "boolean",
        Value::Null => "null",
        Value::Aggregate(agg) if agg.is_sequence() => "sequence",
        Value::Aggregate(_) => "mapping",
    }
}

pub(crate) fn mismatch(expected: &'static str, node: &NodeRef) -> BindError {
    let span = node.borrow().span;
    BindError::TypeMismatch {
        expected,
        found: found_kind(node),
        line: span.line,
        column: span.column,
    }
}

fn out_of_range(detail: String, node: &NodeRef) -> BindError {
    let span = node.borrow().span;
    BindError::OutOfRange {
        detail,
        line: span.line,
        column: span.column,
    }
}

// ----------------------------------------------------------------------
// Scalar receivers
// ----------------------------------------------------------------------

impl Bind for String {
    fn bind(node: &NodeRef, _options: &BindOptions) -> BindResult<Self> {
        match &node.borrow().value {
            Value::Str(s) => Ok(s.clone()),
            _ => Err(mismatch("string", node)),
        }
    }
}

impl Bind for bool {
    fn bind(node: &NodeRef, _options: &BindOptions) -> BindResult<Self> {
        match &node.borrow().value {
            Value::Bool(b) => Ok(*b),
            _ => Err(mismatch("boolean", node)),
        }
    }
}

impl Bind for i64 {
    fn bind(node: &NodeRef, _options: &BindOptions) -> BindResult<Self> {
        match &node.borrow().value {
            Value::Int(v) => Ok(*v),
            _ => Err(mismatch("integer", node)),
        }
    }
}

impl Bind for i32 {
    fn bind(node: &NodeRef, options: &BindOptions) -> BindResult<Self> {
        let wide = i64::bind(node, options)?;
        i32::try_from(wide)
            .map_err(|_| out_of_range(format!("{} does not fit in i32", wide), node))
    }
}

impl Bind for u64 {
    fn bind(node: &NodeRef, options: &BindOptions) -> BindResult<Self> {
        let wide = i64::bind(node, options)?;
        u64::try_from(wide)
            .map_err(|_| out_of_range(format!("{} is negative", wide), node))
    }
}

impl Bind for u32 {
    fn bind(node: &NodeRef, options: &BindOptions) -> BindResult<Self> {
        let wide = i64::bind(node, options)?;
        u32::try_from(wide)
            .map_err(|_| out_of_range(format!("{} does not fit in u32", wide), node))
    }
}

impl Bind for f64 {
    fn bind(node: &NodeRef, _options: &BindOptions) -> BindResult<Self> {
        match &node.borrow().value {
            Value::Float(f) => Ok(*f),
            // Int widens only when the conversion is exact.
            Value::Int(v) => {
                let as_float = *v as f64;
                if as_float as i128 == *v as i128 {
                    Ok(as_float)
                } else {
                    Err(out_of_range(
                        format!("{} is not exactly representable as f64", v),
                        node,
                    ))
                }
            }
            _ => Err(mismatch("float", node)),
        }
    }
}

// ----------------------------------------------------------------------
// Container receivers
// ----------------------------------------------------------------------

impl<T: Bind> Bind for Option<T> {
    fn bind(node: &NodeRef, options: &BindOptions) -> BindResult<Self> {
        if node.borrow().value.is_null() {
            return Ok(None);
        }
        T::bind(node, options).map(Some)
    }
}

impl<T: Bind> Bind for Vec<T> {
    fn bind(node: &NodeRef, options: &BindOptions) -> BindResult<Self> {
        let children = sequence_children(node)?;
        let mut out = Vec::with_capacity(children.len());
        for child in &children {
            out.push(T::bind(child, options)?);
        }
        Ok(out)
    }
}

impl<T: Bind, const N: usize> Bind for [T; N] {
    fn bind(node: &NodeRef, options: &BindOptions) -> BindResult<Self> {
        let children = sequence_children(node)?;
        if children.len() < N {
            return Err(mismatch("sequence with enough elements", node));
        }
        // Fixed-capacity receivers truncate excess input.
        let mut out = Vec::with_capacity(N);
        for child in children.iter().take(N) {
            out.push(T::bind(child, options)?);
        }
        out.try_into()
            .map_err(|_| mismatch("sequence with enough elements", node))
    }
}

impl<T: Bind> Bind for IndexMap<String, T> {
    fn bind(node: &NodeRef, options: &BindOptions) -> BindResult<Self> {
        let node_ref = node.borrow();
        let aggregate = match &node_ref.value {
            Value::Aggregate(agg) if !agg.is_sequence() => agg,
            _ => return Err(mismatch("mapping", node)),
        };
        let mut out = IndexMap::with_capacity(aggregate.len());
        for (key, child) in aggregate.iter() {
            out.insert(key.clone(), T::bind(child, options)?);
        }
        Ok(out)
    }
}

/// The generic receiver: the node's native value, aggregates shared.
impl Bind for Value {
    fn bind(node: &NodeRef, _options: &BindOptions) -> BindResult<Self> {
        Ok(node.borrow().value.clone())
    }
}

fn sequence_children(node: &NodeRef) -> BindResult<Vec<NodeRef>> {
    let node_ref = node.borrow();
    match &node_ref.value {
        Value::Aggregate(agg) if agg.is_sequence() => {
            Ok(agg.values().map(NodeRef::clone).collect())
        }
        _ => Err(mismatch("sequence", node)),
    }
}

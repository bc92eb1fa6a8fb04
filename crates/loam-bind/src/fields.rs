//! Struct receivers: per-type field tables with a process-wide cache.
//!
//! A struct opts in by implementing [`BindStruct`] - almost always via
//! the [`bind_fields!`] macro - which exposes a table of field setters.
//! Binding walks the mapping's entries and dispatches each key through a
//! per-type index: exact name first, case-insensitive second; keys that
//! match neither follow the unknown-field policy.
//!
//! The index is built once per type and cached for the whole process in
//! a read-mostly table: concurrent readers share the lock, the rare
//! write (first bind of a type) is serialized.

use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use loam_par::Value;
use loam_util::FxHashMap;

use crate::{mismatch, BindError, BindOptions, BindResult, NodeRef, UnknownFieldPolicy};

/// One bindable field of a struct receiver.
pub struct FieldDef<T> {
    /// Field name as spelled in the YAML mapping.
    pub name: &'static str,

    /// Setter: binds the child node and stores it into the receiver.
    pub set: fn(&mut T, &NodeRef, &BindOptions) -> BindResult<()>,
}

/// A struct that can be populated field-by-field from a mapping.
///
/// Implement through [`bind_fields!`]; `Default` supplies the values of
/// fields the document does not mention.
pub trait BindStruct: Default + 'static {
    fn fields() -> &'static [FieldDef<Self>];
}

/// Per-type lookup index: exact names, then lowercase fallback.
struct FieldIndex {
    exact: FxHashMap<&'static str, usize>,
    folded: FxHashMap<String, usize>,
}

/// Process-wide cache of field indices, keyed by receiver type.
static FIELD_CACHE: OnceLock<RwLock<FxHashMap<TypeId, Arc<FieldIndex>>>> = OnceLock::new();

fn field_index<T: BindStruct>() -> Arc<FieldIndex> {
    let cache = FIELD_CACHE.get_or_init(|| RwLock::new(FxHashMap::default()));
    let key = TypeId::of::<T>();

    if let Some(index) = cache.read().get(&key) {
        return Arc::clone(index);
    }

    let mut exact = FxHashMap::default();
    let mut folded = FxHashMap::default();
    for (slot, field) in T::fields().iter().enumerate() {
        exact.insert(field.name, slot);
        folded.entry(field.name.to_ascii_lowercase()).or_insert(slot);
    }
    let index = Arc::new(FieldIndex { exact, folded });

    log::debug!(
        "caching field table for {} ({} fields)",
        std::any::type_name::<T>(),
        index.exact.len()
    );
    cache.write().insert(key, Arc::clone(&index));
    index
}

/// Populates a `Default`-initialized receiver from a mapping node.
pub fn bind_struct_fields<T: BindStruct>(
    node: &NodeRef,
    options: &BindOptions,
) -> BindResult<T> {
    let node_ref = node.borrow();
    let aggregate = match &node_ref.value {
        Value::Aggregate(agg) if !agg.is_sequence() => agg,
        _ => return Err(mismatch("mapping", node)),
    };

    let index = field_index::<T>();
    let fields = T::fields();
    let mut out = T::default();

    for (key, child) in aggregate.iter() {
        let slot = index.exact.get(key.as_str()).copied().or_else(|| {
            let fallback = index.folded.get(&key.to_ascii_lowercase()).copied();
            if fallback.is_some() {
                log::debug!("field '{}' matched case-insensitively", key);
            }
            fallback
        });

        match slot {
            Some(slot) => (fields[slot].set)(&mut out, child, options)?,
            None => match options.unknown_fields {
                UnknownFieldPolicy::Ignore => {}
                UnknownFieldPolicy::Error => {
                    let span = child.borrow().span;
                    return Err(BindError::UnknownField {
                        field: key.clone(),
                        line: span.line,
                        column: span.column,
                    });
                }
            },
        }
    }

    Ok(out)
}

/// Declares the bindable fields of a struct and derives [`crate::Bind`]
/// for it.
///
/// ```
/// use loam_bind::bind_fields;
///
/// #[derive(Default)]
/// struct Server {
///     host: String,
///     port: u32,
/// }
///
/// bind_fields!(Server { host, port });
///
/// let server: Server = loam_bind::from_str("host: example.com\nport: 80").unwrap();
/// assert_eq!(server.host, "example.com");
/// assert_eq!(server.port, 80);
/// ```
#[macro_export]
macro_rules! bind_fields {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::BindStruct for $ty {
            fn fields() -> &'static [$crate::FieldDef<Self>] {
                $(
                    fn $field(
                        target: &mut $ty,
                        node: &$crate::NodeRef,
                        options: &$crate::BindOptions,
                    ) -> $crate::BindResult<()> {
                        target.$field = $crate::Bind::bind(node, options)?;
                        Ok(())
                    }
                )+
                static FIELDS: &[$crate::FieldDef<$ty>] = &[
                    $($crate::FieldDef { name: stringify!($field), set: $field }),+
                ];
                FIELDS
            }
        }

        impl $crate::Bind for $ty {
            fn bind(
                node: &$crate::NodeRef,
                options: &$crate::BindOptions,
            ) -> $crate::BindResult<Self> {
                $crate::bind_struct_fields(node, options)
            }
        }
    };
}

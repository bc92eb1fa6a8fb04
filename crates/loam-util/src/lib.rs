//! loam-util - Core Utilities and Foundation Types
//!
//! Shared foundation for the loam YAML reader pipeline. The phase crates
//! (`loam-lex`, `loam-par`, `loam-bind`) all build on the types defined
//! here:
//!
//! - [`Span`] - source locations with byte offsets and 1-based line/column
//!   information, attached to every token and AST node.
//! - [`ReadError`] - the closed error taxonomy of the reader core. The
//!   first error aborts a parse and propagates to the caller; there is no
//!   in-core recovery.
//! - Fast hash maps re-exported from `rustc-hash`, used for the anchor
//!   table, the tag-handle table and the binder field indices.

pub mod error;
pub mod span;

pub use error::{ReadError, ReadResult};
pub use span::Span;

// Re-export commonly used types
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;

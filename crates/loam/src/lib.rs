//! loam - YAML reader facade
//!
//! ============================================================================
//! READER PIPELINE
//! ============================================================================
//!
//! ```text
//! UTF-8 buffer
//!      |
//!      v
//! [loam-lex]   cursor -> matcher lexer -> INDENT/DEDENT filter
//!      |
//!      v
//! [loam-par]   recursive descent -> shared-node tree
//!      |
//!      +--------------------------+
//!      v                          v
//! generic tree (NodeRef)     [loam-bind] typed receiver
//! ```
//!
//! This crate wires the phase crates together behind a small API:
//!
//! - [`parse_document`] / [`parse_stream`] return the generic tree,
//! - [`from_str`] populates a typed receiver directly from a buffer,
//! - [`from_reader`] feeds a complete buffer from any [`std::io::Read`]
//!   before parsing begins (no I/O happens mid-parse),
//! - [`LoaderOptions`] carries the closed configuration set: source
//!   mode, duplicate-key policy, unknown-field policy, tag-handle
//!   seeds (plus the indentation policy of the filter).
//!
//! A single parse runs to completion or to its first error; nothing is
//! shared between parses, and the tree belongs to the caller.

use std::io::Read;

use thiserror::Error;

pub use loam_bind::{
    bind_fields, bind_struct_fields, from_node, Bind, BindError, BindOptions, BindResult,
    BindStruct, FieldDef, UnknownFieldPolicy,
};
pub use loam_lex::{IndentPolicy, Token, TokenKind};
pub use loam_par::{
    stringify, Aggregate, DuplicateKeyPolicy, Node, NodeRef, Parser, ParserOptions, Value,
};
pub use loam_util::{ReadError, Span};

/// How the input buffer is gathered from a reader.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceMode {
    /// Read everything in one shot.
    #[default]
    Buffer,
    /// Read in fixed-size chunks (useful over slow pipes); parsing
    /// still starts only once the buffer is complete.
    Chunked,
}

/// The loader's closed configuration set.
#[derive(Clone, Debug, Default)]
pub struct LoaderOptions {
    /// Input gathering strategy for the reader entry points.
    pub source_mode: SourceMode,

    /// Duplicate-key handling (default: error).
    pub duplicate_keys: DuplicateKeyPolicy,

    /// Indentation policy (default: lenient).
    pub indent_policy: IndentPolicy,

    /// Unknown-field handling in the typed binder (default: ignore).
    pub unknown_fields: UnknownFieldPolicy,

    /// Tag-handle seeds layered over the per-document defaults.
    pub tag_handles: Vec<(String, String)>,
}

impl LoaderOptions {
    fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            duplicate_keys: self.duplicate_keys,
            indent_policy: self.indent_policy,
            tag_handles: self.tag_handles.clone(),
        }
    }

    fn bind_options(&self) -> BindOptions {
        BindOptions {
            unknown_fields: self.unknown_fields,
        }
    }
}

/// Error type of the facade entry points
#[derive(Debug, Error)]
pub enum LoadError {
    /// Lexing or parsing failed
    #[error(transparent)]
    Read(#[from] ReadError),

    /// Typed binding failed
    #[error(transparent)]
    Bind(#[from] BindError),

    /// The input could not be gathered
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for loader operations
pub type LoadResult<T> = std::result::Result<T, LoadError>;

// ----------------------------------------------------------------------
// Generic-tree entry points
// ----------------------------------------------------------------------

/// Parses a single document into the generic tree.
pub fn parse_document(source: &str) -> LoadResult<NodeRef> {
    parse_document_with(source, &LoaderOptions::default())
}

/// Parses a single document with explicit options.
pub fn parse_document_with(source: &str, options: &LoaderOptions) -> LoadResult<NodeRef> {
    let mut parser = Parser::with_options(source, options.parser_options())?;
    Ok(parser.parse_document()?)
}

/// Parses a multi-document stream into one root per document.
pub fn parse_stream(source: &str) -> LoadResult<Vec<NodeRef>> {
    parse_stream_with(source, &LoaderOptions::default())
}

/// Parses a multi-document stream with explicit options.
pub fn parse_stream_with(source: &str, options: &LoaderOptions) -> LoadResult<Vec<NodeRef>> {
    let mut parser = Parser::with_options(source, options.parser_options())?;
    Ok(parser.parse_stream()?)
}

/// Reads a complete buffer from `reader`, then parses one document.
pub fn parse_document_from_reader<R: Read>(
    reader: R,
    options: &LoaderOptions,
) -> LoadResult<NodeRef> {
    let buffer = gather(reader, options.source_mode)?;
    parse_document_with(&buffer, options)
}

// ----------------------------------------------------------------------
// Typed entry points
// ----------------------------------------------------------------------

/// Parses a buffer and populates a typed receiver.
///
/// On error the receiver was never produced; callers get no partially
/// populated value.
pub fn from_str<T: Bind>(source: &str) -> LoadResult<T> {
    from_str_with(source, &LoaderOptions::default())
}

/// Typed parse with explicit options.
pub fn from_str_with<T: Bind>(source: &str, options: &LoaderOptions) -> LoadResult<T> {
    let mut parser = Parser::with_options(source, options.parser_options())?;
    let root = parser.parse_document()?;
    Ok(T::bind(&root, &options.bind_options())?)
}

/// Reads a complete buffer from `reader`, then binds its document.
pub fn from_reader<T: Bind, R: Read>(reader: R) -> LoadResult<T> {
    from_reader_with(reader, &LoaderOptions::default())
}

/// Typed reader parse with explicit options.
pub fn from_reader_with<T: Bind, R: Read>(reader: R, options: &LoaderOptions) -> LoadResult<T> {
    let buffer = gather(reader, options.source_mode)?;
    from_str_with(&buffer, options)
}

/// Gathers the complete input buffer before any parsing starts.
fn gather<R: Read>(mut reader: R, mode: SourceMode) -> LoadResult<String> {
    let bytes = match mode {
        SourceMode::Buffer => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            bytes
        }
        SourceMode::Chunked => {
            let mut bytes = Vec::new();
            let mut chunk = [0u8; 8192];
            loop {
                let n = reader.read(&mut chunk)?;
                if n == 0 {
                    break;
                }
                bytes.extend_from_slice(&chunk[..n]);
            }
            bytes
        }
    };
    String::from_utf8(bytes).map_err(|e| {
        LoadError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

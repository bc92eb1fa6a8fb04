//! loam-par - Parser (Syntactic Analyzer)
//!
//! ============================================================================
//! PARSING MODEL
//! ============================================================================
//!
//! The parser is LL(1) recursive descent over the filtered token stream
//! from `loam-lex`, with a current/next token pair as lookahead. The
//! token-feeding layer drops whitespace and comment tokens, so "peek the
//! next significant token" is simply `self.next` - which is exactly what
//! the one disambiguation YAML needs: a string followed by `:` opens a
//! block mapping, any other string is a scalar.
//!
//! Dispatch is by current token kind:
//!
//! ```text
//! String  + Colon next  -> block mapping
//! String                -> scalar
//! Dash                  -> block sequence
//! Number/True/False/Null-> scalar
//! { / [                 -> flow mapping / flow sequence
//! &name / *name         -> anchored node / alias lookup
//! !tag                  -> tagged node
//! | / >                 -> block scalar with chomping
//! ? / <<                -> block mapping (complex key / merge)
//! ```
//!
//! Block structure arrives as synthetic INDENT/DEDENT tokens, so the
//! grammar here is context-free: a nested value is `Newline INDENT node
//! DEDENT`, and mapping/sequence loops simply stop at DEDENT.
//!
//! Anchors register only after their body finished parsing, which makes
//! alias cycles impossible; an alias returns the same shared node, never
//! a copy. Merge keys (`<<`) are collected during the mapping pass and
//! replayed at the end, latest merge first, inserting only keys the
//! mapping does not already have - which realizes the precedence rule
//! explicit > later merge > earlier merge.
//!
//! The anchor table, tag-handle table and version string reset at every
//! document boundary. The first error aborts the parse.

pub mod ast;

mod block;
mod directive;
mod edge_cases;
mod flow;
mod scalar;

use loam_lex::{IndentFilter, IndentPolicy, Token, TokenKind};
use loam_util::{FxHashMap, ReadError, ReadResult, Span};

pub use ast::{stringify, Aggregate, Node, NodeRef, Value};

// ============================================================================
// OPTIONS
// ============================================================================

/// What to do when a mapping key repeats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicateKeyPolicy {
    /// Report [`ReadError::DuplicateKey`].
    #[default]
    Error,
    /// Keep the first value and drop later ones.
    KeepFirst,
    /// Keep the last value, in the original insertion slot.
    KeepLast,
}

/// Parser configuration.
#[derive(Clone, Debug, Default)]
pub struct ParserOptions {
    /// Duplicate-key handling (default: error).
    pub duplicate_keys: DuplicateKeyPolicy,

    /// Indentation policy for the filter (default: lenient).
    pub indent_policy: IndentPolicy,

    /// Extra tag-handle seeds applied over the defaults at each document
    /// boundary, e.g. `("!!", "tag:example.com,2024:")`.
    pub tag_handles: Vec<(String, String)>,
}

// ============================================================================
// PARSER
// ============================================================================

/// Recursive descent parser over the indent-filtered token stream.
pub struct Parser<'a> {
    /// Filtered token source.
    filter: IndentFilter<'a>,

    /// Source text (BOM stripped), for plain-scalar reassembly.
    source: &'a str,

    /// Current token.
    current: Token<'a>,

    /// One-token lookahead.
    next: Token<'a>,

    /// Anchor table: name -> shared node. Reset per document.
    anchors: FxHashMap<String, NodeRef>,

    /// Tag-handle table: handle -> prefix. Reset per document.
    tag_handles: FxHashMap<String, String>,

    /// Version from the last %YAML directive (default "1.2").
    yaml_version: String,

    options: ParserOptions,
}

impl<'a> Parser<'a> {
    /// Creates a parser with default options.
    pub fn new(source: &'a str) -> ReadResult<Self> {
        Self::with_options(source, ParserOptions::default())
    }

    /// Creates a parser with explicit options.
    pub fn with_options(source: &'a str, options: ParserOptions) -> ReadResult<Self> {
        let mut filter = IndentFilter::with_policy(source, options.indent_policy);
        let current = Self::pump(&mut filter)?;
        let next = Self::pump(&mut filter)?;
        let source = filter.source();
        let mut parser = Self {
            filter,
            source,
            current,
            next,
            anchors: FxHashMap::default(),
            tag_handles: FxHashMap::default(),
            yaml_version: String::new(),
            options,
        };
        parser.reset_document_state();
        Ok(parser)
    }

    /// The version string from the last `%YAML` directive ("1.2" when
    /// none was seen).
    pub fn yaml_version(&self) -> &str {
        &self.yaml_version
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// Parses exactly one document and requires the input to end there.
    pub fn parse_document(&mut self) -> ReadResult<NodeRef> {
        self.reset_document_state();
        self.skip_newlines()?;
        self.parse_directives()?;
        if self.at(TokenKind::DocSep) {
            self.bump()?;
            self.skip_newlines()?;
        }

        let root = self.parse_body()?;

        self.skip_newlines()?;
        if self.at(TokenKind::DocEnd) {
            self.bump()?;
            self.skip_newlines()?;
        }
        if !self.at(TokenKind::Eof) {
            return Err(ReadError::ExtraContent {
                line: self.current.line,
                column: self.current.column,
            });
        }
        Ok(root)
    }

    /// Parses a stream of documents separated by `---`, optionally ended
    /// by `...`.
    pub fn parse_stream(&mut self) -> ReadResult<Vec<NodeRef>> {
        let mut documents = Vec::new();
        self.skip_newlines()?;
        if self.at(TokenKind::Eof) {
            return Ok(documents);
        }

        loop {
            self.reset_document_state();
            self.parse_directives()?;
            if self.at(TokenKind::DocSep) {
                self.bump()?;
                self.skip_newlines()?;
            }

            documents.push(self.parse_body()?);

            self.skip_newlines()?;
            if self.at(TokenKind::DocEnd) {
                self.bump()?;
                self.skip_newlines()?;
            }
            if self.at(TokenKind::Eof) {
                break;
            }
            if self.at(TokenKind::DocSep) || self.at(TokenKind::Directive) {
                continue;
            }
            return Err(ReadError::ExtraContent {
                line: self.current.line,
                column: self.current.column,
            });
        }
        Ok(documents)
    }

    /// Parses the document body; an absent body is a null document.
    fn parse_body(&mut self) -> ReadResult<NodeRef> {
        if matches!(
            self.current.kind,
            TokenKind::Eof | TokenKind::DocSep | TokenKind::DocEnd
        ) {
            return Ok(self.null_here());
        }
        self.parse_node()
    }

    // ------------------------------------------------------------------
    // Node dispatch
    // ------------------------------------------------------------------

    /// Parses a node in block context at a line start.
    pub(crate) fn parse_node(&mut self) -> ReadResult<NodeRef> {
        self.parse_node_inner(false)
    }

    /// Parses a node that begins mid-line, after `key:` or `-`.
    pub(crate) fn parse_value_inline(&mut self) -> ReadResult<NodeRef> {
        self.parse_node_inner(true)
    }

    fn parse_node_inner(&mut self, inline: bool) -> ReadResult<NodeRef> {
        match self.current.kind {
            kind if kind.is_string() => {
                if self.next.kind == TokenKind::Colon {
                    self.parse_block_mapping(inline)
                } else {
                    self.parse_scalar()
                }
            }
            TokenKind::Number | TokenKind::True | TokenKind::False | TokenKind::Null => {
                self.parse_scalar()
            }
            TokenKind::Dash => self.parse_block_sequence(),
            TokenKind::LBrace => self.parse_flow_mapping(),
            TokenKind::LBracket => self.parse_flow_sequence(),
            TokenKind::Anchor => self.parse_anchored(),
            TokenKind::Alias => self.parse_alias(),
            TokenKind::Tag => self.parse_tagged(),
            TokenKind::BlockLiteral | TokenKind::BlockFolded => self.parse_block_scalar(),
            TokenKind::Question | TokenKind::MergeKey => self.parse_block_mapping(inline),
            TokenKind::Indent => {
                self.bump()?;
                let node = self.parse_node_inner(false)?;
                self.skip_newlines()?;
                self.expect_dedent()?;
                Ok(node)
            }
            TokenKind::Eof | TokenKind::Dedent | TokenKind::DocSep | TokenKind::DocEnd => {
                Ok(self.null_here())
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Parses the value slot of a mapping entry or sequence element:
    /// either an inline value on the same logical line, or a newline
    /// followed by an indented body (whose DEDENT is consumed here), or
    /// nothing at all, which yields null.
    pub(crate) fn parse_entry_value(&mut self) -> ReadResult<NodeRef> {
        match self.current.kind {
            TokenKind::Newline => {
                if self.next.kind == TokenKind::Indent {
                    self.bump()?;
                    self.bump()?;
                    let node = self.parse_node()?;
                    self.skip_newlines()?;
                    self.expect_dedent()?;
                    Ok(node)
                } else {
                    // Value-less entry; the newline belongs to the caller.
                    Ok(self.null_here())
                }
            }
            TokenKind::Dedent | TokenKind::Eof | TokenKind::DocSep | TokenKind::DocEnd => {
                Ok(self.null_here())
            }
            _ => self.parse_value_inline(),
        }
    }

    /// Parses the value of a mapping entry. On top of the plain entry
    /// rules, a block sequence may sit at the same column as its key
    /// (`items:` followed by `- 1` lines without extra indent); a dash
    /// left of the key belongs to an enclosing sequence instead.
    pub(crate) fn parse_mapping_value(&mut self, key_column: u32) -> ReadResult<NodeRef> {
        if self.current.kind == TokenKind::Newline
            && self.next.kind == TokenKind::Dash
            && self.next.column >= key_column
        {
            self.bump()?;
            return self.parse_block_sequence();
        }
        self.parse_entry_value()
    }

    /// `&name value`: parses the body, then registers the anchor. The
    /// returned node IS the anchored node; no marker stays in the tree.
    fn parse_anchored(&mut self) -> ReadResult<NodeRef> {
        let anchor = self.bump()?;
        let name = &anchor.text[1..];
        let node = self.parse_entry_value()?;
        self.anchors.insert(name.to_string(), NodeRef::clone(&node));
        Ok(node)
    }

    /// `*name`: looks up the anchor table and shares the node.
    fn parse_alias(&mut self) -> ReadResult<NodeRef> {
        let alias = self.bump()?;
        let name = &alias.text[1..];
        match self.anchors.get(name) {
            Some(node) => Ok(NodeRef::clone(node)),
            None => Err(ReadError::UndefinedAlias {
                name: name.to_string(),
                line: alias.line,
                column: alias.column,
            }),
        }
    }

    /// `!tag value`: parses the body and applies the tag's coercion.
    fn parse_tagged(&mut self) -> ReadResult<NodeRef> {
        let tag = self.bump()?;
        let resolved = self.resolve_tag(tag.text);
        let node = self.parse_entry_value()?;
        self.apply_tag(node, &resolved, &tag)
    }

    // ------------------------------------------------------------------
    // Token plumbing
    // ------------------------------------------------------------------

    /// Pulls the next significant token (whitespace and comments are
    /// dropped here).
    fn pump(filter: &mut IndentFilter<'a>) -> ReadResult<Token<'a>> {
        loop {
            let token = filter.next_token()?;
            if !matches!(token.kind, TokenKind::Whitespace | TokenKind::Comment) {
                return Ok(token);
            }
        }
    }

    /// Consumes and returns the current token.
    pub(crate) fn bump(&mut self) -> ReadResult<Token<'a>> {
        let consumed = self.current;
        self.current = self.next;
        self.next = Self::pump(&mut self.filter)?;
        Ok(consumed)
    }

    /// True when the current token has the given kind.
    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    pub(crate) fn skip_newlines(&mut self) -> ReadResult<()> {
        while self.at(TokenKind::Newline) {
            self.bump()?;
        }
        Ok(())
    }

    pub(crate) fn expect_colon(&mut self) -> ReadResult<()> {
        if self.at(TokenKind::Colon) {
            self.bump()?;
            Ok(())
        } else {
            Err(ReadError::MissingColon {
                line: self.current.line,
                column: self.current.column,
            })
        }
    }

    pub(crate) fn expect_dedent(&mut self) -> ReadResult<()> {
        if self.at(TokenKind::Dedent) {
            self.bump()?;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// An UnexpectedToken error at the current token.
    pub(crate) fn unexpected(&self) -> ReadError {
        ReadError::UnexpectedToken {
            found: self.current.describe(),
            line: self.current.line,
            column: self.current.column,
        }
    }

    /// A null node at the current position.
    pub(crate) fn null_here(&self) -> NodeRef {
        Node::null(Span::new(
            self.current.offset,
            self.current.offset,
            self.current.line,
            self.current.column,
        ))
    }

    /// Registers document-scope defaults; called at document boundaries.
    fn reset_document_state(&mut self) {
        self.anchors.clear();
        self.tag_handles.clear();
        self.tag_handles.insert("!".to_string(), "!".to_string());
        self.tag_handles
            .insert("!!".to_string(), "tag:yaml.org,2002:".to_string());
        for (handle, prefix) in &self.options.tag_handles {
            self.tag_handles.insert(handle.clone(), prefix.clone());
        }
        self.yaml_version = "1.2".to_string();
    }

    pub(crate) fn duplicate_key_policy(&self) -> DuplicateKeyPolicy {
        self.options.duplicate_keys
    }

    pub(crate) fn tag_prefix(&self, handle: &str) -> Option<&str> {
        self.tag_handles.get(handle).map(String::as_str)
    }

    pub(crate) fn set_yaml_version(&mut self, version: String) {
        self.yaml_version = version;
    }

    pub(crate) fn register_tag_handle(&mut self, handle: String, prefix: String) {
        self.tag_handles.insert(handle, prefix);
    }
}

// ============================================================================
// CONVENIENCE ENTRY POINTS
// ============================================================================

/// Parses a single document with default options.
pub fn parse_document(source: &str) -> ReadResult<NodeRef> {
    Parser::new(source)?.parse_document()
}

/// Parses a multi-document stream with default options.
pub fn parse_stream(source: &str) -> ReadResult<Vec<NodeRef>> {
    Parser::new(source)?.parse_stream()
}

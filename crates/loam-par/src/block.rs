//! Block-style mappings and sequences.
//!
//! Entries accumulate until DEDENT, EOF, a document marker, or a
//! non-entry token. A mapping that begins mid-line (after `-` or a key)
//! owns the indent level its continuation lines open and consumes the
//! matching DEDENTs itself; a mapping that begins at a line start leaves
//! its terminating DEDENT to whoever consumed the INDENT.
//!
//! Merge keys are collected during the pass and replayed at the end,
//! latest first, inserting only absent keys: explicit keys beat every
//! merge, later merges beat earlier ones.

use loam_lex::{Token, TokenKind};
use loam_util::{ReadError, ReadResult};

use crate::ast::{Aggregate, Node, NodeRef, Value};
use crate::{DuplicateKeyPolicy, Parser};

impl<'a> Parser<'a> {
    /// Parses a block mapping. `inline` marks a mapping whose first key
    /// sits mid-line, e.g. after a sequence dash.
    pub(crate) fn parse_block_mapping(&mut self, inline: bool) -> ReadResult<NodeRef> {
        let span = self.current.span();
        let mut aggregate = Aggregate::mapping();
        let mut merges: Vec<NodeRef> = Vec::new();
        let mut absorbed = 0usize;

        loop {
            match self.current.kind {
                TokenKind::Newline => {
                    self.bump()?;
                }
                TokenKind::Indent if inline && absorbed == 0 => {
                    // Continuation lines of a mid-line mapping open one
                    // level; it belongs to this mapping.
                    self.bump()?;
                    absorbed = 1;
                }
                TokenKind::Dedent
                | TokenKind::Eof
                | TokenKind::DocSep
                | TokenKind::DocEnd => break,
                TokenKind::MergeKey => {
                    let merge = self.bump()?;
                    self.expect_colon()?;
                    let value = self.parse_mapping_value(merge.column)?;
                    collect_merges(value, &merge, &mut merges)?;
                }
                TokenKind::Question => {
                    let question = self.bump()?;
                    let key_node = if self.at(TokenKind::Newline) {
                        self.parse_entry_value()?
                    } else {
                        self.parse_key_node()?
                    };
                    self.skip_newlines()?;
                    self.expect_colon()?;
                    let value = self.parse_mapping_value(question.column)?;
                    let key = crate::ast::stringify(&key_node);
                    self.insert_entry(&mut aggregate, key, value, &question)?;
                }
                kind if kind.is_string() => {
                    let key_token = self.bump()?;
                    let key = self.decode_key(&key_token)?;
                    self.expect_colon()?;
                    let value = self.parse_mapping_value(key_token.column)?;
                    self.insert_entry(&mut aggregate, key, value, &key_token)?;
                }
                _ => break,
            }
        }

        for _ in 0..absorbed {
            self.expect_dedent()?;
        }

        apply_merges(&mut aggregate, merges);
        Ok(Node::new(Value::Aggregate(aggregate), span))
    }

    /// Parses a block sequence: a run of `-` entries.
    pub(crate) fn parse_block_sequence(&mut self) -> ReadResult<NodeRef> {
        let span = self.current.span();
        let mut aggregate = Aggregate::sequence();

        loop {
            match self.current.kind {
                TokenKind::Newline => {
                    self.bump()?;
                }
                TokenKind::Dash => {
                    self.bump()?;
                    let value = self.parse_entry_value()?;
                    aggregate.push(value);
                }
                _ => break,
            }
        }

        Ok(Node::new(Value::Aggregate(aggregate), span))
    }

    /// Parses a complex (`? …`) key body: scalars and flow collections;
    /// never a colon-introduced block mapping.
    fn parse_key_node(&mut self) -> ReadResult<NodeRef> {
        match self.current.kind {
            kind if kind.is_string() => self.parse_scalar(),
            TokenKind::Number | TokenKind::True | TokenKind::False | TokenKind::Null => {
                self.parse_scalar()
            }
            TokenKind::LBrace => self.parse_flow_mapping(),
            TokenKind::LBracket => self.parse_flow_sequence(),
            TokenKind::Alias => self.parse_alias(),
            _ => Err(self.unexpected()),
        }
    }

    /// Inserts one mapping entry, honoring the duplicate-key policy.
    pub(crate) fn insert_entry(
        &mut self,
        aggregate: &mut Aggregate,
        key: String,
        value: NodeRef,
        at: &Token<'a>,
    ) -> ReadResult<()> {
        if aggregate.contains_key(&key) {
            return match self.duplicate_key_policy() {
                DuplicateKeyPolicy::Error => Err(ReadError::DuplicateKey {
                    key,
                    line: at.line,
                    column: at.column,
                }),
                DuplicateKeyPolicy::KeepFirst => Ok(()),
                DuplicateKeyPolicy::KeepLast => {
                    aggregate.insert(key, value);
                    Ok(())
                }
            };
        }
        aggregate.insert(key, value);
        Ok(())
    }
}

/// Validates one `<<:` value and queues its mappings in declaration
/// order. A sequence contributes one merge per element.
fn collect_merges(
    value: NodeRef,
    at: &Token<'_>,
    merges: &mut Vec<NodeRef>,
) -> ReadResult<()> {
    enum Shape {
        Mapping,
        Sequence(Vec<NodeRef>),
        Other,
    }

    let shape = {
        let node = value.borrow();
        match &node.value {
            Value::Aggregate(agg) if !agg.is_sequence() => Shape::Mapping,
            Value::Aggregate(agg) => {
                Shape::Sequence(agg.values().map(NodeRef::clone).collect())
            }
            _ => Shape::Other,
        }
    };

    match shape {
        Shape::Mapping => {
            merges.push(value);
            Ok(())
        }
        Shape::Sequence(children) => {
            for child in children {
                let is_mapping = matches!(
                    &child.borrow().value,
                    Value::Aggregate(agg) if !agg.is_sequence()
                );
                if !is_mapping {
                    return Err(merge_shape_error(at));
                }
                merges.push(child);
            }
            Ok(())
        }
        Shape::Other => Err(merge_shape_error(at)),
    }
}

fn merge_shape_error(at: &Token<'_>) -> ReadError {
    ReadError::UnexpectedToken {
        found: "merge value that is not a mapping".to_string(),
        line: at.line,
        column: at.column,
    }
}

/// Replays collected merges latest-first, inserting only absent keys.
fn apply_merges(aggregate: &mut Aggregate, merges: Vec<NodeRef>) {
    for merge in merges.iter().rev() {
        let merge = merge.borrow();
        if let Value::Aggregate(source) = &merge.value {
            for (key, child) in source.iter() {
                if !aggregate.contains_key(key) {
                    aggregate.insert(key.clone(), NodeRef::clone(child));
                }
            }
        }
    }
}

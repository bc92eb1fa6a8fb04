//! Flow-style (`{…}` / `[…]`) mappings and sequences.
//!
//! Comma-separated, terminated by the matching close bracket. Keys in
//! flow mappings must be string tokens; a comma directly before the
//! closing bracket is a trailing-comma error; EOF before the close is
//! an unclosed-flow error. Newlines inside flow are insignificant (the
//! indent filter suspends itself while flow is open).

use loam_lex::{Token, TokenKind};
use loam_util::{ReadError, ReadResult};

use crate::ast::{Aggregate, Node, NodeRef, Value};
use crate::Parser;

impl<'a> Parser<'a> {
    /// Parses `{ key: value, … }`.
    pub(crate) fn parse_flow_mapping(&mut self) -> ReadResult<NodeRef> {
        let open = self.bump()?;
        let mut aggregate = Aggregate::mapping();

        self.skip_newlines()?;
        if self.at(TokenKind::RBrace) {
            self.bump()?;
            return Ok(Node::new(Value::Aggregate(aggregate), open.span()));
        }

        loop {
            self.skip_newlines()?;
            if self.at(TokenKind::Eof) {
                return Err(unclosed(&open));
            }
            if !self.current_is_string() {
                return Err(self.unexpected());
            }
            let key_token = self.bump()?;
            let key = self.decode_key(&key_token)?;

            self.skip_newlines()?;
            self.expect_colon()?;
            self.skip_newlines()?;

            let value = self.parse_flow_node(&open)?;
            self.insert_entry(&mut aggregate, key, value, &key_token)?;

            self.skip_newlines()?;
            match self.current.kind {
                TokenKind::Comma => {
                    let comma = self.bump()?;
                    self.skip_newlines()?;
                    if self.at(TokenKind::RBrace) {
                        return Err(trailing(&comma));
                    }
                }
                TokenKind::RBrace => {
                    self.bump()?;
                    break;
                }
                TokenKind::Eof => return Err(unclosed(&open)),
                _ => return Err(self.unexpected()),
            }
        }

        Ok(Node::new(Value::Aggregate(aggregate), open.span()))
    }

    /// Parses `[ value, … ]`.
    pub(crate) fn parse_flow_sequence(&mut self) -> ReadResult<NodeRef> {
        let open = self.bump()?;
        let mut aggregate = Aggregate::sequence();

        self.skip_newlines()?;
        if self.at(TokenKind::RBracket) {
            self.bump()?;
            return Ok(Node::new(Value::Aggregate(aggregate), open.span()));
        }

        loop {
            self.skip_newlines()?;
            let value = self.parse_flow_node(&open)?;
            aggregate.push(value);

            self.skip_newlines()?;
            match self.current.kind {
                TokenKind::Comma => {
                    let comma = self.bump()?;
                    self.skip_newlines()?;
                    if self.at(TokenKind::RBracket) {
                        return Err(trailing(&comma));
                    }
                }
                TokenKind::RBracket => {
                    self.bump()?;
                    break;
                }
                TokenKind::Eof => return Err(unclosed(&open)),
                _ => return Err(self.unexpected()),
            }
        }

        Ok(Node::new(Value::Aggregate(aggregate), open.span()))
    }

    /// Parses one value inside a flow collection. Block constructs
    /// (dashes, block scalars, colon-introduced mappings) are invalid
    /// here.
    fn parse_flow_node(&mut self, open: &Token<'a>) -> ReadResult<NodeRef> {
        match self.current.kind {
            kind if kind.is_string() => self.parse_scalar(),
            TokenKind::Number | TokenKind::True | TokenKind::False | TokenKind::Null => {
                self.parse_scalar()
            }
            TokenKind::LBrace => self.parse_flow_mapping(),
            TokenKind::LBracket => self.parse_flow_sequence(),
            TokenKind::Alias => self.parse_alias(),
            TokenKind::Anchor => {
                let anchor = self.bump()?;
                let name = &anchor.text[1..];
                let node = self.parse_flow_node(open)?;
                self.anchors.insert(name.to_string(), NodeRef::clone(&node));
                Ok(node)
            }
            TokenKind::Tag => {
                let tag = self.bump()?;
                let resolved = self.resolve_tag(tag.text);
                self.skip_newlines()?;
                let node = self.parse_flow_node(open)?;
                self.apply_tag(node, &resolved, &tag)
            }
            TokenKind::Eof => Err(unclosed(open)),
            _ => Err(self.unexpected()),
        }
    }

    fn current_is_string(&self) -> bool {
        self.current.kind.is_string()
    }
}

fn unclosed(open: &Token<'_>) -> ReadError {
    ReadError::UnclosedFlow {
        line: open.line,
        column: open.column,
    }
}

fn trailing(comma: &Token<'_>) -> ReadError {
    ReadError::TrailingComma {
        line: comma.line,
        column: comma.column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_document;

    fn get(node: &NodeRef, key: &str) -> NodeRef {
        let node = node.borrow();
        let agg = node.value.as_aggregate().expect("aggregate node");
        NodeRef::clone(agg.get(key).expect("key present"))
    }

    #[test]
    fn test_flow_mapping() {
        let root = parse_document("{x: 1, y: two, z: true}").unwrap();
        assert_eq!(get(&root, "x").borrow().value.as_int(), Some(1));
        assert_eq!(get(&root, "y").borrow().value.as_str(), Some("two"));
        assert_eq!(get(&root, "z").borrow().value.as_bool(), Some(true));
    }

    #[test]
    fn test_flow_sequence() {
        let root = parse_document("[1, 2.5, null]").unwrap();
        let root = root.borrow();
        let agg = root.value.as_aggregate().unwrap();
        assert!(agg.is_sequence());
        assert_eq!(agg.get("0").unwrap().borrow().value.as_int(), Some(1));
        assert_eq!(agg.get("1").unwrap().borrow().value.as_float(), Some(2.5));
        assert!(agg.get("2").unwrap().borrow().value.is_null());
    }

    #[test]
    fn test_empty_flow_collections() {
        let root = parse_document("{}").unwrap();
        let node = root.borrow();
        let agg = node.value.as_aggregate().unwrap();
        assert!(agg.is_empty());
        assert!(!agg.is_sequence());

        let root = parse_document("[]").unwrap();
        let node = root.borrow();
        let agg = node.value.as_aggregate().unwrap();
        assert!(agg.is_empty());
        assert!(agg.is_sequence());
    }

    #[test]
    fn test_nested_flow() {
        let root = parse_document("{outer: [1, {inner: 2}]}").unwrap();
        let outer = get(&root, "outer");
        let outer = outer.borrow();
        let seq = outer.value.as_aggregate().unwrap();
        let inner = seq.get("1").unwrap();
        assert_eq!(get(inner, "inner").borrow().value.as_int(), Some(2));
    }

    #[test]
    fn test_multiline_flow() {
        let root = parse_document("a: {x: 1,\n  y: 2}\nb: 3").unwrap();
        let a = get(&root, "a");
        assert_eq!(get(&a, "y").borrow().value.as_int(), Some(2));
        assert_eq!(get(&root, "b").borrow().value.as_int(), Some(3));
    }

    #[test]
    fn test_trailing_comma_rejected() {
        assert!(matches!(
            parse_document("[1, 2,]"),
            Err(ReadError::TrailingComma { .. })
        ));
        assert!(matches!(
            parse_document("{x: 1,}"),
            Err(ReadError::TrailingComma { .. })
        ));
    }

    #[test]
    fn test_unclosed_flow() {
        assert!(matches!(
            parse_document("[1, 2"),
            Err(ReadError::UnclosedFlow { .. })
        ));
        assert!(matches!(
            parse_document("{x: 1"),
            Err(ReadError::UnclosedFlow { .. })
        ));
        assert!(matches!(
            parse_document("["),
            Err(ReadError::UnclosedFlow { .. })
        ));
    }

    #[test]
    fn test_flow_key_must_be_string() {
        assert!(matches!(
            parse_document("{1: x}"),
            Err(ReadError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_flow_missing_colon() {
        assert!(matches!(
            parse_document("{x 1}"),
            Err(ReadError::MissingColon { .. })
        ));
    }

    #[test]
    fn test_block_constructs_invalid_in_flow() {
        assert!(matches!(
            parse_document("[- a]"),
            Err(ReadError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_anchor_inside_flow() {
        let root = parse_document("{a: &n 5, b: *n}").unwrap();
        let a = get(&root, "a");
        let b = get(&root, "b");
        assert!(NodeRef::ptr_eq(&a, &b));
        assert_eq!(a.borrow().value.as_int(), Some(5));
    }

    #[test]
    fn test_plain_scalar_with_spaces_in_flow() {
        let root = parse_document("[alpha beta, gamma]").unwrap();
        let root = root.borrow();
        let agg = root.value.as_aggregate().unwrap();
        assert_eq!(
            agg.get("0").unwrap().borrow().value.as_str(),
            Some("alpha beta")
        );
        assert_eq!(agg.get("1").unwrap().borrow().value.as_str(), Some("gamma"));
    }
}

//! Scalar semantics: value typing, escape decoding, number conversion,
//! block literal/folded assembly, and tag coercion.
//!
//! Without a tag, a single token decides the scalar's type: number
//! tokens become integers or floats, keyword tokens become booleans or
//! null, everything else is a string. Adjacent scalar-ish tokens on one
//! line are a single plain string, reassembled from the original source
//! so interior spacing survives. A tag overrides the lexer's
//! classification with its own coercion rules.

use loam_lex::{Token, TokenKind};
use loam_util::{ReadError, ReadResult};

use crate::ast::{Node, NodeRef, Value};
use crate::Parser;

/// Chomping mode of a block scalar header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Chomp {
    /// Default: exactly one trailing newline.
    Clip,
    /// `-`: no trailing newlines.
    Strip,
    /// `+`: keep every trailing newline.
    Keep,
}

impl<'a> Parser<'a> {
    /// Parses a scalar value starting at the current token.
    pub(crate) fn parse_scalar(&mut self) -> ReadResult<NodeRef> {
        let first = self.bump()?;

        // A plain scalar keeps absorbing scalar-ish tokens on its line:
        // `Alice Smith`, `v1 beta 2`. Reassemble from the source slice.
        if first.kind.is_scalarish() {
            let mut last = first;
            while self.current.kind.is_scalarish() && self.current.line == first.line {
                last = self.bump()?;
            }
            if last.offset != first.offset {
                let text = &self.source[first.offset..last.end_offset()];
                let span = first.span().to(last.span());
                return Ok(Node::new(Value::Str(text.to_string()), span));
            }
        }

        self.scalar_from_token(&first)
    }

    /// Converts a single scalar token into a typed node.
    fn scalar_from_token(&self, token: &Token<'a>) -> ReadResult<NodeRef> {
        let value = match token.kind {
            TokenKind::True => Value::Bool(true),
            TokenKind::False => Value::Bool(false),
            TokenKind::Null => Value::Null,
            TokenKind::StringPlain => Value::Str(token.text.to_string()),
            TokenKind::StringSingle => Value::Str(decode_single(token.text)),
            TokenKind::StringDouble => Value::Str(decode_double(token)?),
            TokenKind::Number => number_value(token)?,
            _ => {
                return Err(ReadError::UnexpectedToken {
                    found: token.describe(),
                    line: token.line,
                    column: token.column,
                })
            }
        };
        Ok(Node::new(value, token.span()))
    }

    /// Decodes a mapping key token to its string form.
    pub(crate) fn decode_key(&self, token: &Token<'a>) -> ReadResult<String> {
        match token.kind {
            TokenKind::StringPlain => Ok(token.text.to_string()),
            TokenKind::StringSingle => Ok(decode_single(token.text)),
            TokenKind::StringDouble => decode_double(token),
            _ => Err(ReadError::UnexpectedToken {
                found: token.describe(),
                line: token.line,
                column: token.column,
            }),
        }
    }

    /// Parses a `|` or `>` block scalar token into its string value.
    pub(crate) fn parse_block_scalar(&mut self) -> ReadResult<NodeRef> {
        let token = self.bump()?;
        let folded = token.kind == TokenKind::BlockFolded;

        let (header, body) = match token.text.find('\n') {
            Some(at) => (&token.text[..at], &token.text[at + 1..]),
            None => (token.text, ""),
        };
        let chomp = match header.as_bytes().get(1) {
            Some(b'-') => Chomp::Strip,
            Some(b'+') => Chomp::Keep,
            _ => Chomp::Clip,
        };

        let value = block_scalar_value(body, folded, chomp);
        Ok(Node::new(Value::Str(value), token.span()))
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Expands a tag token's text through the handle table: `!!suffix`
    /// and `!suffix` through their registered prefixes, `!<…>` verbatim.
    pub(crate) fn resolve_tag(&self, text: &str) -> String {
        if let Some(inner) = text.strip_prefix("!<") {
            return inner.strip_suffix('>').unwrap_or(inner).to_string();
        }
        if let Some(suffix) = text.strip_prefix("!!") {
            let prefix = self.tag_prefix("!!").unwrap_or("tag:yaml.org,2002:");
            return format!("{}{}", prefix, suffix);
        }
        let suffix = text.strip_prefix('!').unwrap_or(text);
        let prefix = self.tag_prefix("!").unwrap_or("!");
        format!("{}{}", prefix, suffix)
    }

    /// Applies a resolved tag: core-schema tags coerce (scalars) or
    /// validate shape (collections); anything else is retained as node
    /// metadata with the value passed through.
    pub(crate) fn apply_tag(
        &self,
        node: NodeRef,
        resolved: &str,
        token: &Token<'a>,
    ) -> ReadResult<NodeRef> {
        const CORE: &str = "tag:yaml.org,2002:";

        let bad = |reason: &str| ReadError::BadTagApplication {
            tag: token.text.to_string(),
            reason: reason.to_string(),
            line: token.line,
            column: token.column,
        };

        let kind = match resolved.strip_prefix(CORE) {
            Some(kind) => kind,
            None => return Ok(retag(&node, resolved)),
        };

        let span = node.borrow().span;
        let value = match kind {
            "str" => {
                let text = node
                    .borrow()
                    .value
                    .scalar_text()
                    .ok_or_else(|| bad("collections cannot be stringified"))?;
                Value::Str(text)
            }
            "int" => match &node.borrow().value {
                Value::Int(v) => Value::Int(*v),
                Value::Float(f) => {
                    let truncated = f.trunc();
                    if truncated.is_finite()
                        && truncated >= -(2f64.powi(63))
                        && truncated < 2f64.powi(63)
                    {
                        Value::Int(truncated as i64)
                    } else {
                        return Err(bad("float out of integer range"));
                    }
                }
                Value::Str(s) => match s.trim().parse::<i64>() {
                    Ok(v) => Value::Int(v),
                    Err(_) => return Err(bad("string is not a decimal integer")),
                },
                Value::Bool(b) => Value::Int(i64::from(*b)),
                Value::Null => Value::Int(0),
                Value::Aggregate(_) => return Err(bad("collections cannot become integers")),
            },
            "float" => match &node.borrow().value {
                Value::Float(f) => Value::Float(*f),
                Value::Int(v) => Value::Float(*v as f64),
                Value::Str(s) => match s.trim().parse::<f64>() {
                    Ok(v) => Value::Float(v),
                    Err(_) => return Err(bad("string is not a float")),
                },
                Value::Bool(b) => Value::Float(if *b { 1.0 } else { 0.0 }),
                Value::Null => Value::Float(0.0),
                Value::Aggregate(_) => return Err(bad("collections cannot become floats")),
            },
            "bool" => match &node.borrow().value {
                Value::Bool(b) => Value::Bool(*b),
                Value::Str(s) => {
                    if ["true", "yes", "on"].iter().any(|k| s.eq_ignore_ascii_case(k)) {
                        Value::Bool(true)
                    } else if ["false", "no", "off"].iter().any(|k| s.eq_ignore_ascii_case(k)) {
                        Value::Bool(false)
                    } else {
                        return Err(bad("string is not a boolean"));
                    }
                }
                Value::Int(v) => Value::Bool(*v != 0),
                Value::Float(f) => Value::Bool(*f != 0.0),
                Value::Null => Value::Bool(false),
                Value::Aggregate(_) => return Err(bad("collections cannot become booleans")),
            },
            "null" => Value::Null,
            "map" => {
                let ok = matches!(&node.borrow().value, Value::Aggregate(a) if !a.is_sequence());
                return if ok { Ok(node) } else { Err(bad("value is not a mapping")) };
            }
            "seq" => {
                let ok = matches!(&node.borrow().value, Value::Aggregate(a) if a.is_sequence());
                return if ok { Ok(node) } else { Err(bad("value is not a sequence")) };
            }
            _ => return Ok(retag(&node, resolved)),
        };

        Ok(Node::new(value, span))
    }
}

/// A fresh node sharing the value, with the tag retained as metadata.
fn retag(node: &NodeRef, resolved: &str) -> NodeRef {
    let inner = node.borrow();
    Node::tagged(inner.value.clone(), inner.span, resolved.to_string())
}

/// Converts a number token's text per the lexer grammar: hex and octal
/// with optional sign, decimal integers, and floats with fraction or
/// exponent. Overflow and malformed digits are InvalidNumber.
fn number_value(token: &Token<'_>) -> ReadResult<Value> {
    let text = token.text;
    let err = || ReadError::InvalidNumber {
        text: text.to_string(),
        line: token.line,
        column: token.column,
    };

    let (negative, magnitude) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let radix = if magnitude.starts_with("0x") || magnitude.starts_with("0X") {
        Some(16)
    } else if magnitude.starts_with("0o") || magnitude.starts_with("0O") {
        Some(8)
    } else {
        None
    };

    if let Some(radix) = radix {
        let digits = &magnitude[2..];
        let value = i128::from_str_radix(digits, radix).map_err(|_| err())?;
        let value = if negative { -value } else { value };
        let value = i64::try_from(value).map_err(|_| err())?;
        return Ok(Value::Int(value));
    }

    if magnitude.contains(['.', 'e', 'E']) {
        let value: f64 = text.parse().map_err(|_| err())?;
        return Ok(Value::Float(value));
    }

    let value: i64 = text.parse().map_err(|_| err())?;
    Ok(Value::Int(value))
}

/// Decodes a single-quoted token: strip the quotes, `''` becomes `'`.
fn decode_single(text: &str) -> String {
    text[1..text.len() - 1].replace("''", "'")
}

/// Decodes a double-quoted token's escapes. The lexer already validated
/// shape; code-point range is checked here.
fn decode_double(token: &Token<'_>) -> ReadResult<String> {
    let inner = &token.text[1..token.text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    let invalid = |escape: String| ReadError::InvalidEscape {
        escape,
        line: token.line,
        column: token.column,
    };

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escape = chars.next().ok_or_else(|| invalid("\\".to_string()))?;
        let decoded = match escape {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '0' => '\0',
            'a' => '\u{0007}',
            'v' => '\u{000B}',
            'e' => '\u{001B}',
            ' ' => ' ',
            'N' => '\u{0085}',
            '_' => '\u{00A0}',
            'L' => '\u{2028}',
            'P' => '\u{2029}',
            'u' => decode_codepoint(&mut chars, 4).ok_or_else(|| invalid("\\u".to_string()))?,
            'U' => decode_codepoint(&mut chars, 8).ok_or_else(|| invalid("\\U".to_string()))?,
            other => return Err(invalid(format!("\\{}", other))),
        };
        out.push(decoded);
    }

    Ok(out)
}

fn decode_codepoint(chars: &mut std::str::Chars<'_>, count: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..count {
        let digit = chars.next()?.to_digit(16)?;
        value = value * 16 + digit;
    }
    char::from_u32(value)
}

/// Assembles a block scalar's value from its raw body: strip the common
/// indent, join literally or fold, then chomp. A body with no non-blank
/// line is the empty string under every chomping mode.
fn block_scalar_value(body: &str, folded: bool, chomp: Chomp) -> String {
    let normalized = body.replace("\r\n", "\n").replace('\r', "\n");
    let terminated = normalized.ends_with('\n');
    let mut lines: Vec<&str> = normalized.split('\n').collect();
    if terminated {
        lines.pop();
    }

    if lines.iter().all(|line| line.trim().is_empty()) {
        return String::new();
    }

    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .next()
        .unwrap_or(0);

    let stripped: Vec<&str> = lines
        .iter()
        .map(|line| {
            let cut = line
                .bytes()
                .take(indent)
                .take_while(|b| *b == b' ' || *b == b'\t')
                .count();
            &line[cut..]
        })
        .collect();

    let joined = if folded {
        fold_lines(&stripped)
    } else {
        stripped.join("\n")
    };
    let core = joined.trim_end_matches('\n');

    match chomp {
        Chomp::Strip => core.to_string(),
        Chomp::Clip => format!("{}\n", core),
        Chomp::Keep => {
            let trailing_blank = lines
                .iter()
                .rev()
                .take_while(|line| line.trim().is_empty())
                .count();
            let newlines = (trailing_blank + usize::from(terminated)).max(1);
            format!("{}{}", core, "\n".repeat(newlines))
        }
    }
}

/// Folds lines: paragraphs of adjacent non-blank lines join with single
/// spaces, paragraphs join with newlines, and runs of three or more
/// newlines collapse to two.
fn fold_lines(lines: &[&str]) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines.iter().copied() {
        if line.trim().is_empty() {
            paragraphs.push(current.join(" "));
            current.clear();
        } else {
            current.push(line);
        }
    }
    paragraphs.push(current.join(" "));

    let mut joined = paragraphs.join("\n");
    while joined.contains("\n\n\n") {
        joined = joined.replace("\n\n\n", "\n\n");
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_document;

    fn scalar(source: &str) -> Value {
        parse_document(source).expect("valid scalar").borrow().value.clone()
    }

    fn get_value(root: &NodeRef, key: &str) -> Value {
        let root = root.borrow();
        let agg = root.value.as_aggregate().expect("mapping");
        let child = agg.get(key).expect("key present");
        let child = child.borrow();
        child.value.clone()
    }

    #[test]
    fn test_plain_scalar_types() {
        assert_eq!(scalar("hello"), Value::Str("hello".into()));
        assert_eq!(scalar("42"), Value::Int(42));
        assert_eq!(scalar("-17"), Value::Int(-17));
        assert_eq!(scalar("3.5"), Value::Float(3.5));
        assert_eq!(scalar("2.5e-3"), Value::Float(2.5e-3));
        assert_eq!(scalar("0xFF"), Value::Int(255));
        assert_eq!(scalar("-0x10"), Value::Int(-16));
        assert_eq!(scalar("0o777"), Value::Int(511));
        assert_eq!(scalar("true"), Value::Bool(true));
        assert_eq!(scalar("NO"), Value::Bool(false));
        assert_eq!(scalar("~"), Value::Null);
    }

    #[test]
    fn test_multi_token_plain_scalar() {
        assert_eq!(scalar("Alice Smith"), Value::Str("Alice Smith".into()));
        assert_eq!(scalar("v1 beta 2"), Value::Str("v1 beta 2".into()));
        let root = parse_document("name: Alice Smith\nage: 30").unwrap();
        assert_eq!(get_value(&root, "name"), Value::Str("Alice Smith".into()));
        assert_eq!(get_value(&root, "age"), Value::Int(30));
    }

    #[test]
    fn test_integer_overflow_is_invalid_number() {
        assert!(matches!(
            parse_document("9223372036854775808"),
            Err(ReadError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_document("0xFFFFFFFFFFFFFFFFFF"),
            Err(ReadError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_double_quoted_escapes() {
        assert_eq!(scalar("\"a\\nb\""), Value::Str("a\nb".into()));
        assert_eq!(scalar("\"\\t\\\\\\\"\""), Value::Str("\t\\\"".into()));
        assert_eq!(scalar("\"\\u0041\""), Value::Str("A".into()));
        assert_eq!(scalar("\"\\e\""), Value::Str("\u{1B}".into()));
        assert_eq!(scalar("\"\\N\\_\""), Value::Str("\u{85}\u{A0}".into()));
    }

    #[test]
    fn test_long_unicode_escape() {
        // "\U0001F600" is one astral code point.
        assert_eq!(scalar("\"\\U0001F600\""), Value::Str("\u{1F600}".into()));
    }

    #[test]
    fn test_surrogate_codepoint_rejected() {
        assert!(matches!(
            parse_document("\"\\uD800\""),
            Err(ReadError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn test_single_quoted() {
        assert_eq!(scalar("'it''s'"), Value::Str("it's".into()));
        assert_eq!(scalar("'no \\n escape'"), Value::Str("no \\n escape".into()));
    }

    #[test]
    fn test_block_literal_strip() {
        let root = parse_document("text: |-\n  Line1\n  Line2").unwrap();
        assert_eq!(get_value(&root, "text"), Value::Str("Line1\nLine2".into()));
    }

    #[test]
    fn test_block_literal_clip() {
        let root = parse_document("text: |\n  Line1\n  Line2\nnext: 1").unwrap();
        assert_eq!(get_value(&root, "text"), Value::Str("Line1\nLine2\n".into()));
        assert_eq!(get_value(&root, "next"), Value::Int(1));
    }

    #[test]
    fn test_block_literal_keep() {
        let root = parse_document("text: |+\n  Line1\n\n\nnext: 1").unwrap();
        assert_eq!(get_value(&root, "text"), Value::Str("Line1\n\n\n".into()));
    }

    #[test]
    fn test_block_literal_keeps_interior_punctuation() {
        let root = parse_document("text: |\n  a: b # not a comment\n").unwrap();
        assert_eq!(
            get_value(&root, "text"),
            Value::Str("a: b # not a comment\n".into())
        );
    }

    #[test]
    fn test_block_folded() {
        let root = parse_document("text: >\n  one\n  two\n\n  three\n").unwrap();
        assert_eq!(get_value(&root, "text"), Value::Str("one two\nthree\n".into()));
    }

    #[test]
    fn test_block_empty_body() {
        let root = parse_document("a: |+\nb: 1").unwrap();
        assert_eq!(get_value(&root, "a"), Value::Str(String::new()));
        let root = parse_document("a: |\nb: 1").unwrap();
        assert_eq!(get_value(&root, "a"), Value::Str(String::new()));
    }

    #[test]
    fn test_block_value_unit() {
        assert_eq!(block_scalar_value("  a\n", false, Chomp::Clip), "a\n");
        assert_eq!(block_scalar_value("  a", false, Chomp::Keep), "a\n");
        assert_eq!(block_scalar_value("  a\n\n", false, Chomp::Keep), "a\n\n");
        assert_eq!(block_scalar_value("  a\n  b\n", false, Chomp::Strip), "a\nb");
        assert_eq!(
            block_scalar_value("  a\n\n\n\n  b\n", true, Chomp::Clip),
            "a\n\nb\n"
        );
    }

    #[test]
    fn test_tag_int_coercions() {
        assert_eq!(scalar("!!int \"42\""), Value::Int(42));
        assert_eq!(scalar("!!int 3.9"), Value::Int(3));
        assert_eq!(scalar("!!int -3.9"), Value::Int(-3));
        assert_eq!(scalar("!!int true"), Value::Int(1));
        assert_eq!(scalar("!!int null"), Value::Int(0));
    }

    #[test]
    fn test_tag_str_coercions() {
        assert_eq!(scalar("!!str 42"), Value::Str("42".into()));
        assert_eq!(scalar("!!str true"), Value::Str("true".into()));
        assert_eq!(scalar("!!str null"), Value::Str("null".into()));
        assert_eq!(scalar("!!str 2.5"), Value::Str("2.5".into()));
    }

    #[test]
    fn test_tag_float_bool_null() {
        assert_eq!(scalar("!!float 2"), Value::Float(2.0));
        assert_eq!(scalar("!!float \"1e3\""), Value::Float(1000.0));
        assert_eq!(scalar("!!bool \"Yes\""), Value::Bool(true));
        assert_eq!(scalar("!!bool 0"), Value::Bool(false));
        assert_eq!(scalar("!!null whatever"), Value::Null);
    }

    #[test]
    fn test_tag_shape_checks() {
        assert!(parse_document("!!map {a: 1}").is_ok());
        assert!(parse_document("!!seq [1]").is_ok());
        assert!(matches!(
            parse_document("!!map [1]"),
            Err(ReadError::BadTagApplication { .. })
        ));
        assert!(matches!(
            parse_document("!!seq {a: 1}"),
            Err(ReadError::BadTagApplication { .. })
        ));
        assert!(matches!(
            parse_document("!!str [1]"),
            Err(ReadError::BadTagApplication { .. })
        ));
        assert!(matches!(
            parse_document("!!int \"x\""),
            Err(ReadError::BadTagApplication { .. })
        ));
        assert!(matches!(
            parse_document("!!bool \"maybe\""),
            Err(ReadError::BadTagApplication { .. })
        ));
    }

    #[test]
    fn test_custom_tag_retained_as_metadata() {
        let root = parse_document("!thing {a: 1}").unwrap();
        let root = root.borrow();
        assert_eq!(root.tag.as_deref(), Some("!thing"));
        assert!(root.value.as_aggregate().is_some());

        let root = parse_document("!<tag:example.com,2024:x> 5").unwrap();
        let root = root.borrow();
        assert_eq!(root.tag.as_deref(), Some("tag:example.com,2024:x"));
        assert_eq!(root.value.as_int(), Some(5));
    }
}

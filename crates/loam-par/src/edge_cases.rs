//! Edge case tests for loam-par

#[cfg(test)]
mod tests {
    use loam_util::ReadError;

    use crate::{parse_document, parse_stream, NodeRef, Value};

    fn get(node: &NodeRef, key: &str) -> NodeRef {
        let node = node.borrow();
        let agg = node.value.as_aggregate().expect("aggregate node");
        NodeRef::clone(agg.get(key).expect("key present"))
    }

    fn value(node: &NodeRef) -> Value {
        node.borrow().value.clone()
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_crlf_line_endings() {
        let root = parse_document("a: 1\r\nb:\r\n  c: 2\r\n").unwrap();
        assert_eq!(value(&get(&root, "a")), Value::Int(1));
        assert_eq!(value(&get(&get(&root, "b"), "c")), Value::Int(2));
    }

    #[test]
    fn test_edge_bom_then_document() {
        let root = parse_document("\u{feff}a: 1").unwrap();
        assert_eq!(value(&get(&root, "a")), Value::Int(1));
    }

    #[test]
    fn test_edge_comments_everywhere() {
        let source = "\
# leading comment\n\
a: 1 # trailing comment\n\
# between entries\n\
b: 2\n";
        let root = parse_document(source).unwrap();
        assert_eq!(value(&get(&root, "a")), Value::Int(1));
        assert_eq!(value(&get(&root, "b")), Value::Int(2));
    }

    #[test]
    fn test_edge_quoted_keys() {
        let root = parse_document("\"a b\": 1\n'c:d': 2").unwrap();
        assert_eq!(value(&get(&root, "a b")), Value::Int(1));
        assert_eq!(value(&get(&root, "c:d")), Value::Int(2));
    }

    #[test]
    fn test_edge_deeply_nested() {
        let mut source = String::new();
        for depth in 0..16 {
            source.push_str(&"  ".repeat(depth));
            source.push_str(&format!("k{}:\n", depth));
        }
        source.push_str(&"  ".repeat(16));
        source.push_str("leaf: done\n");

        let mut node = parse_document(&source).unwrap();
        for depth in 0..16 {
            node = get(&node, &format!("k{}", depth));
        }
        assert_eq!(value(&get(&node, "leaf")), Value::Str("done".into()));
    }

    #[test]
    fn test_edge_document_with_leading_blank_lines() {
        let root = parse_document("\n\n\na: 1").unwrap();
        assert_eq!(value(&get(&root, "a")), Value::Int(1));
    }

    #[test]
    fn test_edge_stream_with_empty_middle_document() {
        let docs = parse_stream("---\na: 1\n---\n---\nc: 3\n").unwrap();
        assert_eq!(docs.len(), 3);
        assert!(docs[1].borrow().value.is_null());
    }

    #[test]
    fn test_edge_stream_directives_after_doc_end() {
        let docs = parse_stream("---\na: 1\n...\n%YAML 1.2\n---\nb: 2\n").unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_edge_error_positions_are_1_based() {
        match parse_document("key: \"unterminated") {
            Err(ReadError::UnterminatedString { line, column }) => {
                assert_eq!(line, 1);
                assert_eq!(column, 6);
            }
            other => panic!("expected UnterminatedString, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_error_position_on_later_line() {
        match parse_document("a: 1\nb: [1, 2\n") {
            Err(ReadError::UnclosedFlow { line, column }) => {
                assert_eq!(line, 2);
                assert_eq!(column, 4);
            }
            other => panic!("expected UnclosedFlow, got {other:?}"),
        }
    }

    #[test]
    fn test_edge_plain_scalar_with_interior_specials() {
        let root = parse_document("url: http//host/path\nphone: 555-1234").unwrap();
        assert_eq!(value(&get(&root, "url")), Value::Str("http//host/path".into()));
        assert_eq!(value(&get(&root, "phone")), Value::Str("555-1234".into()));
    }

    #[test]
    fn test_edge_anchor_on_scalar() {
        let root = parse_document("a: &n 5\nb: *n").unwrap();
        assert!(NodeRef::ptr_eq(&get(&root, "a"), &get(&root, "b")));
    }

    #[test]
    fn test_edge_anchor_rebinding_keeps_latest() {
        let root = parse_document("a: &n 1\nb: &n 2\nc: *n").unwrap();
        assert_eq!(value(&get(&root, "c")), Value::Int(2));
    }

    #[test]
    fn test_edge_tag_on_nested_value() {
        let root = parse_document("a: !!str 42\nb: 42").unwrap();
        assert_eq!(value(&get(&root, "a")), Value::Str("42".into()));
        assert_eq!(value(&get(&root, "b")), Value::Int(42));
    }

    #[test]
    fn test_edge_indented_root_value() {
        let root = parse_document("---\n  a: 1\n").unwrap();
        assert_eq!(value(&get(&root, "a")), Value::Int(1));
    }

    #[test]
    fn test_edge_unicode_values() {
        let root = parse_document("greeting: héllo wörld\nemoji: \"\\U0001F600\"").unwrap();
        assert_eq!(
            value(&get(&root, "greeting")),
            Value::Str("héllo wörld".into())
        );
        assert_eq!(value(&get(&root, "emoji")), Value::Str("\u{1F600}".into()));
    }

    #[test]
    fn test_edge_scalar_document() {
        assert_eq!(value(&parse_document("42").unwrap()), Value::Int(42));
        assert_eq!(value(&parse_document("just text").unwrap()), Value::Str("just text".into()));
    }

    #[test]
    fn test_edge_booleans_round_trip_case() {
        for (text, expected) in [
            ("true", true),
            ("True", true),
            ("TRUE", true),
            ("yes", true),
            ("YES", true),
            ("on", true),
            ("ON", true),
            ("false", false),
            ("no", false),
            ("NO", false),
            ("off", false),
            ("OFF", false),
        ] {
            let root = parse_document(&format!("v: {}", text)).unwrap();
            assert_eq!(value(&get(&root, "v")), Value::Bool(expected), "{text}");
        }
    }
}

//! Edge case tests for loam-lex


#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use crate::{IndentFilter, Lexer, TokenKind};

    /// Builds a nested block mapping with one key per level and a numeric
    /// leaf, using two spaces per indent step.
    fn nested_doc(keys: &[String]) -> String {
        let mut out = String::new();
        for (depth, key) in keys.iter().enumerate() {
            out.push_str(&"  ".repeat(depth));
            out.push_str(key);
            out.push(':');
            if depth + 1 == keys.len() {
                out.push_str(" 1");
            }
            out.push('\n');
        }
        out
    }

    proptest! {
        #[test]
        fn prop_indent_dedent_balance(keys in prop::collection::vec("[a-z]{1,8}", 1..8)) {
            let source = nested_doc(&keys);
            let mut filter = IndentFilter::new(&source);
            let mut indents = 0usize;
            let mut dedents = 0usize;
            loop {
                let token = filter.next_token().expect("well-formed input");
                match token.kind {
                    TokenKind::Indent => indents += 1,
                    TokenKind::Dedent => dedents += 1,
                    TokenKind::Eof => break,
                    _ => {}
                }
            }
            prop_assert_eq!(indents, dedents);
        }

        #[test]
        fn prop_positions_monotone(keys in prop::collection::vec("[a-z]{1,8}", 1..8)) {
            let source = nested_doc(&keys);
            let mut lexer = Lexer::new(&source);
            let mut last = (0u32, 0u32);
            loop {
                let token = lexer.next_token().expect("well-formed input");
                if token.kind == TokenKind::Eof {
                    break;
                }
                prop_assert!(token.line >= last.0);
                if token.line == last.0 {
                    prop_assert!(token.column >= last.1);
                } else {
                    prop_assert!(token.line > last.0);
                }
                last = (token.line, token.column);
            }
        }
    }
}

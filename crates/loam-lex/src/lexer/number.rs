//! Number literal matching.
//!
//! Grammar: `[+-]? ( 0x HEX+ | 0o OCT+ | DIGITS ('.' DIGITS)?
//! ([eE][+-]? DIGITS)? )`. A fraction needs at least one post-dot digit
//! and an exponent at least one digit, and the whole match must be
//! word-bounded; anything else falls through to the plain-string
//! matcher. The token carries text only - conversion (and overflow
//! reporting) happens in the parser's scalar stage.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Attempts to match a number literal, restoring the cursor on failure.
    pub(crate) fn try_number(&mut self) -> Option<Token<'a>> {
        let snapshot = self.cursor.snapshot();

        if matches!(self.cursor.peek_byte(0), Some(b'+') | Some(b'-')) {
            self.cursor.advance();
        }

        let matched = if self.cursor.peek_byte(0) == Some(b'0')
            && matches!(self.cursor.peek_byte(1), Some(b'x') | Some(b'X'))
        {
            self.cursor.advance_bytes(2);
            self.scan_digits(16) > 0
        } else if self.cursor.peek_byte(0) == Some(b'0')
            && matches!(self.cursor.peek_byte(1), Some(b'o') | Some(b'O'))
        {
            self.cursor.advance_bytes(2);
            self.scan_digits(8) > 0
        } else {
            self.scan_decimal()
        };

        if matched && self.is_boundary(0) {
            Some(self.make(TokenKind::Number))
        } else {
            self.cursor.restore(snapshot);
            None
        }
    }

    /// Scans digits valid in `base`, returning how many were consumed.
    fn scan_digits(&mut self, base: u32) -> usize {
        let start = self.cursor.position();
        while let Some(b) = self.cursor.peek_byte(0) {
            if (b as char).is_digit(base) {
                self.cursor.advance();
            } else {
                break;
            }
        }
        self.cursor.position() - start
    }

    /// Scans `DIGITS ('.' DIGITS)? ([eE][+-]? DIGITS)?`.
    fn scan_decimal(&mut self) -> bool {
        if self.scan_digits(10) == 0 {
            return false;
        }

        if self.cursor.peek_byte(0) == Some(b'.') {
            if !matches!(self.cursor.peek_byte(1), Some(b) if b.is_ascii_digit()) {
                return false;
            }
            self.cursor.advance();
            self.scan_digits(10);
        }

        if matches!(self.cursor.peek_byte(0), Some(b'e') | Some(b'E')) {
            self.cursor.advance();
            if matches!(self.cursor.peek_byte(0), Some(b'+') | Some(b'-')) {
                self.cursor.advance();
            }
            if self.scan_digits(10) == 0 {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(source: &str) -> Token<'_> {
        Lexer::new(source).next_token().unwrap()
    }

    #[test]
    fn test_integer_forms() {
        for text in ["42", "0", "-17", "+5"] {
            let token = first(text);
            assert_eq!(token.kind, TokenKind::Number, "{text}");
            assert_eq!(token.text, text);
        }
    }

    #[test]
    fn test_hex_and_octal() {
        assert_eq!(first("0xFF").kind, TokenKind::Number);
        assert_eq!(first("0o777").kind, TokenKind::Number);
        assert_eq!(first("-0x10").kind, TokenKind::Number);
    }

    #[test]
    fn test_float_forms() {
        for text in ["3.14", "1e10", "2.5e-3", "-0.5", "1E+2"] {
            assert_eq!(first(text).kind, TokenKind::Number, "{text}");
        }
    }

    #[test]
    fn test_fraction_requires_digit() {
        // "1." is not a number; the plain matcher takes the whole run.
        let token = first("1.");
        assert_eq!(token.kind, TokenKind::StringPlain);
        assert_eq!(token.text, "1.");
    }

    #[test]
    fn test_exponent_requires_digit() {
        assert_eq!(first("1e").kind, TokenKind::StringPlain);
        assert_eq!(first("1e+").kind, TokenKind::StringPlain);
    }

    #[test]
    fn test_word_boundary_keeps_plain_runs_whole() {
        assert_eq!(first("1.2.3").text, "1.2.3");
        assert_eq!(first("555-1234").text, "555-1234");
        assert_eq!(first("0xZZ").kind, TokenKind::StringPlain);
    }

    #[test]
    fn test_bounded_by_flow_punctuation() {
        let mut lexer = Lexer::new("[1,2]");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::LBracket);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Number);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Comma);
    }
}

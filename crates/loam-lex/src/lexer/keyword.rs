//! Boolean and null keyword matching.
//!
//! Keywords are matched case-insensitively and must be word-bounded:
//! the byte after the word has to be a plain-scalar terminator, so
//! `true-ish` or `onward` fall through to the plain-string matcher.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Attempts to match `true`/`yes`/`on`, `false`/`no`/`off` or `null`.
    ///
    /// Restores the cursor and returns `None` when the word is not a
    /// keyword or is not word-bounded.
    pub(crate) fn try_keyword(&mut self) -> Option<Token<'a>> {
        let snapshot = self.cursor.snapshot();
        let start = self.cursor.position();

        while matches!(self.cursor.peek_byte(0), Some(b) if b.is_ascii_alphabetic()) {
            self.cursor.advance();
        }

        let word = self.cursor.slice_from(start);
        if word.is_empty() || !self.is_boundary(0) {
            self.cursor.restore(snapshot);
            return None;
        }

        let kind = if ["true", "yes", "on"]
            .iter()
            .any(|k| word.eq_ignore_ascii_case(k))
        {
            TokenKind::True
        } else if ["false", "no", "off"]
            .iter()
            .any(|k| word.eq_ignore_ascii_case(k))
        {
            TokenKind::False
        } else if word.eq_ignore_ascii_case("null") {
            TokenKind::Null
        } else {
            self.cursor.restore(snapshot);
            return None;
        };

        Some(self.make(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(source: &str) -> TokenKind {
        Lexer::new(source).next_token().unwrap().kind
    }

    #[test]
    fn test_all_boolean_spellings() {
        for word in ["true", "True", "TRUE", "yes", "Yes", "on", "On"] {
            assert_eq!(kind_of(word), TokenKind::True, "{word}");
        }
        for word in ["false", "False", "FALSE", "no", "No", "off", "Off"] {
            assert_eq!(kind_of(word), TokenKind::False, "{word}");
        }
    }

    #[test]
    fn test_null_spellings() {
        for word in ["null", "Null", "NULL"] {
            assert_eq!(kind_of(word), TokenKind::Null, "{word}");
        }
    }

    #[test]
    fn test_bounded_by_flow_punctuation() {
        let mut lexer = Lexer::new("true,");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::True);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Comma);
    }

    #[test]
    fn test_prefix_is_not_a_keyword() {
        assert_eq!(kind_of("trueblue"), TokenKind::StringPlain);
        assert_eq!(kind_of("nullable"), TokenKind::StringPlain);
    }
}

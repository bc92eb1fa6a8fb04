//! String literal lexing.
//!
//! Double-quoted strings validate their escape sequences here but are
//! not decoded: the token keeps the raw slice, quotes included, and the
//! parser's scalar stage performs the decoding. Single-quoted strings
//! know only the `''` escape and may span lines. Plain strings are the
//! catch-all matcher and are never decoded.

use loam_util::{ReadError, ReadResult};

use crate::lexer::PLAIN_TERMINATORS;
use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes a double-quoted string.
    ///
    /// Terminates at the first unescaped `"`. Raw control bytes below
    /// 0x20 (except tab) and EOF are unterminated-string errors; an
    /// unrecognized escape invalidates the token.
    pub(crate) fn lex_double(&mut self) -> ReadResult<Token<'a>> {
        self.cursor.advance();

        loop {
            if self.cursor.is_at_end() {
                return Err(self.unterminated_here());
            }
            match self.cursor.peek_byte(0) {
                Some(b'"') => {
                    self.cursor.advance();
                    break;
                }
                Some(b'\\') => self.check_escape()?,
                Some(b) if b < 0x20 && b != b'\t' => {
                    return Err(self.unterminated_here());
                }
                _ => self.cursor.advance(),
            }
        }

        Ok(self.make(TokenKind::StringDouble))
    }

    /// Validates one escape sequence, cursor on the backslash.
    fn check_escape(&mut self) -> ReadResult<()> {
        let line = self.cursor.line();
        let column = self.cursor.column();
        self.cursor.advance();

        if self.cursor.is_at_end() {
            return Err(self.unterminated_here());
        }

        let c = self.cursor.current_char();
        match c {
            '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | '0' | 'a' | 'v' | 'e' | ' '
            | 'N' | '_' | 'L' | 'P' => {
                self.cursor.advance();
                Ok(())
            }
            'u' => {
                self.cursor.advance();
                self.check_hex_digits(4, line, column)
            }
            'U' => {
                self.cursor.advance();
                self.check_hex_digits(8, line, column)
            }
            other => Err(ReadError::InvalidEscape {
                escape: format!("\\{}", other),
                line,
                column,
            }),
        }
    }

    /// Requires exactly `count` hex digits for `\uXXXX` / `\UXXXXXXXX`.
    fn check_hex_digits(&mut self, count: usize, line: u32, column: u32) -> ReadResult<()> {
        for _ in 0..count {
            match self.cursor.peek_byte(0) {
                Some(b) if b.is_ascii_hexdigit() => self.cursor.advance(),
                _ => {
                    return Err(ReadError::InvalidEscape {
                        escape: if count == 4 { "\\u".to_string() } else { "\\U".to_string() },
                        line,
                        column,
                    })
                }
            }
        }
        Ok(())
    }

    /// Lexes a single-quoted string; `''` decodes to `'` and newlines
    /// are legal inside.
    pub(crate) fn lex_single(&mut self) -> ReadResult<Token<'a>> {
        self.cursor.advance();

        loop {
            if self.cursor.is_at_end() {
                return Err(self.unterminated_here());
            }
            if self.cursor.peek_byte(0) == Some(b'\'') {
                if self.cursor.peek_byte(1) == Some(b'\'') {
                    self.cursor.advance_bytes(2);
                } else {
                    self.cursor.advance();
                    break;
                }
            } else {
                self.cursor.advance();
            }
        }

        Ok(self.make(TokenKind::StringSingle))
    }

    /// Lexes a plain (unquoted) scalar run.
    ///
    /// The dispatcher has already rejected the reserved first bytes;
    /// the run stops at a blank, newline or one of `: , # [ ] { }`.
    pub(crate) fn lex_plain(&mut self) -> Token<'a> {
        loop {
            match self.cursor.raw_byte(0) {
                None => break,
                Some(b) if PLAIN_TERMINATORS.contains(&b) => break,
                _ => self.cursor.advance(),
            }
        }
        self.make(TokenKind::StringPlain)
    }
}

//! Core lexer implementation.
//!
//! The lexer turns source text into a stream of [`Token`]s, one per call.
//! Matchers are tried in a fixed priority order; the ordering decisions
//! that matter:
//!
//! - `---` / `...` before `-` so document markers are not split,
//! - `<<` before `:` so merge keys are not split,
//! - boolean/null keywords before plain strings so reserved words are
//!   typed,
//! - numbers before `-` so `-17` is one token,
//! - plain strings are the catch-all, consuming only what every other
//!   matcher rejected.
//!
//! Keyword and number matchers are word-bounded: they only succeed when
//! followed by a plain-scalar terminator, so `true-ish` and `1.2.3` stay
//! plain strings. Whitespace, newlines and comments are real tokens here;
//! the indentation filter and the parser decide what to do with them.

mod keyword;
mod number;
mod sigil;
mod string;

use loam_util::{ReadError, ReadResult};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

/// Bytes that terminate a plain scalar (and bound keywords and numbers).
pub(crate) const PLAIN_TERMINATORS: &[u8] = b" \t\r\n:,#[]{}";

/// Lexer for YAML source text.
///
/// Produces one token per [`Lexer::next_token`] call; a token of kind
/// [`TokenKind::Eof`] signals exhaustion. A UTF-8 byte order mark at
/// offset 0 is skipped on construction.
pub struct Lexer<'a> {
    /// Character cursor for source traversal.
    pub(crate) cursor: Cursor<'a>,

    /// Starting byte offset of the current token.
    token_start: usize,

    /// Line where the current token starts (1-based).
    token_line: u32,

    /// Column where the current token starts (1-based).
    token_column: u32,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            cursor: Cursor::new(source),
            token_start: 0,
            token_line: 1,
            token_column: 1,
        }
    }

    /// The full source text being lexed (BOM already stripped).
    pub fn source(&self) -> &'a str {
        self.cursor.source()
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> ReadResult<Token<'a>> {
        self.token_start = self.cursor.position();
        self.token_line = self.cursor.line();
        self.token_column = self.cursor.column();

        let first = match self.cursor.raw_byte(0) {
            None => return Ok(self.make(TokenKind::Eof)),
            Some(b) => b,
        };

        match first {
            b'-' => {
                if self.cursor.starts_with("---") && self.marker_bounded(3) {
                    self.cursor.advance_bytes(3);
                    return Ok(self.make(TokenKind::DocSep));
                }
                if let Some(token) = self.try_number() {
                    return Ok(token);
                }
                self.cursor.advance();
                Ok(self.make(TokenKind::Dash))
            }
            b'.' => {
                if self.cursor.starts_with("...") && self.marker_bounded(3) {
                    self.cursor.advance_bytes(3);
                    return Ok(self.make(TokenKind::DocEnd));
                }
                Ok(self.lex_plain())
            }
            b'<' => {
                if self.cursor.starts_with("<<") {
                    self.cursor.advance_bytes(2);
                    return Ok(self.make(TokenKind::MergeKey));
                }
                Ok(self.lex_plain())
            }
            b'~' => {
                if self.is_boundary(1) {
                    self.cursor.advance();
                    return Ok(self.make(TokenKind::Null));
                }
                Ok(self.lex_plain())
            }
            b if b.is_ascii_alphabetic() => {
                if let Some(token) = self.try_keyword() {
                    return Ok(token);
                }
                Ok(self.lex_plain())
            }
            b'+' | b'0'..=b'9' => {
                if let Some(token) = self.try_number() {
                    return Ok(token);
                }
                Ok(self.lex_plain())
            }
            b':' => Ok(self.single(TokenKind::Colon)),
            b',' => Ok(self.single(TokenKind::Comma)),
            b'?' => Ok(self.single(TokenKind::Question)),
            b'{' => Ok(self.single(TokenKind::LBrace)),
            b'}' => Ok(self.single(TokenKind::RBrace)),
            b'[' => Ok(self.single(TokenKind::LBracket)),
            b']' => Ok(self.single(TokenKind::RBracket)),
            b'|' => self.lex_block_scalar(TokenKind::BlockLiteral),
            b'>' => self.lex_block_scalar(TokenKind::BlockFolded),
            b'&' => self.lex_name_sigil(TokenKind::Anchor),
            b'*' => self.lex_name_sigil(TokenKind::Alias),
            b'!' => self.lex_tag(),
            b'%' => Ok(self.lex_to_eol(TokenKind::Directive)),
            b'#' => Ok(self.lex_to_eol(TokenKind::Comment)),
            b'"' => self.lex_double(),
            b'\'' => self.lex_single(),
            b'\n' | b'\r' => Ok(self.lex_newline()),
            b' ' | b'\t' => Ok(self.lex_whitespace()),
            b'@' | b'`' => Err(self.unexpected_here(format!("'{}'", first as char))),
            _ => Ok(self.lex_plain()),
        }
    }

    // ------------------------------------------------------------------
    // Small matchers
    // ------------------------------------------------------------------

    fn lex_newline(&mut self) -> Token<'a> {
        if self.cursor.peek_byte(0) == Some(b'\r') {
            self.cursor.advance();
            if self.cursor.peek_byte(0) == Some(b'\n') {
                self.cursor.advance();
            }
        } else {
            self.cursor.advance();
        }
        self.make(TokenKind::Newline)
    }

    fn lex_whitespace(&mut self) -> Token<'a> {
        while matches!(self.cursor.peek_byte(0), Some(b' ') | Some(b'\t')) {
            self.cursor.advance();
        }
        self.make(TokenKind::Whitespace)
    }

    /// Consumes one byte and produces a token of the given kind.
    fn single(&mut self, kind: TokenKind) -> Token<'a> {
        self.cursor.advance();
        self.make(kind)
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    /// Builds a token of `kind` covering everything consumed since the
    /// start of the current `next_token` call.
    pub(crate) fn make(&self, kind: TokenKind) -> Token<'a> {
        Token {
            kind,
            text: self.cursor.slice_from(self.token_start),
            offset: self.token_start,
            line: self.token_line,
            column: self.token_column,
        }
    }

    /// True when the byte at `offset` ends a word: EOF or a plain-scalar
    /// terminator.
    pub(crate) fn is_boundary(&self, offset: usize) -> bool {
        match self.cursor.raw_byte(offset) {
            None => true,
            Some(b) => PLAIN_TERMINATORS.contains(&b),
        }
    }

    /// True when the byte at `offset` allows a `---`/`...` marker: EOF,
    /// blank, or newline.
    fn marker_bounded(&self, offset: usize) -> bool {
        matches!(
            self.cursor.raw_byte(offset),
            None | Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n')
        )
    }

    /// An UnexpectedToken error at the current token start.
    pub(crate) fn unexpected_here(&self, found: String) -> ReadError {
        ReadError::UnexpectedToken {
            found,
            line: self.token_line,
            column: self.token_column,
        }
    }

    /// An UnterminatedString error at the current token start.
    pub(crate) fn unterminated_here(&self) -> ReadError {
        ReadError::UnterminatedString {
            line: self.token_line,
            column: self.token_column,
        }
    }
}

//! Anchors, aliases, tags, line-consuming tokens and block scalars.
//!
//! Anchor/alias/tag names use the charset `[A-Za-z0-9_-]`; an empty name
//! makes no token and surfaces as an unexpected-token error. Block
//! scalar matchers capture the whole raw indented block into one token,
//! so content lines are never re-tokenized and `#` or `:` inside a
//! literal stay inert.

use loam_util::ReadResult;

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes `&name` or `*name`.
    pub(crate) fn lex_name_sigil(&mut self, kind: TokenKind) -> ReadResult<Token<'a>> {
        let sigil = self.cursor.current_char();
        self.cursor.advance();

        if self.scan_name() == 0 {
            return Err(self.unexpected_here(format!("'{}' with no name", sigil)));
        }

        Ok(self.make(kind))
    }

    /// Lexes `!name`, `!!name` or `!<verbatim>`.
    pub(crate) fn lex_tag(&mut self) -> ReadResult<Token<'a>> {
        self.cursor.advance();

        if self.cursor.peek_byte(0) == Some(b'<') {
            self.cursor.advance();
            loop {
                if self.cursor.is_at_end() {
                    return Err(self.unexpected_here("unterminated verbatim tag".to_string()));
                }
                if self.cursor.peek_byte(0) == Some(b'>') {
                    self.cursor.advance();
                    break;
                }
                self.cursor.advance();
            }
            return Ok(self.make(TokenKind::Tag));
        }

        if self.cursor.peek_byte(0) == Some(b'!') {
            self.cursor.advance();
        }

        if self.scan_name() == 0 {
            return Err(self.unexpected_here("'!' with no tag name".to_string()));
        }

        Ok(self.make(TokenKind::Tag))
    }

    /// Consumes a run of name characters, returning how many.
    fn scan_name(&mut self) -> usize {
        let start = self.cursor.position();
        while matches!(
            self.cursor.peek_byte(0),
            Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
        ) {
            self.cursor.advance();
        }
        self.cursor.position() - start
    }

    /// Lexes a `%` directive or `#` comment: everything to end of line.
    pub(crate) fn lex_to_eol(&mut self, kind: TokenKind) -> Token<'a> {
        while !self.cursor.is_at_end()
            && !matches!(self.cursor.raw_byte(0), Some(b'\n') | Some(b'\r'))
        {
            self.cursor.advance();
        }
        self.make(kind)
    }

    /// Lexes a `|` or `>` block scalar: header (with optional chomping
    /// indicator) plus the entire raw indented body.
    ///
    /// The body is every following line that is blank or indented deeper
    /// than the line the indicator appears on; it is captured verbatim
    /// into the token. The token therefore always ends at a line
    /// boundary (or EOF), which the indentation filter relies on.
    pub(crate) fn lex_block_scalar(&mut self, kind: TokenKind) -> ReadResult<Token<'a>> {
        let parent_indent = self.current_line_indent();

        self.cursor.advance();
        if matches!(self.cursor.peek_byte(0), Some(b'-') | Some(b'+')) {
            self.cursor.advance();
        }

        // Rest of the header line, then its newline.
        self.consume_line();

        // Body: blank lines or lines indented deeper than the header line.
        loop {
            if self.cursor.is_at_end() {
                break;
            }
            let mut indent = 0usize;
            while matches!(self.cursor.raw_byte(indent), Some(b' ') | Some(b'\t')) {
                indent += 1;
            }
            let blank = matches!(self.cursor.raw_byte(indent), None | Some(b'\n') | Some(b'\r'));
            if !blank && indent <= parent_indent {
                break;
            }
            self.consume_line();
        }

        Ok(self.make(kind))
    }

    /// Indentation of the line the cursor is currently on.
    fn current_line_indent(&self) -> usize {
        let bytes = self.cursor.source().as_bytes();
        let mut i = self.cursor.line_start();
        let mut indent = 0usize;
        while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
            indent += 1;
        }
        indent
    }

    /// Consumes through the end of the current line, newline included.
    fn consume_line(&mut self) {
        while !self.cursor.is_at_end()
            && !matches!(self.cursor.raw_byte(0), Some(b'\n') | Some(b'\r'))
        {
            self.cursor.advance();
        }
        if self.cursor.raw_byte(0) == Some(b'\r') {
            self.cursor.advance();
            if self.cursor.raw_byte(0) == Some(b'\n') {
                self.cursor.advance();
            }
        } else if self.cursor.raw_byte(0) == Some(b'\n') {
            self.cursor.advance();
        }
    }
}

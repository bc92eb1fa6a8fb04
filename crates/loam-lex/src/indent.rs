//! Indentation filter: synthetic INDENT/DEDENT injection.
//!
//! Wraps the [`Lexer`] and compares the column of the first real token
//! of every line against a stack of indent levels, emitting one INDENT
//! per push and one DEDENT per pop so the parser can treat block
//! structure context-freely. Whitespace and comments pass through
//! without disturbing the line-start state; EOF flushes one DEDENT per
//! open level. Non-synthetic tokens are never reordered.
//!
//! Two wrinkles beyond the basic algorithm:
//!
//! - Indent processing is suspended inside flow collections (tracked
//!   from `{ [ ] }` tokens), so a multi-line `{…}` cannot emit stray
//!   DEDENTs into the surrounding block structure.
//! - A block scalar token swallows its trailing newline, so it re-arms
//!   the line-start state itself.

use std::collections::VecDeque;

use loam_util::{ReadError, ReadResult};

use crate::token::{Token, TokenKind};
use crate::Lexer;

/// What to do when a dedent lands on a column not present on the stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndentPolicy {
    /// Re-push the unaligned column as a new level. The re-push emits a
    /// synthetic INDENT so every DEDENT stays paired, which keeps the
    /// stream balanced for the parser and the EOF flush.
    #[default]
    Lenient,
    /// Report [`ReadError::IndentationInconsistency`].
    Strict,
}

/// Token filter that injects INDENT and DEDENT around column transitions
/// at line starts.
pub struct IndentFilter<'a> {
    lexer: Lexer<'a>,

    /// Strictly increasing stack of indent columns (0-based), base 0.
    stack: Vec<u32>,

    /// True until the first real token of the current line is seen.
    at_line_start: bool,

    /// Nesting depth of flow collections; indent logic is off above 0.
    flow_depth: u32,

    /// Tokens queued behind a synthetic token.
    pending: VecDeque<Token<'a>>,

    /// The EOF token, kept to answer calls after exhaustion.
    finished: Option<Token<'a>>,

    policy: IndentPolicy,
}

impl<'a> IndentFilter<'a> {
    /// Creates a filter over `source` with the lenient dedent policy.
    pub fn new(source: &'a str) -> Self {
        Self::with_policy(source, IndentPolicy::Lenient)
    }

    /// Creates a filter over `source` with an explicit dedent policy.
    pub fn with_policy(source: &'a str, policy: IndentPolicy) -> Self {
        Self {
            lexer: Lexer::new(source),
            stack: vec![0],
            at_line_start: true,
            flow_depth: 0,
            pending: VecDeque::new(),
            finished: None,
            policy,
        }
    }

    /// The source text being read (BOM already stripped).
    pub fn source(&self) -> &'a str {
        self.lexer.source()
    }

    /// Returns the next token, inserting synthetic INDENT/DEDENT tokens
    /// at line-start boundaries and flushing open levels at EOF.
    pub fn next_token(&mut self) -> ReadResult<Token<'a>> {
        if let Some(token) = self.pending.pop_front() {
            return Ok(token);
        }
        if let Some(eof) = self.finished {
            return Ok(eof);
        }

        let token = self.lexer.next_token()?;
        match token.kind {
            TokenKind::Newline => {
                self.at_line_start = true;
                Ok(token)
            }
            TokenKind::Comment | TokenKind::Whitespace => Ok(token),
            TokenKind::Eof => {
                while self.stack.len() > 1 {
                    self.stack.pop();
                    self.pending.push_back(Self::synthetic(TokenKind::Dedent, &token));
                }
                self.finished = Some(token);
                self.pending.push_back(token);
                Ok(self.pending.pop_front().expect("queued EOF"))
            }
            _ if self.at_line_start && self.flow_depth == 0 => self.process_line_start(token),
            _ => {
                self.at_line_start = false;
                self.note_token(token.kind);
                Ok(token)
            }
        }
    }

    /// Handles the first real token of a line: compares its 0-based
    /// column against the stack top and emits the synthetic tokens.
    fn process_line_start(&mut self, token: Token<'a>) -> ReadResult<Token<'a>> {
        self.at_line_start = false;
        self.note_token(token.kind);

        let column = token.column.saturating_sub(1);
        let top = *self.stack.last().expect("indent stack is never empty");

        if column > top {
            self.stack.push(column);
            self.pending.push_back(token);
            return Ok(Self::synthetic(TokenKind::Indent, &token));
        }

        if column < top {
            while self.stack.len() > 1 && *self.stack.last().expect("non-empty") > column {
                self.stack.pop();
                self.pending.push_back(Self::synthetic(TokenKind::Dedent, &token));
            }
            if *self.stack.last().expect("non-empty") != column {
                match self.policy {
                    IndentPolicy::Lenient => {
                        self.stack.push(column);
                        self.pending.push_back(Self::synthetic(TokenKind::Indent, &token));
                    }
                    IndentPolicy::Strict => {
                        return Err(ReadError::IndentationInconsistency {
                            line: token.line,
                            column: token.column,
                        })
                    }
                }
            }
            self.pending.push_back(token);
            return Ok(self.pending.pop_front().expect("queued dedent"));
        }

        Ok(token)
    }

    /// Tracks flow nesting and block-scalar line boundaries.
    fn note_token(&mut self, kind: TokenKind) {
        match kind {
            TokenKind::LBrace | TokenKind::LBracket => self.flow_depth += 1,
            TokenKind::RBrace | TokenKind::RBracket => {
                self.flow_depth = self.flow_depth.saturating_sub(1)
            }
            // Block scalar tokens end at a line boundary.
            TokenKind::BlockLiteral | TokenKind::BlockFolded => self.at_line_start = true,
            _ => {}
        }
    }

    fn synthetic(kind: TokenKind, at: &Token<'a>) -> Token<'a> {
        Token {
            kind,
            text: "",
            offset: at.offset,
            line: at.line,
            column: at.column,
        }
    }
}

//! loam-lex - Lexical Analyzer for YAML source text
//!
//! ============================================================================
//! PIPELINE POSITION
//! ============================================================================
//!
//! This crate is the first stage of the loam reader:
//!
//! ```text
//! Source text
//!      |
//!      v
//! [Cursor]        byte/char traversal with line and column tracking
//!      |
//!      v
//! [Lexer]         priority-ordered matchers -> Token stream
//!      |
//!      v
//! [IndentFilter]  synthetic INDENT/DEDENT around line-start columns
//!      |
//!      v
//!   loam-par      recursive-descent parsing
//! ```
//!
//! YAML is indentation-sensitive, which an ordinary context-free token
//! stream cannot express. The trick used here is the classic one: a
//! filter behind the lexer watches the column of the first real token of
//! every line against a stack of indent levels and injects synthetic
//! INDENT/DEDENT tokens, after which the parser can treat block
//! structure like any bracketed grammar.
//!
//! The lexer itself never skips anything: whitespace, newlines and
//! comments are real tokens, because the filter needs them to track
//! line starts. The parser's token-feeding layer drops what it does not
//! care about.

pub mod cursor;
pub mod indent;
pub mod lexer;
pub mod token;

mod edge_cases;

pub use cursor::Cursor;
pub use indent::{IndentFilter, IndentPolicy};
pub use lexer::Lexer;
pub use token::{Token, TokenKind};

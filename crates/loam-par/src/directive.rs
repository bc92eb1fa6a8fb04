//! `%YAML` and `%TAG` directive handling.
//!
//! Directives are consumed before any document body. `%YAML major.minor`
//! stores the version string (no version enforcement); `%TAG handle
//! prefix` registers a handle for tag resolution. Malformed forms of the
//! two known directives are errors; unknown directive names are ignored.
//! Defaults reset per document: version "1.2", `!` -> `!`, `!!` ->
//! `tag:yaml.org,2002:`.

use loam_lex::{Token, TokenKind};
use loam_util::{ReadError, ReadResult};

use crate::Parser;

impl<'a> Parser<'a> {
    /// Consumes leading directive lines.
    pub(crate) fn parse_directives(&mut self) -> ReadResult<()> {
        while self.at(TokenKind::Directive) {
            let token = self.bump()?;
            self.handle_directive(&token)?;
            self.skip_newlines()?;
        }
        Ok(())
    }

    fn handle_directive(&mut self, token: &Token<'a>) -> ReadResult<()> {
        let invalid = || ReadError::InvalidDirective {
            text: token.text.to_string(),
            line: token.line,
            column: token.column,
        };

        let body = token.text.strip_prefix('%').unwrap_or(token.text);
        let mut parts = body.split_whitespace();
        let name = match parts.next() {
            Some(name) => name,
            None => return Err(invalid()),
        };

        match name {
            "YAML" => {
                let version = parts.next().ok_or_else(|| invalid())?;
                if parts.next().is_some() || !is_version(version) {
                    return Err(invalid());
                }
                self.set_yaml_version(version.to_string());
            }
            "TAG" => {
                let handle = parts.next().ok_or_else(|| invalid())?;
                let prefix = parts.next().ok_or_else(|| invalid())?;
                if parts.next().is_some() || !handle.starts_with('!') {
                    return Err(invalid());
                }
                log::debug!("registering tag handle {} -> {}", handle, prefix);
                self.register_tag_handle(handle.to_string(), prefix.to_string());
            }
            other => {
                log::debug!("ignoring unknown directive %{}", other);
            }
        }
        Ok(())
    }
}

/// `major.minor`, both parts non-empty decimal digit runs.
fn is_version(text: &str) -> bool {
    let mut parts = text.split('.');
    let valid = |part: Option<&str>| {
        part.is_some_and(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
    };
    valid(parts.next()) && valid(parts.next()) && parts.next().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_document, Parser, ParserOptions, Value};

    #[test]
    fn test_yaml_directive_sets_version() {
        let mut parser = Parser::new("%YAML 1.1\n---\nx: 1").unwrap();
        parser.parse_document().unwrap();
        assert_eq!(parser.yaml_version(), "1.1");
    }

    #[test]
    fn test_version_defaults_between_documents() {
        let mut parser = Parser::new("%YAML 1.1\n---\na: 1\n---\nb: 2").unwrap();
        parser.parse_stream().unwrap();
        // The second document saw no %YAML directive.
        assert_eq!(parser.yaml_version(), "1.2");
    }

    #[test]
    fn test_tag_directive_rebinds_secondary_handle() {
        let source = "%TAG !! tag:example.com,2024:\n---\n!!thing 5";
        let root = parse_document(source).unwrap();
        let root = root.borrow();
        assert_eq!(root.tag.as_deref(), Some("tag:example.com,2024:thing"));
        assert_eq!(root.value.as_int(), Some(5));
    }

    #[test]
    fn test_malformed_yaml_directive() {
        for source in ["%YAML\n---\nx: 1", "%YAML one.two\n---\nx: 1", "%YAML 1.2 extra\n---\nx: 1"] {
            assert!(
                matches!(parse_document(source), Err(ReadError::InvalidDirective { .. })),
                "{source}"
            );
        }
    }

    #[test]
    fn test_malformed_tag_directive() {
        assert!(matches!(
            parse_document("%TAG !!\n---\nx: 1"),
            Err(ReadError::InvalidDirective { .. })
        ));
        assert!(matches!(
            parse_document("%TAG nothandle prefix\n---\nx: 1"),
            Err(ReadError::InvalidDirective { .. })
        ));
    }

    #[test]
    fn test_unknown_directive_ignored() {
        let root = parse_document("%FANCY whatever args\n---\nx: 1").unwrap();
        let root = root.borrow();
        let agg = root.value.as_aggregate().unwrap();
        assert_eq!(agg.get("x").unwrap().borrow().value, Value::Int(1));
    }

    #[test]
    fn test_tag_handle_seeds_from_options() {
        let mut options = ParserOptions::default();
        options
            .tag_handles
            .push(("!!".to_string(), "tag:seeded,2024:".to_string()));
        let root = Parser::with_options("!!custom 1", options)
            .unwrap()
            .parse_document()
            .unwrap();
        let root = root.borrow();
        assert_eq!(root.tag.as_deref(), Some("tag:seeded,2024:custom"));
    }

    #[test]
    fn test_directive_mid_document_rejected() {
        // A directive after the body began ends the mapping; the
        // leftover line is surplus content.
        assert!(matches!(
            parse_document("a: 1\n%YAML 1.2\nb: 2"),
            Err(ReadError::ExtraContent { .. })
        ));
    }
}

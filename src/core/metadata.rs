//! Atomic model metadata embedded in block comments of model sources.
//!
//! A C++ atomic declares its shape inside a comment:
//!
//! ```text
//! /*
//! @ModelMetadata
//! name: Queue
//! input_ports: in, done
//! output_ports: out
//! */
//! ```

use crate::utils::error::{DevsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const METADATA_MARKER: &str = "@ModelMetadata";

const COMMENT_START: &str = "/*";
const COMMENT_END: &str = "*/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicMetadata {
    pub name: String,
    pub input_ports: Vec<String>,
    pub output_ports: Vec<String>,
}

impl AtomicMetadata {
    pub fn new<I, O>(name: impl Into<String>, input_ports: I, output_ports: O) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        Self {
            name: name.into(),
            input_ports: input_ports.into_iter().map(Into::into).collect(),
            output_ports: output_ports.into_iter().map(Into::into).collect(),
        }
    }
}

/// Where a comment body stopped matching the metadata grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
    pub expected: String,
    pub offset: usize,
    pub found: String,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.found.is_empty() {
            write!(f, "expected {} at offset {}, found end of input", self.expected, self.offset)
        } else {
            write!(
                f,
                "expected {} at offset {}, found '{}'",
                self.expected, self.offset, self.found
            )
        }
    }
}

impl std::error::Error for GrammarError {}

/// Returns the bodies of all `/* ... */` comments, in source order.
/// An unterminated comment is dropped.
pub fn lex_block_comments(source: &str) -> Vec<&str> {
    let mut comments = Vec::new();
    let mut rest = source;
    while let Some(start) = rest.find(COMMENT_START) {
        let body_start = &rest[start + COMMENT_START.len()..];
        match body_start.find(COMMENT_END) {
            Some(end) => {
                comments.push(&body_start[..end]);
                rest = &body_start[end + COMMENT_END.len()..];
            }
            None => break,
        }
    }
    comments
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, expected: impl Into<String>) -> GrammarError {
        let found: String = self
            .rest()
            .chars()
            .take_while(|c| !c.is_whitespace())
            .take(16)
            .collect();
        GrammarError {
            expected: expected.into(),
            offset: self.pos,
            found,
        }
    }

    fn literal(&mut self, token: &str) -> std::result::Result<(), GrammarError> {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            Ok(())
        } else {
            Err(self.error(format!("'{}'", token)))
        }
    }

    fn try_literal(&mut self, token: &str) -> bool {
        let saved = self.pos;
        if self.literal(token).is_ok() {
            true
        } else {
            self.pos = saved;
            false
        }
    }

    fn identifier(&mut self) -> std::result::Result<String, GrammarError> {
        self.skip_whitespace();
        let len = self
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(self.rest().len());
        if len == 0 {
            return Err(self.error("identifier"));
        }
        let ident = self.rest()[..len].to_string();
        self.pos += len;
        Ok(ident)
    }

    /// True when the next token is a section header such as `output_ports:`.
    fn at_section_header(&mut self) -> bool {
        let saved = self.pos;
        let is_header = self.identifier().is_ok() && self.rest().starts_with(':');
        self.pos = saved;
        is_header
    }

    /// A stray comma before the next section header ends the list.
    fn identifier_list(&mut self) -> std::result::Result<Vec<String>, GrammarError> {
        let mut idents = vec![self.identifier()?];
        while self.try_literal(",") {
            if self.at_section_header() {
                break;
            }
            idents.push(self.identifier()?);
        }
        Ok(idents)
    }
}

/// Parses one comment body against the metadata grammar.
pub fn parse_metadata(comment: &str) -> std::result::Result<AtomicMetadata, GrammarError> {
    let mut cursor = Cursor::new(comment);
    cursor.literal(METADATA_MARKER)?;
    cursor.literal("name:")?;
    let name = cursor.identifier()?;

    let input_ports = if cursor.try_literal("input_ports:") {
        cursor.identifier_list()?
    } else {
        Vec::new()
    };
    let output_ports = if cursor.try_literal("output_ports:") {
        cursor.identifier_list()?
    } else {
        Vec::new()
    };

    Ok(AtomicMetadata {
        name,
        input_ports,
        output_ports,
    })
}

/// Extracts the first well-formed metadata block found in `source`.
pub fn extract(source: &str) -> Result<AtomicMetadata> {
    let comments = lex_block_comments(source);
    let mut last_error = None;
    for comment in comments {
        match parse_metadata(comment) {
            Ok(metadata) => return Ok(metadata),
            Err(e) => last_error = Some(e),
        }
    }
    Err(match last_error {
        Some(source) => DevsError::MetadataParsing {
            message: format!("no comment holds valid metadata ({})", source),
            source: Some(source),
        },
        None => DevsError::MetadataParsing {
            message: "No metadata found".to_string(),
            source: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_comments_in_order() {
        let source = "int a; /* first */ int b; /*second*/ /* unterminated";
        assert_eq!(lex_block_comments(source), vec![" first ", "second"]);
    }

    #[test]
    fn test_lex_without_comments() {
        assert!(lex_block_comments("void main() { return; }").is_empty());
        assert!(lex_block_comments("").is_empty());
        assert_eq!(lex_block_comments("/**/"), vec![""]);
    }

    #[test]
    fn test_extract_name_only() {
        let metadata = extract("/* @ModelMetadata name:Foo */").unwrap();
        assert_eq!(metadata, AtomicMetadata::new("Foo", Vec::<String>::new(), Vec::<String>::new()));
    }

    #[test]
    fn test_extract_ports_whitespace_insensitive() {
        let source = "/*\n@ModelMetadata\nname: Foo\ninput_ports: a ,   b\noutput_ports:c\n*/";
        let metadata = extract(source).unwrap();
        assert_eq!(metadata.name, "Foo");
        assert_eq!(metadata.input_ports, vec!["a", "b"]);
        assert_eq!(metadata.output_ports, vec!["c"]);
    }

    #[test]
    fn test_extract_only_output_ports() {
        let metadata = extract("/* @ModelMetadata name: Gen output_ports: out */").unwrap();
        assert!(metadata.input_ports.is_empty());
        assert_eq!(metadata.output_ports, vec!["out"]);
    }

    #[test]
    fn test_underscore_port_names() {
        let source = "/*\n@ModelMetadata\nname: Poblacion\ninput_ports: in_deltavac,in_deltainf \noutput_ports: out\n*/";
        let metadata = extract(source).unwrap();
        assert_eq!(metadata.input_ports, vec!["in_deltavac", "in_deltainf"]);
    }

    #[test]
    fn test_first_valid_comment_wins() {
        let source = "/* license header */\n/* @ModelMetadata name: A */\n/* @ModelMetadata name: B */";
        assert_eq!(extract(source).unwrap().name, "A");
    }

    #[test]
    fn test_no_matching_comment_keeps_grammar_error() {
        let err = extract("/* just a comment */").unwrap_err();
        match err {
            DevsError::MetadataParsing { source: Some(cause), .. } => {
                assert!(cause.expected.contains(METADATA_MARKER));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_no_comments_at_all() {
        let err = extract("int main() {}").unwrap_err();
        assert!(matches!(err, DevsError::MetadataParsing { source: None, .. }));
    }

    #[test]
    fn test_missing_name_is_grammar_error() {
        let err = parse_metadata("@ModelMetadata input_ports: a").unwrap_err();
        assert_eq!(err.expected, "'name:'");
        assert_eq!(err.found, "input_ports:");
    }

    #[test]
    fn test_dangling_list_separator_fails() {
        assert!(parse_metadata("@ModelMetadata name: X input_ports: a,").is_err());
    }

    #[test]
    fn test_stray_comma_before_next_section() {
        let metadata =
            extract("/* @ModelMetadata name: X input_ports: a, b,\n output_ports: c */").unwrap();
        assert_eq!(metadata.input_ports, vec!["a", "b"]);
        assert_eq!(metadata.output_ports, vec!["c"]);
    }
}

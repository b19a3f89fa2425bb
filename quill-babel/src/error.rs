//! Error types shared across the crate
//!
//!     [`FormatError`] is what callers of the registry and the conversion helpers see. It wraps
//!     the narrower errors raised by each stage: [`ParseError`] from dialect parsers,
//!     [`MalformedStreamError`] from the tree builder and [`TransformError`] from the macro
//!     engine.
//!
//!     [`DocumentError`] is different: it is never returned, it is recorded. Non-fatal problems
//!     (a parser's `Error` event, an unknown macro, a macro that failed) are attached to the
//!     document so nothing is silently lost, and the offending node is replaced by an inert
//!     error block.

use crate::mappings::flat_to_nested::MalformedStreamError;
use crate::syntax::Syntax;
use crate::transform::content::ContentNotFoundError;
use crate::transform::TransformError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while looking up, parsing, transforming or rendering documents.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("no parser or renderer registered for syntax '{0}'")]
    SyntaxNotFound(String),

    #[error("invalid syntax identifier '{0}', expected 'type/version'")]
    InvalidSyntax(String),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    MalformedStream(#[from] MalformedStreamError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}

/// Line/column location inside parser input, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Hard failure of a dialect parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}: {message}", syntax_prefix(.syntax), position_suffix(.position))]
pub struct ParseError {
    pub message: String,
    pub syntax: Option<Syntax>,
    pub position: Option<Position>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            syntax: None,
            position: None,
        }
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.position = Some(Position { line, column });
        self
    }
}

fn syntax_prefix(syntax: &Option<Syntax>) -> String {
    match syntax {
        Some(syntax) => format!("failed to parse {}", syntax),
        None => "failed to parse".to_string(),
    }
}

fn position_suffix(position: &Option<Position>) -> String {
    position
        .map(|position| format!(" at {}", position))
        .unwrap_or_default()
}

/// A non-fatal problem recorded on a document.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DocumentError {
    #[error("{}{description}", parse_prefix(.syntax))]
    Parse {
        description: String,
        syntax: Option<Syntax>,
    },

    #[error("unknown macro [{id}]")]
    UnresolvedMacro { id: String },

    #[error("macro [{id}] does not support inline mode")]
    InlineNotSupported { id: String },

    #[error("content of macro [{id}] could not be loaded: {cause}")]
    ContentNotFound {
        id: String,
        cause: ContentNotFoundError,
    },

    #[error("macro [{id}] was still pending after {limit} transformation passes")]
    RecursionLimit { id: String, limit: usize },

    #[error("macro [{id}] failed: {message}")]
    MacroExecution { id: String, message: String },
}

fn parse_prefix(syntax: &Option<Syntax>) -> String {
    match syntax {
        Some(syntax) => format!("[{}] ", syntax),
        None => String::new(),
    }
}

impl DocumentError {
    /// The macro id the error is attached to, for transformation errors.
    pub fn macro_id(&self) -> Option<&str> {
        match self {
            DocumentError::Parse { .. } => None,
            DocumentError::UnresolvedMacro { id }
            | DocumentError::InlineNotSupported { id }
            | DocumentError::ContentNotFound { id, .. }
            | DocumentError::RecursionLimit { id, .. }
            | DocumentError::MacroExecution { id, .. } => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_mentions_syntax_and_position() {
        let err = ParseError::new("unexpected token")
            .with_syntax(Syntax::xdom_json_1_0())
            .at(3, 7);
        assert_eq!(
            err.to_string(),
            "failed to parse xdom+json/1.0 at line 3, column 7: unexpected token"
        );
    }

    #[test]
    fn parse_error_without_details() {
        assert_eq!(ParseError::new("boom").to_string(), "failed to parse: boom");
    }

    #[test]
    fn document_errors_name_their_macro() {
        let err = DocumentError::RecursionLimit {
            id: "loop".to_string(),
            limit: 4,
        };
        assert_eq!(err.macro_id(), Some("loop"));
        assert_eq!(
            err.to_string(),
            "macro [loop] was still pending after 4 transformation passes"
        );
    }
}

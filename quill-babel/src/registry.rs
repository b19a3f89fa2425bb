//! Syntax registry for parser and renderer discovery
//!
//! This module provides a centralized registry for all available parsers and renderers.
//! Both are registered and retrieved by their [`Syntax`] identifier; a syntax may have a
//! parser, a renderer, or both.

use crate::error::FormatError;
use crate::format::{ParseOutcome, Parser, Renderer};
use crate::ir::document::Document;
use crate::syntax::Syntax;
use std::collections::HashMap;
use std::fmt;

/// Registry of parsers and renderers
///
/// # Examples
///
/// ```ignore
/// let mut registry = SyntaxRegistry::new();
/// registry.register_parser(MyParser);
///
/// let doc = registry.parse("source text", &Syntax::new("my", "1.0"))?;
/// ```
pub struct SyntaxRegistry {
    parsers: HashMap<Syntax, Box<dyn Parser>>,
    renderers: HashMap<Syntax, Box<dyn Renderer>>,
}

/// One line of [`SyntaxRegistry::list_syntaxes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxSupport {
    pub syntax: Syntax,
    pub parse: bool,
    pub render: bool,
}

impl SyntaxRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        SyntaxRegistry {
            parsers: HashMap::new(),
            renderers: HashMap::new(),
        }
    }

    /// Register a parser
    ///
    /// If a parser for the same syntax already exists, it will be replaced.
    pub fn register_parser<P: Parser + 'static>(&mut self, parser: P) {
        self.parsers.insert(parser.syntax(), Box::new(parser));
    }

    /// Register a renderer, replacing any renderer for the same syntax.
    pub fn register_renderer<R: Renderer + 'static>(&mut self, renderer: R) {
        self.renderers.insert(renderer.syntax(), Box::new(renderer));
    }

    pub fn parser(&self, syntax: &Syntax) -> Result<&dyn Parser, FormatError> {
        self.parsers
            .get(syntax)
            .map(|p| p.as_ref())
            .ok_or_else(|| FormatError::SyntaxNotFound(syntax.to_string()))
    }

    pub fn renderer(&self, syntax: &Syntax) -> Result<&dyn Renderer, FormatError> {
        self.renderers
            .get(syntax)
            .map(|r| r.as_ref())
            .ok_or_else(|| FormatError::SyntaxNotFound(syntax.to_string()))
    }

    pub fn has_parser(&self, syntax: &Syntax) -> bool {
        self.parsers.contains_key(syntax)
    }

    pub fn has_renderer(&self, syntax: &Syntax) -> bool {
        self.renderers.contains_key(syntax)
    }

    /// Syntaxes with a parser (sorted)
    pub fn list_parsers(&self) -> Vec<Syntax> {
        let mut syntaxes: Vec<_> = self.parsers.keys().cloned().collect();
        syntaxes.sort();
        syntaxes
    }

    /// Syntaxes with a renderer (sorted)
    pub fn list_renderers(&self) -> Vec<Syntax> {
        let mut syntaxes: Vec<_> = self.renderers.keys().cloned().collect();
        syntaxes.sort();
        syntaxes
    }

    /// Every known syntax with what it supports (sorted)
    pub fn list_syntaxes(&self) -> Vec<SyntaxSupport> {
        let mut syntaxes: Vec<Syntax> = self
            .parsers
            .keys()
            .chain(self.renderers.keys())
            .cloned()
            .collect();
        syntaxes.sort();
        syntaxes.dedup();
        syntaxes
            .into_iter()
            .map(|syntax| SyntaxSupport {
                parse: self.has_parser(&syntax),
                render: self.has_renderer(&syntax),
                syntax,
            })
            .collect()
    }

    /// Parse source text with the parser registered for `syntax`
    pub fn parse(&self, source: &str, syntax: &Syntax) -> Result<Document, FormatError> {
        self.parser(syntax)?.parse_document(source)
    }

    /// Parse source text, keeping the partial tree if the parser fails midway
    pub fn parse_partial(&self, source: &str, syntax: &Syntax) -> Result<ParseOutcome, FormatError> {
        Ok(self.parser(syntax)?.parse_partial(source))
    }

    /// Render a document with the renderer registered for `syntax`
    pub fn render(&self, doc: &Document, syntax: &Syntax) -> Result<String, FormatError> {
        self.renderer(syntax)?.render_document(doc)
    }

    /// Create a registry with the built-in syntaxes
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register_renderer(crate::formats::event::EventRenderer);
        registry.register_parser(crate::formats::plain::PlainParser);
        registry.register_renderer(crate::formats::plain::PlainRenderer);
        registry.register_parser(crate::formats::json::JsonParser);
        registry.register_renderer(crate::formats::json::JsonRenderer);

        registry
    }
}

impl Default for SyntaxRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for SyntaxRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxRegistry")
            .field("parsers", &self.list_parsers())
            .field("renderers", &self.list_renderers())
            .finish()
    }
}

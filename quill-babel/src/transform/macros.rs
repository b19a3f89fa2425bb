//! The macro contract and the registry macros are looked up in.

use crate::error::FormatError;
use crate::formats::plain::PlainParser;
use crate::format::Parser;
use crate::ir::nodes::{Block, BlockNode, MacroBlock};
use crate::parameters::Parameters;
use crate::registry::SyntaxRegistry;
use crate::syntax::Syntax;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Why a macro could not produce output.
#[derive(Debug, Error)]
pub enum MacroExecutionError {
    #[error("invalid value for parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("this macro requires content")]
    MissingContent,

    #[error("content could not be parsed: {0}")]
    ContentParse(#[from] FormatError),

    #[error("{0}")]
    Failed(String),
}

/// Name, description and scheduling data of a registered macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDescriptor {
    pub id: String,
    pub description: String,
    pub supports_inline: bool,
    pub priority: i32,
}

/// A macro implementation.
///
/// Each built-in macro (comment, html, info, ...) implements this trait.
pub trait Macro: Send + Sync {
    /// The id macro calls use to address this macro.
    fn id(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Whether the macro may be called inside a paragraph.
    fn supports_inline(&self) -> bool {
        false
    }

    /// Scheduling priority; lower runs first.
    fn priority(&self) -> i32 {
        0
    }

    /// Produces the blocks replacing the macro call.
    ///
    /// `content` is the call's inline content or the text resolved from its content source.
    fn execute(
        &self,
        parameters: &Parameters,
        content: Option<&str>,
        context: &MacroContext<'_>,
    ) -> Result<Vec<BlockNode>, MacroExecutionError>;

    fn descriptor(&self) -> MacroDescriptor {
        MacroDescriptor {
            id: self.id().to_string(),
            description: self.description().to_string(),
            supports_inline: self.supports_inline(),
            priority: self.priority(),
        }
    }
}

/// What a macro knows about the call it is executing.
pub struct MacroContext<'a> {
    pub call: &'a MacroBlock,
    /// Syntax of the document being transformed, if known.
    pub syntax: Option<&'a Syntax>,
    pub syntaxes: Option<&'a SyntaxRegistry>,
    /// 1-based pass number.
    pub pass: usize,
    /// Depth of the call in the tree (children of the root have depth 1).
    pub depth: usize,
}

impl<'a> MacroContext<'a> {
    pub fn new(call: &'a MacroBlock) -> Self {
        Self {
            call,
            syntax: None,
            syntaxes: None,
            pass: 1,
            depth: 1,
        }
    }

    pub fn is_inline(&self) -> bool {
        self.call.inline
    }

    /// Parses macro content with the document's own parser, falling back to plain text.
    ///
    /// Inline calls get the content of a lone top-level paragraph so it can sit inside the
    /// surrounding paragraph.
    pub fn parse_content(&self, content: &str) -> Result<Vec<BlockNode>, MacroExecutionError> {
        let parser = self
            .syntax
            .zip(self.syntaxes)
            .and_then(|(syntax, syntaxes)| syntaxes.parser(syntax).ok());
        let doc = match parser {
            Some(parser) => parser.parse_document(content)?,
            None => PlainParser.parse_document(content)?,
        };

        let mut nodes = doc.to_root_node().children;
        if self.is_inline() && nodes.len() == 1 && matches!(nodes[0].block, Block::Paragraph { .. })
        {
            nodes = nodes.remove(0).children;
        }
        Ok(nodes)
    }
}

impl fmt::Debug for MacroContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroContext")
            .field("call", &self.call.id)
            .field("syntax", &self.syntax)
            .field("pass", &self.pass)
            .field("depth", &self.depth)
            .finish()
    }
}

/// Macros available to a transformation, by id.
pub struct MacroRegistry {
    macros: HashMap<String, Box<dyn Macro>>,
}

impl MacroRegistry {
    pub fn new() -> Self {
        MacroRegistry {
            macros: HashMap::new(),
        }
    }

    /// Registry holding the built-in macros.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::macros::register_defaults(&mut registry);
        registry
    }

    /// Registers a macro, replacing any macro with the same id.
    pub fn register<M: Macro + 'static>(&mut self, macro_impl: M) {
        self.macros
            .insert(macro_impl.id().to_string(), Box::new(macro_impl));
    }

    pub fn get(&self, id: &str) -> Option<&dyn Macro> {
        self.macros.get(id).map(|m| m.as_ref())
    }

    pub fn has(&self, id: &str) -> bool {
        self.macros.contains_key(id)
    }

    /// Registered ids (sorted).
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.macros.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Descriptors of every registered macro, sorted by id.
    pub fn descriptors(&self) -> Vec<MacroDescriptor> {
        let mut descriptors: Vec<_> = self.macros.values().map(|m| m.descriptor()).collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

impl Default for MacroRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MacroRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroRegistry")
            .field("macros", &self.list())
            .finish()
    }
}

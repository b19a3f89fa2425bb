//! Built-in macros
//!
//!     - `comment`: drops its content.
//!     - `html`: emits its content as raw `html/5.0`, subject to the engine's raw content filter.
//!     - `info`, `warning`, `error`: message boxes around content parsed in the document syntax.

use crate::ir::events::{Style, Styles};
use crate::ir::nodes::{Block, BlockNode};
use crate::parameters::Parameters;
use crate::syntax::Syntax;
use crate::transform::macros::{Macro, MacroContext, MacroExecutionError, MacroRegistry};

pub(crate) fn register_defaults(registry: &mut MacroRegistry) {
    registry.register(CommentMacro);
    registry.register(HtmlMacro);
    registry.register(MessageBoxMacro::info());
    registry.register(MessageBoxMacro::warning());
    registry.register(MessageBoxMacro::error());
}

pub struct CommentMacro;

impl Macro for CommentMacro {
    fn id(&self) -> &str {
        "comment"
    }

    fn description(&self) -> &str {
        "Removes its content from the output"
    }

    fn supports_inline(&self) -> bool {
        true
    }

    fn execute(
        &self,
        _parameters: &Parameters,
        _content: Option<&str>,
        _context: &MacroContext<'_>,
    ) -> Result<Vec<BlockNode>, MacroExecutionError> {
        Ok(Vec::new())
    }
}

pub struct HtmlMacro;

impl Macro for HtmlMacro {
    fn id(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "Inserts raw HTML"
    }

    fn supports_inline(&self) -> bool {
        true
    }

    fn execute(
        &self,
        _parameters: &Parameters,
        content: Option<&str>,
        _context: &MacroContext<'_>,
    ) -> Result<Vec<BlockNode>, MacroExecutionError> {
        let content = content.ok_or(MacroExecutionError::MissingContent)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![BlockNode::new(Block::raw(Syntax::html_5_0(), content))])
    }
}

/// `info`, `warning` and `error` boxes.
///
/// Block calls produce a group with class `box <kind>message`; inline calls a format span with
/// the same class. An optional `title` parameter becomes a bold first line.
pub struct MessageBoxMacro {
    kind: &'static str,
    description: &'static str,
}

impl MessageBoxMacro {
    pub fn info() -> Self {
        Self {
            kind: "info",
            description: "Displays an information message box",
        }
    }

    pub fn warning() -> Self {
        Self {
            kind: "warning",
            description: "Displays a warning message box",
        }
    }

    pub fn error() -> Self {
        Self {
            kind: "error",
            description: "Displays an error message box",
        }
    }

    fn class(&self) -> String {
        format!("box {}message", self.kind)
    }
}

impl Macro for MessageBoxMacro {
    fn id(&self) -> &str {
        self.kind
    }

    fn description(&self) -> &str {
        self.description
    }

    fn supports_inline(&self) -> bool {
        true
    }

    fn execute(
        &self,
        parameters: &Parameters,
        content: Option<&str>,
        context: &MacroContext<'_>,
    ) -> Result<Vec<BlockNode>, MacroExecutionError> {
        let mut children = Vec::new();
        if let Some(title) = parameters.get("title") {
            let bold: Styles = [Style::Bold].into_iter().collect();
            let title = BlockNode::with_children(
                Block::Format {
                    styles: bold,
                    parameters: Parameters::new(),
                },
                BlockNode::words(title),
            );
            if context.is_inline() {
                children.push(title);
                children.push(BlockNode::space());
            } else {
                children.push(BlockNode::paragraph(vec![title]));
            }
        }
        if let Some(content) = content {
            children.extend(context.parse_content(content)?);
        }

        let mut class = Parameters::new();
        class.insert("class".to_string(), self.class());
        let container = if context.is_inline() {
            Block::Format {
                styles: Styles::new(),
                parameters: class,
            }
        } else {
            Block::group(class)
        };
        Ok(vec![BlockNode::with_children(container, children)])
    }
}

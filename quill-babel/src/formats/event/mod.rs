//! Event listing renderer
//!
//! Writes one line per event, indented by nesting depth. Useful for debugging parsers and as a
//! stable snapshot format in tests.
//!
//! ## Format
//!
//! - Event name in listener style (`beginParagraph`, `onWord`, ...)
//! - Payload in square brackets, parameters as `[key]=[value]`
//! - Children indented two spaces deeper than their container
//!
//! ## Example
//!
//! ```text
//! beginDocument
//!   beginParagraph [class]=[lead]
//!     onWord [Hello]
//!     onSpace
//!     onWord [world]
//!   endParagraph [class]=[lead]
//! endDocument
//! ```

use crate::error::FormatError;
use crate::format::Renderer;
use crate::ir::events::{Event, ListKind, Listener, Styles};
use crate::ir::nodes::{ErrorBlock, ImageBlock, LinkBlock, MacroBlock, MacroContent};
use crate::parameters::Parameters;
use crate::printer::Printer;
use crate::syntax::Syntax;

/// Renderer listing every event on its own line.
pub struct EventRenderer;

impl Renderer for EventRenderer {
    fn syntax(&self) -> Syntax {
        Syntax::event_1_0()
    }

    fn description(&self) -> &str {
        "One line per event, for debugging and snapshots"
    }

    fn listener<'p>(&self, printer: &'p mut dyn Printer) -> Box<dyn Listener + 'p> {
        Box::new(EventPrinter {
            printer,
            indent_level: 0,
        })
    }
}

struct EventPrinter<'p> {
    printer: &'p mut dyn Printer,
    indent_level: usize,
}

impl EventPrinter<'_> {
    fn indent(&self) -> String {
        "  ".repeat(self.indent_level)
    }
}

impl Listener for EventPrinter<'_> {
    fn on_event(&mut self, event: Event) -> Result<(), FormatError> {
        if event.is_end() {
            self.indent_level = self.indent_level.saturating_sub(1);
        }
        let payload = describe(&event);
        let line = if payload.is_empty() {
            format!("{}{}", self.indent(), event.name())
        } else {
            format!("{}{} {}", self.indent(), event.name(), payload)
        };
        self.printer.println(&line);
        if event.is_begin() {
            self.indent_level += 1;
        }
        Ok(())
    }
}

fn bracket(text: impl AsRef<str>) -> String {
    format!("[{}]", escape(text.as_ref()))
}

/// Keeps one event per line.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn params(parameters: &Parameters) -> String {
    parameters
        .iter()
        .map(|(key, value)| format!("{}={}", bracket(key), bracket(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join(parts: Vec<String>) -> String {
    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn list_kind(kind: ListKind) -> String {
    match kind {
        ListKind::Bulleted => bracket("BULLETED"),
        ListKind::Numbered => bracket("NUMBERED"),
    }
}

fn styles(styles: &Styles) -> String {
    let names: Vec<String> = styles
        .iter()
        .map(|style| format!("{:?}", style).to_uppercase())
        .collect();
    bracket(names.join(","))
}

fn macro_call(call: &MacroBlock) -> String {
    let content = match &call.content {
        None => String::new(),
        Some(MacroContent::Text(text)) => bracket(text),
        Some(MacroContent::Source(source)) => {
            bracket(format!("{}:{}", source.source, source.reference))
        }
    };
    let inline = if call.inline {
        bracket("inline")
    } else {
        String::new()
    };
    join(vec![bracket(&call.id), params(&call.parameters), content, inline])
}

fn link(link: &LinkBlock) -> String {
    join(vec![
        bracket(link.reference.to_string()),
        link.label.as_deref().map(bracket).unwrap_or_default(),
        bracket(link.freestanding.to_string()),
    ])
}

fn image(image: &ImageBlock) -> String {
    join(vec![
        bracket(image.reference.to_string()),
        bracket(image.freestanding.to_string()),
        params(&image.parameters),
    ])
}

fn error(error: &ErrorBlock) -> String {
    join(vec![
        bracket(&error.description),
        error
            .syntax
            .as_ref()
            .map(|syntax| bracket(syntax.to_string()))
            .unwrap_or_default(),
    ])
}

fn describe(event: &Event) -> String {
    match event {
        Event::BeginDocument(p)
        | Event::EndDocument(p)
        | Event::BeginParagraph(p)
        | Event::EndParagraph(p)
        | Event::BeginListItem(p)
        | Event::EndListItem(p)
        | Event::BeginDefinitionList(p)
        | Event::EndDefinitionList(p)
        | Event::BeginDefinitionTerm(p)
        | Event::EndDefinitionTerm(p)
        | Event::BeginDefinitionDescription(p)
        | Event::EndDefinitionDescription(p)
        | Event::BeginTable(p)
        | Event::EndTable(p)
        | Event::BeginTableRow(p)
        | Event::EndTableRow(p)
        | Event::BeginQuotation(p)
        | Event::EndQuotation(p)
        | Event::BeginGroup(p)
        | Event::EndGroup(p)
        | Event::BeginMetaData(p)
        | Event::EndMetaData(p)
        | Event::HorizontalLine(p) => params(p),
        Event::BeginSection { level, parameters } | Event::EndSection { level, parameters } => {
            join(vec![bracket(level.to_string()), params(parameters)])
        }
        Event::BeginHeader {
            level,
            id,
            parameters,
        }
        | Event::EndHeader {
            level,
            id,
            parameters,
        } => join(vec![
            bracket(level.to_string()),
            id.as_deref().map(bracket).unwrap_or_default(),
            params(parameters),
        ]),
        Event::BeginList { kind, parameters } | Event::EndList { kind, parameters } => {
            join(vec![list_kind(*kind), params(parameters)])
        }
        Event::BeginTableCell { header, parameters } | Event::EndTableCell { header, parameters } => {
            let header = if *header { bracket("header") } else { String::new() };
            join(vec![header, params(parameters)])
        }
        Event::BeginFormat {
            styles: set,
            parameters,
        }
        | Event::EndFormat {
            styles: set,
            parameters,
        } => join(vec![styles(set), params(parameters)]),
        Event::BeginMacroMarker(call) | Event::EndMacroMarker(call) => macro_call(call),
        Event::Word(text) => bracket(text),
        Event::SpecialSymbol(symbol) => bracket(symbol.to_string()),
        Event::EmptyLines(count) => bracket(count.to_string()),
        Event::Space | Event::NewLine => String::new(),
        Event::Verbatim {
            content,
            inline,
            parameters,
        } => {
            let inline = if *inline { bracket("inline") } else { String::new() };
            join(vec![bracket(content), inline, params(parameters)])
        }
        Event::RawText { syntax, content } => {
            join(vec![bracket(content), bracket(syntax.to_string())])
        }
        Event::Link(block) => link(block),
        Event::Image(block) => image(block),
        Event::Error(block) => error(block),
    }
}

//! Renderer dispatch and end-to-end conversion.
//!
//!     Two ways to get from a parser to a renderer:
//!
//!     - Tree mode: the source is built into a [`Document`], optionally transformed, then
//!       flattened into the target renderer.
//!     - Streaming mode: parser events go straight into the renderer's listener; no tree is
//!       materialized, so macros are left as they are.
//!
//!     [`convert`] picks streaming mode when no transformation is requested.

use crate::error::{DocumentError, FormatError};
use crate::ir::document::Document;
use crate::ir::events::{Event, Listener};
use crate::mappings::nested_to_flat::flatten_into;
use crate::printer::{Printer, StringPrinter};
use crate::registry::SyntaxRegistry;
use crate::syntax::Syntax;
use crate::transform::{MacroTransformation, TransformReport};

/// Tree mode: renders a document with the renderer registered for `target`.
pub fn render_document(
    registry: &SyntaxRegistry,
    doc: &Document,
    target: &Syntax,
) -> Result<String, FormatError> {
    let mut printer = StringPrinter::new();
    render_to_printer(registry, doc, target, &mut printer)?;
    Ok(printer.into_string())
}

/// Tree mode onto a caller-supplied printer.
pub fn render_to_printer(
    registry: &SyntaxRegistry,
    doc: &Document,
    target: &Syntax,
    printer: &mut dyn Printer,
) -> Result<(), FormatError> {
    let renderer = registry.renderer(target)?;
    let mut listener = renderer.listener(printer);
    flatten_into(doc, listener.as_mut())
}

/// Renders an already flattened event sequence.
pub fn render_events(
    registry: &SyntaxRegistry,
    events: &[Event],
    target: &Syntax,
) -> Result<String, FormatError> {
    registry.renderer(target)?.render(events)
}

/// Forwards events while remembering the parser's `Error` events.
struct ErrorTee<'l> {
    inner: &'l mut dyn Listener,
    syntax: Syntax,
    errors: Vec<DocumentError>,
}

impl Listener for ErrorTee<'_> {
    fn on_event(&mut self, event: Event) -> Result<(), FormatError> {
        if let Event::Error(error) = &event {
            self.errors.push(DocumentError::Parse {
                description: error.description.clone(),
                syntax: error.syntax.clone().or_else(|| Some(self.syntax.clone())),
            });
        }
        self.inner.on_event(event)
    }
}

/// Streaming mode: parses `source` straight into the `to` renderer.
///
/// Returns the output and the errors the parser reported through `Error` events.
pub fn stream(
    registry: &SyntaxRegistry,
    source: &str,
    from: &Syntax,
    to: &Syntax,
) -> Result<(String, Vec<DocumentError>), FormatError> {
    let parser = registry.parser(from)?;
    let renderer = registry.renderer(to)?;

    let mut printer = StringPrinter::new();
    let errors = {
        let mut listener = renderer.listener(&mut printer);
        let mut tee = ErrorTee {
            inner: listener.as_mut(),
            syntax: from.clone(),
            errors: Vec::new(),
        };
        parser.parse(source, &mut tee)?;
        tee.errors
    };
    Ok((printer.into_string(), errors))
}

/// What to convert, and how.
pub struct ConvertRequest<'a> {
    pub source: &'a str,
    pub from: &'a Syntax,
    pub to: &'a Syntax,
    pub transformation: Option<&'a MacroTransformation<'a>>,
}

impl<'a> ConvertRequest<'a> {
    pub fn new(source: &'a str, from: &'a Syntax, to: &'a Syntax) -> Self {
        Self {
            source,
            from,
            to,
            transformation: None,
        }
    }

    /// Expands macros before rendering, which forces tree mode.
    pub fn with_transformation(mut self, transformation: &'a MacroTransformation<'a>) -> Self {
        self.transformation = Some(transformation);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub output: String,
    /// Non-fatal errors: parser `Error` events and failed macros.
    pub errors: Vec<DocumentError>,
    /// Present when the document went through the macro transformation.
    pub report: Option<TransformReport>,
}

pub fn convert(registry: &SyntaxRegistry, request: ConvertRequest<'_>) -> Result<Conversion, FormatError> {
    let Some(transformation) = request.transformation else {
        tracing::debug!(from = %request.from, to = %request.to, "Converting in streaming mode");
        let (output, errors) = stream(registry, request.source, request.from, request.to)?;
        return Ok(Conversion {
            output,
            errors,
            report: None,
        });
    };

    tracing::debug!(from = %request.from, to = %request.to, "Converting in tree mode");
    let mut doc = registry.parse(request.source, request.from)?;
    let report = transformation.transform(&mut doc)?;
    let output = render_document(registry, &doc, request.to)?;
    Ok(Conversion {
        output,
        errors: doc.errors().to_vec(),
        report: Some(report),
    })
}

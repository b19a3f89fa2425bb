//! Parser and Renderer contracts
//!
//! Dialects plug into Quill through two traits. A [`Parser`] turns source text into events pushed
//! into a [`Listener`]; a [`Renderer`] hands out a listener that turns events into text on a
//! [`Printer`]. Neither side ever sees the other: everything between them is the event grammar.
//!
//! # Examples
//!
//! ```ignore
//! struct Shout;
//!
//! impl Renderer for Shout {
//!     fn syntax(&self) -> Syntax {
//!         Syntax::new("shout", "1.0")
//!     }
//!
//!     fn listener<'p>(&self, printer: &'p mut dyn Printer) -> Box<dyn Listener + 'p> {
//!         Box::new(ShoutListener { printer })
//!     }
//! }
//! ```

use crate::error::{DocumentError, FormatError};
use crate::ir::document::Document;
use crate::ir::events::{Event, Listener};
use crate::mappings::flat_to_nested::TreeBuilder;
use crate::mappings::nested_to_flat::flatten_into;
use crate::printer::{Printer, StringPrinter};
use crate::syntax::Syntax;

/// Reads one dialect into events.
pub trait Parser: Send + Sync {
    /// The syntax this parser reads.
    fn syntax(&self) -> Syntax;

    /// Optional description of this parser
    fn description(&self) -> &str {
        ""
    }

    /// Pushes the events of `source` into `listener`.
    ///
    /// Hard failures are [`FormatError::Parse`]; recoverable problems should be reported as
    /// `Event::Error` and parsing should carry on. Errors returned by the listener are
    /// propagated unchanged.
    fn parse(&self, source: &str, listener: &mut dyn Listener) -> Result<(), FormatError>;

    /// Parses `source` into a tree tagged with this parser's syntax.
    fn parse_document(&self, source: &str) -> Result<Document, FormatError> {
        self.parse_partial(source).into_result()
    }

    /// Parses `source`, keeping the blocks built before a failure.
    ///
    /// On failure the partial document also records the error as a [`DocumentError::Parse`].
    fn parse_partial(&self, source: &str) -> ParseOutcome {
        let mut builder = TreeBuilder::new().with_syntax(self.syntax());
        let parsed = self.parse(source, &mut builder);
        let (mut document, unclosed) = builder.finish_partial();
        let error = match parsed {
            Err(err) => Some(err),
            Ok(()) => unclosed.map(FormatError::from),
        };
        if let Some(err) = &error {
            document.record_error(DocumentError::Parse {
                description: err.to_string(),
                syntax: None,
            });
        }
        ParseOutcome { document, error }
    }
}

/// A parsed document, possibly cut short by `error`.
#[derive(Debug)]
pub struct ParseOutcome {
    pub document: Document,
    pub error: Option<FormatError>,
}

impl ParseOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// The document when parsing succeeded, the error otherwise.
    pub fn into_result(self) -> Result<Document, FormatError> {
        match self.error {
            None => Ok(self.document),
            Some(err) => Err(err),
        }
    }
}

/// Writes events out in one dialect.
pub trait Renderer: Send + Sync {
    /// The syntax this renderer writes.
    fn syntax(&self) -> Syntax;

    /// Optional description of this renderer
    fn description(&self) -> &str {
        ""
    }

    /// A fresh listener printing onto `printer`. One listener renders one document.
    fn listener<'p>(&self, printer: &'p mut dyn Printer) -> Box<dyn Listener + 'p>;

    /// Renders a complete event sequence into a string.
    fn render(&self, events: &[Event]) -> Result<String, FormatError> {
        let mut printer = StringPrinter::new();
        {
            let mut listener = self.listener(&mut printer);
            for event in events {
                listener.on_event(event.clone())?;
            }
        }
        Ok(printer.into_string())
    }

    /// Renders a tree without materializing its event vector.
    fn render_document(&self, doc: &Document) -> Result<String, FormatError> {
        let mut printer = StringPrinter::new();
        {
            let mut listener = self.listener(&mut printer);
            flatten_into(doc, listener.as_mut())?;
        }
        Ok(printer.into_string())
    }
}

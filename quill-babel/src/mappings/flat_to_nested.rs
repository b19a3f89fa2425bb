//! Converts a flat event stream into an XDOM tree.
//!
//! # The High-Level Concept
//!
//! The core challenge is to reconstruct a tree structure from a linear sequence of events.
//! The builder uses a stack to keep track of the current nesting level. The stack acts as a
//! memory of "open" containers. When we encounter a `Begin` event we append the new container
//! to the current parent and push it, making it the new "current" container. When we see its
//! `End` event we pop it, returning to the parent.
//!
//! # The Algorithm
//!
//! 1. **`BeginDocument`:**
//!    - Create the [`Document`] and push its root as the current container
//!
//! 2. **Other `Begin` events:**
//!    - Append the matching block to the current container
//!    - Push it onto the stack
//!
//! 3. **Leaf events:**
//!    - Append the block to the current container, stack untouched
//!    - `Error` events additionally record a [`DocumentError::Parse`] on the document
//!
//! 4. **`End` events:**
//!    - Pop the current container and check the event closes that kind of block
//!    - The `End` payload must equal the `Begin` payload, since flattening rebuilds it from
//!      the block
//!
//! 5. **Completion:**
//!    - After `EndDocument` the stack is empty and the document is complete
//!
//! The builder is a [`Listener`], so a parser can stream straight into it. Parameters of any
//! key are stored verbatim; the builder never interprets them.

use crate::error::{DocumentError, FormatError};
use crate::ir::document::{BlockId, Document, TreeError};
use crate::ir::events::{Event, Listener};
use crate::ir::nodes::{Block, BlockKind};
use crate::mappings::nested_to_flat::closing_event;
use crate::syntax::Syntax;
use thiserror::Error;

/// Structural violation in an event stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedStreamError {
    /// An `End` event arrived with no container open
    #[error("unexpected {0}: no open container to close")]
    UnexpectedEnd(String),
    /// An `End` event does not close the innermost open container
    #[error("mismatched events: expected {expected}, found {found}")]
    MismatchedEvents { expected: String, found: String },
    /// Content before `BeginDocument`
    #[error("{0} received before beginDocument")]
    ContentOutsideDocument(String),
    /// Events remaining after document end
    #[error("extra events after endDocument")]
    ExtraEvents,
    /// Stream ended (or the document was closed) with containers still open
    #[error("unclosed containers: {0} blocks remain open")]
    UnclosedContainers(usize),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

enum Shape {
    Begin(Block),
    End { kind: BlockKind, level: Option<usize> },
    Leaf(Block),
}

fn shape(event: Event) -> Shape {
    use Shape::{Begin, End, Leaf};
    match event {
        Event::BeginDocument(parameters) => Begin(Block::Document { parameters }),
        Event::EndDocument(_) => End {
            kind: BlockKind::Document,
            level: None,
        },
        Event::BeginSection { level, parameters } => Begin(Block::Section { level, parameters }),
        Event::EndSection { level, .. } => End {
            kind: BlockKind::Section,
            level: Some(level),
        },
        Event::BeginHeader {
            level,
            id,
            parameters,
        } => Begin(Block::Header {
            level,
            id,
            parameters,
        }),
        Event::EndHeader { level, .. } => End {
            kind: BlockKind::Header,
            level: Some(level),
        },
        Event::BeginParagraph(parameters) => Begin(Block::Paragraph { parameters }),
        Event::EndParagraph(_) => end(BlockKind::Paragraph),
        Event::BeginList { kind, parameters } => Begin(Block::List { kind, parameters }),
        Event::EndList { .. } => end(BlockKind::List),
        Event::BeginListItem(parameters) => Begin(Block::ListItem { parameters }),
        Event::EndListItem(_) => end(BlockKind::ListItem),
        Event::BeginDefinitionList(parameters) => Begin(Block::DefinitionList { parameters }),
        Event::EndDefinitionList(_) => end(BlockKind::DefinitionList),
        Event::BeginDefinitionTerm(parameters) => Begin(Block::DefinitionTerm { parameters }),
        Event::EndDefinitionTerm(_) => end(BlockKind::DefinitionTerm),
        Event::BeginDefinitionDescription(parameters) => {
            Begin(Block::DefinitionDescription { parameters })
        }
        Event::EndDefinitionDescription(_) => end(BlockKind::DefinitionDescription),
        Event::BeginTable(parameters) => Begin(Block::Table { parameters }),
        Event::EndTable(_) => end(BlockKind::Table),
        Event::BeginTableRow(parameters) => Begin(Block::TableRow { parameters }),
        Event::EndTableRow(_) => end(BlockKind::TableRow),
        Event::BeginTableCell { header, parameters } => {
            Begin(Block::TableCell { header, parameters })
        }
        Event::EndTableCell { .. } => end(BlockKind::TableCell),
        Event::BeginQuotation(parameters) => Begin(Block::Quotation { parameters }),
        Event::EndQuotation(_) => end(BlockKind::Quotation),
        Event::BeginGroup(parameters) => Begin(Block::Group { parameters }),
        Event::EndGroup(_) => end(BlockKind::Group),
        Event::BeginFormat { styles, parameters } => Begin(Block::Format { styles, parameters }),
        Event::EndFormat { .. } => end(BlockKind::Format),
        Event::BeginMacroMarker(call) => Begin(Block::Macro(call)),
        Event::EndMacroMarker(_) => end(BlockKind::Macro),
        Event::BeginMetaData(metadata) => Begin(Block::MetaData { metadata }),
        Event::EndMetaData(_) => end(BlockKind::MetaData),
        Event::Word(text) => Leaf(Block::Word { text }),
        Event::Space => Leaf(Block::Space),
        Event::SpecialSymbol(symbol) => Leaf(Block::SpecialSymbol { symbol }),
        Event::NewLine => Leaf(Block::NewLine),
        Event::EmptyLines(count) => Leaf(Block::EmptyLines { count }),
        Event::HorizontalLine(parameters) => Leaf(Block::HorizontalLine { parameters }),
        Event::Verbatim {
            content,
            inline,
            parameters,
        } => Leaf(Block::Verbatim {
            content,
            inline,
            parameters,
        }),
        Event::RawText { syntax, content } => Leaf(Block::Raw { syntax, content }),
        Event::Link(link) => Leaf(Block::Link(link)),
        Event::Image(image) => Leaf(Block::Image(image)),
        Event::Error(error) => Leaf(Block::Error(error)),
    }
}

fn end(kind: BlockKind) -> Shape {
    Shape::End { kind, level: None }
}

/// Listener name of the event closing `block`, for error messages.
fn closing_name(block: &Block) -> String {
    match block.kind() {
        BlockKind::Macro => "endMacroMarker".to_string(),
        kind => format!("end{:?}", kind),
    }
}

fn describe(event: Option<&Event>) -> String {
    event.map_or_else(|| "nothing".to_string(), |event| format!("{:?}", event))
}

fn level_of(block: &Block) -> Option<usize> {
    match block {
        Block::Section { level, .. } | Block::Header { level, .. } => Some(*level),
        _ => None,
    }
}

/// Incremental event stream → [`Document`] builder.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    document: Option<Document>,
    stack: Vec<BlockId>,
    closed: bool,
    syntax: Option<Syntax>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `syntax` as the source syntax of the built document.
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    /// True once `EndDocument` has closed the root.
    pub fn is_complete(&self) -> bool {
        self.closed
    }

    fn current(&mut self, event_name: &str) -> Result<(&mut Document, BlockId), MalformedStreamError> {
        let parent = self.stack.last().copied();
        match (self.document.as_mut(), parent) {
            (Some(doc), Some(parent)) => Ok((doc, parent)),
            _ => Err(MalformedStreamError::ContentOutsideDocument(
                event_name.to_string(),
            )),
        }
    }

    /// Feeds one event.
    pub fn push(&mut self, event: Event) -> Result<(), MalformedStreamError> {
        if self.closed {
            return Err(MalformedStreamError::ExtraEvents);
        }
        let name = event.name();
        let end_event = event.is_end().then(|| event.clone());

        match shape(event) {
            Shape::Begin(Block::Document { parameters }) => {
                if self.document.is_some() {
                    return Err(MalformedStreamError::MismatchedEvents {
                        expected: "content or endDocument".to_string(),
                        found: name.to_string(),
                    });
                }
                let mut doc = Document::new(parameters);
                doc.set_syntax(self.syntax.clone());
                self.stack.push(doc.root());
                self.document = Some(doc);
            }
            Shape::Begin(block) => {
                let (doc, parent) = self.current(name)?;
                let id = doc.append_child(parent, block)?;
                self.stack.push(id);
            }
            Shape::Leaf(block) => {
                let source_syntax = self.syntax.clone();
                let (doc, parent) = self.current(name)?;
                if let Block::Error(error) = &block {
                    doc.record_error(DocumentError::Parse {
                        description: error.description.clone(),
                        syntax: error.syntax.clone().or(source_syntax),
                    });
                }
                doc.append_child(parent, block)?;
            }
            Shape::End { kind, level } => self.close(name, kind, level, end_event)?,
        }
        Ok(())
    }

    fn close(
        &mut self,
        name: &str,
        kind: BlockKind,
        level: Option<usize>,
        event: Option<Event>,
    ) -> Result<(), MalformedStreamError> {
        let (Some(doc), Some(&top)) = (self.document.as_ref(), self.stack.last()) else {
            return Err(MalformedStreamError::UnexpectedEnd(name.to_string()));
        };
        let open = doc.block(top).ok_or(TreeError::UnknownBlock(top))?;

        if kind == BlockKind::Document && open.kind() != BlockKind::Document {
            return Err(MalformedStreamError::UnclosedContainers(self.stack.len() - 1));
        }
        if open.kind() != kind || level_of(open) != level {
            let found = match level {
                Some(level) => format!("{}({})", name, level),
                None => name.to_string(),
            };
            let expected = match level_of(open) {
                Some(level) => format!("{}({})", closing_name(open), level),
                None => closing_name(open),
            };
            return Err(MalformedStreamError::MismatchedEvents { expected, found });
        }
        let expected = closing_event(open);
        if expected != event {
            return Err(MalformedStreamError::MismatchedEvents {
                expected: describe(expected.as_ref()),
                found: describe(event.as_ref()),
            });
        }

        self.stack.pop();
        if self.stack.is_empty() {
            self.closed = true;
        }
        Ok(())
    }

    /// Completes the build.
    ///
    /// An empty stream yields an empty document; a stream that opened the document but never
    /// closed it is an error.
    pub fn finish(self) -> Result<Document, MalformedStreamError> {
        match self.finish_partial() {
            (doc, None) => Ok(doc),
            (_, Some(err)) => Err(err),
        }
    }

    /// Completes the build, keeping what was built when the stream was cut short.
    ///
    /// Containers still open keep the children they received; the error says how many there
    /// were.
    pub fn finish_partial(self) -> (Document, Option<MalformedStreamError>) {
        match self.document {
            None => {
                let mut doc = Document::default();
                doc.set_syntax(self.syntax);
                (doc, None)
            }
            Some(doc) if !self.closed => {
                let open = self.stack.len();
                (doc, Some(MalformedStreamError::UnclosedContainers(open)))
            }
            Some(doc) => (doc, None),
        }
    }
}

impl Listener for TreeBuilder {
    fn on_event(&mut self, event: Event) -> Result<(), FormatError> {
        self.push(event).map_err(FormatError::from)
    }
}

/// Builds a tree from a complete event stream.
///
/// # Example
///
/// ```ignore
/// let doc = build_tree(vec![
///     Event::BeginDocument(Parameters::new()),
///     Event::BeginParagraph(Parameters::new()),
///     Event::Word("Hello".to_string()),
///     Event::EndParagraph(Parameters::new()),
///     Event::EndDocument(Parameters::new()),
/// ])?;
/// assert_eq!(doc.children(doc.root()).len(), 1);
/// ```
pub fn build_tree(events: impl IntoIterator<Item = Event>) -> Result<Document, MalformedStreamError> {
    let mut builder = TreeBuilder::new();
    for event in events {
        builder.push(event)?;
    }
    builder.finish()
}

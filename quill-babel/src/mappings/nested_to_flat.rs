//! Converts an XDOM tree into a flat event stream.
//!
//! # The High-Level Concept
//!
//! Traversing the tree in pre-order lets us emit a sequence of begin/leaf/end events that can
//! later be reassembled into the original tree. Each container produces its own begin/end
//! markers around its children; leaves produce a single event in place.
//!
//! # The Algorithm
//!
//! 1. **Entering Containers:**
//!    - Emit the corresponding `Begin*` event
//!    - Recurse into child blocks
//!
//! 2. **Handling Leaves:**
//!    - Leaf blocks become a single event in place
//!
//! 3. **Exiting Containers:**
//!    - Emit the matching `End*` event, carrying the same payload as the `Begin*`
//!
//! This mirrors the reverse process performed in `flat_to_nested`, so
//! `flatten(build_tree(events)) == events` for every well-formed stream.

use crate::error::FormatError;
use crate::ir::document::TreeError;
use crate::mappings::flat_to_nested::MalformedStreamError;
use crate::ir::document::{BlockId, Document};
use crate::ir::events::{Event, Listener};
use crate::ir::nodes::{Block, BlockNode};

enum Emit {
    Container(Event, Event),
    Leaf(Event),
}

fn emit(block: &Block) -> Emit {
    use Emit::{Container, Leaf};
    match block.clone() {
        Block::Document { parameters } => Container(
            Event::BeginDocument(parameters.clone()),
            Event::EndDocument(parameters),
        ),
        Block::Section { level, parameters } => Container(
            Event::BeginSection {
                level,
                parameters: parameters.clone(),
            },
            Event::EndSection { level, parameters },
        ),
        Block::Header {
            level,
            id,
            parameters,
        } => Container(
            Event::BeginHeader {
                level,
                id: id.clone(),
                parameters: parameters.clone(),
            },
            Event::EndHeader {
                level,
                id,
                parameters,
            },
        ),
        Block::Paragraph { parameters } => Container(
            Event::BeginParagraph(parameters.clone()),
            Event::EndParagraph(parameters),
        ),
        Block::List { kind, parameters } => Container(
            Event::BeginList {
                kind,
                parameters: parameters.clone(),
            },
            Event::EndList { kind, parameters },
        ),
        Block::ListItem { parameters } => Container(
            Event::BeginListItem(parameters.clone()),
            Event::EndListItem(parameters),
        ),
        Block::DefinitionList { parameters } => Container(
            Event::BeginDefinitionList(parameters.clone()),
            Event::EndDefinitionList(parameters),
        ),
        Block::DefinitionTerm { parameters } => Container(
            Event::BeginDefinitionTerm(parameters.clone()),
            Event::EndDefinitionTerm(parameters),
        ),
        Block::DefinitionDescription { parameters } => Container(
            Event::BeginDefinitionDescription(parameters.clone()),
            Event::EndDefinitionDescription(parameters),
        ),
        Block::Table { parameters } => Container(
            Event::BeginTable(parameters.clone()),
            Event::EndTable(parameters),
        ),
        Block::TableRow { parameters } => Container(
            Event::BeginTableRow(parameters.clone()),
            Event::EndTableRow(parameters),
        ),
        Block::TableCell { header, parameters } => Container(
            Event::BeginTableCell {
                header,
                parameters: parameters.clone(),
            },
            Event::EndTableCell { header, parameters },
        ),
        Block::Quotation { parameters } => Container(
            Event::BeginQuotation(parameters.clone()),
            Event::EndQuotation(parameters),
        ),
        Block::Group { parameters } => Container(
            Event::BeginGroup(parameters.clone()),
            Event::EndGroup(parameters),
        ),
        Block::Format { styles, parameters } => Container(
            Event::BeginFormat {
                styles: styles.clone(),
                parameters: parameters.clone(),
            },
            Event::EndFormat { styles, parameters },
        ),
        Block::Macro(call) => Container(
            Event::BeginMacroMarker(call.clone()),
            Event::EndMacroMarker(call),
        ),
        Block::MetaData { metadata } => Container(
            Event::BeginMetaData(metadata.clone()),
            Event::EndMetaData(metadata),
        ),
        Block::Word { text } => Leaf(Event::Word(text)),
        Block::Space => Leaf(Event::Space),
        Block::SpecialSymbol { symbol } => Leaf(Event::SpecialSymbol(symbol)),
        Block::NewLine => Leaf(Event::NewLine),
        Block::EmptyLines { count } => Leaf(Event::EmptyLines(count)),
        Block::HorizontalLine { parameters } => Leaf(Event::HorizontalLine(parameters)),
        Block::Verbatim {
            content,
            inline,
            parameters,
        } => Leaf(Event::Verbatim {
            content,
            inline,
            parameters,
        }),
        Block::Raw { syntax, content } => Leaf(Event::RawText { syntax, content }),
        Block::Link(link) => Leaf(Event::Link(link)),
        Block::Image(image) => Leaf(Event::Image(image)),
        Block::Error(error) => Leaf(Event::Error(error)),
    }
}

/// The `End*` event that closes `block`, or `None` for leaves.
pub(crate) fn closing_event(block: &Block) -> Option<Event> {
    match emit(block) {
        Emit::Container(_, end) => Some(end),
        Emit::Leaf(_) => None,
    }
}

/// Converts a document to a flat vector of events.
pub fn flatten(doc: &Document) -> Vec<Event> {
    let mut events: Vec<Event> = Vec::new();
    // Collecting into a Vec never fails.
    let _ = flatten_into(doc, &mut events);
    events
}

/// Streams the document's events into `listener`, stopping at the first listener error.
pub fn flatten_into(doc: &Document, listener: &mut dyn Listener) -> Result<(), FormatError> {
    walk_block(doc, doc.root(), listener)
}

fn walk_block(doc: &Document, id: BlockId, listener: &mut dyn Listener) -> Result<(), FormatError> {
    let Some(block) = doc.block(id) else {
        return Ok(());
    };
    match emit(block) {
        Emit::Leaf(event) => listener.on_event(event),
        Emit::Container(begin, end) => {
            listener.on_event(begin)?;
            for child in doc.children(id) {
                walk_block(doc, *child, listener)?;
            }
            listener.on_event(end)
        }
    }
}

/// Events of a detached subtree. Emission stops at a leaf that carries children.
pub fn node_to_events(node: &BlockNode) -> Vec<Event> {
    let mut events: Vec<Event> = Vec::new();
    let _ = node_into(node, &mut events);
    events
}

/// Streams a detached subtree's events into `listener`.
///
/// A leaf block with children has no event form and is rejected rather than emitted without
/// them.
pub fn node_into(node: &BlockNode, listener: &mut dyn Listener) -> Result<(), FormatError> {
    match emit(&node.block) {
        Emit::Leaf(_) if !node.children.is_empty() => Err(MalformedStreamError::from(
            TreeError::LeafWithChildren(node.block.kind()),
        )
        .into()),
        Emit::Leaf(event) => listener.on_event(event),
        Emit::Container(begin, end) => {
            listener.on_event(begin)?;
            for child in &node.children {
                node_into(child, listener)?;
            }
            listener.on_event(end)
        }
    }
}

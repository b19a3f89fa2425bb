//! Defines the flat event stream representation of a document.
//!
//!     Parsers push these events into a [`Listener`]; renderers are listeners. Every `Begin*`
//!     event is closed by exactly one `End*` event of the same kind at the same depth, and the
//!     `End*` event mirrors the payload of its `Begin*` (same level, same parameters). Spans never
//!     overlap. Leaf events (`Word`, `Space`, `Link`, ...) have no end.

use crate::error::FormatError;
use crate::ir::nodes::{ErrorBlock, ImageBlock, LinkBlock, MacroBlock};
use crate::parameters::Parameters;
use crate::syntax::Syntax;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Kind of a list container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListKind {
    Bulleted,
    Numbered,
}

/// A single inline formatting style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    Bold,
    Italic,
    Underlined,
    Strikedout,
    Superscript,
    Subscript,
    Monospace,
}

/// The set of styles applied by a format span.
pub type Styles = BTreeSet<Style>;

/// Represents a single event in the document stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum Event {
    BeginDocument(Parameters),
    EndDocument(Parameters),
    BeginSection {
        level: usize,
        parameters: Parameters,
    },
    EndSection {
        level: usize,
        parameters: Parameters,
    },
    BeginHeader {
        level: usize,
        id: Option<String>,
        parameters: Parameters,
    },
    EndHeader {
        level: usize,
        id: Option<String>,
        parameters: Parameters,
    },
    BeginParagraph(Parameters),
    EndParagraph(Parameters),
    BeginList {
        kind: ListKind,
        parameters: Parameters,
    },
    EndList {
        kind: ListKind,
        parameters: Parameters,
    },
    BeginListItem(Parameters),
    EndListItem(Parameters),
    BeginDefinitionList(Parameters),
    EndDefinitionList(Parameters),
    BeginDefinitionTerm(Parameters),
    EndDefinitionTerm(Parameters),
    BeginDefinitionDescription(Parameters),
    EndDefinitionDescription(Parameters),
    BeginTable(Parameters),
    EndTable(Parameters),
    BeginTableRow(Parameters),
    EndTableRow(Parameters),
    BeginTableCell {
        header: bool,
        parameters: Parameters,
    },
    EndTableCell {
        header: bool,
        parameters: Parameters,
    },
    BeginQuotation(Parameters),
    EndQuotation(Parameters),
    BeginGroup(Parameters),
    EndGroup(Parameters),
    BeginFormat {
        styles: Styles,
        parameters: Parameters,
    },
    EndFormat {
        styles: Styles,
        parameters: Parameters,
    },
    BeginMacroMarker(MacroBlock),
    EndMacroMarker(MacroBlock),
    BeginMetaData(Parameters),
    EndMetaData(Parameters),
    Word(String),
    Space,
    SpecialSymbol(char),
    NewLine,
    EmptyLines(usize),
    HorizontalLine(Parameters),
    Verbatim {
        content: String,
        inline: bool,
        parameters: Parameters,
    },
    RawText {
        syntax: Syntax,
        content: String,
    },
    Link(LinkBlock),
    Image(ImageBlock),
    Error(ErrorBlock),
}

impl Event {
    /// Listener-style name of the event (`beginParagraph`, `onWord`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Event::BeginDocument(_) => "beginDocument",
            Event::EndDocument(_) => "endDocument",
            Event::BeginSection { .. } => "beginSection",
            Event::EndSection { .. } => "endSection",
            Event::BeginHeader { .. } => "beginHeader",
            Event::EndHeader { .. } => "endHeader",
            Event::BeginParagraph(_) => "beginParagraph",
            Event::EndParagraph(_) => "endParagraph",
            Event::BeginList { .. } => "beginList",
            Event::EndList { .. } => "endList",
            Event::BeginListItem(_) => "beginListItem",
            Event::EndListItem(_) => "endListItem",
            Event::BeginDefinitionList(_) => "beginDefinitionList",
            Event::EndDefinitionList(_) => "endDefinitionList",
            Event::BeginDefinitionTerm(_) => "beginDefinitionTerm",
            Event::EndDefinitionTerm(_) => "endDefinitionTerm",
            Event::BeginDefinitionDescription(_) => "beginDefinitionDescription",
            Event::EndDefinitionDescription(_) => "endDefinitionDescription",
            Event::BeginTable(_) => "beginTable",
            Event::EndTable(_) => "endTable",
            Event::BeginTableRow(_) => "beginTableRow",
            Event::EndTableRow(_) => "endTableRow",
            Event::BeginTableCell { .. } => "beginTableCell",
            Event::EndTableCell { .. } => "endTableCell",
            Event::BeginQuotation(_) => "beginQuotation",
            Event::EndQuotation(_) => "endQuotation",
            Event::BeginGroup(_) => "beginGroup",
            Event::EndGroup(_) => "endGroup",
            Event::BeginFormat { .. } => "beginFormat",
            Event::EndFormat { .. } => "endFormat",
            Event::BeginMacroMarker(_) => "beginMacroMarker",
            Event::EndMacroMarker(_) => "endMacroMarker",
            Event::BeginMetaData(_) => "beginMetaData",
            Event::EndMetaData(_) => "endMetaData",
            Event::Word(_) => "onWord",
            Event::Space => "onSpace",
            Event::SpecialSymbol(_) => "onSpecialSymbol",
            Event::NewLine => "onNewLine",
            Event::EmptyLines(_) => "onEmptyLines",
            Event::HorizontalLine(_) => "onHorizontalLine",
            Event::Verbatim { .. } => "onVerbatim",
            Event::RawText { .. } => "onRawText",
            Event::Link(_) => "onLink",
            Event::Image(_) => "onImage",
            Event::Error(_) => "onError",
        }
    }

    pub fn is_begin(&self) -> bool {
        self.name().starts_with("begin")
    }

    pub fn is_end(&self) -> bool {
        self.name().starts_with("end")
    }
}

/// Receiver of a document event stream.
///
/// Tree builders, renderers and any stream filter in between implement this. Errors abort the
/// stream; the emitter is expected to stop and propagate them.
pub trait Listener {
    fn on_event(&mut self, event: Event) -> Result<(), FormatError>;
}

/// Collects the stream as-is.
impl Listener for Vec<Event> {
    fn on_event(&mut self, event: Event) -> Result<(), FormatError> {
        self.push(event);
        Ok(())
    }
}

impl<L: Listener + ?Sized> Listener for &mut L {
    fn on_event(&mut self, event: Event) -> Result<(), FormatError> {
        (**self).on_event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_listener_convention() {
        assert_eq!(Event::BeginParagraph(Parameters::new()).name(), "beginParagraph");
        assert_eq!(Event::Word("hi".to_string()).name(), "onWord");
        assert!(Event::BeginGroup(Parameters::new()).is_begin());
        assert!(Event::EndGroup(Parameters::new()).is_end());
        assert!(!Event::Space.is_begin() && !Event::Space.is_end());
    }

    #[test]
    fn events_serialize_adjacently_tagged() {
        let json = serde_json::to_string(&Event::Word("hi".to_string())).unwrap();
        assert_eq!(json, r#"{"event":"word","data":"hi"}"#);
        let space = serde_json::to_string(&Event::Space).unwrap();
        assert_eq!(space, r#"{"event":"space"}"#);
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Event::Word("hi".to_string()));
    }

    #[test]
    fn vec_collects_events() {
        let mut events: Vec<Event> = Vec::new();
        events.on_event(Event::Space).unwrap();
        events.on_event(Event::NewLine).unwrap();
        assert_eq!(events, vec![Event::Space, Event::NewLine]);
    }
}

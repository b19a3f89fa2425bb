//! XDOM JSON interchange
//!
//!     `xdom+json/1.0` is the block tree written as nested JSON objects. Each object carries the
//!     block's `type` tag, its payload fields and, for containers with content, a `children`
//!     array:
//!
//!     ```text
//!     {
//!       "type": "document",
//!       "parameters": {},
//!       "children": [
//!         { "type": "paragraph", "parameters": {}, "children": [ { "type": "word", "text": "Hi" } ] }
//!       ]
//!     }
//!     ```
//!
//!     Parameter maps keep their key order and children keep document order, so parsing the
//!     rendered JSON yields the same event stream.

use crate::error::{FormatError, ParseError};
use crate::format::{Parser, Renderer};
use crate::ir::events::{Event, Listener};
use crate::ir::nodes::{Block, BlockNode};
use crate::mappings::flat_to_nested::{MalformedStreamError, TreeBuilder};
use crate::mappings::nested_to_flat::node_into;
use crate::printer::Printer;
use crate::syntax::Syntax;

/// Parser reading `xdom+json/1.0`.
pub struct JsonParser;

impl Parser for JsonParser {
    fn syntax(&self) -> Syntax {
        Syntax::xdom_json_1_0()
    }

    fn description(&self) -> &str {
        "XDOM block tree as JSON"
    }

    fn parse(&self, source: &str, listener: &mut dyn Listener) -> Result<(), FormatError> {
        let node: BlockNode = serde_json::from_str(source).map_err(|err| {
            ParseError::new(err.to_string())
                .with_syntax(self.syntax())
                .at(err.line(), err.column())
        })?;
        if !matches!(node.block, Block::Document { .. }) {
            return Err(ParseError::new("the root object must be a document block")
                .with_syntax(self.syntax())
                .into());
        }
        if let Some(kind) = node.misplaced_children() {
            return Err(ParseError::new(format!("a {:?} block cannot have children", kind))
                .with_syntax(self.syntax())
                .into());
        }
        node_into(&node, listener)
    }
}

/// Renderer writing `xdom+json/1.0`.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn syntax(&self) -> Syntax {
        Syntax::xdom_json_1_0()
    }

    fn description(&self) -> &str {
        "XDOM block tree as JSON"
    }

    fn listener<'p>(&self, printer: &'p mut dyn Printer) -> Box<dyn Listener + 'p> {
        Box::new(JsonPrinter {
            printer,
            builder: Some(TreeBuilder::new()),
        })
    }
}

/// Buffers the stream into a tree and prints it once the document is closed.
struct JsonPrinter<'p> {
    printer: &'p mut dyn Printer,
    builder: Option<TreeBuilder>,
}

impl Listener for JsonPrinter<'_> {
    fn on_event(&mut self, event: Event) -> Result<(), FormatError> {
        let builder = self
            .builder
            .as_mut()
            .ok_or(MalformedStreamError::ExtraEvents)?;
        builder.push(event)?;
        if !builder.is_complete() {
            return Ok(());
        }

        if let Some(builder) = self.builder.take() {
            let doc = builder.finish()?;
            let json = serde_json::to_string_pretty(&doc.to_root_node())
                .map_err(|err| FormatError::SerializationError(err.to_string()))?;
            self.printer.println(&json);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappings::flatten;
    use crate::parameters::{parameters, Parameters};

    fn sample() -> Vec<Event> {
        vec![
            Event::BeginDocument(Parameters::new()),
            Event::BeginParagraph(parameters([("z", "1"), ("a", "2")])),
            Event::Word("Hi".to_string()),
            Event::EndParagraph(parameters([("z", "1"), ("a", "2")])),
            Event::EndDocument(Parameters::new()),
        ]
    }

    #[test]
    fn rendered_json_parses_back_to_the_same_events() {
        let json = JsonRenderer.render(&sample()).unwrap();
        let doc = JsonParser.parse_document(&json).unwrap();
        assert_eq!(flatten(&doc), sample());
    }

    #[test]
    fn parameter_order_is_kept_in_json() {
        let json = JsonRenderer.render(&sample()).unwrap();
        let z = json.find("\"z\"").unwrap();
        let a = json.find("\"a\"").unwrap();
        assert!(z < a);
    }

    #[test]
    fn invalid_json_reports_position() {
        let err = JsonParser.parse_document("{\n  \"type\": ").unwrap_err();
        match err {
            FormatError::Parse(parse) => {
                assert_eq!(parse.syntax, Some(Syntax::xdom_json_1_0()));
                assert_eq!(parse.position.map(|p| p.line), Some(2));
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn root_must_be_a_document() {
        let err = JsonParser
            .parse_document(r#"{"type":"paragraph"}"#)
            .unwrap_err();
        assert!(matches!(err, FormatError::Parse(_)));
    }

    #[test]
    fn leaf_with_children_is_rejected() {
        let source = r#"{"type":"document","children":[
            {"type":"word","text":"x","children":[{"type":"word","text":"lost"}]}
        ]}"#;
        match JsonParser.parse_document(source).unwrap_err() {
            FormatError::Parse(parse) => {
                assert_eq!(parse.message, "a Word block cannot have children");
                assert_eq!(parse.syntax, Some(Syntax::xdom_json_1_0()));
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn events_after_document_end_are_rejected() {
        let mut events = sample();
        events.push(Event::Space);
        assert!(JsonRenderer.render(&events).is_err());
    }
}

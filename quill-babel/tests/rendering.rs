//! Snapshots of the built-in renderers
//!
//! Each snapshot pins the exact output of a renderer for a small document, in streaming mode
//! and in tree mode after the macro transformation.

use quill_babel::convert::{render_document, stream};
use quill_babel::{convert, ConvertRequest, MacroRegistry, MacroTransformation, Syntax, SyntaxRegistry};
use rstest::rstest;

const PLAIN_SAMPLE: &str = "Hello world\n\nBye!";

const MACRO_SAMPLE: &str = r#"{"type":"document","children":[{"type":"macro","id":"info","parameters":{"title":"Note"},"content":{"text":"Read me"}}]}"#;

fn streamed(source: &str, from: Syntax, to: Syntax) -> String {
    let registry = SyntaxRegistry::with_defaults();
    let (output, errors) = stream(&registry, source, &from, &to).unwrap();
    assert!(errors.is_empty(), "{:?}", errors);
    output
}

fn transformed(source: &str, from: Syntax, to: Syntax) -> String {
    let registry = SyntaxRegistry::with_defaults();
    let macros = MacroRegistry::with_defaults();
    let transformation = MacroTransformation::new(&macros);
    let conversion = convert(
        &registry,
        ConvertRequest::new(source, &from, &to).with_transformation(&transformation),
    )
    .unwrap();
    assert!(conversion.errors.is_empty(), "{:?}", conversion.errors);
    conversion.output
}

#[test]
fn plain_text_as_events() {
    let output = streamed(PLAIN_SAMPLE, Syntax::plain_1_0(), Syntax::event_1_0());
    insta::assert_snapshot!(output.trim_end(), @r"
beginDocument
  beginParagraph
    onWord [Hello]
    onSpace
    onWord [world]
  endParagraph
  beginParagraph
    onWord [Bye]
    onSpecialSymbol [!]
  endParagraph
endDocument
");
}

#[test]
fn plain_text_as_json() {
    let output = streamed("Hi you", Syntax::plain_1_0(), Syntax::xdom_json_1_0());
    insta::assert_snapshot!(output.trim_end(), @r#"
{
  "type": "document",
  "parameters": {},
  "children": [
    {
      "type": "paragraph",
      "parameters": {},
      "children": [
        {
          "type": "word",
          "text": "Hi"
        },
        {
          "type": "space"
        },
        {
          "type": "word",
          "text": "you"
        }
      ]
    }
  ]
}
"#);
}

#[test]
fn streaming_mode_keeps_macro_markers() {
    let output = streamed(MACRO_SAMPLE, Syntax::xdom_json_1_0(), Syntax::event_1_0());
    insta::assert_snapshot!(output.trim_end(), @r"
beginDocument
  beginMacroMarker [info] [title]=[Note] [Read me]
  endMacroMarker [info] [title]=[Note] [Read me]
endDocument
");
}

#[test]
fn expanded_message_box_as_events() {
    let output = transformed(MACRO_SAMPLE, Syntax::xdom_json_1_0(), Syntax::event_1_0());
    insta::assert_snapshot!(output.trim_end(), @r"
beginDocument
  beginGroup [class]=[box infomessage]
    beginParagraph
      beginFormat [BOLD]
        onWord [Note]
      endFormat [BOLD]
    endParagraph
    beginParagraph
      onWord [Read]
      onSpace
      onWord [me]
    endParagraph
  endGroup [class]=[box infomessage]
endDocument
");
}

#[test]
fn expanded_message_box_as_plain_text() {
    let output = transformed(MACRO_SAMPLE, Syntax::xdom_json_1_0(), Syntax::plain_1_0());
    assert_eq!(output, "Note\n\nRead me");
}

#[rstest(syntax => [Syntax::event_1_0(), Syntax::plain_1_0(), Syntax::xdom_json_1_0()])]
fn tree_and_streaming_mode_agree(syntax: Syntax) {
    let registry = SyntaxRegistry::with_defaults();
    let doc = registry.parse(PLAIN_SAMPLE, &Syntax::plain_1_0()).unwrap();
    let rendered = render_document(&registry, &doc, &syntax).unwrap();
    assert_eq!(rendered, streamed(PLAIN_SAMPLE, Syntax::plain_1_0(), syntax));
}

//! Plain text rendering (events → plain text)

use crate::error::FormatError;
use crate::format::Renderer;
use crate::ir::events::{Event, ListKind, Listener};
use crate::printer::Printer;
use crate::syntax::Syntax;

/// Renderer writing `plain/1.0`.
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn syntax(&self) -> Syntax {
        Syntax::plain_1_0()
    }

    fn description(&self) -> &str {
        "Text content only, blocks separated by blank lines"
    }

    fn listener<'p>(&self, printer: &'p mut dyn Printer) -> Box<dyn Listener + 'p> {
        Box::new(PlainPrinter::new(printer))
    }
}

/// Whitespace owed before the next piece of content. Larger wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Separator {
    None,
    Tab,
    Line,
    Blank,
}

struct PlainPrinter<'p> {
    printer: &'p mut dyn Printer,
    pending: Separator,
    extra_lines: usize,
    printed: bool,
    /// Open lists with the number of items seen so far.
    lists: Vec<(ListKind, usize)>,
    first_cell: bool,
}

impl<'p> PlainPrinter<'p> {
    fn new(printer: &'p mut dyn Printer) -> Self {
        Self {
            printer,
            pending: Separator::None,
            extra_lines: 0,
            printed: false,
            lists: Vec::new(),
            first_cell: true,
        }
    }

    fn separate(&mut self, separator: Separator) {
        self.pending = self.pending.max(separator);
    }

    fn flush(&mut self) {
        if self.printed {
            match self.pending {
                Separator::None => {}
                Separator::Tab => self.printer.print("\t"),
                Separator::Line => self.printer.print("\n"),
                Separator::Blank => self.printer.print("\n\n"),
            }
        }
        for _ in 0..self.extra_lines {
            self.printer.print("\n");
        }
        self.pending = Separator::None;
        self.extra_lines = 0;
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.flush();
        self.printer.print(text);
        self.printed = true;
    }

    fn list_item_prefix(&mut self) -> Option<String> {
        let (kind, count) = self.lists.last_mut()?;
        *count += 1;
        Some(match kind {
            ListKind::Bulleted => "- ".to_string(),
            ListKind::Numbered => format!("{}. ", count),
        })
    }
}

impl Listener for PlainPrinter<'_> {
    fn on_event(&mut self, event: Event) -> Result<(), FormatError> {
        match event {
            Event::BeginSection { .. }
            | Event::EndSection { .. }
            | Event::BeginHeader { .. }
            | Event::EndHeader { .. }
            | Event::BeginParagraph(_)
            | Event::EndParagraph(_)
            | Event::BeginDefinitionList(_)
            | Event::EndDefinitionList(_)
            | Event::BeginTable(_)
            | Event::EndTable(_)
            | Event::BeginQuotation(_)
            | Event::EndQuotation(_)
            | Event::BeginGroup(_)
            | Event::EndGroup(_) => self.separate(Separator::Blank),
            Event::BeginList { kind, .. } => {
                self.separate(if self.lists.is_empty() {
                    Separator::Blank
                } else {
                    Separator::Line
                });
                self.lists.push((kind, 0));
            }
            Event::EndList { .. } => {
                self.lists.pop();
                self.separate(if self.lists.is_empty() {
                    Separator::Blank
                } else {
                    Separator::Line
                });
            }
            Event::BeginListItem(_) => {
                self.separate(Separator::Line);
                if let Some(prefix) = self.list_item_prefix() {
                    self.text(&prefix);
                }
            }
            Event::EndListItem(_)
            | Event::BeginDefinitionTerm(_)
            | Event::EndDefinitionTerm(_)
            | Event::BeginDefinitionDescription(_)
            | Event::EndDefinitionDescription(_) => self.separate(Separator::Line),
            Event::BeginTableRow(_) => {
                self.separate(Separator::Line);
                self.first_cell = true;
            }
            Event::EndTableRow(_) => self.separate(Separator::Line),
            Event::BeginTableCell { .. } => {
                if !self.first_cell {
                    self.separate(Separator::Tab);
                }
                self.first_cell = false;
            }
            Event::Word(text) => self.text(&text),
            Event::Space => self.text(" "),
            Event::SpecialSymbol(symbol) => self.text(&symbol.to_string()),
            Event::NewLine => {
                self.flush();
                self.printer.print("\n");
            }
            Event::EmptyLines(count) => self.extra_lines += count,
            Event::HorizontalLine(_) => {
                self.separate(Separator::Blank);
                self.text("----");
                self.separate(Separator::Blank);
            }
            Event::Verbatim {
                content, inline, ..
            } => {
                if !inline {
                    self.separate(Separator::Blank);
                }
                self.text(&content);
                if !inline {
                    self.separate(Separator::Blank);
                }
            }
            Event::RawText { syntax, content } => {
                if syntax.kind() == "plain" {
                    self.text(&content);
                }
            }
            Event::Link(link) => {
                let text = link.label.unwrap_or(link.reference.reference);
                self.text(&text);
            }
            Event::Image(image) => self.text(&image.reference.reference),
            Event::BeginDocument(_)
            | Event::EndDocument(_)
            | Event::EndTableCell { .. }
            | Event::BeginMacroMarker(_)
            | Event::EndMacroMarker(_)
            | Event::BeginFormat { .. }
            | Event::EndFormat { .. }
            | Event::BeginMetaData(_)
            | Event::EndMetaData(_)
            | Event::Error(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Parser;
    use crate::formats::plain::PlainParser;
    use crate::ir::nodes::LinkBlock;
    use crate::parameters::Parameters;
    use crate::reference::{ResourceReference, ResourceType};

    fn p() -> Parameters {
        Parameters::new()
    }

    fn round_trip(source: &str) -> String {
        let doc = PlainParser.parse_document(source).unwrap();
        PlainRenderer.render_document(&doc).unwrap()
    }

    #[test]
    fn paragraphs_and_empty_lines_survive() {
        assert_eq!(round_trip("a b\nc\n\n\nd!"), "a b\nc\n\n\nd!");
        assert_eq!(round_trip("\n\nlate"), "\n\nlate");
    }

    #[test]
    fn empty_document_renders_nothing() {
        let events = vec![Event::BeginDocument(p()), Event::EndDocument(p())];
        assert_eq!(PlainRenderer.render(&events).unwrap(), "");
    }

    #[test]
    fn lists_are_prefixed() {
        let events = vec![
            Event::BeginDocument(p()),
            Event::BeginList {
                kind: ListKind::Numbered,
                parameters: p(),
            },
            Event::BeginListItem(p()),
            Event::Word("one".to_string()),
            Event::EndListItem(p()),
            Event::BeginListItem(p()),
            Event::Word("two".to_string()),
            Event::EndListItem(p()),
            Event::EndList {
                kind: ListKind::Numbered,
                parameters: p(),
            },
            Event::BeginParagraph(p()),
            Event::Word("after".to_string()),
            Event::EndParagraph(p()),
            Event::EndDocument(p()),
        ];
        assert_eq!(
            PlainRenderer.render(&events).unwrap(),
            "1. one\n2. two\n\nafter"
        );
    }

    #[test]
    fn links_render_label_or_reference() {
        let reference = ResourceReference::typed(ResourceType::URL, "https://example.org");
        let events = vec![
            Event::Link(LinkBlock {
                reference: reference.clone(),
                label: Some("site".to_string()),
                freestanding: false,
            }),
            Event::Space,
            Event::Link(LinkBlock {
                reference,
                label: None,
                freestanding: true,
            }),
        ];
        assert_eq!(
            PlainRenderer.render(&events).unwrap(),
            "site https://example.org"
        );
    }

    #[test]
    fn table_cells_are_tab_separated() {
        let cell = |text: &str| {
            vec![
                Event::BeginTableCell {
                    header: false,
                    parameters: p(),
                },
                Event::Word(text.to_string()),
                Event::EndTableCell {
                    header: false,
                    parameters: p(),
                },
            ]
        };
        let mut events = vec![Event::BeginTable(p()), Event::BeginTableRow(p())];
        events.extend(cell("a"));
        events.extend(cell("b"));
        events.push(Event::EndTableRow(p()));
        events.push(Event::BeginTableRow(p()));
        events.extend(cell("c"));
        events.push(Event::EndTableRow(p()));
        events.push(Event::EndTable(p()));
        assert_eq!(PlainRenderer.render(&events).unwrap(), "a\tb\nc");
    }
}

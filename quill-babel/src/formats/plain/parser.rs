//! Plain text parsing (plain text → events)

use crate::error::FormatError;
use crate::format::Parser;
use crate::ir::events::{Event, Listener};
use crate::parameters::Parameters;
use crate::syntax::Syntax;

/// Parser reading `plain/1.0`.
pub struct PlainParser;

impl Parser for PlainParser {
    fn syntax(&self) -> Syntax {
        Syntax::plain_1_0()
    }

    fn description(&self) -> &str {
        "Plain text split into paragraphs and words"
    }

    fn parse(&self, source: &str, listener: &mut dyn Listener) -> Result<(), FormatError> {
        listener.on_event(Event::BeginDocument(Parameters::new()))?;

        let mut paragraph: Vec<&str> = Vec::new();
        let mut blank_lines: usize = 0;
        let mut seen_paragraph = false;

        for line in source.lines() {
            if line.trim().is_empty() {
                if !paragraph.is_empty() {
                    emit_paragraph(&paragraph, listener)?;
                    paragraph.clear();
                }
                blank_lines += 1;
                continue;
            }

            if paragraph.is_empty() {
                // One blank line is the paragraph separator itself.
                let extra = if seen_paragraph {
                    blank_lines.saturating_sub(1)
                } else {
                    blank_lines
                };
                if extra > 0 {
                    listener.on_event(Event::EmptyLines(extra))?;
                }
                blank_lines = 0;
                seen_paragraph = true;
            }
            paragraph.push(line);
        }

        if !paragraph.is_empty() {
            emit_paragraph(&paragraph, listener)?;
        }

        listener.on_event(Event::EndDocument(Parameters::new()))
    }
}

fn emit_paragraph(lines: &[&str], listener: &mut dyn Listener) -> Result<(), FormatError> {
    listener.on_event(Event::BeginParagraph(Parameters::new()))?;
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            listener.on_event(Event::NewLine)?;
        }
        emit_line(line, listener)?;
    }
    listener.on_event(Event::EndParagraph(Parameters::new()))
}

fn emit_line(line: &str, listener: &mut dyn Listener) -> Result<(), FormatError> {
    let mut word = String::new();
    for c in line.chars() {
        if c.is_alphanumeric() {
            word.push(c);
            continue;
        }
        if !word.is_empty() {
            listener.on_event(Event::Word(std::mem::take(&mut word)))?;
        }
        if c == ' ' {
            listener.on_event(Event::Space)?;
        } else {
            listener.on_event(Event::SpecialSymbol(c))?;
        }
    }
    if !word.is_empty() {
        listener.on_event(Event::Word(word))?;
    }
    Ok(())
}

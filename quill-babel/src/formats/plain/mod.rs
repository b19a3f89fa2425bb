//! Plain text format implementation
//!
//! Data Model:
//!
//!     Plain text has no markup, so parsing only recovers paragraphs and the words inside them.
//!     | Plain text | Event | Notes |
//!     | Blank-line separated run of lines | Paragraph | |
//!     | Line break inside a paragraph | NewLine | |
//!     | Blank lines beyond the first | EmptyLines(n) | kept so paragraph spacing survives |
//!     | Run of letters and digits | Word | |
//!     | ` ` | Space | |
//!     | Any other character | SpecialSymbol | |
//!
//!     Rendering goes the other way for any event stream: block containers are separated by
//!     blank lines, list items and table rows by line breaks, table cells by tabs. Markup with
//!     no plain text equivalent (formatting, raw content, error markers) contributes its text
//!     content only.

mod parser;
mod renderer;

pub use parser::PlainParser;
pub use renderer::PlainRenderer;
